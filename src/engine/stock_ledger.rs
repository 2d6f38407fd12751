// ==========================================
// 外卖订单系统 - 库存账本 (StockLedger)
// ==========================================
// 红线: 预占 = 存储层单条条件更新，不做"先查后写"
// 红线: 失败不产生任何修改
// ==========================================

use crate::engine::error::{FulfillmentError, FulfillmentResult};
use crate::repository::codec::now_local;
use crate::repository::{RepositoryError, StockRepository};
use std::sync::Arc;
use tracing::{debug, instrument};

pub struct StockLedger {
    stock_repo: Arc<StockRepository>,
}

impl StockLedger {
    pub fn new(stock_repo: Arc<StockRepository>) -> Self {
        Self { stock_repo }
    }

    fn ensure_positive(quantity: i32) -> FulfillmentResult<()> {
        if quantity <= 0 {
            return Err(FulfillmentError::InvalidArgument(format!(
                "数量必须为正数: quantity={}",
                quantity
            )));
        }
        Ok(())
    }

    /// 预占库存
    ///
    /// # 返回
    /// - `Ok(stock_after)`: 扣减后的库存
    ///
    /// # 错误
    /// - `InvalidArgument`: quantity <= 0
    /// - `NotFound`: 菜品不存在
    /// - `InsufficientStock`: 库存不足或菜品已下架（不产生修改）
    pub fn reserve(&self, menu_item_id: i64, quantity: i32) -> FulfillmentResult<i32> {
        self.reserve_for(menu_item_id, quantity, None)
    }

    /// 预占库存并在流水上记录关联单号
    #[instrument(skip(self), level = "debug")]
    pub fn reserve_for(
        &self,
        menu_item_id: i64,
        quantity: i32,
        reference: Option<&str>,
    ) -> FulfillmentResult<i32> {
        Self::ensure_positive(quantity)?;

        match self.stock_repo.try_reserve(menu_item_id, quantity, reference, now_local())? {
            Some(stock_after) => {
                debug!(menu_item_id, quantity, stock_after, "库存预占成功");
                Ok(stock_after)
            }
            None => {
                // 条件不满足: 区分"不存在"与"库存不足/已下架"
                if self.stock_repo.current_stock(menu_item_id)?.is_none() {
                    return Err(FulfillmentError::not_found("MenuItem", menu_item_id));
                }
                debug!(menu_item_id, quantity, "库存预占失败: 库存不足或已下架");
                Err(FulfillmentError::InsufficientStock {
                    menu_item_id,
                    requested: quantity,
                })
            }
        }
    }

    /// 回补库存（取消/退货/补偿）
    ///
    /// # 错误
    /// - `InvalidArgument`: quantity <= 0，或回补后库存超出 i32::MAX（不产生修改）
    /// - `NotFound`: 菜品不存在
    pub fn release(&self, menu_item_id: i64, quantity: i32) -> FulfillmentResult<i32> {
        self.release_for(menu_item_id, quantity, None)
    }

    #[instrument(skip(self), level = "debug")]
    pub fn release_for(
        &self,
        menu_item_id: i64,
        quantity: i32,
        reference: Option<&str>,
    ) -> FulfillmentResult<i32> {
        Self::ensure_positive(quantity)?;

        let stock_after = match self.stock_repo.release(menu_item_id, quantity, reference, now_local()) {
            Ok(released) => released.ok_or_else(|| FulfillmentError::not_found("MenuItem", menu_item_id))?,
            Err(RepositoryError::StockOverflow { .. }) => {
                return Err(FulfillmentError::InvalidArgument(format!(
                    "回补后库存超出上限: menu_item_id={}, quantity={}",
                    menu_item_id, quantity
                )));
            }
            Err(e) => return Err(e.into()),
        };
        debug!(menu_item_id, quantity, stock_after, "库存回补成功");
        Ok(stock_after)
    }

    /// 只读预检: 上架且库存 >= quantity
    ///
    /// 仅作参考，并发下以 reserve 的原子性为准
    pub fn is_available(&self, menu_item_id: i64, quantity: i32) -> FulfillmentResult<bool> {
        Self::ensure_positive(quantity)?;

        if self.stock_repo.current_stock(menu_item_id)?.is_none() {
            return Err(FulfillmentError::not_found("MenuItem", menu_item_id));
        }
        Ok(self.stock_repo.is_available_with_stock(menu_item_id, quantity)?)
    }

    /// 当前库存
    pub fn current_stock(&self, menu_item_id: i64) -> FulfillmentResult<i32> {
        self.stock_repo
            .current_stock(menu_item_id)?
            .ok_or_else(|| FulfillmentError::not_found("MenuItem", menu_item_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;
    use std::sync::Mutex;

    fn ledger(stock: i32) -> StockLedger {
        crate::logging::init_test();
        let conn = Connection::open_in_memory().unwrap();
        crate::db::configure_sqlite_connection(&conn).unwrap();
        crate::db::init_schema(&conn).unwrap();
        conn.execute_batch(&format!(
            r#"INSERT INTO restaurant (name, opening_time, closing_time, created_at, updated_at)
               VALUES ('R1', '09:00:00', '22:00:00', '2025-01-01 00:00:00', '2025-01-01 00:00:00');
               INSERT INTO menu_item (restaurant_id, name, price, is_available, stock_quantity, created_at, updated_at)
               VALUES (1, 'Noodles', '12.00', 1, {}, '2025-01-01 00:00:00', '2025-01-01 00:00:00');"#,
            stock
        ))
        .unwrap();
        StockLedger::new(Arc::new(StockRepository::new(Arc::new(Mutex::new(conn)))))
    }

    #[test]
    fn test_reserve_release_round_trip() {
        let ledger = ledger(5);
        assert_eq!(ledger.reserve(1, 2).unwrap(), 3);
        assert_eq!(ledger.release(1, 2).unwrap(), 5);
        assert_eq!(ledger.current_stock(1).unwrap(), 5);
    }

    #[test]
    fn test_release_past_i32_max_is_rejected() {
        let ledger = ledger(i32::MAX - 1);
        assert_eq!(ledger.release(1, 1).unwrap(), i32::MAX);

        let err = ledger.release(1, 1).unwrap_err();
        assert!(matches!(err, FulfillmentError::InvalidArgument(_)), "unexpected: {}", err);
        assert_eq!(ledger.current_stock(1).unwrap(), i32::MAX);
        assert!(matches!(ledger.release(2, 1), Err(FulfillmentError::NotFound { .. })));
    }

    #[test]
    fn test_insufficient_stock_does_not_mutate() {
        let ledger = ledger(1);
        let err = ledger.reserve(1, 2).unwrap_err();
        assert!(matches!(
            err,
            FulfillmentError::InsufficientStock { menu_item_id: 1, requested: 2 }
        ));
        assert_eq!(ledger.current_stock(1).unwrap(), 1);
    }

    #[test]
    fn test_invalid_quantity_and_unknown_item() {
        let ledger = ledger(1);
        assert!(matches!(ledger.reserve(1, 0), Err(FulfillmentError::InvalidArgument(_))));
        assert!(matches!(ledger.release(1, -1), Err(FulfillmentError::InvalidArgument(_))));
        assert!(matches!(ledger.is_available(1, 0), Err(FulfillmentError::InvalidArgument(_))));
        assert!(matches!(ledger.reserve(42, 1), Err(FulfillmentError::NotFound { .. })));
        assert!(matches!(ledger.release(42, 1), Err(FulfillmentError::NotFound { .. })));
        assert!(matches!(ledger.is_available(42, 1), Err(FulfillmentError::NotFound { .. })));
    }

    #[test]
    fn test_is_available() {
        let ledger = ledger(2);
        assert!(ledger.is_available(1, 2).unwrap());
        assert!(!ledger.is_available(1, 3).unwrap());
    }
}
