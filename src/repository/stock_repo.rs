// ==========================================
// 外卖订单系统 - 库存仓储（原子条件更新）
// ==========================================
// 红线: 预占必须是单条条件 UPDATE（库存 >= 数量 且 上架），不允许先读后写
// 红线: 每次预占/释放写一行 stock_movement，与库存变更同事务提交
// ==========================================

use crate::domain::menu_item::StockMovement;
use crate::domain::types::StockMovementType;
use crate::repository::codec::{format_timestamp, timestamp_at};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

// ==========================================
// 连接级原语（供订单取消事务复用）
// ==========================================

/// 条件扣减库存
///
/// # 返回
/// - `Ok(Some(stock_after))`: 扣减成功
/// - `Ok(None)`: 条件不满足（菜品不存在 / 已下架 / 库存不足），未做任何修改
pub(crate) fn reserve_in(
    conn: &Connection,
    menu_item_id: i64,
    quantity: i32,
    reference: Option<&str>,
    now: NaiveDateTime,
) -> RepositoryResult<Option<i32>> {
    let ts = format_timestamp(&now);
    let stock_after: Option<i32> = conn
        .query_row(
            r#"UPDATE menu_item
               SET stock_quantity = stock_quantity - ?1, updated_at = ?2
               WHERE menu_item_id = ?3 AND is_available = 1 AND stock_quantity >= ?1
               RETURNING stock_quantity"#,
            params![quantity, ts, menu_item_id],
            |row| row.get(0),
        )
        .optional()?;

    if let Some(after) = stock_after {
        insert_movement(conn, menu_item_id, StockMovementType::Reserve, quantity, after, reference, &ts)?;
    }
    Ok(stock_after)
}

/// 回补库存（唯一条件: 回补后不超过 i32::MAX）
///
/// # 返回
/// - `Ok(Some(stock_after))`: 回补成功
/// - `Ok(None)`: 菜品不存在
/// - `Err(StockOverflow)`: 回补后库存溢出，未做任何修改
pub(crate) fn release_in(
    conn: &Connection,
    menu_item_id: i64,
    quantity: i32,
    reference: Option<&str>,
    now: NaiveDateTime,
) -> RepositoryResult<Option<i32>> {
    let ts = format_timestamp(&now);
    let stock_after: Option<i32> = conn
        .query_row(
            r#"UPDATE menu_item
               SET stock_quantity = stock_quantity + ?1, updated_at = ?2
               WHERE menu_item_id = ?3 AND stock_quantity <= ?4 - ?1
               RETURNING stock_quantity"#,
            params![quantity, ts, menu_item_id, i32::MAX],
            |row| row.get(0),
        )
        .optional()?;

    match stock_after {
        Some(after) => {
            insert_movement(conn, menu_item_id, StockMovementType::Release, quantity, after, reference, &ts)?;
            Ok(Some(after))
        }
        None => {
            let exists: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM menu_item WHERE menu_item_id = ?1)",
                params![menu_item_id],
                |row| row.get(0),
            )?;
            if exists {
                Err(RepositoryError::StockOverflow {
                    menu_item_id,
                    quantity,
                })
            } else {
                Ok(None)
            }
        }
    }
}

fn insert_movement(
    conn: &Connection,
    menu_item_id: i64,
    movement_type: StockMovementType,
    quantity: i32,
    stock_after: i32,
    reference: Option<&str>,
    ts: &str,
) -> RepositoryResult<()> {
    conn.execute(
        r#"INSERT INTO stock_movement (
            menu_item_id, movement_type, quantity, stock_after, reference, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)"#,
        params![menu_item_id, movement_type.to_db_str(), quantity, stock_after, reference, ts],
    )?;
    Ok(())
}

// ==========================================
// StockRepository - 库存仓储
// ==========================================
pub struct StockRepository {
    conn: Arc<Mutex<Connection>>,
}

impl StockRepository {
    /// 创建新的StockRepository实例
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 原子预占库存（条件扣减 + 流水，同一事务）
    pub fn try_reserve(
        &self,
        menu_item_id: i64,
        quantity: i32,
        reference: Option<&str>,
        now: NaiveDateTime,
    ) -> RepositoryResult<Option<i32>> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;
        let result = reserve_in(&tx, menu_item_id, quantity, reference, now)?;
        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(result)
    }

    /// 回补库存（增量 + 流水，同一事务）
    pub fn release(
        &self,
        menu_item_id: i64,
        quantity: i32,
        reference: Option<&str>,
        now: NaiveDateTime,
    ) -> RepositoryResult<Option<i32>> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;
        let result = release_in(&tx, menu_item_id, quantity, reference, now)?;
        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(result)
    }

    /// 只读检查: 上架且库存 >= 数量
    pub fn is_available_with_stock(&self, menu_item_id: i64, quantity: i32) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row(
            r#"SELECT COUNT(*) FROM menu_item
               WHERE menu_item_id = ?1 AND is_available = 1 AND stock_quantity >= ?2"#,
            params![menu_item_id, quantity],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// 当前库存（菜品不存在时为 None）
    pub fn current_stock(&self, menu_item_id: i64) -> RepositoryResult<Option<i32>> {
        let conn = self.get_conn()?;
        let stock = conn
            .query_row(
                "SELECT stock_quantity FROM menu_item WHERE menu_item_id = ?1",
                params![menu_item_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(stock)
    }

    /// 查询菜品的库存流水（按发生顺序）
    pub fn find_movements(&self, menu_item_id: i64) -> RepositoryResult<Vec<StockMovement>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"SELECT movement_id, menu_item_id, movement_type, quantity, stock_after, reference, created_at
               FROM stock_movement
               WHERE menu_item_id = ?1
               ORDER BY movement_id"#,
        )?;

        let rows = stmt
            .query_map(params![menu_item_id], |row| {
                let raw_type: String = row.get(2)?;
                let movement_type = StockMovementType::from_db_str(&raw_type).ok_or_else(|| {
                    rusqlite::Error::FromSqlConversionFailure(
                        2,
                        rusqlite::types::Type::Text,
                        format!("未知库存流水类型: {}", raw_type).into(),
                    )
                })?;
                Ok(StockMovement {
                    movement_id: row.get(0)?,
                    menu_item_id: row.get(1)?,
                    movement_type,
                    quantity: row.get(3)?,
                    stock_after: row.get(4)?,
                    reference: row.get(5)?,
                    created_at: timestamp_at(row, 6)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}
