// ==========================================
// 外卖订单系统 - 预占补偿 (ReservationSaga)
// ==========================================
// 每次成功预占登记一条补偿步骤；失败时按逆序回补
// 单步回补按配置重试，仍失败则上报 RollbackFailed（不吞掉库存泄漏）
// ==========================================

use crate::engine::error::{FulfillmentError, FulfillmentResult, UnreleasedReservation};
use crate::engine::stock_ledger::StockLedger;
use tracing::{error, info, warn};

/// 已成功的预占
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reservation {
    pub menu_item_id: i64,
    pub quantity: i32,
}

pub struct ReservationSaga<'a> {
    ledger: &'a StockLedger,
    reference: String,
    max_release_attempts: u32,
    granted: Vec<Reservation>,
}

impl<'a> ReservationSaga<'a> {
    pub fn new(ledger: &'a StockLedger, reference: impl Into<String>, max_release_attempts: u32) -> Self {
        Self {
            ledger,
            reference: reference.into(),
            max_release_attempts: max_release_attempts.max(1),
            granted: Vec::new(),
        }
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn granted(&self) -> &[Reservation] {
        &self.granted
    }

    /// 预占一行；成功后登记补偿步骤
    pub fn reserve(&mut self, menu_item_id: i64, quantity: i32) -> FulfillmentResult<()> {
        self.ledger
            .reserve_for(menu_item_id, quantity, Some(&self.reference))?;
        self.granted.push(Reservation {
            menu_item_id,
            quantity,
        });
        Ok(())
    }

    /// 全部步骤完成，预占转为订单持有
    pub fn complete(self) -> Vec<Reservation> {
        self.granted
    }

    /// 逆序回补已预占的库存，返回应交给调用方的错误
    ///
    /// - 全部回补成功: 返回原始错误 `cause`
    /// - 任一行重试耗尽: 返回 `RollbackFailed`
    pub fn compensate(self, cause: FulfillmentError) -> FulfillmentError {
        let mut unreleased = Vec::new();

        for step in self.granted.iter().rev() {
            if !self.release_with_retry(step) {
                unreleased.push(UnreleasedReservation {
                    menu_item_id: step.menu_item_id,
                    quantity: step.quantity,
                });
            }
        }

        if unreleased.is_empty() {
            if !self.granted.is_empty() {
                info!(
                    reference = %self.reference,
                    released = self.granted.len(),
                    cause = %cause,
                    "预占已全部回滚"
                );
            }
            return cause;
        }

        error!(
            reference = %self.reference,
            unreleased = ?unreleased,
            cause = %cause,
            "库存补偿释放失败，需要人工介入"
        );
        FulfillmentError::RollbackFailed {
            reference: self.reference,
            unreleased,
            cause: cause.to_string(),
        }
    }

    fn release_with_retry(&self, step: &Reservation) -> bool {
        for attempt in 1..=self.max_release_attempts {
            match self
                .ledger
                .release_for(step.menu_item_id, step.quantity, Some(&self.reference))
            {
                Ok(_) => return true,
                Err(FulfillmentError::NotFound { .. }) => {
                    // 菜品已被删除，无库存可回补
                    warn!(
                        menu_item_id = step.menu_item_id,
                        quantity = step.quantity,
                        "回滚时菜品已不存在，跳过回补"
                    );
                    return true;
                }
                Err(e) => {
                    warn!(
                        menu_item_id = step.menu_item_id,
                        quantity = step.quantity,
                        attempt,
                        max_attempts = self.max_release_attempts,
                        error = %e,
                        "回补失败"
                    );
                }
            }
        }
        false
    }
}
