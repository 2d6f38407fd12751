// ==========================================
// 外卖订单系统 - 库存 API
// ==========================================
// 职责: 预占 / 回补 / 可用性预检 / 流水查询
// ==========================================

use std::sync::Arc;

use crate::api::error::ApiResult;
use crate::domain::menu_item::StockMovement;
use crate::engine::StockLedger;
use crate::perf::PerfGuard;
use crate::repository::StockRepository;

pub struct StockApi {
    ledger: Arc<StockLedger>,
    stock_repo: Arc<StockRepository>,
}

impl StockApi {
    /// 创建新的StockApi实例
    pub fn new(ledger: Arc<StockLedger>, stock_repo: Arc<StockRepository>) -> Self {
        Self { ledger, stock_repo }
    }

    /// 预占库存，返回扣减后的库存
    pub fn reserve_stock(&self, menu_item_id: i64, quantity: i32) -> ApiResult<i32> {
        let _perf = PerfGuard::new("stock_api.reserve_stock");
        Ok(self.ledger.reserve(menu_item_id, quantity)?)
    }

    /// 回补库存（含补货），返回回补后的库存
    pub fn release_stock(&self, menu_item_id: i64, quantity: i32) -> ApiResult<i32> {
        let _perf = PerfGuard::new("stock_api.release_stock");
        Ok(self.ledger.release(menu_item_id, quantity)?)
    }

    /// 可用性预检（仅供参考，不构成预占）
    pub fn check_availability(&self, menu_item_id: i64, quantity: i32) -> ApiResult<bool> {
        let _perf = PerfGuard::new("stock_api.check_availability");
        Ok(self.ledger.is_available(menu_item_id, quantity)?)
    }

    pub fn current_stock(&self, menu_item_id: i64) -> ApiResult<i32> {
        Ok(self.ledger.current_stock(menu_item_id)?)
    }

    /// 库存流水（按发生顺序）
    pub fn list_movements(&self, menu_item_id: i64) -> ApiResult<Vec<StockMovement>> {
        let _perf = PerfGuard::new("stock_api.list_movements");
        Ok(self.stock_repo.find_movements(menu_item_id)?)
    }
}
