// ==========================================
// 外卖订单系统 - 订单 API
// ==========================================
// 职责: 下单、状态流转、取消、订单查询
// 所有失败以 ApiError 返回，不做传输层包装
// ==========================================

use std::sync::Arc;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;

use crate::api::error::{ApiError, ApiResult};
use crate::config::FulfillmentConfigReader;
use crate::domain::order::{CreateOrderRequest, Order};
use crate::domain::types::OrderStatus;
use crate::engine::OrderLifecycle;
use crate::perf::PerfGuard;
use crate::repository::OrderRepository;

/// 分页上限
pub const MAX_PAGE_SIZE: i64 = 200;

// ==========================================
// OrderApi - 订单 API
// ==========================================
pub struct OrderApi<C>
where
    C: FulfillmentConfigReader,
{
    lifecycle: Arc<OrderLifecycle<C>>,
    order_repo: Arc<OrderRepository>,
}

impl<C> OrderApi<C>
where
    C: FulfillmentConfigReader,
{
    /// 创建新的OrderApi实例
    pub fn new(lifecycle: Arc<OrderLifecycle<C>>, order_repo: Arc<OrderRepository>) -> Self {
        Self {
            lifecycle,
            order_repo,
        }
    }

    fn check_page(limit: i64, offset: i64) -> ApiResult<()> {
        if limit <= 0 || limit > MAX_PAGE_SIZE {
            return Err(ApiError::InvalidInput(format!(
                "limit 必须在 1..={} 之间: {}",
                MAX_PAGE_SIZE, limit
            )));
        }
        if offset < 0 {
            return Err(ApiError::InvalidInput(format!("offset 不能为负: {}", offset)));
        }
        Ok(())
    }

    // ==========================================
    // 写操作
    // ==========================================

    /// 下单
    ///
    /// # 返回
    /// - Ok(Order): 状态为 PENDING 的订单（含订单行）
    /// - Err(ApiError): InvalidInput / NotFound / RestaurantClosed / InsufficientStock /
    ///   DuplicateOrderNumber / RollbackFailed
    pub fn create_order(&self, request: &CreateOrderRequest) -> ApiResult<Order> {
        let _perf = PerfGuard::new("order_api.create_order");
        Ok(self.lifecycle.create_order(request)?)
    }

    /// 更新订单状态
    pub fn update_status(&self, order_id: i64, status: OrderStatus) -> ApiResult<Order> {
        let _perf = PerfGuard::new("order_api.update_status");
        Ok(self.lifecycle.update_status(order_id, status)?)
    }

    /// 以状态名更新订单状态（如 "CONFIRMED"，不区分大小写）
    pub fn update_status_by_name(&self, order_id: i64, status: &str) -> ApiResult<Order> {
        let status: OrderStatus = status.parse().map_err(ApiError::InvalidInput)?;
        self.update_status(order_id, status)
    }

    /// 取消订单（回补全部订单行库存）
    pub fn cancel_order(&self, order_id: i64) -> ApiResult<Order> {
        let _perf = PerfGuard::new("order_api.cancel_order");
        Ok(self.lifecycle.cancel_order(order_id)?)
    }

    // ==========================================
    // 查询
    // ==========================================

    pub fn get_order(&self, order_id: i64) -> ApiResult<Order> {
        let _perf = PerfGuard::new("order_api.get_order");
        self.order_repo
            .find_by_id(order_id)?
            .ok_or_else(|| ApiError::NotFound(format!("Order(id={})不存在", order_id)))
    }

    pub fn get_order_by_number(&self, order_number: &str) -> ApiResult<Order> {
        let _perf = PerfGuard::new("order_api.get_order_by_number");
        let order_number = order_number.trim();
        if order_number.is_empty() {
            return Err(ApiError::InvalidInput("订单号不能为空".to_string()));
        }
        self.order_repo
            .find_by_order_number(order_number)?
            .ok_or_else(|| ApiError::NotFound(format!("Order(order_number={})不存在", order_number)))
    }

    pub fn list_orders_by_status(&self, status: OrderStatus) -> ApiResult<Vec<Order>> {
        let _perf = PerfGuard::new("order_api.list_orders_by_status");
        Ok(self.order_repo.find_by_status(status)?)
    }

    pub fn list_orders_by_customer_phone(&self, phone: &str) -> ApiResult<Vec<Order>> {
        let _perf = PerfGuard::new("order_api.list_orders_by_customer_phone");
        let phone = phone.trim();
        if phone.is_empty() {
            return Err(ApiError::InvalidInput("手机号不能为空".to_string()));
        }
        Ok(self.order_repo.find_by_customer_phone(phone)?)
    }

    /// 餐厅订单（按创建时间倒序分页）
    pub fn list_orders_by_restaurant(&self, restaurant_id: i64, limit: i64, offset: i64) -> ApiResult<Vec<Order>> {
        let _perf = PerfGuard::new("order_api.list_orders_by_restaurant");
        Self::check_page(limit, offset)?;
        Ok(self.order_repo.find_by_restaurant(restaurant_id, limit, offset)?)
    }

    /// 最近订单（按创建时间倒序分页）
    pub fn list_recent_orders(&self, limit: i64, offset: i64) -> ApiResult<Vec<Order>> {
        let _perf = PerfGuard::new("order_api.list_recent_orders");
        Self::check_page(limit, offset)?;
        Ok(self.order_repo.find_recent(limit, offset)?)
    }

    pub fn list_orders_by_restaurant_and_status(
        &self,
        restaurant_id: i64,
        status: OrderStatus,
    ) -> ApiResult<Vec<Order>> {
        let _perf = PerfGuard::new("order_api.list_orders_by_restaurant_and_status");
        Ok(self.order_repo.find_by_restaurant_and_status(restaurant_id, status)?)
    }

    /// 创建时间区间（闭区间）
    pub fn list_orders_created_between(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> ApiResult<Vec<Order>> {
        let _perf = PerfGuard::new("order_api.list_orders_created_between");
        if start > end {
            return Err(ApiError::InvalidInput(format!("时间区间非法: [{}, {}]", start, end)));
        }
        Ok(self.order_repo.find_by_created_between(start, end)?)
    }

    /// 总额严格大于 amount 的订单
    pub fn list_orders_above_amount(&self, amount: Decimal) -> ApiResult<Vec<Order>> {
        let _perf = PerfGuard::new("order_api.list_orders_above_amount");
        if amount < Decimal::ZERO {
            return Err(ApiError::InvalidInput(format!("金额不能为负: {}", amount)));
        }
        Ok(self.order_repo.find_above_amount(amount)?)
    }

    pub fn count_orders_by_status(&self, status: OrderStatus) -> ApiResult<i64> {
        Ok(self.order_repo.count_by_status(status)?)
    }

    /// 菜品累计下单数量（不含已取消订单）
    pub fn total_quantity_ordered(&self, menu_item_id: i64) -> ApiResult<i64> {
        Ok(self.order_repo.total_quantity_ordered(menu_item_id)?)
    }
}
