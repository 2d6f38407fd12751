// ==========================================
// 外卖订单系统 - 订单生命周期引擎 (OrderLifecycle)
// ==========================================
// 下单: 营业校验 → 定价快照 → 逐行预占（saga）→ 写入订单聚合（订单号冲突换号重试）
// 状态: 只允许 OrderStatus::allowed_next 中的转换，写入使用 CAS
// 取消: 状态 CAS 与全部库存回补同一事务
// 红线: Engine 不拼 SQL；失败时不持有任何部分预占
// ==========================================

use crate::config::FulfillmentConfigReader;
use crate::domain::order::{CreateOrderRequest, NewOrder, Order, PricedLine};
use crate::domain::types::OrderStatus;
use crate::engine::availability::RestaurantAvailability;
use crate::engine::catalog::CatalogLookup;
use crate::engine::error::{FulfillmentError, FulfillmentResult};
use crate::engine::order_number::{OrderNumberGenerator, OrderNumberSource};
use crate::engine::reservation::ReservationSaga;
use crate::engine::stock_ledger::StockLedger;
use crate::repository::codec::now_local;
use crate::repository::OrderRepository;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use std::error::Error;
use std::sync::Arc;
use tracing::{info, instrument, warn};

const ORDER_NUMBER_UNIQUE_COLUMN: &str = "customer_order.order_number";

// ==========================================
// OrderLifecycle - 订单生命周期引擎
// ==========================================
pub struct OrderLifecycle<C>
where
    C: FulfillmentConfigReader,
{
    catalog: Arc<dyn CatalogLookup>,
    availability: Arc<RestaurantAvailability>,
    ledger: Arc<StockLedger>,
    order_repo: Arc<OrderRepository>,
    config: Arc<C>,
    order_numbers: Arc<dyn OrderNumberSource>,
}

impl<C> OrderLifecycle<C>
where
    C: FulfillmentConfigReader,
{
    /// 创建新的 OrderLifecycle 实例（默认订单号生成器）
    pub fn new(
        catalog: Arc<dyn CatalogLookup>,
        availability: Arc<RestaurantAvailability>,
        ledger: Arc<StockLedger>,
        order_repo: Arc<OrderRepository>,
        config: Arc<C>,
    ) -> Self {
        Self {
            catalog,
            availability,
            ledger,
            order_repo,
            config,
            order_numbers: Arc::new(OrderNumberGenerator::new()),
        }
    }

    /// 替换订单号来源
    pub fn with_order_numbers(mut self, order_numbers: Arc<dyn OrderNumberSource>) -> Self {
        self.order_numbers = order_numbers;
        self
    }

    /// 读取配置，失败时回退默认值
    fn config_or<T: Copy + std::fmt::Display>(
        value: Result<T, Box<dyn Error>>,
        default: T,
        name: &'static str,
    ) -> T {
        value.unwrap_or_else(|e| {
            warn!(config = name, default = %default, error = %e, "读取配置失败，使用默认值");
            default
        })
    }

    // ==========================================
    // 下单
    // ==========================================

    /// 以服务器本地墙钟下单
    pub fn create_order(&self, request: &CreateOrderRequest) -> FulfillmentResult<Order> {
        self.create_order_at(request, now_local())
    }

    /// 以指定时间下单（营业判定与订单时间戳均使用 now）
    ///
    /// # 错误
    /// - `InvalidArgument`: 订单行为空/超限、数量非正、菜品不属于该餐厅、顾客信息为空
    /// - `NotFound`: 餐厅或菜品不存在
    /// - `RestaurantClosed`: 餐厅停用或不在营业时间
    /// - `InsufficientStock`: 任一行预占失败（已回补全部已预占行）
    /// - `DuplicateOrderNumber`: 订单号重试耗尽（已回补）
    /// - `RollbackFailed`: 回补失败，需人工处理
    #[instrument(skip(self, request), fields(restaurant_id = request.restaurant_id, lines = request.items.len()))]
    pub fn create_order_at(
        &self,
        request: &CreateOrderRequest,
        now: NaiveDateTime,
    ) -> FulfillmentResult<Order> {
        // === 步骤 1: 入参校验 ===
        self.validate_request(request)?;

        // === 步骤 2: 营业校验 ===
        let restaurant = self.catalog.get_restaurant(request.restaurant_id)?;
        if !RestaurantAvailability::accepts_orders(&restaurant, now.time()) {
            info!(
                restaurant_id = restaurant.restaurant_id,
                is_active = restaurant.is_active,
                at = %now.time(),
                "餐厅当前不接单"
            );
            return Err(FulfillmentError::RestaurantClosed {
                restaurant_id: restaurant.restaurant_id,
            });
        }

        // === 步骤 3: 定价快照 ===
        let lines = self.price_lines(request)?;
        let total_amount = lines
            .iter()
            .try_fold(Decimal::ZERO, |acc, line| acc.checked_add(line.subtotal))
            .ok_or_else(|| FulfillmentError::InvalidArgument("订单总额超出可表示范围".to_string()))?;

        // === 步骤 4: 逐行预占 ===
        let mut order_number = self.order_numbers.next_order_number();
        let rollback_attempts = Self::config_or(
            self.config.get_rollback_max_attempts(),
            3,
            "rollback_max_attempts",
        );
        let mut saga = ReservationSaga::new(&self.ledger, order_number.clone(), rollback_attempts);
        for line in &lines {
            if let Err(e) = saga.reserve(line.menu_item_id, line.quantity) {
                warn!(
                    menu_item_id = line.menu_item_id,
                    quantity = line.quantity,
                    error = %e,
                    "预占失败，回滚已预占行"
                );
                return Err(saga.compensate(e));
            }
        }

        // === 步骤 5: 写入订单聚合（订单号冲突换号重试）===
        let max_attempts = Self::config_or(
            self.config.get_order_number_max_attempts(),
            5,
            "order_number_max_attempts",
        )
        .max(1);

        let mut new_order = NewOrder {
            order_number: String::new(),
            restaurant_id: request.restaurant_id,
            customer_name: request.customer_name.trim().to_string(),
            customer_phone: request.customer_phone.trim().to_string(),
            delivery_address: request.delivery_address.trim().to_string(),
            lines,
            total_amount,
            notes: request.notes.clone(),
            created_at: now,
        };

        for attempt in 1..=max_attempts {
            new_order.order_number = order_number.clone();
            match self.order_repo.insert_aggregate(&new_order) {
                Ok(order) => {
                    saga.complete();
                    info!(
                        order_id = order.order_id,
                        order_number = %order.order_number,
                        total_amount = %order.total_amount,
                        "订单已创建"
                    );
                    return Ok(order);
                }
                Err(e) if e.is_unique_violation_on(ORDER_NUMBER_UNIQUE_COLUMN) => {
                    warn!(order_number = %order_number, attempt, max_attempts, "订单号冲突，重新生成");
                    order_number = self.order_numbers.next_order_number();
                }
                Err(e) => return Err(saga.compensate(e.into())),
            }
        }

        Err(saga.compensate(FulfillmentError::DuplicateOrderNumber {
            attempts: max_attempts,
        }))
    }

    fn validate_request(&self, request: &CreateOrderRequest) -> FulfillmentResult<()> {
        if request.items.is_empty() {
            return Err(FulfillmentError::InvalidArgument("订单行不能为空".to_string()));
        }

        let max_lines = Self::config_or(self.config.get_max_line_items(), 50, "max_line_items");
        if request.items.len() > max_lines {
            return Err(FulfillmentError::InvalidArgument(format!(
                "订单行数量超过上限: {} > {}",
                request.items.len(),
                max_lines
            )));
        }

        if let Some(line) = request.items.iter().find(|line| line.quantity <= 0) {
            return Err(FulfillmentError::InvalidArgument(format!(
                "数量必须为正数: menu_item_id={}, quantity={}",
                line.menu_item_id, line.quantity
            )));
        }

        for (field, value) in [
            ("customer_name", &request.customer_name),
            ("customer_phone", &request.customer_phone),
            ("delivery_address", &request.delivery_address),
        ] {
            if value.trim().is_empty() {
                return Err(FulfillmentError::InvalidArgument(format!("{} 不能为空", field)));
            }
        }
        Ok(())
    }

    /// 查询当前价格并计算行小计
    fn price_lines(&self, request: &CreateOrderRequest) -> FulfillmentResult<Vec<PricedLine>> {
        request
            .items
            .iter()
            .map(|line| {
                let item = self.catalog.get_menu_item(line.menu_item_id)?;
                if item.restaurant_id != request.restaurant_id {
                    return Err(FulfillmentError::InvalidArgument(format!(
                        "菜品不属于该餐厅: menu_item_id={}, restaurant_id={}",
                        item.menu_item_id, request.restaurant_id
                    )));
                }
                let subtotal = item
                    .price
                    .checked_mul(Decimal::from(line.quantity))
                    .ok_or_else(|| {
                        FulfillmentError::InvalidArgument(format!(
                            "订单行金额超出可表示范围: menu_item_id={}, quantity={}",
                            item.menu_item_id, line.quantity
                        ))
                    })?;
                Ok(PricedLine {
                    menu_item_id: item.menu_item_id,
                    menu_item_name: item.name,
                    quantity: line.quantity,
                    unit_price: item.price,
                    subtotal,
                })
            })
            .collect()
    }

    // ==========================================
    // 状态流转
    // ==========================================

    /// 按转换表更新订单状态
    ///
    /// # 错误
    /// - `NotFound`: 订单不存在
    /// - `InvalidTransition`: 转换不在转换表内（含并发下状态已变更的情况）
    pub fn update_status(&self, order_id: i64, next: OrderStatus) -> FulfillmentResult<Order> {
        self.update_status_at(order_id, next, now_local())
    }

    #[instrument(skip(self))]
    pub fn update_status_at(
        &self,
        order_id: i64,
        next: OrderStatus,
        now: NaiveDateTime,
    ) -> FulfillmentResult<Order> {
        // 状态只前进，CAS 冲突时按最新状态重新判定
        loop {
            let current = self
                .order_repo
                .find_status(order_id)?
                .ok_or_else(|| FulfillmentError::not_found("Order", order_id))?;

            if !current.can_transition_to(next) {
                return Err(FulfillmentError::InvalidTransition {
                    from: current,
                    to: next,
                });
            }

            let applied = if next == OrderStatus::Cancelled {
                self.apply_cancel(order_id, current, now)?
            } else {
                self.order_repo
                    .update_status_cas(order_id, current, next, now)?
            };

            if applied {
                info!(order_id, from = %current, to = %next, "订单状态已更新");
                return self
                    .order_repo
                    .find_by_id(order_id)?
                    .ok_or_else(|| FulfillmentError::not_found("Order", order_id));
            }

            warn!(order_id, expected = %current, "订单状态已被并发修改，重新判定");
        }
    }

    fn apply_cancel(
        &self,
        order_id: i64,
        current: OrderStatus,
        now: NaiveDateTime,
    ) -> FulfillmentResult<bool> {
        let released = match self.order_repo.cancel_with_release(order_id, current, now)? {
            Some(lines) => lines,
            None => return Ok(false),
        };

        for line in &released {
            match line.stock_after {
                Some(stock_after) => info!(
                    order_id,
                    menu_item_id = line.menu_item_id,
                    quantity = line.quantity,
                    stock_after,
                    "取消订单回补库存"
                ),
                None => warn!(
                    order_id,
                    menu_item_id = line.menu_item_id,
                    quantity = line.quantity,
                    "菜品已删除，跳过库存回补"
                ),
            }
        }
        Ok(true)
    }

    /// 取消订单（等价于 update_status(order_id, CANCELLED)）
    pub fn cancel_order(&self, order_id: i64) -> FulfillmentResult<Order> {
        self.update_status(order_id, OrderStatus::Cancelled)
    }

    /// 营业判定（透传）
    pub fn availability(&self) -> &RestaurantAvailability {
        &self.availability
    }

    /// 库存账本（透传）
    pub fn ledger(&self) -> &StockLedger {
        &self.ledger
    }
}
