// ==========================================
// 外卖订单系统 - 引擎层仓储聚合
// ==========================================
// 职责: 聚合履约引擎所需的所有 Repository（共享同一连接）
// ==========================================

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::repository::{MenuItemRepository, OrderRepository, RestaurantRepository, StockRepository};

/// 履约引擎仓储集合
///
/// # 包含的仓储
/// - `restaurant_repo`: 餐厅
/// - `menu_item_repo`: 菜品
/// - `stock_repo`: 库存条件更新 + 流水
/// - `order_repo`: 订单聚合
#[derive(Clone)]
pub struct FulfillmentRepositories {
    pub restaurant_repo: Arc<RestaurantRepository>,
    pub menu_item_repo: Arc<MenuItemRepository>,
    pub stock_repo: Arc<StockRepository>,
    pub order_repo: Arc<OrderRepository>,
}

impl FulfillmentRepositories {
    /// 基于共享连接创建全部仓储
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self {
            restaurant_repo: Arc::new(RestaurantRepository::new(conn.clone())),
            menu_item_repo: Arc::new(MenuItemRepository::new(conn.clone())),
            stock_repo: Arc::new(StockRepository::new(conn.clone())),
            order_repo: Arc::new(OrderRepository::new(conn)),
        }
    }
}
