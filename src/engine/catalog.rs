// ==========================================
// 外卖订单系统 - 目录查询接口 (Catalog)
// ==========================================
// 履约核心对餐厅/菜品只读；CRUD 由 API 层负责
// ==========================================

use crate::domain::menu_item::MenuItem;
use crate::domain::restaurant::Restaurant;
use crate::engine::error::{FulfillmentError, FulfillmentResult};
use crate::repository::{MenuItemRepository, RestaurantRepository};
use std::sync::Arc;

// ==========================================
// CatalogLookup Trait
// ==========================================
// 实现者: RepositoryCatalog（SQLite）
pub trait CatalogLookup: Send + Sync {
    /// 查询餐厅，不存在时返回 NotFound
    fn get_restaurant(&self, restaurant_id: i64) -> FulfillmentResult<Restaurant>;

    /// 查询菜品，不存在时返回 NotFound
    fn get_menu_item(&self, menu_item_id: i64) -> FulfillmentResult<MenuItem>;
}

pub struct RepositoryCatalog {
    restaurant_repo: Arc<RestaurantRepository>,
    menu_item_repo: Arc<MenuItemRepository>,
}

impl RepositoryCatalog {
    pub fn new(restaurant_repo: Arc<RestaurantRepository>, menu_item_repo: Arc<MenuItemRepository>) -> Self {
        Self {
            restaurant_repo,
            menu_item_repo,
        }
    }
}

impl CatalogLookup for RepositoryCatalog {
    fn get_restaurant(&self, restaurant_id: i64) -> FulfillmentResult<Restaurant> {
        self.restaurant_repo
            .find_by_id(restaurant_id)?
            .ok_or_else(|| FulfillmentError::not_found("Restaurant", restaurant_id))
    }

    fn get_menu_item(&self, menu_item_id: i64) -> FulfillmentResult<MenuItem> {
        self.menu_item_repo
            .find_by_id(menu_item_id)?
            .ok_or_else(|| FulfillmentError::not_found("MenuItem", menu_item_id))
    }
}
