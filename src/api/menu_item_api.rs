// ==========================================
// 外卖订单系统 - 菜品 API
// ==========================================
// 职责: 菜品 CRUD 与目录查询
// 红线: 更新接口不修改库存，库存只经由 StockApi / 订单流程变动
// ==========================================

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::info;

use crate::api::error::{ApiError, ApiResult};
use crate::domain::menu_item::{MenuItem, MenuItemDraft, MenuItemPatch};
use crate::perf::PerfGuard;
use crate::repository::codec::now_local;
use crate::repository::{MenuItemRepository, RestaurantRepository};

/// 价格最多两位小数
const MAX_PRICE_SCALE: u32 = 2;

/// 单价上限（整数部分）
const MAX_PRICE_UNITS: i64 = 100_000;

pub struct MenuItemApi {
    menu_item_repo: Arc<MenuItemRepository>,
    restaurant_repo: Arc<RestaurantRepository>,
}

impl MenuItemApi {
    /// 创建新的MenuItemApi实例
    pub fn new(menu_item_repo: Arc<MenuItemRepository>, restaurant_repo: Arc<RestaurantRepository>) -> Self {
        Self {
            menu_item_repo,
            restaurant_repo,
        }
    }

    fn validate_name(name: &str) -> ApiResult<String> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ApiError::InvalidInput("菜品名称不能为空".to_string()));
        }
        Ok(name.to_string())
    }

    fn validate_price(price: Decimal) -> ApiResult<()> {
        if price <= Decimal::ZERO {
            return Err(ApiError::InvalidInput(format!("价格必须大于 0: {}", price)));
        }
        if price > Decimal::from(MAX_PRICE_UNITS) {
            return Err(ApiError::InvalidInput(format!(
                "价格不能超过 {}: {}",
                MAX_PRICE_UNITS, price
            )));
        }
        if price.normalize().scale() > MAX_PRICE_SCALE {
            return Err(ApiError::InvalidInput(format!("价格最多两位小数: {}", price)));
        }
        Ok(())
    }

    fn require(&self, menu_item_id: i64) -> ApiResult<MenuItem> {
        self.menu_item_repo
            .find_by_id(menu_item_id)?
            .ok_or_else(|| ApiError::NotFound(format!("MenuItem(id={})不存在", menu_item_id)))
    }

    // ==========================================
    // 写操作
    // ==========================================

    /// 新建菜品
    pub fn create_menu_item(&self, restaurant_id: i64, draft: &MenuItemDraft) -> ApiResult<MenuItem> {
        let _perf = PerfGuard::new("menu_item_api.create_menu_item");
        let name = Self::validate_name(&draft.name)?;
        Self::validate_price(draft.price)?;
        if draft.stock_quantity < 0 {
            return Err(ApiError::InvalidInput(format!("初始库存不能为负: {}", draft.stock_quantity)));
        }
        if self.restaurant_repo.find_by_id(restaurant_id)?.is_none() {
            return Err(ApiError::NotFound(format!("Restaurant(id={})不存在", restaurant_id)));
        }

        let mut draft = draft.clone();
        draft.name = name;
        let menu_item_id = self.menu_item_repo.insert(restaurant_id, &draft, now_local())?;
        info!(menu_item_id, restaurant_id, stock = draft.stock_quantity, "菜品已创建");
        self.require(menu_item_id)
    }

    /// 更新菜品（不含库存）
    pub fn update_menu_item(&self, menu_item_id: i64, patch: &MenuItemPatch) -> ApiResult<MenuItem> {
        let _perf = PerfGuard::new("menu_item_api.update_menu_item");
        let name = Self::validate_name(&patch.name)?;
        Self::validate_price(patch.price)?;

        let mut patch = patch.clone();
        patch.name = name;
        self.menu_item_repo.update(menu_item_id, &patch, now_local())?;
        self.require(menu_item_id)
    }

    /// 删除菜品（硬删除；历史订单保留名称与价格快照）
    pub fn delete_menu_item(&self, menu_item_id: i64) -> ApiResult<()> {
        let _perf = PerfGuard::new("menu_item_api.delete_menu_item");
        self.menu_item_repo.delete(menu_item_id)?;
        info!(menu_item_id, "菜品已删除");
        Ok(())
    }

    // ==========================================
    // 查询
    // ==========================================

    pub fn get_menu_item(&self, menu_item_id: i64) -> ApiResult<MenuItem> {
        self.require(menu_item_id)
    }

    pub fn list_by_restaurant(&self, restaurant_id: i64) -> ApiResult<Vec<MenuItem>> {
        Ok(self.menu_item_repo.find_by_restaurant(restaurant_id)?)
    }

    /// 上架菜品
    pub fn list_available_by_restaurant(&self, restaurant_id: i64) -> ApiResult<Vec<MenuItem>> {
        Ok(self.menu_item_repo.find_available_by_restaurant(restaurant_id)?)
    }

    pub fn list_by_category(&self, category: &str) -> ApiResult<Vec<MenuItem>> {
        let category = category.trim();
        if category.is_empty() {
            return Err(ApiError::InvalidInput("分类不能为空".to_string()));
        }
        Ok(self.menu_item_repo.find_by_category(category)?)
    }

    /// 价格区间（闭区间）
    pub fn list_by_price_range(&self, min_price: Decimal, max_price: Decimal) -> ApiResult<Vec<MenuItem>> {
        if min_price < Decimal::ZERO || min_price > max_price {
            return Err(ApiError::InvalidInput(format!(
                "价格区间非法: [{}, {}]",
                min_price, max_price
            )));
        }
        Ok(self.menu_item_repo.find_by_price_range(min_price, max_price)?)
    }
}
