// ==========================================
// 外卖订单系统 - 餐厅 API
// ==========================================
// 职责: 餐厅 CRUD（软删除）、名称检索、营业判定
// ==========================================

use std::sync::Arc;

use chrono::NaiveTime;
use tracing::info;

use crate::api::error::{ApiError, ApiResult};
use crate::domain::restaurant::{Restaurant, RestaurantDraft};
use crate::engine::RestaurantAvailability;
use crate::perf::PerfGuard;
use crate::repository::codec::now_local;
use crate::repository::RestaurantRepository;

pub struct RestaurantApi {
    restaurant_repo: Arc<RestaurantRepository>,
    availability: Arc<RestaurantAvailability>,
}

impl RestaurantApi {
    /// 创建新的RestaurantApi实例
    pub fn new(restaurant_repo: Arc<RestaurantRepository>, availability: Arc<RestaurantAvailability>) -> Self {
        Self {
            restaurant_repo,
            availability,
        }
    }

    /// 规范化并校验载荷，返回去除首尾空白后的副本
    fn normalize(draft: &RestaurantDraft) -> ApiResult<RestaurantDraft> {
        let name = draft.name.trim();
        if name.is_empty() {
            return Err(ApiError::InvalidInput("餐厅名称不能为空".to_string()));
        }

        let mut normalized = draft.clone();
        normalized.name = name.to_string();
        Ok(normalized)
    }

    fn require(&self, restaurant_id: i64) -> ApiResult<Restaurant> {
        self.restaurant_repo
            .find_by_id(restaurant_id)?
            .ok_or_else(|| ApiError::NotFound(format!("Restaurant(id={})不存在", restaurant_id)))
    }

    // ==========================================
    // 写操作
    // ==========================================

    /// 新建餐厅（名称不区分大小写唯一）
    pub fn create_restaurant(&self, draft: &RestaurantDraft) -> ApiResult<Restaurant> {
        let _perf = PerfGuard::new("restaurant_api.create_restaurant");
        let draft = Self::normalize(draft)?;

        if self.restaurant_repo.exists_by_name_ignore_case(&draft.name, None)? {
            return Err(ApiError::BusinessRuleViolation(format!("餐厅名称已存在: {}", draft.name)));
        }

        let restaurant_id = self.restaurant_repo.insert(&draft, now_local())?;
        info!(restaurant_id, name = %draft.name, "餐厅已创建");
        self.require(restaurant_id)
    }

    /// 整体更新餐厅信息
    pub fn update_restaurant(&self, restaurant_id: i64, draft: &RestaurantDraft) -> ApiResult<Restaurant> {
        let _perf = PerfGuard::new("restaurant_api.update_restaurant");
        let draft = Self::normalize(draft)?;
        self.require(restaurant_id)?;

        if self
            .restaurant_repo
            .exists_by_name_ignore_case(&draft.name, Some(restaurant_id))?
        {
            return Err(ApiError::BusinessRuleViolation(format!("餐厅名称已存在: {}", draft.name)));
        }

        self.restaurant_repo.update(restaurant_id, &draft, now_local())?;
        self.require(restaurant_id)
    }

    /// 停用餐厅（软删除，菜品保留）
    pub fn deactivate_restaurant(&self, restaurant_id: i64) -> ApiResult<Restaurant> {
        let _perf = PerfGuard::new("restaurant_api.deactivate_restaurant");
        self.restaurant_repo.set_active(restaurant_id, false, now_local())?;
        info!(restaurant_id, "餐厅已停用");
        self.require(restaurant_id)
    }

    // ==========================================
    // 查询
    // ==========================================

    pub fn get_restaurant(&self, restaurant_id: i64) -> ApiResult<Restaurant> {
        self.require(restaurant_id)
    }

    pub fn list_restaurants(&self) -> ApiResult<Vec<Restaurant>> {
        Ok(self.restaurant_repo.find_all()?)
    }

    pub fn list_active_restaurants(&self) -> ApiResult<Vec<Restaurant>> {
        Ok(self.restaurant_repo.find_active()?)
    }

    /// 有上架菜品可点的营业中餐厅
    pub fn list_restaurants_with_available_items(&self) -> ApiResult<Vec<Restaurant>> {
        Ok(self.restaurant_repo.find_with_available_items()?)
    }

    /// 名称检索（不区分大小写的包含匹配）
    pub fn search_restaurants(&self, keyword: &str) -> ApiResult<Vec<Restaurant>> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Err(ApiError::InvalidInput("检索关键字不能为空".to_string()));
        }
        Ok(self.restaurant_repo.search_by_name(keyword)?)
    }

    // ==========================================
    // 营业判定
    // ==========================================

    /// 当前（服务器本地墙钟）是否接单
    pub fn is_open(&self, restaurant_id: i64) -> ApiResult<bool> {
        Ok(self.availability.is_open_now(restaurant_id)?)
    }

    /// 指定墙钟时间是否接单
    pub fn is_open_at(&self, restaurant_id: i64, at: NaiveTime) -> ApiResult<bool> {
        Ok(self.availability.is_open(restaurant_id, at)?)
    }
}
