// ==========================================
// 外卖订单系统 - 餐厅营业判定 (RestaurantAvailability)
// ==========================================
// 接单条件: is_active = true 且 时间落在营业窗口内（闭区间）
// 跨午夜窗口: closing < opening 时窗口为 [opening, 24:00) ∪ [00:00, closing]
// 判定精度为整秒（与订单时间戳一致）
// ==========================================

use crate::domain::restaurant::Restaurant;
use crate::engine::catalog::CatalogLookup;
use crate::engine::error::FulfillmentResult;
use crate::repository::codec::now_local;
use chrono::{NaiveTime, Timelike};
use std::sync::Arc;

/// 营业窗口判定（闭区间，支持跨午夜）
pub fn is_within_operating_hours(opening: NaiveTime, closing: NaiveTime, at: NaiveTime) -> bool {
    let at = at.with_nanosecond(0).unwrap_or(at);
    if closing >= opening {
        opening <= at && at <= closing
    } else {
        at >= opening || at <= closing
    }
}

pub struct RestaurantAvailability {
    catalog: Arc<dyn CatalogLookup>,
}

impl RestaurantAvailability {
    pub fn new(catalog: Arc<dyn CatalogLookup>) -> Self {
        Self { catalog }
    }

    /// 指定墙钟时间是否接单
    ///
    /// # 错误
    /// - `NotFound`: 餐厅不存在
    pub fn is_open(&self, restaurant_id: i64, at: NaiveTime) -> FulfillmentResult<bool> {
        let restaurant = self.catalog.get_restaurant(restaurant_id)?;
        Ok(Self::accepts_orders(&restaurant, at))
    }

    /// 按服务器本地墙钟判断当前是否接单
    pub fn is_open_now(&self, restaurant_id: i64) -> FulfillmentResult<bool> {
        self.is_open(restaurant_id, now_local().time())
    }

    /// 已加载餐厅的接单判定
    pub fn accepts_orders(restaurant: &Restaurant, at: NaiveTime) -> bool {
        restaurant.is_active
            && is_within_operating_hours(restaurant.opening_time, restaurant.closing_time, at)
    }
}
