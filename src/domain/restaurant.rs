// ==========================================
// 外卖订单系统 - 餐厅领域模型
// ==========================================
// 餐厅只做软删除（is_active = false），不级联删除菜品
// ==========================================

use chrono::{NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

// ==========================================
// Restaurant - 餐厅
// ==========================================
// 对齐: restaurant 表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Restaurant {
    pub restaurant_id: i64,
    pub name: String,                // 餐厅名称（不区分大小写唯一）
    pub description: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub is_active: bool,             // 营业标记（软删除即置 false）
    pub opening_time: NaiveTime,     // 开门时间（本地墙钟，无时区）
    pub closing_time: NaiveTime,     // 打烊时间（可早于开门时间，表示跨夜）
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Restaurant {
    /// 是否为跨夜营业窗口（打烊时间数值上早于开门时间，例如 18:00 - 02:00）
    pub fn has_overnight_window(&self) -> bool {
        self.closing_time < self.opening_time
    }
}

// ==========================================
// RestaurantDraft - 餐厅创建/更新载荷
// ==========================================
/// 创建与整体更新共用同一载荷（更新时全部字段覆盖）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestaurantDraft {
    pub name: String,
    pub description: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub is_active: bool,
    pub opening_time: NaiveTime,
    pub closing_time: NaiveTime,
}

impl RestaurantDraft {
    /// 以默认营业状态（active）构造载荷
    pub fn new(name: impl Into<String>, opening_time: NaiveTime, closing_time: NaiveTime) -> Self {
        Self {
            name: name.into(),
            description: None,
            address: None,
            phone: None,
            is_active: true,
            opening_time,
            closing_time,
        }
    }
}
