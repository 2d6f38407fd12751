// ==========================================
// 外卖订单系统 - 菜品领域模型
// ==========================================
// 红线: stock_quantity >= 0，且订单流程只能通过 StockLedger 修改库存
// ==========================================

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::types::StockMovementType;

// ==========================================
// MenuItem - 菜品
// ==========================================
// 对齐: menu_item 表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub menu_item_id: i64,
    pub restaurant_id: i64,          // 所属餐厅（引用，不拥有）
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,              // 单价（定点小数，> 0）
    pub category: Option<String>,
    pub is_available: bool,          // 上架标记
    pub stock_quantity: i32,         // 库存（>= 0）
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl MenuItem {
    /// 上架且库存足够（仅用于预检，不构成并发保证）
    pub fn can_fulfill(&self, quantity: i32) -> bool {
        self.is_available && self.stock_quantity >= quantity
    }
}

// ==========================================
// MenuItemDraft - 菜品创建载荷
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItemDraft {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub category: Option<String>,
    pub is_available: bool,
    pub stock_quantity: i32, // 初始库存，创建后只能经由 StockLedger 变动
}

// ==========================================
// MenuItemPatch - 菜品更新载荷
// ==========================================
/// 不包含库存字段
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItemPatch {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub category: Option<String>,
    pub is_available: bool,
}

// ==========================================
// StockMovement - 库存流水
// ==========================================
// 对齐: stock_movement 表（每次预占/释放各一行）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockMovement {
    pub movement_id: i64,
    pub menu_item_id: i64,
    pub movement_type: StockMovementType,
    pub quantity: i32,
    pub stock_after: i32,            // 变动后的库存
    pub reference: Option<String>,   // 订单号或调用方标记
    pub created_at: NaiveDateTime,
}
