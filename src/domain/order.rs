// ==========================================
// 外卖订单系统 - 订单聚合
// ==========================================
// Order + OrderItem 作为一个聚合整体创建、持久化
// 订单只通过状态转换变更，从不删除
// ==========================================

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::types::OrderStatus;

// ==========================================
// Order - 订单
// ==========================================
// 对齐: customer_order 表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: i64,
    pub order_number: String,        // ORD-<毫秒时间戳>-<8位大写随机串>，创建后不可变
    pub restaurant_id: i64,
    pub customer_name: String,
    pub customer_phone: String,
    pub delivery_address: String,
    pub items: Vec<OrderItem>,
    pub total_amount: Decimal,       // 行小计之和
    pub status: OrderStatus,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Order {
    /// 按行小计重新求和（用于校验 total_amount）
    pub fn items_total(&self) -> Decimal {
        self.items.iter().map(|item| item.subtotal).sum()
    }
}

// ==========================================
// OrderItem - 订单行
// ==========================================
// 对齐: order_item 表
// unit_price / menu_item_name 为下单时快照，菜品后续改价不影响历史订单
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub order_item_id: i64,
    pub order_id: i64,
    pub menu_item_id: i64,
    pub menu_item_name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub subtotal: Decimal,
}

// ==========================================
// 下单请求
// ==========================================

/// 下单行（菜品 + 数量）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLineRequest {
    pub menu_item_id: i64,
    pub quantity: i32,
}

/// 下单请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    pub restaurant_id: i64,
    pub customer_name: String,
    pub customer_phone: String,
    pub delivery_address: String,
    pub items: Vec<OrderLineRequest>,
    pub notes: Option<String>,
}

// ==========================================
// 待持久化的订单（尚未分配 ID）
// ==========================================

/// 已定价的订单行（价格快照完成，尚未入库）
#[derive(Debug, Clone, PartialEq)]
pub struct PricedLine {
    pub menu_item_id: i64,
    pub menu_item_name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub subtotal: Decimal,
}

/// 待写入的订单聚合
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub order_number: String,
    pub restaurant_id: i64,
    pub customer_name: String,
    pub customer_phone: String,
    pub delivery_address: String,
    pub lines: Vec<PricedLine>,
    pub total_amount: Decimal,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
}
