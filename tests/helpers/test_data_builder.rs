// ==========================================
// 测试数据构建器 - 用于集成测试
// ==========================================
#![allow(dead_code)]

use chrono::NaiveTime;
use food_delivery::domain::{
    CreateOrderRequest, MenuItemDraft, OrderLineRequest, RestaurantDraft,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ==========================================
// Restaurant 构建器
// ==========================================

pub struct RestaurantBuilder {
    draft: RestaurantDraft,
}

impl RestaurantBuilder {
    /// 默认 09:00 - 22:00 营业
    pub fn new(name: &str) -> Self {
        Self {
            draft: RestaurantDraft::new(
                name,
                NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
                NaiveTime::from_hms_opt(22, 0, 0).unwrap(),
            ),
        }
    }

    pub fn hours(mut self, open: (u32, u32), close: (u32, u32)) -> Self {
        self.draft.opening_time = NaiveTime::from_hms_opt(open.0, open.1, 0).unwrap();
        self.draft.closing_time = NaiveTime::from_hms_opt(close.0, close.1, 0).unwrap();
        self
    }

    /// 00:00:00 - 23:59:59 全天营业（时间截断到秒，任意时刻均在窗口内）
    pub fn all_day(mut self) -> Self {
        self.draft.opening_time = NaiveTime::from_hms_opt(0, 0, 0).unwrap();
        self.draft.closing_time = NaiveTime::from_hms_opt(23, 59, 59).unwrap();
        self
    }

    pub fn inactive(mut self) -> Self {
        self.draft.is_active = false;
        self
    }

    pub fn address(mut self, address: &str) -> Self {
        self.draft.address = Some(address.to_string());
        self
    }

    pub fn build(self) -> RestaurantDraft {
        self.draft
    }
}

// ==========================================
// MenuItem 构建器
// ==========================================

pub struct MenuItemBuilder {
    draft: MenuItemDraft,
}

impl MenuItemBuilder {
    /// 默认价格 10.00、库存 10、上架
    pub fn new(name: &str) -> Self {
        Self {
            draft: MenuItemDraft {
                name: name.to_string(),
                description: None,
                price: dec!(10.00),
                category: None,
                is_available: true,
                stock_quantity: 10,
            },
        }
    }

    pub fn price(mut self, price: Decimal) -> Self {
        self.draft.price = price;
        self
    }

    pub fn stock(mut self, stock: i32) -> Self {
        self.draft.stock_quantity = stock;
        self
    }

    pub fn category(mut self, category: &str) -> Self {
        self.draft.category = Some(category.to_string());
        self
    }

    pub fn unavailable(mut self) -> Self {
        self.draft.is_available = false;
        self
    }

    pub fn build(self) -> MenuItemDraft {
        self.draft
    }
}

// ==========================================
// 下单请求构建器
// ==========================================

pub struct OrderRequestBuilder {
    request: CreateOrderRequest,
}

impl OrderRequestBuilder {
    pub fn new(restaurant_id: i64) -> Self {
        Self {
            request: CreateOrderRequest {
                restaurant_id,
                customer_name: "Alice".to_string(),
                customer_phone: "555-0100".to_string(),
                delivery_address: "1 Main St".to_string(),
                items: Vec::new(),
                notes: None,
            },
        }
    }

    pub fn line(mut self, menu_item_id: i64, quantity: i32) -> Self {
        self.request.items.push(OrderLineRequest {
            menu_item_id,
            quantity,
        });
        self
    }

    pub fn phone(mut self, phone: &str) -> Self {
        self.request.customer_phone = phone.to_string();
        self
    }

    pub fn notes(mut self, notes: &str) -> Self {
        self.request.notes = Some(notes.to_string());
        self
    }

    pub fn build(self) -> CreateOrderRequest {
        self.request
    }
}
