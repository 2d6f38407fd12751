// ==========================================
// 外卖订单系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、状态转换表
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod menu_item;
pub mod order;
pub mod restaurant;
pub mod types;

// 重导出核心类型
pub use menu_item::{MenuItem, MenuItemDraft, MenuItemPatch, StockMovement};
pub use order::{CreateOrderRequest, NewOrder, Order, OrderItem, OrderLineRequest, PricedLine};
pub use restaurant::{Restaurant, RestaurantDraft};
pub use types::{OrderStatus, StockMovementType};
