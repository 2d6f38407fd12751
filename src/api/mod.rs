// ==========================================
// 外卖订单系统 - API 层
// ==========================================
// 职责: 向外层（HTTP 等）暴露履约与目录操作
// ==========================================

pub mod error;
pub mod menu_item_api;
pub mod order_api;
pub mod restaurant_api;
pub mod stock_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use menu_item_api::MenuItemApi;
pub use order_api::OrderApi;
pub use restaurant_api::RestaurantApi;
pub use stock_api::StockApi;
