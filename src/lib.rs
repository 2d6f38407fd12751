// ==========================================
// 外卖订单系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 核心: 库存一致的订单履约（原子库存账本 + 订单状态机）
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 业务规则
pub mod engine;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// SQL 性能观测
pub mod perf;

// API 层 - 业务接口
pub mod api;

// 应用层 - 组装
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{OrderStatus, StockMovementType};

// 领域实体
pub use domain::{
    CreateOrderRequest, MenuItem, MenuItemDraft, MenuItemPatch, Order, OrderItem,
    OrderLineRequest, Restaurant, RestaurantDraft, StockMovement,
};

// 引擎
pub use engine::{
    FulfillmentError, FulfillmentResult, OrderLifecycle, RestaurantAvailability, StockLedger,
};

// API
pub use api::{ApiError, ApiResult, MenuItemApi, OrderApi, RestaurantApi, StockApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "外卖订单系统";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
        assert_eq!(APP_NAME, "外卖订单系统");
    }
}
