// ==========================================
// 外卖订单系统 - 配置层
// ==========================================
// 职责: 履约参数管理（订单号重试、补偿重试、订单规模上限）
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod fulfillment_config_trait;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigManager};
pub use fulfillment_config_trait::{FulfillmentConfig, FulfillmentConfigReader};
