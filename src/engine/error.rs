// ==========================================
// 外卖订单系统 - 履约引擎错误类型
// ==========================================
// 所有失败在 OrderLifecycle 边界以类型化结果返回
// RollbackFailed 为致命错误: 补偿释放重试耗尽，库存可能少计
// ==========================================

use crate::domain::types::OrderStatus;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// 未能回补的预占
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnreleasedReservation {
    pub menu_item_id: i64,
    pub quantity: i32,
}

#[derive(Error, Debug)]
pub enum FulfillmentError {
    #[error("资源未找到: {entity}(id={id})")]
    NotFound { entity: &'static str, id: String },

    #[error("参数非法: {0}")]
    InvalidArgument(String),

    #[error("库存不足: menu_item_id={menu_item_id}, requested={requested}")]
    InsufficientStock { menu_item_id: i64, requested: i32 },

    #[error("餐厅当前不接单: restaurant_id={restaurant_id}")]
    RestaurantClosed { restaurant_id: i64 },

    #[error("无效的状态转换: from={from} to={to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("订单号冲突: 连续 {attempts} 次生成的订单号均已存在")]
    DuplicateOrderNumber { attempts: u32 },

    #[error("库存补偿释放失败 (reference={reference}, 未回补={unreleased:?}): 触发原因: {cause}")]
    RollbackFailed {
        reference: String,
        unreleased: Vec<UnreleasedReservation>,
        cause: String,
    },

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl FulfillmentError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        FulfillmentError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// 调用方可通过重试恢复
    pub fn is_retryable(&self) -> bool {
        matches!(self, FulfillmentError::DuplicateOrderNumber { .. })
    }

    /// 需要人工介入/告警
    pub fn is_fatal(&self) -> bool {
        matches!(self, FulfillmentError::RollbackFailed { .. })
    }
}

/// Result 类型别名
pub type FulfillmentResult<T> = Result<T, FulfillmentError>;
