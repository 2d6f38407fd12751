// ==========================================
// 外卖订单系统 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，转换Repository/引擎错误为类型化结果
// 不做任何 HTTP 状态码映射，由外层决定
// ==========================================

use crate::engine::error::{FulfillmentError, UnreleasedReservation};
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 履约错误
    // ==========================================
    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("库存不足: menu_item_id={menu_item_id}, requested={requested}")]
    InsufficientStock { menu_item_id: i64, requested: i32 },

    #[error("餐厅当前不接单: restaurant_id={restaurant_id}")]
    RestaurantClosed { restaurant_id: i64 },

    #[error("无效的状态转换: from={from} to={to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("订单号冲突，请重试: {0}")]
    DuplicateOrderNumber(String),

    /// 致命: 库存补偿失败，需要告警与人工处理
    #[error("库存回滚失败: reference={reference}, 未回补={unreleased:?}, 原因={cause}")]
    RollbackFailed {
        reference: String,
        unreleased: Vec<UnreleasedReservation>,
        cause: String,
    },

    // ==========================================
    // 业务规则错误
    // ==========================================
    #[error("业务规则违反: {0}")]
    BusinessRuleViolation(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    #[error("数据库事务失败: {0}")]
    DatabaseTransactionError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseTransactionError(msg) => ApiError::DatabaseTransactionError(msg),
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("唯一约束违反: {}", msg))
            }
            RepositoryError::ForeignKeyViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("外键约束违反: {}", msg))
            }
            RepositoryError::CheckConstraintViolation(msg) => {
                ApiError::InvalidInput(format!("约束校验失败: {}", msg))
            }
            RepositoryError::StockOverflow {
                menu_item_id,
                quantity,
            } => ApiError::InvalidInput(format!(
                "回补后库存超出上限: menu_item_id={}, quantity={}",
                menu_item_id, quantity
            )),
            RepositoryError::FieldValueError { field, message } => {
                ApiError::InvalidInput(format!("字段{}错误: {}", field, message))
            }
            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

// ==========================================
// 从 FulfillmentError 转换
// ==========================================
impl From<FulfillmentError> for ApiError {
    fn from(err: FulfillmentError) -> Self {
        match err {
            FulfillmentError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            FulfillmentError::InvalidArgument(msg) => ApiError::InvalidInput(msg),
            FulfillmentError::InsufficientStock {
                menu_item_id,
                requested,
            } => ApiError::InsufficientStock {
                menu_item_id,
                requested,
            },
            FulfillmentError::RestaurantClosed { restaurant_id } => {
                ApiError::RestaurantClosed { restaurant_id }
            }
            FulfillmentError::InvalidTransition { from, to } => ApiError::InvalidStateTransition {
                from: from.to_string(),
                to: to.to_string(),
            },
            err @ FulfillmentError::DuplicateOrderNumber { .. } => {
                ApiError::DuplicateOrderNumber(err.to_string())
            }
            FulfillmentError::RollbackFailed {
                reference,
                unreleased,
                cause,
            } => ApiError::RollbackFailed {
                reference,
                unreleased,
                cause,
            },
            FulfillmentError::Repository(e) => ApiError::from(e),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::OrderStatus;

    #[test]
    fn test_fulfillment_errors_stay_typed() {
        let err: ApiError = FulfillmentError::InvalidTransition {
            from: OrderStatus::Cancelled,
            to: OrderStatus::Cancelled,
        }
        .into();
        match err {
            ApiError::InvalidStateTransition { from, to } => {
                assert_eq!(from, "CANCELLED");
                assert_eq!(to, "CANCELLED");
            }
            other => panic!("unexpected: {:?}", other),
        }

        let err: ApiError = FulfillmentError::Repository(RepositoryError::not_found("Order", 7)).into();
        assert!(matches!(err, ApiError::NotFound(msg) if msg.contains("Order(id=7)")));
    }
}
