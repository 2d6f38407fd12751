// ==========================================
// 外卖订单系统 - 领域类型定义
// ==========================================
// 订单状态机与库存流水类型
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==========================================
// 订单状态 (Order Status)
// ==========================================
// 序列化格式: SCREAMING_SNAKE_CASE (与数据库一致)
// 正向流转: PENDING → CONFIRMED → PREPARING → READY → DELIVERING → DELIVERED
// 取消: 仅 PENDING / CONFIRMED 可取消
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,    // 待确认
    Confirmed,  // 已确认
    Preparing,  // 备餐中
    Ready,      // 待取餐
    Delivering, // 配送中
    Delivered,  // 已送达
    Cancelled,  // 已取消
}

impl OrderStatus {
    /// 全部状态（按生命周期顺序）
    pub const ALL: [OrderStatus; 7] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Preparing,
        OrderStatus::Ready,
        OrderStatus::Delivering,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    /// 状态转换表: 当前状态 → 允许的下一状态集合
    pub fn allowed_next(self) -> &'static [OrderStatus] {
        match self {
            OrderStatus::Pending => &[OrderStatus::Confirmed, OrderStatus::Cancelled],
            OrderStatus::Confirmed => &[OrderStatus::Preparing, OrderStatus::Cancelled],
            OrderStatus::Preparing => &[OrderStatus::Ready],
            OrderStatus::Ready => &[OrderStatus::Delivering],
            OrderStatus::Delivering => &[OrderStatus::Delivered],
            OrderStatus::Delivered | OrderStatus::Cancelled => &[],
        }
    }

    /// 是否允许转换到目标状态
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        self.allowed_next().contains(&next)
    }

    /// 终态: 不允许任何后续转换
    pub fn is_terminal(self) -> bool {
        self.allowed_next().is_empty()
    }

    /// 转换为数据库字符串
    pub fn to_db_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Confirmed => "CONFIRMED",
            OrderStatus::Preparing => "PREPARING",
            OrderStatus::Ready => "READY",
            OrderStatus::Delivering => "DELIVERING",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }

    /// 从数据库字符串解析
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(OrderStatus::Pending),
            "CONFIRMED" => Some(OrderStatus::Confirmed),
            "PREPARING" => Some(OrderStatus::Preparing),
            "READY" => Some(OrderStatus::Ready),
            "DELIVERING" => Some(OrderStatus::Delivering),
            "DELIVERED" => Some(OrderStatus::Delivered),
            "CANCELLED" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_db_str(s.trim().to_uppercase().as_str())
            .ok_or_else(|| format!("未知订单状态: {}", s))
    }
}

// ==========================================
// 库存流水类型 (Stock Movement Type)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StockMovementType {
    Reserve, // 预占（扣减）
    Release, // 释放（回补）
}

impl StockMovementType {
    pub fn to_db_str(self) -> &'static str {
        match self {
            StockMovementType::Reserve => "RESERVE",
            StockMovementType::Release => "RELEASE",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "RESERVE" => Some(StockMovementType::Reserve),
            "RELEASE" => Some(StockMovementType::Release),
            _ => None,
        }
    }
}

impl fmt::Display for StockMovementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_chain_is_strict() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Confirmed));
        assert!(OrderStatus::Confirmed.can_transition_to(OrderStatus::Preparing));
        assert!(OrderStatus::Preparing.can_transition_to(OrderStatus::Ready));
        assert!(OrderStatus::Ready.can_transition_to(OrderStatus::Delivering));
        assert!(OrderStatus::Delivering.can_transition_to(OrderStatus::Delivered));

        // 不允许跳级
        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Delivered));
        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Preparing));
        assert!(!OrderStatus::Confirmed.can_transition_to(OrderStatus::Ready));
        // 不允许回退
        assert!(!OrderStatus::Ready.can_transition_to(OrderStatus::Preparing));
    }

    #[test]
    fn test_cancel_only_from_pending_or_confirmed() {
        for status in OrderStatus::ALL {
            let expected = matches!(status, OrderStatus::Pending | OrderStatus::Confirmed);
            assert_eq!(
                status.can_transition_to(OrderStatus::Cancelled),
                expected,
                "{} → CANCELLED",
                status
            );
        }
    }

    #[test]
    fn test_terminal_states() {
        assert!(OrderStatus::Delivered.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        for next in OrderStatus::ALL {
            assert!(!OrderStatus::Delivered.can_transition_to(next));
            assert!(!OrderStatus::Cancelled.can_transition_to(next));
        }
        // 自环也不允许
        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Pending));
    }

    #[test]
    fn test_db_str_mapping() {
        for status in OrderStatus::ALL {
            assert_eq!(OrderStatus::from_db_str(status.to_db_str()), Some(status));
        }
        assert_eq!(OrderStatus::from_db_str("SHIPPED"), None);
        assert_eq!("confirmed".parse::<OrderStatus>(), Ok(OrderStatus::Confirmed));
        assert!("bogus".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&OrderStatus::Delivering).unwrap();
        assert_eq!(json, "\"DELIVERING\"");
        let parsed: OrderStatus = serde_json::from_str("\"CANCELLED\"").unwrap();
        assert_eq!(parsed, OrderStatus::Cancelled);
    }
}
