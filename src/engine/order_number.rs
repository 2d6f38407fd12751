// ==========================================
// 外卖订单系统 - 订单号生成
// ==========================================
// 格式: ORD-<毫秒时间戳>-<8位大写随机串>
// 唯一性由 customer_order.order_number 唯一约束兜底，冲突时换号重试
// ==========================================

use uuid::Uuid;

pub const ORDER_NUMBER_PREFIX: &str = "ORD";
pub const TOKEN_LEN: usize = 8;

const TOKEN_ALPHABET: &[u8; 36] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// 订单号来源
pub trait OrderNumberSource: Send + Sync {
    fn next_order_number(&self) -> String;
}

/// 时间戳 + 随机串生成器
#[derive(Debug, Default, Clone, Copy)]
pub struct OrderNumberGenerator;

impl OrderNumberGenerator {
    pub fn new() -> Self {
        Self
    }

    /// 以指定毫秒时间戳生成订单号
    pub fn generate_at(&self, epoch_millis: i64) -> String {
        format!("{}-{}-{}", ORDER_NUMBER_PREFIX, epoch_millis, random_token())
    }
}

impl OrderNumberSource for OrderNumberGenerator {
    fn next_order_number(&self) -> String {
        self.generate_at(chrono::Utc::now().timestamp_millis())
    }
}

/// 8 位 [A-Z0-9] 随机串，取自 UUID v4 的低位随机比特
fn random_token() -> String {
    let mut bits = Uuid::new_v4().as_u128();
    let mut token = String::with_capacity(TOKEN_LEN);
    for _ in 0..TOKEN_LEN {
        token.push(TOKEN_ALPHABET[(bits % 36) as usize] as char);
        bits /= 36;
    }
    token
}

/// 校验订单号格式
pub fn is_valid_order_number(value: &str) -> bool {
    let mut parts = value.splitn(3, '-');
    let (prefix, millis, token) = match (parts.next(), parts.next(), parts.next()) {
        (Some(p), Some(m), Some(t)) => (p, m, t),
        _ => return false,
    };

    prefix == ORDER_NUMBER_PREFIX
        && !millis.is_empty()
        && millis.bytes().all(|b| b.is_ascii_digit())
        && token.len() == TOKEN_LEN
        && token.bytes().all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_format() {
        let number = OrderNumberGenerator::new().generate_at(1_700_000_000_123);
        assert!(number.starts_with("ORD-1700000000123-"), "{}", number);
        assert!(is_valid_order_number(&number), "{}", number);
    }

    #[test]
    fn test_unique_within_same_millisecond() {
        let generator = OrderNumberGenerator::new();
        let numbers: HashSet<String> = (0..10_000).map(|_| generator.generate_at(1_700_000_000_000)).collect();
        assert_eq!(numbers.len(), 10_000);
    }

    #[test]
    fn test_rejects_malformed_numbers() {
        assert!(!is_valid_order_number("ORD-123-abcdefgh"));
        assert!(!is_valid_order_number("ORD-123-ABCDEFG"));
        assert!(!is_valid_order_number("ORX-123-ABCDEFGH"));
        assert!(!is_valid_order_number("ORD--ABCDEFGH"));
        assert!(!is_valid_order_number("ORD-12a-ABCDEFGH"));
        assert!(!is_valid_order_number("ORD-123"));
    }
}
