// ==========================================
// 外卖订单系统 - 行数据编解码
// ==========================================
// 金额: 十进制字符串 ↔ Decimal
// 时间: "%H:%M:%S" ↔ NaiveTime, "%Y-%m-%d %H:%M:%S" ↔ NaiveDateTime
// ==========================================

use chrono::{NaiveDateTime, NaiveTime, Timelike};
use rusqlite::types::Type;
use rust_decimal::Decimal;
use std::str::FromStr;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const TIME_FORMAT: &str = "%H:%M:%S";

fn conversion_error(idx: usize, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, message.into())
}

pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

pub fn format_time(t: &NaiveTime) -> String {
    t.format(TIME_FORMAT).to_string()
}

pub fn format_money(value: &Decimal) -> String {
    value.to_string()
}

/// 读取时间戳列
pub fn timestamp_at(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<NaiveDateTime> {
    let raw: String = row.get(idx)?;
    NaiveDateTime::parse_from_str(&raw, TIMESTAMP_FORMAT)
        .map_err(|e| conversion_error(idx, format!("时间戳格式错误 '{}': {}", raw, e)))
}

/// 读取墙钟时间列
pub fn time_at(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<NaiveTime> {
    let raw: String = row.get(idx)?;
    NaiveTime::parse_from_str(&raw, TIME_FORMAT)
        .map_err(|e| conversion_error(idx, format!("时间格式错误 '{}': {}", raw, e)))
}

/// 读取金额列
pub fn money_at(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<Decimal> {
    let raw: String = row.get(idx)?;
    Decimal::from_str(&raw)
        .map_err(|e| conversion_error(idx, format!("金额格式错误 '{}': {}", raw, e)))
}

/// 当前本地墙钟时间（截断到秒，与存储精度一致）
pub fn now_local() -> NaiveDateTime {
    let now = chrono::Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_local_has_second_precision() {
        let now = now_local();
        assert_eq!(
            NaiveDateTime::parse_from_str(&format_timestamp(&now), TIMESTAMP_FORMAT).unwrap(),
            now
        );
    }

    #[test]
    fn test_money_keeps_scale() {
        let price = Decimal::from_str("50.00").unwrap();
        assert_eq!(format_money(&price), "50.00");
        assert_eq!(format_money(&(price * Decimal::from(3))), "150.00");
    }
}
