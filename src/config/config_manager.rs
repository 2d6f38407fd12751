// ==========================================
// 外卖订单系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::fulfillment_config_trait::{FulfillmentConfig, FulfillmentConfigReader};
use crate::db::open_sqlite_connection;
use rusqlite::{params, Connection};
use serde_json::json;
use std::collections::BTreeMap;
use std::error::Error;
use std::sync::{Arc, Mutex};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;
        crate::db::init_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 读取 global scope 的配置值
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_global_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 写入 global scope 的配置值（UPSERT）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value, updated_at) VALUES ('global', ?1, ?2, datetime('now'))
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        tracing::info!(config_key = key, value = value, "配置已更新");
        Ok(())
    }

    /// 读取正整数配置；缺失或格式错误时使用默认值
    fn get_positive_or_default<T>(&self, key: &str, default: T) -> Result<T, Box<dyn Error>>
    where
        T: std::str::FromStr + PartialOrd + Default + Copy,
    {
        let raw = match self.get_global_config_value(key)? {
            Some(v) => v,
            None => return Ok(default),
        };

        match raw.trim().parse::<T>() {
            Ok(v) if v > T::default() => Ok(v),
            _ => {
                tracing::warn!(config_key = key, raw_value = %raw, "配置值非法，使用默认值");
                Ok(default)
            }
        }
    }

    /// 获取所有配置的快照（JSON格式，按 key 排序）
    pub fn get_config_snapshot(&self) -> Result<String, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let mut stmt = conn.prepare(
            "SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key"
        )?;

        let mut config_map: BTreeMap<String, String> = BTreeMap::new();
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        Ok(serde_json::to_string(&json!(config_map))?)
    }

    /// 读取当前生效的履约配置（一次性快照）
    pub fn load_fulfillment_config(&self) -> Result<FulfillmentConfig, Box<dyn Error>> {
        Ok(FulfillmentConfig {
            order_number_max_attempts: self.get_order_number_max_attempts()?,
            rollback_max_attempts: self.get_rollback_max_attempts()?,
            max_line_items: self.get_max_line_items()?,
        })
    }
}

// ==========================================
// FulfillmentConfigReader Trait 实现
// ==========================================
impl FulfillmentConfigReader for ConfigManager {
    fn get_order_number_max_attempts(&self) -> Result<u32, Box<dyn Error>> {
        let default = FulfillmentConfig::default().order_number_max_attempts;
        self.get_positive_or_default(config_keys::ORDER_NUMBER_MAX_ATTEMPTS, default)
    }

    fn get_rollback_max_attempts(&self) -> Result<u32, Box<dyn Error>> {
        let default = FulfillmentConfig::default().rollback_max_attempts;
        self.get_positive_or_default(config_keys::STOCK_ROLLBACK_MAX_ATTEMPTS, default)
    }

    fn get_max_line_items(&self) -> Result<usize, Box<dyn Error>> {
        let default = FulfillmentConfig::default().max_line_items;
        self.get_positive_or_default(config_keys::ORDER_MAX_LINE_ITEMS, default)
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 订单号
    pub const ORDER_NUMBER_MAX_ATTEMPTS: &str = "order.number_max_attempts";

    // 补偿释放
    pub const STOCK_ROLLBACK_MAX_ATTEMPTS: &str = "stock.rollback_max_attempts";

    // 订单规模上限
    pub const ORDER_MAX_LINE_ITEMS: &str = "order.max_line_items";
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> ConfigManager {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::init_schema(&conn).unwrap();
        ConfigManager::from_connection(Arc::new(Mutex::new(conn))).unwrap()
    }

    #[test]
    fn test_defaults_when_missing() {
        let cfg = manager().load_fulfillment_config().unwrap();
        assert_eq!(cfg, FulfillmentConfig::default());
    }

    #[test]
    fn test_override_and_invalid_fallback() {
        let m = manager();
        m.set_global_config_value(config_keys::ORDER_NUMBER_MAX_ATTEMPTS, "8").unwrap();
        m.set_global_config_value(config_keys::STOCK_ROLLBACK_MAX_ATTEMPTS, "0").unwrap();
        m.set_global_config_value(config_keys::ORDER_MAX_LINE_ITEMS, "abc").unwrap();

        assert_eq!(m.get_order_number_max_attempts().unwrap(), 8);
        assert_eq!(m.get_rollback_max_attempts().unwrap(), 3);
        assert_eq!(m.get_max_line_items().unwrap(), 50);
    }

    #[test]
    fn test_snapshot_is_sorted_json() {
        let m = manager();
        m.set_global_config_value("b.key", "2").unwrap();
        m.set_global_config_value("a.key", "1").unwrap();
        assert_eq!(m.get_config_snapshot().unwrap(), r#"{"a.key":"1","b.key":"2"}"#);
    }
}
