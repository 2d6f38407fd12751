// ==========================================
// 外卖订单系统 - 履约配置读取 Trait
// ==========================================
// 职责: 定义履约引擎所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use std::error::Error;

// ==========================================
// FulfillmentConfigReader Trait
// ==========================================
// 用途: 订单生命周期引擎所需的配置读取接口
// 实现者: ConfigManager（从 config_kv 表读取）、FulfillmentConfig（固定值）
pub trait FulfillmentConfigReader: Send + Sync {
    /// 订单号冲突时的最大插入尝试次数
    ///
    /// # 默认值
    /// - 5
    fn get_order_number_max_attempts(&self) -> Result<u32, Box<dyn Error>>;

    /// 补偿释放（回滚预占）的单行最大尝试次数，超过后上报 RollbackFailed
    ///
    /// # 默认值
    /// - 3
    fn get_rollback_max_attempts(&self) -> Result<u32, Box<dyn Error>>;

    /// 单笔订单最多订单行数
    ///
    /// # 默认值
    /// - 50
    fn get_max_line_items(&self) -> Result<usize, Box<dyn Error>>;
}

// ==========================================
// FulfillmentConfig - 固定配置
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FulfillmentConfig {
    pub order_number_max_attempts: u32,
    pub rollback_max_attempts: u32,
    pub max_line_items: usize,
}

impl Default for FulfillmentConfig {
    fn default() -> Self {
        Self {
            order_number_max_attempts: 5,
            rollback_max_attempts: 3,
            max_line_items: 50,
        }
    }
}

impl FulfillmentConfigReader for FulfillmentConfig {
    fn get_order_number_max_attempts(&self) -> Result<u32, Box<dyn Error>> {
        Ok(self.order_number_max_attempts)
    }

    fn get_rollback_max_attempts(&self) -> Result<u32, Box<dyn Error>> {
        Ok(self.rollback_max_attempts)
    }

    fn get_max_line_items(&self) -> Result<usize, Box<dyn Error>> {
        Ok(self.max_line_items)
    }
}
