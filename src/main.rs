// ==========================================
// 外卖订单系统 - 服务入口
// ==========================================
// 初始化日志、数据库与全部 API，输出当前库存/订单概况
// HTTP 层由外部服务挂载 AppState
// ==========================================

use anyhow::anyhow;
use food_delivery::app::{get_default_db_path, AppState};
use food_delivery::OrderStatus;

fn main() -> anyhow::Result<()> {
    // 初始化日志系统
    food_delivery::logging::init();

    tracing::info!("==================================================");
    tracing::info!("{} - 订单履约核心", food_delivery::APP_NAME);
    tracing::info!("系统版本: {}", food_delivery::VERSION);
    tracing::info!("==================================================");

    let db_path = get_default_db_path();
    tracing::info!("使用数据库: {}", db_path);

    let state = AppState::new(db_path).map_err(|e| anyhow!(e))?;

    let restaurants = state.restaurant_api.list_active_restaurants()?;
    tracing::info!(count = restaurants.len(), "营业中餐厅");
    for status in OrderStatus::ALL {
        let count = state.order_api.count_orders_by_status(status)?;
        tracing::info!(status = %status, count, "订单统计");
    }

    let config_snapshot = state
        .config_manager
        .get_config_snapshot()
        .map_err(|e| anyhow!(e.to_string()))?;
    tracing::info!(config = %config_snapshot, "当前配置");

    Ok(())
}
