// ==========================================
// 外卖订单系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// 所有仓储共享同一个 SQLite 连接
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::{MenuItemApi, OrderApi, RestaurantApi, StockApi};
use crate::config::ConfigManager;
use crate::engine::{
    CatalogLookup, FulfillmentRepositories, OrderLifecycle, RepositoryCatalog,
    RestaurantAvailability, StockLedger,
};

/// 应用状态
///
/// 包含所有API实例和共享资源，供外层服务（HTTP 等）持有
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 仓储集合
    pub repositories: FulfillmentRepositories,

    /// 配置管理器
    pub config_manager: Arc<ConfigManager>,

    /// 订单生命周期引擎
    pub order_lifecycle: Arc<OrderLifecycle<ConfigManager>>,

    /// 订单API
    pub order_api: Arc<OrderApi<ConfigManager>>,

    /// 库存API
    pub stock_api: Arc<StockApi>,

    /// 餐厅API
    pub restaurant_api: Arc<RestaurantApi>,

    /// 菜品API
    pub menu_item_api: Arc<MenuItemApi>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径（不存在时自动创建并建表）
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = crate::db::open_sqlite_connection(&db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;
        crate::db::init_schema(&conn).map_err(|e| format!("数据库建表失败: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // 仓储与配置
        // ==========================================
        let repositories = FulfillmentRepositories::from_connection(conn.clone());
        let config_manager = Arc::new(
            ConfigManager::from_connection(conn)
                .map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );

        // ==========================================
        // 引擎
        // ==========================================
        let catalog: Arc<dyn CatalogLookup> = Arc::new(RepositoryCatalog::new(
            repositories.restaurant_repo.clone(),
            repositories.menu_item_repo.clone(),
        ));
        let availability = Arc::new(RestaurantAvailability::new(catalog.clone()));
        let ledger = Arc::new(StockLedger::new(repositories.stock_repo.clone()));
        let order_lifecycle = Arc::new(OrderLifecycle::new(
            catalog,
            availability.clone(),
            ledger.clone(),
            repositories.order_repo.clone(),
            config_manager.clone(),
        ));

        // ==========================================
        // API
        // ==========================================
        let order_api = Arc::new(OrderApi::new(
            order_lifecycle.clone(),
            repositories.order_repo.clone(),
        ));
        let stock_api = Arc::new(StockApi::new(ledger, repositories.stock_repo.clone()));
        let restaurant_api = Arc::new(RestaurantApi::new(
            repositories.restaurant_repo.clone(),
            availability,
        ));
        let menu_item_api = Arc::new(MenuItemApi::new(
            repositories.menu_item_repo.clone(),
            repositories.restaurant_repo.clone(),
        ));

        tracing::info!("AppState初始化完成");

        Ok(Self {
            db_path,
            repositories,
            config_manager,
            order_lifecycle,
            order_api,
            stock_api,
            restaurant_api,
            menu_item_api,
        })
    }
}

/// 获取默认数据库路径
///
/// 优先使用环境变量 `FOOD_DELIVERY_DB`，否则使用用户本地数据目录
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var("FOOD_DELIVERY_DB") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./food_delivery.db");
    if let Some(data_dir) = dirs::data_local_dir() {
        let dir = data_dir.join("food-delivery");
        // 目录创建失败时回退到当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("food_delivery.db");
        }
    }

    path.to_string_lossy().to_string()
}
