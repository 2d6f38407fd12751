// ==========================================
// 外卖订单系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod codec;
pub mod error;
pub mod menu_item_repo;
pub mod order_repo;
pub mod restaurant_repo;
pub mod stock_repo;

// 重导出核心仓储
pub use error::{RepositoryError, RepositoryResult};
pub use menu_item_repo::MenuItemRepository;
pub use order_repo::{OrderRepository, ReleasedLine};
pub use restaurant_repo::RestaurantRepository;
pub use stock_repo::StockRepository;
