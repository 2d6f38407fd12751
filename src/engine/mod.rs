// ==========================================
// 外卖订单系统 - 引擎层
// ==========================================
// 职责: 库存账本、营业判定、订单生命周期
// 红线: Engine 不拼 SQL
// ==========================================

pub mod availability;
pub mod catalog;
pub mod error;
pub mod order_lifecycle;
pub mod order_number;
pub mod repositories;
pub mod reservation;
pub mod stock_ledger;

// 重导出核心引擎
pub use availability::{is_within_operating_hours, RestaurantAvailability};
pub use catalog::{CatalogLookup, RepositoryCatalog};
pub use error::{FulfillmentError, FulfillmentResult, UnreleasedReservation};
pub use order_lifecycle::OrderLifecycle;
pub use order_number::{is_valid_order_number, OrderNumberGenerator, OrderNumberSource};
pub use repositories::FulfillmentRepositories;
pub use reservation::{Reservation, ReservationSaga};
pub use stock_ledger::StockLedger;
