// ==========================================
// Tiffin 配送订单后台 - API 层
// ==========================================
// 职责: 对外操作入口，编排引擎与仓储
// 红线: API 层不写 SQL，不做字段归一化细节
// ==========================================

pub mod auth;
pub mod dashboard_api;
pub mod error;
pub mod import_api;
pub mod order_api;

pub use auth::{ensure_admin, Caller};
pub use dashboard_api::DashboardApi;
pub use error::{ApiError, ApiResult};
pub use import_api::ImportApi;
pub use order_api::{CreateOrderRequest, OrderApi, UpdateOrderRequest};
