// ==========================================
// Tiffin 配送订单后台 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 订单运营中台核心（归一化/导入/查询/聚合）
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 归一化层 - 历史字段格式收敛
pub mod normalizer;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 业务规则
pub mod engine;

// 导入层 - 外部数据
pub mod importer;

// 配置层 - 运营配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{OrderSource, PaymentMode, PaymentStatus, Segment};

// 领域实体
pub use domain::{NormalizedOrder, Order, OrderDate, RawOrderRecord};

// 归一化
pub use normalizer::{map_row, normalize_record, parse_order_date};

// 引擎
pub use engine::{
    collection_timeline, customer_rollups, decompose_order_id, generate_order_id, pending_orders,
    query_orders, OrderFilter, OrderPage, QueryParams, SortDir, SortKey,
};

// 导入
pub use importer::{ImportReport, OrderImporter, UniversalFileParser};

// 仓储
pub use repository::{OrderRepository, OrderRepositoryImpl, RepositoryError, RepositoryResult};

// 配置
pub use config::ConfigManager;

// API
pub use api::{
    ApiError, ApiResult, Caller, CreateOrderRequest, DashboardApi, ImportApi, OrderApi,
    UpdateOrderRequest,
};

/// 库版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 应用名称
pub const APP_NAME: &str = "tiffin-backoffice";
