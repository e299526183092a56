// ==========================================
// Tiffin 配送订单后台 - 业务引擎层
// ==========================================
// 职责: 标识生成、查询/过滤/排序、客户画像、回款健康
// 红线: 引擎只读订单快照，不直接写库
// ==========================================

pub mod customer_insights;
pub mod order_id;
pub mod payment_health;
pub mod query;

pub use customer_insights::{customer_rollups, CustomerRollup, ModePreference};
pub use order_id::{decompose_order_id, generate_order_id, DecomposedOrderId};
pub use payment_health::{
    collection_timeline, pending_orders, CollectionTimeline, PendingOrderView, PendingSummary,
};
pub use query::{query_orders, OrderFilter, OrderPage, PageParams, QueryParams, SortDir, SortKey};
