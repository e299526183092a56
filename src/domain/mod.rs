// ==========================================
// Tiffin 配送订单后台 - 领域层
// ==========================================
// 职责: 实体与值类型定义，不含任何数据访问逻辑
// ==========================================

pub mod order;
pub mod types;

// 重导出核心实体与类型
pub use order::{compute_total, NormalizedOrder, Order, OrderDate, RawOrderRecord};
pub use types::{OrderSource, PaymentMode, PaymentStatus, Segment};
