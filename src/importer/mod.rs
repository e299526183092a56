// ==========================================
// Tiffin 配送订单后台 - 导入模块
// ==========================================
// 职责: 文件解析 → 表头映射 → 归一化 → 去重校验 → 批量写入
// 红线: 单一严格契约——必填字段缺失即拒收，绝不代生成标识
// ==========================================

pub mod error;
pub mod file_parser;
pub mod order_importer;
pub mod reconciler;

pub use error::{ImportError, ImportResult};
pub use file_parser::{CsvParser, ExcelParser, ParsedRow, UniversalFileParser};
pub use order_importer::{ImportReport, ImportRowError, OrderImporter};
pub use reconciler::{reconcile, ReconcileOutcome, RejectedRecord};
