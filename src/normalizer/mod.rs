// ==========================================
// Tiffin 配送订单后台 - 字段归一化层
// ==========================================
// 职责: 任意形态的输入记录（表格表头/遗留文档/手工录入载荷）
//       → 规范订单候选；独占所有日期格式解析
// 红线: 记录永不因字段问题被丢弃；日期永不默认为“今天”
// ==========================================

pub mod date_parser;
pub mod field_rules;
pub mod record_normalizer;
pub mod value_parser;

// 重导出核心入口
pub use date_parser::parse_order_date;
pub use field_rules::{canonical_field_for, map_row, CanonicalField};
pub use record_normalizer::normalize_record;
pub use value_parser::{parse_billing_period, parse_money, parse_quantity};
