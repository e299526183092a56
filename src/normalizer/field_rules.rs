// ==========================================
// Tiffin 配送订单后台 - 表头映射规则表
// ==========================================
// 职责: 任意输入字段名（表格表头 / 遗留 snake_case / camelCase）→ 规范字段
// 设计: 声明式规则表 (匹配谓词 → 规范字段)，按序求值、首个命中生效；
//       新的历史表头格式只需追加规则行，不再散落在控制流中
// ==========================================

use crate::domain::RawOrderRecord;
use std::collections::HashMap;

// ==========================================
// CanonicalField - 规范字段
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanonicalField {
    OrderId,
    Date,
    DeliveryAddress,
    Quantity,
    UnitPrice,
    TotalAmount,
    Mode,
    Status,
    PaymentMode,
    BillingPeriod,
    BillingYear,
    Source,
}

/// 单条映射规则：谓词命中（大小写不敏感的子串组合）→ 规范字段
struct FieldRule {
    matches: fn(&str) -> bool,
    field: CanonicalField,
}

// 规则按特异性从高到低排列：组合词在前，单词兜底在后。
// 谓词的入参已统一为小写。
const FIELD_RULES: &[FieldRule] = &[
    // 标识
    FieldRule {
        matches: |k| k.contains("order") && (k.contains("id") || k.contains("no")),
        field: CanonicalField::OrderId,
    },
    // 支付方式先于配送方式（"payment mode" 含 "mode"）
    FieldRule {
        matches: |k| k.contains("payment") && (k.contains("mode") || k.contains("method")),
        field: CanonicalField::PaymentMode,
    },
    FieldRule {
        matches: |k| k.contains("payment") && k.contains("status"),
        field: CanonicalField::Status,
    },
    // 数量先于总额（"total quantity" 归数量）
    FieldRule {
        matches: |k| k.contains("quantity") || k.contains("qty"),
        field: CanonicalField::Quantity,
    },
    FieldRule {
        matches: |k| k.contains("unit") && (k.contains("price") || k.contains("cost")),
        field: CanonicalField::UnitPrice,
    },
    // 总额候选：后续归一化一律弃用并重算
    FieldRule {
        matches: |k| k.contains("total") && !k.contains("quantity"),
        field: CanonicalField::TotalAmount,
    },
    FieldRule {
        matches: |k| k.contains("amount"),
        field: CanonicalField::TotalAmount,
    },
    FieldRule {
        matches: |k| k.contains("price") || k.contains("rate"),
        field: CanonicalField::UnitPrice,
    },
    // 客户键：配送地址即客户标识
    FieldRule {
        matches: |k| k.contains("address") || k.contains("customer"),
        field: CanonicalField::DeliveryAddress,
    },
    // 账期（"billing month" / "month" / "billing period"）先于裸 "year"
    FieldRule {
        matches: |k| k.contains("month") || k.contains("billing"),
        field: CanonicalField::BillingPeriod,
    },
    FieldRule {
        matches: |k| k.contains("year"),
        field: CanonicalField::BillingYear,
    },
    // 日期：排除审计时间戳列
    FieldRule {
        matches: |k| k.contains("date") && !k.contains("update") && !k.contains("create"),
        field: CanonicalField::Date,
    },
    FieldRule {
        matches: |k| k.contains("status"),
        field: CanonicalField::Status,
    },
    FieldRule {
        matches: |k| k.contains("mode") || k.contains("delivery"),
        field: CanonicalField::Mode,
    },
    FieldRule {
        matches: |k| k.contains("source"),
        field: CanonicalField::Source,
    },
];

/// 单个输入键 → 规范字段（未命中返回 None，该列被忽略）
pub fn canonical_field_for(key: &str) -> Option<CanonicalField> {
    let lowered = key.trim().to_lowercase();
    if lowered.is_empty() {
        return None;
    }
    FIELD_RULES
        .iter()
        .find(|rule| (rule.matches)(&lowered))
        .map(|rule| rule.field)
}

/// 原始行（表头 → 单元格文本）→ RawOrderRecord
///
/// # 规则
/// - 每个键只求值一次规则表；同一规范字段多列命中时保留首个非空值
/// - 空白单元格视为缺失
pub fn map_row(row: &HashMap<String, String>, row_number: usize) -> RawOrderRecord {
    let mut record = RawOrderRecord {
        row_number,
        ..Default::default()
    };

    for (key, value) in row {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            continue;
        }
        let Some(field) = canonical_field_for(key) else {
            continue;
        };

        let slot = match field {
            CanonicalField::OrderId => &mut record.order_id,
            CanonicalField::Date => &mut record.date,
            CanonicalField::DeliveryAddress => &mut record.delivery_address,
            CanonicalField::Quantity => &mut record.quantity,
            CanonicalField::UnitPrice => &mut record.unit_price,
            CanonicalField::TotalAmount => &mut record.total_amount,
            CanonicalField::Mode => &mut record.mode,
            CanonicalField::Status => &mut record.status,
            CanonicalField::PaymentMode => &mut record.payment_mode,
            CanonicalField::BillingPeriod => &mut record.billing_period,
            CanonicalField::BillingYear => &mut record.billing_year,
            CanonicalField::Source => &mut record.source,
        };
        if slot.is_none() {
            *slot = Some(trimmed.to_string());
        }
    }

    record
}
