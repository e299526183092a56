// ==========================================
// Tiffin 配送订单后台 - 记录归一化
// ==========================================
// 职责: RawOrderRecord → NormalizedOrder（规范订单候选）
// 派生规则:
// - total_amount 一律重算，输入总额弃用
// - 账期优先由 date 派生；date 待复核时由账期字符串兜底
// - payment_status 缺失时由遗留 status 文本派生
// ==========================================

use crate::domain::{compute_total, NormalizedOrder, OrderDate, OrderSource, RawOrderRecord};
use crate::domain::types::{PaymentMode, PaymentStatus};
use crate::normalizer::date_parser::parse_order_date;
use crate::normalizer::value_parser::{
    parse_billing_period, parse_money, parse_quantity, parse_year,
};

/// 单条原始记录 → 归一化订单候选
///
/// # 参数
/// - record: 表头映射后的原始记录
/// - source: 来源标签（manual / excel / api）
///
/// # 说明
/// 本函数不做接收/拒收判定——必填字段缺失的候选原样传递，
/// 由去重/校验折叠（reconciler）统一裁决并记录行号
pub fn normalize_record(record: RawOrderRecord, source: OrderSource) -> NormalizedOrder {
    // === 日期: 有输入才解析；解析失败 → NeedsReview(原文) ===
    let date = record.date.as_deref().map(parse_order_date);

    // === 数值: 货币清洗 + 文档化默认值 ===
    let quantity = parse_quantity(record.quantity.as_deref());
    let unit_price = parse_money(record.unit_price.as_deref());

    // === 账期: date 有效 → 由 date 派生；否则由账期字符串兜底 ===
    let (billing_month, billing_year) = derive_billing_period(
        date.as_ref(),
        record.billing_period.as_deref(),
        record.billing_year.as_deref(),
    );

    // === 状态与方式 ===
    let payment_status = PaymentStatus::from_legacy_text(record.status.as_deref());
    let payment_mode = PaymentMode::from_free_text(record.payment_mode.as_deref());

    NormalizedOrder {
        order_id: non_empty(record.order_id),
        date,
        delivery_address: non_empty(record.delivery_address),
        quantity,
        unit_price,
        // 输入的 total_amount 到此为止：总额只承认重算结果
        total_amount: compute_total(quantity, unit_price),
        payment_status,
        payment_mode,
        mode: non_empty(record.mode),
        billing_month,
        billing_year,
        source,
        row_number: record.row_number,
    }
}

/// 账期派生
///
/// # 不变量
/// billing_month / billing_year 要么成对存在且与 date 一致，要么整体缺失
fn derive_billing_period(
    date: Option<&OrderDate>,
    billing_raw: Option<&str>,
    year_raw: Option<&str>,
) -> (Option<u32>, Option<i32>) {
    // date 有效时账期以 date 为准
    if let Some(date) = date {
        if let Some((month, year)) = date.billing_period() {
            return (Some(month), Some(year));
        }
    }

    // date 缺失或待复核: 尽力从账期字符串解析
    if let Some(raw) = billing_raw {
        if let Some((month, year)) = parse_billing_period(raw) {
            return (Some(month), Some(year));
        }
        // 账期串只有月份时，允许独立 year 列补齐
        if let Some(month) = crate::normalizer::date_parser::month_from_name(raw.trim())
            .or_else(|| month_number(raw))
        {
            if let Some(year) = year_raw.and_then(parse_year) {
                return (Some(month), Some(year));
            }
        }
    }

    (None, None)
}

fn month_number(raw: &str) -> Option<u32> {
    let n = raw.trim().parse::<u32>().ok()?;
    (1..=12).contains(&n).then_some(n)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
