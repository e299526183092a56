// ==========================================
// Tiffin 配送订单后台 - 客户画像引擎
// ==========================================
// 职责: 以配送地址为客户键的消费汇总与分层
// 口径:
// - 首末订单日期只认有效日期，待复核日期不参与时间统计
// - 偏好方式 = 出现次数最多的非空值（并列时字典序取先，保证确定性）
// - 活跃判定: 最近有效订单距评估日 ≤ 30 天
// ==========================================

use crate::domain::types::Segment;
use crate::domain::Order;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 不活跃阈值（天）：最近有效订单距评估日超过此值视为不活跃
pub const INACTIVE_AFTER_DAYS: i64 = 30;

// ==========================================
// ModePreference - 偏好方式
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModePreference {
    pub value: String,
    /// 占该客户非空样本的比例（0.0-100.0）
    pub share_pct: f64,
}

// ==========================================
// CustomerRollup - 单客户汇总
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerRollup {
    pub delivery_address: String,
    pub order_count: usize,
    pub total_spend: f64,
    pub avg_order_value: f64,
    /// 首/末有效订单日期；全部待复核时为 None
    pub first_order_date: Option<NaiveDate>,
    pub last_order_date: Option<NaiveDate>,
    pub preferred_mode: Option<ModePreference>,
    pub preferred_payment_mode: Option<ModePreference>,
    pub segment: Segment,
    pub inactive: bool,
}

/// 全量订单 → 按地址汇总的客户画像（按总消费降序）
///
/// # 参数
/// - today: 评估日（活跃判定基准）
pub fn customer_rollups(orders: &[Order], today: NaiveDate) -> Vec<CustomerRollup> {
    let mut groups: HashMap<&str, Vec<&Order>> = HashMap::new();
    for order in orders {
        groups
            .entry(order.delivery_address.as_str())
            .or_default()
            .push(order);
    }

    let mut rollups: Vec<CustomerRollup> = groups
        .into_iter()
        .map(|(address, group)| rollup_for(address, &group, today))
        .collect();

    // 总消费降序；同额按地址字典序，保证输出确定
    rollups.sort_by(|a, b| {
        b.total_spend
            .partial_cmp(&a.total_spend)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.delivery_address.cmp(&b.delivery_address))
    });
    rollups
}

fn rollup_for(address: &str, group: &[&Order], today: NaiveDate) -> CustomerRollup {
    let order_count = group.len();
    let total_spend: f64 = group.iter().map(|o| o.total_amount).sum();
    let avg_order_value = if order_count > 0 {
        total_spend / order_count as f64
    } else {
        0.0
    };

    let valid_dates: Vec<NaiveDate> = group.iter().filter_map(|o| o.date.as_valid()).collect();
    let first_order_date = valid_dates.iter().min().copied();
    let last_order_date = valid_dates.iter().max().copied();

    let preferred_mode = most_frequent(group.iter().filter_map(|o| o.mode.as_deref()));
    let preferred_payment_mode =
        most_frequent(group.iter().filter_map(|o| o.payment_mode.map(|m| m.as_str())));

    // 无有效日期的客户视为不活跃（无法证明近期活动）
    let inactive = last_order_date
        .map(|last| (today - last).num_days() > INACTIVE_AFTER_DAYS)
        .unwrap_or(true);

    CustomerRollup {
        delivery_address: address.to_string(),
        order_count,
        total_spend,
        avg_order_value,
        first_order_date,
        last_order_date,
        preferred_mode,
        preferred_payment_mode,
        segment: Segment::from_total_spend(total_spend),
        inactive,
    }
}

/// 众数统计（大小写不敏感计数，展示首次出现的原始写法）
fn most_frequent<'a>(values: impl Iterator<Item = &'a str>) -> Option<ModePreference> {
    let mut counts: HashMap<String, (usize, String)> = HashMap::new();
    let mut total = 0usize;
    for value in values {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            continue;
        }
        total += 1;
        let entry = counts
            .entry(trimmed.to_lowercase())
            .or_insert((0, trimmed.to_string()));
        entry.0 += 1;
    }
    if total == 0 {
        return None;
    }

    counts
        .into_values()
        .max_by(|(ca, va), (cb, vb)| ca.cmp(cb).then_with(|| vb.cmp(va)))
        .map(|(count, value)| ModePreference {
            value,
            share_pct: count as f64 * 100.0 / total as f64,
        })
}
