// ==========================================
// Tiffin 配送订单后台 - 回款健康引擎
// ==========================================
// 职责: 待收款视图 + 回款时间线
// 口径:
// - 待收款 = 支付状态非 paid 的订单（pending 与 unpaid 同属应收）
// - 逾期判定按自然日（日期差，不含时刻）：恰好 45 天不逾期，46 天起逾期
// - 回款日以 updated_at 的自然日近似（状态翻转为 paid 时该字段被触碰）
// ==========================================

use crate::domain::types::PaymentStatus;
use crate::domain::Order;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 逾期阈值（天）
pub const OVERDUE_DAYS: i64 = 45;

/// 回款时间线长度（天）
pub const TIMELINE_DAYS: i64 = 30;

// ==========================================
// PendingOrderView - 待收款订单视图
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingOrderView {
    pub order_id: String,
    pub delivery_address: String,
    pub total_amount: f64,
    pub payment_status: PaymentStatus,
    /// 自订单日起的待收天数；日期待复核时为 None
    pub days_pending: Option<i64>,
    pub is_overdue: bool,
}

// ==========================================
// PendingSummary - 待收款汇总
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingSummary {
    pub orders: Vec<PendingOrderView>,
    pub total_pending_amount: f64,
    pub overdue_count: usize,
}

/// 待收款视图（按待收天数降序，最久欠款在前）
///
/// # 参数
/// - today: 评估日
pub fn pending_orders(orders: &[Order], today: NaiveDate) -> PendingSummary {
    let mut views: Vec<PendingOrderView> = orders
        .iter()
        .filter(|o| o.payment_status != PaymentStatus::Paid)
        .map(|o| {
            let days_pending = o.date.as_valid().map(|d| (today - d).num_days());
            // 日期待复核的订单无法证明逾期，保守计为未逾期
            let is_overdue = days_pending.map(|d| d > OVERDUE_DAYS).unwrap_or(false);
            PendingOrderView {
                order_id: o.order_id.clone(),
                delivery_address: o.delivery_address.clone(),
                total_amount: o.total_amount,
                payment_status: o.payment_status,
                days_pending,
                is_overdue,
            }
        })
        .collect();

    views.sort_by(|a, b| {
        b.days_pending
            .cmp(&a.days_pending)
            .then_with(|| a.order_id.cmp(&b.order_id))
    });

    let total_pending_amount = views.iter().map(|v| v.total_amount).sum();
    let overdue_count = views.iter().filter(|v| v.is_overdue).count();
    PendingSummary {
        orders: views,
        total_pending_amount,
        overdue_count,
    }
}

// ==========================================
// CollectionTimeline - 回款时间线
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyCollection {
    pub date: NaiveDate,
    pub collected_amount: f64,
    pub order_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionTimeline {
    /// 最近 30 天逐日桶（含评估日），无回款的日子也占位
    pub days: Vec<DailyCollection>,
    /// 订单日 → 回款日的平均天数（无可计算样本时为 None）
    pub avg_days_to_settle: Option<f64>,
}

/// 回款时间线：评估日前 30 个自然日内已收款订单的逐日汇总
pub fn collection_timeline(orders: &[Order], today: NaiveDate) -> CollectionTimeline {
    let window_start = today - Duration::days(TIMELINE_DAYS - 1);

    let mut buckets: HashMap<NaiveDate, (f64, usize)> = HashMap::new();
    let mut settle_days_sum = 0i64;
    let mut settle_samples = 0usize;

    for order in orders {
        if order.payment_status != PaymentStatus::Paid {
            continue;
        }
        let settled_on = order.updated_at.date_naive();

        // 平均回款周期不受 30 天窗口限制，取全部可计算样本
        if let Some(order_date) = order.date.as_valid() {
            let lag = (settled_on - order_date).num_days();
            if lag >= 0 {
                settle_days_sum += lag;
                settle_samples += 1;
            }
        }

        if settled_on < window_start || settled_on > today {
            continue;
        }
        let entry = buckets.entry(settled_on).or_insert((0.0, 0));
        entry.0 += order.total_amount;
        entry.1 += 1;
    }

    let days = (0..TIMELINE_DAYS)
        .map(|offset| {
            let date = window_start + Duration::days(offset);
            let (collected_amount, order_count) = buckets.get(&date).copied().unwrap_or((0.0, 0));
            DailyCollection {
                date,
                collected_amount,
                order_count,
            }
        })
        .collect();

    let avg_days_to_settle = if settle_samples > 0 {
        Some(settle_days_sum as f64 / settle_samples as f64)
    } else {
        None
    };

    CollectionTimeline {
        days,
        avg_days_to_settle,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::OrderSource;
    use crate::domain::OrderDate;
    use chrono::{TimeZone, Utc};

    fn order(id: &str, date: OrderDate, status: PaymentStatus, total: f64) -> Order {
        Order {
            order_id: id.to_string(),
            date,
            delivery_address: "12 MG Road".to_string(),
            quantity: 1,
            unit_price: total,
            total_amount: total,
            payment_status: status,
            payment_mode: None,
            mode: None,
            billing_month: None,
            billing_year: None,
            source: OrderSource::Manual,
            price_override: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn valid(y: i32, m: u32, d: u32) -> OrderDate {
        OrderDate::Valid(NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    #[test]
    fn test_pending_includes_pending_and_unpaid() {
        let orders = vec![
            order("TF-1", valid(2024, 1, 1), PaymentStatus::Paid, 100.0),
            order("TF-2", valid(2024, 1, 1), PaymentStatus::Pending, 200.0),
            order("TF-3", valid(2024, 1, 1), PaymentStatus::Unpaid, 300.0),
        ];
        let today = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        let summary = pending_orders(&orders, today);
        assert_eq!(summary.orders.len(), 2);
        assert_eq!(summary.total_pending_amount, 500.0);
    }

    #[test]
    fn test_overdue_boundary_is_strict() {
        let order_date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let orders = vec![order(
            "TF-1",
            OrderDate::Valid(order_date),
            PaymentStatus::Pending,
            100.0,
        )];

        // 恰好 45 天: 不逾期
        let summary = pending_orders(&orders, order_date + Duration::days(45));
        assert_eq!(summary.orders[0].days_pending, Some(45));
        assert!(!summary.orders[0].is_overdue);
        assert_eq!(summary.overdue_count, 0);

        // 46 天: 逾期
        let summary = pending_orders(&orders, order_date + Duration::days(46));
        assert!(summary.orders[0].is_overdue);
        assert_eq!(summary.overdue_count, 1);
    }

    #[test]
    fn test_needs_review_date_never_overdue() {
        let orders = vec![order(
            "TF-1",
            OrderDate::NeedsReview("???".to_string()),
            PaymentStatus::Pending,
            100.0,
        )];
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let summary = pending_orders(&orders, today);
        assert_eq!(summary.orders[0].days_pending, None);
        assert!(!summary.orders[0].is_overdue);
    }

    #[test]
    fn test_timeline_has_thirty_buckets_with_gaps_filled() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 30).unwrap();
        let mut paid = order("TF-1", valid(2024, 3, 10), PaymentStatus::Paid, 250.0);
        paid.updated_at = Utc.with_ymd_and_hms(2024, 3, 20, 14, 30, 0).unwrap();

        let timeline = collection_timeline(&[paid], today);
        assert_eq!(timeline.days.len(), 30);
        assert_eq!(timeline.days[0].date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(timeline.days[29].date, today);

        let hit = timeline
            .days
            .iter()
            .find(|d| d.date == NaiveDate::from_ymd_opt(2024, 3, 20).unwrap())
            .unwrap();
        assert_eq!(hit.collected_amount, 250.0);
        assert_eq!(hit.order_count, 1);

        // 订单日 3/10 → 回款日 3/20 = 10 天
        assert_eq!(timeline.avg_days_to_settle, Some(10.0));
    }

    #[test]
    fn test_timeline_ignores_unpaid_and_out_of_window() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 30).unwrap();
        let mut pending = order("TF-1", valid(2024, 3, 10), PaymentStatus::Pending, 100.0);
        pending.updated_at = Utc.with_ymd_and_hms(2024, 3, 20, 0, 0, 0).unwrap();
        let mut old_paid = order("TF-2", valid(2024, 1, 1), PaymentStatus::Paid, 500.0);
        old_paid.updated_at = Utc.with_ymd_and_hms(2024, 1, 5, 0, 0, 0).unwrap();

        let timeline = collection_timeline(&[pending, old_paid], today);
        assert!(timeline.days.iter().all(|d| d.collected_amount == 0.0));
        // 窗口外的已收款订单仍计入平均回款周期
        assert_eq!(timeline.avg_days_to_settle, Some(4.0));
    }
}
