// ==========================================
// Tiffin 配送订单后台 - 去重/校验折叠
// ==========================================
// 职责: 归一化候选 → 接收集 + 拒收集（带行号与原因）
// 红线: 纯函数，不触数据库；存量标识集由调用方取快照传入
// 红线: 批量导入绝不代生成 order_id——缺标识即拒收
// ==========================================

use crate::domain::NormalizedOrder;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// ==========================================
// RejectedRecord - 拒收记录
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RejectedRecord {
    /// 1-based 输入行号
    pub row_number: usize,
    pub reason: String,
}

// ==========================================
// ReconcileOutcome - 折叠结果
// ==========================================
#[derive(Debug, Clone)]
pub struct ReconcileOutcome {
    pub accepted: Vec<NormalizedOrder>,
    pub rejected: Vec<RejectedRecord>,
}

/// 按输入顺序折叠候选集
///
/// # 规则（按序判定，首个命中即拒收）
/// 1. order_id 缺失
/// 2. 日期字段整体缺失（待复核原文算“有输入”，不在此拒收）
/// 3. delivery_address 缺失
/// 4. 标识与工作集重复（存量 ∪ 本批已接收）
///
/// # 说明
/// 已接收的标识立即并入工作集，同批内后续重复行被拒收——
/// 同一文件导入两次与导入一次结果一致（幂等由仓储层 upsert 保证）
pub fn reconcile(
    candidates: Vec<NormalizedOrder>,
    existing_ids: &HashSet<String>,
) -> ReconcileOutcome {
    let mut working_set: HashSet<String> = existing_ids.clone();
    let mut accepted = Vec::new();
    let mut rejected = Vec::new();

    for candidate in candidates {
        let row_number = candidate.row_number;

        let Some(order_id) = candidate.order_id.clone() else {
            rejected.push(RejectedRecord {
                row_number,
                reason: "订单标识缺失".to_string(),
            });
            continue;
        };

        if candidate.date.is_none() {
            rejected.push(RejectedRecord {
                row_number,
                reason: "日期字段缺失".to_string(),
            });
            continue;
        }

        if candidate.delivery_address.is_none() {
            rejected.push(RejectedRecord {
                row_number,
                reason: "配送地址缺失".to_string(),
            });
            continue;
        }

        if working_set.contains(&order_id) {
            let reason = if existing_ids.contains(&order_id) {
                format!("订单标识与存量重复: {}", order_id)
            } else {
                format!("订单标识批内重复: {}", order_id)
            };
            rejected.push(RejectedRecord { row_number, reason });
            continue;
        }

        working_set.insert(order_id);
        accepted.push(candidate);
    }

    ReconcileOutcome { accepted, rejected }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{OrderSource, PaymentStatus};
    use crate::domain::OrderDate;
    use chrono::NaiveDate;

    fn candidate(id: Option<&str>, row: usize) -> NormalizedOrder {
        NormalizedOrder {
            order_id: id.map(|s| s.to_string()),
            date: Some(OrderDate::Valid(
                NaiveDate::from_ymd_opt(2024, 2, 5).unwrap(),
            )),
            delivery_address: Some("12 MG Road".to_string()),
            quantity: 1,
            unit_price: 100.0,
            total_amount: 100.0,
            payment_status: PaymentStatus::Pending,
            payment_mode: None,
            mode: None,
            billing_month: Some(2),
            billing_year: Some(2024),
            source: OrderSource::Excel,
            row_number: row,
        }
    }

    #[test]
    fn test_missing_order_id_rejected() {
        let outcome = reconcile(vec![candidate(None, 2)], &HashSet::new());
        assert!(outcome.accepted.is_empty());
        assert_eq!(outcome.rejected.len(), 1);
        assert_eq!(outcome.rejected[0].row_number, 2);
        assert!(outcome.rejected[0].reason.contains("标识缺失"));
    }

    #[test]
    fn test_missing_date_rejected_but_needs_review_accepted() {
        let mut no_date = candidate(Some("TF240205AAA"), 2);
        no_date.date = None;
        let mut needs_review = candidate(Some("TF240205BBB"), 3);
        needs_review.date = Some(OrderDate::NeedsReview("feb-ish".to_string()));

        let outcome = reconcile(vec![no_date, needs_review], &HashSet::new());
        // 完全缺失 → 拒收；有输入但待复核 → 照常接收
        assert_eq!(outcome.rejected.len(), 1);
        assert_eq!(outcome.rejected[0].row_number, 2);
        assert_eq!(outcome.accepted.len(), 1);
        assert_eq!(
            outcome.accepted[0].order_id.as_deref(),
            Some("TF240205BBB")
        );
    }

    #[test]
    fn test_missing_address_rejected() {
        let mut c = candidate(Some("TF240205AAA"), 4);
        c.delivery_address = None;
        let outcome = reconcile(vec![c], &HashSet::new());
        assert_eq!(outcome.rejected.len(), 1);
        assert!(outcome.rejected[0].reason.contains("地址"));
    }

    #[test]
    fn test_duplicate_against_store() {
        let existing: HashSet<String> = ["TF240205AAA".to_string()].into_iter().collect();
        let outcome = reconcile(vec![candidate(Some("TF240205AAA"), 2)], &existing);
        assert!(outcome.accepted.is_empty());
        assert!(outcome.rejected[0].reason.contains("存量重复"));
    }

    #[test]
    fn test_duplicate_within_batch_first_wins() {
        let outcome = reconcile(
            vec![
                candidate(Some("TF240205AAA"), 2),
                candidate(Some("TF240205AAA"), 3),
                candidate(Some("TF240205BBB"), 4),
            ],
            &HashSet::new(),
        );
        assert_eq!(outcome.accepted.len(), 2);
        assert_eq!(outcome.rejected.len(), 1);
        assert_eq!(outcome.rejected[0].row_number, 3);
        assert!(outcome.rejected[0].reason.contains("批内重复"));
    }
}
