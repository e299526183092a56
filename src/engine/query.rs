// ==========================================
// Tiffin 配送订单后台 - 查询/过滤/排序引擎
// ==========================================
// 职责: 全量订单快照 + 过滤/排序/分页参数 → 确定性分页视图
// 口径:
// - 过滤条件相互独立且取交集，未设置的条件为 no-op
// - 每种排序都有强制的次级决胜键，保证同主键值下顺序确定
// - 默认排序: 日期降序 + 序号升序决胜（同日内按录入序）
// ==========================================

use crate::domain::types::{PaymentMode, PaymentStatus};
use crate::domain::Order;
use crate::engine::order_id::decompose_order_id;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

// ==========================================
// 过滤参数
// ==========================================
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderFilter {
    /// 自由文本检索: 地址或标识的大小写不敏感子串
    pub search: Option<String>,
    /// 账期匹配
    pub billing_month: Option<u32>,
    pub billing_year: Option<i32>,
    /// 支付状态桶
    pub payment_status: Option<PaymentStatus>,
    /// 日期区间（闭区间，仅有效日期可命中）
    pub date_from: Option<chrono::NaiveDate>,
    pub date_to: Option<chrono::NaiveDate>,
    /// 配送方式（大小写不敏感全等）
    pub mode: Option<String>,
    /// 支付方式
    pub payment_mode: Option<PaymentMode>,
    /// 年份（账期年优先，缺失时退回有效日期年份）
    pub year: Option<i32>,
}

// ==========================================
// 排序参数
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    Date,
    OrderId,
    DeliveryAddress,
    Quantity,
    TotalAmount,
    Mode,
    PaymentStatus,
    PaymentMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDir {
    Asc,
    Desc,
}

impl SortDir {
    fn apply(&self, ord: Ordering) -> Ordering {
        match self {
            SortDir::Asc => ord,
            SortDir::Desc => ord.reverse(),
        }
    }
}

// ==========================================
// 分页参数与结果
// ==========================================
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PageParams {
    /// 1-based 页码
    pub page: usize,
    pub page_size: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryParams {
    pub filter: OrderFilter,
    pub sort_key: Option<SortKey>,
    pub sort_dir: Option<SortDir>,
    pub page: Option<PageParams>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderPage {
    pub orders: Vec<Order>,
    /// 过滤后（分页前）的总条数
    pub total_count: usize,
}

// ==========================================
// 查询入口
// ==========================================

/// 过滤 → 排序 → 分页
pub fn query_orders(orders: Vec<Order>, params: &QueryParams) -> OrderPage {
    let mut filtered: Vec<Order> = orders
        .into_iter()
        .filter(|o| matches_filter(o, &params.filter))
        .collect();

    let sort_key = params.sort_key.unwrap_or(SortKey::Date);
    let sort_dir = params.sort_dir.unwrap_or(match sort_key {
        // 默认: 最新日期在前
        SortKey::Date => SortDir::Desc,
        _ => SortDir::Asc,
    });
    filtered.sort_by(|a, b| compare_orders(a, b, sort_key, sort_dir));

    let total_count = filtered.len();
    let orders = match params.page {
        Some(page) if page.page_size > 0 => {
            let start = page.page.saturating_sub(1) * page.page_size;
            filtered.into_iter().skip(start).take(page.page_size).collect()
        }
        _ => filtered,
    };

    OrderPage { orders, total_count }
}

// ==========================================
// 过滤
// ==========================================

fn matches_filter(order: &Order, filter: &OrderFilter) -> bool {
    // 自由文本检索: 地址或标识
    if let Some(search) = &filter.search {
        let needle = search.trim().to_lowercase();
        if !needle.is_empty() {
            let hit = order.delivery_address.to_lowercase().contains(&needle)
                || order.order_id.to_lowercase().contains(&needle);
            if !hit {
                return false;
            }
        }
    }

    if let Some(month) = filter.billing_month {
        if order.billing_month != Some(month) {
            return false;
        }
    }
    if let Some(year) = filter.billing_year {
        if order.billing_year != Some(year) {
            return false;
        }
    }

    if let Some(status) = filter.payment_status {
        if order.payment_status != status {
            return false;
        }
    }

    // 日期区间: 待复核日期无法参与区间判断，区间生效时一律不命中
    if filter.date_from.is_some() || filter.date_to.is_some() {
        let Some(date) = order.date.as_valid() else {
            return false;
        };
        if let Some(from) = filter.date_from {
            if date < from {
                return false;
            }
        }
        if let Some(to) = filter.date_to {
            if date > to {
                return false;
            }
        }
    }

    if let Some(mode) = &filter.mode {
        let matched = order
            .mode
            .as_deref()
            .map(|m| m.eq_ignore_ascii_case(mode.trim()))
            .unwrap_or(false);
        if !matched {
            return false;
        }
    }

    if let Some(payment_mode) = filter.payment_mode {
        if order.payment_mode != Some(payment_mode) {
            return false;
        }
    }

    // 年份: 账期年优先，退回有效日期年份
    if let Some(year) = filter.year {
        let order_year = order
            .billing_year
            .or_else(|| order.date.as_valid().map(|d| chrono::Datelike::year(&d)));
        if order_year != Some(year) {
            return false;
        }
    }

    true
}

// ==========================================
// 排序
// ==========================================

/// 统一比较入口（含次级决胜键）
fn compare_orders(a: &Order, b: &Order, key: SortKey, dir: SortDir) -> Ordering {
    match key {
        SortKey::Date => compare_by_date(a, b, dir),
        SortKey::OrderId => compare_by_order_id(a, b, dir),
        SortKey::DeliveryAddress => with_same_dir_tiebreak(
            a,
            b,
            dir,
            a.delivery_address
                .to_lowercase()
                .cmp(&b.delivery_address.to_lowercase()),
        ),
        SortKey::Quantity => with_same_dir_tiebreak(a, b, dir, a.quantity.cmp(&b.quantity)),
        SortKey::TotalAmount => with_same_dir_tiebreak(
            a,
            b,
            dir,
            a.total_amount
                .partial_cmp(&b.total_amount)
                .unwrap_or(Ordering::Equal),
        ),
        SortKey::Mode => with_same_dir_tiebreak(
            a,
            b,
            dir,
            normalized_opt(&a.mode).cmp(&normalized_opt(&b.mode)),
        ),
        SortKey::PaymentStatus => with_same_dir_tiebreak(
            a,
            b,
            dir,
            a.payment_status.as_str().cmp(b.payment_status.as_str()),
        ),
        SortKey::PaymentMode => with_same_dir_tiebreak(
            a,
            b,
            dir,
            a.payment_mode
                .map(|m| m.as_str())
                .cmp(&b.payment_mode.map(|m| m.as_str())),
        ),
    }
}

/// 日期排序
///
/// - 待复核日期在两个方向上都排在所有有效日期之后
/// - 同日决胜: 标识末尾数字序号升序；无序号时标识字典序（方向无关）
fn compare_by_date(a: &Order, b: &Order, dir: SortDir) -> Ordering {
    let primary = match (a.date.as_valid(), b.date.as_valid()) {
        (Some(da), Some(db)) => dir.apply(da.cmp(&db)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    primary.then_with(|| sequence_tiebreak(a, b))
}

/// 标识排序
///
/// 标识先分解为内嵌日期 + 序号（独立于订单 date 字段）:
/// - 内嵌日期按请求方向
/// - 序号降序（新流水在前），与请求方向无关
/// - 无法分解时回退订单自身日期
/// - 最终决胜: 标识字典序
fn compare_by_order_id(a: &Order, b: &Order, dir: SortDir) -> Ordering {
    let da = decompose_order_id(&a.order_id);
    let db = decompose_order_id(&b.order_id);

    let date_a = da.embedded_date.or_else(|| a.date.as_valid());
    let date_b = db.embedded_date.or_else(|| b.date.as_valid());

    let by_date = match (date_a, date_b) {
        (Some(x), Some(y)) => dir.apply(x.cmp(&y)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };

    by_date
        .then_with(|| match (da.sequence, db.sequence) {
            // 序号降序: 新流水在前
            (Some(x), Some(y)) => y.cmp(&x),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
        .then_with(|| a.order_id.cmp(&b.order_id))
}

/// 同日决胜: 末尾数字序号升序，无序号时标识字典序
fn sequence_tiebreak(a: &Order, b: &Order) -> Ordering {
    let sa = decompose_order_id(&a.order_id).sequence;
    let sb = decompose_order_id(&b.order_id).sequence;
    match (sa, sb) {
        (Some(x), Some(y)) => x.cmp(&y),
        _ => a.order_id.cmp(&b.order_id),
    }
}

/// 其余排序键: 主键与隐式次级键（标识字典序）使用同一方向
fn with_same_dir_tiebreak(a: &Order, b: &Order, dir: SortDir, primary: Ordering) -> Ordering {
    dir.apply(primary.then_with(|| a.order_id.cmp(&b.order_id)))
}

fn normalized_opt(value: &Option<String>) -> Option<String> {
    value.as_ref().map(|v| v.to_lowercase())
}
