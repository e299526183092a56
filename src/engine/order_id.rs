// ==========================================
// Tiffin 配送订单后台 - 订单标识生成器
// ==========================================
// 格式: "TF" + 两位年 + 两位月 + 两位日 + 3 位大写 base-36 随机后缀
// 碰撞策略: 存在性探测失败只重生成后缀，最多 10 次；
//           仍碰撞则照常返回，由存储层唯一约束做最终裁决（绝不死循环）
// ==========================================

use crate::repository::{OrderRepository, RepositoryResult};
use chrono::{Datelike, NaiveDate};
use uuid::Uuid;

/// 订单标识前缀
pub const ORDER_ID_PREFIX: &str = "TF";

/// 碰撞重试上限
const MAX_COLLISION_RETRIES: usize = 10;

/// 随机后缀长度
const SUFFIX_LEN: usize = 3;

const BASE36: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// 生成一个当前不存在于存储中的订单标识
///
/// # 参数
/// - date: 订单送餐日；缺失/待复核时退回生成时刻的日期
/// - repo: 存在性探测用仓储
///
/// # 并发说明
/// 两个并发创建仍可能在探测与提交之间生成相同标识——该窗口被接受，
/// 最终由 orders.order_id 主键裁决，落败方以唯一约束冲突失败
pub async fn generate_order_id<R: OrderRepository + ?Sized>(
    date: Option<NaiveDate>,
    repo: &R,
) -> RepositoryResult<String> {
    let date = date.unwrap_or_else(|| chrono::Local::now().date_naive());
    let mut candidate = format_order_id(date);

    for _ in 0..MAX_COLLISION_RETRIES {
        if !repo.exists_order_id(&candidate).await? {
            return Ok(candidate);
        }
        // 只重生成随机后缀，日期部分保持不变
        candidate = format_order_id(date);
    }

    tracing::warn!(
        order_id = %candidate,
        "标识碰撞重试达到上限，交由存储唯一约束裁决"
    );
    Ok(candidate)
}

/// 按格式拼装一个新标识（含新随机后缀）
pub fn format_order_id(date: NaiveDate) -> String {
    format!(
        "{}{:02}{:02}{:02}{}",
        ORDER_ID_PREFIX,
        date.year() % 100,
        date.month(),
        date.day(),
        random_suffix()
    )
}

/// 3 位大写 base-36 随机后缀（以 UUIDv4 字节为熵源）
fn random_suffix() -> String {
    let bytes = Uuid::new_v4().into_bytes();
    bytes[..SUFFIX_LEN]
        .iter()
        .map(|b| BASE36[(*b as usize) % BASE36.len()] as char)
        .collect()
}

// ==========================================
// DecomposedOrderId - 标识分解
// ==========================================
// 排序引擎口径: 标识内嵌日期 + 末尾数字序号，独立于订单的 date 字段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecomposedOrderId {
    /// 标识内嵌的日期（YYMMDD 段或遗留月份名变体）
    pub embedded_date: Option<NaiveDate>,
    /// 末尾数字序号（遗留格式的流水号）
    pub sequence: Option<u64>,
}

/// 分解订单标识
///
/// # 支持形态
/// - 现行: `TF240205XK7`（前缀 + YYMMDD + 随机后缀）
/// - 遗留: `TIF-FEB-5-2024-000123`（月份名/日/年/流水号）
///
/// # 返回
/// 两个成分均解析失败时返回 (None, None)，排序引擎回退到订单自身日期
///
/// 月份名变体优先：其末尾流水号也是 >=6 位数字段，必须避免被误读为 YYMMDD
pub fn decompose_order_id(order_id: &str) -> DecomposedOrderId {
    DecomposedOrderId {
        embedded_date: embedded_date_from_month_name(order_id)
            .or_else(|| embedded_date_from_digits(order_id)),
        sequence: trailing_sequence(order_id),
    }
}

/// 现行格式: 首个 >= 6 位的连续数字段按 YYMMDD 解释
fn embedded_date_from_digits(order_id: &str) -> Option<NaiveDate> {
    let bytes = order_id.as_bytes();
    let mut idx = 0;
    while idx < bytes.len() {
        if bytes[idx].is_ascii_digit() {
            let start = idx;
            while idx < bytes.len() && bytes[idx].is_ascii_digit() {
                idx += 1;
            }
            if idx - start >= 6 {
                let run = &order_id[start..start + 6];
                let yy: i32 = run[0..2].parse().ok()?;
                let month: u32 = run[2..4].parse().ok()?;
                let day: u32 = run[4..6].parse().ok()?;
                let year = if yy < 50 { 2000 + yy } else { 1900 + yy };
                return NaiveDate::from_ymd_opt(year, month, day);
            }
        } else {
            idx += 1;
        }
    }
    None
}

/// 遗留格式: 分隔符切分后按 月份名 / 日 / 四位年 取值
fn embedded_date_from_month_name(order_id: &str) -> Option<NaiveDate> {
    let tokens: Vec<&str> = order_id
        .split(|c: char| c == '-' || c == '_' || c == '/' || c == ' ')
        .filter(|t| !t.is_empty())
        .collect();

    let month_idx = tokens
        .iter()
        .position(|t| crate::normalizer::date_parser::month_from_name(t).is_some())?;
    let month = crate::normalizer::date_parser::month_from_name(tokens[month_idx])?;

    // 月份名后第一个 1-2 位数字为日
    let day = tokens
        .iter()
        .skip(month_idx + 1)
        .find_map(|t| (t.len() <= 2).then(|| t.parse::<u32>().ok()).flatten())?;

    // 任意位置的四位年
    let year = tokens
        .iter()
        .find_map(|t| (t.len() == 4).then(|| t.parse::<i32>().ok()).flatten())?;

    NaiveDate::from_ymd_opt(year, month, day)
}

/// 末尾连续数字段作为序号；末尾非数字时无序号
fn trailing_sequence(order_id: &str) -> Option<u64> {
    let digits: String = order_id
        .chars()
        .rev()
        .take_while(|c| c.is_ascii_digit())
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}
