// ==========================================
// Tiffin 配送订单后台 - 数值与账期解析
// ==========================================
// 职责: 货币样式数值清洗、带默认值的数字解析、账期字符串解析
// 红线: 数值解析失败回退到文档化默认值（数量→1，价格/总额→0），
//       绝不因单个字段中断整条记录
// ==========================================

use crate::normalizer::date_parser::month_from_name;

/// 货币格式字符集（清洗时剔除）：货币符号与千分位分隔符
const CURRENCY_CHARS: &[char] = &['₹', '$', ',', ' '];

/// 货币文本前缀（大小写不敏感，清洗时剔除）
const CURRENCY_PREFIXES: &[&str] = &["rs.", "rs", "inr"];

/// 数量默认值
pub const DEFAULT_QUANTITY: u32 = 1;
/// 价格/总额默认值
pub const DEFAULT_PRICE: f64 = 0.0;

/// 剔除货币格式字符后的纯数字文本
fn strip_currency(raw: &str) -> String {
    let mut s: String = raw
        .chars()
        .filter(|c| !CURRENCY_CHARS.contains(c))
        .collect();
    let lowered = s.to_lowercase();
    for prefix in CURRENCY_PREFIXES {
        if lowered.starts_with(prefix) {
            s = s[prefix.len()..].to_string();
            break;
        }
    }
    s.trim().to_string()
}

/// 解析数量：缺失/不可解析 → 1；非正数 → 1
pub fn parse_quantity(raw: Option<&str>) -> u32 {
    let Some(raw) = raw else {
        return DEFAULT_QUANTITY;
    };
    match strip_currency(raw).parse::<f64>() {
        Ok(v) if v >= 1.0 => v as u32,
        _ => DEFAULT_QUANTITY,
    }
}

/// 解析货币金额：缺失/不可解析/负数 → 0
pub fn parse_money(raw: Option<&str>) -> f64 {
    let Some(raw) = raw else {
        return DEFAULT_PRICE;
    };
    match strip_currency(raw).parse::<f64>() {
        Ok(v) if v >= 0.0 => v,
        _ => DEFAULT_PRICE,
    }
}

/// 解析账期字符串 → (month, year)
///
/// # 支持形态
/// - "March 2024" / "Mar 2024"
/// - "3/2024" / "03-2024"
/// - "2024-03"
///
/// # 返回
/// - 月和年都解析成功才返回 Some；部分解析一律 None
///   （账期字段要么成对存在、要么整体缺失）
pub fn parse_billing_period(raw: &str) -> Option<(u32, i32)> {
    let tokens: Vec<&str> = raw
        .split(|c: char| c == ' ' || c == '/' || c == '-' || c == ',')
        .filter(|t| !t.is_empty())
        .collect();
    if tokens.len() != 2 {
        return None;
    }

    let mut month: Option<u32> = None;
    let mut year: Option<i32> = None;
    for token in tokens {
        if let Some(m) = month_from_name(token) {
            month.get_or_insert(m);
        } else if let Ok(n) = token.parse::<i64>() {
            if (1..=12).contains(&n) && month.is_none() {
                month = Some(n as u32);
            } else if (1900..=9999).contains(&n) && year.is_none() {
                year = Some(n as i32);
            }
        }
    }
    Some((month?, year?))
}

/// 解析账期年份字段（独立的 "year" 列）
pub fn parse_year(raw: &str) -> Option<i32> {
    let n = raw.trim().parse::<i32>().ok()?;
    (1900..=9999).contains(&n).then_some(n)
}
