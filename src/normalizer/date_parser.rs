// ==========================================
// Tiffin 配送订单后台 - 日期解析器
// ==========================================
// 职责: 历史数据中三类日期编码 → OrderDate
// 红线: 全部格式失败时返回 NeedsReview(原文)，记录不丢弃、
//       日期绝不回退为当前日期（否则会静默污染账期报表）
// ==========================================

use crate::domain::OrderDate;
use chrono::{NaiveDate, NaiveDateTime};

/// 两位年份切分点：< 50 → 2000 年代，否则 1900 年代
const TWO_DIGIT_YEAR_PIVOT: i32 = 50;

/// 解析订单日期字符串
///
/// # 尝试顺序
/// 1. ISO: `YYYY-MM-DD` / `YYYY-MM-DDTHH:MM:SS` / `YYYY-MM-DD HH:MM:SS`
/// 2. 斜杠分隔: 默认 `DD/MM/YYYY`；首段 <= 12 且次段 > 12 时按 `MM/DD/YYYY`
/// 3. 英文月份缩写: `D-MMM-YY` / `D-MMM-YYYY`
///
/// # 返回
/// - OrderDate::Valid: 任一格式命中
/// - OrderDate::NeedsReview: 全部失败，原文原样保留
pub fn parse_order_date(raw: &str) -> OrderDate {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return OrderDate::NeedsReview(raw.to_string());
    }

    if let Some(date) = parse_iso(trimmed)
        .or_else(|| parse_slash(trimmed))
        .or_else(|| parse_month_abbrev(trimmed))
    {
        OrderDate::Valid(date)
    } else {
        OrderDate::NeedsReview(raw.to_string())
    }
}

/// ISO 格式（含可选时间部分，时间部分解析后丢弃）
fn parse_iso(s: &str) -> Option<NaiveDate> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt.date());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.date());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// 斜杠分隔格式
///
/// 历史数据以 DD/MM/YYYY 为主；仅当首段不可能是日内序（<=12）
/// 而次段超过 12（不可能是月份）时，判定为 MM/DD/YYYY
fn parse_slash(s: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = s.split('/').collect();
    if parts.len() != 3 {
        return None;
    }
    let first: u32 = parts[0].trim().parse().ok()?;
    let second: u32 = parts[1].trim().parse().ok()?;
    let year: i32 = parts[2].trim().parse().ok()?;
    if year < 1000 {
        return None;
    }

    let (day, month) = if first <= 12 && second > 12 {
        (second, first) // MM/DD/YYYY
    } else {
        (first, second) // DD/MM/YYYY
    };
    NaiveDate::from_ymd_opt(year, month, day)
}

/// 英文月份缩写格式: `5-Feb-24` / `15-Mar-2024`
fn parse_month_abbrev(s: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = s.split('-').collect();
    if parts.len() != 3 {
        return None;
    }
    let day: u32 = parts[0].trim().parse().ok()?;
    let month = month_from_name(parts[1].trim())?;
    let year_raw: i32 = parts[2].trim().parse().ok()?;
    let year = expand_two_digit_year(year_raw, parts[2].trim().len());
    NaiveDate::from_ymd_opt(year, month, day)
}

/// 英文月份名（缩写或全名，大小写不敏感）→ 月份序数
pub fn month_from_name(name: &str) -> Option<u32> {
    const MONTHS: [&str; 12] = [
        "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
    ];
    let lowered = name.to_lowercase();
    MONTHS
        .iter()
        .position(|m| lowered.starts_with(m))
        .map(|idx| idx as u32 + 1)
}

/// 两位年份展开
fn expand_two_digit_year(year: i32, digit_count: usize) -> i32 {
    if digit_count > 2 {
        return year;
    }
    if year < TWO_DIGIT_YEAR_PIVOT {
        2000 + year
    } else {
        1900 + year
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feb5_2024() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, 5).unwrap()
    }

    #[test]
    fn test_three_formats_same_calendar_date() {
        // 同一自然日的三种编码必须归一到同一日期
        assert_eq!(parse_order_date("2024-02-05"), OrderDate::Valid(feb5_2024()));
        assert_eq!(parse_order_date("05/02/2024"), OrderDate::Valid(feb5_2024()));
        assert_eq!(parse_order_date("5-Feb-24"), OrderDate::Valid(feb5_2024()));
    }

    #[test]
    fn test_iso_with_time_component() {
        assert_eq!(
            parse_order_date("2024-02-05T09:30:00"),
            OrderDate::Valid(feb5_2024())
        );
        assert_eq!(
            parse_order_date("2024-02-05 09:30:00"),
            OrderDate::Valid(feb5_2024())
        );
    }

    #[test]
    fn test_slash_disambiguation() {
        // 首段 > 12：只能是日
        assert_eq!(
            parse_order_date("15/03/2024"),
            OrderDate::Valid(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap())
        );
        // 次段 > 12 且首段 <= 12：按 MM/DD/YYYY
        assert_eq!(
            parse_order_date("03/15/2024"),
            OrderDate::Valid(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap())
        );
        // 双段均 <= 12：默认 DD/MM/YYYY
        assert_eq!(parse_order_date("05/02/2024"), OrderDate::Valid(feb5_2024()));
    }

    #[test]
    fn test_month_abbrev_year_expansion() {
        assert_eq!(
            parse_order_date("5-Feb-2024"),
            OrderDate::Valid(feb5_2024())
        );
        // 两位年 < 50 → 2000 年代
        assert_eq!(parse_order_date("5-Feb-24"), OrderDate::Valid(feb5_2024()));
        // 两位年 >= 50 → 1900 年代
        assert_eq!(
            parse_order_date("5-Feb-98"),
            OrderDate::Valid(NaiveDate::from_ymd_opt(1998, 2, 5).unwrap())
        );
        // 全名月份也接受
        assert_eq!(
            parse_order_date("5-February-24"),
            OrderDate::Valid(feb5_2024())
        );
    }

    #[test]
    fn test_unparsable_keeps_original_never_today() {
        let raw = "every monday";
        match parse_order_date(raw) {
            OrderDate::NeedsReview(kept) => assert_eq!(kept, raw),
            OrderDate::Valid(_) => panic!("不可解析日期不得落入 Valid"),
        }
        // 非法历法日同样进入待复核
        assert!(parse_order_date("31/02/2024").needs_review());
        assert!(parse_order_date("").needs_review());
    }
}
