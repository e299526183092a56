// ==========================================
// Tiffin 配送订单后台 - 领域类型定义
// ==========================================
// 职责: 支付状态/支付方式/订单来源/客户分层 的枚举与归一化
// 约束: 枚举与数据库存储格式一一对应（as_str / parse 成对出现）
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 支付状态 (Payment Status)
// ==========================================
// 历史数据只有自由文本 status，缺失时按关键词派生
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentStatus {
    Paid,    // 已收款
    Pending, // 待收款
    Unpaid,  // 未付款（明确拒付/逾期口径由分析层派生）
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Paid => "Paid",
            PaymentStatus::Pending => "Pending",
            PaymentStatus::Unpaid => "Unpaid",
        }
    }

    /// 从存储文本解析（严格匹配，存储层专用）
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Paid" => Some(PaymentStatus::Paid),
            "Pending" => Some(PaymentStatus::Pending),
            "Unpaid" => Some(PaymentStatus::Unpaid),
            _ => None,
        }
    }

    /// 从自由文本派生（导入归一化专用）
    ///
    /// # 规则
    /// - 含 "unpaid"/"due" → Unpaid
    /// - 含 "paid"（且不含 "unpaid"）→ Paid
    /// - 含 "pending" → Pending
    /// - 其余/缺失 → Pending（收款视图的最安全桶位，Paid 必须显式）
    pub fn from_legacy_text(text: Option<&str>) -> Self {
        let lowered = match text {
            Some(t) if !t.trim().is_empty() => t.trim().to_lowercase(),
            _ => return PaymentStatus::Pending,
        };
        if lowered.contains("unpaid") || lowered.contains("due") {
            PaymentStatus::Unpaid
        } else if lowered.contains("paid") {
            PaymentStatus::Paid
        } else if lowered.contains("pending") {
            PaymentStatus::Pending
        } else {
            PaymentStatus::Pending
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 支付方式 (Payment Mode)
// ==========================================
// 输入为自由文本（"GPay"/"cash on delivery"/"netbanking"...），按关键词归一化
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMode {
    Cash,
    Online,
    Upi,
    Card,
}

impl PaymentMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMode::Cash => "Cash",
            PaymentMode::Online => "Online",
            PaymentMode::Upi => "UPI",
            PaymentMode::Card => "Card",
        }
    }

    /// 从存储文本解析（严格匹配，存储层专用）
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Cash" => Some(PaymentMode::Cash),
            "Online" => Some(PaymentMode::Online),
            "UPI" => Some(PaymentMode::Upi),
            "Card" => Some(PaymentMode::Card),
            _ => None,
        }
    }

    /// 从自由文本归一化（导入归一化专用）
    ///
    /// # 关键词表
    /// - UPI: upi / gpay / google pay / phonepe / paytm / bhim
    /// - Card: card / credit / debit
    /// - Cash: cash / cod
    /// - Online: online / bank / transfer / net
    pub fn from_free_text(text: Option<&str>) -> Option<Self> {
        let lowered = match text {
            Some(t) if !t.trim().is_empty() => t.trim().to_lowercase(),
            _ => return None,
        };
        const UPI_WORDS: [&str; 6] = ["upi", "gpay", "google pay", "phonepe", "paytm", "bhim"];
        const CARD_WORDS: [&str; 3] = ["card", "credit", "debit"];
        const CASH_WORDS: [&str; 2] = ["cash", "cod"];
        const ONLINE_WORDS: [&str; 4] = ["online", "bank", "transfer", "net"];

        if UPI_WORDS.iter().any(|w| lowered.contains(w)) {
            Some(PaymentMode::Upi)
        } else if CARD_WORDS.iter().any(|w| lowered.contains(w)) {
            Some(PaymentMode::Card)
        } else if CASH_WORDS.iter().any(|w| lowered.contains(w)) {
            Some(PaymentMode::Cash)
        } else if ONLINE_WORDS.iter().any(|w| lowered.contains(w)) {
            Some(PaymentMode::Online)
        } else {
            None
        }
    }
}

impl fmt::Display for PaymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 订单来源 (Order Source)
// ==========================================
// 来源标签不可变更：手工录入 / Excel 批量导入 / 程序化 API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSource {
    Manual,
    Excel,
    Api,
}

impl OrderSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderSource::Manual => "manual",
            OrderSource::Excel => "excel",
            OrderSource::Api => "api",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "manual" => Some(OrderSource::Manual),
            "excel" => Some(OrderSource::Excel),
            "api" => Some(OrderSource::Api),
            _ => None,
        }
    }
}

impl fmt::Display for OrderSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 客户分层 (Customer Segment)
// ==========================================
// 纯消费额阈值派生，与活跃度无关
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Segment {
    New,      // 消费额 < 2000
    Regular,  // 2000 <= 消费额 < 8000
    Vip,      // 8000 <= 消费额 < 15000
    SuperVip, // 消费额 >= 15000
}

/// Regular 分层下限
pub const SEGMENT_REGULAR_MIN: f64 = 2_000.0;
/// VIP 分层下限
pub const SEGMENT_VIP_MIN: f64 = 8_000.0;
/// Super VIP 分层下限
pub const SEGMENT_SUPER_VIP_MIN: f64 = 15_000.0;

impl Segment {
    /// 按累计消费额分层
    pub fn from_total_spend(spend: f64) -> Self {
        if spend >= SEGMENT_SUPER_VIP_MIN {
            Segment::SuperVip
        } else if spend >= SEGMENT_VIP_MIN {
            Segment::Vip
        } else if spend >= SEGMENT_REGULAR_MIN {
            Segment::Regular
        } else {
            Segment::New
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Segment::New => "New",
            Segment::Regular => "Regular",
            Segment::Vip => "VIP",
            Segment::SuperVip => "Super VIP",
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_status_from_legacy_text() {
        assert_eq!(
            PaymentStatus::from_legacy_text(Some("Payment Pending")),
            PaymentStatus::Pending
        );
        assert_eq!(
            PaymentStatus::from_legacy_text(Some("PAID")),
            PaymentStatus::Paid
        );
        assert_eq!(
            PaymentStatus::from_legacy_text(Some("unpaid")),
            PaymentStatus::Unpaid
        );
        // "unpaid" 优先于其中包含的 "paid"
        assert_eq!(
            PaymentStatus::from_legacy_text(Some("order unpaid since march")),
            PaymentStatus::Unpaid
        );
        assert_eq!(PaymentStatus::from_legacy_text(None), PaymentStatus::Pending);
        assert_eq!(
            PaymentStatus::from_legacy_text(Some("delivered")),
            PaymentStatus::Pending
        );
    }

    #[test]
    fn test_payment_mode_keywords() {
        assert_eq!(
            PaymentMode::from_free_text(Some("GPay")),
            Some(PaymentMode::Upi)
        );
        assert_eq!(
            PaymentMode::from_free_text(Some("cash on delivery")),
            Some(PaymentMode::Cash)
        );
        assert_eq!(
            PaymentMode::from_free_text(Some("Credit Card")),
            Some(PaymentMode::Card)
        );
        assert_eq!(
            PaymentMode::from_free_text(Some("netbanking")),
            Some(PaymentMode::Online)
        );
        assert_eq!(PaymentMode::from_free_text(Some("barter")), None);
        assert_eq!(PaymentMode::from_free_text(None), None);
    }

    #[test]
    fn test_segment_thresholds() {
        assert_eq!(Segment::from_total_spend(1_999.99), Segment::New);
        assert_eq!(Segment::from_total_spend(2_000.0), Segment::Regular);
        assert_eq!(Segment::from_total_spend(7_999.99), Segment::Regular);
        assert_eq!(Segment::from_total_spend(8_000.0), Segment::Vip);
        assert_eq!(Segment::from_total_spend(14_999.99), Segment::Vip);
        assert_eq!(Segment::from_total_spend(15_000.0), Segment::SuperVip);
    }

    #[test]
    fn test_storage_round_trip() {
        for status in [PaymentStatus::Paid, PaymentStatus::Pending, PaymentStatus::Unpaid] {
            assert_eq!(PaymentStatus::parse(status.as_str()), Some(status));
        }
        for mode in [
            PaymentMode::Cash,
            PaymentMode::Online,
            PaymentMode::Upi,
            PaymentMode::Card,
        ] {
            assert_eq!(PaymentMode::parse(mode.as_str()), Some(mode));
        }
        for source in [OrderSource::Manual, OrderSource::Excel, OrderSource::Api] {
            assert_eq!(OrderSource::parse(source.as_str()), Some(source));
        }
    }
}
