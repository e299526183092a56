// ==========================================
// Tiffin 配送订单后台 - 订单领域模型
// ==========================================
// 红线: total_amount 永远由 quantity × unit_price 重算，不信任输入
// 红线: 日期解析失败时保留原始字符串，绝不回退为“今天”
// ==========================================

use crate::domain::types::{OrderSource, PaymentMode, PaymentStatus};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// OrderDate - 订单日期解析结果
// ==========================================
// 带标签的变体，强制所有消费方显式处理“待复核”分支，
// 杜绝把解析失败静默合并为当前日期
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum OrderDate {
    /// 成功解析的自然日（语义为送餐日，不是时间戳）
    Valid(NaiveDate),
    /// 无法解析，保留原始字符串等待人工复核
    NeedsReview(String),
}

impl OrderDate {
    /// 取有效日期；待复核状态返回 None
    pub fn as_valid(&self) -> Option<NaiveDate> {
        match self {
            OrderDate::Valid(d) => Some(*d),
            OrderDate::NeedsReview(_) => None,
        }
    }

    pub fn needs_review(&self) -> bool {
        matches!(self, OrderDate::NeedsReview(_))
    }

    /// 存储表示：有效日期为 ISO 字符串，待复核为原文
    pub fn storage_value(&self) -> String {
        match self {
            OrderDate::Valid(d) => d.format("%Y-%m-%d").to_string(),
            OrderDate::NeedsReview(raw) => raw.clone(),
        }
    }

    /// 由 date 派生账期 (month, year)；待复核时返回 None
    pub fn billing_period(&self) -> Option<(u32, i32)> {
        self.as_valid().map(|d| (d.month(), d.year()))
    }
}

// ==========================================
// Order - 订单主实体（本核心唯一实体）
// ==========================================
// 用途: 归一化层写入，查询/分析引擎只读
// 对齐: db.rs orders 表
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    // ===== 主键 =====
    pub order_id: String, // 全局唯一、人类可读、赋值后不可变

    // ===== 业务字段 =====
    pub date: OrderDate,          // 送餐日（或待复核原文）
    pub delivery_address: String, // 配送地址，兼作客户标识键
    pub quantity: u32,            // 份数，默认 1
    pub unit_price: f64,          // 单价，非负
    pub total_amount: f64,        // 派生字段 = quantity × unit_price

    // ===== 状态与方式 =====
    pub payment_status: PaymentStatus,
    pub payment_mode: Option<PaymentMode>,
    pub mode: Option<String>, // 配送方式（自由文本，已 trim）

    // ===== 账期（与 date 一致，或整体缺失）=====
    pub billing_month: Option<u32>, // 1-12
    pub billing_year: Option<i32>,

    // ===== 溯源 =====
    pub source: OrderSource,  // 来源标签，不可变
    pub price_override: bool, // 单价偏离运营默认价时为 true

    // ===== 审计字段 =====
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>, // 已收款订单以此作为回款日口径
}

impl Order {
    /// 重算总额（唯一允许的 total_amount 来源）
    pub fn recompute_total(&mut self) {
        self.total_amount = compute_total(self.quantity, self.unit_price);
    }

    /// 待复核时 date 必须等于原文（不变量自检，测试用）
    pub fn date_invariant_holds(&self) -> bool {
        match &self.date {
            OrderDate::Valid(_) => true,
            OrderDate::NeedsReview(raw) => self.date.storage_value() == *raw,
        }
    }
}

/// 总额计算口径
pub fn compute_total(quantity: u32, unit_price: f64) -> f64 {
    quantity as f64 * unit_price
}

// ==========================================
// RawOrderRecord - 导入中间结构体
// ==========================================
// 用途: 表头规则映射后的产物（文件解析 → 表头映射 → 此结构）
// 生命周期: 仅在导入/归一化流程内，所有字段保持原始文本
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawOrderRecord {
    pub order_id: Option<String>,
    pub date: Option<String>,
    pub delivery_address: Option<String>,
    pub quantity: Option<String>,
    pub unit_price: Option<String>,
    pub total_amount: Option<String>, // 接收后即弃用，总额一律重算
    pub mode: Option<String>,
    pub status: Option<String>, // 遗留自由文本状态
    pub payment_mode: Option<String>,
    pub billing_period: Option<String>, // 账期字符串（date 无效时的兜底来源）
    pub billing_year: Option<String>,
    pub source: Option<String>,

    // 1-based 输入行号（文件导入时表头为第 1 行，数据从第 2 行起）
    pub row_number: usize,
}

// ==========================================
// NormalizedOrder - 归一化候选订单
// ==========================================
// 字段归一化完成、尚未分配 order_id / 尚未去重的订单候选
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedOrder {
    pub order_id: Option<String>, // 批量导入必须自带；创建路径由生成器补齐
    pub date: Option<OrderDate>,  // None = 输入完全缺失日期字段
    pub delivery_address: Option<String>,
    pub quantity: u32,
    pub unit_price: f64,
    pub total_amount: f64, // 已按 quantity × unit_price 重算
    pub payment_status: PaymentStatus,
    pub payment_mode: Option<PaymentMode>,
    pub mode: Option<String>,
    pub billing_month: Option<u32>,
    pub billing_year: Option<i32>,
    pub source: OrderSource,
    pub row_number: usize,
}

impl NormalizedOrder {
    /// 转为可写入的订单实体
    ///
    /// # 前置条件
    /// - order_id / date / delivery_address 已由调用方校验为存在
    pub fn into_order(self, now: DateTime<Utc>, price_override: bool) -> Option<Order> {
        Some(Order {
            order_id: self.order_id?,
            date: self.date?,
            delivery_address: self.delivery_address?,
            quantity: self.quantity,
            unit_price: self.unit_price,
            total_amount: compute_total(self.quantity, self.unit_price),
            payment_status: self.payment_status,
            payment_mode: self.payment_mode,
            mode: self.mode,
            billing_month: self.billing_month,
            billing_year: self.billing_year,
            source: self.source,
            price_override,
            created_at: now,
            updated_at: now,
        })
    }
}
