// ==========================================
// Tiffin 配送订单后台 - 订单 API
// ==========================================
// 职责: 单笔订单的创建、查询、更新、删除
// 红线: order_id 与 total_amount 不接受调用方赋值——
//       标识由生成器分配，总额一律重算
// ==========================================

use crate::api::auth::{ensure_admin, Caller};
use crate::api::error::{ApiError, ApiResult};
use crate::config::ConfigManager;
use crate::domain::types::{OrderSource, PaymentMode, PaymentStatus};
use crate::domain::{compute_total, Order};
use crate::engine::order_id::generate_order_id;
use crate::engine::query::{query_orders, OrderPage, QueryParams};
use crate::normalizer::parse_order_date;
use crate::repository::OrderRepository;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

// ==========================================
// 请求结构
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    /// 订单日期原文（任意历史格式，解析失败进入待复核）
    pub date: String,
    pub delivery_address: String,
    pub quantity: Option<u32>,
    /// 缺省时取运营默认单价
    pub unit_price: Option<f64>,
    pub mode: Option<String>,
    pub payment_status: Option<PaymentStatus>,
    /// 支付方式自由文本（"GPay" / "cash on delivery" 等）
    pub payment_mode: Option<String>,
}

/// 更新请求：None = 保持原值
///
/// 调用方传入的 order_id / total_amount 一律忽略
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateOrderRequest {
    pub date: Option<String>,
    pub delivery_address: Option<String>,
    pub quantity: Option<u32>,
    pub unit_price: Option<f64>,
    pub mode: Option<String>,
    pub payment_status: Option<PaymentStatus>,
    pub payment_mode: Option<String>,
}

// ==========================================
// OrderApi - 订单 API
// ==========================================
pub struct OrderApi<R: OrderRepository> {
    repo: Arc<R>,
    config: Arc<ConfigManager>,
}

impl<R: OrderRepository> OrderApi<R> {
    pub fn new(repo: Arc<R>, config: Arc<ConfigManager>) -> Self {
        Self { repo, config }
    }

    // ==========================================
    // 创建
    // ==========================================

    /// 创建单笔订单
    ///
    /// # 流程
    /// 1. 必填校验（日期原文、配送地址）
    /// 2. 日期解析（失败 → 待复核，不拒单）
    /// 3. 标识生成（日期内嵌 + 随机后缀，存量探测避撞）
    /// 4. 单价兜底 + price_override 派生
    /// 5. 纯 INSERT 落库（唯一冲突 → DuplicateIdentifier，不覆盖）
    pub async fn create_order(&self, request: CreateOrderRequest) -> ApiResult<Order> {
        // === 步骤 1: 必填校验 ===
        let date_raw = request.date.trim();
        if date_raw.is_empty() {
            return Err(ApiError::InvalidInput("订单日期不能为空".to_string()));
        }
        let address = request.delivery_address.trim();
        if address.is_empty() {
            return Err(ApiError::InvalidInput("配送地址不能为空".to_string()));
        }

        // === 步骤 2: 日期解析 ===
        let date = parse_order_date(date_raw);

        // === 步骤 3: 标识生成 ===
        let order_id = generate_order_id(date.as_valid(), self.repo.as_ref()).await?;

        // === 步骤 4: 单价与派生字段 ===
        let default_price = self
            .config
            .get_default_unit_price()
            .map_err(|e| ApiError::InternalError(format!("配置读取失败: {}", e)))?;
        let unit_price = match request.unit_price {
            Some(p) if p >= 0.0 => p,
            Some(p) => {
                warn!(unit_price = p, "单价为负，按 0 处理");
                0.0
            }
            None => default_price,
        };
        let price_override = (unit_price - default_price).abs() > f64::EPSILON;
        let quantity = request.quantity.filter(|&q| q >= 1).unwrap_or(1);
        let (billing_month, billing_year) = match date.billing_period() {
            Some((m, y)) => (Some(m), Some(y)),
            None => (None, None),
        };

        let now = Utc::now();
        let order = Order {
            order_id: order_id.clone(),
            date,
            delivery_address: address.to_string(),
            quantity,
            unit_price,
            total_amount: compute_total(quantity, unit_price),
            payment_status: request.payment_status.unwrap_or(PaymentStatus::Pending),
            payment_mode: PaymentMode::from_free_text(request.payment_mode.as_deref()),
            mode: request.mode.map(|m| m.trim().to_string()).filter(|m| !m.is_empty()),
            billing_month,
            billing_year,
            source: OrderSource::Manual,
            price_override,
            created_at: now,
            updated_at: now,
        };

        // === 步骤 5: 落库 ===
        self.repo.create(&order).await?;
        info!(order_id = %order_id, "订单创建成功");
        Ok(order)
    }

    // ==========================================
    // 查询
    // ==========================================

    /// 订单列表（过滤 + 排序 + 分页）
    pub async fn list_orders(&self, params: &QueryParams) -> ApiResult<OrderPage> {
        let orders = self.repo.find_all().await?;
        Ok(query_orders(orders, params))
    }

    /// 按标识查询单笔订单
    pub async fn get_order(&self, order_id: &str) -> ApiResult<Order> {
        self.repo
            .find_by_order_id(order_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("订单 {}", order_id)))
    }

    // ==========================================
    // 更新
    // ==========================================

    /// 更新订单（order_id 不可变；total_amount 重算）
    pub async fn update_order(
        &self,
        order_id: &str,
        request: UpdateOrderRequest,
    ) -> ApiResult<Order> {
        let mut order = self
            .repo
            .find_by_order_id(order_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("订单 {}", order_id)))?;

        if let Some(date_raw) = request.date {
            let trimmed = date_raw.trim().to_string();
            if trimmed.is_empty() {
                return Err(ApiError::InvalidInput("订单日期不能为空".to_string()));
            }
            order.date = parse_order_date(&trimmed);
            // 账期跟随日期重派生；待复核时整体清空
            let (m, y) = match order.date.billing_period() {
                Some((m, y)) => (Some(m), Some(y)),
                None => (None, None),
            };
            order.billing_month = m;
            order.billing_year = y;
        }
        if let Some(address) = request.delivery_address {
            let trimmed = address.trim().to_string();
            if trimmed.is_empty() {
                return Err(ApiError::InvalidInput("配送地址不能为空".to_string()));
            }
            order.delivery_address = trimmed;
        }
        if let Some(quantity) = request.quantity {
            if quantity < 1 {
                return Err(ApiError::InvalidInput("份数必须不小于 1".to_string()));
            }
            order.quantity = quantity;
        }
        if let Some(unit_price) = request.unit_price {
            if unit_price < 0.0 {
                return Err(ApiError::InvalidInput("单价不能为负".to_string()));
            }
            order.unit_price = unit_price;
            let default_price = self
                .config
                .get_default_unit_price()
                .map_err(|e| ApiError::InternalError(format!("配置读取失败: {}", e)))?;
            order.price_override = (unit_price - default_price).abs() > f64::EPSILON;
        }
        if let Some(mode) = request.mode {
            order.mode = Some(mode.trim().to_string()).filter(|m| !m.is_empty());
        }
        if let Some(status) = request.payment_status {
            order.payment_status = status;
        }
        if let Some(payment_mode) = request.payment_mode {
            order.payment_mode = PaymentMode::from_free_text(Some(&payment_mode));
        }

        order.recompute_total();
        // 状态翻转为已收款时，此时间戳即回款日口径
        order.updated_at = Utc::now();

        self.repo.update(&order).await?;
        info!(order_id = %order_id, "订单更新成功");
        Ok(order)
    }

    // ==========================================
    // 删除
    // ==========================================

    /// 按标识删除；返回被删订单
    pub async fn delete_order(&self, order_id: &str) -> ApiResult<Order> {
        let order = self
            .repo
            .find_by_order_id(order_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("订单 {}", order_id)))?;
        let deleted = self.repo.delete_by_order_id(order_id).await?;
        if !deleted {
            return Err(ApiError::NotFound(format!("订单 {}", order_id)));
        }
        info!(order_id = %order_id, "订单删除成功");
        Ok(order)
    }

    /// 清空全库（管理员专用）
    ///
    /// # 说明
    /// 删除后复核存量计数；残留时重试一次，仍有残留则报错
    pub async fn delete_all_orders(&self, caller: &Caller) -> ApiResult<usize> {
        ensure_admin(caller, "delete_all_orders")?;

        let mut deleted = self.repo.delete_all().await?;
        let mut remaining = self.repo.count().await?;
        if remaining > 0 {
            warn!(remaining = remaining, "清空后仍有残留，重试一次");
            deleted += self.repo.delete_all().await?;
            remaining = self.repo.count().await?;
        }
        if remaining > 0 {
            return Err(ApiError::InternalError(format!(
                "清空失败: 重试后仍残留 {} 条",
                remaining
            )));
        }
        info!(operator = %caller.operator_id, deleted = deleted, "全库清空完成");
        Ok(deleted)
    }
}
