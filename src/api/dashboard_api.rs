// ==========================================
// Tiffin 配送订单后台 - 看板 API
// ==========================================
// 职责: 客户画像、待收款、回款时间线的只读聚合入口
// 口径: 每次调用取订单全量快照，评估日由调用方显式传入
// ==========================================

use crate::api::error::ApiResult;
use crate::engine::customer_insights::{customer_rollups, CustomerRollup};
use crate::engine::payment_health::{
    collection_timeline, pending_orders, CollectionTimeline, PendingSummary,
};
use crate::repository::OrderRepository;
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::debug;

// ==========================================
// DashboardApi - 看板 API
// ==========================================
pub struct DashboardApi<R: OrderRepository> {
    repo: Arc<R>,
}

impl<R: OrderRepository> DashboardApi<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// 客户画像（按总消费降序）
    pub async fn customer_rollups(&self, today: NaiveDate) -> ApiResult<Vec<CustomerRollup>> {
        let orders = self.repo.find_all().await?;
        debug!(orders = orders.len(), "客户画像聚合");
        Ok(customer_rollups(&orders, today))
    }

    /// 待收款视图（最久欠款在前）
    pub async fn pending_orders(&self, today: NaiveDate) -> ApiResult<PendingSummary> {
        let orders = self.repo.find_all().await?;
        debug!(orders = orders.len(), "待收款聚合");
        Ok(pending_orders(&orders, today))
    }

    /// 回款时间线（最近 30 天逐日）
    pub async fn collection_timeline(&self, today: NaiveDate) -> ApiResult<CollectionTimeline> {
        let orders = self.repo.find_all().await?;
        debug!(orders = orders.len(), "回款时间线聚合");
        Ok(collection_timeline(&orders, today))
    }
}
