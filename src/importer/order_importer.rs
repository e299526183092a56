// ==========================================
// Tiffin 配送订单后台 - 订单导入器
// ==========================================
// 职责: 整合导入流程，从文件/行集合到数据库
// 流程: 解析 → 表头映射 → 字段归一化 → 去重校验折叠 → 批量写入
// 口径: 文件级错误中止整次导入；行级问题折叠进报告，不中断其余行
// ==========================================

use crate::domain::types::OrderSource;
use crate::domain::Order;
use crate::importer::error::ImportResult;
use crate::importer::file_parser::{ParsedRow, UniversalFileParser};
use crate::importer::reconciler::reconcile;
use crate::normalizer::{map_row, normalize_record};
use crate::repository::OrderRepository;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

// ==========================================
// ImportReport - 导入报告
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportRowError {
    /// 1-based 输入行号（无法对应输入行时为 0）
    pub row: usize,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportReport {
    pub batch_id: String,
    pub imported_count: usize,
    pub error_count: usize,
    pub errors: Vec<ImportRowError>,
    pub elapsed_ms: u128,
}

// ==========================================
// OrderImporter - 订单导入器
// ==========================================
pub struct OrderImporter<R: OrderRepository> {
    repo: Arc<R>,
    /// 运营默认单价；提供时据此派生 price_override
    default_unit_price: Option<f64>,
}

impl<R: OrderRepository> OrderImporter<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self {
            repo,
            default_unit_price: None,
        }
    }

    pub fn with_default_unit_price(mut self, price: f64) -> Self {
        self.default_unit_price = Some(price);
        self
    }

    /// 从文件导入订单（.xlsx/.xls/.csv）
    ///
    /// # 返回
    /// - Ok(ImportReport): 行级结果汇总
    /// - Err: 文件级错误（不存在/格式不支持/不可解析），整次导入中止
    pub async fn import_from_file<P: AsRef<Path>>(
        &self,
        file_path: P,
    ) -> ImportResult<ImportReport> {
        let path = file_path.as_ref();
        info!(file_path = %path.display(), "开始文件导入");
        let rows = UniversalFileParser.parse(path)?;
        self.import_rows(rows, OrderSource::Excel).await
    }

    /// 导入已解析的行集合
    ///
    /// # 参数
    /// - rows: 表头 → 单元格文本，带 1-based 行号
    /// - source: 来源标签（文件导入为 excel，接口推送为 api）
    pub async fn import_rows(
        &self,
        rows: Vec<ParsedRow>,
        source: OrderSource,
    ) -> ImportResult<ImportReport> {
        let start = Instant::now();
        let batch_id = Uuid::new_v4().to_string();
        let total_rows = rows.len();
        info!(batch_id = %batch_id, total_rows = total_rows, "开始导入订单");

        // === 步骤 1: 表头映射 + 字段归一化 ===
        debug!("步骤 1: 表头映射与字段归一化");
        let candidates: Vec<_> = rows
            .iter()
            .map(|row| normalize_record(map_row(&row.cells, row.row_number), source))
            .collect();

        // === 步骤 2: 去重/校验折叠（对照存量标识快照）===
        debug!("步骤 2: 去重校验折叠");
        let existing_ids = self.repo.existing_order_ids().await?;
        let outcome = reconcile(candidates, &existing_ids);
        info!(
            accepted = outcome.accepted.len(),
            rejected = outcome.rejected.len(),
            "去重校验完成"
        );

        let mut errors: Vec<ImportRowError> = outcome
            .rejected
            .into_iter()
            .map(|r| ImportRowError {
                row: r.row_number,
                reason: r.reason,
            })
            .collect();

        // === 步骤 3: 转换为订单实体 ===
        debug!("步骤 3: 转换为订单实体");
        let now = Utc::now();
        let mut row_by_id: HashMap<String, usize> = HashMap::new();
        let mut orders: Vec<Order> = Vec::with_capacity(outcome.accepted.len());
        for candidate in outcome.accepted {
            let row_number = candidate.row_number;
            let price_override = self
                .default_unit_price
                .map(|d| (candidate.unit_price - d).abs() > f64::EPSILON)
                .unwrap_or(false);
            match candidate.into_order(now, price_override) {
                Some(order) => {
                    row_by_id.insert(order.order_id.clone(), row_number);
                    orders.push(order);
                }
                None => {
                    // 折叠已保证必填字段存在，此分支仅防御数据竞态
                    errors.push(ImportRowError {
                        row: row_number,
                        reason: "必填字段缺失".to_string(),
                    });
                }
            }
        }

        // === 步骤 4: 批量写入（无序批次，单条失败不中断）===
        debug!("步骤 4: 批量写入");
        let upsert = self.repo.bulk_upsert(&orders).await?;
        for (order_id, reason) in upsert.failures {
            warn!(batch_id = %batch_id, order_id = %order_id, reason = %reason, "写入失败");
            errors.push(ImportRowError {
                row: row_by_id.get(&order_id).copied().unwrap_or(0),
                reason: format!("写入失败: {}", reason),
            });
        }

        let report = ImportReport {
            batch_id: batch_id.clone(),
            imported_count: upsert.written,
            error_count: errors.len(),
            errors,
            elapsed_ms: start.elapsed().as_millis(),
        };
        info!(
            batch_id = %batch_id,
            imported = report.imported_count,
            errors = report.error_count,
            elapsed_ms = report.elapsed_ms,
            "导入完成"
        );
        Ok(report)
    }
}
