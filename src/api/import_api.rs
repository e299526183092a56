// ==========================================
// Tiffin 配送订单后台 - 导入 API
// ==========================================
// 职责: 文件导入与行集合推送入口
// 口径: 行级问题折叠进报告返回；文件级错误整体失败
// ==========================================

use crate::api::error::ApiResult;
use crate::domain::types::OrderSource;
use crate::importer::{ImportReport, OrderImporter, ParsedRow};
use crate::repository::OrderRepository;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

// ==========================================
// ImportApi - 导入 API
// ==========================================
pub struct ImportApi<R: OrderRepository> {
    importer: OrderImporter<R>,
}

impl<R: OrderRepository> ImportApi<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self {
            importer: OrderImporter::new(repo),
        }
    }

    /// 带运营默认单价（用于 price_override 派生）
    pub fn with_default_unit_price(repo: Arc<R>, default_unit_price: f64) -> Self {
        Self {
            importer: OrderImporter::new(repo).with_default_unit_price(default_unit_price),
        }
    }

    /// 从文件导入（.xlsx/.xls/.csv）
    pub async fn import_file<P: AsRef<Path>>(&self, file_path: P) -> ApiResult<ImportReport> {
        let report = self.importer.import_from_file(file_path).await?;
        info!(
            batch_id = %report.batch_id,
            imported = report.imported_count,
            errors = report.error_count,
            "文件导入完成"
        );
        Ok(report)
    }

    /// 推送已解析的行集合（外部系统对接）
    pub async fn import_rows(&self, rows: Vec<ParsedRow>) -> ApiResult<ImportReport> {
        let report = self.importer.import_rows(rows, OrderSource::Api).await?;
        info!(
            batch_id = %report.batch_id,
            imported = report.imported_count,
            errors = report.error_count,
            "行集合导入完成"
        );
        Ok(report)
    }
}
