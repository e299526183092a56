// ==========================================
// Tiffin 配送订单后台 - 订单仓储接口
// ==========================================
// 职责: 定义订单存储的抽象接口，屏蔽数据库细节
// 红线: Repository 不含业务逻辑；所有查询参数化
// ==========================================

use crate::domain::Order;
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// ==========================================
// BulkUpsertOutcome - 批量写入结果
// ==========================================
// 批量写入按“无序批次”语义执行: 单条失败不中断其余记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkUpsertOutcome {
    /// 成功写入（插入或按键覆盖）的记录数
    pub written: usize,
    /// 失败记录: (order_id, 失败原因)
    pub failures: Vec<(String, String)>,
}

// ==========================================
// OrderRepository - 订单仓储接口
// ==========================================
/// 订单仓储接口
///
/// # 约定
/// - order_id 唯一约束由存储层强制（主键），仓储方法不做业务裁决
/// - create 使用纯 INSERT: 并发竞态下后到者以唯一约束冲突失败，绝不覆盖
/// - bulk_upsert 按 order_id 做幂等 upsert: 重复导入同一文件结果不变
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// 全量快照（查询/分析引擎的读取口径）
    async fn find_all(&self) -> RepositoryResult<Vec<Order>>;

    /// 按标识查询
    async fn find_by_order_id(&self, order_id: &str) -> RepositoryResult<Option<Order>>;

    /// 标识存在性探测（标识生成器的碰撞检查）
    async fn exists_order_id(&self, order_id: &str) -> RepositoryResult<bool>;

    /// 当前存量标识全集（去重折叠的初始工作集）
    async fn existing_order_ids(&self) -> RepositoryResult<HashSet<String>>;

    /// 新建（纯 INSERT，唯一约束冲突时返回 UniqueConstraintViolation）
    async fn create(&self, order: &Order) -> RepositoryResult<()>;

    /// 按标识整行更新
    async fn update(&self, order: &Order) -> RepositoryResult<()>;

    /// 按标识物理删除；返回是否确有删除
    async fn delete_by_order_id(&self, order_id: &str) -> RepositoryResult<bool>;

    /// 全量物理删除；返回删除条数
    async fn delete_all(&self) -> RepositoryResult<usize>;

    /// 存量计数
    async fn count(&self) -> RepositoryResult<usize>;

    /// 批量 upsert（按 order_id 键，单条失败不中断批次）
    async fn bulk_upsert(&self, orders: &[Order]) -> RepositoryResult<BulkUpsertOutcome>;
}
