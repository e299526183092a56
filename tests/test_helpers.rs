// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的临时数据库与常用构造器
// ==========================================

use std::sync::Arc;
use tempfile::NamedTempFile;
use tiffin_backoffice::config::ConfigManager;
use tiffin_backoffice::repository::OrderRepositoryImpl;

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> (NamedTempFile, String) {
    let temp_file = NamedTempFile::new().expect("创建临时文件失败");
    let db_path = temp_file.path().to_str().unwrap().to_string();
    tiffin_backoffice::db::open_and_init(&db_path).expect("初始化测试数据库失败");
    (temp_file, db_path)
}

/// 临时数据库上的仓储 + 配置管理器
pub fn create_repo_and_config() -> (NamedTempFile, Arc<OrderRepositoryImpl>, Arc<ConfigManager>) {
    let (temp_file, db_path) = create_test_db();
    let repo = Arc::new(OrderRepositoryImpl::new(&db_path).expect("创建仓储失败"));
    let config = Arc::new(ConfigManager::new(&db_path).expect("创建配置管理器失败"));
    (temp_file, repo, config)
}
