// ==========================================
// Tiffin 配送订单后台 - API 层错误类型
// ==========================================
// 职责: 定义 API 层错误类型，转换下层技术错误为业务口径
// 约定: 所有错误信息必须包含显式原因
// ==========================================

use crate::importer::ImportError;
use crate::repository::RepositoryError;
use thiserror::Error;

/// API 层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ===== 权限错误 =====
    #[error("权限不足: {0}")]
    Unauthorized(String),

    // ===== 业务规则错误 =====
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("订单标识重复: {0}")]
    DuplicateIdentifier(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    // ===== 导入错误 =====
    #[error("文件导入失败: {0}")]
    ImportError(String),

    // ===== 数据访问错误 =====
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    // ===== 通用错误 =====
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ==========================================
// 从下层错误转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{} (id={})", entity, id))
            }
            RepositoryError::UniqueConstraintViolation(msg) => ApiError::DuplicateIdentifier(msg),
            RepositoryError::ValidationError(msg)
            | RepositoryError::FieldValueError { message: msg, .. } => {
                ApiError::InvalidInput(msg)
            }
            RepositoryError::DatabaseConnectionError(msg) => ApiError::DatabaseConnectionError(msg),
            other => ApiError::DatabaseError(other.to_string()),
        }
    }
}

impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::RepositoryError(repo) => ApiError::from(repo),
            other => ApiError::ImportError(other.to_string()),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
