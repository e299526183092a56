// ==========================================
// Tiffin 配送订单后台 - 调用方凭据
// ==========================================
// 职责: 破坏性操作（清空全库等）的管理员门禁
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use serde::{Deserialize, Serialize};

// ==========================================
// Caller - 调用方上下文
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Caller {
    pub operator_id: String,
    pub is_admin: bool,
}

impl Caller {
    pub fn admin(operator_id: &str) -> Self {
        Self {
            operator_id: operator_id.to_string(),
            is_admin: true,
        }
    }

    pub fn operator(operator_id: &str) -> Self {
        Self {
            operator_id: operator_id.to_string(),
            is_admin: false,
        }
    }
}

/// 管理员门禁：非管理员直接拒绝
pub fn ensure_admin(caller: &Caller, operation: &str) -> ApiResult<()> {
    if !caller.is_admin {
        return Err(ApiError::Unauthorized(format!(
            "操作 {} 需要管理员权限 (operator={})",
            operation, caller.operator_id
        )));
    }
    Ok(())
}
