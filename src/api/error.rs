// ==========================================
// 辅祭排班系统 - API层错误类型
// ==========================================
// 职责: 汇总引擎/仓储/配置错误,转换为调用方可读的错误
// 红线: 所有错误信息必须包含显式原因
// ==========================================

use crate::config::ConfigError;
use crate::domain::types::RoleSlot;
use crate::engine::EngineError;
use crate::repository::error::RepositoryError;
use thiserror::Error;
use uuid::Uuid;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 排班规则错误
    // ==========================================
    #[error("无可用人选: event_id={event_id}, slot={slot}")]
    NoCandidate { event_id: Uuid, slot: RoleSlot },

    #[error("排班冲突: {0}")]
    Conflict(String),

    #[error("配置错误: {0}")]
    Configuration(String),

    // ==========================================
    // 输入错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("数据验证失败: {0}")]
    ValidationError(String),

    // ==========================================
    // 存储错误
    // ==========================================
    #[error("存储错误: {0}")]
    StorageError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::NoCandidate { event_id, slot } => ApiError::NoCandidate { event_id, slot },
            EngineError::Conflict(msg) => ApiError::Conflict(msg),
            EngineError::Configuration(msg) => ApiError::Configuration(msg),
            EngineError::Validation(msg) => ApiError::ValidationError(msg),
        }
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        ApiError::Configuration(err.to_string())
    }
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::LockError(msg) => {
                ApiError::StorageError(format!("存储锁获取失败: {}", msg))
            }
            RepositoryError::ValidationError(msg) => ApiError::ValidationError(msg),
            RepositoryError::SerializationError(msg) => ApiError::StorageError(msg),
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
