// ==========================================
// 辅祭排班系统 - 引擎层错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use crate::config::ConfigError;
use crate::domain::error::DomainError;
use crate::domain::types::RoleSlot;
use thiserror::Error;
use uuid::Uuid;

/// 引擎层错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// 职务包无法解析等配置问题,整轮计算中止
    #[error("配置错误: {0}")]
    Configuration(String),

    #[error("校验失败: {0}")]
    Validation(String),

    /// 单个席位无人可排,席位留空,本轮继续
    #[error("无可用人选: event_id={event_id}, slot={slot}")]
    NoCandidate { event_id: Uuid, slot: RoleSlot },

    #[error("排班冲突: {0}")]
    Conflict(String),
}

pub type EngineResult<T> = Result<T, EngineError>;

impl From<DomainError> for EngineError {
    fn from(err: DomainError) -> Self {
        EngineError::Validation(err.to_string())
    }
}

impl From<ConfigError> for EngineError {
    fn from(err: ConfigError) -> Self {
        EngineError::Configuration(err.to_string())
    }
}
