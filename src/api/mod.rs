// ==========================================
// 辅祭排班系统 - API 层
// ==========================================
// 职责: 对外异步接口,组合配置、仓储与引擎
// ==========================================

pub mod error;
pub mod roster_api;

pub use error::{ApiError, ApiResult};
pub use roster_api::RosterApi;
