// ==========================================
// 辅祭排班系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供数据访问接口,屏蔽存储细节
// ==========================================

pub mod error;
pub mod in_memory_store;
pub mod roster_provider;

// 重导出核心仓储
pub use error::{RepositoryError, RepositoryResult};
pub use in_memory_store::InMemoryRosterStore;
pub use roster_provider::{AssignmentStore, BlackoutProvider, EventProvider, RosterProvider};
