// ==========================================
// 辅祭排班系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod assignment;
pub mod error;
pub mod event;
pub mod person;
pub mod snapshot;
pub mod types;

// 重导出核心类型
pub use assignment::{AssignmentMap, EventAssignments};
pub use error::DomainError;
pub use event::{Event, Period, TimeWindow};
pub use person::{AvailabilityBlock, Person};
pub use snapshot::RosterSnapshot;
pub use types::{fold_key, Affiliation, EventKind, RoleCode, RoleSlot};
