// ==========================================
// 辅祭排班系统 - 引擎层
// ==========================================
// 职责: 实现排班规则,不做 I/O
// 红线: 同输入必同输出; 所有选择必须可解释（层级 + 评分明细）
// ==========================================

pub mod audit;
pub mod availability;
pub mod error;
pub mod ledger;
pub mod manual;
pub mod recalc;
pub mod role_pack;
pub mod scoring;
pub mod selection;
pub mod workload;

// 重导出核心引擎
pub use audit::{
    FreeSlot, IssueKind, IssueSeverity, PersonWorkload, ScheduleAuditor, ScheduleIssue,
    WorkloadStats,
};
pub use availability::AvailabilityChecker;
pub use error::{EngineError, EngineResult};
pub use ledger::{AssignmentLedger, LedgerEntry};
pub use manual::{Advisory, ForceAssignOutcome, ManualOps, SwapOutcome};
pub use recalc::{RecalcEngine, RecalcMode, RecalcResult, VacancyReport};
pub use role_pack::RolePackResolver;
pub use scoring::{CandidateRanker, ScoreBreakdown, ScoreInput};
pub use selection::{Candidate, SelectionContext, SelectionEngine, SelectionTier};
pub use workload::WorkloadAccountant;
