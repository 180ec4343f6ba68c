// ==========================================
// 辅祭排班系统 - 重算/补位引擎
// ==========================================
// 职责: 增量补位 / 全量重算
// 顺序: 庄严弥撒优先 → 开始时间升序 → 团体代码 → 事件ID
// 输入: 工作副本快照 + 可选日期区间
// 输出: 快照内的排班结果被原地更新 + RecalcResult
// 红线: 职务包无法解析时整轮中止; 单席位无人可排只留空不中止
// ==========================================

use crate::config::RosterConfig;
use crate::engine::role_pack::RolePackResolver;
use crate::engine::selection::SelectionEngine;
use std::sync::Arc;

mod core;
mod ops;
mod types;

pub use types::{RecalcMode, RecalcResult, VacancyReport};

// ==========================================
// RecalcEngine - 重算引擎
// ==========================================
// 单轮计算同步、单线程; 每次选中立即写回,后续席位可见
pub struct RecalcEngine {
    config: Arc<RosterConfig>,
    packs: RolePackResolver,
    selection: SelectionEngine,
}
