use crate::domain::types::RoleSlot;
use crate::engine::selection::SelectionTier;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

// ==========================================
// RecalcMode - 计算模式
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecalcMode {
    /// 增量补位: 只填空席位,已有排班不动
    FillVacancies,
    /// 全量重算: 区间内排班清空后重新分配
    FullRecompute,
}

// ==========================================
// VacancyReport - 留空席位
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VacancyReport {
    pub event_id: Uuid,
    pub event_key: String, // 人可读事件键
    pub slot: RoleSlot,
    pub reason: String,
}

// ==========================================
// RecalcResult - 单轮计算结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecalcResult {
    pub mode: RecalcMode,
    pub events_processed: usize,                   // 参与计算的事件数
    pub slots_filled: usize,                       // 新填席位数
    pub vacancies: Vec<VacancyReport>,             // 无人可排的席位
    pub assignments_cleared: usize,                // 全量重算前清除的席位数
    pub tier_counts: BTreeMap<SelectionTier, usize>, // 各回退层级命中次数
    pub elapsed_ms: i64,                           // 耗时(毫秒)
}

impl RecalcResult {
    pub(crate) fn new(mode: RecalcMode) -> Self {
        Self {
            mode,
            events_processed: 0,
            slots_filled: 0,
            vacancies: Vec::new(),
            assignments_cleared: 0,
            tier_counts: BTreeMap::new(),
            elapsed_ms: 0,
        }
    }

    /// 通过回退层级（非 A 层）选中的次数
    pub fn fallback_count(&self) -> usize {
        self.tier_counts
            .iter()
            .filter(|(tier, _)| tier.is_fallback())
            .map(|(_, count)| *count)
            .sum()
    }
}
