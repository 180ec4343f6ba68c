// ==========================================
// 辅祭排班系统 - 可用性与防撞判定
// ==========================================
// 职责: 硬性排除（不参与评分）
// - 不可用时段: 弥撒开始时间落在 [start, end] 内
// - 时间冲突: 已排的其他弥撒有效时间窗与本场严格重叠
// ==========================================

use crate::domain::event::Event;
use crate::domain::person::AvailabilityBlock;
use crate::engine::ledger::AssignmentLedger;
use chrono::Duration;
use uuid::Uuid;

#[derive(Debug, Clone, Copy)]
pub struct AvailabilityChecker {
    overlap_guard: Duration,
}

impl AvailabilityChecker {
    pub fn new(overlap_guard: Duration) -> Self {
        Self { overlap_guard }
    }

    pub fn overlap_guard(&self) -> Duration {
        self.overlap_guard
    }

    pub fn is_blocked(&self, blocks: &[AvailabilityBlock], event: &Event) -> bool {
        blocks.iter().any(|block| block.contains(event.start))
    }

    /// 与该人已排的其他事件冲突的事件ID（按开始时间）
    pub fn conflicting_events(&self, ledger: &AssignmentLedger, person_id: &Uuid, event: &Event) -> Vec<Uuid> {
        let window = event.window(self.overlap_guard);
        let mut hits: Vec<Uuid> = ledger
            .entries(person_id)
            .iter()
            .filter(|entry| entry.event_id != event.id && entry.window.overlaps(&window))
            .map(|entry| entry.event_id)
            .collect();
        hits.dedup();
        hits
    }

    pub fn has_conflict(&self, ledger: &AssignmentLedger, person_id: &Uuid, event: &Event) -> bool {
        let window = event.window(self.overlap_guard);
        ledger
            .entries(person_id)
            .iter()
            .any(|entry| entry.event_id != event.id && entry.window.overlaps(&window))
    }
}
