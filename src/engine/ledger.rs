// ==========================================
// 辅祭排班系统 - 排班台账
// ==========================================
// 职责: 按人员索引已排席位,支撑时间窗统计与防撞判定
// 说明: 每轮计算开始时由排班结果重建,选中后即时追加
// ==========================================

use crate::domain::assignment::AssignmentMap;
use crate::domain::event::{Event, TimeWindow};
use crate::domain::types::{RoleCode, RoleSlot};
use chrono::{DateTime, Duration, FixedOffset};
use std::collections::BTreeMap;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    pub event_id: Uuid,
    pub slot: RoleSlot,
    pub start: DateTime<FixedOffset>,
    pub window: TimeWindow,
}

impl LedgerEntry {
    fn sort_key(&self) -> (DateTime<FixedOffset>, Uuid, RoleSlot) {
        (self.start, self.event_id, self.slot)
    }
}

#[derive(Debug, Clone, Default)]
pub struct AssignmentLedger {
    // 每人按开始时间升序
    by_person: BTreeMap<Uuid, Vec<LedgerEntry>>,
}

impl AssignmentLedger {
    /// 由排班结果重建台账（引用不存在事件的记录被忽略）
    pub fn build(
        assignments: &AssignmentMap,
        events: &BTreeMap<Uuid, Event>,
        overlap_guard: Duration,
    ) -> Self {
        let mut ledger = Self::default();
        for (event_id, slot, person_id) in assignments.iter() {
            if let Some(event) = events.get(&event_id) {
                ledger.record(person_id, event, slot, overlap_guard);
            }
        }
        ledger
    }

    pub fn record(&mut self, person_id: Uuid, event: &Event, slot: RoleSlot, overlap_guard: Duration) {
        let entry = LedgerEntry {
            event_id: event.id,
            slot,
            start: event.start,
            window: event.window(overlap_guard),
        };
        let entries = self.by_person.entry(person_id).or_default();
        let key = entry.sort_key();
        match entries.binary_search_by(|held| held.sort_key().cmp(&key)) {
            Ok(_) => {}
            Err(pos) => entries.insert(pos, entry),
        }
    }

    pub fn remove(&mut self, person_id: &Uuid, event_id: &Uuid, slot: &RoleSlot) {
        if let Some(entries) = self.by_person.get_mut(person_id) {
            entries.retain(|entry| !(entry.event_id == *event_id && entry.slot == *slot));
            if entries.is_empty() {
                self.by_person.remove(person_id);
            }
        }
    }

    pub fn entries(&self, person_id: &Uuid) -> &[LedgerEntry] {
        self.by_person
            .get(person_id)
            .map(|entries| entries.as_slice())
            .unwrap_or(&[])
    }

    /// 开始时间落在 [from, to) 的记录
    pub fn in_range(
        &self,
        person_id: &Uuid,
        from: DateTime<FixedOffset>,
        to: DateTime<FixedOffset>,
    ) -> &[LedgerEntry] {
        let entries = self.entries(person_id);
        let lo = entries.partition_point(|entry| entry.start < from);
        let hi = entries.partition_point(|entry| entry.start < to);
        if lo >= hi {
            &[]
        } else {
            &entries[lo..hi]
        }
    }

    pub fn count_in_range(
        &self,
        person_id: &Uuid,
        from: DateTime<FixedOffset>,
        to: DateTime<FixedOffset>,
    ) -> usize {
        self.in_range(person_id, from, to).len()
    }

    pub fn role_count_in_range(
        &self,
        person_id: &Uuid,
        role: RoleCode,
        from: DateTime<FixedOffset>,
        to: DateTime<FixedOffset>,
    ) -> usize {
        self.in_range(person_id, from, to)
            .iter()
            .filter(|entry| entry.slot.role == role)
            .count()
    }

    /// 严格早于 before 的最近一次服务
    pub fn latest_before(&self, person_id: &Uuid, before: DateTime<FixedOffset>) -> Option<DateTime<FixedOffset>> {
        let entries = self.entries(person_id);
        let idx = entries.partition_point(|entry| entry.start < before);
        idx.checked_sub(1).map(|i| entries[i].start)
    }
}
