// ==========================================
// 辅祭排班系统 - 人工干预操作
// ==========================================
// 职责: 候选建议 / 强制指派 / 清空 / 互换 / 区间重置
// 红线:
// - 职务资格始终强制（ValidationError）
// - 真实撞班、同场重复为 ConflictError
// - 不可用时段、公平性、团体归属只作提示,不拒绝
// ==========================================

use crate::config::RosterConfig;
use crate::domain::event::{Event, Period};
use crate::domain::person::Person;
use crate::domain::snapshot::RosterSnapshot;
use crate::domain::types::{Affiliation, RoleSlot};
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::ledger::AssignmentLedger;
use crate::engine::role_pack::RolePackResolver;
use crate::engine::selection::{Candidate, SelectionContext, SelectionEngine};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ==========================================
// Advisory - 强制指派提示
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Advisory {
    /// 弥撒开始时间落在不可用时段内
    Blocked,
    /// 再排一次超出工作量阈值
    OverThreshold { window_count: usize, threshold: f64 },
    /// 人员与弥撒不属于同一团体
    OtherAffiliation { person: Affiliation, event: Affiliation },
    Inactive,
    /// 人员不在事件的限定候选池内
    OutsidePool,
}

impl Advisory {
    pub fn message(&self) -> String {
        match self {
            Advisory::Blocked => "处于不可用时段".to_string(),
            Advisory::OverThreshold {
                window_count,
                threshold,
            } => format!("窗口内已服务 {} 次,超出阈值 {:.2}", window_count, threshold),
            Advisory::OtherAffiliation { person, event } => {
                format!("人员属于 {},弥撒属于 {}", person, event)
            }
            Advisory::Inactive => "人员不在岗".to_string(),
            Advisory::OutsidePool => "人员不在限定候选池内".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForceAssignOutcome {
    pub previous: Option<Uuid>,
    pub advisories: Vec<Advisory>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwapOutcome {
    /// 移入 A 席位的人员
    pub now_in_a: Option<Uuid>,
    /// 移入 B 席位的人员
    pub now_in_b: Option<Uuid>,
}

// ==========================================
// ManualOps - 人工干预服务
// ==========================================
pub struct ManualOps {
    packs: RolePackResolver,
    selection: SelectionEngine,
    overlap_guard: chrono::Duration,
}

impl ManualOps {
    pub fn new(config: &RosterConfig) -> Self {
        Self {
            packs: RolePackResolver::from_config(&config.role_packs),
            selection: SelectionEngine::from_config(config),
            overlap_guard: config.overlap_guard(),
        }
    }

    fn event<'a>(snapshot: &'a RosterSnapshot, event_id: &Uuid) -> EngineResult<&'a Event> {
        snapshot
            .events
            .get(event_id)
            .ok_or_else(|| EngineError::Validation(format!("事件不存在: {}", event_id)))
    }

    fn person<'a>(snapshot: &'a RosterSnapshot, person_id: &Uuid) -> EngineResult<&'a Person> {
        snapshot
            .people
            .get(person_id)
            .ok_or_else(|| EngineError::Validation(format!("人员不存在: {}", person_id)))
    }

    fn ensure_slot(&self, event: &Event, slot: &RoleSlot) -> EngineResult<()> {
        if self.packs.slot_exists(event.quantity, slot)? {
            Ok(())
        } else {
            Err(EngineError::Validation(format!(
                "事件 {} 没有席位 {}",
                event.key(),
                slot
            )))
        }
    }

    fn ensure_qualified(person: &Person, slot: &RoleSlot) -> EngineResult<()> {
        if person.is_qualified(slot.role) {
            Ok(())
        } else {
            Err(EngineError::Validation(format!(
                "{} 不具备职务 {}",
                person.name, slot.role
            )))
        }
    }

    /// 人员是否占用该事件除 slot 外的其他席位
    fn holds_other_slot(snapshot: &RosterSnapshot, event_id: &Uuid, slot: &RoleSlot, person_id: &Uuid) -> bool {
        snapshot
            .assignments
            .for_event(event_id)
            .map(|slots| slots.iter().any(|(held, pid)| held != slot && pid == person_id))
            .unwrap_or(false)
    }

    /// 候选建议（只读,不写入）
    ///
    /// # 参数
    /// - top_n: 返回前 N 名
    pub fn suggest(
        &self,
        snapshot: &RosterSnapshot,
        event_id: Uuid,
        slot: RoleSlot,
        top_n: usize,
    ) -> EngineResult<Vec<Candidate>> {
        let event = Self::event(snapshot, &event_id)?;
        self.ensure_slot(event, &slot)?;

        let ledger = AssignmentLedger::build(&snapshot.assignments, &snapshot.events, self.overlap_guard);
        let ctx = SelectionContext {
            people: &snapshot.people,
            blocks: &snapshot.blocks,
            assignments: &snapshot.assignments,
            ledger: &ledger,
        };
        let mut ranked = self.selection.evaluate(&ctx, event, slot);
        ranked.truncate(top_n);
        Ok(ranked)
    }

    /// 强制指派
    ///
    /// # 返回
    /// - previous: 原占位人
    /// - advisories: 软性条件提示（不阻止指派）
    ///
    /// # 错误
    /// - Validation: 事件/人员/席位不存在, 或不具备职务
    /// - Conflict: 已占本场其他席位, 或与其他弥撒时间冲突
    pub fn force_assign(
        &self,
        snapshot: &mut RosterSnapshot,
        event_id: Uuid,
        slot: RoleSlot,
        person_id: Uuid,
    ) -> EngineResult<ForceAssignOutcome> {
        let advisories = {
            let event = Self::event(snapshot, &event_id)?;
            let person = Self::person(snapshot, &person_id)?;
            self.ensure_slot(event, &slot)?;
            Self::ensure_qualified(person, &slot)?;

            if Self::holds_other_slot(snapshot, &event_id, &slot, &person_id) {
                return Err(EngineError::Conflict(format!(
                    "{} 已在 {} 担任其他职务",
                    person.name,
                    event.key()
                )));
            }

            let ledger = AssignmentLedger::build(&snapshot.assignments, &snapshot.events, self.overlap_guard);
            let clashes = self
                .selection
                .availability()
                .conflicting_events(&ledger, &person_id, event);
            if let Some(other) = clashes.first().and_then(|id| snapshot.events.get(id)) {
                return Err(EngineError::Conflict(format!(
                    "{} 与 {} 时间冲突",
                    person.name,
                    other.key()
                )));
            }

            let ctx = SelectionContext {
                people: &snapshot.people,
                blocks: &snapshot.blocks,
                assignments: &snapshot.assignments,
                ledger: &ledger,
            };
            self.advisories(&ctx, snapshot, event, slot, person)
        };

        let previous = snapshot.assignments.assign(event_id, slot, person_id);
        tracing::info!(
            event_id = %event_id,
            slot = %slot,
            person_id = %person_id,
            previous = ?previous,
            advisories = advisories.len(),
            "强制指派"
        );
        Ok(ForceAssignOutcome {
            previous,
            advisories,
        })
    }

    fn advisories(
        &self,
        ctx: &SelectionContext<'_>,
        snapshot: &RosterSnapshot,
        event: &Event,
        slot: RoleSlot,
        person: &Person,
    ) -> Vec<Advisory> {
        let mut advisories = Vec::new();
        if !person.active {
            advisories.push(Advisory::Inactive);
        }
        if let Some(pool) = event.restricted_pool() {
            if !pool.contains(&person.id) {
                advisories.push(Advisory::OutsidePool);
            }
        }
        if self
            .selection
            .availability()
            .is_blocked(snapshot.blocks_for(&person.id), event)
        {
            advisories.push(Advisory::Blocked);
        }
        let workload = self.selection.workload();
        let window_count = workload.window_count(ctx.ledger, &person.id, event.start);
        let threshold = self.selection.threshold_for(ctx, event, slot);
        if !workload.is_valid(window_count, threshold) {
            advisories.push(Advisory::OverThreshold {
                window_count,
                threshold,
            });
        }
        if person.affiliation != event.affiliation {
            advisories.push(Advisory::OtherAffiliation {
                person: person.affiliation,
                event: event.affiliation,
            });
        }
        advisories
    }

    /// 清空席位,返回原占位人
    pub fn clear(&self, snapshot: &mut RosterSnapshot, event_id: Uuid, slot: RoleSlot) -> EngineResult<Option<Uuid>> {
        Self::event(snapshot, &event_id)?;
        let previous = snapshot.assignments.clear(&event_id, &slot);
        tracing::info!(event_id = %event_id, slot = %slot, previous = ?previous, "清空席位");
        Ok(previous)
    }

    /// 互换两个席位的占位人（允许其中一个为空）
    ///
    /// # 错误
    /// - Validation: 席位不存在 / 同一席位 / 两席位均为空 / 移入者不具备职务
    /// - Conflict: 移入者已占目标事件的其他席位
    pub fn swap(
        &self,
        snapshot: &mut RosterSnapshot,
        event_a: Uuid,
        slot_a: RoleSlot,
        event_b: Uuid,
        slot_b: RoleSlot,
    ) -> EngineResult<SwapOutcome> {
        if event_a == event_b && slot_a == slot_b {
            return Err(EngineError::Validation("不能与自身互换".to_string()));
        }
        let ev_a = Self::event(snapshot, &event_a)?;
        let ev_b = Self::event(snapshot, &event_b)?;
        self.ensure_slot(ev_a, &slot_a)?;
        self.ensure_slot(ev_b, &slot_b)?;

        let holder_a = snapshot.assignments.get(&event_a, &slot_a);
        let holder_b = snapshot.assignments.get(&event_b, &slot_b);
        if holder_a.is_none() && holder_b.is_none() {
            return Err(EngineError::Validation("两个席位均无人,无可互换".to_string()));
        }

        // A 的占位人移到 B, B 的占位人移到 A
        let moves = [
            (holder_a, ev_b, event_b, slot_b),
            (holder_b, ev_a, event_a, slot_a),
        ];
        for (mover, target, target_id, target_slot) in moves {
            let Some(person_id) = mover else { continue };
            let person = Self::person(snapshot, &person_id)?;
            Self::ensure_qualified(person, &target_slot)?;
            if event_a != event_b && Self::holds_other_slot(snapshot, &target_id, &target_slot, &person_id) {
                return Err(EngineError::Conflict(format!(
                    "{} 已在 {} 担任其他职务",
                    person.name,
                    target.key()
                )));
            }
        }

        match holder_b {
            Some(person_id) => snapshot.assignments.assign(event_a, slot_a, person_id),
            None => snapshot.assignments.clear(&event_a, &slot_a),
        };
        match holder_a {
            Some(person_id) => snapshot.assignments.assign(event_b, slot_b, person_id),
            None => snapshot.assignments.clear(&event_b, &slot_b),
        };

        tracing::info!(
            event_a = %event_a,
            slot_a = %slot_a,
            event_b = %event_b,
            slot_b = %slot_b,
            "互换席位"
        );
        Ok(SwapOutcome {
            now_in_a: holder_b,
            now_in_b: holder_a,
        })
    }

    /// 清除区间内（None 为全部）事件的排班,返回清除的席位数
    pub fn reset(&self, snapshot: &mut RosterSnapshot, period: Option<Period>) -> usize {
        let targets: Vec<Uuid> = snapshot
            .events
            .values()
            .filter(|event| period.map_or(true, |p| p.contains_event(event)))
            .map(|event| event.id)
            .collect();
        let cleared: usize = targets
            .iter()
            .map(|event_id| snapshot.assignments.remove_event(event_id))
            .sum();
        tracing::info!(period = ?period, cleared, "区间排班已重置");
        cleared
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::person::AvailabilityBlock;
    use crate::domain::types::{EventKind, RoleCode};
    use chrono::{DateTime, FixedOffset, TimeZone};

    fn ts(day: u32, hour: u32, minute: u32) -> DateTime<FixedOffset> {
        FixedOffset::west_opt(3 * 3600)
            .unwrap()
            .with_ymd_and_hms(2025, 9, day, hour, minute, 0)
            .unwrap()
    }

    struct World {
        snapshot: RosterSnapshot,
        ana: Uuid,
        bia: Uuid,
        caio: Uuid,
        morning: Uuid,
        late: Uuid,
    }

    fn world() -> World {
        let ana = Person::new("Ana", Affiliation::Mat)
            .unwrap()
            .with_roles([RoleCode::Lib, RoleCode::Cru]);
        let bia = Person::new("Bia", Affiliation::Stm)
            .unwrap()
            .with_roles([RoleCode::Lib, RoleCode::Cru]);
        let caio = Person::new("Caio", Affiliation::Mat).unwrap().with_roles([RoleCode::Cru]);
        let morning = Event::new(Affiliation::Mat, ts(7, 10, 0), 2, EventKind::Regular).unwrap();
        let late = Event::new(Affiliation::Mat, ts(7, 11, 30), 2, EventKind::Regular).unwrap();
        World {
            ana: ana.id,
            bia: bia.id,
            caio: caio.id,
            morning: morning.id,
            late: late.id,
            snapshot: RosterSnapshot::from_parts(
                vec![ana, bia, caio],
                vec![morning, late],
                Vec::new(),
                Default::default(),
            ),
        }
    }

    fn ops() -> ManualOps {
        ManualOps::new(&RosterConfig::default())
    }

    const LIB: RoleSlot = RoleSlot { role: RoleCode::Lib, ordinal: 1 };
    const CRU: RoleSlot = RoleSlot { role: RoleCode::Cru, ordinal: 1 };

    #[test]
    fn test_force_assign_requires_qualification() {
        let mut w = world();
        let err = ops().force_assign(&mut w.snapshot, w.morning, LIB, w.caio).unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[test]
    fn test_force_assign_rejects_unknown_slot() {
        let mut w = world();
        let cam = RoleSlot::first(RoleCode::Cam);
        let err = ops().force_assign(&mut w.snapshot, w.morning, cam, w.ana).unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[test]
    fn test_force_assign_rejects_double_booking() {
        let mut w = world();
        ops().force_assign(&mut w.snapshot, w.morning, LIB, w.ana).unwrap();
        // 10:00 + 110 分钟 与 11:30 重叠
        let err = ops().force_assign(&mut w.snapshot, w.late, LIB, w.ana).unwrap_err();
        assert!(matches!(err, EngineError::Conflict(_)));
        // 同场第二个席位
        let err = ops().force_assign(&mut w.snapshot, w.morning, CRU, w.ana).unwrap_err();
        assert!(matches!(err, EngineError::Conflict(_)));
    }

    #[test]
    fn test_force_assign_returns_advisories() {
        let mut w = world();
        w.snapshot.blocks.insert(
            w.bia,
            vec![AvailabilityBlock::new(w.bia, ts(7, 9, 0), ts(7, 12, 0), None).unwrap()],
        );
        let outcome = ops().force_assign(&mut w.snapshot, w.morning, LIB, w.bia).unwrap();
        assert_eq!(outcome.previous, None);
        assert!(outcome.advisories.contains(&Advisory::Blocked));
        assert!(outcome.advisories.contains(&Advisory::OtherAffiliation {
            person: Affiliation::Stm,
            event: Affiliation::Mat,
        }));
        assert_eq!(w.snapshot.assignments.get(&w.morning, &LIB), Some(w.bia));

        let outcome = ops().force_assign(&mut w.snapshot, w.morning, LIB, w.ana).unwrap();
        assert_eq!(outcome.previous, Some(w.bia));
        assert!(outcome.advisories.is_empty());
    }

    #[test]
    fn test_clear_returns_previous_holder() {
        let mut w = world();
        ops().force_assign(&mut w.snapshot, w.morning, LIB, w.ana).unwrap();
        assert_eq!(ops().clear(&mut w.snapshot, w.morning, LIB).unwrap(), Some(w.ana));
        assert_eq!(ops().clear(&mut w.snapshot, w.morning, LIB).unwrap(), None);
    }

    #[test]
    fn test_swap_with_empty_slot_moves_person() {
        let mut w = world();
        ops().force_assign(&mut w.snapshot, w.morning, LIB, w.ana).unwrap();
        let outcome = ops().swap(&mut w.snapshot, w.morning, LIB, w.late, CRU).unwrap();
        assert_eq!(outcome.now_in_b, Some(w.ana));
        assert_eq!(outcome.now_in_a, None);
        assert_eq!(w.snapshot.assignments.get(&w.late, &CRU), Some(w.ana));
        assert!(!w.snapshot.assignments.is_assigned(&w.morning, &LIB));
    }

    #[test]
    fn test_swap_checks_qualification() {
        let mut w = world();
        ops().force_assign(&mut w.snapshot, w.morning, LIB, w.ana).unwrap();
        ops().force_assign(&mut w.snapshot, w.late, CRU, w.caio).unwrap();
        // Caio 不具备 LIB
        let err = ops().swap(&mut w.snapshot, w.morning, LIB, w.late, CRU).unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
        assert_eq!(w.snapshot.assignments.get(&w.morning, &LIB), Some(w.ana));
        assert_eq!(w.snapshot.assignments.get(&w.late, &CRU), Some(w.caio));
    }

    #[test]
    fn test_swap_rejects_duplicate_within_event() {
        let mut w = world();
        let third = Event::new(Affiliation::Mat, ts(14, 10, 0), 2, EventKind::Regular).unwrap();
        let third_id = third.id;
        w.snapshot.events.insert(third.id, third);
        ops().force_assign(&mut w.snapshot, w.morning, LIB, w.ana).unwrap();
        ops().force_assign(&mut w.snapshot, w.morning, CRU, w.bia).unwrap();
        ops().force_assign(&mut w.snapshot, third_id, LIB, w.bia).unwrap();

        // Bia 移入 morning/LIB 时已占 morning/CRU
        let err = ops().swap(&mut w.snapshot, third_id, LIB, w.morning, LIB).unwrap_err();
        assert!(matches!(err, EngineError::Conflict(_)));
    }

    #[test]
    fn test_swap_both_empty_is_validation_error() {
        let mut w = world();
        let err = ops().swap(&mut w.snapshot, w.morning, LIB, w.late, LIB).unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[test]
    fn test_suggest_is_read_only() {
        let w = world();
        let before = w.snapshot.clone();
        let ranked = ops().suggest(&w.snapshot, w.morning, CRU, 2).unwrap();
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].person_id, w.ana);
        assert_eq!(w.snapshot, before);
    }

    #[test]
    fn test_reset_period() {
        let mut w = world();
        ops().force_assign(&mut w.snapshot, w.morning, LIB, w.ana).unwrap();
        ops().force_assign(&mut w.snapshot, w.late, LIB, w.bia).unwrap();
        let outside = Period::starting(ts(8, 0, 0).date_naive(), 5).unwrap();
        assert_eq!(ops().reset(&mut w.snapshot, Some(outside)), 0);
        assert_eq!(ops().reset(&mut w.snapshot, None), 2);
        assert!(w.snapshot.assignments.is_empty());
    }
}
