// ==========================================
// 辅祭排班系统 - 席位选人引擎
// ==========================================
// 流程:
// 1. 硬性排除: 不在岗 / 无该职务 / 不可用时段 / 时间冲突 / 已占本场其他席位
// 2. 计算阈值与每人溢出量
// 3. 按 本团体/外团体 × 阈值内/超阈值 分层
// 4. 层级: A 本团体阈值内 > B 外团体阈值内 > C 本团体(溢出升序) > D 外团体(溢出升序)
// 红线: 同输入必同输出（不含任何随机性）
// ==========================================

use crate::config::RosterConfig;
use crate::domain::assignment::AssignmentMap;
use crate::domain::event::Event;
use crate::domain::person::{AvailabilityBlock, Person};
use crate::domain::types::{Affiliation, RoleSlot};
use crate::engine::availability::AvailabilityChecker;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::ledger::AssignmentLedger;
use crate::engine::scoring::{by_score_desc, tie_break, CandidateRanker, ScoreBreakdown, ScoreInput};
use crate::engine::workload::WorkloadAccountant;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use uuid::Uuid;

// ==========================================
// SelectionTier - 回退层级
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SelectionTier {
    SameAffiliationValid,
    OtherAffiliationValid,
    SameAffiliationOverflow,
    OtherAffiliationOverflow,
}

impl SelectionTier {
    fn of(same_affiliation: bool, valid: bool) -> Self {
        match (same_affiliation, valid) {
            (true, true) => SelectionTier::SameAffiliationValid,
            (false, true) => SelectionTier::OtherAffiliationValid,
            (true, false) => SelectionTier::SameAffiliationOverflow,
            (false, false) => SelectionTier::OtherAffiliationOverflow,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SelectionTier::SameAffiliationValid => "a",
            SelectionTier::OtherAffiliationValid => "b",
            SelectionTier::SameAffiliationOverflow => "c",
            SelectionTier::OtherAffiliationOverflow => "d",
        }
    }

    pub fn is_fallback(&self) -> bool {
        !matches!(self, SelectionTier::SameAffiliationValid)
    }
}

// ==========================================
// Candidate - 候选人评估结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub person_id: Uuid,
    pub name: String,
    pub affiliation: Affiliation,
    pub tier: SelectionTier,
    pub valid: bool,
    pub window_count: usize,
    pub threshold: f64,
    pub overflow: f64,
    pub score: ScoreBreakdown,
}

// ==========================================
// SelectionContext - 一次选人所需的只读视图
// ==========================================
pub struct SelectionContext<'a> {
    pub people: &'a BTreeMap<Uuid, Person>,
    pub blocks: &'a BTreeMap<Uuid, Vec<AvailabilityBlock>>,
    pub assignments: &'a AssignmentMap,
    pub ledger: &'a AssignmentLedger,
}

impl<'a> SelectionContext<'a> {
    fn blocks_for(&self, person_id: &Uuid) -> &'a [AvailabilityBlock] {
        self.blocks
            .get(person_id)
            .map(|blocks| blocks.as_slice())
            .unwrap_or(&[])
    }

    /// 候选池: 事件限定池（不存在的ID忽略）或全体人员
    pub(crate) fn pool(&self, event: &Event) -> Vec<&'a Person> {
        match event.restricted_pool() {
            Some(pool) => pool.iter().filter_map(|id| self.people.get(id)).collect(),
            None => self.people.values().collect(),
        }
    }
}

// ==========================================
// SelectionEngine - 选人引擎
// ==========================================
#[derive(Debug, Clone)]
pub struct SelectionEngine {
    availability: AvailabilityChecker,
    workload: WorkloadAccountant,
    ranker: CandidateRanker,
}

impl SelectionEngine {
    pub fn from_config(config: &RosterConfig) -> Self {
        Self {
            availability: AvailabilityChecker::new(config.overlap_guard()),
            workload: WorkloadAccountant::from_config(config),
            ranker: CandidateRanker::new(config.weights.clone()),
        }
    }

    pub fn availability(&self) -> &AvailabilityChecker {
        &self.availability
    }

    pub fn workload(&self) -> &WorkloadAccountant {
        &self.workload
    }

    /// 评估席位的全部候选人（已排序,第一位即选中者）
    ///
    /// 目标席位的当前占位人保留在候选中; 本场其他席位的占位人被排除
    pub fn evaluate(&self, ctx: &SelectionContext<'_>, event: &Event, slot: RoleSlot) -> Vec<Candidate> {
        crate::perf::record_evaluation();
        let pool = ctx.pool(event);
        let other_holders: BTreeSet<Uuid> = ctx
            .assignments
            .for_event(&event.id)
            .map(|slots| {
                slots
                    .iter()
                    .filter(|(held, _)| **held != slot)
                    .map(|(_, person_id)| *person_id)
                    .collect()
            })
            .unwrap_or_default();

        let role = slot.role;
        let at = event.start;
        let threshold = self.threshold_for(ctx, event, slot);

        let mut ranked: Vec<(Candidate, &Person)> = pool
            .into_iter()
            .filter(|person| person.active && person.is_qualified(role))
            .filter(|person| !other_holders.contains(&person.id))
            .filter(|person| !self.availability.is_blocked(ctx.blocks_for(&person.id), event))
            .filter(|person| !self.availability.has_conflict(ctx.ledger, &person.id, event))
            .map(|person| {
                let window_count = self.workload.window_count(ctx.ledger, &person.id, at);
                let input = ScoreInput {
                    window_count,
                    days_since_last: self.workload.days_since_last(ctx.ledger, &person.id, at),
                    role_repetition: self.workload.role_repetition(ctx.ledger, &person.id, role, at),
                };
                let valid = self.workload.is_valid(window_count, threshold);
                let candidate = Candidate {
                    person_id: person.id,
                    name: person.name.clone(),
                    affiliation: person.affiliation,
                    tier: SelectionTier::of(person.affiliation == event.affiliation, valid),
                    valid,
                    window_count,
                    threshold,
                    overflow: self.workload.overflow(window_count, threshold),
                    score: self.ranker.score(input, person, event),
                };
                (candidate, person)
            })
            .collect();

        ranked.sort_by(|(a, pa), (b, pb)| compare_candidates(a, pa, b, pb));
        ranked.into_iter().map(|(candidate, _)| candidate).collect()
    }

    /// 该事件该职务的工作量阈值
    pub fn threshold_for(&self, ctx: &SelectionContext<'_>, event: &Event, slot: RoleSlot) -> f64 {
        let average = self.workload.population_average(
            ctx.ledger,
            ctx.pool(event),
            slot.role,
            event.start,
        );
        self.workload.threshold(average)
    }

    /// 为席位选出一人（不写入）
    pub fn select(&self, ctx: &SelectionContext<'_>, event: &Event, slot: RoleSlot) -> EngineResult<Candidate> {
        self.evaluate(ctx, event, slot)
            .into_iter()
            .next()
            .ok_or(EngineError::NoCandidate {
                event_id: event.id,
                slot,
            })
    }
}

fn compare_candidates(a: &Candidate, pa: &Person, b: &Candidate, pb: &Person) -> Ordering {
    a.tier
        .cmp(&b.tier)
        .then_with(|| {
            if a.valid {
                Ordering::Equal
            } else {
                a.overflow.total_cmp(&b.overflow)
            }
        })
        .then_with(|| by_score_desc(&a.score, &b.score))
        .then_with(|| tie_break(pa, pb))
}
