// ==========================================
// 辅祭排班系统 - 排班审计
// ==========================================
// 职责: 排班检查 / 空席位清单 / 工作量统计
// 红线: 只读,不修改排班
// ==========================================

use crate::config::RosterConfig;
use crate::domain::event::{Event, Period};
use crate::domain::snapshot::RosterSnapshot;
use crate::domain::types::{fold_key, Affiliation, RoleCode, RoleSlot};
use crate::engine::error::EngineResult;
use crate::engine::role_pack::RolePackResolver;
use chrono::{DateTime, Duration, FixedOffset};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

// ==========================================
// 检查结果
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueSeverity {
    Error,
    Warning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueKind {
    VacantSlot,
    Unqualified,
    Inactive,
    UnknownPerson,
    Blocked,
    Overlap,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleIssue {
    pub severity: IssueSeverity,
    pub kind: IssueKind,
    pub event_id: Uuid,
    pub event_key: String,
    pub slot: Option<RoleSlot>,
    pub person_id: Option<Uuid>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FreeSlot {
    pub event_id: Uuid,
    pub event_key: String,
    pub start: DateTime<FixedOffset>,
    pub affiliation: Affiliation,
    pub slot: RoleSlot,
}

// ==========================================
// 工作量统计
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonWorkload {
    pub person_id: Uuid,
    pub name: String,
    pub affiliation: Option<Affiliation>,
    pub total: usize,
    pub per_role: BTreeMap<RoleCode, usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkloadStats {
    pub people: Vec<PersonWorkload>,
    pub total_assignments: usize,
    pub mean: f64,
    pub gini: f64,
    pub std_dev: f64,
}

/// 基尼系数（空集或总和为 0 时为 0）
pub fn gini(values: &[usize]) -> f64 {
    let n = values.len();
    let total: usize = values.iter().sum();
    if n == 0 || total == 0 {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    let weighted: f64 = sorted
        .iter()
        .enumerate()
        .map(|(i, v)| (i + 1) as f64 * *v as f64)
        .sum();
    let n = n as f64;
    (2.0 * weighted) / (n * total as f64) - (n + 1.0) / n
}

/// 总体标准差（少于两个值时为 0）
pub fn population_std_dev(values: &[usize]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<usize>() as f64 / n;
    let variance = values
        .iter()
        .map(|v| {
            let d = *v as f64 - mean;
            d * d
        })
        .sum::<f64>()
        / n;
    variance.sqrt()
}

// ==========================================
// ScheduleAuditor - 排班审计
// ==========================================
pub struct ScheduleAuditor {
    packs: RolePackResolver,
    overlap_guard: Duration,
}

impl ScheduleAuditor {
    pub fn new(config: &RosterConfig) -> Self {
        Self {
            packs: RolePackResolver::from_config(&config.role_packs),
            overlap_guard: config.overlap_guard(),
        }
    }

    /// 区间内且属于所选团体的事件（团体为空表示全部）,按开始时间 → 团体代码 排序
    fn events_in<'a>(
        snapshot: &'a RosterSnapshot,
        period: Option<&Period>,
        affiliations: &[Affiliation],
    ) -> Vec<&'a Event> {
        let mut events: Vec<&Event> = snapshot
            .events
            .values()
            .filter(|event| period.map_or(true, |p| p.contains_event(event)))
            .filter(|event| affiliations.is_empty() || affiliations.contains(&event.affiliation))
            .collect();
        events.sort_by(|a, b| {
            a.start
                .cmp(&b.start)
                .then_with(|| a.affiliation.as_str().cmp(b.affiliation.as_str()))
                .then_with(|| a.id.cmp(&b.id))
        });
        events
    }

    /// 排班检查
    ///
    /// # 返回
    /// 问题列表,按 严重程度(错误优先) → 事件键 排序
    pub fn check_schedule(
        &self,
        snapshot: &RosterSnapshot,
        period: Option<Period>,
        affiliations: &[Affiliation],
    ) -> EngineResult<Vec<ScheduleIssue>> {
        let events = Self::events_in(snapshot, period.as_ref(), affiliations);
        let mut issues = Vec::new();
        let mut per_person: BTreeMap<Uuid, Vec<&Event>> = BTreeMap::new();

        for event in &events {
            let issue = |severity, kind, slot, person_id, message: String| ScheduleIssue {
                severity,
                kind,
                event_id: event.id,
                event_key: event.key(),
                slot,
                person_id,
                message,
            };

            for slot in self.packs.resolve_slots(event.quantity)? {
                if !snapshot.assignments.is_assigned(&event.id, &slot) {
                    issues.push(issue(
                        IssueSeverity::Warning,
                        IssueKind::VacantSlot,
                        Some(slot),
                        None,
                        format!("职务 {} 无人", slot),
                    ));
                }
            }

            let Some(slots) = snapshot.assignments.for_event(&event.id) else {
                continue;
            };
            for (slot, person_id) in slots {
                let Some(person) = snapshot.people.get(person_id) else {
                    issues.push(issue(
                        IssueSeverity::Error,
                        IssueKind::UnknownPerson,
                        Some(*slot),
                        Some(*person_id),
                        format!("排班引用了不存在的人员 ({})", person_id),
                    ));
                    continue;
                };
                if !person.is_qualified(slot.role) {
                    issues.push(issue(
                        IssueSeverity::Warning,
                        IssueKind::Unqualified,
                        Some(*slot),
                        Some(person.id),
                        format!("{} 不具备职务 {}", person.name, slot.role),
                    ));
                }
                if !person.active {
                    issues.push(issue(
                        IssueSeverity::Warning,
                        IssueKind::Inactive,
                        Some(*slot),
                        Some(person.id),
                        format!("{} 不在岗", person.name),
                    ));
                }
                if snapshot
                    .blocks_for(&person.id)
                    .iter()
                    .any(|block| block.contains(event.start))
                {
                    issues.push(issue(
                        IssueSeverity::Warning,
                        IssueKind::Blocked,
                        Some(*slot),
                        Some(person.id),
                        format!("{} 处于不可用时段", person.name),
                    ));
                }
                per_person.entry(person.id).or_default().push(event);
            }
        }

        for (person_id, mut served) in per_person {
            served.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.id.cmp(&b.id)));
            served.dedup_by_key(|event| event.id);
            let name = snapshot
                .people
                .get(&person_id)
                .map(|p| p.name.as_str())
                .unwrap_or("?");
            for pair in served.windows(2) {
                let (current, next) = (pair[0], pair[1]);
                if current.window(self.overlap_guard).overlaps(&next.window(self.overlap_guard)) {
                    issues.push(ScheduleIssue {
                        severity: IssueSeverity::Error,
                        kind: IssueKind::Overlap,
                        event_id: current.id,
                        event_key: current.key(),
                        slot: None,
                        person_id: Some(person_id),
                        message: format!("{} 与 {} 时间冲突", name, next.key()),
                    });
                }
            }
        }

        issues.sort_by(|a, b| {
            a.severity
                .cmp(&b.severity)
                .then_with(|| a.event_key.cmp(&b.event_key))
                .then_with(|| a.kind.cmp(&b.kind))
        });
        tracing::info!(
            events = events.len(),
            issues = issues.len(),
            errors = issues.iter().filter(|i| i.severity == IssueSeverity::Error).count(),
            "排班检查完成"
        );
        Ok(issues)
    }

    /// 区间内空席位,按开始时间 → 团体代码
    pub fn free_slots(
        &self,
        snapshot: &RosterSnapshot,
        period: Option<Period>,
        affiliations: &[Affiliation],
    ) -> EngineResult<Vec<FreeSlot>> {
        let mut free = Vec::new();
        for event in Self::events_in(snapshot, period.as_ref(), affiliations) {
            for slot in self.packs.resolve_slots(event.quantity)? {
                if !snapshot.assignments.is_assigned(&event.id, &slot) {
                    free.push(FreeSlot {
                        event_id: event.id,
                        event_key: event.key(),
                        start: event.start,
                        affiliation: event.affiliation,
                        slot,
                    });
                }
            }
        }
        Ok(free)
    }

    /// 工作量统计
    ///
    /// 名单包含所选团体的全部人员（含零次）及在所选事件中服务的其他人员、未知人员;
    /// 按总次数降序 → 去变音大写姓名
    pub fn workload_stats(
        &self,
        snapshot: &RosterSnapshot,
        period: Option<Period>,
        affiliations: &[Affiliation],
    ) -> WorkloadStats {
        let mut rows: BTreeMap<Uuid, PersonWorkload> = snapshot
            .people
            .values()
            .filter(|person| affiliations.is_empty() || affiliations.contains(&person.affiliation))
            .map(|person| {
                (
                    person.id,
                    PersonWorkload {
                        person_id: person.id,
                        name: person.name.clone(),
                        affiliation: Some(person.affiliation),
                        total: 0,
                        per_role: BTreeMap::new(),
                    },
                )
            })
            .collect();

        for event in Self::events_in(snapshot, period.as_ref(), affiliations) {
            let Some(slots) = snapshot.assignments.for_event(&event.id) else {
                continue;
            };
            for (slot, person_id) in slots {
                let known = snapshot.people.get(person_id);
                let row = rows.entry(*person_id).or_insert_with(|| PersonWorkload {
                    person_id: *person_id,
                    name: known.map_or_else(|| "?".to_string(), |p| p.name.clone()),
                    affiliation: known.map(|p| p.affiliation),
                    total: 0,
                    per_role: BTreeMap::new(),
                });
                row.total += 1;
                *row.per_role.entry(slot.role).or_insert(0) += 1;
            }
        }

        let mut people: Vec<PersonWorkload> = rows.into_values().collect();
        people.sort_by(|a, b| {
            b.total
                .cmp(&a.total)
                .then_with(|| fold_key(&a.name).cmp(&fold_key(&b.name)))
                .then_with(|| a.person_id.cmp(&b.person_id))
        });

        let totals: Vec<usize> = people.iter().map(|row| row.total).collect();
        let total_assignments: usize = totals.iter().sum();
        let mean = if totals.is_empty() {
            0.0
        } else {
            total_assignments as f64 / totals.len() as f64
        };

        WorkloadStats {
            gini: gini(&totals),
            std_dev: population_std_dev(&totals),
            mean,
            total_assignments,
            people,
        }
    }
}
