use super::{RecalcEngine, RecalcMode, RecalcResult, VacancyReport};
use crate::domain::event::Period;
use crate::domain::snapshot::RosterSnapshot;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::ledger::AssignmentLedger;
use crate::engine::selection::SelectionContext;
use crate::perf::PerfGuard;
use std::time::Instant;
use tracing::instrument;
use uuid::Uuid;

impl RecalcEngine {
    /// 增量补位
    ///
    /// # 参数
    /// - snapshot: 工作副本（排班结果原地更新）
    /// - period: 限定区间; None 表示全部事件
    ///
    /// # 说明
    /// - 已有排班不做任何改动,只填空席位
    /// - 结果稳定后再次执行不产生变化
    #[instrument(skip(self, snapshot))]
    pub fn fill_vacancies(&self, snapshot: &mut RosterSnapshot, period: Option<Period>) -> EngineResult<RecalcResult> {
        let _perf = PerfGuard::new("fill_vacancies");
        let started = Instant::now();
        let mut result = RecalcResult::new(RecalcMode::FillVacancies);

        self.run_pass(snapshot, period.as_ref(), &mut result)?;

        result.elapsed_ms = started.elapsed().as_millis() as i64;
        tracing::info!(
            events = result.events_processed,
            filled = result.slots_filled,
            vacancies = result.vacancies.len(),
            fallbacks = result.fallback_count(),
            elapsed_ms = result.elapsed_ms,
            "增量补位完成"
        );
        Ok(result)
    }

    /// 全量重算
    ///
    /// # 参数
    /// - snapshot: 工作副本（排班结果原地更新）
    /// - period: 重算区间; None 表示全部事件
    ///
    /// # 说明
    /// - 区间内事件的排班先清空再按顺序重新分配
    /// - 区间外排班保持不变,继续参与公平性统计与防撞判定
    #[instrument(skip(self, snapshot))]
    pub fn recalculate(&self, snapshot: &mut RosterSnapshot, period: Option<Period>) -> EngineResult<RecalcResult> {
        let _perf = PerfGuard::new("recalculate");
        let started = Instant::now();
        let mut result = RecalcResult::new(RecalcMode::FullRecompute);

        let targets: Vec<Uuid> = {
            let ordered = self.ordered_events(&snapshot.events, period.as_ref());
            // 清空之前确认职务包全部可解析
            self.plan_slots(&ordered)?;
            ordered.iter().map(|event| event.id).collect()
        };
        for event_id in &targets {
            result.assignments_cleared += snapshot.assignments.remove_event(event_id);
        }
        tracing::debug!(
            events = targets.len(),
            cleared = result.assignments_cleared,
            "区间内排班已清空"
        );

        self.run_pass(snapshot, period.as_ref(), &mut result)?;

        result.elapsed_ms = started.elapsed().as_millis() as i64;
        tracing::info!(
            events = result.events_processed,
            cleared = result.assignments_cleared,
            filled = result.slots_filled,
            vacancies = result.vacancies.len(),
            fallbacks = result.fallback_count(),
            elapsed_ms = result.elapsed_ms,
            "全量重算完成"
        );
        Ok(result)
    }

    /// 按顺序为区间内每个空席位选人
    fn run_pass(
        &self,
        snapshot: &mut RosterSnapshot,
        period: Option<&Period>,
        result: &mut RecalcResult,
    ) -> EngineResult<()> {
        let RosterSnapshot {
            people,
            events,
            blocks,
            assignments,
        } = snapshot;

        let ordered = self.ordered_events(events, period);
        let plan = self.plan_slots(&ordered)?;
        let guard = self.config.overlap_guard();
        let mut ledger = AssignmentLedger::build(assignments, events, guard);
        result.events_processed = plan.len();

        for (event, slots) in plan {
            for slot in slots {
                if assignments.is_assigned(&event.id, &slot) {
                    continue;
                }

                let choice = {
                    let ctx = SelectionContext {
                        people: &*people,
                        blocks: &*blocks,
                        assignments: &*assignments,
                        ledger: &ledger,
                    };
                    self.selection.select(&ctx, event, slot)
                };

                match choice {
                    Ok(candidate) => {
                        assignments.assign(event.id, slot, candidate.person_id);
                        ledger.record(candidate.person_id, event, slot, guard);
                        *result.tier_counts.entry(candidate.tier).or_insert(0) += 1;
                        result.slots_filled += 1;
                        tracing::debug!(
                            event = %event.key(),
                            slot = %slot,
                            person = %candidate.name,
                            tier = candidate.tier.label(),
                            score = candidate.score.total,
                            "席位已分配"
                        );
                    }
                    Err(EngineError::NoCandidate { event_id, slot }) => {
                        tracing::warn!(event = %event.key(), slot = %slot, "席位无可用人选,留空");
                        result.vacancies.push(VacancyReport {
                            event_id,
                            event_key: event.key(),
                            slot,
                            reason: "无满足硬性条件的候选人".to_string(),
                        });
                    }
                    Err(e) => return Err(e),
                }
            }
        }
        Ok(())
    }
}
