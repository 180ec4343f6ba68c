// ==========================================
// 辅祭排班系统 - 排班 API
// ==========================================
// 职责: 排班计算、人工干预、审计查询
// 并发: 写操作持有排班锁串行执行; 只读查询不加锁
// 提交: 全部输入先载入内存,计算在工作副本上进行,成功后一次性提交
// 载入: 写操作要求引用完整; 只读查询容忍悬空引用,由审计报告
// ==========================================

use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::Mutex;
use tracing::instrument;
use uuid::Uuid;

use crate::api::error::{ApiError, ApiResult};
use crate::config::{RosterConfig, RosterConfigReader};
use crate::domain::assignment::AssignmentMap;
use crate::domain::event::Period;
use crate::domain::snapshot::RosterSnapshot;
use crate::domain::types::{Affiliation, RoleSlot};
use crate::engine::{
    Candidate, EngineError, FreeSlot, ForceAssignOutcome, ManualOps, RecalcEngine, RecalcResult,
    ScheduleAuditor, ScheduleIssue, SwapOutcome, WorkloadStats,
};
use crate::repository::{
    AssignmentStore, BlackoutProvider, EventProvider, InMemoryRosterStore, RosterProvider,
};

// ==========================================
// RosterApi - 排班 API
// ==========================================
pub struct RosterApi {
    people: Arc<dyn RosterProvider>,
    events: Arc<dyn EventProvider>,
    blocks: Arc<dyn BlackoutProvider>,
    assignments: Arc<dyn AssignmentStore>,
    config: Arc<dyn RosterConfigReader>,
    pass_lock: Mutex<()>,
}

impl RosterApi {
    /// 创建新的 RosterApi 实例
    pub fn new(
        people: Arc<dyn RosterProvider>,
        events: Arc<dyn EventProvider>,
        blocks: Arc<dyn BlackoutProvider>,
        assignments: Arc<dyn AssignmentStore>,
        config: Arc<dyn RosterConfigReader>,
    ) -> Self {
        Self {
            people,
            events,
            blocks,
            assignments,
            config,
            pass_lock: Mutex::new(()),
        }
    }

    /// 以同一个内存存储充当全部数据提供方
    pub fn with_store(store: Arc<InMemoryRosterStore>, config: Arc<dyn RosterConfigReader>) -> Self {
        Self::new(store.clone(), store.clone(), store.clone(), store, config)
    }

    async fn load_config(&self) -> ApiResult<Arc<RosterConfig>> {
        Ok(self.config.load_config().await?)
    }

    /// 并发载入全部输入（不做引用校验）
    async fn load_snapshot(&self) -> ApiResult<RosterSnapshot> {
        let (people, events, blocks, assignments) = futures::try_join!(
            self.people.list_people(),
            self.events.list_events(),
            self.blocks.list_blocks(),
            self.assignments.load_assignments(),
        )?;
        Ok(RosterSnapshot::from_parts(people, events, blocks, assignments))
    }

    /// 载入并校验引用完整（写操作使用）
    async fn load_validated_snapshot(&self) -> ApiResult<RosterSnapshot> {
        let snapshot = self.load_snapshot().await?;
        snapshot.validate().map_err(EngineError::from)?;
        Ok(snapshot)
    }

    async fn commit(&self, assignments: AssignmentMap) -> ApiResult<()> {
        let count = assignments.len();
        self.assignments.replace_assignments(assignments).await?;
        tracing::debug!(assignments = count, "排班结果已提交");
        Ok(())
    }

    /// 默认查看区间: 从 today 起 default_view_days 天
    pub async fn default_period(&self, today: NaiveDate) -> ApiResult<Period> {
        let config = self.load_config().await?;
        let days = u32::try_from(config.general.default_view_days)
            .map_err(|_| ApiError::Configuration("default_view_days 超出范围".to_string()))?;
        Period::starting(today, days).map_err(|e| ApiError::InvalidInput(e.to_string()))
    }

    // ==========================================
    // 排班计算
    // ==========================================

    /// 全量重算（区间内清空后重新分配）
    #[instrument(skip(self))]
    pub async fn recalculate(&self, period: Option<Period>) -> ApiResult<RecalcResult> {
        let _pass = self.pass_lock.lock().await;
        let config = self.load_config().await?;
        let mut working = self.load_validated_snapshot().await?;

        let result = RecalcEngine::new(config).recalculate(&mut working, period)?;
        self.commit(working.assignments).await?;
        Ok(result)
    }

    /// 增量补位（只填空席位）
    #[instrument(skip(self))]
    pub async fn fill_vacancies(&self, period: Option<Period>) -> ApiResult<RecalcResult> {
        let _pass = self.pass_lock.lock().await;
        let config = self.load_config().await?;
        let mut working = self.load_validated_snapshot().await?;

        let result = RecalcEngine::new(config).fill_vacancies(&mut working, period)?;
        self.commit(working.assignments).await?;
        Ok(result)
    }

    // ==========================================
    // 人工干预
    // ==========================================

    /// 候选建议（只读）
    pub async fn suggest(&self, event_id: Uuid, slot: RoleSlot, top_n: usize) -> ApiResult<Vec<Candidate>> {
        let config = self.load_config().await?;
        let snapshot = self.load_snapshot().await?;
        Ok(ManualOps::new(&config).suggest(&snapshot, event_id, slot, top_n)?)
    }

    #[instrument(skip(self))]
    pub async fn force_assign(
        &self,
        event_id: Uuid,
        slot: RoleSlot,
        person_id: Uuid,
    ) -> ApiResult<ForceAssignOutcome> {
        let _pass = self.pass_lock.lock().await;
        let config = self.load_config().await?;
        let mut working = self.load_validated_snapshot().await?;

        let outcome = ManualOps::new(&config).force_assign(&mut working, event_id, slot, person_id)?;
        for advisory in &outcome.advisories {
            tracing::warn!(event_id = %event_id, slot = %slot, advisory = %advisory.message(), "强制指派提示");
        }
        self.commit(working.assignments).await?;
        Ok(outcome)
    }

    #[instrument(skip(self))]
    pub async fn clear(&self, event_id: Uuid, slot: RoleSlot) -> ApiResult<Option<Uuid>> {
        let _pass = self.pass_lock.lock().await;
        let config = self.load_config().await?;
        let mut working = self.load_validated_snapshot().await?;

        let previous = ManualOps::new(&config).clear(&mut working, event_id, slot)?;
        if previous.is_some() {
            self.commit(working.assignments).await?;
        }
        Ok(previous)
    }

    #[instrument(skip(self))]
    pub async fn swap(
        &self,
        event_a: Uuid,
        slot_a: RoleSlot,
        event_b: Uuid,
        slot_b: RoleSlot,
    ) -> ApiResult<SwapOutcome> {
        let _pass = self.pass_lock.lock().await;
        let config = self.load_config().await?;
        let mut working = self.load_validated_snapshot().await?;

        let outcome = ManualOps::new(&config).swap(&mut working, event_a, slot_a, event_b, slot_b)?;
        self.commit(working.assignments).await?;
        Ok(outcome)
    }

    /// 清除区间内排班（None 为全部）
    #[instrument(skip(self))]
    pub async fn reset(&self, period: Option<Period>) -> ApiResult<usize> {
        let _pass = self.pass_lock.lock().await;
        let config = self.load_config().await?;
        let mut working = self.load_validated_snapshot().await?;

        let cleared = ManualOps::new(&config).reset(&mut working, period);
        self.commit(working.assignments).await?;
        Ok(cleared)
    }

    // ==========================================
    // 审计查询（只读）
    // ==========================================
    // affiliations 为空表示全部团体

    pub async fn check_schedule(
        &self,
        period: Option<Period>,
        affiliations: &[Affiliation],
    ) -> ApiResult<Vec<ScheduleIssue>> {
        let config = self.load_config().await?;
        let snapshot = self.load_snapshot().await?;
        Ok(ScheduleAuditor::new(&config).check_schedule(&snapshot, period, affiliations)?)
    }

    pub async fn free_slots(&self, period: Option<Period>, affiliations: &[Affiliation]) -> ApiResult<Vec<FreeSlot>> {
        let config = self.load_config().await?;
        let snapshot = self.load_snapshot().await?;
        Ok(ScheduleAuditor::new(&config).free_slots(&snapshot, period, affiliations)?)
    }

    pub async fn workload_stats(
        &self,
        period: Option<Period>,
        affiliations: &[Affiliation],
    ) -> ApiResult<WorkloadStats> {
        let config = self.load_config().await?;
        let snapshot = self.load_snapshot().await?;
        Ok(ScheduleAuditor::new(&config).workload_stats(&snapshot, period, affiliations))
    }
}
