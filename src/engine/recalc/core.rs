use super::RecalcEngine;
use crate::config::RosterConfig;
use crate::domain::event::{Event, Period};
use crate::domain::types::RoleSlot;
use crate::engine::error::EngineResult;
use crate::engine::role_pack::RolePackResolver;
use crate::engine::selection::SelectionEngine;
use std::collections::BTreeMap;
use std::sync::Arc;
use uuid::Uuid;

impl RecalcEngine {
    /// 创建新的 RecalcEngine 实例
    ///
    /// # 参数
    /// - config: 本轮计算全程使用的配置快照
    pub fn new(config: Arc<RosterConfig>) -> Self {
        let packs = RolePackResolver::from_config(&config.role_packs);
        let selection = SelectionEngine::from_config(&config);
        Self {
            config,
            packs,
            selection,
        }
    }

    pub fn config(&self) -> &RosterConfig {
        &self.config
    }

    pub fn packs(&self) -> &RolePackResolver {
        &self.packs
    }

    pub fn selection(&self) -> &SelectionEngine {
        &self.selection
    }

    /// 按处理顺序排列区间内事件
    pub(super) fn ordered_events<'a>(
        &self,
        events: &'a BTreeMap<Uuid, Event>,
        period: Option<&Period>,
    ) -> Vec<&'a Event> {
        let mut events: Vec<&Event> = events
            .values()
            .filter(|event| period.map_or(true, |p| p.contains_event(event)))
            .collect();
        events.sort_by(|a, b| {
            b.kind
                .is_solemn()
                .cmp(&a.kind.is_solemn())
                .then_with(|| a.start.cmp(&b.start))
                .then_with(|| a.affiliation.as_str().cmp(b.affiliation.as_str()))
                .then_with(|| a.id.cmp(&b.id))
        });
        events
    }

    /// 预先解析全部事件的席位（任一失败即中止,不做任何写入）
    pub(super) fn plan_slots<'a>(&self, events: &[&'a Event]) -> EngineResult<Vec<(&'a Event, Vec<RoleSlot>)>> {
        events
            .iter()
            .map(|event| Ok((*event, self.packs.resolve_slots(event.quantity)?)))
            .collect()
    }
}
