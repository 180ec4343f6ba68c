// ==========================================
// 辅祭排班系统 - 单次计算输入快照
// ==========================================
// 用途: 一次重算所需的全部输入驻留内存
// ==========================================

use crate::domain::assignment::AssignmentMap;
use crate::domain::error::DomainError;
use crate::domain::event::Event;
use crate::domain::person::{AvailabilityBlock, Person};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RosterSnapshot {
    #[serde(default)]
    pub people: BTreeMap<Uuid, Person>,
    #[serde(default)]
    pub events: BTreeMap<Uuid, Event>,
    #[serde(default)]
    pub blocks: BTreeMap<Uuid, Vec<AvailabilityBlock>>,
    #[serde(default)]
    pub assignments: AssignmentMap,
}

impl RosterSnapshot {
    pub fn from_parts(
        people: Vec<Person>,
        events: Vec<Event>,
        blocks: Vec<AvailabilityBlock>,
        assignments: AssignmentMap,
    ) -> Self {
        let mut grouped: BTreeMap<Uuid, Vec<AvailabilityBlock>> = BTreeMap::new();
        for block in blocks {
            grouped.entry(block.person_id).or_default().push(block);
        }
        Self {
            people: people.into_iter().map(|p| (p.id, p)).collect(),
            events: events.into_iter().map(|e| (e.id, e)).collect(),
            blocks: grouped,
            assignments,
        }
    }

    /// 校验快照完整性（外部输入边界调用一次）
    pub fn validate(&self) -> Result<(), DomainError> {
        for (id, person) in &self.people {
            if *id != person.id {
                return Err(DomainError::InvalidReference(format!(
                    "人员键与ID不一致: {} != {}",
                    id, person.id
                )));
            }
        }
        for (id, event) in &self.events {
            if *id != event.id {
                return Err(DomainError::InvalidReference(format!(
                    "事件键与ID不一致: {} != {}",
                    id, event.id
                )));
            }
            event.validate()?;
        }
        for blocks in self.blocks.values() {
            for block in blocks {
                block.validate()?;
            }
        }
        for (event_id, slot, person_id) in self.assignments.iter() {
            if !self.events.contains_key(&event_id) {
                return Err(DomainError::InvalidReference(format!(
                    "排班引用了不存在的事件: {} ({})",
                    event_id, slot
                )));
            }
            if !self.people.contains_key(&person_id) {
                return Err(DomainError::InvalidReference(format!(
                    "排班引用了不存在的人员: {} ({})",
                    person_id, slot
                )));
            }
        }
        Ok(())
    }

    pub fn blocks_for(&self, person_id: &Uuid) -> &[AvailabilityBlock] {
        self.blocks
            .get(person_id)
            .map(|blocks| blocks.as_slice())
            .unwrap_or(&[])
    }
}
