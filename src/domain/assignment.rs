// ==========================================
// 辅祭排班系统 - 排班结果 (Assignment Map)
// ==========================================
// 结构: 事件ID → 席位 → 人员ID
// 不变量: 每个席位至多一人; 同一事件内一人至多占一个席位
// 归属: 调用方持有,引擎只在工作副本上读写
// ==========================================

use crate::domain::types::RoleSlot;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use uuid::Uuid;

pub type EventAssignments = BTreeMap<RoleSlot, Uuid>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssignmentMap {
    inner: BTreeMap<Uuid, EventAssignments>,
}

impl AssignmentMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, event_id: &Uuid, slot: &RoleSlot) -> Option<Uuid> {
        self.inner.get(event_id).and_then(|slots| slots.get(slot)).copied()
    }

    pub fn for_event(&self, event_id: &Uuid) -> Option<&EventAssignments> {
        self.inner.get(event_id)
    }

    /// 写入席位,返回原占位人
    pub fn assign(&mut self, event_id: Uuid, slot: RoleSlot, person_id: Uuid) -> Option<Uuid> {
        self.inner.entry(event_id).or_default().insert(slot, person_id)
    }

    /// 清空席位,返回原占位人
    pub fn clear(&mut self, event_id: &Uuid, slot: &RoleSlot) -> Option<Uuid> {
        let slots = self.inner.get_mut(event_id)?;
        let previous = slots.remove(slot);
        if slots.is_empty() {
            self.inner.remove(event_id);
        }
        previous
    }

    /// 移除整场事件的排班,返回被清除的席位数
    pub fn remove_event(&mut self, event_id: &Uuid) -> usize {
        self.inner.remove(event_id).map(|slots| slots.len()).unwrap_or(0)
    }

    /// 该事件已占位的人员
    pub fn holders(&self, event_id: &Uuid) -> BTreeSet<Uuid> {
        self.inner
            .get(event_id)
            .map(|slots| slots.values().copied().collect())
            .unwrap_or_default()
    }

    pub fn is_assigned(&self, event_id: &Uuid, slot: &RoleSlot) -> bool {
        self.get(event_id, slot).is_some()
    }

    /// 按 (事件, 席位, 人员) 顺序遍历
    pub fn iter(&self) -> impl Iterator<Item = (Uuid, RoleSlot, Uuid)> + '_ {
        self.inner.iter().flat_map(|(event_id, slots)| {
            slots
                .iter()
                .map(move |(slot, person_id)| (*event_id, *slot, *person_id))
        })
    }

    pub fn event_ids(&self) -> impl Iterator<Item = &Uuid> + '_ {
        self.inner.keys()
    }

    /// 全部已占席位数
    pub fn len(&self) -> usize {
        self.inner.values().map(|slots| slots.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::RoleCode;

    #[test]
    fn test_assign_and_clear() {
        let mut map = AssignmentMap::new();
        let event = Uuid::new_v4();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let slot = RoleSlot::first(RoleCode::Lib);

        assert_eq!(map.assign(event, slot, alice), None);
        assert_eq!(map.assign(event, slot, bob), Some(alice));
        assert_eq!(map.len(), 1);
        assert_eq!(map.clear(&event, &slot), Some(bob));
        assert!(map.for_event(&event).is_none());
    }

    #[test]
    fn test_serializes_slots_as_strings() {
        let mut map = AssignmentMap::new();
        let event = Uuid::nil();
        let person = Uuid::nil();
        map.assign(event, RoleSlot::new(RoleCode::Cru, 2), person);
        let json = serde_json::to_string(&map).unwrap();
        assert!(json.contains("\"CRU#2\""));
        let back: AssignmentMap = serde_json::from_str(&json).unwrap();
        assert_eq!(back, map);
    }
}
