// ==========================================
// 辅祭排班系统 - 内存存储实现
// ==========================================
// 职责: 同时实现四个数据提供方接口
// 并发: tokio RwLock,读共享、写独占
// 持久化: 可选 JSON 文件导入/导出
// ==========================================

use crate::domain::assignment::AssignmentMap;
use crate::domain::event::Event;
use crate::domain::person::{AvailabilityBlock, Person};
use crate::domain::snapshot::RosterSnapshot;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::roster_provider::{AssignmentStore, BlackoutProvider, EventProvider, RosterProvider};
use anyhow::Context;
use async_trait::async_trait;
use std::path::Path;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
pub struct InMemoryRosterStore {
    state: RwLock<RosterSnapshot>,
}

impl InMemoryRosterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 由快照创建（先校验完整性）
    pub fn from_snapshot(snapshot: RosterSnapshot) -> RepositoryResult<Self> {
        snapshot.validate()?;
        Ok(Self {
            state: RwLock::new(snapshot),
        })
    }

    /// 从 JSON 文件加载快照
    pub async fn load_json(path: &Path) -> RepositoryResult<Self> {
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("读取快照文件失败: {}", path.display()))?;
        let snapshot: RosterSnapshot = serde_json::from_str(&text)?;
        tracing::info!(
            path = %path.display(),
            people = snapshot.people.len(),
            events = snapshot.events.len(),
            assignments = snapshot.assignments.len(),
            "快照已加载"
        );
        Self::from_snapshot(snapshot)
    }

    /// 将当前状态写入 JSON 文件
    pub async fn save_json(&self, path: &Path) -> RepositoryResult<()> {
        let text = {
            let state = self.state.read().await;
            serde_json::to_string_pretty(&*state)?
        };
        tokio::fs::write(path, text)
            .await
            .with_context(|| format!("写入快照文件失败: {}", path.display()))?;
        Ok(())
    }

    /// 当前状态的完整副本
    pub async fn snapshot(&self) -> RosterSnapshot {
        self.state.read().await.clone()
    }

    pub async fn upsert_person(&self, person: Person) -> RepositoryResult<()> {
        if person.name.trim().is_empty() {
            return Err(RepositoryError::ValidationError("人员姓名不能为空".to_string()));
        }
        self.state.write().await.people.insert(person.id, person);
        Ok(())
    }

    pub async fn upsert_event(&self, event: Event) -> RepositoryResult<()> {
        event.validate()?;
        self.state.write().await.events.insert(event.id, event);
        Ok(())
    }

    /// 删除事件及其排班
    pub async fn remove_event(&self, event_id: &Uuid) -> RepositoryResult<Event> {
        let mut state = self.state.write().await;
        let event = state.events.remove(event_id).ok_or_else(|| RepositoryError::NotFound {
            entity: "Event".to_string(),
            id: event_id.to_string(),
        })?;
        state.assignments.remove_event(event_id);
        Ok(event)
    }

    pub async fn add_block(&self, block: AvailabilityBlock) -> RepositoryResult<()> {
        block.validate()?;
        let mut state = self.state.write().await;
        if !state.people.contains_key(&block.person_id) {
            return Err(RepositoryError::NotFound {
                entity: "Person".to_string(),
                id: block.person_id.to_string(),
            });
        }
        state.blocks.entry(block.person_id).or_default().push(block);
        Ok(())
    }
}

#[async_trait]
impl RosterProvider for InMemoryRosterStore {
    async fn list_people(&self) -> RepositoryResult<Vec<Person>> {
        Ok(self.state.read().await.people.values().cloned().collect())
    }
}

#[async_trait]
impl EventProvider for InMemoryRosterStore {
    async fn list_events(&self) -> RepositoryResult<Vec<Event>> {
        Ok(self.state.read().await.events.values().cloned().collect())
    }
}

#[async_trait]
impl BlackoutProvider for InMemoryRosterStore {
    async fn list_blocks(&self) -> RepositoryResult<Vec<AvailabilityBlock>> {
        Ok(self
            .state
            .read()
            .await
            .blocks
            .values()
            .flatten()
            .cloned()
            .collect())
    }
}

#[async_trait]
impl AssignmentStore for InMemoryRosterStore {
    async fn load_assignments(&self) -> RepositoryResult<AssignmentMap> {
        Ok(self.state.read().await.assignments.clone())
    }

    async fn replace_assignments(&self, assignments: AssignmentMap) -> RepositoryResult<()> {
        let mut state = self.state.write().await;
        for (event_id, slot, person_id) in assignments.iter() {
            if !state.events.contains_key(&event_id) {
                return Err(RepositoryError::ValidationError(format!(
                    "排班引用了不存在的事件: {} ({})",
                    event_id, slot
                )));
            }
            if !state.people.contains_key(&person_id) {
                return Err(RepositoryError::ValidationError(format!(
                    "排班引用了不存在的人员: {} ({})",
                    person_id, slot
                )));
            }
        }
        state.assignments = assignments;
        Ok(())
    }
}
