// ==========================================
// 辅祭排班系统 - 数据提供方 Trait
// ==========================================
// 职责: 定义排班引擎所需的数据访问接口（不包含业务逻辑）
// 红线: Repository 不含业务规则，只做数据读写
// ==========================================

use crate::domain::assignment::AssignmentMap;
use crate::domain::event::Event;
use crate::domain::person::{AvailabilityBlock, Person};
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;

// ==========================================
// RosterProvider Trait
// ==========================================
// 用途: 人员名单
#[async_trait]
pub trait RosterProvider: Send + Sync {
    /// 全部人员（含不在岗人员）
    async fn list_people(&self) -> RepositoryResult<Vec<Person>>;
}

// ==========================================
// EventProvider Trait
// ==========================================
#[async_trait]
pub trait EventProvider: Send + Sync {
    /// 全部弥撒事件
    async fn list_events(&self) -> RepositoryResult<Vec<Event>>;
}

// ==========================================
// BlackoutProvider Trait
// ==========================================
#[async_trait]
pub trait BlackoutProvider: Send + Sync {
    /// 全部不可用时段
    async fn list_blocks(&self) -> RepositoryResult<Vec<AvailabilityBlock>>;
}

// ==========================================
// AssignmentStore Trait
// ==========================================
// 用途: 排班结果的读取与整体提交
#[async_trait]
pub trait AssignmentStore: Send + Sync {
    async fn load_assignments(&self) -> RepositoryResult<AssignmentMap>;

    /// 整体替换排班结果
    ///
    /// # 说明
    /// - 一轮计算只调用一次,不做部分提交
    async fn replace_assignments(&self, assignments: AssignmentMap) -> RepositoryResult<()>;
}
