// ==========================================
// 辅祭排班系统 - 核心库
// ==========================================
// 技术栈: Rust + Tokio + Serde
// 系统定位: 排班辅助系统 (人工保留最终控制权)
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 配置层 - 类型化配置
pub mod config;

// 引擎层 - 排班规则
pub mod engine;

// 数据仓储层 - 数据访问
pub mod repository;

// API 层 - 业务接口
pub mod api;

// 日志系统
pub mod logging;

// 性能埋点
pub mod perf;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::{
    Affiliation, AssignmentMap, AvailabilityBlock, Event, EventKind, Period, Person, RoleCode,
    RoleSlot, RosterSnapshot,
};

// 配置
pub use config::{ConfigManager, RosterConfig};

// 引擎
pub use engine::{
    ManualOps, RecalcEngine, RecalcMode, RecalcResult, ScheduleAuditor, SelectionEngine,
    SelectionTier,
};

// 仓储
pub use repository::InMemoryRosterStore;

// API
pub use api::{ApiError, RosterApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "辅祭排班系统";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
