// ==========================================
// 辅祭排班系统 - 排班配置读取 Trait
// ==========================================
// 职责: 定义 API 层所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::config::roster_config::{ConfigError, RosterConfig};
use async_trait::async_trait;
use std::sync::Arc;

// ==========================================
// RosterConfigReader Trait
// ==========================================
// 用途: 每次排班开始时取一份配置快照
// 实现者: ConfigManager
#[async_trait]
pub trait RosterConfigReader: Send + Sync {
    /// 获取当前配置快照
    ///
    /// # 返回
    /// - Arc<RosterConfig>: 本次计算全程使用的不可变配置
    async fn load_config(&self) -> Result<Arc<RosterConfig>, ConfigError>;
}
