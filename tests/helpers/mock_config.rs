// ==========================================
// Mock 配置实现 - 用于集成测试
// ==========================================

use async_trait::async_trait;
use liturgy_roster::config::{ConfigError, RosterConfig, RosterConfigReader};
use std::sync::Arc;

/// 固定配置（不经过校验,可构造非法职务包）
#[derive(Debug, Clone)]
pub struct MockConfig {
    pub config: RosterConfig,
}

impl MockConfig {
    pub fn defaults() -> Self {
        Self {
            config: RosterConfig::default(),
        }
    }

    /// 只配置 3 人职务包: 人数 1、2 的事件无法解析
    pub fn only_pack_of_three() -> Self {
        let mut config = RosterConfig::default();
        config.role_packs.sizes.retain(|size, _| *size == 3);
        Self { config }
    }

    pub fn with_tolerance(mut self, tolerance: i64) -> Self {
        self.config.fairness.workload_tolerance = tolerance;
        self
    }
}

#[async_trait]
impl RosterConfigReader for MockConfig {
    async fn load_config(&self) -> Result<Arc<RosterConfig>, ConfigError> {
        Ok(Arc::new(self.config.clone()))
    }
}
