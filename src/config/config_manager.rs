// ==========================================
// 辅祭排班系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 加载顺序: 默认值 → TOML 文件 → 环境变量 → 点分覆写
// 红线: 配置只在两次排班之间整体替换,计算中途不变
// ==========================================

use crate::config::roster_config::{ConfigError, RosterConfig};
use crate::config::roster_config_reader::RosterConfigReader;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// 环境变量前缀: LITURGY_ROSTER__FAIRNESS__WORKLOAD_TOLERANCE=3
pub const ENV_PREFIX: &str = "LITURGY_ROSTER__";

const APP_DIR: &str = "liturgy-roster";
const CONFIG_FILE: &str = "config.toml";

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    current: Arc<RwLock<Arc<RosterConfig>>>,
    source_path: Option<PathBuf>,
}

impl ConfigManager {
    /// 使用给定配置创建（先校验）
    pub fn new(config: RosterConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            current: Arc::new(RwLock::new(Arc::new(config))),
            source_path: None,
        })
    }

    /// 默认配置
    pub fn with_defaults() -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(RosterConfig::default()))),
            source_path: None,
        }
    }

    /// 用户配置目录下的默认配置文件路径
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
    }

    /// 按标准顺序加载配置（读取进程环境变量）
    ///
    /// # 参数
    /// - path: 显式配置文件; None 时尝试默认路径（不存在则跳过）
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_env(path, std::env::vars())
    }

    /// 按标准顺序加载配置,环境变量由调用方提供
    pub fn load_with_env<I>(path: Option<&Path>, env: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let source_path = match path {
            Some(explicit) => Some(explicit.to_path_buf()),
            None => Self::default_config_path().filter(|candidate| candidate.is_file()),
        };

        let mut config = match &source_path {
            Some(file) => {
                let text = std::fs::read_to_string(file)?;
                toml::from_str::<RosterConfig>(&text)?
            }
            None => RosterConfig::default(),
        };

        let mut env_applied = 0usize;
        for (name, value) in env {
            if let Some(key) = env_key_to_dotted(&name) {
                config.set_dotted(&key, &value)?;
                env_applied += 1;
            }
        }
        config.validate()?;

        tracing::info!(
            source = ?source_path,
            env_overrides = env_applied,
            "排班配置加载完成"
        );

        Ok(Self {
            current: Arc::new(RwLock::new(Arc::new(config))),
            source_path,
        })
    }

    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }

    /// 当前配置快照（排班计算期间持有,不受后续替换影响）
    pub fn current(&self) -> Result<Arc<RosterConfig>, ConfigError> {
        let guard = self
            .current
            .read()
            .map_err(|e| ConfigError::LockError(e.to_string()))?;
        Ok(Arc::clone(&guard))
    }

    /// 整体替换配置
    pub fn replace(&self, config: RosterConfig) -> Result<(), ConfigError> {
        config.validate()?;
        let mut guard = self
            .current
            .write()
            .map_err(|e| ConfigError::LockError(e.to_string()))?;
        *guard = Arc::new(config);
        tracing::info!("排班配置已替换");
        Ok(())
    }

    /// 应用点分覆写（全部成功才生效）
    ///
    /// # 参数
    /// - overrides: (键, 值) 列表,如 ("fairness.workload_tolerance", "3")
    ///
    /// # 返回
    /// - 替换后的配置快照
    pub fn apply_overrides(&self, overrides: &[(&str, &str)]) -> Result<Arc<RosterConfig>, ConfigError> {
        let mut guard = self
            .current
            .write()
            .map_err(|e| ConfigError::LockError(e.to_string()))?;

        let mut next = RosterConfig::clone(&guard);
        for (key, value) in overrides {
            next.set_dotted(key, value)?;
        }
        next.validate()?;

        let next = Arc::new(next);
        *guard = Arc::clone(&next);
        tracing::info!(count = overrides.len(), "排班配置覆写已生效");
        Ok(next)
    }

    /// 从来源文件重新加载（无来源文件时回到默认值）
    pub fn reload(&self) -> Result<Arc<RosterConfig>, ConfigError> {
        let config = match &self.source_path {
            Some(file) => RosterConfig::from_toml_str(&std::fs::read_to_string(file)?)?,
            None => RosterConfig::default(),
        };
        self.replace(config)?;
        self.current()
    }

    /// 当前配置的 JSON 快照（审计用）
    pub fn snapshot_json(&self) -> Result<String, ConfigError> {
        let config = self.current()?;
        serde_json::to_string(config.as_ref()).map_err(|e| ConfigError::Render(e.to_string()))
    }

    /// 当前配置的 TOML 文本
    pub fn snapshot_toml(&self) -> Result<String, ConfigError> {
        self.current()?.to_toml_string()
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// LITURGY_ROSTER__FAIRNESS__WORKLOAD_TOLERANCE → fairness.workload_tolerance
fn env_key_to_dotted(name: &str) -> Option<String> {
    let rest = name.strip_prefix(ENV_PREFIX)?;
    if rest.is_empty() {
        return None;
    }
    Some(rest.to_lowercase().replace("__", "."))
}

// ==========================================
// RosterConfigReader Trait 实现
// ==========================================
#[async_trait]
impl RosterConfigReader for ConfigManager {
    async fn load_config(&self) -> Result<Arc<RosterConfig>, ConfigError> {
        self.current()
    }
}
