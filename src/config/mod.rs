// ==========================================
// 辅祭排班系统 - 配置层
// ==========================================
// 职责: 类型化配置,支持文件 / 环境变量 / 点分覆写
// ==========================================

pub mod config_manager;
pub mod roster_config;
pub mod roster_config_reader;

// 重导出核心配置类型
pub use config_manager::{ConfigManager, ENV_PREFIX};
pub use roster_config::{
    ConfigError, FairnessConfig, GeneralConfig, RolePackConfig, RosterConfig, WeightConfig,
    MAX_OVERLAP_MINUTES, MAX_WINDOW_DAYS,
};
pub use roster_config_reader::RosterConfigReader;
