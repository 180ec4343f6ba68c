// ==========================================
// 辅祭排班系统 - 排班配置项全集
// ==========================================
// 职责: 类型化配置 + 默认值 + 加载时校验
// 红线: 越界配置在加载时拒绝,引擎内部不再重复校验
// ==========================================

use crate::domain::types::RoleCode;
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

// ==========================================
// ConfigError - 配置错误
// ==========================================
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置值越界 ({field}): {message}")]
    OutOfRange { field: String, message: String },

    #[error("未知配置项: {0}")]
    UnknownKey(String),

    #[error("配置值格式错误 ({key}={value})")]
    InvalidValue { key: String, value: String },

    #[error("配置文件读取失败: {0}")]
    Io(#[from] std::io::Error),

    #[error("配置文件解析失败: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("配置渲染失败: {0}")]
    Render(String),

    #[error("配置锁获取失败: {0}")]
    LockError(String),
}

/// 防撞间隔上限（一天）
pub const MAX_OVERLAP_MINUTES: i64 = 1_440;
/// 各类天数窗口上限（十年）
pub const MAX_WINDOW_DAYS: i64 = 3_650;

fn out_of_range(field: &str, message: &str) -> ConfigError {
    ConfigError::OutOfRange {
        field: field.to_string(),
        message: message.to_string(),
    }
}

// ==========================================
// 通用配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub overlap_minutes: i64,   // 防撞间隔（无显式结束时间时的占用时长）
    pub default_view_days: i64, // 未指定区间时的默认天数
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            overlap_minutes: 110,
            default_view_days: 30,
        }
    }
}

// ==========================================
// 公平性配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FairnessConfig {
    pub fair_window_days: i64,     // 工作量统计窗口
    pub role_rot_window_days: i64, // 职务轮换窗口
    pub workload_tolerance: i64,   // 阈值 = 平均值 + 容差
}

impl Default for FairnessConfig {
    fn default() -> Self {
        Self {
            fair_window_days: 90,
            role_rot_window_days: 45,
            workload_tolerance: 2,
        }
    }
}

// ==========================================
// 评分权重
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeightConfig {
    pub load_balance: f64,
    pub recency: f64,
    pub role_rotation: f64,
    pub morning_pref: f64,
    pub solemn_bonus: f64,
    /// 窗口内无历史时代入的"距上次服务天数"
    pub newcomer_recency_days: f64,
}

impl Default for WeightConfig {
    fn default() -> Self {
        Self {
            load_balance: 80.0,
            recency: 1.2,
            role_rotation: 6.0,
            morning_pref: 1.0,
            solemn_bonus: 0.8,
            newcomer_recency_days: 7.5,
        }
    }
}

// ==========================================
// 职务包配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RolePackConfig {
    /// 超出基础包时循环追加的职务序列
    pub overflow: Vec<RoleCode>,
    /// 人数 → 有序职务列表
    #[serde(with = "pack_table")]
    pub sizes: BTreeMap<u32, Vec<RoleCode>>,
}

impl Default for RolePackConfig {
    fn default() -> Self {
        use RoleCode::*;
        let mut sizes = BTreeMap::new();
        sizes.insert(1, vec![Lib]);
        sizes.insert(2, vec![Lib, Cru]);
        sizes.insert(3, vec![Lib, Cru, Mic]);
        sizes.insert(4, vec![Lib, Cru, Mic, Tur]);
        sizes.insert(5, vec![Lib, Cru, Mic, Tur, Nav]);
        sizes.insert(6, vec![Lib, Cru, Mic, Tur, Nav, Cam]);
        sizes.insert(7, vec![Lib, Cru, Mic, Tur, Nav, Cer1, Cer2]);
        sizes.insert(8, vec![Lib, Cru, Mic, Tur, Nav, Cer1, Cer2, Cam]);
        Self {
            overflow: vec![Cer1, Cer2, Cru, Mic, Nav, Cam, Tur, Lib],
            sizes,
        }
    }
}

// TOML 表键只能是字符串,人数键在这里转换
mod pack_table {
    use crate::domain::types::RoleCode;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::collections::BTreeMap;

    pub fn serialize<S>(value: &BTreeMap<u32, Vec<RoleCode>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let as_strings: BTreeMap<String, &Vec<RoleCode>> =
            value.iter().map(|(k, v)| (k.to_string(), v)).collect();
        as_strings.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<BTreeMap<u32, Vec<RoleCode>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: BTreeMap<String, Vec<RoleCode>> = BTreeMap::deserialize(deserializer)?;
        raw.into_iter()
            .map(|(k, v)| {
                k.trim()
                    .parse::<u32>()
                    .map(|size| (size, v))
                    .map_err(|_| D::Error::custom(format!("职务包键必须为正整数: {}", k)))
            })
            .collect()
    }
}

// ==========================================
// RosterConfig - 排班配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RosterConfig {
    pub general: GeneralConfig,
    pub fairness: FairnessConfig,
    pub weights: WeightConfig,
    pub role_packs: RolePackConfig,
}

impl RosterConfig {
    /// 从 TOML 文本解析（缺省项取默认值）并校验
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: RosterConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Render(e.to_string()))
    }

    pub fn overlap_guard(&self) -> Duration {
        Duration::minutes(self.general.overlap_minutes)
    }

    pub fn fair_window(&self) -> Duration {
        Duration::days(self.fairness.fair_window_days)
    }

    pub fn rotation_window(&self) -> Duration {
        Duration::days(self.fairness.role_rot_window_days)
    }

    /// 校验全部配置项
    pub fn validate(&self) -> Result<(), ConfigError> {
        let windows = [
            ("general.overlap_minutes", self.general.overlap_minutes, 0, MAX_OVERLAP_MINUTES),
            ("general.default_view_days", self.general.default_view_days, 1, MAX_WINDOW_DAYS),
            ("fairness.fair_window_days", self.fairness.fair_window_days, 1, MAX_WINDOW_DAYS),
            ("fairness.role_rot_window_days", self.fairness.role_rot_window_days, 0, MAX_WINDOW_DAYS),
        ];
        for (field, value, min, max) in windows {
            if value < min || value > max {
                return Err(out_of_range(field, &format!("必须在 {}..={} 之间", min, max)));
            }
        }
        if self.fairness.workload_tolerance < 0 {
            return Err(out_of_range("fairness.workload_tolerance", "不能为负"));
        }

        let weights = [
            ("weights.load_balance", self.weights.load_balance),
            ("weights.recency", self.weights.recency),
            ("weights.role_rotation", self.weights.role_rotation),
            ("weights.morning_pref", self.weights.morning_pref),
            ("weights.solemn_bonus", self.weights.solemn_bonus),
            ("weights.newcomer_recency_days", self.weights.newcomer_recency_days),
        ];
        for (field, value) in weights {
            if !value.is_finite() || value < 0.0 {
                return Err(out_of_range(field, "必须为非负有限数"));
            }
        }

        if self.role_packs.overflow.is_empty() {
            return Err(out_of_range("role_packs.overflow", "溢出序列不能为空"));
        }
        if self.role_packs.sizes.is_empty() {
            return Err(out_of_range("role_packs.sizes", "至少配置一个职务包"));
        }
        for (size, roles) in &self.role_packs.sizes {
            if *size == 0 {
                return Err(out_of_range("role_packs.sizes", "职务包人数必须 >= 1"));
            }
            if roles.len() != *size as usize {
                return Err(ConfigError::OutOfRange {
                    field: format!("role_packs.sizes.{}", size),
                    message: format!("职务数 {} 与人数不一致", roles.len()),
                });
            }
        }
        Ok(())
    }

    /// 应用单个点分键覆写（如 fairness.workload_tolerance=3）
    ///
    /// 只修改字段,不做整体校验; 调用方负责随后调用 validate()
    pub fn set_dotted(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let key_norm = key.trim().to_lowercase();
        let raw = value.trim();
        match key_norm.as_str() {
            "general.overlap_minutes" => self.general.overlap_minutes = parse_num(key, raw)?,
            "general.default_view_days" => self.general.default_view_days = parse_num(key, raw)?,
            "fairness.fair_window_days" => self.fairness.fair_window_days = parse_num(key, raw)?,
            "fairness.role_rot_window_days" => {
                self.fairness.role_rot_window_days = parse_num(key, raw)?
            }
            "fairness.workload_tolerance" => self.fairness.workload_tolerance = parse_num(key, raw)?,
            "weights.load_balance" => self.weights.load_balance = parse_num(key, raw)?,
            "weights.recency" => self.weights.recency = parse_num(key, raw)?,
            "weights.role_rotation" => self.weights.role_rotation = parse_num(key, raw)?,
            "weights.morning_pref" => self.weights.morning_pref = parse_num(key, raw)?,
            "weights.solemn_bonus" => self.weights.solemn_bonus = parse_num(key, raw)?,
            "weights.newcomer_recency_days" => {
                self.weights.newcomer_recency_days = parse_num(key, raw)?
            }
            "role_packs.overflow" => self.role_packs.overflow = parse_roles(key, raw)?,
            other => {
                let size = other
                    .strip_prefix("role_packs.sizes.")
                    .or_else(|| other.strip_prefix("packs."))
                    .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
                let size: u32 = parse_num(key, size)?;
                self.role_packs.sizes.insert(size, parse_roles(key, raw)?);
            }
        }
        Ok(())
    }
}

fn parse_num<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse::<T>().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: raw.to_string(),
    })
}

fn parse_roles(key: &str, raw: &str) -> Result<Vec<RoleCode>, ConfigError> {
    raw.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .map(|token| {
            token.parse::<RoleCode>().map_err(|_| ConfigError::InvalidValue {
                key: key.to_string(),
                value: token.to_string(),
            })
        })
        .collect()
}
