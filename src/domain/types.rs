// ==========================================
// 辅祭排班系统 - 领域类型定义
// ==========================================
// 职责: 职务代码 / 所属团体 / 弥撒类型 / 职务席位
// 红线: 字符串代码只在边界解析一次,内部一律使用枚举
// ==========================================

use crate::domain::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// 去除变音符号并转大写（用于姓名排序与代码解析）
///
/// 例: "Heloísa" → "HELOISA", "Eloá" → "ELOA"
pub fn fold_key(value: &str) -> String {
    value
        .trim()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_uppercase()
}

// ==========================================
// 职务代码 (Role Code)
// ==========================================
// 顺序即默认展示顺序
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum RoleCode {
    Lib,  // 持书
    Cru,  // 持十字架
    Mic,  // 持麦克风
    Tur,  // 持香炉
    Nav,  // 持香船
    Cer1, // 持烛一
    Cer2, // 持烛二
    Cam,  // 摇铃
}

impl RoleCode {
    pub const ALL: [RoleCode; 8] = [
        RoleCode::Lib,
        RoleCode::Cru,
        RoleCode::Mic,
        RoleCode::Tur,
        RoleCode::Nav,
        RoleCode::Cer1,
        RoleCode::Cer2,
        RoleCode::Cam,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RoleCode::Lib => "LIB",
            RoleCode::Cru => "CRU",
            RoleCode::Mic => "MIC",
            RoleCode::Tur => "TUR",
            RoleCode::Nav => "NAV",
            RoleCode::Cer1 => "CER1",
            RoleCode::Cer2 => "CER2",
            RoleCode::Cam => "CAM",
        }
    }
}

impl fmt::Display for RoleCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoleCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match fold_key(s).as_str() {
            "LIB" | "LIBRIFERO" => Ok(RoleCode::Lib),
            "CRU" | "CRUCIFERARIO" => Ok(RoleCode::Cru),
            "MIC" | "MICROFONARIO" => Ok(RoleCode::Mic),
            "TUR" | "TURIFERARIO" => Ok(RoleCode::Tur),
            "NAV" | "NAVETEIRO" => Ok(RoleCode::Nav),
            "CER1" | "CERO1" | "CEROFERARIO1" => Ok(RoleCode::Cer1),
            "CER2" | "CERO2" | "CEROFERARIO2" => Ok(RoleCode::Cer2),
            "CAM" | "CAMPANARIO" => Ok(RoleCode::Cam),
            _ => Err(format!("未知职务代码: {}", s)),
        }
    }
}

impl TryFrom<String> for RoleCode {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RoleCode> for String {
    fn from(value: RoleCode) -> Self {
        value.as_str().to_string()
    }
}

// ==========================================
// 所属团体 (Affiliation)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Affiliation {
    Mat,
    Stm,
    Sjt,
    Sjb,
    Des,
    Nsl,
}

impl Affiliation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Affiliation::Mat => "MAT",
            Affiliation::Stm => "STM",
            Affiliation::Sjt => "SJT",
            Affiliation::Sjb => "SJB",
            Affiliation::Des => "DES",
            Affiliation::Nsl => "NSL",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Affiliation::Mat => "Matriz",
            Affiliation::Stm => "São Tiago Maior",
            Affiliation::Sjt => "São Judas Tadeu",
            Affiliation::Sjb => "São João Batista",
            Affiliation::Des => "Divino Espírito Santo",
            Affiliation::Nsl => "Nossa Senhora de Lourdes",
        }
    }
}

impl fmt::Display for Affiliation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Affiliation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match fold_key(s).as_str() {
            "MAT" => Ok(Affiliation::Mat),
            "STM" => Ok(Affiliation::Stm),
            "SJT" => Ok(Affiliation::Sjt),
            "SJB" => Ok(Affiliation::Sjb),
            // DIV 为旧代码
            "DES" | "DIV" => Ok(Affiliation::Des),
            "NSL" => Ok(Affiliation::Nsl),
            _ => Err(format!("未知团体代码: {}", s)),
        }
    }
}

impl TryFrom<String> for Affiliation {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Affiliation> for String {
    fn from(value: Affiliation) -> Self {
        value.as_str().to_string()
    }
}

// ==========================================
// 弥撒类型 (Event Kind)
// ==========================================
// 序列化格式: SCREAMING_SNAKE_CASE
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    #[default]
    #[serde(alias = "REG")]
    Regular, // 常规
    #[serde(alias = "SOLENE")]
    Solemn, // 庄严
}

impl EventKind {
    pub fn is_solemn(&self) -> bool {
        matches!(self, EventKind::Solemn)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::Regular => write!(f, "REGULAR"),
            EventKind::Solemn => write!(f, "SOLEMN"),
        }
    }
}

impl FromStr for EventKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match fold_key(s).as_str() {
            "REGULAR" | "REG" => Ok(EventKind::Regular),
            "SOLEMN" | "SOLENE" => Ok(EventKind::Solemn),
            other => Err(format!("未知弥撒类型: {}", other)),
        }
    }
}

// ==========================================
// 职务席位 (Role Slot)
// ==========================================
// 同一职务在一场弥撒中可出现多次（溢出序列循环时），
// ordinal 从 1 开始区分同码席位。
// 展示: 第一次为 "CRU"，之后为 "CRU#2"、"CRU#3"
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoleSlot {
    pub role: RoleCode,
    pub ordinal: u32,
}

impl RoleSlot {
    pub fn new(role: RoleCode, ordinal: u32) -> Self {
        Self { role, ordinal }
    }

    /// 某职务的第一个席位
    pub fn first(role: RoleCode) -> Self {
        Self { role, ordinal: 1 }
    }

    /// 将有序职务列表展开为席位列表（保持原顺序）
    ///
    /// 每个职务码的序号互不相同; 序号溢出时报错,不合并席位
    pub fn from_roles(roles: &[RoleCode]) -> Result<Vec<RoleSlot>, DomainError> {
        let mut seen: std::collections::HashMap<RoleCode, u32> = std::collections::HashMap::new();
        roles
            .iter()
            .map(|role| -> Result<RoleSlot, DomainError> {
                let ordinal = seen.entry(*role).or_insert(0);
                *ordinal = ordinal
                    .checked_add(1)
                    .ok_or_else(|| DomainError::SlotOrdinalOverflow(role.to_string()))?;
                Ok(RoleSlot::new(*role, *ordinal))
            })
            .collect()
    }
}

impl From<RoleCode> for RoleSlot {
    fn from(role: RoleCode) -> Self {
        RoleSlot::first(role)
    }
}

impl fmt::Display for RoleSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ordinal <= 1 {
            write!(f, "{}", self.role)
        } else {
            write!(f, "{}#{}", self.role, self.ordinal)
        }
    }
}

impl FromStr for RoleSlot {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('#') {
            Some((code, ordinal)) => {
                let role: RoleCode = code.parse()?;
                let ordinal: u32 = ordinal
                    .trim()
                    .parse()
                    .map_err(|_| format!("无效席位序号: {}", s))?;
                if ordinal == 0 {
                    return Err(format!("无效席位序号: {}", s));
                }
                Ok(RoleSlot::new(role, ordinal))
            }
            None => Ok(RoleSlot::first(s.parse()?)),
        }
    }
}

impl TryFrom<String> for RoleSlot {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RoleSlot> for String {
    fn from(value: RoleSlot) -> Self {
        value.to_string()
    }
}
