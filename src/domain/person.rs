// ==========================================
// 辅祭排班系统 - 人员与不可用时段
// ==========================================
// 红线: 引擎只读人员数据,不修改
// ==========================================

use crate::domain::error::DomainError;
use crate::domain::types::{fold_key, Affiliation, RoleCode};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use unicode_normalization::UnicodeNormalization;
use uuid::Uuid;

fn default_active() -> bool {
    true
}

// ==========================================
// Person - 辅祭人员
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub id: Uuid,                           // 人员ID
    pub name: String,                       // 显示姓名 (NFC)
    pub affiliation: Affiliation,           // 所属团体
    #[serde(default)]
    pub qualifications: BTreeSet<RoleCode>, // 可担任职务
    #[serde(default)]
    pub morning: bool,                      // 偏好上午场
    #[serde(default = "default_active")]
    pub active: bool,                       // 是否在岗
}

impl Person {
    /// 创建新人员（随机ID、在岗、无职务）
    pub fn new(name: &str, affiliation: Affiliation) -> Result<Self, DomainError> {
        Self::with_id(Uuid::new_v4(), name, affiliation)
    }

    /// 使用指定ID创建人员
    pub fn with_id(id: Uuid, name: &str, affiliation: Affiliation) -> Result<Self, DomainError> {
        let name: String = name.trim().nfc().collect();
        if name.is_empty() {
            return Err(DomainError::EmptyName);
        }
        Ok(Self {
            id,
            name,
            affiliation,
            qualifications: BTreeSet::new(),
            morning: false,
            active: true,
        })
    }

    pub fn with_roles<I>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = RoleCode>,
    {
        self.qualifications.extend(roles);
        self
    }

    pub fn is_qualified(&self, role: RoleCode) -> bool {
        self.qualifications.contains(&role)
    }

    /// 确定性排序键: 去变音大写姓名 + ID
    pub fn sort_key(&self) -> (String, Uuid) {
        (fold_key(&self.name), self.id)
    }
}

// ==========================================
// AvailabilityBlock - 不可用时段
// ==========================================
// 硬性排除: 弥撒开始时间落在 [start, end] 内即不可排
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailabilityBlock {
    pub person_id: Uuid,
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
    #[serde(default)]
    pub note: Option<String>,
}

impl AvailabilityBlock {
    pub fn new(
        person_id: Uuid,
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
        note: Option<String>,
    ) -> Result<Self, DomainError> {
        let block = Self {
            person_id,
            start,
            end,
            note,
        };
        block.validate()?;
        Ok(block)
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.end < self.start {
            return Err(DomainError::EndBeforeStart {
                start: self.start.to_rfc3339(),
                end: self.end.to_rfc3339(),
            });
        }
        Ok(())
    }

    /// 闭区间包含判定
    pub fn contains(&self, instant: DateTime<FixedOffset>) -> bool {
        self.start <= instant && instant <= self.end
    }
}
