// ==========================================
// 辅祭排班系统 - 职务包解析
// ==========================================
// 职责: 人数 → 有序职务列表
// 规则: 精确匹配 > 最大的不超过人数的包 + 溢出序列循环补齐
// 红线: 无状态、无 I/O
// ==========================================

use crate::config::RolePackConfig;
use crate::domain::types::{RoleCode, RoleSlot};
use crate::engine::error::{EngineError, EngineResult};
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct RolePackResolver {
    sizes: BTreeMap<u32, Vec<RoleCode>>,
    overflow: Vec<RoleCode>,
}

impl RolePackResolver {
    pub fn from_config(config: &RolePackConfig) -> Self {
        Self {
            sizes: config.sizes.clone(),
            overflow: config.overflow.clone(),
        }
    }

    /// 解析所需职务列表
    ///
    /// # 参数
    /// - quantity: 所需人数 (>= 1)
    ///
    /// # 返回
    /// - Ok(Vec<RoleCode>): 长度恰为 quantity
    /// - Err(Configuration): 没有不超过 quantity 的职务包
    pub fn resolve(&self, quantity: u32) -> EngineResult<Vec<RoleCode>> {
        if quantity == 0 {
            return Err(EngineError::Configuration("所需人数必须 >= 1".to_string()));
        }
        if let Some(pack) = self.sizes.get(&quantity) {
            return Ok(pack.clone());
        }

        let (_, base) = self.sizes.range(..=quantity).next_back().ok_or_else(|| {
            EngineError::Configuration(format!("没有适用于 {} 人的职务包", quantity))
        })?;

        let target = quantity as usize;
        let mut roles = base.clone();
        roles.truncate(target);
        if roles.len() < target && self.overflow.is_empty() {
            return Err(EngineError::Configuration("溢出职务序列为空".to_string()));
        }
        let missing = target - roles.len();
        roles.extend(self.overflow.iter().cycle().take(missing).copied());
        Ok(roles)
    }

    /// 解析为席位列表（同码职务按出现次序编号）
    pub fn resolve_slots(&self, quantity: u32) -> EngineResult<Vec<RoleSlot>> {
        RoleSlot::from_roles(&self.resolve(quantity)?)
            .map_err(|e| EngineError::Configuration(e.to_string()))
    }

    /// 席位是否属于该人数的职务包
    pub fn slot_exists(&self, quantity: u32, slot: &RoleSlot) -> EngineResult<bool> {
        Ok(self.resolve_slots(quantity)?.contains(slot))
    }
}
