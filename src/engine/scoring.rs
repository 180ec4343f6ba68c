// ==========================================
// 辅祭排班系统 - 候选人评分
// ==========================================
// score = -W负载·窗口次数 + W间隔·距上次天数 - W轮换·职务重复
//         + W上午(偏好匹配) + W庄严(庄严弥撒)
// 红线: 分数必须可拆解（每一项单独输出）
// ==========================================

use crate::config::WeightConfig;
use crate::domain::event::Event;
use crate::domain::person::Person;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// 评分明细
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub load: f64,
    pub recency: f64,
    pub rotation: f64,
    pub morning: f64,
    pub solemn: f64,
    pub total: f64,
}

/// 评分输入
#[derive(Debug, Clone, Copy)]
pub struct ScoreInput {
    pub window_count: usize,
    pub days_since_last: f64,
    pub role_repetition: usize,
}

#[derive(Debug, Clone)]
pub struct CandidateRanker {
    weights: WeightConfig,
}

impl CandidateRanker {
    pub fn new(weights: WeightConfig) -> Self {
        Self { weights }
    }

    pub fn score(&self, input: ScoreInput, person: &Person, event: &Event) -> ScoreBreakdown {
        let w = &self.weights;
        let load = -w.load_balance * input.window_count as f64;
        let recency = w.recency * input.days_since_last;
        let rotation = -w.role_rotation * input.role_repetition as f64;
        let morning = if event.is_morning() == person.morning {
            w.morning_pref
        } else {
            0.0
        };
        let solemn = if event.kind.is_solemn() { w.solemn_bonus } else { 0.0 };

        ScoreBreakdown {
            load,
            recency,
            rotation,
            morning,
            solemn,
            total: load + recency + rotation + morning + solemn,
        }
    }
}

/// 平分时按去变音大写姓名、再按ID
pub fn tie_break(a: &Person, b: &Person) -> Ordering {
    a.sort_key().cmp(&b.sort_key())
}

/// 分数降序
pub fn by_score_desc(a: &ScoreBreakdown, b: &ScoreBreakdown) -> Ordering {
    b.total.total_cmp(&a.total)
}
