// ==========================================
// 辅祭排班系统 - 弥撒事件领域模型
// ==========================================
// 不变量: quantity >= 1; 若存在显式结束时间, end >= start
// 有效时间窗: [start, end 或 start + 防撞间隔)
// ==========================================

use crate::domain::error::DomainError;
use crate::domain::types::{Affiliation, EventKind};
use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Timelike};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

// ==========================================
// Event - 弥撒事件
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,                             // 事件ID
    pub affiliation: Affiliation,             // 所属团体
    pub start: DateTime<FixedOffset>,         // 开始时间（带时区）
    #[serde(default)]
    pub end: Option<DateTime<FixedOffset>>,   // 显式结束时间
    pub quantity: u32,                        // 所需人数
    #[serde(default)]
    pub kind: EventKind,                      // 常规 / 庄严
    #[serde(default)]
    pub pool: Option<BTreeSet<Uuid>>,         // 限定候选池（None 表示全体）
}

impl Event {
    pub fn new(
        affiliation: Affiliation,
        start: DateTime<FixedOffset>,
        quantity: u32,
        kind: EventKind,
    ) -> Result<Self, DomainError> {
        let event = Self {
            id: Uuid::new_v4(),
            affiliation,
            start,
            end: None,
            quantity,
            kind,
            pool: None,
        };
        event.validate()?;
        Ok(event)
    }

    pub fn with_end(mut self, end: DateTime<FixedOffset>) -> Result<Self, DomainError> {
        self.end = Some(end);
        self.validate()?;
        Ok(self)
    }

    pub fn with_pool<I>(mut self, pool: I) -> Self
    where
        I: IntoIterator<Item = Uuid>,
    {
        self.pool = Some(pool.into_iter().collect());
        self
    }

    /// 校验不变量（反序列化后也需调用）
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.quantity < 1 {
            return Err(DomainError::InvalidQuantity(self.quantity));
        }
        if let Some(end) = self.end {
            if end < self.start {
                return Err(DomainError::EndBeforeStart {
                    start: self.start.to_rfc3339(),
                    end: end.to_rfc3339(),
                });
            }
        }
        Ok(())
    }

    /// 限定候选池; 空集合视同未限定
    pub fn restricted_pool(&self) -> Option<&BTreeSet<Uuid>> {
        self.pool.as_ref().filter(|pool| !pool.is_empty())
    }

    /// 有效时间窗
    pub fn window(&self, overlap_guard: Duration) -> TimeWindow {
        TimeWindow {
            start: self.start,
            end: self.end.unwrap_or(self.start + overlap_guard),
        }
    }

    /// 当地时间 12 点前为上午场
    pub fn is_morning(&self) -> bool {
        self.start.hour() < 12
    }

    /// 当地日期
    pub fn local_date(&self) -> NaiveDate {
        self.start.date_naive()
    }

    /// 人可读键: {团体}{ddmmYYYYHHMM}{人数:03}
    pub fn key(&self) -> String {
        format!(
            "{}{}{:03}",
            self.affiliation,
            self.start.format("%d%m%Y%H%M"),
            self.quantity
        )
    }
}

// ==========================================
// TimeWindow - 有效时间窗（左闭右开）
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
}

impl TimeWindow {
    /// 严格重叠（首尾相接不算）
    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        self.start < other.end && other.start < self.end
    }
}

// ==========================================
// Period - 日期区间（闭区间）
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PeriodRaw")]
pub struct Period {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

// 反序列化中转: 经 Period::new 校验 from <= to
#[derive(Deserialize)]
struct PeriodRaw {
    from: NaiveDate,
    to: NaiveDate,
}

impl TryFrom<PeriodRaw> for Period {
    type Error = DomainError;

    fn try_from(raw: PeriodRaw) -> Result<Self, Self::Error> {
        Period::new(raw.from, raw.to)
    }
}

impl Period {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self, DomainError> {
        if from > to {
            return Err(DomainError::InvalidPeriod {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        Ok(Self { from, to })
    }

    /// 从 start 起的 days 天（含首日）; 超出日历范围时报错
    pub fn starting(start: NaiveDate, days: u32) -> Result<Self, DomainError> {
        let span = i64::from(days.max(1)) - 1;
        let to = start
            .checked_add_signed(Duration::days(span))
            .ok_or_else(|| DomainError::PeriodOverflow {
                start: start.to_string(),
                days,
            })?;
        Ok(Self { from: start, to })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }

    pub fn contains_event(&self, event: &Event) -> bool {
        self.contains(event.local_date())
    }
}
