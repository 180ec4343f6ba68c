// ==========================================
// 辅祭排班系统 - 领域校验错误
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 领域对象构造/校验错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("人数必须为正: quantity={0}")]
    InvalidQuantity(u32),

    #[error("结束时间早于开始时间: start={start}, end={end}")]
    EndBeforeStart { start: String, end: String },

    #[error("无效日期区间: from={from} to={to}")]
    InvalidPeriod { from: String, to: String },

    #[error("日期区间超出日历范围: start={start}, days={days}")]
    PeriodOverflow { start: String, days: u32 },

    #[error("职务席位序号溢出: {0}")]
    SlotOrdinalOverflow(String),

    #[error("姓名不能为空")]
    EmptyName,

    #[error("无效引用: {0}")]
    InvalidReference(String),
}
