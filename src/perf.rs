use std::cell::Cell;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Once;
use std::time::Instant;

static PERF_ENABLED: AtomicBool = AtomicBool::new(false);
static PERF_INIT: Once = Once::new();

thread_local! {
    static PERF_DEPTH: Cell<u32> = Cell::new(0);
    static EVAL_COUNT: Cell<u64> = Cell::new(0);
}

fn is_true(v: &str) -> bool {
    matches!(
        v.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "y" | "on"
    )
}

/// 性能日志开关
///
/// - Debug 默认开启; Release 默认关闭
/// - `LITURGY_ROSTER_PERF=1` 强制开启, `=0` 强制关闭
pub fn is_enabled() -> bool {
    PERF_INIT.call_once(|| {
        let enabled = match std::env::var("LITURGY_ROSTER_PERF") {
            Ok(v) => is_true(&v),
            Err(_) => cfg!(debug_assertions),
        };
        PERF_ENABLED.store(enabled, Ordering::Relaxed);
    });
    PERF_ENABLED.load(Ordering::Relaxed)
}

/// 记录一次候选人评估（仅在 PerfGuard 作用域内计数）
pub fn record_evaluation() {
    let active = PERF_DEPTH.with(|d| d.get() > 0);
    if active {
        EVAL_COUNT.with(|c| c.set(c.get().saturating_add(1)));
    }
}

/// 性能统计 Guard：记录 elapsed_ms + 候选人评估次数
///
/// 使用方式：
/// ```ignore
/// let _perf = liturgy_roster::perf::PerfGuard::new("recalculate");
/// // do work...
/// ```
pub struct PerfGuard {
    op: &'static str,
    start: Instant,
    eval_start: u64,
}

impl PerfGuard {
    pub fn new(op: &'static str) -> Self {
        PERF_DEPTH.with(|d| d.set(d.get().saturating_add(1)));
        let eval_start = EVAL_COUNT.with(|c| c.get());
        Self {
            op,
            start: Instant::now(),
            eval_start,
        }
    }
}

impl Drop for PerfGuard {
    fn drop(&mut self) {
        PERF_DEPTH.with(|d| d.set(d.get().saturating_sub(1)));
        if !is_enabled() {
            return;
        }

        let elapsed_ms = self.start.elapsed().as_millis() as u64;
        let eval_count = EVAL_COUNT
            .with(|c| c.get())
            .saturating_sub(self.eval_start);

        tracing::info!(
            target: "perf",
            op = self.op,
            elapsed_ms,
            eval_count,
            "done"
        );
    }
}
