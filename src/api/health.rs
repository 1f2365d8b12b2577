//! Shared health state for the /health endpoint.
//! Updated by the draw feed and the recommendation pipeline.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Shared health metrics. Updated by upstream callers, read by API.
#[derive(Default)]
pub struct HealthState {
    /// True when the last lottery fetch returned draws.
    pub last_fetch_ok: AtomicBool,
    /// Nanosecond timestamp of the last lottery fetch attempt (0 = none).
    pub last_fetch_at_ns: AtomicU64,
    /// Lottery fetches that came back empty or failed.
    pub fetch_failures: AtomicU64,
    /// Completion calls that errored and were answered with a fallback.
    pub llm_failures: AtomicU64,
    /// Completion replies without usable bets, replaced by random bets.
    pub empty_replies: AtomicU64,
}

impl HealthState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_fetch(&self, ok: bool, at_ns: u64) {
        self.last_fetch_ok.store(ok, Ordering::Relaxed);
        self.last_fetch_at_ns.store(at_ns, Ordering::Relaxed);
        if !ok {
            self.fetch_failures.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn inc_llm_failures(&self) {
        self.llm_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_empty_replies(&self) {
        self.empty_replies.fetch_add(1, Ordering::Relaxed);
    }

    pub fn last_fetch_ok(&self) -> bool {
        self.last_fetch_ok.load(Ordering::Relaxed)
    }

    pub fn last_fetch_at_ns(&self) -> u64 {
        self.last_fetch_at_ns.load(Ordering::Relaxed)
    }

    pub fn fetch_failures(&self) -> u64 {
        self.fetch_failures.load(Ordering::Relaxed)
    }

    pub fn llm_failures(&self) -> u64 {
        self.llm_failures.load(Ordering::Relaxed)
    }

    pub fn empty_replies(&self) -> u64 {
        self.empty_replies.load(Ordering::Relaxed)
    }
}
