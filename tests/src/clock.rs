//! Deterministic clocks.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use cmdb_audit::Clock;

fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or_default()
}

/// Clock that advances one second per reading.
#[derive(Debug, Default)]
pub struct StepClock {
    ticks: AtomicI64,
}

impl StepClock {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

impl Clock for StepClock {
    fn now(&self) -> DateTime<Utc> {
        epoch() + Duration::seconds(self.ticks.fetch_add(1, Ordering::SeqCst))
    }
}

/// Clock that always reads the same instant.
#[derive(Debug, Default)]
pub struct FrozenClock;

impl FrozenClock {
    pub fn new() -> Arc<Self> {
        Arc::new(Self)
    }
}

impl Clock for FrozenClock {
    fn now(&self) -> DateTime<Utc> {
        epoch()
    }
}
