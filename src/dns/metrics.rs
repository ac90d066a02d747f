//! Lookup counters for the [`Provider`](super::Provider).
//!
//! The recorder is injected per provider, so two providers in one process
//! never share totals.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Receives one call per lookup attempt and one per failed lookup.
pub trait ResolveMetrics: Send + Sync + fmt::Debug {
    /// A tagged address was handed to the resolver.
    fn lookup(&self);
    /// That lookup failed; prior targets were kept.
    fn failure(&self);

    /// Total lookups recorded, for recorders that keep one.
    fn lookups(&self) -> u64;
    /// Total failures recorded, for recorders that keep one.
    fn failures(&self) -> u64;
}

/// In-memory counters.
#[derive(Debug, Default)]
pub struct LookupCounters {
    lookups: AtomicU64,
    failures: AtomicU64,
}

impl LookupCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total lookups attempted.
    pub fn lookups(&self) -> u64 {
        self.lookups.load(Ordering::Relaxed)
    }

    /// Total lookups that failed.
    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }
}

impl ResolveMetrics for LookupCounters {
    fn lookup(&self) {
        self.lookups.fetch_add(1, Ordering::Relaxed);
    }

    fn failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    fn lookups(&self) -> u64 {
        LookupCounters::lookups(self)
    }

    fn failures(&self) -> u64 {
        LookupCounters::failures(self)
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopMetrics;

impl ResolveMetrics for NoopMetrics {
    fn lookup(&self) {}

    fn failure(&self) {}

    fn lookups(&self) -> u64 {
        0
    }

    fn failures(&self) -> u64 {
        0
    }
}
