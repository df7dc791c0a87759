//! Tick sources that pace the ingestion loop.

use std::future::Future;
use std::time::Duration;

use tokio::time::{interval, Interval, MissedTickBehavior};

use crate::{BlogoError, Result};

/// Paces the aggregation loop.
///
/// `tick` resolves when the next cycle should start, or with `false` when
/// no further cycles should run.
pub trait Ticker: Send {
    fn tick(&mut self) -> impl Future<Output = bool> + Send;
}

/// Fixed-period ticker backed by a tokio interval.
///
/// The first tick completes immediately. Ticks missed while a cycle
/// overruns the period are skipped rather than fired in a burst.
#[derive(Debug)]
pub struct IntervalTicker {
    interval: Interval,
}

impl IntervalTicker {
    /// Create a ticker with the given period.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(period: Duration) -> Result<Self> {
        if period.is_zero() {
            return Err(BlogoError::Config("interval must be positive".into()));
        }
        let mut interval = interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        Ok(Self { interval })
    }

    /// The tick period.
    pub fn period(&self) -> Duration {
        self.interval.period()
    }
}

impl Ticker for IntervalTicker {
    async fn tick(&mut self) -> bool {
        self.interval.tick().await;
        true
    }
}

/// Ticker that fires immediately a fixed number of times, then stops.
#[derive(Debug, Clone)]
pub struct CountedTicker {
    remaining: usize,
}

impl CountedTicker {
    pub fn new(count: usize) -> Self {
        Self { remaining: count }
    }

    /// Ticks left before the ticker stops.
    pub fn remaining(&self) -> usize {
        self.remaining
    }
}

impl Ticker for CountedTicker {
    async fn tick(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        true
    }
}
