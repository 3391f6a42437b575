//! Time source and tickers.
//!
//! Two independent cadences drive the service: a long refresh period for
//! fetching and a short evaluation period for boundary checks.

use chrono::{DateTime, Utc};
use std::time::Duration;
use tokio::time::{interval, Instant, Interval, MissedTickBehavior};

use crate::config::Config;

/// Source of "now" for evaluation cycles.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

impl<F> Clock for F
where
    F: Fn() -> DateTime<Utc> + Send + Sync,
{
    fn now(&self) -> DateTime<Utc> {
        self()
    }
}

/// The two loop periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cadence {
    pub refresh: Duration,
    pub evaluate: Duration,
}

impl Cadence {
    pub fn from_config(config: &Config) -> Self {
        Self {
            refresh: config.refresh_period(),
            evaluate: config.evaluation_period(),
        }
    }
}

impl Default for Cadence {
    fn default() -> Self {
        Self {
            refresh: Duration::from_secs(60),
            evaluate: Duration::from_millis(200),
        }
    }
}

/// Periodic ticker. An overrunning cycle skips missed ticks instead of
/// firing them in a burst. The first tick completes immediately.
pub fn ticker(period: Duration) -> Interval {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    ticker
}

/// Number of whole periods between a tick's scheduled `deadline` and the
/// instant it was observed. A [`ticker`] drops that many ticks.
pub fn missed_ticks(deadline: Instant, observed: Instant, period: Duration) -> u64 {
    if period.is_zero() {
        return 0;
    }
    let late = observed.saturating_duration_since(deadline);
    u64::try_from(late.as_nanos() / period.as_nanos()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn closures_are_clocks() {
        let fixed = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let clock = move || fixed;
        assert_eq!(clock.now(), fixed);
    }

    #[test]
    fn cadence_follows_config() {
        let mut config = Config::default();
        config.feed.refresh_secs = 90;
        config.evaluation.interval_ms = 250;

        let cadence = Cadence::from_config(&config);
        assert_eq!(cadence.refresh, Duration::from_secs(90));
        assert_eq!(cadence.evaluate, Duration::from_millis(250));
        assert_eq!(Cadence::default().evaluate, Duration::from_millis(200));
    }

    #[tokio::test(start_paused = true)]
    async fn ticker_fires_once_per_period() {
        let mut t = ticker(Duration::from_millis(200));
        let start = tokio::time::Instant::now();
        t.tick().await;
        t.tick().await;
        t.tick().await;
        assert_eq!(start.elapsed(), Duration::from_millis(400));
    }

    #[test]
    fn missed_ticks_counts_whole_periods() {
        let t0 = Instant::now();
        let period = Duration::from_millis(200);
        assert_eq!(missed_ticks(t0, t0, period), 0);
        assert_eq!(missed_ticks(t0, t0 + Duration::from_millis(150), period), 0);
        assert_eq!(missed_ticks(t0, t0 + Duration::from_millis(500), period), 2);
        assert_eq!(missed_ticks(t0 + period, t0, period), 0);
        assert_eq!(missed_ticks(t0, t0 + period, Duration::ZERO), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn overrun_is_reported_as_missed_ticks() {
        let period = Duration::from_millis(200);
        let mut t = ticker(period);
        t.tick().await;

        // Simulate a cycle that runs for 700ms.
        tokio::time::sleep(Duration::from_millis(700)).await;
        let deadline = t.tick().await;
        assert_eq!(missed_ticks(deadline, Instant::now(), period), 2);

        // The ticker skipped ahead; the next tick is on time.
        let deadline = t.tick().await;
        assert_eq!(missed_ticks(deadline, Instant::now(), period), 0);
    }
}
