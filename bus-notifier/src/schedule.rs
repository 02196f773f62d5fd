//! Top-level polling schedule.
//!
//! Runs one poll cycle after another, pacing them against a configured
//! interval. A bad cycle is logged and the schedule carries on; only a stop
//! request ends it.

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{error, info, warn};

use crate::notify::Notifier;
use crate::poller::{QuerySource, RetryingPoller, StationDataFetcher};

/// Fastest the upstream service is ever queried.
pub const MIN_QUERY_INTERVAL: Duration = Duration::from_secs(10);

/// Configuration for the schedule loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopConfig {
    /// Desired time between the starts of consecutive cycles.
    /// Zero means run a single cycle and return.
    pub interval: Duration,

    /// Lower bound applied to `interval`.
    pub min_interval: Duration,
}

impl LoopConfig {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            min_interval: MIN_QUERY_INTERVAL,
        }
    }

    /// A single cycle, no looping.
    pub fn one_shot() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn with_min_interval(mut self, min: Duration) -> Self {
        self.min_interval = min;
        self
    }

    pub fn is_one_shot(&self) -> bool {
        self.interval.is_zero()
    }

    /// The interval actually used between cycles.
    pub fn effective_interval(&self) -> Duration {
        self.interval.max(self.min_interval)
    }
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self::new(MIN_QUERY_INTERVAL)
    }
}

/// What to do between two cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pacing {
    /// The cycle overran the interval; start the next one right away.
    Immediate,
    /// Sleep this long before the next cycle.
    Sleep(Duration),
}

impl Pacing {
    pub fn decide(elapsed: Duration, interval: Duration) -> Self {
        if elapsed >= interval {
            Pacing::Immediate
        } else {
            Pacing::Sleep(interval - elapsed)
        }
    }
}

/// Sending half of a stop request.
#[derive(Debug, Clone)]
pub struct StopHandle(watch::Sender<bool>);

impl StopHandle {
    /// Ask the loop to stop at its next suspension point.
    pub fn stop(&self) {
        self.0.send_replace(true);
    }

    pub fn is_stopped(&self) -> bool {
        *self.0.borrow()
    }

    /// Another receiving half for a second loop or a watcher.
    pub fn subscribe(&self) -> StopSignal {
        StopSignal(self.0.subscribe())
    }
}

/// Receiving half of a stop request.
#[derive(Debug, Clone)]
pub struct StopSignal(watch::Receiver<bool>);

impl StopSignal {
    pub fn is_stopped(&self) -> bool {
        *self.0.borrow()
    }

    /// Resolves once a stop has been requested.
    ///
    /// If every [`StopHandle`] is dropped without stopping, this never
    /// resolves.
    pub async fn stopped(&mut self) {
        let closed = self.0.wait_for(|stopped| *stopped).await.is_err();
        if closed {
            std::future::pending::<()>().await;
        }
    }
}

/// Create a connected stop handle and signal.
pub fn stop_channel() -> (StopHandle, StopSignal) {
    let (tx, rx) = watch::channel(false);
    (StopHandle(tx), StopSignal(rx))
}

/// How a finished run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    /// Cycles started.
    pub cycles: u64,
    /// Cycles that ended in a logged [`PollError`](crate::poller::PollError).
    pub failed_cycles: u64,
}

/// The process-lifetime polling loop.
pub struct ScheduleLoop<F, Q, N> {
    poller: RetryingPoller<F, Q, N>,
    config: LoopConfig,
}

impl<F, Q, N> ScheduleLoop<F, Q, N>
where
    F: StationDataFetcher,
    Q: QuerySource,
    N: Notifier,
{
    pub fn new(poller: RetryingPoller<F, Q, N>, config: LoopConfig) -> Self {
        Self { poller, config }
    }

    pub fn poller(&self) -> &RetryingPoller<F, Q, N> {
        &self.poller
    }

    pub fn config(&self) -> &LoopConfig {
        &self.config
    }

    /// Run cycles until `stop` fires.
    ///
    /// The stop request is honored between cycles and during the sleep
    /// between them, not while a cycle is in flight. Failed cycles are
    /// logged and counted.
    pub async fn run(&self, mut stop: StopSignal) -> RunReport {
        let interval = self.config.effective_interval();
        let mut report = RunReport {
            cycles: 0,
            failed_cycles: 0,
        };

        info!(
            interval_secs = interval.as_secs_f64(),
            one_shot = self.config.is_one_shot(),
            "Starting schedule loop"
        );

        loop {
            if stop.is_stopped() {
                info!(cycles = report.cycles, "Stop requested, leaving schedule loop");
                return report;
            }

            let start = Instant::now();
            report.cycles += 1;

            if let Err(e) = self.poller.poll_once().await {
                report.failed_cycles += 1;
                error!(
                    error = %e,
                    permanent = e.is_permanent(),
                    failed_cycles = report.failed_cycles,
                    "Poll cycle failed"
                );
            }

            if self.config.is_one_shot() {
                return report;
            }

            let elapsed = start.elapsed();
            match Pacing::decide(elapsed, interval) {
                Pacing::Immediate => {
                    warn!(
                        elapsed_secs = elapsed.as_secs_f64(),
                        interval_secs = interval.as_secs_f64(),
                        "Cycle took longer than the query interval, not sleeping"
                    );
                }
                Pacing::Sleep(period) => {
                    info!(
                        sleep_secs = period.as_secs_f64(),
                        "Next attempt to get arrivals scheduled"
                    );
                    tokio::select! {
                        _ = tokio::time::sleep(period) => {}
                        _ = stop.stopped() => {}
                    }
                }
            }
        }
    }
}
