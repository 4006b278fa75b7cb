//! Job scheduler.
//!
//! [`Scheduler`] owns a handle to the shared world and runs the three
//! recurring jobs on their configured intervals:
//!
//! - **Non-overlapping**: each job runs in its own task and awaits its
//!   previous run before the next interval fires.
//! - **Coalescing**: missed intervals are skipped, not queued.
//! - **Serialized with actions**: every run holds the world lock, so a
//!   job never interleaves with a player action.
//! - **No retry**: a failed run is logged and the next interval tries again.
//!
//! After every successful run the [`JobCallback`] is told, which is how
//! the engine persists and the API broadcasts.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use tycoon_economy::{EconomyConfig, World};

use crate::clock::Clock;
use crate::config::SchedulerConfig;
use crate::tick::{self, CoreStatusReport, ReplenishReport, TickError, VehicleReport};

/// The world shared between the scheduler and the API.
pub type SharedWorld = Arc<Mutex<World>>;

/// The three recurring jobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    /// Energy, timers, indices and expiry sweeps.
    CoreStatusUpdate,
    /// Region reserve refill.
    ResourceReplenishment,
    /// Vehicle validity sweep.
    VehicleValidityCheck,
}

impl JobKind {
    /// Every job, in scheduling order.
    pub const ALL: [Self; 3] = [
        Self::CoreStatusUpdate,
        Self::ResourceReplenishment,
        Self::VehicleValidityCheck,
    ];

    /// Stable name used in logs and broadcasts.
    pub const fn name(self) -> &'static str {
        match self {
            Self::CoreStatusUpdate => "core_status_update",
            Self::ResourceReplenishment => "resource_replenishment",
            Self::VehicleValidityCheck => "vehicle_validity_check",
        }
    }

    /// Configured interval. Zero is raised to one second.
    pub const fn interval(self, config: &SchedulerConfig) -> Duration {
        let secs = match self {
            Self::CoreStatusUpdate => config.core_status_update_secs,
            Self::ResourceReplenishment => config.resource_replenishment_secs,
            Self::VehicleValidityCheck => config.vehicle_validity_check_secs,
        };
        Duration::from_secs(if secs == 0 { 1 } else { secs })
    }
}

/// Result of one successful job run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "job", rename_all = "snake_case")]
pub enum JobReport {
    /// See [`tick::core_status_update`].
    CoreStatusUpdate(CoreStatusReport),
    /// See [`tick::resource_replenishment`].
    ResourceReplenishment(ReplenishReport),
    /// See [`tick::vehicle_validity_check`].
    VehicleValidityCheck(VehicleReport),
}

impl JobReport {
    /// The job that produced this report.
    pub const fn kind(&self) -> JobKind {
        match self {
            Self::CoreStatusUpdate(_) => JobKind::CoreStatusUpdate,
            Self::ResourceReplenishment(_) => JobKind::ResourceReplenishment,
            Self::VehicleValidityCheck(_) => JobKind::VehicleValidityCheck,
        }
    }
}

/// Run one job against `world` at `now`.
pub fn run_job(
    world: &mut World,
    job: JobKind,
    now: DateTime<Utc>,
    config: &EconomyConfig,
) -> Result<JobReport, TickError> {
    Ok(match job {
        JobKind::CoreStatusUpdate => {
            JobReport::CoreStatusUpdate(tick::core_status_update(world, now, config)?)
        }
        JobKind::ResourceReplenishment => {
            JobReport::ResourceReplenishment(tick::resource_replenishment(world, now)?)
        }
        JobKind::VehicleValidityCheck => {
            JobReport::VehicleValidityCheck(tick::vehicle_validity_check(world, now)?)
        }
    })
}

/// Callback invoked after each successful job run.
///
/// Called after the world lock is released, so implementations may lock
/// the world themselves.
pub trait JobCallback: Send + Sync {
    /// Called with the report of a completed run.
    fn on_job(&self, at: DateTime<Utc>, report: &JobReport);
}

/// A no-op job callback for testing.
pub struct NoOpCallback;

impl JobCallback for NoOpCallback {
    fn on_job(&self, _at: DateTime<Utc>, _report: &JobReport) {}
}

/// Drives the recurring jobs.
pub struct Scheduler {
    world: SharedWorld,
    config: Arc<EconomyConfig>,
    clock: Arc<dyn Clock>,
    callback: Arc<dyn JobCallback>,
}

impl Scheduler {
    /// Create a scheduler over a shared world.
    pub fn new(
        world: SharedWorld,
        config: Arc<EconomyConfig>,
        clock: Arc<dyn Clock>,
        callback: Arc<dyn JobCallback>,
    ) -> Self {
        Self {
            world,
            config,
            clock,
            callback,
        }
    }

    /// Run `job` once now, then notify the callback.
    pub async fn run_once(&self, job: JobKind) -> Result<JobReport, TickError> {
        let now = self.clock.now();
        let report = {
            let mut world = self.world.lock().await;
            run_job(&mut world, job, now, &self.config)?
        };
        self.callback.on_job(now, &report);
        Ok(report)
    }

    /// Run `job` every `period` until `shutdown` turns true.
    ///
    /// The first run happens immediately.
    pub async fn run_every(
        &self,
        job: JobKind,
        period: Duration,
        mut shutdown: watch::Receiver<bool>,
    ) {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!(job = job.name(), period_secs = period.as_secs(), "job scheduled");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match self.run_once(job).await {
                        Ok(report) => info!(job = job.name(), ?report, "job completed"),
                        Err(e) => warn!(
                            job = job.name(),
                            phase = e.phase(),
                            error = %e,
                            "job failed; changes rolled back"
                        ),
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!(job = job.name(), "job stopped");
                        return;
                    }
                }
            }
        }
    }

    /// Spawn one task per job on the configured intervals.
    pub fn spawn(
        self: &Arc<Self>,
        intervals: &SchedulerConfig,
        shutdown: &watch::Receiver<bool>,
    ) -> Vec<JoinHandle<()>> {
        JobKind::ALL
            .into_iter()
            .map(|job| {
                let scheduler = Arc::clone(self);
                let period = job.interval(intervals);
                let shutdown = shutdown.clone();
                tokio::spawn(async move { scheduler.run_every(job, period, shutdown).await })
            })
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::TimeZone;
    use tokio::sync::mpsc;
    use tycoon_economy::seed::seed_world;

    use super::*;
    use crate::clock::ManualClock;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap()
    }

    fn shared_world() -> SharedWorld {
        let mut world = World::new();
        seed_world(&mut world, &EconomyConfig::default(), start());
        Arc::new(Mutex::new(world))
    }

    struct Counting(AtomicUsize);

    impl JobCallback for Counting {
        fn on_job(&self, _at: DateTime<Utc>, _report: &JobReport) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct Forward(mpsc::UnboundedSender<JobKind>);

    impl JobCallback for Forward {
        fn on_job(&self, _at: DateTime<Utc>, report: &JobReport) {
            let _ = self.0.send(report.kind());
        }
    }

    #[test]
    fn zero_interval_is_raised_to_one_second() {
        let config = SchedulerConfig {
            core_status_update_secs: 0,
            resource_replenishment_secs: 21_600,
            vehicle_validity_check_secs: 3_600,
        };
        assert_eq!(
            JobKind::CoreStatusUpdate.interval(&config),
            Duration::from_secs(1)
        );
        assert_eq!(
            JobKind::ResourceReplenishment.interval(&config),
            Duration::from_secs(21_600)
        );
    }

    #[test]
    fn report_serializes_with_job_tag() {
        let report = JobReport::ResourceReplenishment(ReplenishReport {
            regions_refilled: 2,
        });
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["job"], "resource_replenishment");
        assert_eq!(json["regions_refilled"], 2);
    }

    #[tokio::test]
    async fn run_once_uses_the_clock_and_notifies() {
        let world = shared_world();
        {
            let mut w = world.lock().await;
            for region in w.regions.values_mut() {
                region.gold_reserve = rust_decimal::Decimal::ZERO;
            }
        }
        let callback = Arc::new(Counting(AtomicUsize::new(0)));
        let scheduler = Scheduler::new(
            Arc::clone(&world),
            Arc::new(EconomyConfig::default()),
            Arc::new(ManualClock::new(start())),
            Arc::clone(&callback) as Arc<dyn JobCallback>,
        );

        let report = scheduler
            .run_once(JobKind::ResourceReplenishment)
            .await
            .unwrap();

        let regions = world.lock().await.regions.len();
        assert_eq!(
            report,
            JobReport::ResourceReplenishment(ReplenishReport {
                regions_refilled: regions
            })
        );
        assert_eq!(callback.0.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn scheduled_job_runs_immediately_and_stops_on_shutdown() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let scheduler = Arc::new(Scheduler::new(
            shared_world(),
            Arc::new(EconomyConfig::default()),
            Arc::new(ManualClock::new(start())),
            Arc::new(Forward(tx)),
        ));
        let (stop_tx, stop_rx) = watch::channel(false);
        let config = SchedulerConfig::default();

        let handles = scheduler.spawn(&config, &stop_rx);
        let mut seen = Vec::new();
        for _ in 0..3 {
            seen.push(rx.recv().await.unwrap());
        }
        seen.sort();
        assert_eq!(seen, JobKind::ALL.to_vec());

        stop_tx.send(true).unwrap();
        for handle in handles {
            handle.await.unwrap();
        }
    }
}
