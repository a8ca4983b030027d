use chrono::Local;
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Duration, Instant, Interval, MissedTickBehavior};

use crate::config::SignalConfig;
use crate::control_system::duration_policy::DurationPolicy;
use crate::control_system::rotation_scheduler::{RotationScheduler, RotationSnapshot};
use crate::error::SignalResult;
use crate::monitoring::notifier::{dispatch_detached, LogNotifier, ViolationNotifier};
use crate::monitoring::violation_detector::{SimulatedWrongWayDetector, ViolationDetector};
use crate::monitoring::violation_sink::ViolationSink;
use crate::shared_data::{lock, ViolationRecord};
use crate::simulation_engine::density::{DensitySampler, SimulatedDensitySampler};
use crate::simulation_engine::intersections::{create_intersections_named, IntersectionId};

/// Rotation state plus the flag that gates every mutation. `stop()` clears
/// the flag under the same lock, so nothing mutates after it returns.
struct LoopState {
    scheduler: RotationScheduler,
    running: bool,
}

struct ViolationDesk {
    sink: ViolationSink,
    detecting: bool,
}

/// Drives one rotation: a tick timer that counts down and rotates, and a
/// density timer that refreshes readings. Both run on a single task and
/// mutate the state one at a time.
pub struct ControlLoop {
    config: SignalConfig,
    state: Arc<Mutex<LoopState>>,
    sampler: Arc<dyn DensitySampler>,
    detector: Arc<dyn ViolationDetector>,
    notifiers: Vec<Arc<dyn ViolationNotifier>>,
    desk: Arc<Mutex<ViolationDesk>>,
    loop_task: Mutex<Option<JoinHandle<()>>>,
    detection_task: Mutex<Option<JoinHandle<()>>>,
}

impl ControlLoop {
    /// Validates the config and builds the rotation. Nothing runs until `start()`.
    pub fn new(config: SignalConfig, sampler: Arc<dyn DensitySampler>) -> SignalResult<Self> {
        config.validate()?;
        let policy = DurationPolicy::new(config.duration_buckets.clone())?;
        let intersections = create_intersections_named(&config.intersection_names);
        let scheduler = RotationScheduler::initialize(intersections, policy)?;
        let detector = Arc::new(SimulatedWrongWayDetector::new(config.violation_probability));

        Ok(Self {
            config,
            state: Arc::new(Mutex::new(LoopState {
                scheduler,
                running: false,
            })),
            sampler,
            detector,
            notifiers: vec![Arc::new(LogNotifier)],
            desk: Arc::new(Mutex::new(ViolationDesk {
                sink: ViolationSink::default(),
                detecting: false,
            })),
            loop_task: Mutex::new(None),
            detection_task: Mutex::new(None),
        })
    }

    /// Simulated camera readings and simulated wrong-way detection.
    pub fn simulated(config: SignalConfig) -> SignalResult<Self> {
        let sampler = Arc::new(SimulatedDensitySampler::new(config.sampler.clone()));
        Self::new(config, sampler)
    }

    pub fn with_detector(mut self, detector: Arc<dyn ViolationDetector>) -> Self {
        self.detector = detector;
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn ViolationNotifier>) -> Self {
        self.notifiers.push(notifier);
        self
    }

    pub fn config(&self) -> &SignalConfig {
        &self.config
    }

    /// Starts both timers. If no junction is green yet, densities are sampled
    /// and a first rotation is forced before the first tick. Calling it while
    /// running does nothing. Must be called inside a tokio runtime.
    pub fn start(&self) {
        let mut task = lock(&self.loop_task);
        if task.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return;
        }

        let (ids, needs_first_rotation) = {
            let mut state = lock(&self.state);
            state.running = true;
            (state.scheduler.intersection_ids(), !state.scheduler.has_green())
        };
        if needs_first_rotation {
            let readings = sample_all(self.sampler.as_ref(), &ids);
            let mut state = lock(&self.state);
            for &(id, density) in &readings {
                state.scheduler.record_density(id, density);
            }
            state.scheduler.rotate();
        }

        *task = Some(tokio::spawn(drive(
            Arc::clone(&self.state),
            Arc::clone(&self.sampler),
            ids,
            self.config.tick_period(),
            self.config.density_period(),
        )));
        log::info!(
            "Signal automation started (tick {}ms, density refresh {}ms)",
            self.config.tick_period_ms,
            self.config.density_period_ms
        );
    }

    /// Disarms both timers. Idempotent; once it returns the state is frozen.
    pub fn stop(&self) {
        let mut task = lock(&self.loop_task);
        lock(&self.state).running = false;
        if let Some(handle) = task.take() {
            handle.abort();
            log::info!("Signal automation stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        lock(&self.state).running
    }

    pub fn snapshot(&self) -> RotationSnapshot {
        lock(&self.state).scheduler.snapshot()
    }

    /// Arms or disarms the violation detector timer. Idempotent.
    pub fn toggle_violation_detection(&self, enabled: bool) {
        let mut task = lock(&self.detection_task);
        lock(&self.desk).detecting = enabled;

        if enabled {
            if task.as_ref().is_some_and(|handle| !handle.is_finished()) {
                return;
            }
            *task = Some(tokio::spawn(detect_violations(
                Arc::clone(&self.state),
                Arc::clone(&self.desk),
                Arc::clone(&self.detector),
                self.notifiers.clone(),
                self.config.violation_period(),
            )));
            log::info!("Violation detection enabled");
        } else if let Some(handle) = task.take() {
            handle.abort();
            log::info!("Violation detection disabled");
        }
    }

    pub fn is_detecting(&self) -> bool {
        lock(&self.desk).detecting
    }

    /// Adds a record to the history and notifies collaborators.
    pub fn record_violation(&self, record: ViolationRecord) {
        lock(&self.desk).sink.record(record.clone());
        dispatch_detached(self.notifiers.clone(), record);
    }

    /// Recent violations, newest first.
    pub fn history(&self) -> Vec<ViolationRecord> {
        lock(&self.desk).sink.history()
    }
}

impl Drop for ControlLoop {
    fn drop(&mut self) {
        self.stop();
        self.toggle_violation_detection(false);
    }
}

fn timer(period: Duration) -> Interval {
    let mut timer = interval_at(Instant::now() + period, period);
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
    timer
}

async fn drive(
    state: Arc<Mutex<LoopState>>,
    sampler: Arc<dyn DensitySampler>,
    ids: Vec<IntersectionId>,
    tick_period: Duration,
    density_period: Duration,
) {
    let mut ticks = timer(tick_period);
    let mut refresh = timer(density_period);
    loop {
        tokio::select! {
            _ = ticks.tick() => {
                if !apply_tick(&state) {
                    break;
                }
            }
            _ = refresh.tick() => {
                let readings = sample_all(sampler.as_ref(), &ids);
                if !apply_readings(&state, &readings) {
                    break;
                }
            }
        }
    }
}

fn apply_tick(state: &Mutex<LoopState>) -> bool {
    let mut state = lock(state);
    if !state.running {
        return false;
    }
    state.scheduler.tick();
    if state.scheduler.is_rotation_due() {
        state.scheduler.rotate();
    }
    true
}

fn apply_readings(state: &Mutex<LoopState>, readings: &[(IntersectionId, u8)]) -> bool {
    let mut state = lock(state);
    if !state.running {
        return false;
    }
    for &(id, density) in readings {
        state.scheduler.record_density(id, density);
    }
    log::debug!("Density refreshed: {:?}", readings);
    true
}

/// A failed reading counts as density 0 for this cycle.
fn sample_all(sampler: &dyn DensitySampler, ids: &[IntersectionId]) -> Vec<(IntersectionId, u8)> {
    let now = Local::now();
    ids.iter()
        .map(|&id| {
            let density = sampler.sample(id, now).unwrap_or_else(|e| {
                log::warn!("{}; using density 0", e);
                0
            });
            (id, density.min(100))
        })
        .collect()
}

async fn detect_violations(
    state: Arc<Mutex<LoopState>>,
    desk: Arc<Mutex<ViolationDesk>>,
    detector: Arc<dyn ViolationDetector>,
    notifiers: Vec<Arc<dyn ViolationNotifier>>,
    period: Duration,
) {
    let mut passes = timer(period);
    loop {
        passes.tick().await;
        let Some(active) = lock(&state).scheduler.active().cloned() else {
            continue;
        };
        let Some(record) = detector.detect(&active) else {
            continue;
        };
        {
            let mut desk = lock(&desk);
            if !desk.detecting {
                break;
            }
            desk.sink.record(record.clone());
        }
        log::info!(
            "Violation at {}: vehicle {} ({})",
            record.location,
            record.vehicle_number,
            record.detail
        );
        dispatch_detached(notifiers.clone(), record);
    }
}
