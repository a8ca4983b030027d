// src/config.rs

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{SignalError, SignalResult};
use crate::global_variables::{
    DEFAULT_DENSITY_JITTER, DEFAULT_DENSITY_PERIOD_MS, DEFAULT_JUNCTION_NAMES,
    DEFAULT_OFF_PEAK_BASELINE, DEFAULT_ROUNDING_STEP, DEFAULT_RUSH_BASELINE,
    DEFAULT_TICK_PERIOD_MS, DEFAULT_VIOLATION_PERIOD_MS, DEFAULT_VIOLATION_PROBABILITY,
};

/// Inclusive range of local hours treated as rush hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RushWindow {
    pub start_hour: u32,
    pub end_hour: u32,
}

impl RushWindow {
    pub fn contains(&self, hour: u32) -> bool {
        (self.start_hour..=self.end_hour).contains(&hour)
    }
}

/// One row of the density → green time table. `max_density` is inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationBucket {
    pub max_density: u8,
    pub green_secs: u32,
}

/// Parameters of the simulated camera sampler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    pub rush_windows: Vec<RushWindow>,
    pub rush_baseline: u8,
    pub off_peak_baseline: u8,
    /// Readings vary uniformly by up to ± this many points.
    pub jitter: u8,
    /// Readings are rounded to the nearest multiple of this.
    pub rounding_step: u8,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            rush_windows: vec![
                RushWindow {
                    start_hour: 8,
                    end_hour: 10,
                },
                RushWindow {
                    start_hour: 16,
                    end_hour: 18,
                },
            ],
            rush_baseline: DEFAULT_RUSH_BASELINE,
            off_peak_baseline: DEFAULT_OFF_PEAK_BASELINE,
            jitter: DEFAULT_DENSITY_JITTER,
            rounding_step: DEFAULT_ROUNDING_STEP,
        }
    }
}

pub fn default_duration_buckets() -> Vec<DurationBucket> {
    [(10, 10), (30, 20), (50, 30), (75, 40), (100, 60)]
        .into_iter()
        .map(|(max_density, green_secs)| DurationBucket {
            max_density,
            green_secs,
        })
        .collect()
}

/// Runtime configuration for the signal automation loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalConfig {
    /// Junction labels in rotation order. N = number of entries.
    pub intersection_names: Vec<String>,
    /// Countdown tick period.
    pub tick_period_ms: u64,
    /// Density refresh period.
    pub density_period_ms: u64,
    pub sampler: SamplerConfig,
    pub duration_buckets: Vec<DurationBucket>,
    /// Violation detector period while detection is enabled.
    pub violation_period_ms: u64,
    /// Chance that one detector pass reports a violation.
    pub violation_probability: f64,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            intersection_names: DEFAULT_JUNCTION_NAMES.iter().map(|n| n.to_string()).collect(),
            tick_period_ms: DEFAULT_TICK_PERIOD_MS,
            density_period_ms: DEFAULT_DENSITY_PERIOD_MS,
            sampler: SamplerConfig::default(),
            duration_buckets: default_duration_buckets(),
            violation_period_ms: DEFAULT_VIOLATION_PERIOD_MS,
            violation_probability: DEFAULT_VIOLATION_PROBABILITY,
        }
    }
}

impl SignalConfig {
    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_period_ms)
    }

    pub fn density_period(&self) -> Duration {
        Duration::from_millis(self.density_period_ms)
    }

    pub fn violation_period(&self) -> Duration {
        Duration::from_millis(self.violation_period_ms)
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> SignalResult<()> {
        if self.intersection_names.len() < 2 {
            return Err(SignalError::InvalidConfiguration(format!(
                "at least 2 intersections are required, got {}",
                self.intersection_names.len()
            )));
        }
        if self.tick_period_ms == 0 || self.density_period_ms == 0 || self.violation_period_ms == 0
        {
            return Err(SignalError::InvalidConfiguration(
                "tick, density and violation periods must be > 0".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.violation_probability) {
            return Err(SignalError::InvalidConfiguration(format!(
                "violation_probability must be in [0, 1], got {}",
                self.violation_probability
            )));
        }
        validate_buckets(&self.duration_buckets)?;
        let furthest = self.intersection_names.len() as u32 - 1;
        if let Some(longest) = self.duration_buckets.last() {
            if longest.green_secs.checked_mul(furthest).is_none() {
                return Err(SignalError::InvalidConfiguration(format!(
                    "green time {}s is too long for {} intersections",
                    longest.green_secs,
                    self.intersection_names.len()
                )));
            }
        }
        self.sampler.validate()
    }

    /// Load from JSON string.
    pub fn from_json(json: &str) -> SignalResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| SignalError::InvalidConfiguration(format!("JSON parse error: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> SignalResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            SignalError::InvalidConfiguration(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json(&json)
    }
}

impl SamplerConfig {
    pub fn validate(&self) -> SignalResult<()> {
        for window in &self.rush_windows {
            if window.end_hour > 23 || window.start_hour > window.end_hour {
                return Err(SignalError::InvalidConfiguration(format!(
                    "rush window {}-{} is not a valid hour range",
                    window.start_hour, window.end_hour
                )));
            }
        }
        if self.rush_baseline > 100 || self.off_peak_baseline > 100 {
            return Err(SignalError::InvalidConfiguration(
                "density baselines must be in [0, 100]".to_string(),
            ));
        }
        if self.rounding_step == 0 {
            return Err(SignalError::InvalidConfiguration(
                "rounding_step must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Bucket bounds must strictly increase, reach 100, and map to non-decreasing,
/// non-zero green times.
pub fn validate_buckets(buckets: &[DurationBucket]) -> SignalResult<()> {
    let Some(last) = buckets.last() else {
        return Err(SignalError::InvalidConfiguration(
            "duration bucket table is empty".to_string(),
        ));
    };
    if last.max_density < 100 {
        return Err(SignalError::InvalidConfiguration(format!(
            "duration buckets must cover density 100, last bound is {}",
            last.max_density
        )));
    }
    if buckets.iter().any(|b| b.green_secs == 0) {
        return Err(SignalError::InvalidConfiguration(
            "green durations must be > 0".to_string(),
        ));
    }
    for pair in buckets.windows(2) {
        if pair[1].max_density <= pair[0].max_density {
            return Err(SignalError::InvalidConfiguration(format!(
                "bucket bounds must strictly increase ({} then {})",
                pair[0].max_density, pair[1].max_density
            )));
        }
        if pair[1].green_secs < pair[0].green_secs {
            return Err(SignalError::InvalidConfiguration(format!(
                "green durations must not decrease ({}s then {}s)",
                pair[0].green_secs, pair[1].green_secs
            )));
        }
    }
    Ok(())
}
