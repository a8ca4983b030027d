use chrono::{DateTime, Local, Timelike};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;

use crate::config::SamplerConfig;
use crate::error::SignalResult;
use crate::shared_data::lock;
use crate::simulation_engine::intersections::IntersectionId;

/// Source of traffic density readings, in percent [0, 100].
///
/// The control loop calls this outside its critical section, so a real sensor
/// feed may be slow; failures are recovered by the caller as density 0.
pub trait DensitySampler: Send + Sync {
    fn sample(&self, intersection: IntersectionId, at: DateTime<Local>) -> SignalResult<u8>;
}

impl<F> DensitySampler for F
where
    F: Fn(IntersectionId, DateTime<Local>) -> SignalResult<u8> + Send + Sync,
{
    fn sample(&self, intersection: IntersectionId, at: DateTime<Local>) -> SignalResult<u8> {
        self(intersection, at)
    }
}

/// Stand-in for camera-based vehicle counting: a time-of-day baseline with
/// bounded random jitter, rounded for stable readings.
pub struct SimulatedDensitySampler {
    config: SamplerConfig,
    rng: Mutex<SmallRng>,
}

impl SimulatedDensitySampler {
    pub fn new(config: SamplerConfig) -> Self {
        Self {
            config,
            rng: Mutex::new(SmallRng::from_os_rng()),
        }
    }

    pub fn with_seed(config: SamplerConfig, seed: u64) -> Self {
        Self {
            config,
            rng: Mutex::new(SmallRng::seed_from_u64(seed)),
        }
    }

    pub fn is_rush_hour(&self, at: DateTime<Local>) -> bool {
        let hour = at.hour();
        self.config.rush_windows.iter().any(|w| w.contains(hour))
    }

    fn baseline(&self, at: DateTime<Local>) -> f64 {
        if self.is_rush_hour(at) {
            self.config.rush_baseline as f64
        } else {
            self.config.off_peak_baseline as f64
        }
    }
}

impl DensitySampler for SimulatedDensitySampler {
    fn sample(&self, _intersection: IntersectionId, at: DateTime<Local>) -> SignalResult<u8> {
        let jitter = self.config.jitter as f64;
        let variation: f64 = lock(&self.rng).random_range(-jitter..=jitter);
        let density = (self.baseline(at) + variation).clamp(0.0, 100.0);
        Ok(round_to_step(density, self.config.rounding_step))
    }
}

/// Rounds to the nearest multiple of `step`, never exceeding 100.
pub fn round_to_step(density: f64, step: u8) -> u8 {
    let step = step.max(1) as f64;
    ((density / step).round() * step).clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at_hour(hour: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 6, 12, hour, 15, 0).unwrap()
    }

    #[test]
    fn readings_stay_within_jitter_of_baseline() {
        let sampler = SimulatedDensitySampler::with_seed(SamplerConfig::default(), 7);
        for _ in 0..200 {
            let off_peak = sampler.sample(IntersectionId(1), at_hour(13)).unwrap();
            assert!((25..=45).contains(&off_peak), "off-peak reading {off_peak}");
            assert_eq!(off_peak % 5, 0);

            let rush = sampler.sample(IntersectionId(1), at_hour(9)).unwrap();
            assert!((65..=85).contains(&rush), "rush reading {rush}");
            assert_eq!(rush % 5, 0);
        }
    }

    #[test]
    fn rush_windows_are_inclusive() {
        let sampler = SimulatedDensitySampler::with_seed(SamplerConfig::default(), 1);
        assert!(sampler.is_rush_hour(at_hour(8)));
        assert!(sampler.is_rush_hour(at_hour(10)));
        assert!(sampler.is_rush_hour(at_hour(18)));
        assert!(!sampler.is_rush_hour(at_hour(11)));
        assert!(!sampler.is_rush_hour(at_hour(7)));
    }

    #[test]
    fn readings_are_clamped() {
        let config = SamplerConfig {
            rush_baseline: 100,
            off_peak_baseline: 0,
            jitter: 30,
            ..SamplerConfig::default()
        };
        let sampler = SimulatedDensitySampler::with_seed(config, 3);
        for _ in 0..100 {
            assert!(sampler.sample(IntersectionId(2), at_hour(17)).unwrap() <= 100);
            // u8 cannot go negative; clamp keeps the float from wrapping
            let low = sampler.sample(IntersectionId(2), at_hour(3)).unwrap();
            assert!(low <= 30);
        }
    }

    #[test]
    fn rounding_picks_nearest_step() {
        assert_eq!(round_to_step(42.4, 5), 40);
        assert_eq!(round_to_step(42.6, 5), 45);
        assert_eq!(round_to_step(99.0, 5), 100);
        assert_eq!(round_to_step(0.0, 5), 0);
    }

    #[test]
    fn closures_are_samplers() {
        let fixed = |_: IntersectionId, _: DateTime<Local>| -> SignalResult<u8> { Ok(55) };
        assert_eq!(fixed.sample(IntersectionId(4), at_hour(12)).unwrap(), 55);
    }
}
