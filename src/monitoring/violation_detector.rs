use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;

use crate::shared_data::{lock, ViolationRecord};
use crate::simulation_engine::intersections::Intersection;

/// Looks at one junction and reports a violation if it sees one.
pub trait ViolationDetector: Send + Sync {
    fn detect(&self, junction: &Intersection) -> Option<ViolationRecord>;
}

const STATE_CODES: [&str; 6] = ["MH", "KA", "DL", "TN", "GJ", "UP"];

/// Simulated wrong-way detection: each pass flags a random vehicle with a
/// fixed probability.
pub struct SimulatedWrongWayDetector {
    probability: f64,
    rng: Mutex<SmallRng>,
}

impl SimulatedWrongWayDetector {
    pub fn new(probability: f64) -> Self {
        Self {
            probability: probability.clamp(0.0, 1.0),
            rng: Mutex::new(SmallRng::from_os_rng()),
        }
    }

    pub fn with_seed(probability: f64, seed: u64) -> Self {
        Self {
            probability: probability.clamp(0.0, 1.0),
            rng: Mutex::new(SmallRng::seed_from_u64(seed)),
        }
    }
}

/// Registration numbers look like `MH12AB1234`.
fn random_vehicle_number(rng: &mut SmallRng) -> String {
    let state = STATE_CODES[rng.random_range(0..STATE_CODES.len())];
    let district: u8 = rng.random_range(1..=99);
    let series: String = (0..2)
        .map(|_| char::from(rng.random_range(b'A'..=b'Z')))
        .collect();
    let number: u16 = rng.random_range(1..=9999);
    format!("{state}{district:02}{series}{number:04}")
}

impl ViolationDetector for SimulatedWrongWayDetector {
    fn detect(&self, junction: &Intersection) -> Option<ViolationRecord> {
        let mut rng = lock(&self.rng);
        if !rng.random_bool(self.probability) {
            return None;
        }
        let vehicle_number = random_vehicle_number(&mut rng);
        Some(ViolationRecord::new(
            vehicle_number,
            junction.id,
            junction.name.clone(),
            format!(
                "Wrong-way driving while signal was {}",
                junction.light_state
            ),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn certain_detector_always_reports() {
        let detector = SimulatedWrongWayDetector::with_seed(1.0, 11);
        let junction = Intersection::new(3, "East Junction");
        for _ in 0..20 {
            let record = detector.detect(&junction).unwrap();
            assert_eq!(record.junction_id, junction.id);
            assert_eq!(record.location, "East Junction");
            assert_eq!(record.vehicle_number.len(), 10);
            assert!(STATE_CODES.contains(&&record.vehicle_number[..2]));
        }
    }

    #[test]
    fn silent_detector_never_reports() {
        let detector = SimulatedWrongWayDetector::with_seed(0.0, 11);
        let junction = Intersection::new(1, "North Junction");
        assert!((0..50).all(|_| detector.detect(&junction).is_none()));
    }
}
