use serde::Serialize;
use std::fmt;

use crate::control_system::duration_policy::DurationPolicy;
use crate::error::{SignalError, SignalResult};
use crate::simulation_engine::intersections::{Intersection, IntersectionId, LightState};

/// Owns the rotation state: which junction has right-of-way and every
/// junction's countdown. Only the control loop mutates it.
#[derive(Debug, Clone)]
pub struct RotationScheduler {
    intersections: Vec<Intersection>,
    active_index: Option<usize>,
    policy: DurationPolicy,
}

/// Read-only copy of the rotation state for renderers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RotationSnapshot {
    pub intersections: Vec<Intersection>,
    pub active_index: Option<usize>,
}

impl RotationScheduler {
    /// All signals start RED with no active junction. A `rotate()` must follow
    /// before the first tick.
    pub fn initialize(
        mut intersections: Vec<Intersection>,
        policy: DurationPolicy,
    ) -> SignalResult<Self> {
        if intersections.len() < 2 {
            return Err(SignalError::InvalidConfiguration(format!(
                "rotation needs at least 2 intersections, got {}",
                intersections.len()
            )));
        }
        for intersection in intersections.iter_mut() {
            intersection.light_state = LightState::Red;
            intersection.countdown = 0;
        }
        Ok(Self {
            intersections,
            active_index: None,
            policy,
        })
    }

    pub fn len(&self) -> usize {
        self.intersections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intersections.is_empty()
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active_index
    }

    pub fn active(&self) -> Option<&Intersection> {
        self.active_index.map(|i| &self.intersections[i])
    }

    pub fn intersection_ids(&self) -> Vec<IntersectionId> {
        self.intersections.iter().map(|i| i.id).collect()
    }

    pub fn has_green(&self) -> bool {
        self.intersections.iter().any(Intersection::is_green)
    }

    /// True before the first rotation and whenever the active green has run out.
    pub fn is_rotation_due(&self) -> bool {
        self.active().map_or(true, |active| active.countdown == 0)
    }

    /// Stores a fresh density reading and the countdown observed alongside it.
    /// Countdowns are left untouched; the next rotation consumes the reading.
    pub fn record_density(&mut self, id: IntersectionId, density: u8) {
        if let Some(intersection) = self.intersections.iter_mut().find(|i| i.id == id) {
            intersection.density = density.min(100);
            intersection.wait_time = intersection.countdown;
        }
    }

    /// Hands right-of-way to the next junction in order.
    ///
    /// The new green lasts as long as its latest density dictates, and every
    /// waiting junction's countdown is that same green time multiplied by its
    /// distance from the new green. The junction after the new green is shown
    /// YELLOW as a pre-green warning.
    ///
    /// Returns false (and does nothing) if the active green has not run out.
    pub fn rotate(&mut self) -> bool {
        let due = self.is_rotation_due();
        debug_assert!(
            due,
            "rotate called while the active green still has {}s left",
            self.active().map_or(0, |a| a.countdown)
        );
        if !due {
            log::warn!("Ignoring out-of-turn rotation request");
            return false;
        }

        let n = self.intersections.len();
        let next_index = self.active_index.map_or(0, |i| (i + 1) % n);
        let green_time = self
            .policy
            .green_duration(self.intersections[next_index].density);

        for (i, intersection) in self.intersections.iter_mut().enumerate() {
            if i == next_index {
                intersection.light_state = LightState::Green;
                intersection.countdown = green_time;
            } else {
                let distance = (n + i - next_index) % n;
                intersection.light_state = LightState::Red;
                intersection.countdown = green_time.saturating_mul(distance as u32);
            }
        }
        self.intersections[(next_index + 1) % n].light_state = LightState::Yellow;
        self.active_index = Some(next_index);

        let active = &self.intersections[next_index];
        log::info!(
            "{} is GREEN for {}s (density {}%)",
            active.name,
            green_time,
            active.density
        );
        true
    }

    /// One countdown step for every junction, floored at zero. Never rotates.
    pub fn tick(&mut self) {
        for intersection in self.intersections.iter_mut() {
            intersection.countdown = intersection.countdown.saturating_sub(1);
        }
    }

    pub fn snapshot(&self) -> RotationSnapshot {
        RotationSnapshot {
            intersections: self.intersections.clone(),
            active_index: self.active_index,
        }
    }
}

impl RotationSnapshot {
    pub fn active(&self) -> Option<&Intersection> {
        self.active_index.map(|i| &self.intersections[i])
    }

    pub fn count_in_state(&self, state: LightState) -> usize {
        self.intersections
            .iter()
            .filter(|i| i.light_state == state)
            .count()
    }
}

impl fmt::Display for RotationSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(
            f,
            "{:<4} {:<20} {:<7} {:>9} {:>8} {:>6}",
            "ID", "Junction", "Signal", "Countdown", "Density", "Wait"
        )?;
        for i in &self.intersections {
            writeln!(
                f,
                "{:<4} {:<20} {:<7} {:>8}s {:>7}% {:>5}s",
                i.id.0, i.name, i.light_state, i.countdown, i.density, i.wait_time
            )?;
        }
        Ok(())
    }
}
