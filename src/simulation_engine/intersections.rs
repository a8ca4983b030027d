use serde::{Deserialize, Serialize};
use std::fmt;

use crate::global_variables::DEFAULT_JUNCTION_NAMES;

/// Stable 1-based identifier; ascending ids define the rotation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IntersectionId(pub u32);

impl fmt::Display for IntersectionId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LightState {
    Green,
    Yellow,
    Red,
}

impl fmt::Display for LightState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let label = match self {
            LightState::Green => "GREEN",
            LightState::Yellow => "YELLOW",
            LightState::Red => "RED",
        };
        f.pad(label)
    }
}

/// Represents a signalised junction taking part in the rotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intersection {
    /// Unique identifier for the intersection.
    pub id: IntersectionId,
    /// Display label.
    pub name: String,
    /// Last sampled traffic density, percent in [0, 100].
    pub density: u8,
    /// The current signal shown to this junction's approach.
    pub light_state: LightState,
    /// Seconds until this junction's next state change.
    pub countdown: u32,
    /// Countdown observed at the last density refresh.
    pub wait_time: u32,
}

impl Intersection {
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id: IntersectionId(id),
            name: name.into(),
            density: 0,
            light_state: LightState::Red,
            countdown: 0,
            wait_time: 0,
        }
    }

    pub fn is_green(&self) -> bool {
        self.light_state == LightState::Green
    }
}

/// Builds intersections from display names, numbering them 1..=N.
pub fn create_intersections_named<S: AsRef<str>>(names: &[S]) -> Vec<Intersection> {
    names
        .iter()
        .enumerate()
        .map(|(i, name)| Intersection::new(i as u32 + 1, name.as_ref()))
        .collect()
}

/// The four-junction layout used by the automation dashboard.
pub fn create_intersections() -> Vec<Intersection> {
    create_intersections_named(&DEFAULT_JUNCTION_NAMES)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layout_is_numbered_in_order() {
        let intersections = create_intersections();
        let ids: Vec<u32> = intersections.iter().map(|i| i.id.0).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
        assert_eq!(intersections[0].name, "North Junction");
        assert!(intersections
            .iter()
            .all(|i| i.light_state == LightState::Red && i.countdown == 0));
    }
}
