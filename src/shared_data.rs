// src/shared_data.rs

use crate::simulation_engine::intersections::IntersectionId;
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

/// A single traffic rule violation (an e-challan). Never mutated once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViolationRecord {
    pub vehicle_number: String,
    pub junction_id: IntersectionId,
    pub location: String,
    pub timestamp: u64,
    pub detail: String,
}

impl ViolationRecord {
    pub fn new(
        vehicle_number: impl Into<String>,
        junction_id: IntersectionId,
        location: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            vehicle_number: vehicle_number.into(),
            junction_id,
            location: location.into(),
            timestamp: current_timestamp(),
            detail: detail.into(),
        }
    }
}

/// Seconds since the unix epoch.
pub fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Locks a mutex, recovering the data if a previous holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
