use crate::config::{default_duration_buckets, validate_buckets, DurationBucket};
use crate::error::SignalResult;

/// Maps a density reading to a green phase length using a bucket table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DurationPolicy {
    buckets: Vec<DurationBucket>,
}

impl Default for DurationPolicy {
    fn default() -> Self {
        Self {
            buckets: default_duration_buckets(),
        }
    }
}

impl DurationPolicy {
    /// Builds a policy from a custom table, rejecting malformed ones.
    pub fn new(buckets: Vec<DurationBucket>) -> SignalResult<Self> {
        validate_buckets(&buckets)?;
        Ok(Self { buckets })
    }

    pub fn buckets(&self) -> &[DurationBucket] {
        &self.buckets
    }

    /// Green time in seconds. Upper bounds are inclusive; densities above 100
    /// are treated as 100.
    pub fn green_duration(&self, density: u8) -> u32 {
        let density = density.min(100);
        self.buckets
            .iter()
            .find(|bucket| density <= bucket.max_density)
            .or(self.buckets.last())
            .map(|bucket| bucket.green_secs)
            .unwrap_or(0)
    }
}
