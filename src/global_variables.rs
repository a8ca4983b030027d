// Loop cadence (milliseconds)
pub const DEFAULT_TICK_PERIOD_MS: u64 = 1_000;
pub const DEFAULT_DENSITY_PERIOD_MS: u64 = 2_000;
pub const DEFAULT_VIOLATION_PERIOD_MS: u64 = 5_000;

// Violation history
pub const VIOLATION_HISTORY_CAPACITY: usize = 10;
pub const DEFAULT_VIOLATION_PROBABILITY: f64 = 0.3;
pub const VIOLATION_LOG_FILE: &str = "violations.csv";

// Simulated camera readings
pub const DEFAULT_RUSH_BASELINE: u8 = 75;
pub const DEFAULT_OFF_PEAK_BASELINE: u8 = 35;
pub const DEFAULT_DENSITY_JITTER: u8 = 10;
pub const DEFAULT_ROUNDING_STEP: u8 = 5;

// Default junction set, in rotation order
pub const DEFAULT_JUNCTION_NAMES: [&str; 4] = [
    "North Junction",
    "South Junction",
    "East Junction",
    "West Junction",
];
