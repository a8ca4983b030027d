pub mod config;
pub mod control_system;
pub mod error;
pub mod global_variables;
pub mod monitoring;
pub mod shared_data;
pub mod simulation_engine;

pub use config::SignalConfig;
pub use control_system::control_loop::ControlLoop;
pub use control_system::duration_policy::DurationPolicy;
pub use control_system::rotation_scheduler::{RotationScheduler, RotationSnapshot};
pub use error::{SignalError, SignalResult};
pub use shared_data::ViolationRecord;
