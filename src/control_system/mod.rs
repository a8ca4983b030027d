pub mod control_loop;
pub mod duration_policy;
pub mod rotation_scheduler;
