pub mod admin_cli;
pub mod notifier;
pub mod violation_detector;
pub mod violation_sink;
