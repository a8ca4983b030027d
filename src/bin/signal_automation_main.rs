use signal_automation::global_variables::VIOLATION_LOG_FILE;
use signal_automation::monitoring::admin_cli::run_cli;
use signal_automation::monitoring::notifier::CsvViolationLog;
use signal_automation::{ControlLoop, SignalConfig};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    env_logger::init();

    // Optional JSON config path as the first argument.
    let config = match std::env::args().nth(1) {
        Some(path) => match SignalConfig::from_file(&path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Cannot load {}: {}", path, e);
                std::process::exit(1);
            }
        },
        None => SignalConfig::default(),
    };

    let violation_log = CsvViolationLog::new(VIOLATION_LOG_FILE);
    let control = match ControlLoop::simulated(config) {
        Ok(control) => control.with_notifier(Arc::new(violation_log.clone())),
        Err(e) => {
            eprintln!("Signal automation error: {}", e);
            std::process::exit(1);
        }
    };

    println!("Starting signal automation...");
    control.start();
    run_cli(&control, Some(&violation_log)).await;
    control.stop();
}
