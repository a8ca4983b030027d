use std::io::{self, stdin, stdout, Write};

use crate::control_system::control_loop::ControlLoop;
use crate::error::SignalResult;
use crate::monitoring::notifier::CsvViolationLog;
use crate::shared_data::ViolationRecord;
use crate::simulation_engine::intersections::IntersectionId;

fn prompt(label: &str) -> io::Result<String> {
    print!("{label}");
    stdout().flush()?;
    let mut input = String::new();
    stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

/// Reads back and prints the CSV violation log.
pub fn show_violation_log(log: &CsvViolationLog) -> SignalResult<()> {
    println!("Violation Log ({}):", log.path().display());
    for record in log.read_all()? {
        println!("{:?}", record);
    }
    Ok(())
}

fn record_manual_violation(control: &ControlLoop) -> io::Result<()> {
    let snapshot = control.snapshot();
    let vehicle_number = prompt("Enter vehicle number: ")?;
    let junction_input = prompt("Enter junction ID: ")?;
    let Some(junction) = junction_input
        .parse::<u32>()
        .ok()
        .and_then(|id| snapshot.intersections.iter().find(|i| i.id == IntersectionId(id)))
    else {
        println!("Unknown junction {junction_input}");
        return Ok(());
    };
    let detail = prompt("Enter violation details: ")?;
    control.record_violation(ViolationRecord::new(
        vehicle_number,
        junction.id,
        junction.name.clone(),
        detail,
    ));
    println!("E-challan recorded for junction {}", junction.name);
    Ok(())
}

/// Provides a simple CLI for operators of the signal automation.
pub async fn run_cli(control: &ControlLoop, violation_log: Option<&CsvViolationLog>) {
    loop {
        println!("\nSignal Automation Admin CLI");
        println!("1. Display Signal Status");
        println!("2. Start Automation");
        println!("3. Stop Automation");
        println!(
            "4. {} Rule Violation Detection",
            if control.is_detecting() { "Disable" } else { "Enable" }
        );
        println!("5. Record Violation Manually");
        println!("6. Display Recent Violations");
        println!("7. Display Violation Log");
        println!("8. Exit");
        let choice = match prompt("Enter your choice: ") {
            Ok(input) => input.parse::<u32>().unwrap_or(0),
            Err(e) => {
                eprintln!("Error reading input: {}", e);
                break;
            }
        };
        match choice {
            1 => print!("{}", control.snapshot()),
            2 => control.start(),
            3 => control.stop(),
            4 => control.toggle_violation_detection(!control.is_detecting()),
            5 => {
                if let Err(e) = record_manual_violation(control) {
                    eprintln!("Error recording violation: {}", e);
                }
            }
            6 => {
                let history = control.history();
                if history.is_empty() {
                    println!("No violations recorded.");
                }
                for record in history {
                    println!(
                        "[{}] {} at {}: {}",
                        record.timestamp, record.vehicle_number, record.location, record.detail
                    );
                }
            }
            7 => match violation_log {
                Some(log) => {
                    if let Err(e) = show_violation_log(log) {
                        eprintln!("Error displaying violation log: {}", e);
                    }
                }
                None => println!("Violation log is not enabled."),
            },
            8 => {
                println!("Exiting CLI.");
                break;
            }
            _ => {
                println!("Invalid choice. Try again.");
            }
        }
    }
}
