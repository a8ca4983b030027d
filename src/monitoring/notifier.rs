use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{SignalError, SignalResult};
use crate::shared_data::ViolationRecord;
use crate::simulation_engine::intersections::IntersectionId;

/// Receives each violation after it has entered the history. Delivery is
/// fire-and-forget: errors are logged by the caller and never retried.
pub trait ViolationNotifier: Send + Sync {
    fn notify(&self, record: &ViolationRecord) -> SignalResult<()>;
}

/// Stands in for the SMS gateway by logging the messages it would send.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl ViolationNotifier for LogNotifier {
    fn notify(&self, record: &ViolationRecord) -> SignalResult<()> {
        log::info!(
            "SMS sent to police: New violation detected at {}",
            record.location
        );
        log::info!(
            "SMS sent to vehicle owner {}: E-challan generated",
            record.vehicle_number
        );
        Ok(())
    }
}

/// Appends every violation to a CSV file, writing the header once.
#[derive(Debug, Clone)]
pub struct CsvViolationLog {
    path: PathBuf,
}

impl CsvViolationLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads back every logged record, oldest first.
    pub fn read_all(&self) -> SignalResult<Vec<ViolationRecord>> {
        let file = File::open(&self.path)?;
        let mut rdr = csv::Reader::from_reader(file);
        let mut records = Vec::new();
        for result in rdr.deserialize() {
            let row: CsvRow = result?;
            records.push(row.into());
        }
        Ok(records)
    }
}

impl ViolationNotifier for CsvViolationLog {
    fn notify(&self, record: &ViolationRecord) -> SignalResult<()> {
        let file_exists = self.path.exists();
        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)?;
        let mut wtr = csv::WriterBuilder::new()
            .has_headers(!file_exists)
            .from_writer(file);
        wtr.serialize(CsvRow::from(record))?;
        wtr.flush()?;
        Ok(())
    }
}

// csv cannot serialize the nested id newtype as a header, so rows are flat.
#[derive(Debug, serde::Serialize, serde::Deserialize)]
struct CsvRow {
    timestamp: u64,
    vehicle_number: String,
    junction_id: u32,
    location: String,
    detail: String,
}

impl From<&ViolationRecord> for CsvRow {
    fn from(record: &ViolationRecord) -> Self {
        Self {
            timestamp: record.timestamp,
            vehicle_number: record.vehicle_number.clone(),
            junction_id: record.junction_id.0,
            location: record.location.clone(),
            detail: record.detail.clone(),
        }
    }
}

impl From<CsvRow> for ViolationRecord {
    fn from(row: CsvRow) -> Self {
        Self {
            vehicle_number: row.vehicle_number,
            junction_id: IntersectionId(row.junction_id),
            location: row.location,
            timestamp: row.timestamp,
            detail: row.detail,
        }
    }
}

/// Hands a record to every notifier, logging failures.
pub fn dispatch(notifiers: &[Arc<dyn ViolationNotifier>], record: &ViolationRecord) {
    for notifier in notifiers {
        if let Err(e) = notifier.notify(record) {
            log::warn!(
                "Violation notice for {} not delivered: {}",
                record.vehicle_number,
                e
            );
        }
    }
}

/// Delivers off the caller's task. Notifiers may block on file or network
/// I/O, so inside a runtime they run on the blocking pool; outside one they
/// run inline.
pub fn dispatch_detached(notifiers: Vec<Arc<dyn ViolationNotifier>>, record: ViolationRecord) {
    if notifiers.is_empty() {
        return;
    }
    let Ok(handle) = tokio::runtime::Handle::try_current() else {
        dispatch(&notifiers, &record);
        return;
    };
    let delivery = handle.spawn_blocking(move || dispatch(&notifiers, &record));
    handle.spawn(async move {
        if let Err(e) = delivery.await {
            let err = SignalError::Notification(format!("delivery task failed: {e}"));
            log::error!("{}", err);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn temp_log(name: &str) -> CsvViolationLog {
        let path = std::env::temp_dir().join(format!(
            "signal_automation_{}_{}.csv",
            name,
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);
        CsvViolationLog::new(path)
    }

    #[test]
    fn csv_log_appends_with_single_header() {
        let log = temp_log("append");
        let first = ViolationRecord::new("KA01XY1111", IntersectionId(2), "South Junction", "wrong way");
        let second = ViolationRecord::new("KA01XY2222", IntersectionId(3), "East Junction", "wrong way");
        log.notify(&first).unwrap();
        log.notify(&second).unwrap();

        let records = log.read_all().unwrap();
        assert_eq!(records, vec![first, second]);

        let text = std::fs::read_to_string(log.path()).unwrap();
        assert_eq!(text.matches("vehicle_number").count(), 1);
        let _ = std::fs::remove_file(log.path());
    }

    struct Failing;

    impl ViolationNotifier for Failing {
        fn notify(&self, _record: &ViolationRecord) -> SignalResult<()> {
            Err(SignalError::Notification("gateway down".to_string()))
        }
    }

    struct Counting(Arc<AtomicUsize>);

    impl ViolationNotifier for Counting {
        fn notify(&self, _record: &ViolationRecord) -> SignalResult<()> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[test]
    fn failing_notifier_does_not_stop_the_others() {
        let count = Arc::new(AtomicUsize::new(0));
        let notifiers: Vec<Arc<dyn ViolationNotifier>> = vec![
            Arc::new(Failing),
            Arc::new(LogNotifier),
            Arc::new(Counting(Arc::clone(&count))),
        ];
        let record = ViolationRecord::new("DL3CAB0001", IntersectionId(1), "North Junction", "");
        dispatch(&notifiers, &record);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn detached_dispatch_runs_inline_without_runtime() {
        let count = Arc::new(AtomicUsize::new(0));
        let notifiers: Vec<Arc<dyn ViolationNotifier>> =
            vec![Arc::new(Counting(Arc::clone(&count)))];
        let record = ViolationRecord::new("DL3CAB0002", IntersectionId(1), "North Junction", "");
        dispatch_detached(notifiers, record);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn detached_dispatch_delivers_on_blocking_pool() {
        let count = Arc::new(AtomicUsize::new(0));
        let notifiers: Vec<Arc<dyn ViolationNotifier>> =
            vec![Arc::new(Failing), Arc::new(Counting(Arc::clone(&count)))];
        let record = ViolationRecord::new("DL3CAB0003", IntersectionId(2), "South Junction", "");
        dispatch_detached(notifiers, record);
        for _ in 0..200 {
            if count.load(Ordering::SeqCst) == 1 {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
