use log::{Level, LevelFilter, Log, Metadata, Record};
use rusqlite::Connection;
use std::sync::Mutex;
use tempfile::TempDir;
use tracklog::TrackDb;

struct CaptureLogger {
    records: Mutex<Vec<(Level, String)>>,
}

impl Log for CaptureLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        if let Ok(mut records) = self.records.lock() {
            records.push((record.level(), record.args().to_string()));
        }
    }

    fn flush(&self) {}
}

static LOGGER: CaptureLogger = CaptureLogger {
    records: Mutex::new(Vec::new()),
};

#[test]
fn test_wrong_archive_layout_logs_one_warning() {
    log::set_logger(&LOGGER).unwrap();
    log::set_max_level(LevelFilter::Trace);

    let dir = TempDir::new().unwrap();
    Connection::open(dir.path().join("2022.db"))
        .unwrap()
        .execute_batch("CREATE TABLE positions (timestamp INTEGER, lat TEXT, lon REAL, s2cell INTEGER)")
        .unwrap();

    let db = TrackDb::open("test", dir.path()).unwrap();
    assert_eq!(db.shard_count(), 1);

    let warnings: Vec<String> = LOGGER
        .records
        .lock()
        .unwrap()
        .iter()
        .filter(|(level, _)| *level == Level::Warn)
        .map(|(_, message)| message.clone())
        .collect();
    assert_eq!(warnings.len(), 1, "warnings: {:?}", warnings);
    assert!(warnings[0].contains("2022.db"));
    assert!(warnings[0].contains("lat TEXT"));
}
