// Logger de captura para testes: guarda cada linha emitida via `log`

use log::{LevelFilter, Log, Metadata, Record};
use std::sync::{Mutex, Once};

static LINES: Mutex<Vec<String>> = Mutex::new(Vec::new());
static INIT: Once = Once::new();

struct CaptureLogger;

impl Log for CaptureLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        if let Ok(mut lines) = LINES.lock() {
            lines.push(record.args().to_string());
        }
    }

    fn flush(&self) {}
}

pub fn capture_logs() {
    INIT.call_once(|| {
        let _ = log::set_logger(&CaptureLogger);
        log::set_max_level(LevelFilter::Trace);
    });
}

/// Linhas capturadas que contêm o texto (testes rodam em paralelo, filtre por algo único)
pub fn log_lines_containing(needle: &str) -> Vec<String> {
    LINES
        .lock()
        .map(|lines| lines.iter().filter(|l| l.contains(needle)).cloned().collect())
        .unwrap_or_default()
}
