//! Console Logger
//!
//! Backend for the `log` facade that writes to the browser console as
//! `[TARGET] message`, e.g. `[RECONCILE] committing ...`.

use log::{Level, LevelFilter, Log, Metadata, Record};

struct ConsoleLogger {
    level: Level,
}

static LOGGER: ConsoleLogger = ConsoleLogger { level: Level::Debug };

/// `taskboard_ui::drag_session` -> `DRAG_SESSION`
fn short_target(target: &str) -> String {
    target.rsplit("::").next().unwrap_or(target).to_uppercase()
}

fn format_record(record: &Record) -> String {
    format!("[{}] {}", short_target(record.target()), record.args())
}

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format_record(record).into();
        match record.level() {
            Level::Error => web_sys::console::error_1(&line),
            Level::Warn => web_sys::console::warn_1(&line),
            Level::Info => web_sys::console::info_1(&line),
            Level::Debug | Level::Trace => web_sys::console::debug_1(&line),
        }
    }

    fn flush(&self) {}
}

/// Installs the console logger. Debug output only in debug builds.
pub fn init() {
    let max = if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(max);
    }
}
