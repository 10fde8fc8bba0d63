use chrono::{DateTime, Local};
use log::{Level, LevelFilter, Metadata, Record};
use std::io::Write;

pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub level: Level,
    pub target: String,
    pub message: String,
}

impl LogEntry {
    fn format(&self, with_target: bool) -> String {
        let time = self.timestamp.format("%H:%M:%S");
        match (self.level, with_target) {
            (_, true) => format!("{} {:<5} {}: {}", time, self.level, self.target, self.message),
            (Level::Info, false) => self.message.clone(),
            (_, false) => format!("{}: {}", self.level.as_str().to_lowercase(), self.message),
        }
    }
}

/// Logger writing to stderr. Info messages are printed bare; verbose mode adds
/// timestamps and targets to every line.
pub struct ConsoleLogger {
    max_level: LevelFilter,
}

impl ConsoleLogger {
    pub fn new(verbose: bool) -> Self {
        Self {
            max_level: if verbose {
                LevelFilter::Debug
            } else {
                LevelFilter::Info
            },
        }
    }

    pub fn init(self) -> Result<(), log::SetLoggerError> {
        let max_level = self.max_level;
        log::set_boxed_logger(Box::new(self))?;
        log::set_max_level(max_level);
        Ok(())
    }

    fn verbose(&self) -> bool {
        self.max_level >= LevelFilter::Debug
    }
}

impl log::Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.max_level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let entry = LogEntry {
                timestamp: Local::now(),
                level: record.level(),
                target: record.target().to_string(),
                message: format!("{}", record.args()),
            };

            let mut stderr = std::io::stderr().lock();
            let _ = writeln!(stderr, "{}", entry.format(self.verbose()));
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}
