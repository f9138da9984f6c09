//! A small `log` backend that writes to stderr, keeping stdout for the report itself.

use std::io::Write;

use log::{Level, LevelFilter, Log, Metadata, Record};

use super::error::Result;

pub struct Logger {
    color: bool,
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let line = format_record(record, self.color);
        // nowhere left to report a failed write to stderr
        let _ = std::io::stderr().lock().write_all(line.as_bytes());
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn format_record(record: &Record, color: bool) -> String {
    let file = record.file().unwrap_or("?");
    let line = record.line().unwrap_or(0);
    if !color {
        return format!("[{}] {}:{} {}\n", record.level(), file, line, record.args());
    }

    let color_code = match record.level() {
        Level::Error => 31u8, // Red
        Level::Warn => 93,    // BrightYellow
        Level::Info => 34,    // Blue
        Level::Debug => 32,   // Green
        Level::Trace => 90,   // BrightBlack
    };
    format!(
        "\u{1B}[{}m[{}] {}:{} {}\u{1B}[0m\n",
        color_code,
        record.level(),
        file,
        line,
        record.args()
    )
}

/// Install the stderr logger. Colors are used only when stderr is a terminal.
pub fn init(level: LevelFilter) -> Result<()> {
    let color = unsafe { libc::isatty(libc::STDERR_FILENO) } == 1;
    log::set_boxed_logger(Box::new(Logger { color }))?;
    log::set_max_level(level);
    Ok(())
}

#[cfg(test)]
mod tests {
    use log::{Level, Record};

    use super::format_record;

    #[test]
    fn plain_record() {
        let line = format_record(
            &Record::builder()
                .args(format_args!("hello {}", 1))
                .level(Level::Info)
                .file(Some("src/main.rs"))
                .line(Some(7))
                .build(),
            false,
        );
        assert_eq!("[INFO] src/main.rs:7 hello 1\n", line);
    }

    #[test]
    fn colored_record() {
        let line = format_record(
            &Record::builder()
                .args(format_args!("bad"))
                .level(Level::Error)
                .build(),
            true,
        );
        assert_eq!("\u{1B}[31m[ERROR] ?:0 bad\u{1B}[0m\n", line);
    }
}
