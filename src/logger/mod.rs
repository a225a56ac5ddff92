// Copyright 2024 FastLabs Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The leveled logger.

use std::fmt;
use std::fmt::Write as _;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::RwLock;
use std::sync::atomic::AtomicU8;
use std::sync::atomic::Ordering;

use jiff::Timestamp;
use jiff::tz::TimeZone;

use crate::Error;
use crate::Level;
use crate::append::Append;
use crate::trap::Trap;

mod builder;
mod format;
pub(crate) mod global;

pub use self::builder::Builder;
pub use self::format::LineFormat;

/// The default timestamp format: ISO 8601 in UTC with millisecond precision.
pub const DEFAULT_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S.%3fZ";

/// A syslog-leveled logger writing rendered lines to an [`Append`] output.
///
/// Every line is rendered completely before it is written, and writes are serialized by a lock
/// around the output, so lines from concurrent callers never interleave.
///
/// ```
/// use reqlog::Level;
/// use reqlog::Logger;
/// use reqlog::append::Buffer;
///
/// let buf = Buffer::default();
/// let logger = Logger::new(buf.clone());
/// logger.set_level(Level::Notice);
///
/// logger.info("dropped");
/// logger.warning("kept");
/// assert!(buf.contents().ends_with(" WARNING kept\n"));
/// ```
pub struct Logger {
    level: AtomicU8,
    output: Mutex<Box<dyn Append>>,
    time_format: String,
    timezone: TimeZone,
    line_format: LineFormat,
    trap: Box<dyn Trap>,
    exit: RwLock<fn()>,
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("level", &self.level())
            .field("time_format", &self.time_format)
            .field("line_format", &self.line_format)
            .finish_non_exhaustive()
    }
}

impl Logger {
    /// Create a logger writing to `output` with the default settings: threshold
    /// [`Level::Debug`], [`DEFAULT_TIME_FORMAT`] in UTC and the `"{time} {level} {message}"`
    /// line format.
    pub fn new(output: impl Into<Box<dyn Append>>) -> Logger {
        Builder::new().output(output).assemble()
    }

    /// Create a [`Builder`] to configure a logger.
    pub fn builder() -> Builder {
        Builder::new()
    }

    /// The current threshold.
    pub fn level(&self) -> Level {
        Level::ALL[usize::from(self.level.load(Ordering::Relaxed))]
    }

    /// Replace the threshold.
    ///
    /// Accepts a [`Level`] or its numeric value.
    ///
    /// # Panics
    ///
    /// Panics if `level` is not a valid level, e.g. `8u8`.
    pub fn set_level<L>(&self, level: L)
    where
        L: TryInto<Level>,
        L::Error: fmt::Display,
    {
        let level = match level.try_into() {
            Ok(level) => level,
            Err(err) => panic!("{err}"),
        };
        self.level.store(level.value(), Ordering::Relaxed);
    }

    /// Whether a message at `level` passes the threshold.
    pub fn enabled(&self, level: Level) -> bool {
        level <= self.level()
    }

    /// Replace the output, returning the previous one.
    pub fn set_output(&self, output: impl Into<Box<dyn Append>>) -> Box<dyn Append> {
        std::mem::replace(&mut *self.sink(), output.into())
    }

    /// Replace the function [`fatal`](Logger::fatal) calls after logging.
    ///
    /// Default to exiting the process with status `1`.
    pub fn set_exit(&self, exit: fn()) {
        *self.exit.write().unwrap_or_else(|e| e.into_inner()) = exit;
    }

    /// Write a line for `message` at `level` observed at `time`, if `level` passes the
    /// threshold.
    ///
    /// # Errors
    ///
    /// Return an error if the timestamp cannot be formatted or the output fails.
    pub fn output(&self, time: Timestamp, level: Level, message: &str) -> Result<(), Error> {
        if !self.enabled(level) {
            return Ok(());
        }
        self.write_line(time, level, &message)
    }

    /// Log `message` at `level`.
    ///
    /// Nothing is formatted when `level` does not pass the threshold.
    pub fn log(&self, level: Level, message: impl fmt::Display) {
        if self.enabled(level) {
            self.write_line_or_trap(level, &message);
        }
    }

    /// Log preformatted arguments at `level`, usually built by the [`info!`](crate::info)
    /// family of macros.
    pub fn logf(&self, level: Level, args: fmt::Arguments<'_>) {
        if self.enabled(level) {
            self.write_line_or_trap(level, &args);
        }
    }

    /// Log at [`Level::Emergency`].
    pub fn emerg(&self, message: impl fmt::Display) {
        self.log(Level::Emergency, message)
    }

    /// Log at [`Level::Alert`].
    pub fn alert(&self, message: impl fmt::Display) {
        self.log(Level::Alert, message)
    }

    /// Log at [`Level::Critical`].
    pub fn crit(&self, message: impl fmt::Display) {
        self.log(Level::Critical, message)
    }

    /// Log at [`Level::Error`].
    pub fn err(&self, message: impl fmt::Display) {
        self.log(Level::Error, message)
    }

    /// Log at [`Level::Warning`].
    pub fn warning(&self, message: impl fmt::Display) {
        self.log(Level::Warning, message)
    }

    /// Log at [`Level::Notice`].
    pub fn notice(&self, message: impl fmt::Display) {
        self.log(Level::Notice, message)
    }

    /// Log at [`Level::Info`].
    pub fn info(&self, message: impl fmt::Display) {
        self.log(Level::Info, message)
    }

    /// Log at [`Level::Debug`].
    pub fn debug(&self, message: impl fmt::Display) {
        self.log(Level::Debug, message)
    }

    /// Log `message` at [`Level::Emergency`] regardless of the threshold, then panic with the
    /// same message.
    pub fn panic(&self, message: impl fmt::Display) -> ! {
        let message = message.to_string();
        self.write_line_or_trap(Level::Emergency, &message);
        panic!("{message}");
    }

    /// Log `message` at [`Level::Emergency`], then call the exit function.
    ///
    /// See [`set_exit`](Logger::set_exit).
    pub fn fatal(&self, message: impl fmt::Display) {
        self.log(Level::Emergency, message);
        let exit = *self.exit.read().unwrap_or_else(|e| e.into_inner());
        exit();
    }

    /// Write `message` to the output as is: no level, no timestamp, no newline.
    ///
    /// Not subject to the threshold.
    pub fn print(&self, message: impl fmt::Display) {
        self.write_raw_or_trap(format_args!("{message}"));
    }

    /// Write formatted arguments to the output as is.
    ///
    /// Not subject to the threshold.
    pub fn printf(&self, args: fmt::Arguments<'_>) {
        self.write_raw_or_trap(args);
    }

    /// Write `message` followed by a newline to the output.
    ///
    /// Not subject to the threshold.
    pub fn println(&self, message: impl fmt::Display) {
        self.write_raw_or_trap(format_args!("{message}\n"));
    }

    /// Flush the output.
    pub fn flush(&self) {
        if let Err(err) = self.sink().flush() {
            self.trap.trap(&err);
        }
    }

    /// Hand an error to the trap of this logger.
    ///
    /// For callers of [`output`](Logger::output) that cannot return the error themselves.
    pub fn trap(&self, err: &Error) {
        self.trap.trap(err);
    }

    fn sink(&self) -> MutexGuard<'_, Box<dyn Append>> {
        self.output.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn write_line_or_trap(&self, level: Level, message: &dyn fmt::Display) {
        if let Err(err) = self.write_line(Timestamp::now(), level, message) {
            self.trap.trap(&err.with_context("level", level));
        }
    }

    fn write_raw_or_trap(&self, args: fmt::Arguments<'_>) {
        let mut text = String::new();
        let result = text
            .write_fmt(args)
            .map_err(Error::from_fmt_error)
            .and_then(|()| self.sink().append(text.as_bytes()));
        if let Err(err) = result {
            self.trap.trap(&err);
        }
    }

    fn write_line(
        &self,
        time: Timestamp,
        level: Level,
        message: &dyn fmt::Display,
    ) -> Result<(), Error> {
        let time = self.format_time(time)?;
        let mut line = String::new();
        self.line_format
            .render(&mut line, &time, level, message)
            .map_err(Error::from_fmt_error)?;
        line.push('\n');
        self.sink().append(line.as_bytes())
    }

    fn format_time(&self, time: Timestamp) -> Result<String, Error> {
        format_time(&self.time_format, &self.timezone, time)
    }
}

fn format_time(format: &str, timezone: &TimeZone, time: Timestamp) -> Result<String, Error> {
    let zoned = time.to_zoned(timezone.clone());
    jiff::fmt::strtime::format(format, &zoned).map_err(|err| {
        Error::new("failed to format timestamp")
            .with_context("time_format", format)
            .with_source(err)
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;

    use super::*;
    use crate::append::Buffer;

    fn logger() -> (Logger, Buffer) {
        let buf = Buffer::default();
        (Logger::new(buf.clone()), buf)
    }

    fn assert_line(line: &str, tag: &str, message: &str) {
        let (time, rest) = line.split_at(24);
        assert!(
            time.parse::<Timestamp>().is_ok(),
            "bad timestamp in {line:?}"
        );
        assert!(time.ends_with('Z'), "timestamp not in UTC: {line:?}");
        assert_eq!(rest, format!(" {tag} {message}\n"));
    }

    #[test]
    fn default_settings() {
        let (logger, _) = logger();
        assert_eq!(logger.level(), Level::Debug);
        assert_eq!(logger.time_format, DEFAULT_TIME_FORMAT);
        assert_eq!(logger.line_format, LineFormat::default());
    }

    #[test]
    fn every_level_writes_its_tag() {
        let (logger, buf) = logger();
        let calls: [(fn(&Logger, &str), &str); 8] = [
            (|l, m| l.emerg(m), "EMERG"),
            (|l, m| l.alert(m), "ALERT"),
            (|l, m| l.crit(m), "CRIT"),
            (|l, m| l.err(m), "ERR"),
            (|l, m| l.warning(m), "WARNING"),
            (|l, m| l.notice(m), "NOTICE"),
            (|l, m| l.info(m), "INFO"),
            (|l, m| l.debug(m), "DEBUG"),
        ];
        for (call, tag) in calls {
            call(&logger, "Hello");
            assert_line(&buf.take(), tag, "Hello");
        }
    }

    #[test]
    fn gating_follows_threshold() {
        let (logger, buf) = logger();
        for threshold in Level::ALL {
            logger.set_level(threshold);
            for level in Level::ALL {
                logger.log(level, "m");
                assert_eq!(
                    !buf.take().is_empty(),
                    level <= threshold,
                    "level {level} at threshold {threshold}"
                );
            }
        }
    }

    #[test]
    fn gated_messages_are_not_formatted() {
        struct Counting<'a>(&'a AtomicUsize);

        impl fmt::Display for Counting<'_> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fetch_add(1, Ordering::SeqCst);
                f.write_str("counted")
            }
        }

        let (logger, buf) = logger();
        let count = AtomicUsize::new(0);
        logger.set_level(Level::Notice);
        logger.info(Counting(&count));
        logger.logf(Level::Debug, format_args!("{}", Counting(&count)));
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert!(buf.is_empty());

        logger.warning(Counting(&count));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn set_level_accepts_numbers() {
        let (logger, _) = logger();
        logger.set_level(5u8);
        assert_eq!(logger.level(), Level::Notice);
    }

    #[test]
    #[should_panic(expected = "invalid log level: 8")]
    fn set_level_rejects_out_of_range() {
        let (logger, _) = logger();
        logger.set_level(8u8);
    }

    #[test]
    fn print_family_is_raw() {
        let (logger, buf) = logger();
        logger.set_level(Level::Emergency);

        logger.print("Hello");
        assert_eq!(buf.take(), "Hello");
        logger.printf(format_args!(":{}", "Hello"));
        assert_eq!(buf.take(), ":Hello");
        logger.println("Hello");
        assert_eq!(buf.take(), "Hello\n");
    }

    #[test]
    fn panic_logs_regardless_of_threshold() {
        let (logger, buf) = logger();
        logger.set_level(Level::Emergency);

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            logger.panic("Hello");
        }));
        let payload = result.unwrap_err();
        assert_eq!(payload.downcast_ref::<String>().unwrap(), "Hello");
        assert_line(&buf.take(), "EMERG", "Hello");
    }

    #[test]
    fn fatal_logs_then_exits() {
        static EXITS: AtomicUsize = AtomicUsize::new(0);

        let (logger, buf) = logger();
        logger.set_exit(|| {
            EXITS.fetch_add(1, Ordering::SeqCst);
        });
        logger.fatal("Hello");
        assert_eq!(EXITS.load(Ordering::SeqCst), 1);
        assert_line(&buf.take(), "EMERG", "Hello");
    }

    #[test]
    fn output_uses_given_time() {
        let (logger, buf) = logger();
        let time: Timestamp = "2024-08-11T22:44:57.172105Z".parse().unwrap();
        logger.output(time, Level::Info, "{\"a\":1}").unwrap();
        assert_eq!(buf.take(), "2024-08-11T22:44:57.172Z INFO {\"a\":1}\n");

        logger.set_level(Level::Warning);
        logger.output(time, Level::Info, "dropped").unwrap();
        assert!(buf.is_empty());
    }

    #[test]
    fn set_output_swaps_sink() {
        let (logger, first) = logger();
        let second = Buffer::default();
        logger.set_output(second.clone());
        logger.print("x");
        assert!(first.is_empty());
        assert_eq!(second.contents(), "x");
    }

    #[test]
    fn concurrent_lines_never_interleave() {
        let buf = Buffer::default();
        let logger = Arc::new(Logger::new(buf.clone()));

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let logger = logger.clone();
                std::thread::spawn(move || {
                    for i in 0..200 {
                        logger.info(format_args!("thread-{t} line-{i} {}", "x".repeat(64)));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let lines = buf.lines();
        assert_eq!(lines.len(), 8 * 200);
        for line in lines {
            let (_, rest) = line.split_at(24);
            assert!(rest.starts_with(" INFO thread-"), "{line:?}");
            assert!(rest.ends_with(&"x".repeat(64)), "{line:?}");
        }
    }

    #[test]
    fn output_errors_go_to_the_trap() {
        #[derive(Debug)]
        struct Failing;

        impl Append for Failing {
            fn append(&self, _: &[u8]) -> Result<(), Error> {
                Err(Error::new("output closed"))
            }
        }

        #[derive(Debug, Default)]
        struct Recording(Arc<Mutex<Vec<String>>>);

        impl Trap for Recording {
            fn trap(&self, err: &Error) {
                self.0.lock().unwrap().push(err.to_string());
            }
        }

        let errors = Arc::new(Mutex::new(vec![]));
        let logger = Logger::builder()
            .output(Failing)
            .trap(Recording(errors.clone()))
            .build()
            .unwrap();
        logger.err("Hello");
        assert_eq!(
            errors.lock().unwrap().as_slice(),
            ["output closed, context: { level: ERR }"]
        );
    }
}
