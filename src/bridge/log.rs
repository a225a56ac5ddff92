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

//! A bridge to forward logs from the `log` crate to the default [`Logger`].
//!
//! | `log`   | reqlog               |
//! |---------|----------------------|
//! | `Error` | [`Level::Error`]     |
//! | `Warn`  | [`Level::Warning`]   |
//! | `Info`  | [`Level::Info`]      |
//! | `Debug` | [`Level::Debug`]     |
//! | `Trace` | [`Level::Debug`]     |

use crate::Level;
use crate::Logger;
use crate::default_logger;

/// Map a `log` level to a syslog level.
pub fn level_of(level: log::Level) -> Level {
    match level {
        log::Level::Error => Level::Error,
        log::Level::Warn => Level::Warning,
        log::Level::Info => Level::Info,
        log::Level::Debug | log::Level::Trace => Level::Debug,
    }
}

fn forward(logger: &Logger, record: &log::Record) {
    logger.logf(level_of(record.level()), *record.args());
}

struct LogCrateLogger(());

impl log::Log for LogCrateLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        default_logger().enabled(level_of(metadata.level()))
    }

    fn log(&self, record: &log::Record) {
        forward(default_logger(), record);
    }

    fn flush(&self) {
        default_logger().flush();
    }
}

/// Set up the log crate global logger.
///
/// This function calls [`log::set_logger`] so that all logs from the log crate are forwarded
/// to the [default logger](crate::default_logger), subject to its threshold.
///
/// This function will set the global maximum log level to `Trace`. To override this, call
/// [`log::set_max_level`] after this function.
///
/// # Errors
///
/// Return an error if the log crate global logger has already been set.
///
/// # Examples
///
/// ```
/// if let Err(err) = reqlog::bridge::log::try_setup_log_crate() {
///     eprintln!("failed to setup log crate: {err}");
/// }
/// ```
pub fn try_setup_log_crate() -> Result<(), log::SetLoggerError> {
    static LOGGER: LogCrateLogger = LogCrateLogger(());
    log::set_logger(&LOGGER)?;
    log::set_max_level(log::LevelFilter::Trace);
    Ok(())
}

/// Set up the log crate global logger.
///
/// See [`try_setup_log_crate`].
///
/// # Panics
///
/// Panic if the log crate global logger has already been set.
pub fn setup_log_crate() {
    try_setup_log_crate().expect(
        "reqlog::bridge::log::setup_log_crate must be called before the log crate global logger initialized",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::append::Buffer;

    #[test]
    fn levels_map_to_syslog() {
        assert_eq!(level_of(log::Level::Error), Level::Error);
        assert_eq!(level_of(log::Level::Warn), Level::Warning);
        assert_eq!(level_of(log::Level::Info), Level::Info);
        assert_eq!(level_of(log::Level::Debug), Level::Debug);
        assert_eq!(level_of(log::Level::Trace), Level::Debug);
    }

    #[test]
    fn forward_writes_mapped_level() {
        let buf = Buffer::default();
        let logger = Logger::new(buf.clone());
        forward(
            &logger,
            &log::Record::builder()
                .level(log::Level::Warn)
                .args(format_args!("disk at {}%", 91))
                .build(),
        );
        assert!(buf.take().ends_with(" WARNING disk at 91%\n"));
    }
}
