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

use std::fmt;
use std::sync::Mutex;
use std::sync::RwLock;
use std::sync::atomic::AtomicU8;

use jiff::Timestamp;
use jiff::tz::TimeZone;

use super::DEFAULT_TIME_FORMAT;
use super::LineFormat;
use super::Logger;
use super::format_time;
use crate::Error;
use crate::Level;
use crate::append;
use crate::append::Append;
use crate::trap::DefaultTrap;
use crate::trap::Trap;

/// A builder for configuring a [`Logger`].
///
/// # Examples
///
/// ```
/// use reqlog::Level;
/// use reqlog::Logger;
/// use reqlog::append;
///
/// let logger = Logger::builder()
///     .level(Level::Notice)
///     .output(append::Stdout::default())
///     .time_format("%H:%M:%S")
///     .build()
///     .unwrap();
/// ```
#[must_use = "call `build` to create the logger"]
pub struct Builder {
    level: Level,
    output: Box<dyn Append>,
    time_format: String,
    timezone: TimeZone,
    line_format: LineFormat,
    trap: Box<dyn Trap>,
    exit: fn(),
}

impl fmt::Debug for Builder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Builder")
            .field("level", &self.level)
            .field("output", &self.output)
            .field("time_format", &self.time_format)
            .field("line_format", &self.line_format)
            .field("trap", &self.trap)
            .finish_non_exhaustive()
    }
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

fn exit_process() {
    std::process::exit(1)
}

impl Builder {
    /// Create a new [`Builder`] with the default settings and a [`Stderr`](append::Stderr)
    /// output.
    pub fn new() -> Self {
        Self {
            level: Level::Debug,
            output: Box::new(append::Stderr::default()),
            time_format: DEFAULT_TIME_FORMAT.to_string(),
            timezone: TimeZone::UTC,
            line_format: LineFormat::default(),
            trap: Box::new(DefaultTrap::default()),
            exit: exit_process,
        }
    }

    /// Set the threshold. Default to [`Level::Debug`].
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Set the output. Default to [`Stderr`](append::Stderr).
    pub fn output(mut self, output: impl Into<Box<dyn Append>>) -> Self {
        self.output = output.into();
        self
    }

    /// Set the strftime-style timestamp format.
    ///
    /// Default to [`DEFAULT_TIME_FORMAT`]. See [`jiff::fmt::strtime`] for the directives.
    pub fn time_format(mut self, format: impl Into<String>) -> Self {
        self.time_format = format.into();
        self
    }

    /// Set the timezone timestamps are rendered in. Default to UTC.
    pub fn timezone(mut self, tz: TimeZone) -> Self {
        self.timezone = tz;
        self
    }

    /// Set the line template.
    pub fn line_format(mut self, format: LineFormat) -> Self {
        self.line_format = format;
        self
    }

    /// Set the trap receiving output errors. Default to [`DefaultTrap`].
    pub fn trap(mut self, trap: impl Into<Box<dyn Trap>>) -> Self {
        self.trap = trap.into();
        self
    }

    /// Set the function [`Logger::fatal`] calls after logging.
    pub fn exit(mut self, exit: fn()) -> Self {
        self.exit = exit;
        self
    }

    /// Create the logger.
    ///
    /// # Errors
    ///
    /// Return an error if the timestamp format cannot be rendered.
    pub fn build(self) -> Result<Logger, Error> {
        format_time(&self.time_format, &self.timezone, Timestamp::UNIX_EPOCH)?;
        Ok(self.assemble())
    }

    pub(super) fn assemble(self) -> Logger {
        Logger {
            level: AtomicU8::new(self.level.value()),
            output: Mutex::new(self.output),
            time_format: self.time_format,
            timezone: self.timezone,
            line_format: self.line_format,
            trap: self.trap,
            exit: RwLock::new(self.exit),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::append::Buffer;

    #[test]
    fn custom_formats() {
        let buf = Buffer::default();
        let logger = Builder::new()
            .output(buf.clone())
            .time_format("%Y/%m/%d")
            .line_format("{level}: {message} ({time})".parse().unwrap())
            .build()
            .unwrap();

        let time: Timestamp = "2024-08-11T22:44:57Z".parse().unwrap();
        logger.output(time, Level::Alert, "disk full").unwrap();
        assert_eq!(buf.contents(), "ALERT: disk full (2024/08/11)\n");
    }

    #[test]
    fn timezone_applies_to_timestamps() {
        let buf = Buffer::default();
        let logger = Builder::new()
            .output(buf.clone())
            .timezone(TimeZone::fixed(jiff::tz::offset(8)))
            .time_format("%H:%M")
            .build()
            .unwrap();

        let time: Timestamp = "2024-08-11T22:44:57Z".parse().unwrap();
        logger.output(time, Level::Info, "x").unwrap();
        assert_eq!(buf.contents(), "06:44 INFO x\n");
    }

    #[test]
    fn invalid_time_format_fails_to_build() {
        let err = Builder::new().time_format("%!").build().unwrap_err();
        assert!(err.to_string().contains("failed to format timestamp"));
    }
}
