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

//! Syslog severity levels.

use std::fmt;
use std::str::FromStr;

use crate::Error;

/// An enum representing the syslog severity levels.
///
/// Levels are ordered by verbosity: [`Level::Emergency`] is the most severe and has the value
/// `0`, [`Level::Debug`] is the most verbose and has the value `7`. A message is emitted when
/// its level is less than or equal to the logger's threshold.
///
/// ```
/// use reqlog::Level;
///
/// assert!(Level::Emergency < Level::Debug);
/// assert_eq!(Level::Warning.value(), 4);
/// assert_eq!(Level::Warning.to_string(), "WARNING");
/// ```
#[repr(u8)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    /// System is unusable.
    Emergency = 0,
    /// Action must be taken immediately.
    Alert = 1,
    /// Critical conditions.
    Critical = 2,
    /// Error conditions.
    Error = 3,
    /// Warning conditions.
    Warning = 4,
    /// Normal but significant condition.
    Notice = 5,
    /// Informational messages.
    Info = 6,
    /// Debug-level messages.
    Debug = 7,
}

const NAMES: [&str; 8] = [
    "EMERG", "ALERT", "CRIT", "ERR", "WARNING", "NOTICE", "INFO", "DEBUG",
];

impl Level {
    /// All levels, from the most severe to the most verbose.
    pub const ALL: [Level; 8] = [
        Level::Emergency,
        Level::Alert,
        Level::Critical,
        Level::Error,
        Level::Warning,
        Level::Notice,
        Level::Info,
        Level::Debug,
    ];

    /// The numeric syslog value of this level.
    pub const fn value(self) -> u8 {
        self as u8
    }

    /// Return the canonical tag of the `Level`.
    ///
    /// This returns the same string as the `fmt::Display` implementation.
    pub const fn as_str(self) -> &'static str {
        NAMES[self as usize]
    }

    /// Look up the canonical tag of a numeric level.
    ///
    /// # Panics
    ///
    /// Panics if `value` is not a valid level (`0..=7`).
    ///
    /// ```
    /// assert_eq!(reqlog::Level::name(3), "ERR");
    /// ```
    pub fn name(value: u8) -> &'static str {
        match NAMES.get(usize::from(value)) {
            Some(name) => name,
            None => panic!("invalid log level: {value}"),
        }
    }
}

impl fmt::Debug for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl TryFrom<u8> for Level {
    type Error = Error;

    fn try_from(value: u8) -> Result<Level, Error> {
        Level::ALL
            .get(usize::from(value))
            .copied()
            .ok_or_else(|| Error::new(format!("invalid log level: {value}")))
    }
}

impl From<Level> for u8 {
    fn from(level: Level) -> u8 {
        level.value()
    }
}

impl FromStr for Level {
    type Err = Error;

    fn from_str(s: &str) -> Result<Level, Self::Err> {
        for (name, level) in [
            ("emerg", Level::Emergency),
            ("emergency", Level::Emergency),
            ("alert", Level::Alert),
            ("crit", Level::Critical),
            ("critical", Level::Critical),
            ("err", Level::Error),
            ("error", Level::Error),
            ("warning", Level::Warning),
            ("warn", Level::Warning),
            ("notice", Level::Notice),
            ("info", Level::Info),
            ("debug", Level::Debug),
        ] {
            if s.eq_ignore_ascii_case(name) {
                return Ok(level);
            }
        }

        Err(Error::new(format!("malformed level: {s:?}")))
    }
}
