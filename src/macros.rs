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

//! Formatting macros.
//!
//! Each macro takes a format string like [`format!`] and either logs with the default logger,
//! or with an explicit logger given as `logger: <expr>`. The arguments are only formatted when
//! the level passes the threshold.
//!
//! ```
//! use reqlog::Logger;
//! use reqlog::append::Buffer;
//!
//! let buf = Buffer::default();
//! let logger = Logger::new(buf.clone());
//! reqlog::warning!(logger: logger, "{} retries left", 3);
//! assert!(buf.contents().ends_with(" WARNING 3 retries left\n"));
//! ```

/// Log at the given level with a format string.
///
/// ```
/// use reqlog::Level;
///
/// reqlog::log!(Level::Notice, "listening on {}", "127.0.0.1:3000");
/// ```
#[macro_export]
macro_rules! log {
    (logger: $logger:expr, $level:expr, $($arg:tt)+) => {
        $logger.logf($level, ::std::format_args!($($arg)+))
    };
    ($level:expr, $($arg:tt)+) => {
        $crate::default_logger().logf($level, ::std::format_args!($($arg)+))
    };
}

/// Log at [`Level::Emergency`](crate::Level::Emergency) with a format string.
#[macro_export]
macro_rules! emerg {
    (logger: $logger:expr, $($arg:tt)+) => {
        $logger.logf($crate::Level::Emergency, ::std::format_args!($($arg)+))
    };
    ($($arg:tt)+) => {
        $crate::default_logger().logf($crate::Level::Emergency, ::std::format_args!($($arg)+))
    };
}

/// Log at [`Level::Alert`](crate::Level::Alert) with a format string.
#[macro_export]
macro_rules! alert {
    (logger: $logger:expr, $($arg:tt)+) => {
        $logger.logf($crate::Level::Alert, ::std::format_args!($($arg)+))
    };
    ($($arg:tt)+) => {
        $crate::default_logger().logf($crate::Level::Alert, ::std::format_args!($($arg)+))
    };
}

/// Log at [`Level::Critical`](crate::Level::Critical) with a format string.
#[macro_export]
macro_rules! crit {
    (logger: $logger:expr, $($arg:tt)+) => {
        $logger.logf($crate::Level::Critical, ::std::format_args!($($arg)+))
    };
    ($($arg:tt)+) => {
        $crate::default_logger().logf($crate::Level::Critical, ::std::format_args!($($arg)+))
    };
}

/// Log at [`Level::Error`](crate::Level::Error) with a format string.
#[macro_export]
macro_rules! err {
    (logger: $logger:expr, $($arg:tt)+) => {
        $logger.logf($crate::Level::Error, ::std::format_args!($($arg)+))
    };
    ($($arg:tt)+) => {
        $crate::default_logger().logf($crate::Level::Error, ::std::format_args!($($arg)+))
    };
}

/// Log at [`Level::Warning`](crate::Level::Warning) with a format string.
#[macro_export]
macro_rules! warning {
    (logger: $logger:expr, $($arg:tt)+) => {
        $logger.logf($crate::Level::Warning, ::std::format_args!($($arg)+))
    };
    ($($arg:tt)+) => {
        $crate::default_logger().logf($crate::Level::Warning, ::std::format_args!($($arg)+))
    };
}

/// Log at [`Level::Notice`](crate::Level::Notice) with a format string.
#[macro_export]
macro_rules! notice {
    (logger: $logger:expr, $($arg:tt)+) => {
        $logger.logf($crate::Level::Notice, ::std::format_args!($($arg)+))
    };
    ($($arg:tt)+) => {
        $crate::default_logger().logf($crate::Level::Notice, ::std::format_args!($($arg)+))
    };
}

/// Log at [`Level::Info`](crate::Level::Info) with a format string.
#[macro_export]
macro_rules! info {
    (logger: $logger:expr, $($arg:tt)+) => {
        $logger.logf($crate::Level::Info, ::std::format_args!($($arg)+))
    };
    ($($arg:tt)+) => {
        $crate::default_logger().logf($crate::Level::Info, ::std::format_args!($($arg)+))
    };
}

/// Log at [`Level::Debug`](crate::Level::Debug) with a format string.
#[macro_export]
macro_rules! debug {
    (logger: $logger:expr, $($arg:tt)+) => {
        $logger.logf($crate::Level::Debug, ::std::format_args!($($arg)+))
    };
    ($($arg:tt)+) => {
        $crate::default_logger().logf($crate::Level::Debug, ::std::format_args!($($arg)+))
    };
}
