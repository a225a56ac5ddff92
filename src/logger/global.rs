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

//! The process-wide default logger and the free functions delegating to it.

use std::fmt;
use std::sync::Arc;
use std::sync::LazyLock;

use crate::Level;
use crate::Logger;
use crate::append;

static DEFAULT_LOGGER: LazyLock<Arc<Logger>> =
    LazyLock::new(|| Arc::new(Logger::new(append::Stderr::default())));

/// Return the process-wide default logger.
///
/// It is created on first use with threshold [`Level::Debug`], writing to standard error, and
/// lives until the process exits. Reconfigure it with its own setters, e.g.
/// [`Logger::set_level`] and [`Logger::set_output`].
pub fn default_logger() -> &'static Arc<Logger> {
    &DEFAULT_LOGGER
}

/// Replace the threshold of the default logger. See [`Logger::set_level`].
pub fn set_level<L>(level: L)
where
    L: TryInto<Level>,
    L::Error: fmt::Display,
{
    default_logger().set_level(level)
}

/// Log `message` at `level` with the default logger.
pub fn log(level: Level, message: impl fmt::Display) {
    default_logger().log(level, message)
}

/// Log preformatted arguments at `level` with the default logger.
pub fn logf(level: Level, args: fmt::Arguments<'_>) {
    default_logger().logf(level, args)
}

/// Log at [`Level::Emergency`] with the default logger.
pub fn emerg(message: impl fmt::Display) {
    default_logger().emerg(message)
}

/// Log at [`Level::Alert`] with the default logger.
pub fn alert(message: impl fmt::Display) {
    default_logger().alert(message)
}

/// Log at [`Level::Critical`] with the default logger.
pub fn crit(message: impl fmt::Display) {
    default_logger().crit(message)
}

/// Log at [`Level::Error`] with the default logger.
pub fn err(message: impl fmt::Display) {
    default_logger().err(message)
}

/// Log at [`Level::Warning`] with the default logger.
pub fn warning(message: impl fmt::Display) {
    default_logger().warning(message)
}

/// Log at [`Level::Notice`] with the default logger.
pub fn notice(message: impl fmt::Display) {
    default_logger().notice(message)
}

/// Log at [`Level::Info`] with the default logger.
pub fn info(message: impl fmt::Display) {
    default_logger().info(message)
}

/// Log at [`Level::Debug`] with the default logger.
pub fn debug(message: impl fmt::Display) {
    default_logger().debug(message)
}

/// Log at [`Level::Emergency`] with the default logger, then panic. See [`Logger::panic`].
pub fn panic(message: impl fmt::Display) -> ! {
    default_logger().panic(message)
}

/// Log at [`Level::Emergency`] with the default logger, then exit. See [`Logger::fatal`].
pub fn fatal(message: impl fmt::Display) {
    default_logger().fatal(message)
}

/// Write `message` as is to the default logger's output.
pub fn print(message: impl fmt::Display) {
    default_logger().print(message)
}

/// Write formatted arguments as is to the default logger's output.
pub fn printf(args: fmt::Arguments<'_>) {
    default_logger().printf(args)
}

/// Write `message` and a newline to the default logger's output.
pub fn println(message: impl fmt::Display) {
    default_logger().println(message)
}
