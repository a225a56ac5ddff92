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

//! Outputs that rendered log lines are written to.

use std::fmt;

use crate::Error;

mod buffer;
mod stdio;
mod writer;

pub use self::buffer::Buffer;
pub use self::stdio::Stderr;
pub use self::stdio::Stdout;
pub use self::writer::Writer;

/// An output that accepts rendered log lines.
///
/// The [`Logger`](crate::Logger) calls [`append`](Append::append) once per line with the
/// complete bytes of that line, while holding its output lock.
pub trait Append: fmt::Debug + Send + Sync + 'static {
    /// Write the bytes of one log line to the output.
    fn append(&self, bytes: &[u8]) -> Result<(), Error>;

    /// Flush any buffered bytes.
    ///
    /// Default to a no-op.
    fn flush(&self) -> Result<(), Error> {
        Ok(())
    }
}

impl<T: Append> From<T> for Box<dyn Append> {
    fn from(value: T) -> Self {
        Box::new(value)
    }
}
