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
use std::io::Write;
use std::sync::Mutex;
use std::sync::MutexGuard;

use crate::Error;
use crate::append::Append;

/// An appender that writes log lines to any [`Write`] implementation, such as a file or a
/// socket.
///
/// The writer's lifecycle stays with the caller: it is flushed on drop but never rotated or
/// reopened.
///
/// # Examples
///
/// ```
/// use reqlog::append::Writer;
///
/// let appender = Writer::new(std::io::sink());
/// ```
pub struct Writer<W: Write> {
    writer: Mutex<W>,
}

impl<W: Write + Send + 'static> Writer<W> {
    /// Wrap a writer.
    pub fn new(writer: W) -> Self {
        let writer = Mutex::new(writer);
        Self { writer }
    }

    fn writer(&self) -> MutexGuard<'_, W> {
        self.writer.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl<W: Write> fmt::Debug for Writer<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Writer").finish_non_exhaustive()
    }
}

impl<W: Write + Send + 'static> Append for Writer<W> {
    fn append(&self, bytes: &[u8]) -> Result<(), Error> {
        let mut writer = self.writer();
        writer.write_all(bytes).map_err(Error::from_io_error)?;
        Ok(())
    }

    fn flush(&self) -> Result<(), Error> {
        let mut writer = self.writer();
        writer.flush().map_err(Error::from_io_error)?;
        Ok(())
    }
}

impl<W: Write> Drop for Writer<W> {
    fn drop(&mut self) {
        let writer = self.writer.get_mut().unwrap_or_else(|e| e.into_inner());
        let _ = writer.flush();
    }
}
