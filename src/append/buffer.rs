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

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use crate::Error;
use crate::append::Append;

/// An in-memory appender whose clones share the same bytes.
///
/// Useful for capturing the output of a logger in tests: hand one clone to the logger and
/// read the captured lines from another.
///
/// # Examples
///
/// ```
/// use reqlog::Logger;
/// use reqlog::append::Buffer;
///
/// let buf = Buffer::default();
/// let logger = Logger::new(buf.clone());
/// logger.print("Hello");
/// assert_eq!(buf.contents(), "Hello");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Buffer {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl Buffer {
    fn bytes(&self) -> MutexGuard<'_, Vec<u8>> {
        self.bytes.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// The captured output, lossily decoded as UTF-8.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.bytes()).into_owned()
    }

    /// The captured output split into lines, without the line terminators.
    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_owned).collect()
    }

    /// Take the captured output, leaving the buffer empty.
    pub fn take(&self) -> String {
        let bytes = std::mem::take(&mut *self.bytes());
        String::from_utf8_lossy(&bytes).into_owned()
    }

    /// Discard the captured output.
    pub fn clear(&self) {
        self.bytes().clear();
    }

    /// Whether nothing has been captured.
    pub fn is_empty(&self) -> bool {
        self.bytes().is_empty()
    }
}

impl Append for Buffer {
    fn append(&self, bytes: &[u8]) -> Result<(), Error> {
        self.bytes().extend_from_slice(bytes);
        Ok(())
    }
}
