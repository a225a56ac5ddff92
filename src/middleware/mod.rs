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

//! A tower middleware that keeps one [`Log`] per request and consumes it when the request
//! completes.
//!
//! Each request goes through three steps:
//!
//! 1. A new [`Log`] is attached to the request extensions and the init hook seeds it from the
//!    request metadata. The default hook, [`init_log`], sets `IP`, `Method`, `URL`, `Start`
//!    and `UserAgent`.
//! 2. Downstream handlers look the log up and add fields.
//! 3. When the response is ready, the middleware sets `Status`, plus `Type` and `Length` when
//!    known, and runs the consume hook exactly once. This also happens when the inner service
//!    fails (status 500), panics (status 500, the panic is resumed afterwards) or when the
//!    request future is dropped before completion (status 499). The default hook,
//!    [`text_consume_log`], writes one human readable line at [`Level::Info`](crate::Level).
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//!
//! use reqlog::Logger;
//! use reqlog::RequestLogger;
//! use reqlog::append;
//! use reqlog::middleware::json_consume_log;
//!
//! let logger = Arc::new(Logger::new(append::Stdout::default()));
//! let mut layer = RequestLogger::new(logger);
//! layer.set_consume_log(json_consume_log);
//!
//! let router: axum::Router = axum::Router::new()
//!     .route("/", axum::routing::get(|| async { "OK" }))
//!     .layer(layer);
//! ```

use std::fmt;
use std::sync::Arc;

use tower::Layer;

use crate::Log;
use crate::Logger;
use crate::RequestInfo;

mod hooks;
mod service;

pub use self::hooks::init_log;
pub use self::hooks::json_consume_log;
pub use self::hooks::plain_text_consume_log;
pub use self::hooks::text_consume_log;
pub use self::service::RequestLoggerService;

/// A hook seeding the fields of a new request log.
pub type InitLog = dyn Fn(&Log, &RequestInfo<'_>) + Send + Sync;

/// A hook consuming a completed request log, usually by writing it to the logger.
pub type ConsumeLog = dyn Fn(&Log, &Logger) + Send + Sync;

/// A [`Layer`] that attaches a [`Log`] to every request and consumes it on completion.
///
/// Configure the hooks before the layer starts serving requests.
#[derive(Clone)]
pub struct RequestLogger {
    logger: Arc<Logger>,
    init: Arc<InitLog>,
    consume: Arc<ConsumeLog>,
}

impl fmt::Debug for RequestLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestLogger")
            .field("logger", &self.logger)
            .finish_non_exhaustive()
    }
}

impl RequestLogger {
    /// Create a middleware writing through `logger` with the default hooks, [`init_log`] and
    /// [`text_consume_log`].
    pub fn new(logger: Arc<Logger>) -> Self {
        Self {
            logger,
            init: Arc::new(init_log),
            consume: Arc::new(text_consume_log),
        }
    }

    /// The logger the consume hook writes through.
    pub fn logger(&self) -> &Arc<Logger> {
        &self.logger
    }

    /// Replace the init hook.
    pub fn set_init_log<F>(&mut self, init: F)
    where
        F: Fn(&Log, &RequestInfo<'_>) + Send + Sync + 'static,
    {
        self.init = Arc::new(init);
    }

    /// Replace the consume hook.
    pub fn set_consume_log<F>(&mut self, consume: F)
    where
        F: Fn(&Log, &Logger) + Send + Sync + 'static,
    {
        self.consume = Arc::new(consume);
    }

    /// Use [`plain_text_consume_log`]: the default line without colors.
    pub fn no_color(mut self) -> Self {
        self.set_consume_log(plain_text_consume_log);
        self
    }
}

impl<S> Layer<S> for RequestLogger {
    type Service = RequestLoggerService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestLoggerService::new(inner, self.clone())
    }
}
