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

//! Reqlog is a syslog-leveled logger plus a tower middleware that keeps one structured log
//! record per HTTP request.
//!
//! # Overview
//!
//! A [`Logger`] writes one line per message, `"<time> <LEVEL> <message>"`, to an [`Append`]
//! output. Messages above the threshold are dropped without being formatted. Levels follow
//! syslog: [`Level::Emergency`] is the most severe, [`Level::Debug`] the least.
//!
//! The [`RequestLogger`] layer attaches a [`Log`] to every request. Handlers add fields to it,
//! and when the request completes the fields are consumed exactly once, by default as a single
//! text line written through the logger.
//!
//! # Examples
//!
//! Log with the default logger, which writes to standard error:
//!
//! ```
//! reqlog::set_level(reqlog::Level::Info);
//!
//! reqlog::info("This is an info message.");
//! reqlog::warning!("{} retries left", 3);
//! reqlog::debug("This is dropped.");
//! ```
//!
//! Log requests of an axum router as JSON:
//!
//! ```
//! use std::sync::Arc;
//!
//! use axum::Router;
//! use axum::routing::get;
//! use reqlog::Log;
//! use reqlog::Logger;
//! use reqlog::RequestLogger;
//! use reqlog::append;
//! use reqlog::middleware::json_consume_log;
//!
//! let logger = Arc::new(Logger::new(append::Stdout::default()));
//! let mut layer = RequestLogger::new(logger);
//! layer.set_consume_log(json_consume_log);
//!
//! let app: Router = Router::new()
//!     .route(
//!         "/",
//!         get(|axum::Extension(log): axum::Extension<Log>| async move {
//!             log.set("Data", [1, 2, 3]);
//!             "OK"
//!         }),
//!     )
//!     .layer(layer);
//! ```

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod append;
pub mod bridge;
pub mod color;
pub mod kv;
pub mod middleware;
pub mod trap;

mod error;
mod level;
mod logger;
mod macros;
mod record;

pub use self::append::Append;
pub use self::error::Error;
pub use self::kv::Value;
pub use self::level::Level;
pub use self::logger::Builder;
pub use self::logger::DEFAULT_TIME_FORMAT;
pub use self::logger::LineFormat;
pub use self::logger::Logger;
pub use self::logger::global::*;
pub use self::middleware::RequestLogger;
pub use self::record::Log;
pub use self::record::RequestInfo;
