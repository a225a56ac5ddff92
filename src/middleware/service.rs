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
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::task::Context;
use std::task::Poll;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use http::HeaderMap;
use http::Request;
use http::Response;
use http::StatusCode;
use http::header;
use http_body::Body;
use tower::Service;

use super::ConsumeLog;
use super::RequestLogger;
use crate::Log;
use crate::Logger;
use crate::RequestInfo;
use crate::Value;

/// Status recorded when the request future is dropped before the response is ready.
const CLIENT_CLOSED_REQUEST: u16 = 499;

/// The [`Service`] produced by [`RequestLogger`].
#[derive(Clone)]
pub struct RequestLoggerService<S> {
    inner: S,
    config: RequestLogger,
}

impl<S: fmt::Debug> fmt::Debug for RequestLoggerService<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestLoggerService")
            .field("inner", &self.inner)
            .field("config", &self.config)
            .finish()
    }
}

impl<S> RequestLoggerService<S> {
    pub(super) fn new(inner: S, config: RequestLogger) -> Self {
        Self { inner, config }
    }

    /// The wrapped service.
    pub fn get_ref(&self) -> &S {
        &self.inner
    }
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for RequestLoggerService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>>,
    S::Future: Send + 'static,
    S::Error: Send + 'static,
    ResBody: Body + Send + 'static,
{
    type Response = Response<ResBody>;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<ReqBody>) -> Self::Future {
        let log = Log::create(req.extensions_mut());
        (self.config.init)(&log, &RequestInfo::new(&req));

        let flush = Flush {
            log,
            logger: self.config.logger.clone(),
            consume: self.config.consume.clone(),
            done: false,
        };
        let inner = &mut self.inner;
        let future = match std::panic::catch_unwind(AssertUnwindSafe(|| inner.call(req))) {
            Ok(future) => future,
            Err(panic) => {
                flush.finish(Completion::status(StatusCode::INTERNAL_SERVER_ERROR));
                std::panic::resume_unwind(panic)
            }
        };

        Box::pin(async move {
            match AssertUnwindSafe(future).catch_unwind().await {
                Ok(Ok(res)) => {
                    flush.finish(Completion::of_response(&res));
                    Ok(res)
                }
                Ok(Err(err)) => {
                    flush.finish(Completion::status(StatusCode::INTERNAL_SERVER_ERROR));
                    Err(err)
                }
                Err(panic) => {
                    flush.finish(Completion::status(StatusCode::INTERNAL_SERVER_ERROR));
                    std::panic::resume_unwind(panic)
                }
            }
        })
    }
}

/// What is known about the response when a request completes.
#[derive(Debug, Default)]
struct Completion {
    status: u16,
    content_type: Option<String>,
    length: Option<u64>,
}

impl Completion {
    fn status(status: StatusCode) -> Self {
        Self {
            status: status.as_u16(),
            ..Default::default()
        }
    }

    fn of_response<B: Body>(res: &Response<B>) -> Self {
        Self {
            status: res.status().as_u16(),
            content_type: header_str(res.headers(), header::CONTENT_TYPE).map(str::to_owned),
            length: header_str(res.headers(), header::CONTENT_LENGTH)
                .and_then(|v| v.parse().ok())
                .or_else(|| res.body().size_hint().exact()),
        }
    }
}

fn header_str(headers: &HeaderMap, name: header::HeaderName) -> Option<&str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Runs the consume hook exactly once: when the request completes, or when it is dropped.
struct Flush {
    log: Log,
    logger: Arc<Logger>,
    consume: Arc<ConsumeLog>,
    done: bool,
}

impl Flush {
    fn finish(mut self, completion: Completion) {
        self.consume(completion);
    }

    fn consume(&mut self, completion: Completion) {
        if std::mem::replace(&mut self.done, true) {
            return;
        }

        self.log.with(|fields| {
            fields.insert("Status".to_string(), Value::from(completion.status));
            if let Some(content_type) = completion.content_type {
                fields.insert("Type".to_string(), Value::from(content_type));
            }
            if let Some(length) = completion.length {
                fields.insert("Length".to_string(), Value::from(length));
            }
        });
        (self.consume)(&self.log, &self.logger);
    }
}

impl Drop for Flush {
    fn drop(&mut self) {
        self.consume(Completion {
            status: CLIENT_CLOSED_REQUEST,
            ..Default::default()
        });
    }
}
