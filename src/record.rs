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

//! Per-request log records.

use std::collections::BTreeMap;
use std::fmt;
use std::net::IpAddr;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use http::Extensions;
use http::HeaderMap;
use http::Method;
use http::Request;
use http::Uri;
use serde::Serialize;

use crate::Error;
use crate::kv::Value;

/// The fields of a request, accumulated while the request is handled and consumed once when
/// it completes.
///
/// A `Log` is a handle: clones share the same fields, so a field set through one clone is
/// visible through every other. The middleware stores a clone in the request's
/// [`Extensions`]; handlers look it up with [`Log::from_request`] or axum's `Extension`
/// extractor.
///
/// # Examples
///
/// ```
/// use reqlog::Log;
///
/// let mut extensions = http::Extensions::new();
/// let log = Log::create(&mut extensions);
/// Log::from_extensions(&extensions).set("Data", [1, 2, 3]);
///
/// assert!(log.contains_key("Data"));
/// assert_eq!(log.to_json().unwrap(), r#"{"Data":[1,2,3]}"#);
/// ```
#[derive(Clone, Default)]
pub struct Log {
    fields: Arc<Mutex<BTreeMap<String, Value>>>,
}

impl fmt::Debug for Log {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.fields().iter()).finish()
    }
}

impl Log {
    /// Create an empty log that is not attached to any request.
    pub fn new() -> Log {
        Log::default()
    }

    /// Create an empty log and attach it to `extensions`, replacing any log attached before.
    pub fn create(extensions: &mut Extensions) -> Log {
        let log = Log::new();
        extensions.insert(log.clone());
        log
    }

    /// Look up the log attached to `extensions`.
    pub fn try_from_extensions(extensions: &Extensions) -> Option<Log> {
        extensions.get::<Log>().cloned()
    }

    /// Look up the log attached to `extensions`.
    ///
    /// # Panics
    ///
    /// Panics if no log is attached, which means the request did not pass through the
    /// [`RequestLogger`](crate::RequestLogger) middleware before reaching this point.
    pub fn from_extensions(extensions: &Extensions) -> Log {
        match Log::try_from_extensions(extensions) {
            Some(log) => log,
            None => panic!(
                "no request log attached; is the RequestLogger layer installed in front of this handler?"
            ),
        }
    }

    /// Look up the log attached to a request.
    ///
    /// # Panics
    ///
    /// Panics if no log is attached. See [`Log::from_extensions`].
    pub fn from_request<B>(req: &Request<B>) -> Log {
        Log::from_extensions(req.extensions())
    }

    /// Whether both handles refer to the same fields.
    pub fn ptr_eq(&self, other: &Log) -> bool {
        Arc::ptr_eq(&self.fields, &other.fields)
    }

    fn fields(&self) -> MutexGuard<'_, BTreeMap<String, Value>> {
        self.fields.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Set a field, returning the previous value.
    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields().insert(key.into(), value.into())
    }

    /// Set a field to any serializable value.
    ///
    /// # Errors
    ///
    /// Return an error if `value` fails to serialize. The log is left unchanged.
    pub fn set_serialize<T: Serialize + ?Sized>(
        &self,
        key: impl Into<String>,
        value: &T,
    ) -> Result<Option<Value>, Error> {
        let value = Value::from_serialize(value)?;
        Ok(self.set(key, value))
    }

    /// Get a copy of a field.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.fields().get(key).cloned()
    }

    /// Remove a field, returning its value.
    pub fn remove(&self, key: &str) -> Option<Value> {
        self.fields().remove(key)
    }

    /// Whether a field is set.
    pub fn contains_key(&self, key: &str) -> bool {
        self.fields().contains_key(key)
    }

    /// The number of fields.
    pub fn len(&self) -> usize {
        self.fields().len()
    }

    /// Whether no field is set.
    pub fn is_empty(&self) -> bool {
        self.fields().is_empty()
    }

    /// The field names, in order.
    pub fn keys(&self) -> Vec<String> {
        self.fields().keys().cloned().collect()
    }

    /// Run `f` with exclusive access to the fields.
    ///
    /// Use this to read-modify-write several fields atomically.
    pub fn with<R>(&self, f: impl FnOnce(&mut BTreeMap<String, Value>) -> R) -> R {
        f(&mut self.fields())
    }

    /// Serialize the fields as a JSON object with keys in order.
    ///
    /// # Errors
    ///
    /// Return an error if a field value cannot be serialized, e.g. a non-finite float.
    pub fn to_json(&self) -> Result<String, Error> {
        serde_json::to_string(&*self.fields()).map_err(Error::from_json_error)
    }
}

/// Read-only metadata of a request, given to the init hook of the
/// [`RequestLogger`](crate::RequestLogger).
#[derive(Debug, Clone, Copy)]
pub struct RequestInfo<'a> {
    method: &'a Method,
    uri: &'a Uri,
    headers: &'a HeaderMap,
    extensions: &'a Extensions,
}

impl<'a> RequestInfo<'a> {
    /// Borrow the metadata of a request.
    pub fn new<B>(req: &'a Request<B>) -> Self {
        Self {
            method: req.method(),
            uri: req.uri(),
            headers: req.headers(),
            extensions: req.extensions(),
        }
    }

    /// The request method.
    pub fn method(&self) -> &'a Method {
        self.method
    }

    /// The request URI, as received.
    pub fn uri(&self) -> &'a Uri {
        self.uri
    }

    /// The request headers.
    pub fn headers(&self) -> &'a HeaderMap {
        self.headers
    }

    /// The request extensions.
    pub fn extensions(&self) -> &'a Extensions {
        self.extensions
    }

    /// A header value, if present and valid UTF-8.
    pub fn header(&self, name: impl http::header::AsHeaderName) -> Option<&'a str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// The `User-Agent` header, or an empty string.
    pub fn user_agent(&self) -> &'a str {
        self.header(http::header::USER_AGENT).unwrap_or_default()
    }

    /// The client address.
    ///
    /// Resolved from the first entry of `X-Forwarded-For`, then `X-Real-IP`, then the peer
    /// address stored in the extensions as a [`SocketAddr`] (or axum's `ConnectInfo`).
    pub fn client_ip(&self) -> Option<IpAddr> {
        let forwarded = self
            .header("x-forwarded-for")
            .and_then(|v| v.split(',').next())
            .and_then(|v| v.trim().parse().ok());
        if forwarded.is_some() {
            return forwarded;
        }

        let real_ip = self.header("x-real-ip").and_then(|v| v.trim().parse().ok());
        if real_ip.is_some() {
            return real_ip;
        }

        if let Some(addr) = self.extensions.get::<SocketAddr>() {
            return Some(addr.ip());
        }

        #[cfg(feature = "axum")]
        if let Some(info) = self
            .extensions
            .get::<axum::extract::ConnectInfo<SocketAddr>>()
        {
            return Some(info.0.ip());
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    #[test]
    fn lookups_share_one_map() {
        let mut extensions = Extensions::new();
        let log = Log::create(&mut extensions);

        let first = Log::from_extensions(&extensions);
        let second = Log::from_extensions(&extensions);
        assert!(first.ptr_eq(&log));
        assert!(second.ptr_eq(&first));

        first.set("Data", "x");
        assert_eq!(second.get("Data"), Some(Value::from("x")));
    }

    #[test]
    #[should_panic(expected = "no request log attached")]
    fn lookup_without_create_panics() {
        Log::from_extensions(&Extensions::new());
    }

    #[test]
    fn concurrent_mutation_is_safe() {
        let log = Log::new();
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let log = log.clone();
                thread::spawn(move || {
                    for i in 0..100 {
                        log.set(format!("t{t}-{i}"), i);
                        log.with(|fields| {
                            let count = fields.get("count").and_then(Value::as_u64).unwrap_or(0);
                            fields.insert("count".to_string(), Value::from(count + 1));
                        });
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(log.len(), 8 * 100 + 1);
        assert_eq!(log.get("count"), Some(Value::U64(800)));
    }

    #[test]
    fn to_json_reports_unsupported_values() {
        let log = Log::new();
        log.set("Time", f64::INFINITY);
        let err = log.to_json().unwrap_err();
        assert!(err.to_string().starts_with("json: unsupported value: inf"));
    }

    #[test]
    fn request_info_resolves_client_ip() {
        let req = Request::builder()
            .uri("/a?b=1")
            .header("x-forwarded-for", "10.0.0.1, 10.0.0.2")
            .header("user-agent", "curl/8.0")
            .body(())
            .unwrap();
        let info = RequestInfo::new(&req);
        assert_eq!(info.client_ip(), Some("10.0.0.1".parse().unwrap()));
        assert_eq!(info.user_agent(), "curl/8.0");
        assert_eq!(info.uri().to_string(), "/a?b=1");

        let mut req = Request::new(());
        req.extensions_mut()
            .insert(SocketAddr::from(([127, 0, 0, 1], 4000)));
        let info = RequestInfo::new(&req);
        assert_eq!(info.client_ip(), Some(IpAddr::from([127, 0, 0, 1])));
        assert_eq!(info.user_agent(), "");
    }
}
