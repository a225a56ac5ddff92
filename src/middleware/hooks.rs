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

use std::collections::BTreeMap;

use jiff::SignedDuration;
use jiff::Timestamp;

use crate::Level;
use crate::Log;
use crate::Logger;
use crate::RequestInfo;
use crate::Value;
use crate::color::colorize_status;

/// The default init hook.
///
/// Sets `IP` (null when unknown), `Method`, `URL`, `Start` and `UserAgent`.
pub fn init_log(log: &Log, req: &RequestInfo<'_>) {
    let ip = req.client_ip().map(|ip| ip.to_string());
    log.with(|fields| {
        fields.insert("IP".to_string(), Value::from(ip));
        fields.insert("Method".to_string(), Value::from(req.method().as_str()));
        fields.insert("URL".to_string(), Value::from(req.uri().to_string()));
        fields.insert("Start".to_string(), Value::Time(Timestamp::now()));
        fields.insert("UserAgent".to_string(), Value::from(req.user_agent()));
    });
}

/// The default consume hook.
///
/// Writes one line at [`Level::Info`]:
///
/// ```text
/// <IP> <Method> <URL> <Status> <Length> - <elapsed> ms
/// ```
///
/// The status is colored by class, see [`color_status`](crate::color::color_status).
///
/// Whether escape sequences are written follows the global switch of the `colored` crate,
/// not the output of the logger: on when stdout is a terminal or `CLICOLOR_FORCE` is set,
/// off when `NO_COLOR` is set. For an output other than stdout, force the choice with
/// `colored::control::set_override` or use [`plain_text_consume_log`].
pub fn text_consume_log(log: &Log, logger: &Logger) {
    logger.info(text_line(log, Timestamp::now(), false));
}

/// Like [`text_consume_log`], without colors.
pub fn plain_text_consume_log(log: &Log, logger: &Logger) {
    logger.info(text_line(log, Timestamp::now(), true));
}

/// A consume hook writing the log as a JSON object.
///
/// Replaces `Start` with `Time`, the elapsed milliseconds, then writes the object at
/// [`Level::Info`]. If the log cannot be serialized, the error is written at
/// [`Level::Warning`] instead.
pub fn json_consume_log(log: &Log, logger: &Logger) {
    let end = Timestamp::now();
    log.with(|fields| {
        let millis = elapsed(fields, end).as_millis();
        let millis = i64::try_from(millis).unwrap_or(i64::MAX);
        fields.insert("Time".to_string(), Value::from(millis));
        fields.remove("Start");
    });

    let result = match log.to_json() {
        Ok(json) => logger.output(end, Level::Info, &json),
        Err(err) => logger.output(end, Level::Warning, &err.to_string()),
    };
    if let Err(err) = result {
        logger.trap(&err);
    }
}

fn elapsed(fields: &BTreeMap<String, Value>, end: Timestamp) -> SignedDuration {
    fields
        .get("Start")
        .and_then(Value::as_time)
        .map(|start| end.duration_since(start))
        .unwrap_or(SignedDuration::ZERO)
}

fn text_line(log: &Log, end: Timestamp, no_color: bool) -> String {
    log.with(|fields| {
        let field = |key: &str| match fields.get(key) {
            None | Some(Value::Null) => "-".to_string(),
            Some(value) => value.to_string(),
        };
        let status = fields
            .get("Status")
            .and_then(Value::as_u64)
            .and_then(|s| u16::try_from(s).ok())
            .unwrap_or_default();
        let millis = elapsed(fields, end).as_secs_f64() * 1000.0;

        format!(
            "{} {} {} {} {} - {millis:.3} ms",
            field("IP"),
            field("Method"),
            field("URL"),
            colorize_status(status, no_color),
            field("Length"),
        )
    })
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;

    use http::Request;

    use super::*;
    use crate::append::Buffer;

    fn start() -> Timestamp {
        "2024-08-11T22:44:57.100Z".parse().unwrap()
    }

    #[test]
    fn init_sets_request_fields() {
        let mut req = Request::builder()
            .method("POST")
            .uri("/items?id=1")
            .header("user-agent", "curl/8.0")
            .body(())
            .unwrap();
        req.extensions_mut()
            .insert(SocketAddr::from(([127, 0, 0, 1], 4000)));

        let log = Log::new();
        init_log(&log, &RequestInfo::new(&req));
        assert_eq!(
            log.keys(),
            ["IP", "Method", "Start", "URL", "UserAgent"].map(String::from)
        );
        assert_eq!(log.get("IP"), Some(Value::from("127.0.0.1")));
        assert_eq!(log.get("Method"), Some(Value::from("POST")));
        assert_eq!(log.get("URL"), Some(Value::from("/items?id=1")));
        assert_eq!(log.get("UserAgent"), Some(Value::from("curl/8.0")));
        assert!(log.get("Start").and_then(|v| v.as_time()).is_some());
    }

    #[test]
    fn init_without_peer_sets_null_ip() {
        let log = Log::new();
        init_log(&log, &RequestInfo::new(&Request::new(())));
        assert_eq!(log.get("IP"), Some(Value::Null));
    }

    #[test]
    fn text_line_layout() {
        let log = Log::new();
        log.set("IP", "127.0.0.1");
        log.set("Method", "GET");
        log.set("URL", "/");
        log.set("Start", start());
        log.set("Status", 200u16);
        log.set("Length", 2u64);

        let end: Timestamp = "2024-08-11T22:44:57.112500Z".parse().unwrap();
        assert_eq!(
            text_line(&log, end, true),
            "127.0.0.1 GET / 200 2 - 12.500 ms"
        );
    }

    #[test]
    fn text_line_fills_missing_fields() {
        let log = Log::new();
        log.set("IP", Value::Null);
        log.set("Status", 499u16);
        assert_eq!(
            text_line(&log, start(), true),
            "- - - 499 - - 0.000 ms"
        );
    }

    #[test]
    fn json_replaces_start_with_time() {
        let buf = Buffer::default();
        let logger = Logger::new(buf.clone());
        let log = Log::new();
        log.set("Start", Timestamp::now());
        log.set("Data", [1, 2, 3]);

        json_consume_log(&log, &logger);
        assert!(!log.contains_key("Start"));
        assert!(log.get("Time").and_then(|v| v.as_u64()).is_some());

        let line = buf.take();
        let (_, rest) = line.split_at(24);
        assert!(rest.starts_with(" INFO {\"Data\":[1,2,3],\"Time\":"), "{line:?}");
        assert!(rest.ends_with("}\n"), "{line:?}");
    }

    #[test]
    fn json_failure_becomes_warning() {
        let buf = Buffer::default();
        let logger = Logger::new(buf.clone());
        let log = Log::new();
        log.set("Ratio", f64::NAN);

        json_consume_log(&log, &logger);
        let line = buf.take();
        let (_, rest) = line.split_at(24);
        assert!(
            rest.starts_with(" WARNING json: unsupported value: NaN"),
            "{line:?}"
        );
    }
}
