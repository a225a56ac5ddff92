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
use std::fmt::Write;
use std::str::FromStr;

use crate::Error;
use crate::Level;

/// The template of a log line.
///
/// Placeholders are `{time}`, `{level}` and `{message}`; `{{` and `}}` write literal braces.
/// The newline is appended by the logger and is not part of the template.
///
/// Output format of the default template `"{time} {level} {message}"`:
///
/// ```text
/// 2024-08-11T14:44:57.172Z ERR Hello error!
/// 2024-08-11T14:44:57.172Z WARNING Hello warning!
/// 2024-08-11T14:44:57.172Z INFO Hello info!
/// ```
///
/// # Examples
///
/// ```
/// use reqlog::LineFormat;
///
/// let format: LineFormat = "[{level}] {time} | {message}".parse().unwrap();
/// assert!("{unknown}".parse::<LineFormat>().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineFormat {
    segments: Vec<Segment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Time,
    Level,
    Message,
}

impl Default for LineFormat {
    fn default() -> Self {
        Self {
            segments: vec![
                Segment::Time,
                Segment::Literal(" ".to_string()),
                Segment::Level,
                Segment::Literal(" ".to_string()),
                Segment::Message,
            ],
        }
    }
}

impl LineFormat {
    /// Parse a template.
    ///
    /// # Errors
    ///
    /// Return an error for an unknown placeholder or an unbalanced brace.
    pub fn parse(template: &str) -> Result<LineFormat, Error> {
        let mut segments = vec![];
        let mut literal = String::new();
        let mut chars = template.char_indices().peekable();

        while let Some((pos, c)) = chars.next() {
            match c {
                '{' if chars.peek().is_some_and(|&(_, next)| next == '{') => {
                    chars.next();
                    literal.push('{');
                }
                '}' if chars.peek().is_some_and(|&(_, next)| next == '}') => {
                    chars.next();
                    literal.push('}');
                }
                '{' => {
                    let rest = &template[pos + 1..];
                    let Some(end) = rest.find('}') else {
                        return Err(Error::new("unclosed placeholder in line format")
                            .with_context("template", template));
                    };
                    let segment = match &rest[..end] {
                        "time" => Segment::Time,
                        "level" => Segment::Level,
                        "message" => Segment::Message,
                        name => {
                            return Err(Error::new(format!(
                                "unknown placeholder {{{name}}} in line format"
                            ))
                            .with_context("template", template));
                        }
                    };
                    // skip the name and the closing brace
                    for _ in 0..=rest[..end].chars().count() {
                        chars.next();
                    }
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(segment);
                }
                '}' => {
                    return Err(Error::new("unmatched '}' in line format")
                        .with_context("template", template));
                }
                c => literal.push(c),
            }
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }
        Ok(LineFormat { segments })
    }

    pub(crate) fn render(
        &self,
        out: &mut String,
        time: &str,
        level: Level,
        message: &dyn fmt::Display,
    ) -> fmt::Result {
        for segment in &self.segments {
            match segment {
                Segment::Literal(s) => out.push_str(s),
                Segment::Time => out.push_str(time),
                Segment::Level => out.push_str(level.as_str()),
                Segment::Message => write!(out, "{message}")?,
            }
        }
        Ok(())
    }
}

impl FromStr for LineFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LineFormat::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(format: &LineFormat) -> String {
        let mut out = String::new();
        format
            .render(&mut out, "2024-01-01T00:00:00.000Z", Level::Notice, &"hi")
            .unwrap();
        out
    }

    #[test]
    fn default_matches_parsed_template() {
        let parsed = LineFormat::parse("{time} {level} {message}").unwrap();
        assert_eq!(parsed, LineFormat::default());
        assert_eq!(render(&parsed), "2024-01-01T00:00:00.000Z NOTICE hi");
    }

    #[test]
    fn escapes_and_literals() {
        let parsed = LineFormat::parse("{{{level}}} <{message}> @ {time}").unwrap();
        assert_eq!(render(&parsed), "{NOTICE} <hi> @ 2024-01-01T00:00:00.000Z");
    }

    #[test]
    fn rejects_malformed_templates() {
        for template in ["{time", "{host} {message}", "a } b"] {
            assert!(LineFormat::parse(template).is_err(), "{template}");
        }
    }
}
