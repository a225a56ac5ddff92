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

//! Color utilities.

use colored::Color;
use colored::ColoredString;
use colored::Colorize;

/// Pick the color of an HTTP status code.
///
/// * `2xx`: green
/// * `3xx`: cyan
/// * `4xx`: yellow
/// * `5xx` and anything else: red
///
/// ```
/// use colored::Color;
/// use reqlog::color::color_status;
///
/// assert_eq!(color_status(204), Color::Green);
/// assert_eq!(color_status(404), Color::Yellow);
/// ```
pub fn color_status(code: u16) -> Color {
    match code {
        200..300 => Color::Green,
        300..400 => Color::Cyan,
        400..500 => Color::Yellow,
        _ => Color::Red,
    }
}

/// Render an HTTP status code in bold with its [`color_status`] color.
///
/// Unless `no_color` is set, the escape sequences are emitted when `colored` allows it. See
/// [`colored::control`].
pub fn colorize_status(code: u16, no_color: bool) -> ColoredString {
    if no_color {
        ColoredString::from(code.to_string())
    } else {
        code.to_string().color(color_status(code)).bold()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_colors() {
        assert_eq!(color_status(200), Color::Green);
        assert_eq!(color_status(204), Color::Green);
        assert_eq!(color_status(304), Color::Cyan);
        assert_eq!(color_status(404), Color::Yellow);
        assert_eq!(color_status(504), Color::Red);
        assert_eq!(color_status(101), Color::Red);
    }

    #[test]
    fn no_color_is_plain() {
        assert_eq!(colorize_status(404, true).to_string(), "404");
    }

    #[test]
    fn colored_keeps_code() {
        colored::control::set_override(true);
        let rendered = colorize_status(200, false).to_string();
        colored::control::unset_override();
        assert!(rendered.contains("200"));
        assert!(rendered.starts_with('\u{1b}'));
    }
}
