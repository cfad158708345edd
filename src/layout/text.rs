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

use std::fmt::Write;

use jiff::Timestamp;
use jiff::Zoned;
use jiff::tz::TimeZone;
use log::Level;
use log::Record;

use crate::Error;
use crate::layout::Layout;
use crate::layout::kv::KvWriter;
use crate::layout::kv::visit_error;

/// A layout that formats log record as text.
///
/// Output format:
///
/// ```text
/// 2024-08-11T22:44:57.172105+08:00 ERROR switching: demos/switching.rs:51 Hello error!
/// 2024-08-11T22:44:57.172219+08:00  WARN switching: demos/switching.rs:52 Hello warn!
/// 2024-08-11T22:44:57.172276+08:00  INFO switching: demos/switching.rs:53 Log entry log=3
/// ```
///
/// With the `colored` feature on, levels are colored unless [`TextLayout::no_color`] is set.
///
/// # Examples
///
/// ```
/// use logswitch::layout::TextLayout;
///
/// let text_layout = TextLayout::default().no_color();
/// ```
#[derive(Debug, Clone, Default)]
pub struct TextLayout {
    tz: Option<TimeZone>,
    #[cfg_attr(not(feature = "colored"), allow(dead_code))]
    no_color: bool,
}

impl TextLayout {
    /// Sets the timezone for timestamps.
    ///
    /// Default to the system timezone.
    pub fn timezone(mut self, tz: TimeZone) -> Self {
        self.tz = Some(tz);
        self
    }

    /// Disables colored output.
    pub fn no_color(mut self) -> Self {
        self.no_color = true;
        self
    }

    fn format_level(&self, level: Level) -> String {
        #[cfg(feature = "colored")]
        if !self.no_color {
            use colored::Color;
            use colored::Colorize;

            let color = match level {
                Level::Error => Color::Red,
                Level::Warn => Color::Yellow,
                Level::Info => Color::Green,
                Level::Debug => Color::Blue,
                Level::Trace => Color::Magenta,
            };
            return format!("{:>5}", level.as_str().color(color));
        }

        format!("{:>5}", level.as_str())
    }
}

impl Layout for TextLayout {
    fn format(&self, record: &Record) -> Result<Vec<u8>, Error> {
        let time = match self.tz.clone() {
            Some(tz) => Timestamp::now().to_zoned(tz),
            None => Zoned::now(),
        };
        let time = time.strftime("%Y-%m-%dT%H:%M:%S.%6f%:z");
        let level = self.format_level(record.level());
        let target = record.target();
        let file = record.file().unwrap_or_default();
        let line = record.line().unwrap_or_default();
        let message = record.args();

        let mut text = String::new();
        write!(&mut text, "{time} {level} {target}: {file}:{line} {message}")
            .map_err(Error::from_fmt_error)?;

        let mut visitor = KvWriter { text };
        record
            .key_values()
            .visit(&mut visitor)
            .map_err(visit_error)?;

        Ok(visitor.text.into_bytes())
    }
}
