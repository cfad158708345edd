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

//! Filters for log records.

use std::fmt;

use log::Metadata;
use log::Record;

mod conditional;
mod env;

pub use self::conditional::ConditionalLevel;
pub use self::env::EnvFilter;
pub use self::env::EnvFilterBuilder;

/// The result of a filter check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterResult {
    /// The record will be processed without further filtering.
    Accept,
    /// The record should not be processed.
    Reject,
    /// No decision could be made, further filtering should occur.
    Neutral,
}

/// A filter that can be applied to log records.
pub trait Filter: fmt::Debug + Send + Sync + 'static {
    /// Check whether records with the given metadata may be processed.
    fn enabled(&self, metadata: &Metadata) -> FilterResult;

    /// Check whether the record should be processed.
    ///
    /// Default to [`Filter::enabled`] on the record's metadata.
    fn matches(&self, record: &Record) -> FilterResult {
        self.enabled(record.metadata())
    }
}

impl<T: Filter> From<T> for Box<dyn Filter> {
    fn from(value: T) -> Self {
        Box::new(value)
    }
}

/// If the level filter is set to `Info`, it will allow `Error`, `Warn`, and `Info` logs.
///
/// If the level filter is set to `Off`, it will reject all logs.
impl Filter for log::LevelFilter {
    fn enabled(&self, metadata: &Metadata) -> FilterResult {
        if metadata.level() <= *self {
            FilterResult::Neutral
        } else {
            FilterResult::Reject
        }
    }
}
