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

use std::borrow::Cow;

pub use env_filter::Builder as EnvFilterBuilder;
use log::Metadata;
use log::Record;

use crate::filter::Filter;
use crate::filter::FilterResult;

const DEFAULT_FILTER_ENV: &str = "RUST_LOG";

/// A filter that respects the `RUST_LOG` environment variable.
///
/// Read [the `env_logger` documentation](https://docs.rs/env_logger/#enabling-logging) for more.
///
/// An `EnvFilter` combines with a [`ConditionalLevel`] in one dispatch: the directives narrow
/// targets and levels, and the conditional filter decides whether the dispatch is live.
///
/// [`ConditionalLevel`]: crate::filter::ConditionalLevel
#[derive(Debug)]
pub struct EnvFilter(env_filter::Filter);

impl EnvFilter {
    /// Read directives from `RUST_LOG`, or use `default` when the variable is not set.
    ///
    /// # Examples
    ///
    /// ```
    /// use logswitch::filter::EnvFilter;
    /// let filter = EnvFilter::from_default_env_or("info");
    /// ```
    pub fn from_default_env_or<'a, V>(default: V) -> Self
    where
        V: Into<Cow<'a, str>>,
    {
        EnvFilter::from_env_or(DEFAULT_FILTER_ENV, default)
    }

    /// Read directives from the variable `name`, or use `default` when it is not set.
    pub fn from_env_or<'a, 'b, E, V>(name: E, default: V) -> Self
    where
        E: Into<Cow<'a, str>>,
        V: Into<Cow<'b, str>>,
    {
        let name: Cow<str> = name.into();
        let default: Cow<str> = default.into();
        match std::env::var(&*name) {
            Ok(directives) => EnvFilter::from(directives.as_str()),
            Err(_) => EnvFilter::from(&*default),
        }
    }

    /// Initializes the filter from the [`EnvFilterBuilder`].
    pub fn new(mut builder: EnvFilterBuilder) -> Self {
        EnvFilter(builder.build())
    }
}

impl Filter for EnvFilter {
    fn enabled(&self, metadata: &Metadata) -> FilterResult {
        if self.0.enabled(metadata) {
            FilterResult::Neutral
        } else {
            FilterResult::Reject
        }
    }

    fn matches(&self, record: &Record) -> FilterResult {
        if self.0.matches(record) {
            FilterResult::Neutral
        } else {
            FilterResult::Reject
        }
    }
}

impl From<&str> for EnvFilter {
    fn from(directives: &str) -> Self {
        let mut builder = EnvFilterBuilder::new();
        builder.parse(directives);
        EnvFilter::new(builder)
    }
}

#[cfg(test)]
mod tests {
    use log::Level;
    use log::MetadataBuilder;

    use super::*;

    #[test]
    fn test_directives() {
        let filter = EnvFilter::from("warn,billing=debug");

        let billing = MetadataBuilder::new()
            .level(Level::Debug)
            .target("billing")
            .build();
        let other = MetadataBuilder::new()
            .level(Level::Info)
            .target("other")
            .build();

        assert_eq!(filter.enabled(&billing), FilterResult::Neutral);
        assert_eq!(filter.enabled(&other), FilterResult::Reject);
    }

    #[test]
    fn test_fallback_when_env_unset() {
        let filter = EnvFilter::from_env_or("LOGSWITCH_TEST_UNSET_VARIABLE", "error");
        let warn = MetadataBuilder::new().level(Level::Warn).build();
        assert_eq!(filter.enabled(&warn), FilterResult::Reject);
    }
}
