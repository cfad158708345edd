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

use log::LevelFilter;

use crate::Append;
use crate::Filter;
use crate::Logger;
use crate::logger::log_impl::Dispatch;
use crate::trap::DefaultTrap;
use crate::trap::Trap;

/// Create a new empty [`LoggerBuilder`] instance for configuring log dispatching.
///
/// # Examples
///
/// ```
/// use log::LevelFilter;
/// use logswitch::append::Dynamic;
/// use logswitch::append::DynamicSink;
/// use logswitch::append::MemoryHandle;
/// use logswitch::filter::ConditionalLevel;
/// use logswitch::flag::SwitchFlag;
///
/// let flag = SwitchFlag::new(true);
/// let primary = DynamicSink::new(MemoryHandle::new("primary"));
/// let standby = DynamicSink::new(MemoryHandle::new("standby"));
///
/// let logger = logswitch::builder()
///     .dispatch(|d| {
///         d.filter(ConditionalLevel::new(LevelFilter::Info, flag.clone(), true))
///             .append(Dynamic::new(primary.clone()))
///     })
///     .dispatch(|d| {
///         d.filter(ConditionalLevel::new(LevelFilter::Info, flag.clone(), false))
///             .append(Dynamic::new(standby.clone()))
///     })
///     .build();
/// ```
pub fn builder() -> LoggerBuilder {
    LoggerBuilder {
        dispatches: vec![],
        trap: Box::new(DefaultTrap::default()),
        max_level: LevelFilter::Trace,
    }
}

/// A builder for configuring log dispatching and setting up the global logger.
#[must_use = "call `apply` to set the global logger or `build` to construct a logger instance"]
#[derive(Debug)]
pub struct LoggerBuilder {
    // stashed dispatches
    dispatches: Vec<Dispatch>,
    trap: Box<dyn Trap>,

    // default to trace - we need this because the global default is OFF
    max_level: LevelFilter,
}

impl LoggerBuilder {
    /// Register a new dispatch with the [`LoggerBuilder`].
    ///
    /// Every dispatch sees every record; dispatches are evaluated independently of each other.
    pub fn dispatch<F>(mut self, f: F) -> Self
    where
        F: FnOnce(DispatchBuilder<false>) -> DispatchBuilder<true>,
    {
        self.dispatches.push(f(DispatchBuilder::new()).build());
        self
    }

    /// Set the trap for errors raised while logging or flushing through [`log::Log`].
    ///
    /// Default to [`DefaultTrap`].
    pub fn trap(mut self, trap: impl Into<Box<dyn Trap>>) -> Self {
        self.trap = trap.into();
        self
    }

    /// Set the global maximum log level.
    ///
    /// This will be passed to [`log::set_max_level`] on [`LoggerBuilder::apply`].
    pub fn max_level(mut self, max_level: LevelFilter) -> Self {
        self.max_level = max_level;
        self
    }

    /// Build the [`Logger`].
    ///
    /// # Examples
    ///
    /// ```
    /// use log::Log;
    ///
    /// let l = logswitch::builder().build();
    /// l.log(&log::Record::builder().args(format_args!("hello world!")).build());
    /// ```
    pub fn build(self) -> Logger {
        Logger::new(self.dispatches, self.trap)
    }

    /// Set up the global logger with all the configured dispatches.
    ///
    /// This should be called early in the execution of a Rust program. Any log events that occur
    /// before initialization will be ignored. The returned reference stays valid for the rest of
    /// the program and can be used to flush or close the installed logger.
    ///
    /// # Errors
    ///
    /// Return an error if a global logger has already been set.
    pub fn apply(self) -> Result<&'static Logger, log::SetLoggerError> {
        let max_level = self.max_level;
        let logger: &'static Logger = Box::leak(Box::new(self.build()));
        log::set_logger(logger)?;
        log::set_max_level(max_level);
        Ok(logger)
    }
}

/// A builder for configuring a log dispatch, including filters and appenders.
///
/// # Examples
///
/// ```
/// use log::LevelFilter;
/// use logswitch::append::Dynamic;
/// use logswitch::append::DynamicSink;
///
/// logswitch::builder()
///     .dispatch(|d| {
///         d.filter(LevelFilter::Error)
///             .append(Dynamic::new(DynamicSink::unset()))
///     })
///     .build();
/// ```
#[derive(Debug)]
pub struct DispatchBuilder<const APPEND: bool> {
    filters: Vec<Box<dyn Filter>>,
    appends: Vec<Box<dyn Append>>,
}

impl DispatchBuilder<false> {
    fn new() -> Self {
        DispatchBuilder {
            filters: vec![],
            appends: vec![],
        }
    }

    /// Add a filter to this dispatch.
    ///
    /// Filters run in the order they were added. The first `Reject` drops the record, the first
    /// `Accept` skips the remaining filters.
    pub fn filter(mut self, filter: impl Into<Box<dyn Filter>>) -> Self {
        self.filters.push(filter.into());
        self
    }
}

impl DispatchBuilder<true> {
    fn build(self) -> Dispatch {
        Dispatch::new(self.filters, self.appends)
    }
}

impl<const APPEND: bool> DispatchBuilder<APPEND> {
    /// Add an appender to this dispatch.
    pub fn append(mut self, append: impl Into<Box<dyn Append>>) -> DispatchBuilder<true> {
        self.appends.push(append.into());
        DispatchBuilder {
            filters: self.filters,
            appends: self.appends,
        }
    }
}
