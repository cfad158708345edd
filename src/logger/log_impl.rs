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

use log::Metadata;
use log::Record;

use crate::Append;
use crate::Error;
use crate::Filter;
use crate::filter::FilterResult;
use crate::trap::Trap;

/// A logger facade that dispatches log records to one or more dispatches.
///
/// Each record is offered to every dispatch. A dispatch whose filters pass hands the record to
/// its appenders; there is no stored "current" dispatch, so a filter change such as toggling a
/// [`SwitchFlag`] takes effect on the very next record.
///
/// Dispatches are evaluated one after another and each one reads shared state afresh. When a
/// [`SwitchFlag`] is toggled while a record is between two dispatches, that record may reach
/// both of them or neither. Once the flag is stable, exactly the matching dispatches receive
/// each record.
///
/// This struct implements [`log::Log`] to bridge logswitch with the [`log`] crate.
///
/// [`SwitchFlag`]: crate::flag::SwitchFlag
#[derive(Debug)]
pub struct Logger {
    dispatches: Vec<Dispatch>,
    trap: Box<dyn Trap>,
}

impl Logger {
    pub(super) fn new(dispatches: Vec<Dispatch>, trap: Box<dyn Trap>) -> Self {
        Self { dispatches, trap }
    }

    /// Flush every appender of every dispatch.
    ///
    /// A failing appender does not stop the others from being flushed.
    ///
    /// # Errors
    ///
    /// Return one error carrying every flush failure as a source.
    pub fn try_flush(&self) -> Result<(), Error> {
        let mut failures = vec![];
        for dispatch in &self.dispatches {
            dispatch.flush(&mut failures);
        }

        if failures.is_empty() {
            return Ok(());
        }

        let err = failures.into_iter().fold(
            Error::new("failed to flush appenders"),
            |err, failure| err.with_source(failure),
        );
        Err(err)
    }

    /// Close every appender of every dispatch.
    ///
    /// Closing is idempotent; appenders that are already closed are left as they are.
    pub fn close(&self) {
        for dispatch in &self.dispatches {
            dispatch.close();
        }
    }
}

impl log::Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        self.dispatches
            .iter()
            .any(|dispatch| dispatch.enabled(metadata))
    }

    fn log(&self, record: &Record) {
        for (i, dispatch) in self.dispatches.iter().enumerate() {
            if let Err(err) = dispatch.log(record) {
                let err = err
                    .with_context("dispatch", i)
                    .with_context("message", record.args());
                self.trap.trap(&err);
            }
        }
    }

    fn flush(&self) {
        if let Err(err) = self.try_flush() {
            self.trap.trap(&err);
        }
    }
}

/// A grouped set of filters and appenders.
///
/// `filters` determine whether a log record should be passed to the appenders.
/// `appends` write log records to a destination.
#[derive(Debug)]
pub(super) struct Dispatch {
    filters: Vec<Box<dyn Filter>>,
    appends: Vec<Box<dyn Append>>,
}

impl Dispatch {
    pub(super) fn new(filters: Vec<Box<dyn Filter>>, appends: Vec<Box<dyn Append>>) -> Self {
        debug_assert!(
            !appends.is_empty(),
            "A Dispatch must have at least one append"
        );

        Self { filters, appends }
    }

    fn enabled(&self, metadata: &Metadata) -> bool {
        for filter in &self.filters {
            match filter.enabled(metadata) {
                FilterResult::Reject => return false,
                FilterResult::Accept => return true,
                FilterResult::Neutral => {}
            }
        }

        true
    }

    fn log(&self, record: &Record) -> Result<(), Error> {
        for filter in &self.filters {
            match filter.matches(record) {
                FilterResult::Reject => return Ok(()),
                FilterResult::Accept => break,
                FilterResult::Neutral => {}
            }
        }

        let mut failures = vec![];
        for append in &self.appends {
            if let Err(err) = append.append(record) {
                failures.push(err);
            }
        }

        match failures.len() {
            0 => Ok(()),
            1 => Err(failures.remove(0)),
            _ => Err(failures.into_iter().fold(
                Error::new("failed to append record"),
                |err, failure| err.with_source(failure),
            )),
        }
    }

    fn flush(&self, failures: &mut Vec<Error>) {
        for append in &self.appends {
            if let Err(err) = append.flush() {
                failures.push(err);
            }
        }
    }

    fn close(&self) {
        for append in &self.appends {
            append.close();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::Mutex;

    use log::Level;
    use log::LevelFilter;
    use log::Log;

    use super::*;
    use crate::append::Dynamic;
    use crate::append::DynamicSink;
    use crate::append::MemoryHandle;
    use crate::filter::ConditionalLevel;
    use crate::flag::SwitchFlag;
    use crate::layout::Layout;

    #[derive(Debug, Clone, Default)]
    struct CollectingTrap {
        errors: Arc<Mutex<Vec<String>>>,
    }

    impl Trap for CollectingTrap {
        fn trap(&self, err: &Error) {
            self.errors.lock().unwrap().push(err.to_string());
        }
    }

    #[derive(Debug)]
    struct MessageLayout;

    impl Layout for MessageLayout {
        fn format(&self, record: &Record) -> Result<Vec<u8>, Error> {
            Ok(record.args().to_string().into_bytes())
        }
    }

    #[derive(Debug)]
    struct FailingAppend;

    impl Append for FailingAppend {
        fn append(&self, _: &Record) -> Result<(), Error> {
            Err(Error::new("append failed"))
        }

        fn flush(&self) -> Result<(), Error> {
            Err(Error::new("flush failed"))
        }
    }

    fn log_info(logger: &Logger, message: &str) {
        logger.log(
            &Record::builder()
                .level(Level::Info)
                .args(format_args!("{message}"))
                .build(),
        );
    }

    struct Routed {
        flag: SwitchFlag,
        first: MemoryHandle,
        second: MemoryHandle,
        trap: CollectingTrap,
        logger: Logger,
    }

    fn routed() -> Routed {
        let flag = SwitchFlag::new(true);
        let first = MemoryHandle::new("first");
        let second = MemoryHandle::new("second");
        let trap = CollectingTrap::default();

        let logger = crate::builder()
            .dispatch(|d| {
                d.filter(ConditionalLevel::new(LevelFilter::Info, flag.clone(), true))
                    .append(Dynamic::new(DynamicSink::new(first.clone())).with_layout(MessageLayout))
            })
            .dispatch(|d| {
                d.filter(ConditionalLevel::new(LevelFilter::Info, flag.clone(), false))
                    .append(
                        Dynamic::new(DynamicSink::new(second.clone())).with_layout(MessageLayout),
                    )
            })
            .trap(trap.clone())
            .build();

        Routed {
            flag,
            first,
            second,
            trap,
            logger,
        }
    }

    #[test]
    fn test_toggle_redirects_next_record() {
        let routed = routed();

        log_info(&routed.logger, "one");
        assert_eq!(routed.first.contents_string(), "one\n");
        assert_eq!(routed.second.contents_string(), "");

        routed.flag.toggle();
        log_info(&routed.logger, "one");
        assert_eq!(routed.first.contents_string(), "one\n");
        assert_eq!(routed.second.contents_string(), "one\n");

        routed.flag.toggle();
        log_info(&routed.logger, "two");
        assert_eq!(routed.first.contents_string(), "one\ntwo\n");
        assert_eq!(routed.second.contents_string(), "one\n");
        assert!(routed.trap.errors.lock().unwrap().is_empty());
    }

    #[test]
    fn test_below_threshold_reaches_no_dispatch() {
        let routed = routed();
        routed.logger.log(
            &Record::builder()
                .level(Level::Debug)
                .args(format_args!("hidden"))
                .build(),
        );

        assert!(routed.first.contents().is_empty());
        assert!(routed.second.contents().is_empty());
        assert!(
            !routed
                .logger
                .enabled(&log::MetadataBuilder::new().level(Level::Debug).build())
        );
        assert!(
            routed
                .logger
                .enabled(&log::MetadataBuilder::new().level(Level::Warn).build())
        );
    }

    #[test]
    fn test_failing_dispatch_does_not_block_others() {
        let handle = MemoryHandle::new("healthy");
        let trap = CollectingTrap::default();

        let logger = crate::builder()
            .dispatch(|d| d.filter(LevelFilter::Info).append(FailingAppend))
            .dispatch(|d| {
                d.filter(LevelFilter::Info)
                    .append(FailingAppend)
                    .append(Dynamic::new(DynamicSink::new(handle.clone())).with_layout(MessageLayout))
            })
            .trap(trap.clone())
            .build();

        log_info(&logger, "delivered");

        assert_eq!(handle.contents_string(), "delivered\n");
        let errors = trap.errors.lock().unwrap();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("dispatch: 0"), "{}", errors[0]);
        assert!(errors[1].contains("dispatch: 1"), "{}", errors[1]);
    }

    #[test]
    fn test_flush_collects_every_failure() {
        let handle = MemoryHandle::new("healthy");
        let logger = crate::builder()
            .dispatch(|d| d.append(FailingAppend))
            .dispatch(|d| d.append(Dynamic::new(DynamicSink::new(handle.clone()))))
            .dispatch(|d| d.append(FailingAppend))
            .trap(CollectingTrap::default())
            .build();

        let err = logger.try_flush().unwrap_err();
        assert_eq!(err.sources().len(), 2);
        assert!(err.to_string().contains("flush failed"));
    }

    #[test]
    fn test_flush_trapped_through_log_facade() {
        let trap = CollectingTrap::default();
        let logger = crate::builder()
            .dispatch(|d| d.append(FailingAppend))
            .trap(trap.clone())
            .build();

        logger.flush();
        assert_eq!(trap.errors.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_close_every_sink_once() {
        let routed = routed();
        routed.logger.try_flush().unwrap();

        routed.logger.close();
        assert!(routed.first.is_closed());
        assert!(routed.second.is_closed());

        routed.logger.close();
        log_info(&routed.logger, "after close");
        routed.logger.try_flush().unwrap();

        assert!(routed.first.contents().is_empty());
        assert!(routed.trap.errors.lock().unwrap().is_empty());
    }
}
