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

//! Records logged while the flag is toggled concurrently.
//!
//! Each dispatch reads the flag on its own, so a record whose evaluation straddles a toggle may
//! reach both sinks or neither. The number of such records is bounded by the number of toggles,
//! and delivery is exact again once the flag stops changing.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::thread;
use std::time::Duration;

use log::Level;
use log::LevelFilter;
use log::Log;
use log::Record;
use logswitch::Error;
use logswitch::Layout;
use logswitch::Logger;
use logswitch::append::Dynamic;
use logswitch::append::DynamicSink;
use logswitch::append::MemoryHandle;
use logswitch::filter::ConditionalLevel;
use logswitch::flag::SwitchFlag;
use rand::Rng;

#[derive(Debug)]
struct MessageLayout;

impl Layout for MessageLayout {
    fn format(&self, record: &Record) -> Result<Vec<u8>, Error> {
        Ok(record.args().to_string().into_bytes())
    }
}

fn routed_logger(flag: &SwitchFlag, first: &MemoryHandle, second: &MemoryHandle) -> Logger {
    logswitch::builder()
        .dispatch(|d| {
            d.filter(ConditionalLevel::new(LevelFilter::Info, flag.clone(), true))
                .append(Dynamic::new(DynamicSink::new(first.clone())).with_layout(MessageLayout))
        })
        .dispatch(|d| {
            d.filter(ConditionalLevel::new(LevelFilter::Info, flag.clone(), false))
                .append(Dynamic::new(DynamicSink::new(second.clone())).with_layout(MessageLayout))
        })
        .build()
}

fn log_index(logger: &Logger, i: usize) {
    logger.log(
        &Record::builder()
            .level(Level::Info)
            .args(format_args!("{i}"))
            .build(),
    );
}

fn deliveries(handles: &[&MemoryHandle]) -> HashMap<usize, usize> {
    let mut counts = HashMap::new();
    for handle in handles {
        for line in handle.contents_string().lines() {
            let i = line.parse::<usize>().unwrap();
            *counts.entry(i).or_insert(0) += 1;
        }
    }
    counts
}

#[test]
fn test_straddling_records_bounded_by_toggles() {
    const RECORDS: usize = 20_000;

    let flag = SwitchFlag::new(true);
    let first = MemoryHandle::new("first");
    let second = MemoryHandle::new("second");
    let logger = routed_logger(&flag, &first, &second);

    let done = Arc::new(AtomicBool::new(false));
    let toggler = {
        let flag = flag.clone();
        let done = done.clone();
        thread::spawn(move || {
            let mut rng = rand::rng();
            let mut toggles = 0;
            while !done.load(Ordering::Acquire) {
                flag.toggle();
                toggles += 1;
                thread::sleep(Duration::from_micros(rng.random_range(0..50)));
            }
            toggles
        })
    };

    for i in 0..RECORDS {
        log_index(&logger, i);
    }
    done.store(true, Ordering::Release);
    let toggles = toggler.join().unwrap();

    let counts = deliveries(&[&first, &second]);
    let duplicated = counts.values().filter(|&&n| n > 1).count();
    let lost = RECORDS - counts.len();

    assert!(counts.values().all(|&n| n <= 2));
    assert!(
        duplicated + lost <= toggles,
        "duplicated={duplicated} lost={lost} toggles={toggles}"
    );
}

#[test]
fn test_stable_flag_delivers_exactly_once() {
    const RECORDS: usize = 1_000;

    let flag = SwitchFlag::new(false);
    let first = MemoryHandle::new("first");
    let second = MemoryHandle::new("second");
    let logger = routed_logger(&flag, &first, &second);

    thread::scope(|s| {
        for t in 0..4 {
            let logger = &logger;
            s.spawn(move || {
                for i in 0..RECORDS {
                    log_index(logger, t * RECORDS + i);
                }
            });
        }
    });

    assert!(first.contents().is_empty());
    let counts = deliveries(&[&first, &second]);
    assert_eq!(counts.len(), 4 * RECORDS);
    assert!(counts.values().all(|&n| n == 1));
}
