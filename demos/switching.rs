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

//! Route records between two timestamped log files by toggling a shared flag, then rotate the
//! first file while the program keeps logging.
//!
//! Files are written under `./logs/core1` and `./logs/core2`.

use std::time::Duration;

use log::LevelFilter;
use logswitch::Logger;
use logswitch::append::Dynamic;
use logswitch::append::DynamicSink;
use logswitch::append::FileHandle;
use logswitch::filter::ConditionalLevel;
use logswitch::flag::SwitchFlag;
use logswitch::layout::JsonLayout;

const CORE1_DIR: &str = "./logs/core1";
const CORE2_DIR: &str = "./logs/core2";

fn describe(sink: &DynamicSink) -> String {
    match sink.current_name() {
        Some(name) => format!("to {name}"),
        None => "but no file is set".to_string(),
    }
}

fn flush(logger: &Logger) {
    if let Err(err) = logger.try_flush() {
        eprintln!("{err}");
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // true routes to core1
    let flag = SwitchFlag::new(true);

    let sink1 = DynamicSink::new(FileHandle::timestamped(CORE1_DIR)?);
    let sink2 = DynamicSink::new(FileHandle::timestamped(CORE2_DIR)?);

    let logger = logswitch::builder()
        .dispatch(|d| {
            d.filter(ConditionalLevel::new(LevelFilter::Info, flag.clone(), true))
                .append(Dynamic::new(sink1.clone()).with_layout(JsonLayout::default()))
        })
        .dispatch(|d| {
            d.filter(ConditionalLevel::new(LevelFilter::Info, flag.clone(), false))
                .append(Dynamic::new(sink2.clone()).with_layout(JsonLayout::default()))
        })
        .max_level(LevelFilter::Info)
        .apply()?;

    for i in 0..15 {
        if i == 5 {
            flush(logger);
            flag.toggle();
            println!("Switched to core2 at log {i}, core1 logs synced {}", describe(&sink1));
        } else if i == 10 {
            flush(logger);
            flag.toggle();
            match sink1.rotate(|| FileHandle::timestamped(CORE1_DIR)) {
                Ok(()) => println!("Switched to core1 at log {i}, writing {}", describe(&sink1)),
                Err(err) => println!("Failed to switch file for core1 at log {i}: {err}"),
            }
        }

        std::thread::sleep(Duration::from_secs(1));
        log::info!(log = i; "Log entry");

        if flag.is_active() {
            println!("core1 wrote log {i} {}", describe(&sink1));
        } else {
            println!("core2 wrote log {i} {}", describe(&sink2));
        }
    }

    flush(logger);
    logger.close();
    println!("All logs synced and file handles closed");
    Ok(())
}
