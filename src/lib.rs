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

//! Logswitch routes log records between output destinations by the value of a shared flag, and
//! lets each destination swap its underlying file while the process is running.
//!
//! # Overview
//!
//! A [`Logger`] holds dispatches, each a group of [filters][Filter] and [appenders][Append]. A
//! [`ConditionalLevel`] filter admits records only while a [`SwitchFlag`] holds a given value, so
//! flipping one flag redirects live traffic from one dispatch to another. A [`Dynamic`] appender
//! writes to a [`DynamicSink`], whose handle can be swapped for log rotation without losing writes
//! or leaking the previous handle.
//!
//! # Examples
//!
//! ```
//! use log::LevelFilter;
//! use log::Log;
//! use logswitch::append::Dynamic;
//! use logswitch::append::DynamicSink;
//! use logswitch::append::MemoryHandle;
//! use logswitch::filter::ConditionalLevel;
//! use logswitch::flag::SwitchFlag;
//!
//! let flag = SwitchFlag::new(true);
//! let primary = MemoryHandle::new("primary");
//! let standby = MemoryHandle::new("standby");
//!
//! let logger = logswitch::builder()
//!     .dispatch(|d| {
//!         d.filter(ConditionalLevel::new(LevelFilter::Info, flag.clone(), true))
//!             .append(Dynamic::new(DynamicSink::new(primary.clone())))
//!     })
//!     .dispatch(|d| {
//!         d.filter(ConditionalLevel::new(LevelFilter::Info, flag.clone(), false))
//!             .append(Dynamic::new(DynamicSink::new(standby.clone())))
//!     })
//!     .build();
//!
//! let record = log::Record::builder()
//!     .level(log::Level::Info)
//!     .args(format_args!("Log entry"))
//!     .build();
//!
//! logger.log(&record);
//! flag.toggle();
//! logger.log(&record);
//! logger.close();
//!
//! assert_eq!(primary.contents_string().lines().count(), 1);
//! assert_eq!(standby.contents_string().lines().count(), 1);
//! ```
//!
//! [`ConditionalLevel`]: filter::ConditionalLevel
//! [`SwitchFlag`]: flag::SwitchFlag
//! [`Dynamic`]: append::Dynamic
//! [`DynamicSink`]: append::DynamicSink

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod append;
pub mod filter;
pub mod flag;
pub mod layout;
pub mod trap;

mod error;
pub use self::error::Error;

pub use self::append::Append;
pub use self::filter::Filter;
pub use self::layout::Layout;

mod logger;
pub use self::logger::*;
