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

use log::Level;
use log::LevelFilter;
use log::Metadata;

use crate::filter::Filter;
use crate::filter::FilterResult;
use crate::flag::SwitchFlag;

/// A filter that admits records only while a [`SwitchFlag`] holds the desired value.
///
/// A record passes when its level is at least as severe as the threshold *and* the flag
/// currently equals `desired`. The flag is re-read on every check and never cached, so toggling
/// it redirects the very next record without rebuilding any dispatch.
///
/// Two dispatches routing on the same flag each read it separately. If the flag is toggled
/// between those two reads, one record may be admitted by both dispatches or by neither.
///
/// # Examples
///
/// ```
/// use log::Level;
/// use log::LevelFilter;
/// use logswitch::filter::ConditionalLevel;
/// use logswitch::flag::SwitchFlag;
///
/// let flag = SwitchFlag::new(true);
/// let primary = ConditionalLevel::new(LevelFilter::Info, flag.clone(), true);
/// let standby = ConditionalLevel::new(LevelFilter::Info, flag.clone(), false);
///
/// assert!(primary.admits(Level::Info));
/// assert!(!standby.admits(Level::Info));
///
/// flag.toggle();
/// assert!(!primary.admits(Level::Info));
/// assert!(standby.admits(Level::Info));
/// ```
#[derive(Debug, Clone)]
pub struct ConditionalLevel {
    level: LevelFilter,
    flag: SwitchFlag,
    desired: bool,
}

impl ConditionalLevel {
    /// Create a new filter with the given threshold, flag, and the flag value it requires.
    pub fn new(level: LevelFilter, flag: SwitchFlag, desired: bool) -> Self {
        Self {
            level,
            flag,
            desired,
        }
    }

    /// Return whether a record at `level` is currently admitted.
    pub fn admits(&self, level: Level) -> bool {
        level <= self.level && self.flag.is_active() == self.desired
    }
}

impl Filter for ConditionalLevel {
    fn enabled(&self, metadata: &Metadata) -> FilterResult {
        if self.admits(metadata.level()) {
            FilterResult::Neutral
        } else {
            FilterResult::Reject
        }
    }
}

#[cfg(test)]
mod tests {
    use log::MetadataBuilder;

    use super::*;

    const LEVELS: [Level; 5] = [
        Level::Error,
        Level::Warn,
        Level::Info,
        Level::Debug,
        Level::Trace,
    ];

    #[test]
    fn test_admits_requires_level_and_flag() {
        let flag = SwitchFlag::new(true);
        for desired in [true, false] {
            let filter = ConditionalLevel::new(LevelFilter::Info, flag.clone(), desired);
            for active in [true, false] {
                flag.set(active);
                for level in LEVELS {
                    let expected = level <= Level::Info && active == desired;
                    assert_eq!(filter.admits(level), expected, "{level} {active} {desired}");
                }
            }
        }
    }

    #[test]
    fn test_less_severe_levels_always_rejected() {
        let flag = SwitchFlag::new(false);
        let filter = ConditionalLevel::new(LevelFilter::Warn, flag.clone(), false);
        for active in [true, false] {
            flag.set(active);
            assert!(!filter.admits(Level::Info));
            assert!(!filter.admits(Level::Debug));
            assert!(!filter.admits(Level::Trace));
        }
    }

    #[test]
    fn test_filter_result() {
        let flag = SwitchFlag::new(true);
        let filter = ConditionalLevel::new(LevelFilter::Info, flag.clone(), true);
        let info = MetadataBuilder::new().level(Level::Info).build();

        assert_eq!(filter.enabled(&info), FilterResult::Neutral);
        flag.toggle();
        assert_eq!(filter.enabled(&info), FilterResult::Reject);
    }
}
