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

//! A process-wide switch shared by every filter that routes on it.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

/// A lock-free boolean shared by reference across filters and drivers.
///
/// Cloning a `SwitchFlag` yields another handle to the same cell; the cell lives as long as any
/// handle does. Reads and writes are single atomic operations, so no reader ever observes a
/// partially written value.
///
/// # Examples
///
/// ```
/// use logswitch::flag::SwitchFlag;
///
/// let flag = SwitchFlag::new(true);
/// let shared = flag.clone();
/// shared.toggle();
/// assert!(!flag.is_active());
/// ```
#[derive(Debug, Clone)]
pub struct SwitchFlag {
    active: Arc<AtomicBool>,
}

impl Default for SwitchFlag {
    fn default() -> Self {
        SwitchFlag::new(false)
    }
}

impl SwitchFlag {
    /// Create a new flag holding `initial`.
    pub fn new(initial: bool) -> Self {
        Self {
            active: Arc::new(AtomicBool::new(initial)),
        }
    }

    /// Return the current value.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Flip the current value.
    ///
    /// This is a load followed by a store, not a compare-and-swap: when two toggles race, the last
    /// store wins and the flag may end up flipped only once.
    pub fn toggle(&self) {
        self.set(!self.is_active());
    }

    /// Store `value` unconditionally.
    pub fn set(&self, value: bool) {
        self.active.store(value, Ordering::Release);
    }
}
