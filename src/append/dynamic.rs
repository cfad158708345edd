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

use std::io;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;
use std::sync::RwLock;

use log::Record;

use crate::Error;
use crate::Layout;
use crate::append::Append;
use crate::append::Handle;
use crate::trap::DefaultTrap;
use crate::trap::Trap;

/// A thread-safe output whose underlying [`Handle`] can be replaced while the process runs.
///
/// Cloning a `DynamicSink` yields another reference to the same destination: the logger keeps
/// one clone inside a [`Dynamic`] appender, and an operator keeps another to rotate it.
///
/// Every operation takes the sink's lock for the duration of the call, so a write observes either
/// the old handle or the new one, never a half-swapped state. Distinct sinks never contend.
///
/// A sink may be unset. Writes and flushes on an unset sink succeed without effect, so records
/// logged while a rotation is in progress never fail the caller.
///
/// # Examples
///
/// ```
/// use logswitch::append::DynamicSink;
/// use logswitch::append::MemoryHandle;
///
/// let first = MemoryHandle::new("first");
/// let second = MemoryHandle::new("second");
///
/// let sink = DynamicSink::new(first.clone());
/// sink.write(b"abc").unwrap();
///
/// sink.swap(second.clone());
/// sink.write(b"xyz").unwrap();
///
/// assert_eq!(first.contents(), b"abc");
/// assert!(first.is_closed());
/// assert_eq!(second.contents(), b"xyz");
/// assert_eq!(sink.current_name().as_deref(), Some("second"));
/// ```
#[derive(Debug, Clone)]
pub struct DynamicSink {
    shared: Arc<Shared>,
}

#[derive(Debug)]
struct Shared {
    handle: Mutex<Option<Box<dyn Handle>>>,
    trap: RwLock<Arc<dyn Trap>>,
}

impl Default for DynamicSink {
    fn default() -> Self {
        DynamicSink::from_boxed(None)
    }
}

impl DynamicSink {
    /// Create a sink writing to `handle`.
    pub fn new(handle: impl Handle) -> Self {
        DynamicSink::from_boxed(Some(Box::new(handle)))
    }

    /// Create a sink with no handle installed.
    pub fn unset() -> Self {
        DynamicSink::default()
    }

    /// Create a sink from a possibly absent boxed handle.
    pub fn from_boxed(handle: Option<Box<dyn Handle>>) -> Self {
        Self {
            shared: Arc::new(Shared {
                handle: Mutex::new(handle),
                trap: RwLock::new(Arc::new(DefaultTrap::default())),
            }),
        }
    }

    /// Set the trap that receives errors from closing superseded handles.
    ///
    /// The trap belongs to the shared destination, so it applies to every clone of this sink,
    /// including clones made before this call.
    ///
    /// Default to [`DefaultTrap`].
    pub fn with_trap(self, trap: impl Trap) -> Self {
        self.set_trap(trap);
        self
    }

    /// Replace the trap of this sink and all of its clones.
    pub fn set_trap(&self, trap: impl Trap) {
        let mut current = self
            .shared
            .trap
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *current = Arc::new(trap);
    }

    /// Write `buf` to the current handle and return the handle's result verbatim.
    ///
    /// Return `Ok(0)` if no handle is installed.
    pub fn write(&self, buf: &[u8]) -> io::Result<usize> {
        match self.lock().as_mut() {
            Some(handle) => handle.write(buf),
            None => Ok(0),
        }
    }

    /// Write the whole of `buf` to the current handle within a single lock acquisition.
    ///
    /// Do nothing if no handle is installed.
    pub fn write_all(&self, buf: &[u8]) -> io::Result<()> {
        match self.lock().as_mut() {
            Some(handle) => handle.write_all(buf),
            None => Ok(()),
        }
    }

    /// Sync the current handle to its storage.
    ///
    /// Do nothing if no handle is installed.
    pub fn flush(&self) -> io::Result<()> {
        match self.lock().as_mut() {
            Some(handle) => handle.sync(),
            None => Ok(()),
        }
    }

    /// Close the current handle, if any, and install `handle`.
    pub fn swap(&self, handle: impl Handle) {
        self.replace(Some(Box::new(handle)));
    }

    /// Close the current handle, if any, and install `handle` even if it is `None`.
    ///
    /// A failure to close the superseded handle goes to the trap and does not prevent the
    /// replacement.
    pub fn replace(&self, handle: Option<Box<dyn Handle>>) {
        let mut current = self.lock();
        if let Some(previous) = current.take() {
            self.close_handle(previous);
        }
        *current = handle;
    }

    /// Open a new handle with `open` and swap it in.
    ///
    /// `open` runs without holding the lock. If it fails, the current handle stays installed and
    /// keeps receiving writes.
    pub fn rotate<H, F>(&self, open: F) -> Result<(), Error>
    where
        H: Handle,
        F: FnOnce() -> Result<H, Error>,
    {
        let handle = open()?;
        self.swap(handle);
        Ok(())
    }

    /// Close the current handle and leave the sink unset.
    ///
    /// Closing an unset sink is a no-op.
    pub fn close(&self) {
        self.replace(None);
    }

    /// The name of the current handle, or `None` if the sink is unset.
    pub fn current_name(&self) -> Option<String> {
        self.lock().as_ref().map(|handle| handle.name().into_owned())
    }

    fn close_handle(&self, handle: Box<dyn Handle>) {
        let name = handle.name().into_owned();
        if let Err(err) = handle.close() {
            let err = Error::new("failed to close log handle")
                .with_context("name", name)
                .with_source(err);
            let trap = self
                .shared
                .trap
                .read()
                .unwrap_or_else(PoisonError::into_inner);
            trap.trap(&err);
        }
    }

    // the guarded value is replaced whole, so a poisoned lock still holds a usable state
    fn lock(&self) -> MutexGuard<'_, Option<Box<dyn Handle>>> {
        self.shared
            .handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// An appender that formats records with a [`Layout`] and writes them to a [`DynamicSink`].
///
/// # Examples
///
/// ```
/// use log::LevelFilter;
/// use logswitch::append::Dynamic;
/// use logswitch::append::DynamicSink;
/// use logswitch::append::MemoryHandle;
/// use logswitch::layout::TextLayout;
///
/// let sink = DynamicSink::new(MemoryHandle::new("memory"));
/// let logger = logswitch::builder()
///     .dispatch(|d| {
///         d.filter(LevelFilter::Info)
///             .append(Dynamic::new(sink.clone()).with_layout(TextLayout::default()))
///     })
///     .build();
/// ```
#[derive(Debug)]
pub struct Dynamic {
    sink: DynamicSink,
    layout: Box<dyn Layout>,
}

impl Dynamic {
    /// Create a new appender writing to `sink`.
    ///
    /// The layout defaults to [`JsonLayout`] with the `layout-json` feature, [`TextLayout`]
    /// without color otherwise.
    ///
    /// [`JsonLayout`]: crate::layout::JsonLayout
    /// [`TextLayout`]: crate::layout::TextLayout
    pub fn new(sink: DynamicSink) -> Self {
        Self {
            sink,
            layout: default_layout(),
        }
    }

    /// Set the layout for the [`Dynamic`] appender.
    pub fn with_layout(mut self, layout: impl Into<Box<dyn Layout>>) -> Self {
        self.layout = layout.into();
        self
    }

    /// The sink this appender writes to.
    pub fn sink(&self) -> &DynamicSink {
        &self.sink
    }
}

#[cfg(feature = "layout-json")]
fn default_layout() -> Box<dyn Layout> {
    Box::new(crate::layout::JsonLayout::default())
}

#[cfg(not(feature = "layout-json"))]
fn default_layout() -> Box<dyn Layout> {
    Box::new(crate::layout::TextLayout::default().no_color())
}

impl Append for Dynamic {
    fn append(&self, record: &Record) -> Result<(), Error> {
        let mut bytes = self.layout.format(record)?;
        bytes.push(b'\n');
        self.sink.write_all(&bytes).map_err(Error::from_io_error)
    }

    fn flush(&self) -> Result<(), Error> {
        self.sink.flush().map_err(Error::from_io_error)
    }

    fn close(&self) {
        self.sink.close();
    }
}
