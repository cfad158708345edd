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
use std::fmt;
use std::fs;
use std::fs::File;
use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;

use jiff::Zoned;

use crate::Error;

const TIMESTAMPED_FILENAME_FORMAT: &str = "%Y_%m_%d_%H_%M_%S";

/// An open, writable destination that a [`DynamicSink`] can install.
///
/// Anything that accepts bytes and can be flushed may act as a handle: files, sockets, or
/// in-memory buffers for tests.
///
/// [`DynamicSink`]: crate::append::DynamicSink
pub trait Handle: io::Write + fmt::Debug + Send + 'static {
    /// A human-readable name for the destination, such as a file path.
    fn name(&self) -> Cow<'_, str>;

    /// Push buffered bytes down to durable storage.
    ///
    /// Default to [`io::Write::flush`].
    fn sync(&mut self) -> io::Result<()> {
        self.flush()
    }

    /// Release the destination.
    ///
    /// Default to flushing, then dropping the handle.
    fn close(mut self: Box<Self>) -> io::Result<()> {
        self.flush()
    }
}

/// A file opened for appending.
#[derive(Debug)]
pub struct FileHandle {
    path: PathBuf,
    file: File,
}

impl FileHandle {
    /// Open `path` for appending, creating the file and its parent directory if needed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, Error> {
        let path = path.into();
        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|err| {
                Error::new("failed to create log directory")
                    .with_context("dir", dir.display())
                    .with_source(err)
            })?;
        }

        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&path)
            .map_err(|err| {
                Error::new("failed to create log file")
                    .with_context("path", path.display())
                    .with_source(err)
            })?;
        Ok(Self { path, file })
    }

    /// Open a file in `dir` named after the current local time, like `2024_08_11_22_44_57.log`.
    pub fn timestamped(dir: impl AsRef<Path>) -> Result<Self, Error> {
        let filename = format!("{}.log", Zoned::now().strftime(TIMESTAMPED_FILENAME_FORMAT));
        FileHandle::open(dir.as_ref().join(filename))
    }

    /// The path this handle was opened with.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Write for FileHandle {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

impl Handle for FileHandle {
    fn name(&self) -> Cow<'_, str> {
        self.path.to_string_lossy()
    }

    fn sync(&mut self) -> io::Result<()> {
        self.file.flush()?;
        self.file.sync_all()
    }

    fn close(mut self: Box<Self>) -> io::Result<()> {
        self.sync()
    }
}

/// An in-memory handle.
///
/// Clones share the same buffer, so a test can keep one clone to inspect what a sink wrote after
/// handing the other to the sink.
///
/// # Examples
///
/// ```
/// use logswitch::append::DynamicSink;
/// use logswitch::append::MemoryHandle;
///
/// let handle = MemoryHandle::new("memory");
/// let sink = DynamicSink::new(handle.clone());
/// assert_eq!(sink.write(b"abc").unwrap(), 3);
///
/// sink.close();
/// assert_eq!(handle.contents(), b"abc");
/// assert!(handle.is_closed());
/// ```
#[derive(Debug, Clone)]
pub struct MemoryHandle {
    name: String,
    state: Arc<Mutex<MemoryState>>,
}

#[derive(Debug, Default)]
struct MemoryState {
    buf: Vec<u8>,
    closed: bool,
}

impl MemoryHandle {
    /// Create an empty handle with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: Arc::new(Mutex::new(MemoryState::default())),
        }
    }

    /// A copy of every byte written so far.
    pub fn contents(&self) -> Vec<u8> {
        self.state().buf.clone()
    }

    /// Every byte written so far, decoded lossily as UTF-8.
    pub fn contents_string(&self) -> String {
        String::from_utf8_lossy(&self.state().buf).into_owned()
    }

    /// Whether the handle has been closed.
    pub fn is_closed(&self) -> bool {
        self.state().closed
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Write for MemoryHandle {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut state = self.state();
        if state.closed {
            return Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                format!("{} is closed", self.name),
            ));
        }
        state.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Handle for MemoryHandle {
    fn name(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.name)
    }

    fn close(self: Box<Self>) -> io::Result<()> {
        self.state().closed = true;
        Ok(())
    }
}
