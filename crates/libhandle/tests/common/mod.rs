//! Shared test helpers: a counting loader double and a log capture.

#![allow(dead_code)]

use std::collections::HashSet;
use std::ffi::{c_void, OsStr};
use std::io;
use std::sync::Arc;

use libhandle::{BindMode, Loader, NativeError};
use parking_lot::Mutex;
use tracing_subscriber::fmt::MakeWriter;

pub extern "C" fn add(a: i32, b: i32) -> i32 {
    a + b
}

pub extern "C" fn negate(a: i32) -> i32 {
    -a
}

/// What the double has seen and how it should misbehave.
#[derive(Debug, Default)]
pub struct LoaderState {
    pub opens: usize,
    pub closes: usize,
    pub resolves: usize,
    pub opened_paths: Vec<String>,
    pub bind_modes: Vec<BindMode>,
    pub live: HashSet<usize>,
    pub next_handle: usize,
    /// Paths that fail to open.
    pub missing: HashSet<String>,
    pub fail_close: bool,
}

/// In-memory [`Loader`] that exports `add` and `negate` and counts calls.
#[derive(Debug, Clone, Default)]
pub struct CountingLoader {
    pub state: Arc<Mutex<LoaderState>>,
}

impl CountingLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_missing(path: &str) -> Self {
        let loader = Self::new();
        loader.state.lock().missing.insert(path.to_string());
        loader
    }

    pub fn opens(&self) -> usize {
        self.state.lock().opens
    }

    pub fn closes(&self) -> usize {
        self.state.lock().closes
    }

    pub fn live_handles(&self) -> usize {
        self.state.lock().live.len()
    }
}

impl Loader for CountingLoader {
    type Handle = usize;

    fn open(&self, path: &OsStr, mode: BindMode) -> Result<usize, NativeError> {
        let mut state = self.state.lock();
        let path = path.to_string_lossy().into_owned();
        state.opens += 1;
        state.opened_paths.push(path.clone());
        state.bind_modes.push(mode);

        if state.missing.contains(&path) {
            return Err(NativeError::new(format!(
                "{}: cannot open shared object file: No such file or directory",
                path
            )));
        }

        state.next_handle += 1;
        let handle = 0x1000 * state.next_handle;
        state.live.insert(handle);
        Ok(handle)
    }

    fn close(&self, handle: usize) -> Result<(), NativeError> {
        let mut state = self.state.lock();
        state.closes += 1;

        if !state.live.remove(&handle) {
            return Err(NativeError::new("invalid handle"));
        }
        if state.fail_close {
            return Err(NativeError::new("close refused"));
        }
        Ok(())
    }

    fn resolve(&self, handle: &usize, symbol: &str) -> Result<*mut c_void, NativeError> {
        let mut state = self.state.lock();
        state.resolves += 1;

        if !state.live.contains(handle) {
            return Err(NativeError::new("invalid handle"));
        }

        match symbol {
            "add" => Ok(add as *mut c_void),
            "negate" => Ok(negate as *mut c_void),
            "null_export" => Ok(std::ptr::null_mut()),
            other => Err(NativeError::new(format!("undefined symbol: {}", other))),
        }
    }

    fn address(handle: &usize) -> usize {
        *handle
    }
}

/// Collects formatted log output in memory.
#[derive(Debug, Clone, Default)]
pub struct CapturedLogs {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl CapturedLogs {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buffer.lock()).into_owned()
    }
}

pub struct CapturedWriter {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl io::Write for CapturedWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedWriter;

    fn make_writer(&'a self) -> Self::Writer {
        CapturedWriter {
            buffer: self.buffer.clone(),
        }
    }
}

/// Run `f` with a subscriber that writes every event into the returned
/// capture.
pub fn capture_logs<F: FnOnce()>(f: F) -> CapturedLogs {
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(logs.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::TRACE)
        .finish();

    tracing::subscriber::with_default(subscriber, f);
    logs
}
