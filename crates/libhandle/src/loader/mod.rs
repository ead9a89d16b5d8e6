//! The platform loader capability.
//!
//! [`Loader`] is the whole surface the crate needs from the operating
//! system: open a file, close a handle, resolve a symbol. [`NativeLoader`] is
//! the implementation for the build target; tests substitute their own.

use std::ffi::{c_void, OsStr};
use std::ptr::NonNull;

use crate::config::BindMode;
use crate::error::NativeError;

#[cfg(unix)]
mod unix;
#[cfg(windows)]
mod windows;

/// Dynamic-loading primitives of one platform.
///
/// Each call reports its own failure. Implementations must not let an
/// error left over from an earlier call fail a later one.
pub trait Loader {
    /// Native handle of an open library.
    type Handle;

    /// Open the library at `path`.
    fn open(&self, path: &OsStr, mode: BindMode) -> Result<Self::Handle, NativeError>;

    /// Release a handle returned by [`open`](Loader::open).
    fn close(&self, handle: Self::Handle) -> Result<(), NativeError>;

    /// Address of the exported `symbol`. A null address is returned as is.
    fn resolve(&self, handle: &Self::Handle, symbol: &str) -> Result<*mut c_void, NativeError>;

    /// Numeric value of a handle, for diagnostics.
    fn address(handle: &Self::Handle) -> usize;
}

/// Non-null handle returned by the operating system loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RawHandle(NonNull<c_void>);

impl RawHandle {
    /// Wrap a raw handle; `None` if it is null.
    pub fn new(ptr: *mut c_void) -> Option<Self> {
        NonNull::new(ptr).map(Self)
    }

    pub fn as_ptr(&self) -> *mut c_void {
        self.0.as_ptr()
    }
}

// Loader handles are process-wide and not tied to the opening thread.
unsafe impl Send for RawHandle {}

/// [`Loader`] backed by the operating system (`dlopen` family on Unix,
/// `LoadLibraryExW` family on Windows).
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeLoader;
