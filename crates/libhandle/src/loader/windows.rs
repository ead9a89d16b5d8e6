//! `LoadLibraryExW` loader.

use std::ffi::{c_void, OsStr};
use std::mem::ManuallyDrop;

use libloading::os::windows::Library;

use super::{Loader, NativeLoader, RawHandle};
use crate::config::BindMode;
use crate::error::NativeError;

impl Loader for NativeLoader {
    type Handle = RawHandle;

    fn open(&self, path: &OsStr, _mode: BindMode) -> Result<RawHandle, NativeError> {
        // GetLastError() is read by libloading right after the failing call.
        let library = unsafe { Library::new(path)? };

        RawHandle::new(library.into_raw() as *mut c_void)
            .ok_or_else(|| NativeError::new("LoadLibraryExW returned a null handle"))
    }

    fn close(&self, handle: RawHandle) -> Result<(), NativeError> {
        let library = unsafe { Library::from_raw(handle.as_ptr() as _) };
        library.close()?;
        Ok(())
    }

    fn resolve(&self, handle: &RawHandle, symbol: &str) -> Result<*mut c_void, NativeError> {
        // Borrowed view of the handle; dropping it must not FreeLibrary.
        let library = ManuallyDrop::new(unsafe { Library::from_raw(handle.as_ptr() as _) });

        let address = unsafe { library.get::<*mut c_void>(symbol.as_bytes())? };
        Ok(*address)
    }

    fn address(handle: &RawHandle) -> usize {
        handle.as_ptr() as usize
    }
}
