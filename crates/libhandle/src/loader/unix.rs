//! `dlopen` loader.

use std::ffi::{c_void, OsStr};
use std::mem::ManuallyDrop;

use libloading::os::unix::{Library, RTLD_LAZY, RTLD_LOCAL, RTLD_NOW};

use super::{Loader, NativeLoader, RawHandle};
use crate::config::BindMode;
use crate::error::NativeError;

impl Loader for NativeLoader {
    type Handle = RawHandle;

    fn open(&self, path: &OsStr, mode: BindMode) -> Result<RawHandle, NativeError> {
        let binding = match mode {
            BindMode::Lazy => RTLD_LAZY,
            BindMode::Now => RTLD_NOW,
        };

        // libloading reads dlerror() right after dlopen, so the message
        // belongs to this call.
        let library = unsafe { Library::open(Some(path), binding | RTLD_LOCAL)? };

        RawHandle::new(library.into_raw())
            .ok_or_else(|| NativeError::new("dlopen returned a null handle"))
    }

    fn close(&self, handle: RawHandle) -> Result<(), NativeError> {
        let library = unsafe { Library::from_raw(handle.as_ptr()) };
        library.close()?;
        Ok(())
    }

    fn resolve(&self, handle: &RawHandle, symbol: &str) -> Result<*mut c_void, NativeError> {
        // Borrowed view of the handle; dropping it must not dlclose.
        let library = ManuallyDrop::new(unsafe { Library::from_raw(handle.as_ptr()) });

        // dlerror() is cleared before dlsym and read after it.
        let address = unsafe { library.get::<*mut c_void>(symbol.as_bytes())? };
        Ok(*address)
    }

    fn address(handle: &RawHandle) -> usize {
        handle.as_ptr() as usize
    }
}
