//! Typed symbols borrowed from a loaded library.

use std::ffi::c_void;
use std::fmt;
use std::marker::PhantomData;
use std::ops::Deref;
use std::ptr::NonNull;

/// A symbol resolved from a [`LibraryHandle`](crate::LibraryHandle).
///
/// The symbol borrows the handle, so the library cannot be unloaded or
/// dropped while the symbol is in use.
#[derive(Clone, Copy)]
pub struct Symbol<'lib, T> {
    value: T,
    address: NonNull<c_void>,
    _library: PhantomData<&'lib ()>,
}

impl<'lib, T> Symbol<'lib, T> {
    pub(crate) fn new(value: T, address: NonNull<c_void>) -> Self {
        Self {
            value,
            address,
            _library: PhantomData,
        }
    }

    /// Address the symbol was resolved to.
    pub fn address(&self) -> NonNull<c_void> {
        self.address
    }

    /// Detach the value from the library borrow.
    ///
    /// # Safety
    /// The caller must not use the value after the library is unloaded.
    pub unsafe fn into_raw(self) -> T {
        self.value
    }
}

impl<T> Deref for Symbol<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T> fmt::Debug for Symbol<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Symbol")
            .field("address", &self.address)
            .finish()
    }
}
