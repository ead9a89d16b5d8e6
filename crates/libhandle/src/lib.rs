//! Runtime loading of shared libraries.
//!
//! [`LibraryHandle`] owns one native library handle. It derives the platform
//! file name from a logical library name (`foo` becomes `libfoo.so` or
//! `foo.dll`), opens it through a [`Loader`], hands out typed symbols and
//! releases the handle exactly once.
//!
//! # Quick Start
//!
//! ```no_run
//! use libhandle::LibraryHandle;
//!
//! # fn main() -> libhandle::Result<()> {
//! let mut lib = LibraryHandle::new();
//! lib.load("m", Some("6"))?;
//!
//! let cos = unsafe { lib.get::<unsafe extern "C" fn(f64) -> f64>("cos")? };
//! assert_eq!(unsafe { cos(0.0) }, 1.0);
//! # Ok(())
//! # }
//! ```
//!
//! Diagnostics are emitted as `tracing` events; install a subscriber to see
//! them.

pub mod config;
pub mod error;
pub mod library;
pub mod loader;
pub mod naming;
pub mod symbol;

pub use config::{BindMode, LoaderConfig};
pub use error::{LibraryError, NativeError, Result};
pub use library::LibraryHandle;
pub use loader::{Loader, NativeLoader, RawHandle};
pub use naming::NamingConvention;
pub use symbol::Symbol;

/// Re-exports commonly used types.
pub mod prelude {
    pub use crate::config::{BindMode, LoaderConfig};
    pub use crate::error::{LibraryError, Result};
    pub use crate::library::LibraryHandle;
    pub use crate::loader::Loader;
    pub use crate::naming::NamingConvention;
    pub use crate::symbol::Symbol;
}
