//! Owned handle to one dynamically loaded library.

use std::ffi::{c_void, OsString};
use std::fmt;
use std::mem;
use std::ptr::NonNull;

use crate::config::LoaderConfig;
use crate::error::{LibraryError, NativeError, Result};
use crate::loader::{Loader, NativeLoader};
use crate::naming::{validate_name, validate_version};
use crate::symbol::Symbol;

/// Owns at most one native library handle.
///
/// A handle is either *unloaded* (no native handle) or *loaded*. Every
/// operation is defined in both states:
///
/// | | unloaded | loaded |
/// |---|---|---|
/// | [`load`](Self::load) | opens the library | `AlreadyLoaded` |
/// | [`unload`](Self::unload) | no-op | closes the library |
/// | [`get`](Self::get) / [`address`](Self::address) | `NotLoaded` | resolves |
///
/// Dropping a loaded handle closes the library.
pub struct LibraryHandle<L: Loader = NativeLoader> {
    loader: L,
    config: LoaderConfig,
    name: String,
    version: Option<String>,
    file_name: Option<String>,
    handle: Option<L::Handle>,
}

impl LibraryHandle<NativeLoader> {
    /// Create an unloaded handle with the default configuration.
    pub fn new() -> Self {
        Self::with_config(LoaderConfig::default())
    }

    /// Create an unloaded handle with `config`.
    pub fn with_config(config: LoaderConfig) -> Self {
        Self::with_loader(NativeLoader, config)
    }

    /// Create a handle and load `name` without a version suffix.
    pub fn open(name: &str) -> Result<Self> {
        let mut library = Self::new();
        library.load(name, None)?;
        Ok(library)
    }
}

impl Default for LibraryHandle<NativeLoader> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: Loader> LibraryHandle<L> {
    /// Create an unloaded handle that uses `loader` for every native call.
    pub fn with_loader(loader: L, config: LoaderConfig) -> Self {
        Self {
            loader,
            config,
            name: String::new(),
            version: None,
            file_name: None,
            handle: None,
        }
    }

    /// Load the library called `name`.
    ///
    /// The file name is derived from the configured naming convention, with
    /// `version` appended when it is non-empty. Fails with
    /// [`LibraryError::AlreadyLoaded`] if a library is already held; the held
    /// library is left untouched.
    pub fn load(&mut self, name: &str, version: Option<&str>) -> Result<()> {
        if let Some(handle) = &self.handle {
            if self.config.report_failures {
                tracing::warn!(
                    "load({}): library {} is already loaded at address {:#x}",
                    name,
                    self.file_name.as_deref().unwrap_or_default(),
                    L::address(handle)
                );
            }
            return Err(LibraryError::AlreadyLoaded {
                file_name: self.file_name.clone().unwrap_or_default(),
            });
        }

        validate_name(name)?;
        let version = version.filter(|v| !v.is_empty());
        if let Some(version) = version {
            validate_version(name, version)?;
        }

        let file_name = self.config.naming.file_name(name, version);
        let path: OsString = match &self.config.search_dir {
            Some(dir) => dir.join(&file_name).into_os_string(),
            None => OsString::from(&file_name),
        };

        let handle = match self.loader.open(&path, self.config.bind) {
            Ok(handle) => handle,
            Err(source) => {
                let attempted = path.to_string_lossy().into_owned();
                if self.config.report_failures {
                    tracing::warn!("Cannot load library {}: {}", attempted, source);
                }
                return Err(LibraryError::Load {
                    file_name: attempted,
                    source,
                });
            }
        };

        tracing::info!(
            "Library {} is loaded at address {:#x}",
            file_name,
            L::address(&handle)
        );

        self.name = name.to_string();
        self.version = version.map(str::to_string);
        self.file_name = Some(file_name);
        self.handle = Some(handle);
        Ok(())
    }

    /// Release the library.
    ///
    /// The native handle is given up before the platform call, so the
    /// handle is unloaded afterwards even if the call fails. Unloading an
    /// unloaded handle does nothing.
    pub fn unload(&mut self) -> Result<()> {
        let Some(handle) = self.handle.take() else {
            tracing::debug!("unload({}): no library is loaded", self.name);
            return Ok(());
        };

        let address = L::address(&handle);
        let file_name = self.file_name.as_deref().unwrap_or_default();

        match self.loader.close(handle) {
            Ok(()) => {
                tracing::info!("Library {} is freed at address {:#x}", file_name, address);
                Ok(())
            }
            Err(source) => {
                if self.config.report_failures {
                    tracing::warn!(
                        "Cannot free library {} at address {:#x}: {}",
                        file_name,
                        address,
                        source
                    );
                }
                Err(LibraryError::Unload {
                    name: self.name.clone(),
                    handle: address,
                    source,
                })
            }
        }
    }

    /// Address of the exported `symbol`.
    ///
    /// A failed lookup leaves the library loaded.
    pub fn address(&self, symbol: &str) -> Result<NonNull<c_void>> {
        let Some(handle) = &self.handle else {
            return Err(LibraryError::NotLoaded {
                name: self.name.clone(),
            });
        };

        let resolved = if symbol.is_empty() {
            Err(NativeError::new("symbol name is empty"))
        } else if symbol.contains('\0') {
            Err(NativeError::new("symbol name contains a NUL byte"))
        } else {
            self.loader.resolve(handle, symbol).and_then(|ptr| {
                NonNull::new(ptr)
                    .ok_or_else(|| NativeError::new(format!("symbol {} has a null address", symbol)))
            })
        };

        resolved.map_err(|source| {
            if self.config.report_failures {
                tracing::warn!(
                    "Cannot load symbol {} from {}: {}",
                    symbol,
                    self.file_name.as_deref().unwrap_or_default(),
                    source
                );
            }
            LibraryError::Symbol {
                symbol: symbol.to_string(),
                source,
            }
        })
    }

    /// Resolve `symbol` as a value of type `T`, usually a function pointer.
    ///
    /// The symbol's address is reinterpreted as `T`. Only the size of `T` is
    /// checked; nothing about the library's actual signature is.
    ///
    /// # Safety
    /// `T` must match the exported symbol's real type and calling
    /// convention. Calling through a mismatched function pointer is
    /// undefined behavior.
    pub unsafe fn get<T: Copy>(&self, symbol: &str) -> Result<Symbol<'_, T>> {
        let expected = mem::size_of::<*mut c_void>();
        let found = mem::size_of::<T>();
        if found != expected {
            return Err(LibraryError::SymbolType {
                symbol: symbol.to_string(),
                expected,
                found,
            });
        }

        let address = self.address(symbol)?;
        let value = unsafe { mem::transmute_copy::<*mut c_void, T>(&address.as_ptr()) };
        Ok(Symbol::new(value, address))
    }

    /// Whether a library is currently held.
    pub fn is_loaded(&self) -> bool {
        self.handle.is_some()
    }

    /// Logical name of the last successfully loaded library.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Version suffix of the last successfully loaded library.
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Derived file name of the last successfully loaded library.
    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    /// Numeric value of the native handle, if loaded.
    pub fn raw_address(&self) -> Option<usize> {
        self.handle.as_ref().map(L::address)
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }
}

impl<L: Loader> Drop for LibraryHandle<L> {
    fn drop(&mut self) {
        if self.handle.is_some() {
            // Drop cannot propagate; unload() already reported the failure.
            let _ = self.unload();
        }
    }
}

impl<L: Loader> fmt::Debug for LibraryHandle<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LibraryHandle")
            .field("name", &self.name)
            .field("version", &self.version)
            .field("file_name", &self.file_name)
            .field("handle", &self.raw_address().map(|a| format!("{:#x}", a)))
            .finish()
    }
}
