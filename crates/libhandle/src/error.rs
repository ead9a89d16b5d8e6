//! Error types for library loading.

use thiserror::Error;

/// Failure reported by the platform loader for a single call.
///
/// The message is captured together with the call that failed, so it never
/// describes an earlier operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct NativeError {
    message: String,
}

impl NativeError {
    /// Create an error from a platform message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The platform message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<libloading::Error> for NativeError {
    fn from(err: libloading::Error) -> Self {
        Self::new(err.to_string())
    }
}

/// Library handle error type.
#[derive(Debug, Error)]
pub enum LibraryError {
    /// The logical name or version cannot be turned into a file name.
    #[error("Invalid library name {name:?}: {reason}")]
    InvalidName { name: String, reason: String },

    /// `load` was called on a handle that already holds a library.
    #[error("Library {file_name} is already loaded")]
    AlreadyLoaded { file_name: String },

    /// The platform loader could not open the library.
    #[error("Cannot load library {file_name}: {source}")]
    Load {
        file_name: String,
        source: NativeError,
    },

    /// The platform loader could not release the library.
    #[error("Cannot free library {name} at {handle:#x}: {source}")]
    Unload {
        name: String,
        handle: usize,
        source: NativeError,
    },

    /// A symbol was requested while no library is loaded.
    #[error("No library is loaded (last name: {name:?})")]
    NotLoaded { name: String },

    /// The symbol could not be resolved.
    #[error("Cannot load symbol {symbol}: {source}")]
    Symbol {
        symbol: String,
        source: NativeError,
    },

    /// The requested symbol type is not pointer-sized.
    #[error("Symbol {symbol} requested as a {found}-byte type, expected {expected} bytes")]
    SymbolType {
        symbol: String,
        expected: usize,
        found: usize,
    },

    /// Invalid loader configuration.
    #[error("Invalid loader configuration: {0}")]
    Config(String),
}

impl LibraryError {
    /// Whether the library itself could not be opened.
    pub fn is_load_error(&self) -> bool {
        matches!(self, LibraryError::Load { .. })
    }

    /// Whether a symbol lookup failed.
    pub fn is_symbol_error(&self) -> bool {
        matches!(
            self,
            LibraryError::Symbol { .. } | LibraryError::SymbolType { .. }
        )
    }
}

/// Result type for library operations.
pub type Result<T> = std::result::Result<T, LibraryError>;
