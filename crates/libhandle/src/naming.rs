//! Platform file-name conventions for shared libraries.

use serde::{Deserialize, Serialize};

use crate::error::{LibraryError, Result};

/// How a logical library name maps to a file name.
///
/// | Convention | no version | version `V` |
/// |---|---|---|
/// | `Windows` | `N.dll` | `N-V.dll` |
/// | `Unix` | `libN.so` | `libN.so.V` |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamingConvention {
    Windows,
    Unix,
}

impl NamingConvention {
    /// The convention of the platform this crate was built for.
    pub fn host() -> Self {
        if cfg!(windows) {
            NamingConvention::Windows
        } else {
            NamingConvention::Unix
        }
    }

    /// File name prefix.
    pub fn prefix(&self) -> &'static str {
        match self {
            NamingConvention::Windows => "",
            NamingConvention::Unix => "lib",
        }
    }

    /// File extension, without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            NamingConvention::Windows => "dll",
            NamingConvention::Unix => "so",
        }
    }

    /// Derive the file name for `name`.
    ///
    /// An empty version is the same as no version.
    pub fn file_name(&self, name: &str, version: Option<&str>) -> String {
        let version = version.filter(|v| !v.is_empty());
        match (self, version) {
            (NamingConvention::Windows, None) => format!("{}.dll", name),
            (NamingConvention::Windows, Some(v)) => format!("{}-{}.dll", name, v),
            (NamingConvention::Unix, None) => format!("lib{}.so", name),
            (NamingConvention::Unix, Some(v)) => format!("lib{}.so.{}", name, v),
        }
    }
}

impl Default for NamingConvention {
    fn default() -> Self {
        Self::host()
    }
}

/// Check that a logical name can be used to derive a file name.
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(invalid(name, "name is empty"));
    }
    check_component(name, name)
}

/// Check that a version suffix can be appended to a file name.
pub fn validate_version(name: &str, version: &str) -> Result<()> {
    check_component(name, version)
}

fn check_component(name: &str, component: &str) -> Result<()> {
    if component.contains(['/', '\\']) {
        return Err(invalid(name, "contains a path separator"));
    }
    if component.contains('\0') {
        return Err(invalid(name, "contains a NUL byte"));
    }
    Ok(())
}

fn invalid(name: &str, reason: &str) -> LibraryError {
    LibraryError::InvalidName {
        name: name.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unversioned_names() {
        assert_eq!(NamingConvention::Windows.file_name("foo", None), "foo.dll");
        assert_eq!(NamingConvention::Unix.file_name("foo", None), "libfoo.so");
    }

    #[test]
    fn test_versioned_names() {
        assert_eq!(
            NamingConvention::Windows.file_name("foo", Some("2")),
            "foo-2.dll"
        );
        assert_eq!(
            NamingConvention::Unix.file_name("foo", Some("1.2.3")),
            "libfoo.so.1.2.3"
        );
    }

    #[test]
    fn test_empty_version_is_ignored() {
        assert_eq!(NamingConvention::Unix.file_name("m", Some("")), "libm.so");
        assert_eq!(NamingConvention::Windows.file_name("m", Some("")), "m.dll");
    }

    #[test]
    fn test_prefix_and_extension_match_file_name() {
        for convention in [NamingConvention::Windows, NamingConvention::Unix] {
            let derived = convention.file_name("bar", None);
            assert!(derived.starts_with(convention.prefix()));
            assert!(derived.ends_with(&format!(".{}", convention.extension())));
        }
    }

    #[test]
    fn test_host_convention() {
        #[cfg(windows)]
        assert_eq!(NamingConvention::host(), NamingConvention::Windows);
        #[cfg(not(windows))]
        assert_eq!(NamingConvention::host(), NamingConvention::Unix);
        assert_eq!(NamingConvention::default(), NamingConvention::host());
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("foo").is_ok());
        assert!(validate_name("foo-bar_1.2").is_ok());

        for bad in ["", "dir/foo", "dir\\foo", "fo\0o"] {
            match validate_name(bad) {
                Err(LibraryError::InvalidName { name, .. }) => assert_eq!(name, bad),
                other => panic!("Expected InvalidName for {:?}, got {:?}", bad, other),
            }
        }
    }

    #[test]
    fn test_validate_version() {
        assert!(validate_version("foo", "").is_ok());
        assert!(validate_version("foo", "6").is_ok());
        assert!(validate_version("foo", "../6").is_err());
    }
}
