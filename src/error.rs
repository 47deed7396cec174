//! Error kinds reported by the installer.
//!
//! Every failure is terminal: the driver stops at the first error and `main`
//! turns it into a diagnostic and a non-zero exit status.

use thiserror::Error;

/// Malformed command line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UsageError {
    #[error("Invalid option switch {0}")]
    UnknownOption(String),
    #[error("Missing required argument value for {0}")]
    MissingValue(String),
}

/// A fault raised by the directory service or the registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Error number: {code:08X} - {description}")]
pub struct HostError {
    /// HRESULT or Win32 error code.
    pub code: u32,
    pub description: String,
}

impl HostError {
    pub fn new(code: u32, description: impl Into<String>) -> Self {
        Self {
            code,
            description: description.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum InstallError {
    #[error(transparent)]
    Usage(#[from] UsageError),

    /// An expected file or directory object is missing.
    #[error("{0}")]
    Precondition(String),

    #[error("In function '{operation}'\n{source}")]
    Host {
        operation: &'static str,
        #[source]
        source: HostError,
    },
}

impl InstallError {
    pub fn host(operation: &'static str) -> impl FnOnce(HostError) -> InstallError {
        move |source| InstallError::Host { operation, source }
    }
}

pub type InstallResult<T> = Result<T, InstallError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_error_formats_code_as_hex() {
        let err = HostError::new(0x8007_0005, "Access is denied.");
        assert_eq!(err.to_string(), "Error number: 80070005 - Access is denied.");
    }

    #[test]
    fn host_error_names_the_operation() {
        let err = InstallError::host("install_virtual_dir")(HostError::new(1, "boom"));
        assert_eq!(
            err.to_string(),
            "In function 'install_virtual_dir'\nError number: 00000001 - boom"
        );
    }
}
