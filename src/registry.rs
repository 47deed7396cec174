//! Registry values consumed by the redirector at runtime.
//!
//! The values are written unconditionally; previous contents are neither
//! read nor merged.

use std::path::Path;

use tracing::info;

use crate::error::HostError;
use crate::types::Parameters;

/// Registry value types the installer writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// `REG_SZ`
    String,
}

pub trait Registry {
    /// Writes `name = value` under `key`, a full path starting with the hive
    /// (`HKLM\SOFTWARE\...`). Missing keys are created.
    fn write(&mut self, key: &str, name: &str, value: &str, kind: ValueKind)
        -> Result<(), HostError>;
}

/// Paths the redirector needs to find its configuration.
#[derive(Debug, Clone)]
pub struct RedirectorSettings<'a> {
    pub server_root: &'a Path,
    pub workers_file: &'a Path,
}

/// Writes the five redirector settings under `params.registry_key`.
pub fn write_settings<R: Registry>(
    reg: &mut R,
    params: &Parameters,
    settings: &RedirectorSettings<'_>,
) -> Result<(), HostError> {
    let extension_uri = format!("/{}/{}", params.web_name, params.filter_lib);
    let server_root = settings.server_root.display().to_string();
    let workers_file = settings.workers_file.display().to_string();
    let values = [
        ("extensionUri", extension_uri.as_str()),
        ("serverRoot", server_root.as_str()),
        ("workersFile", workers_file.as_str()),
        ("authComplete", "0"),
        ("threadPool", "20"),
    ];
    for (name, value) in values {
        reg.write(&params.registry_key, name, value, ValueKind::String)?;
    }
    info!(key = %params.registry_key, "registry settings written");
    Ok(())
}

/// Splits `HKLM\SOFTWARE\...` into the hive abbreviation and the subkey.
pub fn split_hive(key: &str) -> Option<(&str, &str)> {
    let (hive, subkey) = key.split_once('\\')?;
    let hive = match hive.to_ascii_uppercase().as_str() {
        "HKLM" | "HKEY_LOCAL_MACHINE" => "HKLM",
        "HKCU" | "HKEY_CURRENT_USER" => "HKCU",
        "HKCR" | "HKEY_CLASSES_ROOT" => "HKCR",
        "HKU" | "HKEY_USERS" => "HKU",
        _ => return None,
    };
    Some((hive, subkey))
}

#[cfg(windows)]
pub use self::windows_registry::WindowsRegistry;

#[cfg(windows)]
mod windows_registry {
    use windows::core::{HSTRING, PCWSTR};
    use windows::Win32::Foundation::ERROR_SUCCESS;
    use windows::Win32::System::Registry::{
        RegCloseKey, RegCreateKeyExW, RegSetValueExW, HKEY, HKEY_CLASSES_ROOT,
        HKEY_CURRENT_USER, HKEY_LOCAL_MACHINE, HKEY_USERS, KEY_WRITE, REG_OPTION_NON_VOLATILE,
        REG_SZ,
    };

    use super::{split_hive, Registry, ValueKind};
    use crate::error::HostError;

    const ERROR_BAD_PATHNAME: u32 = 161;

    /// Writes through the Win32 registry API.
    #[derive(Debug, Default)]
    pub struct WindowsRegistry;

    impl Registry for WindowsRegistry {
        fn write(
            &mut self,
            key: &str,
            name: &str,
            value: &str,
            kind: ValueKind,
        ) -> Result<(), HostError> {
            let (hive, subkey) = split_hive(key).ok_or_else(|| {
                HostError::new(ERROR_BAD_PATHNAME, format!("Invalid root in registry key \"{key}\"."))
            })?;
            let root = match hive {
                "HKCU" => HKEY_CURRENT_USER,
                "HKCR" => HKEY_CLASSES_ROOT,
                "HKU" => HKEY_USERS,
                _ => HKEY_LOCAL_MACHINE,
            };

            unsafe {
                let subkey = HSTRING::from(subkey);
                let mut hkey = HKEY::default();
                let result = RegCreateKeyExW(
                    root,
                    &subkey,
                    0,
                    PCWSTR::null(),
                    REG_OPTION_NON_VOLATILE,
                    KEY_WRITE,
                    None,
                    &mut hkey,
                    None,
                );
                if result != ERROR_SUCCESS {
                    return Err(win32_error(result.0, "RegCreateKeyExW", key));
                }

                let value_type = match kind {
                    ValueKind::String => REG_SZ,
                };
                // REG_SZ data is UTF-16 including the terminating null
                let data: Vec<u8> = value
                    .encode_utf16()
                    .chain(std::iter::once(0))
                    .flat_map(u16::to_le_bytes)
                    .collect();
                let value_name = HSTRING::from(name);
                let result = RegSetValueExW(hkey, &value_name, 0, value_type, Some(&data));
                let _ = RegCloseKey(hkey);
                if result != ERROR_SUCCESS {
                    return Err(win32_error(result.0, "RegSetValueExW", key));
                }
            }
            Ok(())
        }
    }

    fn win32_error(code: u32, call: &str, key: &str) -> HostError {
        let message = windows::core::Error::from(windows::core::HRESULT::from_win32(code)).message();
        HostError::new(code, format!("{call} failed for \"{key}\": {message}"))
    }
}
