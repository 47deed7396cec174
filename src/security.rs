//! Elevation check.
//!
//! Writing the IIS metabase and HKLM both need an elevated token.

/// Returns whether the process token is elevated, or `None` if it could not be queried.
pub fn is_elevated() -> Option<bool> {
    #[cfg(windows)]
    {
        use windows::Win32::Foundation::{CloseHandle, HANDLE};
        use windows::Win32::Security::{GetTokenInformation, TokenElevation, TOKEN_ELEVATION, TOKEN_QUERY};
        use windows::Win32::System::Threading::{GetCurrentProcess, OpenProcessToken};

        unsafe {
            let mut token = HANDLE::default();
            OpenProcessToken(GetCurrentProcess(), TOKEN_QUERY, &mut token).ok()?;
            let mut elevation = TOKEN_ELEVATION::default();
            let mut return_length = 0u32;
            let queried = GetTokenInformation(
                token,
                TokenElevation,
                Some(&mut elevation as *mut _ as *mut _),
                std::mem::size_of::<TOKEN_ELEVATION>() as u32,
                &mut return_length,
            );
            let _ = CloseHandle(token);
            queried.ok()?;
            Some(elevation.TokenIsElevated != 0)
        }
    }

    #[cfg(not(windows))]
    {
        None
    }
}

/// Logs a warning when the process is known not to be elevated.
pub fn check_privileges() {
    match is_elevated() {
        Some(false) => tracing::warn!(
            "not running with elevated privileges; IIS and registry updates will likely be denied, run as Administrator"
        ),
        Some(true) => tracing::debug!("running with elevated privileges"),
        None => {}
    }
}
