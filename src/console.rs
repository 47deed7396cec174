//! Console output: UTF-8 setup, usage text and failure reports.

use crate::error::InstallError;
use crate::types::{DEFAULT_DESCRIPTION, DEFAULT_FILTER_LIB, DEFAULT_FILTER_NAME, DEFAULT_SERVER_NAME};

/// Try to enable UTF-8 output in the Windows console. Returns true on success.
pub fn init_console_utf8() -> bool {
    #[cfg(windows)]
    {
        use windows::Win32::System::Console::{SetConsoleCP, SetConsoleOutputCP};

        unsafe {
            // 65001 = UTF-8 code page
            let out_ok = SetConsoleOutputCP(65001).is_ok();
            let in_ok = SetConsoleCP(65001).is_ok();
            out_ok && in_ok
        }
    }

    #[cfg(not(windows))]
    {
        true
    }
}

/// Help text listing the options and their defaults.
pub fn usage(program: &str) -> String {
    format!(
        "Usage: {program} [option]... [path] [install_root]\n\n\
         \x20 -s   WEBSERVER     Use the WEBSERVER     [{DEFAULT_SERVER_NAME}]\n\
         \x20 -f   FILTERNAME    Use the FILTERNAME    [{DEFAULT_FILTER_NAME}]\n\
         \x20 -d   DESCRIPTION   Filter description    [{DEFAULT_DESCRIPTION}]\n\
         \x20 -v   VIRTUALDIR    Create the VIRTUALDIR [/{DEFAULT_FILTER_NAME}]\n\
         \x20 -l   ISAPILIB      Use the ISAPILIB      [{DEFAULT_FILTER_LIB}]\n\
         \x20 -u                 remove the filter and the virtual directory\n\
         \x20 -h                 display this help and exit\n\n\
         \x20 [path]             Virtual directory path\n\
         \x20                    Set this to directory containing {DEFAULT_FILTER_LIB}\n\
         \x20 [install_root]     Path to the servlet container home directory"
    )
}

/// Message printed when the run fails.
pub fn failure_report(program: &str, err: &InstallError) -> String {
    let mut report = format!("Error processing {program}\n{err}");
    if let InstallError::Usage(_) = err {
        report.push_str("\n\n");
        report.push_str(&usage(program));
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UsageError;

    #[test]
    fn usage_lists_every_option() {
        let text = usage("isapi-install");
        assert!(text.starts_with("Usage: isapi-install [option]..."));
        for flag in ["-s", "-f", "-d", "-v", "-l", "-u", "-h"] {
            assert!(text.contains(&format!("  {flag}   ")), "{flag}");
        }
        assert!(text.contains("[Default Web Site]"));
    }

    #[test]
    fn usage_errors_include_help_text() {
        let err = InstallError::Usage(UsageError::UnknownOption("-q".into()));
        let report = failure_report("isapi-install", &err);
        assert!(report.starts_with("Error processing isapi-install\nInvalid option switch -q"));
        assert!(report.contains("Usage: isapi-install"));

        let err = InstallError::Precondition("File x does not exist.".into());
        assert!(!failure_report("isapi-install", &err).contains("Usage:"));
    }
}
