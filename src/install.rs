//! The installation sequence.
//!
//! Each step is a hard gate for the next one. The first failure ends the run;
//! changes already applied to IIS are left in place.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::directory::{find, find_web_server, Directory};
use crate::error::{InstallError, InstallResult, UsageError};
use crate::filter::{install_filter, remove_filter};
use crate::getopt::GetOpt;
use crate::registry::{write_settings, RedirectorSettings, Registry};
use crate::types::{Parameters, IIS_WEBDIR, ROOT_DIR_NAME};
use crate::vdir::{install_exec_dir, remove_virtual_dir};

pub const OPTSTRING: &str = "s:f:d:v:l:uh";

/// Workers configuration, relative to the install root.
const WORKERS_FILE: [&str; 2] = ["conf", "workers2.properties"];

/// `<install_root>\conf\workers2.properties`, using the separator the root is
/// already written with so the registry value has a single style.
pub fn workers_file(install_root: &Path) -> PathBuf {
    let root = install_root.display().to_string();
    let sep = if root.contains('\\') {
        '\\'
    } else {
        std::path::MAIN_SEPARATOR
    };
    let mut path = root.trim_end_matches(['\\', '/']).to_owned();
    for part in WORKERS_FILE {
        path.push(sep);
        path.push_str(part);
    }
    PathBuf::from(path)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Installed,
    Removed,
    Help,
}

/// What the command line asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub params: Parameters,
    pub uninstall: bool,
    /// Positional arguments: `[path] [install_root]`.
    pub paths: Vec<String>,
}

/// Parses the command line. `Ok(None)` means help was requested.
pub fn parse_args(args: &[String]) -> Result<Option<Command>, UsageError> {
    let mut params = Parameters::default();
    let mut uninstall = false;
    let mut getopt = GetOpt::new(args, OPTSTRING);

    for opt in getopt.by_ref() {
        let opt = opt?;
        let value = opt.value.unwrap_or_default();
        match opt.flag {
            's' => params.server_name = value,
            'f' => params.filter_name = value,
            'd' => params.filter_desc = value,
            'l' => params.filter_lib = value,
            'v' => params.web_name = value,
            'u' => uninstall = true,
            _ => return Ok(None),
        }
    }

    Ok(Some(Command {
        params,
        uninstall,
        paths: getopt.remaining().to_vec(),
    }))
}

/// Resolves the filter directory and the install root.
///
/// Without a `path` argument the filter is expected next to the executable
/// (`<install_root>\bin`) and the install root is its parent. With one, the
/// install root is the second argument or else the parent of `path`.
fn resolve_paths(paths: &[String], exe_dir: &Path) -> (PathBuf, PathBuf) {
    let parent_or_self = |p: &Path| match p.parent() {
        Some(parent) if parent.as_os_str().is_empty() => PathBuf::from("."),
        Some(parent) => parent.to_path_buf(),
        None => p.to_path_buf(),
    };
    match paths {
        [] => (exe_dir.to_path_buf(), parent_or_self(exe_dir)),
        [path] => (PathBuf::from(path), parent_or_self(Path::new(path))),
        [path, root, ..] => (PathBuf::from(path), PathBuf::from(root)),
    }
}

/// Runs the installer against the given directory service and registry.
///
/// `exe_dir` is the directory of the running executable, the default
/// location of the filter library.
pub fn run<D: Directory, R: Registry>(
    args: &[String],
    exe_dir: &Path,
    dir: &mut D,
    reg: &mut R,
) -> InstallResult<Outcome> {
    let Some(Command {
        mut params,
        uninstall,
        paths,
    }) = parse_args(args)?
    else {
        return Ok(Outcome::Help);
    };
    debug!(args = args.len(), positional = paths.len(), "arguments parsed");

    let (web_path, install_root) = resolve_paths(&paths, exe_dir);
    params.web_path = web_path.display().to_string();
    let workers_file = workers_file(&install_root);

    if !uninstall {
        let filter_lib = web_path.join(&params.filter_lib);
        if !filter_lib.is_file() {
            return Err(InstallError::Precondition(format!(
                "The specified filter library could not be found...\nFile {} does not exist.",
                filter_lib.display()
            )));
        }
        if !workers_file.is_file() {
            return Err(InstallError::Precondition(format!(
                "The specified configuration file could not be found...\nFile {} does not exist.",
                workers_file.display()
            )));
        }
    }

    let service = dir.service().map_err(|e| {
        InstallError::Precondition(format!(
            "Unable to find Web Service ADSI object\nCheck the security settings...\n{e}"
        ))
    })?;
    let server = find_web_server(dir, &service, &params.server_name)
        .map_err(InstallError::host("find_web_server"))?
        .ok_or_else(|| {
            InstallError::Precondition(format!(
                "Unable to find Web Server ADSI object...\nThe '{}' does not exist.",
                params.server_name
            ))
        })?;
    let root = find(dir, &server, IIS_WEBDIR, ROOT_DIR_NAME)
        .map_err(InstallError::host("find"))?
        .ok_or_else(|| {
            InstallError::Precondition("Unable to find Web Server ROOT directory.".to_owned())
        })?;

    if uninstall {
        remove_filter(dir, &server, &params)?;
        remove_virtual_dir(dir, &root, &params);
        info!(filter = %params.filter_name, web = %params.web_name, "uninstalled");
        return Ok(Outcome::Removed);
    }

    install_exec_dir(dir, &root, &params)?;
    // TODO: roll back the virtual directory when the filter cannot be installed.
    install_filter(dir, &server, &params)?;

    write_settings(
        reg,
        &params,
        &RedirectorSettings {
            server_root: &install_root,
            workers_file: &workers_file,
        },
    )
    .map_err(InstallError::host("write_settings"))?;

    info!(filter = %params.filter_name, web = %params.web_name, "installed");
    Ok(Outcome::Installed)
}
