//! Virtual directory setup under a web site's ROOT.

use tracing::{debug, info};

use crate::directory::{delete_object, find, Directory};
use crate::error::{HostError, InstallError, InstallResult};
use crate::flags::{exec_only, AccessFlags};
use crate::types::{Parameters, IIS_WEBDIR};

/// Creates the virtual directory `params.web_name` under `root`, or reuses
/// an existing one, and applies the access flags from `params.web_options`.
///
/// Name, path, application mode and headers are only set on creation; the
/// access flags are re-applied every time.
pub fn install_virtual_dir<D: Directory>(
    dir: &mut D,
    root: &D::Node,
    params: &Parameters,
) -> InstallResult<D::Node> {
    configure(dir, root, params).map_err(InstallError::host("install_virtual_dir"))
}

/// Like [`install_virtual_dir`], but always produces an execute-only directory
/// regardless of the caller's options.
pub fn install_exec_dir<D: Directory>(
    dir: &mut D,
    root: &D::Node,
    params: &Parameters,
) -> InstallResult<D::Node> {
    let exec = Parameters {
        web_options: exec_only(&params.web_options),
        ..params.clone()
    };
    install_virtual_dir(dir, root, &exec)
}

/// Deletes the virtual directory. Returns false if it did not exist.
pub fn remove_virtual_dir<D: Directory>(dir: &mut D, root: &D::Node, params: &Parameters) -> bool {
    let removed = delete_object(dir, root, IIS_WEBDIR, &params.web_name);
    if removed {
        info!("Virtual directory [/{}] removed.", params.web_name);
    }
    removed
}

fn configure<D: Directory>(
    dir: &mut D,
    root: &D::Node,
    params: &Parameters,
) -> Result<D::Node, HostError> {
    let node = match find(dir, root, IIS_WEBDIR, &params.web_name)? {
        Some(node) => {
            debug!("Updating existing directory...");
            node
        }
        None => {
            debug!("Creating new directory...");
            let node = dir.create(root, IIS_WEBDIR, &params.web_name)?;
            dir.set(&node, "AppFriendlyName", params.web_description.as_str().into())?;
            dir.set(&node, "Path", params.web_path.as_str().into())?;
            dir.create_application(&node, params.app_protection)?;
            dir.set(&node, "HttpCustomHeaders", params.headers.as_str().into())?;
            node
        }
    };

    debug!("Setting directory options...");
    let flags = AccessFlags::parse(&params.web_options);
    for (property, enabled) in flags.properties() {
        dir.set(&node, property, enabled.into())?;
    }
    dir.commit(&node)?;

    info!("Virtual directory [/{}] set.", params.web_name);
    Ok(node)
}
