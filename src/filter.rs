//! ISAPI filter registration on a web site.
//!
//! The filter lives in the site's `Filters` container; its name must also be
//! listed in the container's `FilterLoadOrder` for IIS to load it.

use tracing::{debug, info};

use crate::directory::{delete_object, find, Directory};
use crate::error::{HostError, InstallError, InstallResult};
use crate::flags::LoadOrder;
use crate::types::{Parameters, FILTERS_NAME, IIS_FILTER, IIS_FILTERS};

const LOAD_ORDER: &str = "FilterLoadOrder";

/// Creates or updates the filter `params.filter_name` under `server` and makes
/// sure it is in the load order. An existing load order is never reordered.
pub fn install_filter<D: Directory>(
    dir: &mut D,
    server: &D::Node,
    params: &Parameters,
) -> InstallResult<D::Node> {
    configure(dir, server, params).map_err(InstallError::host("install_filter"))
}

fn filters_container<D: Directory>(dir: &mut D, server: &D::Node) -> Result<D::Node, HostError> {
    match find(dir, server, IIS_FILTERS, FILTERS_NAME)? {
        Some(filters) => Ok(filters),
        None => {
            debug!("Creating filters container...");
            let filters = dir.create(server, IIS_FILTERS, FILTERS_NAME)?;
            dir.commit(&filters)?;
            Ok(filters)
        }
    }
}

fn configure<D: Directory>(
    dir: &mut D,
    server: &D::Node,
    params: &Parameters,
) -> Result<D::Node, HostError> {
    let filters = filters_container(dir, server)?;
    let filter = match find(dir, &filters, IIS_FILTER, &params.filter_name)? {
        Some(filter) => {
            debug!("Updating existing filter...");
            filter
        }
        None => {
            debug!("Creating new ISAPI filter...");
            dir.create(&filters, IIS_FILTER, &params.filter_name)?
        }
    };

    debug!("Setting filter options...");
    dir.set(&filter, "FilterPath", params.filter_path().into())?;
    dir.set(&filter, "FilterDescription", params.filter_desc.as_str().into())?;
    dir.commit(&filter)?;

    let mut order = LoadOrder::parse(&dir.get_string(&filters, LOAD_ORDER)?);
    debug!("Filters order {order}");
    if order.push(&params.filter_name) {
        dir.set(&filters, LOAD_ORDER, order.to_string().into())?;
        dir.commit(&filters)?;
    }

    info!("Filter [{}] set.", params.filter_name);
    Ok(filter)
}

/// Deletes the filter and drops it from the load order. Returns false if the
/// filter did not exist.
pub fn remove_filter<D: Directory>(
    dir: &mut D,
    server: &D::Node,
    params: &Parameters,
) -> InstallResult<bool> {
    remove(dir, server, params).map_err(InstallError::host("remove_filter"))
}

fn remove<D: Directory>(dir: &mut D, server: &D::Node, params: &Parameters) -> Result<bool, HostError> {
    let Some(filters) = find(dir, server, IIS_FILTERS, FILTERS_NAME)? else {
        return Ok(false);
    };
    let removed = delete_object(dir, &filters, IIS_FILTER, &params.filter_name);

    let mut order = LoadOrder::parse(&dir.get_string(&filters, LOAD_ORDER)?);
    if order.remove(&params.filter_name) {
        dir.set(&filters, LOAD_ORDER, order.to_string().into())?;
        dir.commit(&filters)?;
    }
    if removed {
        info!("Filter [{}] removed.", params.filter_name);
    }
    Ok(removed)
}
