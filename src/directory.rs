//! Access to the IIS metabase object tree.
//!
//! The tree is owned by the host; this crate only looks up nodes and patches
//! their properties. [`Directory`] is the capability set the installers need,
//! implemented over ADSI on Windows and in memory for tests.

use tracing::{debug, warn};

use crate::error::HostError;
use crate::types::{AppProtection, PropertyValue, IIS_SERVER};

/// One entry produced by enumerating a container.
#[derive(Debug, Clone)]
pub struct Child<N> {
    pub class: String,
    pub name: String,
    pub path: String,
    pub node: N,
}

pub trait Directory {
    /// Handle to a node in the tree.
    type Node: Clone;

    /// Binds the web service root (`IIS://LocalHost/W3SVC`).
    fn service(&mut self) -> Result<Self::Node, HostError>;

    fn children(&mut self, parent: &Self::Node) -> Result<Vec<Child<Self::Node>>, HostError>;

    /// Reads a property. `Ok(None)` if the node has no value for it.
    fn get(&mut self, node: &Self::Node, property: &str)
        -> Result<Option<PropertyValue>, HostError>;

    /// Stages a property change; nothing is persisted until [`Directory::commit`].
    fn set(
        &mut self,
        node: &Self::Node,
        property: &str,
        value: PropertyValue,
    ) -> Result<(), HostError>;

    fn create(
        &mut self,
        parent: &Self::Node,
        class: &str,
        name: &str,
    ) -> Result<Self::Node, HostError>;

    fn delete(&mut self, parent: &Self::Node, class: &str, name: &str) -> Result<(), HostError>;

    /// Persists staged property changes (`SetInfo`).
    fn commit(&mut self, node: &Self::Node) -> Result<(), HostError>;

    /// Marks a virtual directory as an application (`AppCreate2`).
    fn create_application(
        &mut self,
        node: &Self::Node,
        protection: AppProtection,
    ) -> Result<(), HostError>;

    /// Reads a string property, treating a missing value as empty.
    fn get_string(&mut self, node: &Self::Node, property: &str) -> Result<String, HostError> {
        Ok(self
            .get(node, property)?
            .and_then(|v| v.as_str().map(str::to_owned))
            .unwrap_or_default())
    }
}

/// Linear scan of `parent`'s children for the first with matching class and name.
pub fn find<D: Directory>(
    dir: &mut D,
    parent: &D::Node,
    class: &str,
    name: &str,
) -> Result<Option<D::Node>, HostError> {
    for child in dir.children(parent)? {
        debug!("{:<18}{:<15}{}", child.class, child.name, child.path);
        if child.class == class && child.name == name {
            return Ok(Some(child.node));
        }
    }
    Ok(None)
}

/// Finds the web server whose `ServerComment` equals `comment`.
pub fn find_web_server<D: Directory>(
    dir: &mut D,
    service: &D::Node,
    comment: &str,
) -> Result<Option<D::Node>, HostError> {
    for child in dir.children(service)? {
        if child.class != IIS_SERVER {
            continue;
        }
        let server_comment = dir.get_string(&child.node, "ServerComment")?;
        debug!(name = %child.name, server_comment = %server_comment, "web server");
        if server_comment == comment {
            return Ok(Some(child.node));
        }
    }
    Ok(None)
}

/// Deletes a child object. The host reports a missing object as an error, so
/// any failure is taken to mean there was nothing to delete.
pub fn delete_object<D: Directory>(dir: &mut D, parent: &D::Node, class: &str, name: &str) -> bool {
    match dir.delete(parent, class, name) {
        Ok(()) => true,
        Err(e) => {
            warn!(class, name, error = %e, "object not deleted");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryDirectory;
    use crate::types::{IIS_FILTERS, IIS_WEBDIR};

    #[test]
    fn find_matches_class_and_name() {
        let mut dir = MemoryDirectory::new();
        let root = dir.root();
        let vdir = dir.add(root, IIS_WEBDIR, "jakarta");
        dir.add(root, IIS_FILTERS, "other");

        assert_eq!(find(&mut dir, &root, IIS_WEBDIR, "jakarta").unwrap(), Some(vdir));
        assert_eq!(find(&mut dir, &root, IIS_FILTERS, "jakarta").unwrap(), None);
        assert_eq!(find(&mut dir, &root, IIS_WEBDIR, "Jakarta").unwrap(), None);
    }

    #[test]
    fn find_returns_first_match() {
        let mut dir = MemoryDirectory::new();
        let root = dir.root();
        let first = dir.add(root, IIS_WEBDIR, "dup");
        dir.add(root, IIS_WEBDIR, "dup");
        assert_eq!(find(&mut dir, &root, IIS_WEBDIR, "dup").unwrap(), Some(first));
    }

    #[test]
    fn find_propagates_enumeration_faults() {
        let mut dir = MemoryDirectory::new();
        let root = dir.root();
        dir.deny_enumeration(root);
        let err = find(&mut dir, &root, IIS_WEBDIR, "x").unwrap_err();
        assert_eq!(err.code, 0x8007_0005);
    }

    #[test]
    fn find_web_server_compares_server_comment() {
        let mut dir = MemoryDirectory::new();
        let root = dir.root();
        let one = dir.add(root, IIS_SERVER, "1");
        dir.put(one, "ServerComment", "Default Web Site");
        let two = dir.add(root, IIS_SERVER, "2");
        dir.put(two, "ServerComment", "Intranet");
        let impostor = dir.add(root, IIS_WEBDIR, "3");
        dir.put(impostor, "ServerComment", "Intranet");

        assert_eq!(find_web_server(&mut dir, &root, "Intranet").unwrap(), Some(two));
        assert_eq!(find_web_server(&mut dir, &root, "Missing").unwrap(), None);
    }

    #[test]
    fn delete_object_reports_absence_as_false() {
        let mut dir = MemoryDirectory::new();
        let root = dir.root();
        dir.add(root, IIS_WEBDIR, "jakarta");
        assert!(delete_object(&mut dir, &root, IIS_WEBDIR, "jakarta"));
        assert!(!delete_object(&mut dir, &root, IIS_WEBDIR, "jakarta"));
    }
}
