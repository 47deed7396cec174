//! In-memory [`Directory`] and [`Registry`] used by the tests.
//!
//! Property writes are staged until `commit`, like ADSI's property cache, and
//! every call through the traits is recorded.

use std::collections::BTreeMap;

use crate::directory::{Child, Directory};
use crate::error::HostError;
use crate::registry::{Registry, ValueKind};
use crate::types::{AppProtection, PropertyValue, IIS_SERVICE_PATH};

pub type NodeId = usize;

const E_ACCESSDENIED: u32 = 0x8007_0005;
const E_PATH_NOT_FOUND: u32 = 0x8007_0003;
const E_ALREADY_EXISTS: u32 = 0x8007_00B7;

#[derive(Debug, Default)]
struct Node {
    class: String,
    name: String,
    parent: Option<NodeId>,
    props: BTreeMap<String, PropertyValue>,
    staged: BTreeMap<String, PropertyValue>,
    app: Option<AppProtection>,
    deleted: bool,
    deny: bool,
}

/// Committed state of one node, as seen by [`MemoryDirectory::snapshot`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeState {
    pub path: String,
    pub class: String,
    pub props: BTreeMap<String, PropertyValue>,
    pub app: Option<AppProtection>,
}

#[derive(Debug)]
pub struct MemoryDirectory {
    nodes: Vec<Node>,
    pub calls: Vec<String>,
}

impl MemoryDirectory {
    /// A tree holding only the web service root.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                class: "IIsWebService".into(),
                name: "W3SVC".into(),
                ..Node::default()
            }],
            calls: Vec::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        0
    }

    /// Adds a committed node without recording a call.
    pub fn add(&mut self, parent: NodeId, class: &str, name: &str) -> NodeId {
        self.nodes.push(Node {
            class: class.into(),
            name: name.into(),
            parent: Some(parent),
            ..Node::default()
        });
        self.nodes.len() - 1
    }

    /// Sets a committed property without recording a call.
    pub fn put(&mut self, node: NodeId, property: &str, value: impl Into<PropertyValue>) {
        self.nodes[node].props.insert(property.into(), value.into());
    }

    pub fn property(&self, node: NodeId, property: &str) -> Option<&PropertyValue> {
        self.nodes[node].props.get(property)
    }

    pub fn app(&self, node: NodeId) -> Option<AppProtection> {
        self.nodes[node].app
    }

    fn record(&mut self, op: &str, node: NodeId, detail: String) {
        let line = format!("{op} {} {detail}", self.path(node));
        self.calls.push(line.trim_end().to_owned());
    }

    pub fn deny_enumeration(&mut self, node: NodeId) {
        self.nodes[node].deny = true;
    }

    fn live(&self, id: NodeId) -> bool {
        let mut cur = Some(id);
        while let Some(n) = cur {
            if self.nodes[n].deleted {
                return false;
            }
            cur = self.nodes[n].parent;
        }
        true
    }

    fn live_children(&self, parent: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len())
            .filter(move |&id| self.nodes[id].parent == Some(parent) && self.live(id))
    }

    /// Live nodes under `parent` with the given class and name.
    pub fn lookup(&self, parent: NodeId, class: &str, name: &str) -> Vec<NodeId> {
        self.live_children(parent)
            .filter(|&id| self.nodes[id].class == class && self.nodes[id].name == name)
            .collect()
    }

    pub fn path(&self, id: NodeId) -> String {
        match self.nodes[id].parent {
            None => IIS_SERVICE_PATH.to_owned(),
            Some(parent) => format!("{}/{}", self.path(parent), self.nodes[id].name),
        }
    }

    /// Committed state of every live node, in creation order.
    pub fn snapshot(&self) -> Vec<NodeState> {
        (0..self.nodes.len())
            .filter(|&id| self.live(id))
            .map(|id| NodeState {
                path: self.path(id),
                class: self.nodes[id].class.clone(),
                props: self.nodes[id].props.clone(),
                app: self.nodes[id].app,
            })
            .collect()
    }
}

impl Directory for MemoryDirectory {
    type Node = NodeId;

    fn service(&mut self) -> Result<NodeId, HostError> {
        self.calls.push("service".into());
        Ok(0)
    }

    fn children(&mut self, parent: &NodeId) -> Result<Vec<Child<NodeId>>, HostError> {
        self.record("children", *parent, String::new());
        if self.nodes[*parent].deny {
            return Err(HostError::new(E_ACCESSDENIED, "Access is denied."));
        }
        Ok(self
            .live_children(*parent)
            .map(|id| Child {
                class: self.nodes[id].class.clone(),
                name: self.nodes[id].name.clone(),
                path: self.path(id),
                node: id,
            })
            .collect())
    }

    fn get(&mut self, node: &NodeId, property: &str) -> Result<Option<PropertyValue>, HostError> {
        self.record("get", *node, property.to_owned());
        let n = &self.nodes[*node];
        Ok(n.staged.get(property).or_else(|| n.props.get(property)).cloned())
    }

    fn set(&mut self, node: &NodeId, property: &str, value: PropertyValue) -> Result<(), HostError> {
        self.record("set", *node, property.to_owned());
        self.nodes[*node].staged.insert(property.into(), value);
        Ok(())
    }

    fn create(&mut self, parent: &NodeId, class: &str, name: &str) -> Result<NodeId, HostError> {
        self.record("create", *parent, format!("{class} {name}"));
        if !self.lookup(*parent, class, name).is_empty() {
            return Err(HostError::new(
                E_ALREADY_EXISTS,
                "Cannot create a file when that file already exists.",
            ));
        }
        Ok(self.add(*parent, class, name))
    }

    fn delete(&mut self, parent: &NodeId, class: &str, name: &str) -> Result<(), HostError> {
        self.record("delete", *parent, format!("{class} {name}"));
        match self.lookup(*parent, class, name).first() {
            Some(&id) => {
                self.nodes[id].deleted = true;
                Ok(())
            }
            None => Err(HostError::new(
                E_PATH_NOT_FOUND,
                "The system cannot find the path specified.",
            )),
        }
    }

    fn commit(&mut self, node: &NodeId) -> Result<(), HostError> {
        self.record("commit", *node, String::new());
        let n = &mut self.nodes[*node];
        let staged = std::mem::take(&mut n.staged);
        n.props.extend(staged);
        Ok(())
    }

    fn create_application(
        &mut self,
        node: &NodeId,
        protection: AppProtection,
    ) -> Result<(), HostError> {
        self.record("app", *node, String::new());
        self.nodes[*node].app = Some(protection);
        Ok(())
    }
}

/// Records registry writes in order.
#[derive(Debug, Default)]
pub struct MemoryRegistry {
    pub writes: Vec<(String, String, String)>,
}

impl MemoryRegistry {
    pub fn value(&self, name: &str) -> Option<&str> {
        self.writes
            .iter()
            .rev()
            .find(|(_, n, _)| n == name)
            .map(|(_, _, v)| v.as_str())
    }
}

impl Registry for MemoryRegistry {
    fn write(&mut self, key: &str, name: &str, value: &str, kind: ValueKind) -> Result<(), HostError> {
        assert_eq!(kind, ValueKind::String);
        self.writes.push((key.into(), name.into(), value.into()));
        Ok(())
    }
}
