//! Node registry: the shared fractal tree.
//!
//! All mutation happens under one short write-lock section, so a
//! registration is visible to every lookup that starts after `register`
//! returns. Nodes are never mutated once inserted; only the lineage
//! bookkeeping (children, spawn counter) grows.

use std::collections::HashMap;

use chrono::Utc;
use parking_lot::RwLock;
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use mosaic_core::{Dimension, Error, Node, Result};

use crate::validate::validate_node_id;

/// A node together with its current children, for read-only views.
#[derive(Debug, Clone, Serialize)]
pub struct NodeView {
    #[serde(flatten)]
    pub node: Node,
    pub children: Vec<String>,
}

struct NodeEntry {
    node: Node,
    children: Vec<String>,
    spawn_count: u64,
}

#[derive(Default)]
struct RegistryInner {
    nodes: HashMap<String, NodeEntry>,
    /// Ids in registration order.
    order: Vec<String>,
}

/// Thread-safe registry of live nodes.
pub struct NodeRegistry {
    inner: RwLock<RegistryInner>,
    max_nodes: usize,
}

impl NodeRegistry {
    /// Create an empty registry holding at most `max_nodes` nodes.
    pub fn new(max_nodes: usize) -> Self {
        Self {
            inner: RwLock::new(RegistryInner::default()),
            max_nodes,
        }
    }

    /// Register a node with a generated id.
    ///
    /// Roots get `node-<uuid>`; children get `<parent>.<n>` where `n` counts
    /// the parent's spawns. An empty `parent_id` is treated as no parent.
    pub fn register(&self, parent_id: Option<&str>, dimension: i32) -> Result<Node> {
        self.insert(None, parent_id, dimension)
    }

    /// Register a node under a caller-chosen id.
    pub fn register_named(
        &self,
        id: &str,
        parent_id: Option<&str>,
        dimension: i32,
    ) -> Result<Node> {
        validate_node_id(id)?;
        self.insert(Some(id), parent_id, dimension)
    }

    fn insert(&self, id: Option<&str>, parent_id: Option<&str>, dimension: i32) -> Result<Node> {
        let dimension = Dimension::new(dimension)?;
        let parent_id = parent_id.filter(|p| !p.is_empty());

        let mut inner = self.inner.write();

        if inner.nodes.len() >= self.max_nodes {
            return Err(Error::CapacityExceeded(format!(
                "registry holds the maximum of {} nodes",
                self.max_nodes
            )));
        }

        if let Some(id) = id {
            if inner.nodes.contains_key(id) {
                return Err(Error::DuplicateNode(id.to_string()));
            }
        }

        let node_id = match parent_id {
            Some(pid) => {
                let parent = inner
                    .nodes
                    .get_mut(pid)
                    .ok_or_else(|| Error::InvalidParent(pid.to_string()))?;
                if dimension <= parent.node.dimension {
                    return Err(Error::DimensionOutOfRange(format!(
                        "dimension {} must exceed parent {} dimension {}",
                        dimension, pid, parent.node.dimension
                    )));
                }
                match id {
                    Some(id) => id.to_string(),
                    // A caller-named node may already hold the next lineage name.
                    None => loop {
                        let parent = inner
                            .nodes
                            .get_mut(pid)
                            .ok_or_else(|| Error::Internal("parent vanished".into()))?;
                        let candidate = next_child_id(pid, parent);
                        if !inner.nodes.contains_key(&candidate) {
                            break candidate;
                        }
                    },
                }
            }
            None => match id {
                Some(id) => id.to_string(),
                None => loop {
                    let candidate = format!("node-{}", Uuid::new_v4().simple());
                    if !inner.nodes.contains_key(&candidate) {
                        break candidate;
                    }
                },
            },
        };

        let node = Node {
            id: node_id.clone(),
            parent_id: parent_id.map(str::to_string),
            dimension,
            created_at: Utc::now(),
        };

        if let Some(pid) = parent_id {
            if let Some(parent) = inner.nodes.get_mut(pid) {
                parent.children.push(node_id.clone());
            }
        }
        inner.nodes.insert(
            node_id.clone(),
            NodeEntry {
                node: node.clone(),
                children: Vec::new(),
                spawn_count: 0,
            },
        );
        inner.order.push(node_id);

        debug!(
            "Registered node {} (dimension={}, parent={:?})",
            node.id, node.dimension, node.parent_id
        );
        Ok(node)
    }

    /// Look up a node by id.
    pub fn lookup(&self, node_id: &str) -> Result<Node> {
        self.inner
            .read()
            .nodes
            .get(node_id)
            .map(|e| e.node.clone())
            .ok_or_else(|| Error::NodeNotFound(node_id.to_string()))
    }

    /// Node plus its children.
    pub fn view(&self, node_id: &str) -> Result<NodeView> {
        self.inner
            .read()
            .nodes
            .get(node_id)
            .map(|e| NodeView {
                node: e.node.clone(),
                children: e.children.clone(),
            })
            .ok_or_else(|| Error::NodeNotFound(node_id.to_string()))
    }

    /// Child ids of a node, in spawn order.
    pub fn children(&self, node_id: &str) -> Result<Vec<String>> {
        self.view(node_id).map(|v| v.children)
    }

    /// All nodes in registration order.
    pub fn list(&self) -> Vec<Node> {
        let inner = self.inner.read();
        inner
            .order
            .iter()
            .filter_map(|id| inner.nodes.get(id).map(|e| e.node.clone()))
            .collect()
    }

    pub fn contains(&self, node_id: &str) -> bool {
        self.inner.read().nodes.contains_key(node_id)
    }

    pub fn len(&self) -> usize {
        self.inner.read().nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn next_child_id(parent_id: &str, parent: &mut NodeEntry) -> String {
    let id = format!("{}.{}", parent_id, parent.spawn_count);
    parent.spawn_count += 1;
    id
}
