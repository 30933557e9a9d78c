//! Graph dataset model.
//!
//! The dataset arrives pre-built from an external data-generation stage as
//! `{ nodes, links }` JSON. Nodes form a tree through `parent` references,
//! rooted at the single `center` node; links are derived from that tree plus
//! any extra edges the generator emits.

use std::collections::{HashMap, HashSet};

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Unique identifier for a graph node.
pub type NodeId = String;

/// Hierarchy level of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeGroup {
    /// The single root body. Pinned at the origin.
    Center,
    /// First orbital shell.
    Category,
    /// Second orbital shell.
    Subcategory,
    /// Third orbital shell.
    Cluster,
    /// Outermost shell.
    Item,
}

impl NodeGroup {
    /// All groups ordered from the root outwards.
    pub const ALL: [NodeGroup; 5] = [
        NodeGroup::Center,
        NodeGroup::Category,
        NodeGroup::Subcategory,
        NodeGroup::Cluster,
        NodeGroup::Item,
    ];

    /// Hierarchy depth: 0 for the center, 4 for items.
    pub fn depth(self) -> usize {
        match self {
            NodeGroup::Center => 0,
            NodeGroup::Category => 1,
            NodeGroup::Subcategory => 2,
            NodeGroup::Cluster => 3,
            NodeGroup::Item => 4,
        }
    }
}

/// A body in the orbital graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Unique node identifier.
    pub id: NodeId,
    /// Display label.
    #[serde(default)]
    pub label: String,
    /// Hierarchy level.
    pub group: NodeGroup,
    /// Parent node id (absent only for the center).
    #[serde(default)]
    pub parent: Option<NodeId>,
    /// Position in world coordinates. Mutated in place by every layout
    /// phase and by the physics engine.
    #[serde(default)]
    pub position: Vec3,
    /// Velocity for the force simulation.
    #[serde(default)]
    pub velocity: Vec3,
    /// Fixed position. A pinned node is immovable for every layout phase.
    #[serde(default)]
    pub pin: Option<Vec3>,
    /// Visual size, the source of the importance weight.
    #[serde(default = "default_size")]
    pub size: f32,
}

fn default_size() -> f32 {
    1.0
}

impl Node {
    /// Create a node with zeroed kinematics.
    pub fn new(id: impl Into<NodeId>, group: NodeGroup, parent: Option<NodeId>) -> Self {
        let id = id.into();
        Self {
            label: id.clone(),
            id,
            group,
            parent,
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            pin: None,
            size: default_size(),
        }
    }

    /// Importance weight derived from the node size. Never below 1.
    pub fn weight(&self) -> f32 {
        self.size.max(1.0)
    }

    /// Whether the node is pinned (immovable).
    pub fn is_pinned(&self) -> bool {
        self.pin.is_some()
    }

    /// Snap a pinned node onto its pin and bring it to rest.
    pub fn apply_pin(&mut self) {
        if let Some(pin) = self.pin {
            self.position = pin;
            self.velocity = Vec3::ZERO;
        }
    }
}

/// An edge between two nodes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Link {
    /// Source node id.
    pub source: NodeId,
    /// Target node id.
    pub target: NodeId,
    /// Numeric weight influencing the target link distance.
    #[serde(default = "default_link_value")]
    pub value: f32,
}

fn default_link_value() -> f32 {
    1.0
}

/// The full node/link dataset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphData {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub links: Vec<Link>,
}

impl GraphData {
    /// Decode a dataset from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Encode the dataset as JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Index from node id to position in `nodes`.
    pub fn index(&self) -> HashMap<&str, usize> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id.as_str(), i))
            .collect()
    }

    /// Look up a node by id.
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Look up a node by id, mutably.
    pub fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    /// The center node, if present.
    pub fn center(&self) -> Option<&Node> {
        self.nodes.iter().find(|n| n.group == NodeGroup::Center)
    }

    /// Check the dataset shape.
    ///
    /// Rejects duplicate ids, a missing or duplicated center node, and
    /// non-finite coordinates or sizes. Unresolvable parent references are
    /// *not* an error here: the positioner skips them per pass and logs.
    pub fn validate(&self) -> Result<()> {
        if self.nodes.is_empty() {
            return Ok(());
        }

        let mut seen: HashSet<&str> = HashSet::with_capacity(self.nodes.len());
        for node in &self.nodes {
            if !seen.insert(node.id.as_str()) {
                return Err(Error::Dataset(format!("duplicate node id '{}'", node.id)));
            }
            if !node.position.is_finite() || !node.size.is_finite() {
                return Err(Error::Dataset(format!(
                    "non-finite position or size on node '{}'",
                    node.id
                )));
            }
        }

        let centers = self
            .nodes
            .iter()
            .filter(|n| n.group == NodeGroup::Center)
            .count();
        if centers != 1 {
            return Err(Error::Dataset(format!(
                "expected exactly one center node, found {}",
                centers
            )));
        }

        // Parent references must point at a strictly shallower level; anything
        // else is treated as dangling and skipped by the positioner.
        let index = self.index();
        for node in &self.nodes {
            if let Some(parent_id) = &node.parent {
                match index.get(parent_id.as_str()) {
                    Some(&pi) => {
                        let parent = &self.nodes[pi];
                        if parent.group.depth() >= node.group.depth() {
                            tracing::warn!(
                                node = %node.id,
                                parent = %parent_id,
                                "parent is not at a shallower level; node will be skipped"
                            );
                        }
                    }
                    None => {
                        tracing::warn!(
                            node = %node.id,
                            parent = %parent_id,
                            "dangling parent reference; node will be skipped"
                        );
                    }
                }
            } else if node.group != NodeGroup::Center {
                tracing::warn!(node = %node.id, "non-center node without a parent");
            }
        }

        Ok(())
    }
}
