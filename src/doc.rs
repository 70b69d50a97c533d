//! Document model: diagram entities, the store traits, and the in-memory store.
//!
//! This module defines what is on the diagram (`Node`, `Bus`, `Connection`,
//! `BusConnection`), the read interface the renderer and hit-tester consume
//! (`DiagramStore`), the write interface the drag gesture calls
//! (`EntityMover`), and a `Vec`-backed store (`DocStore`) that implements
//! both. Hosts with their own entity manager implement the traits directly.
//!
//! Iteration order is significant: hit-testing walks entities in store order
//! and the first match wins, and each render layer draws in store order.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::CanvasError;
use crate::geom::Point;

/// Unique identifier for a node.
pub type NodeId = u64;

/// Unique identifier for a bus.
pub type BusId = u64;

/// Lifecycle status of a node, mapped to an indicator color by a
/// [`crate::style::StatusPalette`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    Active,
    /// In-progress state; drawn with an extra marker on the indicator.
    Starting,
    Inactive,
    /// Any status string this crate does not recognize.
    #[default]
    #[serde(other)]
    Unknown,
}

/// A diagram node with a fixed-size box footprint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    /// Category tag; its first character is the fallback glyph.
    pub kind: String,
    /// Top-left corner of the box.
    pub position: Point,
    /// Base hue as a CSS color string.
    pub color: String,
    #[serde(default)]
    pub status: NodeStatus,
    /// Icon asset reference, resolved through an [`crate::render::IconSource`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

/// A node-to-node link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub source_id: NodeId,
    pub target_id: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interface_name: Option<String>,
    /// Logical-only connections carry `false` and are never drawn.
    #[serde(default = "default_true")]
    pub show_visual: bool,
}

fn default_true() -> bool {
    true
}

/// Axis a bus runs along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Horizontal,
    Vertical,
}

/// A shared linear link, such as a backbone segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bus {
    pub id: BusId,
    pub name: String,
    /// Left end when horizontal, top end when vertical.
    pub position: Point,
    #[serde(default)]
    pub orientation: Orientation,
    pub length: f64,
    pub thickness: f64,
    pub color: String,
}

impl Bus {
    /// Unit direction of the bus axis.
    #[must_use]
    pub fn direction(&self) -> Point {
        match self.orientation {
            Orientation::Horizontal => Point::new(1.0, 0.0),
            Orientation::Vertical => Point::new(0.0, 1.0),
        }
    }

    /// Far end of the bus segment. Negative lengths are treated as zero.
    #[must_use]
    pub fn end(&self) -> Point {
        let d = self.direction();
        let len = self.length.max(0.0);
        Point::new(d.x.mul_add(len, self.position.x), d.y.mul_add(len, self.position.y))
    }
}

/// A link that touches at least one bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BusConnection {
    NodeToBus {
        node_id: NodeId,
        bus_id: BusId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        interface_name: Option<String>,
    },
    BusToBus {
        source_bus_id: BusId,
        target_bus_id: BusId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        interface_name: Option<String>,
    },
}

impl BusConnection {
    #[must_use]
    pub fn interface_name(&self) -> Option<&str> {
        match self {
            Self::NodeToBus { interface_name, .. } | Self::BusToBus { interface_name, .. } => {
                interface_name.as_deref()
            }
        }
    }
}

/// Read access to the current diagram snapshot.
///
/// Every call returns the live state; callers tolerate the snapshot changing
/// between calls.
pub trait DiagramStore {
    fn nodes(&self) -> &[Node];
    fn buses(&self) -> &[Bus];
    fn connections(&self) -> &[Connection];
    fn bus_connections(&self) -> &[BusConnection];

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes().iter().find(|n| n.id == id)
    }

    fn bus(&self, id: BusId) -> Option<&Bus> {
        self.buses().iter().find(|b| b.id == id)
    }
}

/// Write access used by the drag gesture. Implementations update the store
/// before the next render.
pub trait EntityMover {
    fn move_node(&mut self, id: NodeId, position: Point);
    fn move_bus(&mut self, id: BusId, position: Point);
}

/// Serializable full-diagram snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    pub nodes: Vec<Node>,
    pub buses: Vec<Bus>,
    pub connections: Vec<Connection>,
    pub bus_connections: Vec<BusConnection>,
}

/// In-memory diagram store. `DocStore::default()` is the empty diagram.
#[derive(Debug, Clone, Default)]
pub struct DocStore {
    nodes: Vec<Node>,
    buses: Vec<Bus>,
    connections: Vec<Connection>,
    bus_connections: Vec<BusConnection>,
}

impl DocStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a snapshot.
    #[must_use]
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let mut store = Self::new();
        store.load_snapshot(snapshot);
        store
    }

    /// Parse a JSON snapshot document.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::Json`] if the document is malformed.
    pub fn from_json(json: &str) -> Result<Self, CanvasError> {
        let snapshot: Snapshot = serde_json::from_str(json)?;
        Ok(Self::from_snapshot(snapshot))
    }

    /// Read and parse a JSON snapshot file.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::Io`] if the file cannot be read, or
    /// [`CanvasError::Json`] if it is malformed.
    pub fn from_path(path: &Path) -> Result<Self, CanvasError> {
        let json = std::fs::read_to_string(path)
            .map_err(|source| CanvasError::Io { path: path.display().to_string(), source })?;
        Self::from_json(&json)
    }

    /// Replace all entities with a full snapshot.
    pub fn load_snapshot(&mut self, snapshot: Snapshot) {
        self.nodes = snapshot.nodes;
        self.buses = snapshot.buses;
        self.connections = snapshot.connections;
        self.bus_connections = snapshot.bus_connections;
    }

    /// Export the current state as a snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            nodes: self.nodes.clone(),
            buses: self.buses.clone(),
            connections: self.connections.clone(),
            bus_connections: self.bus_connections.clone(),
        }
    }

    /// Insert or replace a node. A replaced node keeps its iteration slot.
    pub fn insert_node(&mut self, node: Node) {
        match self.nodes.iter_mut().find(|n| n.id == node.id) {
            Some(existing) => *existing = node,
            None => self.nodes.push(node),
        }
    }

    /// Insert or replace a bus. A replaced bus keeps its iteration slot.
    pub fn insert_bus(&mut self, bus: Bus) {
        match self.buses.iter_mut().find(|b| b.id == bus.id) {
            Some(existing) => *existing = bus,
            None => self.buses.push(bus),
        }
    }

    pub fn add_connection(&mut self, connection: Connection) {
        self.connections.push(connection);
    }

    pub fn add_bus_connection(&mut self, connection: BusConnection) {
        self.bus_connections.push(connection);
    }

    /// Remove a node by id, returning it if it was present.
    ///
    /// Edges that reference it are left in place; renderers skip them.
    pub fn remove_node(&mut self, id: NodeId) -> Option<Node> {
        let idx = self.nodes.iter().position(|n| n.id == id)?;
        Some(self.nodes.remove(idx))
    }

    /// Remove a bus by id, returning it if it was present.
    pub fn remove_bus(&mut self, id: BusId) -> Option<Bus> {
        let idx = self.buses.iter().position(|b| b.id == id)?;
        Some(self.buses.remove(idx))
    }

    /// Number of nodes and buses currently in the store.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len() + self.buses.len()
    }

    /// Returns `true` if the store holds no nodes and no buses.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.buses.is_empty()
    }
}

impl DiagramStore for DocStore {
    fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    fn buses(&self) -> &[Bus] {
        &self.buses
    }

    fn connections(&self) -> &[Connection] {
        &self.connections
    }

    fn bus_connections(&self) -> &[BusConnection] {
        &self.bus_connections
    }
}

impl EntityMover for DocStore {
    fn move_node(&mut self, id: NodeId, position: Point) {
        if let Some(node) = self.nodes.iter_mut().find(|n| n.id == id) {
            node.position = position;
        }
    }

    fn move_bus(&mut self, id: BusId, position: Point) {
        if let Some(bus) = self.buses.iter_mut().find(|b| b.id == id) {
            bus.position = position;
        }
    }
}
