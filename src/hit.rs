//! Hit-testing and anchor geometry for diagram entities.
//!
//! Everything here is a pure function of its inputs. Picking walks the store
//! in iteration order, nodes before buses, and the first match wins.

#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::consts::NODE_SIZE;
use crate::doc::{Bus, BusId, DiagramStore, Node, NodeId};
use crate::geom::{Point, distance_to_segment, project_onto_segment};

/// Which entity a pointer landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    Node(NodeId),
    Bus(BusId),
}

/// Whether `p` lies inside the node's box (edges inclusive).
#[must_use]
pub fn point_in_node(p: Point, node: &Node) -> bool {
    let min = node.position;
    p.x >= min.x && p.x <= min.x + NODE_SIZE && p.y >= min.y && p.y <= min.y + NODE_SIZE
}

/// Whether `p` lies inside the capsule of diameter `bus.thickness` around
/// the bus segment.
#[must_use]
pub fn point_in_bus(p: Point, bus: &Bus) -> bool {
    let radius = bus.thickness.max(0.0) * 0.5;
    distance_to_segment(p, bus.position, bus.end()) <= radius
}

/// Closest point on the bus segment to `p`.
#[must_use]
pub fn nearest_point_on_bus(p: Point, bus: &Bus) -> Point {
    project_onto_segment(p, bus.position, bus.end())
}

/// Midpoint of the bus segment.
#[must_use]
pub fn bus_midpoint(bus: &Bus) -> Point {
    bus.position.midpoint(bus.end())
}

/// Connection anchors of a bus: the centers of its two halves.
#[must_use]
pub fn anchor_points(bus: &Bus) -> [Point; 2] {
    let mid = bus_midpoint(bus);
    [bus.position.midpoint(mid), mid.midpoint(bus.end())]
}

/// Endpoints of a bus-to-bus link.
///
/// Starts at the anchor of `source` nearest `target`'s midpoint and ends at
/// the anchor of `target` nearest that start.
#[must_use]
pub fn bus_link_endpoints(source: &Bus, target: &Bus) -> (Point, Point) {
    let start = nearest_anchor(source, bus_midpoint(target));
    let end = nearest_anchor(target, start);
    (start, end)
}

fn nearest_anchor(bus: &Bus, toward: Point) -> Point {
    let [a, b] = anchor_points(bus);
    if a.distance(toward) <= b.distance(toward) { a } else { b }
}

/// Center of the node's box.
#[must_use]
pub fn node_center(node: &Node) -> Point {
    let half = NODE_SIZE * 0.5;
    Point::new(node.position.x + half, node.position.y + half)
}

/// First node under `p`, in store order.
#[must_use]
pub fn node_at<S: DiagramStore + ?Sized>(store: &S, p: Point) -> Option<&Node> {
    store.nodes().iter().find(|n| point_in_node(p, n))
}

/// First bus under `p`, in store order.
#[must_use]
pub fn bus_at<S: DiagramStore + ?Sized>(store: &S, p: Point) -> Option<&Bus> {
    store.buses().iter().find(|b| point_in_bus(p, b))
}

/// Resolve `p` to an entity: nodes first, then buses.
#[must_use]
pub fn hit_test<S: DiagramStore + ?Sized>(store: &S, p: Point) -> Option<Hit> {
    if let Some(node) = node_at(store, p) {
        return Some(Hit::Node(node.id));
    }
    bus_at(store, p).map(|bus| Hit::Bus(bus.id))
}
