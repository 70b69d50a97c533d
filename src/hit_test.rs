#![allow(clippy::float_cmp)]

use super::*;
use crate::doc::{DocStore, NodeStatus, Orientation};

fn make_node(id: NodeId, x: f64, y: f64) -> Node {
    Node {
        id,
        name: format!("n{id}"),
        kind: "UPF".into(),
        position: Point::new(x, y),
        color: "#123456".into(),
        status: NodeStatus::Active,
        icon: None,
    }
}

fn make_bus(id: BusId, x: f64, y: f64, orientation: Orientation, length: f64) -> Bus {
    Bus {
        id,
        name: format!("b{id}"),
        position: Point::new(x, y),
        orientation,
        length,
        thickness: 8.0,
        color: "#555".into(),
    }
}

// =============================================================
// point_in_node
// =============================================================

#[test]
fn node_contains_its_own_position() {
    let n = make_node(1, 100.0, 100.0);
    assert!(point_in_node(n.position, &n));
}

#[test]
fn node_contains_far_corner_but_nothing_beyond() {
    let n = make_node(1, 100.0, 100.0);
    assert!(point_in_node(Point::new(140.0, 140.0), &n));
    for eps in [1e-9, 0.001, 0.5, 10.0] {
        assert!(!point_in_node(Point::new(140.0 + eps, 140.0 + eps), &n));
    }
}

#[test]
fn node_rejects_points_left_and_above() {
    let n = make_node(1, 100.0, 100.0);
    assert!(!point_in_node(Point::new(99.9, 120.0), &n));
    assert!(!point_in_node(Point::new(120.0, 99.9), &n));
}

// =============================================================
// point_in_bus
// =============================================================

#[test]
fn horizontal_bus_capsule() {
    let bus = make_bus(1, 0.0, 100.0, Orientation::Horizontal, 200.0);
    assert!(point_in_bus(Point::new(100.0, 100.0), &bus));
    assert!(point_in_bus(Point::new(100.0, 104.0), &bus));
    assert!(!point_in_bus(Point::new(100.0, 104.5), &bus));
    // Rounded caps extend past the ends by half the thickness.
    assert!(point_in_bus(Point::new(-3.0, 100.0), &bus));
    assert!(!point_in_bus(Point::new(-5.0, 100.0), &bus));
}

#[test]
fn vertical_bus_capsule() {
    let bus = make_bus(1, 50.0, 0.0, Orientation::Vertical, 300.0);
    assert!(point_in_bus(Point::new(53.0, 150.0), &bus));
    assert!(!point_in_bus(Point::new(60.0, 150.0), &bus));
    assert!(!point_in_bus(Point::new(50.0, 305.0), &bus));
}

#[test]
fn zero_length_bus_is_a_disc() {
    let bus = make_bus(1, 10.0, 10.0, Orientation::Horizontal, 0.0);
    assert!(point_in_bus(Point::new(12.0, 10.0), &bus));
    assert!(!point_in_bus(Point::new(15.0, 10.0), &bus));
}

// =============================================================
// nearest_point_on_bus
// =============================================================

#[test]
fn nearest_point_projects_onto_axis() {
    let bus = make_bus(1, 0.0, 100.0, Orientation::Horizontal, 200.0);
    assert_eq!(nearest_point_on_bus(Point::new(80.0, 20.0), &bus), Point::new(80.0, 100.0));
}

#[test]
fn nearest_point_stays_within_segment() {
    let bus = make_bus(1, 0.0, 100.0, Orientation::Horizontal, 200.0);
    let far = [
        Point::new(-1e6, -1e6),
        Point::new(1e6, 5.0),
        Point::new(250.0, 400.0),
        Point::new(-0.1, 100.0),
    ];
    for p in far {
        let q = nearest_point_on_bus(p, &bus);
        assert_eq!(q.y, 100.0);
        assert!((0.0..=200.0).contains(&q.x), "{q:?} outside bus");
    }
}

#[test]
fn nearest_point_on_vertical_bus() {
    let bus = make_bus(1, 50.0, 0.0, Orientation::Vertical, 300.0);
    assert_eq!(nearest_point_on_bus(Point::new(0.0, 500.0), &bus), Point::new(50.0, 300.0));
}

// =============================================================
// Anchors
// =============================================================

#[test]
fn anchor_points_are_half_centers() {
    let bus = make_bus(1, 0.0, 0.0, Orientation::Horizontal, 200.0);
    assert_eq!(bus_midpoint(&bus), Point::new(100.0, 0.0));
    assert_eq!(anchor_points(&bus), [Point::new(50.0, 0.0), Point::new(150.0, 0.0)]);
}

#[test]
fn bus_link_uses_facing_anchors() {
    let left = make_bus(1, 0.0, 0.0, Orientation::Horizontal, 200.0);
    let right = make_bus(2, 400.0, 0.0, Orientation::Horizontal, 200.0);
    let (a, b) = bus_link_endpoints(&left, &right);
    assert_eq!(a, Point::new(150.0, 0.0));
    assert_eq!(b, Point::new(450.0, 0.0));
}

#[test]
fn node_center_is_box_center() {
    assert_eq!(node_center(&make_node(1, 100.0, 100.0)), Point::new(120.0, 120.0));
}

// =============================================================
// Picking
// =============================================================

#[test]
fn first_node_in_store_order_wins() {
    let mut store = DocStore::new();
    store.insert_node(make_node(1, 0.0, 0.0));
    store.insert_node(make_node(2, 10.0, 10.0));
    assert_eq!(node_at(&store, Point::new(20.0, 20.0)).map(|n| n.id), Some(1));
    assert_eq!(node_at(&store, Point::new(45.0, 45.0)).map(|n| n.id), Some(2));
}

#[test]
fn nodes_win_over_buses() {
    let mut store = DocStore::new();
    store.insert_bus(make_bus(7, 0.0, 20.0, Orientation::Horizontal, 200.0));
    store.insert_node(make_node(1, 0.0, 0.0));
    assert_eq!(hit_test(&store, Point::new(20.0, 20.0)), Some(Hit::Node(1)));
    assert_eq!(hit_test(&store, Point::new(150.0, 20.0)), Some(Hit::Bus(7)));
    assert_eq!(hit_test(&store, Point::new(150.0, 90.0)), None);
}

#[test]
fn empty_store_hits_nothing() {
    assert_eq!(hit_test(&DocStore::new(), Point::new(0.0, 0.0)), None);
}
