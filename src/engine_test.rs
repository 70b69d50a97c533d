#![allow(clippy::float_cmp)]

use std::cell::RefCell;
use std::rc::Rc;

use super::*;
use crate::consts::CONNECTION_LINE_WIDTH;
use crate::doc::{Bus, BusConnection, Connection, NodeStatus, Orientation};
use crate::render::NoIcons;
use crate::style::KindPairExclusion;
use crate::surface::{DrawCall, RecordingSurface};

// =============================================================
// Helpers
// =============================================================

fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

fn make_node(id: NodeId, x: f64, y: f64, kind: &str) -> Node {
    Node {
        id,
        name: kind.into(),
        kind: kind.into(),
        position: pt(x, y),
        color: "#2563EB".into(),
        status: NodeStatus::Active,
        icon: None,
    }
}

fn make_bus(id: u64, x: f64, y: f64) -> Bus {
    Bus {
        id,
        name: format!("bus-{id}"),
        position: pt(x, y),
        orientation: Orientation::Horizontal,
        length: 200.0,
        thickness: 6.0,
        color: "#333333".into(),
    }
}

/// AMF at (100,100) and SMF at (300,100) joined on N2, plus a bus below.
fn sample_store() -> DocStore {
    let mut store = DocStore::new();
    store.insert_node(make_node(1, 100.0, 100.0, "AMF"));
    store.insert_node(make_node(2, 300.0, 100.0, "SMF"));
    store.insert_bus(make_bus(10, 0.0, 300.0));
    store.add_connection(Connection {
        source_id: 1,
        target_id: 2,
        interface_name: Some("N2".into()),
        show_visual: true,
    });
    store
}

/// Store that records every move request before applying it.
#[derive(Default)]
struct TrackingStore {
    inner: DocStore,
    moves: Vec<(DragTarget, Point)>,
}

impl DiagramStore for TrackingStore {
    fn nodes(&self) -> &[Node] {
        self.inner.nodes()
    }

    fn buses(&self) -> &[Bus] {
        self.inner.buses()
    }

    fn connections(&self) -> &[Connection] {
        self.inner.connections()
    }

    fn bus_connections(&self) -> &[BusConnection] {
        self.inner.bus_connections()
    }
}

impl EntityMover for TrackingStore {
    fn move_node(&mut self, id: NodeId, position: Point) {
        self.moves.push((DragTarget::Node(id), position));
        self.inner.move_node(id, position);
    }

    fn move_bus(&mut self, id: u64, position: Point) {
        self.moves.push((DragTarget::Bus(id), position));
        self.inner.move_bus(id, position);
    }
}

fn tracking_core() -> EngineCore<TrackingStore> {
    EngineCore::with_store(TrackingStore { inner: sample_store(), moves: Vec::new() })
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Event {
    Selected(NodeId),
    Cleared,
}

#[derive(Clone, Default)]
struct Recorder(Rc<RefCell<Vec<Event>>>);

impl SelectionListener for Recorder {
    fn on_node_selected(&mut self, node: &Node) {
        self.0.borrow_mut().push(Event::Selected(node.id));
    }

    fn on_selection_cleared(&mut self) {
        self.0.borrow_mut().push(Event::Cleared);
    }
}

fn connection_lines(g: &RecordingSurface) -> Vec<(Point, Point)> {
    g.calls()
        .iter()
        .filter_map(|c| match c {
            DrawCall::Line { from, to, width, dashed: false, .. } if *width == CONNECTION_LINE_WIDTH => {
                Some((*from, *to))
            }
            _ => None,
        })
        .collect()
}

fn cursor(s: &str) -> Action {
    Action::SetCursor(s.into())
}

// =============================================================
// Click selection
// =============================================================

#[test]
fn click_selects_and_clears_with_notifications() {
    let recorder = Recorder::default();
    let events = Rc::clone(&recorder.0);
    let mut core = EngineCore::with_store(sample_store()).with_listener(recorder);

    assert_eq!(core.on_click(pt(120.0, 120.0)), vec![Action::RenderNeeded]);
    assert_eq!(core.selection(), Some(1));

    assert_eq!(core.on_click(pt(500.0, 500.0)), vec![Action::RenderNeeded]);
    assert_eq!(core.selection(), None);

    assert_eq!(*events.borrow(), vec![Event::Selected(1), Event::Cleared]);
}

#[test]
fn selection_is_exclusive() {
    let mut core = EngineCore::with_store(sample_store());
    core.on_click(pt(120.0, 120.0));
    core.on_click(pt(320.0, 120.0));
    assert_eq!(core.selection(), Some(2));
}

#[test]
fn click_on_bus_clears_selection() {
    let mut core = EngineCore::with_store(sample_store());
    core.on_click(pt(120.0, 120.0));
    core.on_click(pt(50.0, 300.0));
    assert_eq!(core.selection(), None);
}

#[test]
fn selected_scene_renders_single_labelled_connection() {
    let mut core = EngineCore::with_store(sample_store());
    core.set_viewport(800.0, 600.0, 1.0);
    core.on_click(pt(120.0, 120.0));

    let mut g = RecordingSurface::new();
    core.render(&mut g, &NoIcons).expect("render");

    assert_eq!(connection_lines(&g), vec![(pt(120.0, 120.0), pt(320.0, 120.0))]);
    assert!(g.texts().contains(&("N2", pt(220.0, 120.0))));
    assert!(g.calls().iter().any(|c| matches!(
        c,
        DrawCall::StrokeRect { x, y, color, .. } if *x == 100.0 && *y == 100.0 && *color == core.theme.selected_border
    )));
}

// =============================================================
// Drag
// =============================================================

#[test]
fn drag_moves_node_by_grab_offset() {
    let mut core = tracking_core();

    assert_eq!(core.on_pointer_down(pt(110.0, 115.0)), vec![cursor("grabbing")]);
    assert!(core.is_dragging());

    assert_eq!(core.on_pointer_move(pt(200.0, 200.0)), vec![Action::RenderNeeded]);
    assert_eq!(core.store.moves, vec![(DragTarget::Node(1), pt(190.0, 185.0))]);

    core.on_pointer_move(pt(250.0, 260.0));
    assert_eq!(core.store.moves.len(), 2);
    assert_eq!(core.store.moves[1], (DragTarget::Node(1), pt(240.0, 245.0)));
    assert_eq!(core.store.node(1).map(|n| n.position), Some(pt(240.0, 245.0)));
}

#[test]
fn drag_moves_bus() {
    let mut core = tracking_core();
    core.on_pointer_down(pt(50.0, 302.0));
    core.on_pointer_move(pt(60.0, 400.0));
    assert_eq!(core.store.moves, vec![(DragTarget::Bus(10), pt(10.0, 398.0))]);
}

#[test]
fn node_wins_over_bus_on_pointer_down() {
    let mut core = tracking_core();
    core.store.inner.insert_node(make_node(3, 0.0, 280.0, "UPF"));
    core.on_pointer_down(pt(10.0, 300.0));
    assert_eq!(core.input.drag_target(), Some(DragTarget::Node(3)));
}

#[test]
fn pointer_up_ends_drag() {
    let mut core = tracking_core();
    core.on_pointer_down(pt(110.0, 115.0));
    assert_eq!(core.on_pointer_up(pt(110.0, 115.0)), vec![cursor("default")]);
    assert!(!core.is_dragging());

    // Further moves hover instead of dragging.
    core.on_pointer_move(pt(400.0, 400.0));
    assert!(core.store.moves.is_empty());
}

#[test]
fn pointer_down_on_empty_space_is_noop() {
    let mut core = tracking_core();
    assert!(core.on_pointer_down(pt(600.0, 500.0)).is_empty());
    assert!(!core.is_dragging());
    assert!(core.on_pointer_up(pt(600.0, 500.0)).is_empty());
}

#[test]
fn resize_mid_drag_keeps_gesture() {
    let mut core = tracking_core();
    core.on_pointer_down(pt(110.0, 115.0));
    assert_eq!(core.set_viewport(1024.0, 768.0, 2.0), vec![Action::RenderNeeded]);
    assert!(core.is_dragging());

    core.on_pointer_move(pt(130.0, 135.0));
    assert_eq!(core.store.moves, vec![(DragTarget::Node(1), pt(120.0, 120.0))]);

    let mut g = RecordingSurface::new();
    core.render(&mut g, &NoIcons).expect("render");
    assert_eq!(g.scale(), 2.0);
}

#[test]
fn drag_ends_when_target_vanishes() {
    let mut core = tracking_core();
    core.on_pointer_down(pt(110.0, 115.0));
    core.store.inner.remove_node(1);

    assert_eq!(core.on_pointer_move(pt(200.0, 200.0)), vec![cursor("default"), Action::RenderNeeded]);
    assert!(!core.is_dragging());
    assert!(core.store.moves.is_empty());
}

#[test]
fn bus_drag_ends_when_bus_is_removed() {
    let mut core = tracking_core();
    core.on_pointer_down(pt(50.0, 302.0));
    assert_eq!(core.input.drag_target(), Some(DragTarget::Bus(10)));
    core.store.inner.remove_bus(10);

    assert_eq!(core.on_pointer_move(pt(60.0, 400.0)), vec![cursor("default"), Action::RenderNeeded]);
    assert!(!core.is_dragging());
    assert!(core.store.moves.is_empty());
}

// =============================================================
// Hover
// =============================================================

#[test]
fn hover_tracks_node_under_pointer() {
    let mut core = EngineCore::with_store(sample_store());

    assert_eq!(core.on_pointer_move(pt(120.0, 120.0)), vec![cursor("pointer"), Action::RenderNeeded]);
    assert_eq!(core.hovered(), Some(1));

    assert_eq!(core.on_pointer_move(pt(500.0, 500.0)), vec![cursor("default"), Action::RenderNeeded]);
    assert_eq!(core.hovered(), None);
}

#[test]
fn hover_ignores_buses() {
    let mut core = EngineCore::with_store(sample_store());
    core.on_pointer_move(pt(50.0, 300.0));
    assert_eq!(core.hovered(), None);
}

#[test]
fn hover_does_not_change_selection() {
    let mut core = EngineCore::with_store(sample_store());
    core.on_click(pt(120.0, 120.0));
    core.on_pointer_move(pt(320.0, 120.0));
    assert_eq!(core.selection(), Some(1));
    assert_eq!(core.hovered(), Some(2));
}

// =============================================================
// Viewport and render
// =============================================================

#[test]
fn render_before_viewport_is_uninitialized() {
    let mut core = EngineCore::with_store(sample_store());
    let mut g = RecordingSurface::new();
    let err = core.render(&mut g, &NoIcons).unwrap_err();
    assert!(matches!(err, CanvasError::UninitializedSurface));
    assert!(g.calls().is_empty());
}

#[test]
fn viewport_sanitizes_input() {
    let mut core = EngineCore::new();
    core.set_viewport(-10.0, 300.0, f64::NAN);
    assert_eq!(core.viewport(), Size::new(0.0, 300.0));
    assert_eq!(core.dpr, 1.0);

    core.set_viewport(640.0, 480.0, 0.0);
    assert_eq!(core.dpr, 1.0);
}

#[test]
fn render_prunes_stale_references() {
    let mut core = EngineCore::with_store(sample_store());
    core.set_viewport(800.0, 600.0, 1.0);
    core.on_click(pt(120.0, 120.0));
    core.on_pointer_move(pt(120.0, 120.0));
    core.store.remove_node(1);

    let mut g = RecordingSurface::new();
    core.render(&mut g, &NoIcons).expect("render");
    assert_eq!(core.selection(), None);
    assert_eq!(core.hovered(), None);
    // The connection to the removed node is skipped, not an error.
    assert!(connection_lines(&g).is_empty());
}

#[test]
fn load_snapshot_replaces_diagram_and_prunes() {
    let mut core = EngineCore::with_store(sample_store());
    core.on_click(pt(120.0, 120.0));
    core.load_snapshot(Snapshot::default());
    assert!(core.store.is_empty());
    assert_eq!(core.selection(), None);
}

#[test]
fn config_exclusions_hide_connections() {
    let config = CanvasConfig {
        excluded_kind_pairs: vec![("AMF".into(), "SMF".into())],
        ..CanvasConfig::default()
    };
    let mut core = EngineCore::with_store(sample_store()).with_config(&config);
    core.set_viewport(800.0, 600.0, 1.0);

    let mut g = RecordingSurface::new();
    core.render(&mut g, &NoIcons).expect("render");
    assert!(connection_lines(&g).is_empty());
}

#[test]
fn custom_link_filter_hides_connections() {
    let mut core = EngineCore::with_store(sample_store()).with_link_filter(KindPairExclusion::new([("smf", "amf")]));
    core.set_viewport(800.0, 600.0, 1.0);

    let mut g = RecordingSurface::new();
    core.render(&mut g, &NoIcons).expect("render");
    assert!(connection_lines(&g).is_empty());
}
