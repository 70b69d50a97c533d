//! Rendering: draws the full diagram to a [`Surface`].
//!
//! Every call to [`draw`] is a complete redraw in a fixed z-order:
//!
//! 1. clear
//! 2. background grid
//! 3. buses
//! 4. bus connections
//! 5. node connections
//! 6. nodes (with selection / hover overlays and status indicators)
//!
//! The renderer reads the store and UI state and never mutates either. An
//! edge whose endpoints do not resolve is skipped; an icon that is not ready
//! falls back to a generated glyph. A failing surface call loses only the
//! entity (or node decoration) it belonged to.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use std::ops::Range;

use tracing::{debug, warn};

use crate::config::Theme;
use crate::consts::*;
use crate::doc::{Bus, BusConnection, Connection, DiagramStore, Node, NodeStatus, Orientation};
use crate::error::{CanvasError, EdgeKind};
use crate::geom::{Point, Size};
use crate::hit::{bus_link_endpoints, nearest_point_on_bus, node_center};
use crate::input::UiState;
use crate::style::{LinkFilter, StatusPalette, classify_interface, contrast_color};
use crate::surface::Surface;

/// Looks up icon images that are ready to draw.
///
/// Returning `None` is the normal answer while an image is still loading or
/// after it failed; the renderer then draws the fallback glyph.
pub trait IconSource<I> {
    fn ready_icon(&self, reference: &str) -> Option<&I>;
}

/// An icon source with no images.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoIcons;

impl<I> IconSource<I> for NoIcons {
    fn ready_icon(&self, _reference: &str) -> Option<&I> {
        None
    }
}

/// Everything one frame reads.
pub struct Frame<'a, I> {
    pub store: &'a dyn DiagramStore,
    pub ui: &'a UiState,
    pub theme: &'a Theme,
    pub palette: &'a dyn StatusPalette,
    pub links: &'a dyn LinkFilter,
    pub icons: &'a dyn IconSource<I>,
}

/// Draw the full scene.
///
/// A failing surface call costs only the entity being drawn: it is logged
/// and the frame moves on. Save and restore stay paired on every path.
///
/// # Errors
///
/// Returns [`CanvasError::UninitializedSurface`] for an empty `size`.
pub fn draw<G: Surface>(g: &mut G, size: Size, frame: &Frame<'_, G::Image>) -> Result<(), CanvasError> {
    if size.is_empty() {
        return Err(CanvasError::UninitializedSurface);
    }

    // Layer 1: clear.
    g.clear(size);

    // Layer 2: grid.
    draw_grid(g, size, frame.theme);

    // Layer 3: buses.
    for bus in frame.store.buses() {
        if let Err(e) = isolated(g, |g| draw_bus(g, bus, size, frame.theme)) {
            warn!(error = %e, bus = bus.id, "bus draw failed");
        }
    }

    // Layer 4: bus connections.
    for link in frame.store.bus_connections() {
        match resolve_bus_connection(frame.store, link) {
            Ok((a, b)) => {
                if let Err(e) = draw_bus_connection(g, a, b, link.interface_name(), frame.theme) {
                    warn!(error = %e, "bus connection draw failed");
                }
            }
            Err(e) => warn!(error = %e, "skipping bus connection"),
        }
    }

    // Layer 5: node connections.
    for conn in frame.store.connections() {
        if !conn.show_visual {
            continue;
        }
        match resolve_connection(frame.store, conn) {
            Ok((source, target)) => {
                if frame.links.suppress(source, target) {
                    continue;
                }
                if let Err(e) = draw_connection(g, source, target, conn.interface_name.as_deref(), frame.theme) {
                    warn!(error = %e, source = source.id, target = target.id, "connection draw failed");
                }
            }
            Err(e) => debug!(error = %e, "skipping connection"),
        }
    }

    // Layer 6: nodes.
    for node in frame.store.nodes() {
        draw_node(g, node, frame);
    }

    Ok(())
}

/// Run `f` between a save and its matching restore, whatever `f` returns.
fn isolated<G, F>(g: &mut G, f: F) -> Result<(), CanvasError>
where
    G: Surface,
    F: FnOnce(&mut G) -> Result<(), CanvasError>,
{
    g.save();
    let result = f(g);
    g.restore();
    result
}

// =============================================================
// Grid
// =============================================================

fn draw_grid<G: Surface>(g: &mut G, size: Size, theme: &Theme) {
    g.save();
    g.set_stroke(&theme.grid, GRID_LINE_WIDTH);

    let mut x = 0.0;
    while x <= size.width {
        g.line(Point::new(x, 0.0), Point::new(x, size.height));
        x += GRID_SIZE;
    }
    let mut y = 0.0;
    while y <= size.height {
        g.line(Point::new(0.0, y), Point::new(size.width, y));
        y += GRID_SIZE;
    }

    g.restore();
}

// =============================================================
// Buses
// =============================================================

/// Number of connection-point markers along a bus of `length`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn bus_marker_count(length: f64) -> usize {
    ((length.max(0.0) / BUS_MARKER_SPACING).floor() as usize).saturating_add(1)
}

/// Indices of the markers of `bus` that can touch a surface of `size`.
///
/// Markers off the surface are never drawn, so a very long bus costs no more
/// than one spanning the viewport.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn visible_markers(bus: &Bus, size: Size) -> Range<usize> {
    let (along, across, along_extent, across_extent) = match bus.orientation {
        Orientation::Horizontal => (bus.position.x, bus.position.y, size.width, size.height),
        Orientation::Vertical => (bus.position.y, bus.position.x, size.height, size.width),
    };
    let r = BUS_MARKER_RADIUS;
    if across.is_nan() || across < -r || across > across_extent + r {
        return 0..0;
    }
    let first = ((-r - along) / BUS_MARKER_SPACING).ceil().max(0.0);
    let last = ((along_extent + r - along) / BUS_MARKER_SPACING).floor();
    if last.is_nan() || last < first {
        return 0..0;
    }
    let end = (last as usize).saturating_add(1).min(bus_marker_count(bus.length));
    (first as usize).min(end)..end
}

fn draw_bus<G: Surface>(g: &mut G, bus: &Bus, size: Size, theme: &Theme) -> Result<(), CanvasError> {
    let start = bus.position;
    let end = bus.end();
    let dir = bus.direction();

    // Skeleton.
    g.set_stroke(&bus.color, bus.thickness.max(1.0));
    g.line(start, end);

    // Connection-point markers.
    g.set_fill(&bus.color);
    g.set_stroke(&theme.status_outline, 1.0);
    for i in visible_markers(bus, size) {
        #[allow(clippy::cast_precision_loss)]
        let along = i as f64 * BUS_MARKER_SPACING;
        let at = Point::new(dir.x.mul_add(along, start.x), dir.y.mul_add(along, start.y));
        g.fill_circle(at, BUS_MARKER_RADIUS)?;
        g.stroke_circle(at, BUS_MARKER_RADIUS)?;
    }

    // Name.
    if !bus.name.is_empty() {
        g.set_font(&theme.font);
        let mid = start.midpoint(end);
        let offset = bus.thickness * 0.5 + BUS_LABEL_GAP;
        let at = match bus.orientation {
            Orientation::Horizontal => Point::new(mid.x, mid.y - offset),
            Orientation::Vertical => Point::new(mid.x + offset + g.measure_text(&bus.name) * 0.5, mid.y),
        };
        g.set_fill(&theme.text);
        g.fill_text(&bus.name, at)?;
    }

    Ok(())
}

// =============================================================
// Edges
// =============================================================

fn resolve_connection<'s>(store: &'s dyn DiagramStore, conn: &Connection) -> Result<(&'s Node, &'s Node), CanvasError> {
    let source = store
        .node(conn.source_id)
        .ok_or_else(|| CanvasError::missing_node(EdgeKind::Connection, conn.source_id))?;
    let target = store
        .node(conn.target_id)
        .ok_or_else(|| CanvasError::missing_node(EdgeKind::Connection, conn.target_id))?;
    Ok((source, target))
}

/// Resolve a bus connection to its line endpoints.
fn resolve_bus_connection(store: &dyn DiagramStore, link: &BusConnection) -> Result<(Point, Point), CanvasError> {
    match link {
        BusConnection::NodeToBus { node_id, bus_id, .. } => {
            let node = store
                .node(*node_id)
                .ok_or_else(|| CanvasError::missing_node(EdgeKind::NodeToBus, *node_id))?;
            let bus = store
                .bus(*bus_id)
                .ok_or_else(|| CanvasError::missing_bus(EdgeKind::NodeToBus, *bus_id))?;
            let from = node_center(node);
            Ok((from, nearest_point_on_bus(from, bus)))
        }
        BusConnection::BusToBus { source_bus_id, target_bus_id, .. } => {
            let source = store
                .bus(*source_bus_id)
                .ok_or_else(|| CanvasError::missing_bus(EdgeKind::BusToBus, *source_bus_id))?;
            let target = store
                .bus(*target_bus_id)
                .ok_or_else(|| CanvasError::missing_bus(EdgeKind::BusToBus, *target_bus_id))?;
            Ok(bus_link_endpoints(source, target))
        }
    }
}

fn draw_bus_connection<G: Surface>(
    g: &mut G,
    a: Point,
    b: Point,
    interface: Option<&str>,
    theme: &Theme,
) -> Result<(), CanvasError> {
    isolated(g, |g| {
        g.set_stroke(&theme.bus_connection, BUS_CONNECTION_LINE_WIDTH);
        g.set_dash(&BUS_CONNECTION_DASH)?;
        g.line(a, b);
        g.set_dash(&[])
    })?;

    draw_interface_label(g, interface, a.midpoint(b), theme)
}

fn draw_connection<G: Surface>(
    g: &mut G,
    source: &Node,
    target: &Node,
    interface: Option<&str>,
    theme: &Theme,
) -> Result<(), CanvasError> {
    let a = node_center(source);
    let b = node_center(target);

    g.save();
    g.set_stroke(&theme.connection, CONNECTION_LINE_WIDTH);
    g.line(a, b);
    g.restore();

    draw_interface_label(g, interface, a.midpoint(b), theme)
}

/// Padded badge behind centered text, colored by interface category.
/// Absent or blank names draw nothing.
fn draw_interface_label<G: Surface>(
    g: &mut G,
    interface: Option<&str>,
    at: Point,
    theme: &Theme,
) -> Result<(), CanvasError> {
    let Some(name) = interface.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(());
    };
    let (_, colors) = classify_interface(name);

    isolated(g, |g| {
        g.set_font(&theme.label_font);
        let w = g.measure_text(name) + LABEL_PADDING;
        let (x, y) = (at.x - w * 0.5, at.y - LABEL_HEIGHT * 0.5);

        g.set_fill(colors.background);
        g.fill_rect(x, y, w, LABEL_HEIGHT);
        g.set_stroke(colors.border, 1.0);
        g.stroke_rect(x, y, w, LABEL_HEIGHT);

        g.set_fill(colors.border);
        g.fill_text(name, at)
    })
}

// =============================================================
// Nodes
// =============================================================

/// Draw one node. Each decoration fails on its own: a broken icon falls
/// back to the glyph, and a failed glyph, name or status is logged and
/// skipped without touching the rest.
fn draw_node<G: Surface>(g: &mut G, node: &Node, frame: &Frame<'_, G::Image>) {
    let theme = frame.theme;
    let Point { x, y } = node.position;
    let center = node_center(node);

    g.save();

    // Body.
    g.set_alpha(NODE_FILL_ALPHA);
    g.set_fill(&node.color);
    g.fill_rect(x, y, NODE_SIZE, NODE_SIZE);
    g.set_alpha(1.0);

    // Border. Selection wins over hover.
    let (border, width) = if frame.ui.selected_id == Some(node.id) {
        (theme.selected_border.as_str(), SELECTED_BORDER_WIDTH)
    } else if frame.ui.hovered_id == Some(node.id) {
        (theme.hovered_border.as_str(), HOVER_BORDER_WIDTH)
    } else {
        (theme.node_border.as_str(), NODE_BORDER_WIDTH)
    };
    g.set_stroke(border, width);
    g.stroke_rect(x, y, NODE_SIZE, NODE_SIZE);

    // Icon or fallback glyph.
    let icon = node.icon.as_deref().and_then(|r| frame.icons.ready_icon(r));
    let drew_icon = match icon {
        Some(img) => {
            let side = NODE_SIZE - ICON_INSET * 2.0;
            match g.draw_image(img, x + ICON_INSET, y + ICON_INSET, side, side) {
                Ok(()) => true,
                Err(e) => {
                    warn!(error = %e, node = node.id, "icon draw failed; drawing glyph");
                    false
                }
            }
        }
        None => false,
    };
    if !drew_icon {
        if let Err(e) = isolated(g, |g| draw_glyph(g, node, center, theme)) {
            warn!(error = %e, node = node.id, "glyph draw failed");
        }
    }

    // Name.
    g.set_font(&theme.font);
    g.set_fill(&theme.text);
    if let Err(e) = g.fill_text(&node.name, Point::new(center.x, y + NODE_SIZE + NAME_LABEL_OFFSET)) {
        warn!(error = %e, node = node.id, "node name draw failed");
    }

    if let Err(e) = isolated(g, |g| draw_status(g, node, frame)) {
        warn!(error = %e, node = node.id, "status indicator draw failed");
    }

    g.restore();
}

/// Filled circle in the node color with the first character of its kind.
fn draw_glyph<G: Surface>(g: &mut G, node: &Node, center: Point, theme: &Theme) -> Result<(), CanvasError> {
    g.set_fill(&node.color);
    g.fill_circle(center, GLYPH_RADIUS)?;

    let letter = node.kind.chars().next().map_or_else(|| "?".to_owned(), |c| c.to_uppercase().collect());
    g.set_font(&theme.font);
    g.set_fill(contrast_color(&node.color));
    g.fill_text(&letter, center)
}

fn draw_status<G: Surface>(g: &mut G, node: &Node, frame: &Frame<'_, G::Image>) -> Result<(), CanvasError> {
    let theme = frame.theme;
    let color = frame.palette.status_color(node.status);
    let at = Point::new(node.position.x + NODE_SIZE, node.position.y);

    g.set_glow(color, STATUS_GLOW_BLUR);
    g.set_fill(color);
    g.fill_circle(at, STATUS_RADIUS)?;
    g.set_glow(color, 0.0);

    g.set_stroke(&theme.status_outline, 1.0);
    g.stroke_circle(at, STATUS_RADIUS)?;

    if node.status == NodeStatus::Starting {
        g.set_fill(&theme.status_marker);
        g.fill_circle(at, STATUS_MARKER_RADIUS)?;
    }

    Ok(())
}
