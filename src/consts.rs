//! Shared numeric constants for the diagram engine.

// ── Geometry ────────────────────────────────────────────────────

/// Width and height of every node box, in surface units.
pub const NODE_SIZE: f64 = 40.0;

/// Spacing of the background grid lines.
pub const GRID_SIZE: f64 = 20.0;

/// Distance between connection-point markers along a bus.
pub const BUS_MARKER_SPACING: f64 = 40.0;

/// Radius of a bus connection-point marker.
pub const BUS_MARKER_RADIUS: f64 = 3.0;

// ── Node decoration ─────────────────────────────────────────────

/// Radius of the fallback glyph circle drawn when no icon is ready.
pub const GLYPH_RADIUS: f64 = 12.0;

/// Inset of an icon image from the node box edge.
pub const ICON_INSET: f64 = 8.0;

/// Radius of the status indicator in the node's top-right corner.
pub const STATUS_RADIUS: f64 = 5.0;

/// Blur radius of the status indicator halo.
pub const STATUS_GLOW_BLUR: f64 = 6.0;

/// Radius of the extra dot drawn on a `starting` status indicator.
pub const STATUS_MARKER_RADIUS: f64 = 2.0;

/// Vertical distance from the node box bottom to the name label baseline.
pub const NAME_LABEL_OFFSET: f64 = 12.0;

/// Alpha of the node body fill.
pub const NODE_FILL_ALPHA: f64 = 0.15;

// ── Strokes ─────────────────────────────────────────────────────

pub const NODE_BORDER_WIDTH: f64 = 1.5;
pub const HOVER_BORDER_WIDTH: f64 = 2.5;
pub const SELECTED_BORDER_WIDTH: f64 = 3.0;
pub const GRID_LINE_WIDTH: f64 = 0.5;
pub const CONNECTION_LINE_WIDTH: f64 = 2.0;
pub const BUS_CONNECTION_LINE_WIDTH: f64 = 1.5;

/// Dash pattern of bus-connection lines.
pub const BUS_CONNECTION_DASH: [f64; 2] = [6.0, 4.0];

// ── Labels ──────────────────────────────────────────────────────

/// Horizontal padding added to the measured text width of a label badge.
pub const LABEL_PADDING: f64 = 10.0;

/// Height of a label badge.
pub const LABEL_HEIGHT: f64 = 16.0;

/// Gap between a bus and its name label.
pub const BUS_LABEL_GAP: f64 = 10.0;
