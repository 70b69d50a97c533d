//! Styling rules: interface-label classification, status colors, contrast
//! text color, and the link-suppression predicate.

#[cfg(test)]
#[path = "style_test.rs"]
mod style_test;

use serde::{Deserialize, Serialize};

use crate::doc::{Node, NodeStatus};

// =============================================================
// Interface labels
// =============================================================

/// Classification of an interface name, used to color its label badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterfaceCategory {
    /// Core control-plane reference points (N1, N2, N4, N11, ...).
    ControlPlane,
    /// The radio interface between a device and the access network.
    Radio,
    /// User-plane data paths (N3, N6, N9).
    UserPlane,
    /// Service-based API interfaces (SBI, Namf, Nsmf, ...).
    ServiceApi,
    /// Anything unrecognized, including the empty name.
    Default,
}

/// Background and border color of a label badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LabelColors {
    pub background: &'static str,
    pub border: &'static str,
}

const CONTROL_PLANE: &[&str] = &["N1", "N2", "N4", "N7", "N8", "N10", "N11", "N12", "N14", "N15", "N22"];
const RADIO: &[&str] = &["UU", "NR-UU", "LTE-UU", "RADIO", "AIR"];
const USER_PLANE: &[&str] = &["N3", "N6", "N9"];

impl InterfaceCategory {
    /// Badge colors for this category.
    #[must_use]
    pub fn colors(self) -> LabelColors {
        match self {
            Self::ControlPlane => LabelColors { background: "#EFF6FF", border: "#2563EB" },
            Self::Radio => LabelColors { background: "#FEF3C7", border: "#D97706" },
            Self::UserPlane => LabelColors { background: "#ECFDF5", border: "#059669" },
            Self::ServiceApi => LabelColors { background: "#F5F3FF", border: "#7C3AED" },
            Self::Default => LabelColors { background: "#F3F4F6", border: "#6B7280" },
        }
    }
}

/// Classify an interface name. Total over all strings; matching ignores case
/// and surrounding whitespace.
#[must_use]
pub fn classify_interface(name: &str) -> (InterfaceCategory, LabelColors) {
    let category = category_of(name);
    (category, category.colors())
}

fn category_of(name: &str) -> InterfaceCategory {
    let trimmed = name.trim();
    let upper = trimmed.to_ascii_uppercase();
    if upper.is_empty() {
        return InterfaceCategory::Default;
    }
    if CONTROL_PLANE.contains(&upper.as_str()) {
        return InterfaceCategory::ControlPlane;
    }
    if RADIO.contains(&upper.as_str()) {
        return InterfaceCategory::Radio;
    }
    if USER_PLANE.contains(&upper.as_str()) {
        return InterfaceCategory::UserPlane;
    }
    if upper == "SBI" || is_service_name(trimmed) {
        return InterfaceCategory::ServiceApi;
    }
    InterfaceCategory::Default
}

/// Service-based interface names look like `Namf`, `Nsmf`, `Nnrf`.
fn is_service_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next() == Some('N') && chars.clone().count() >= 2 && chars.all(|c| c.is_ascii_lowercase())
}

// =============================================================
// Status colors
// =============================================================

/// Maps a node status to its indicator color. Must be total.
pub trait StatusPalette {
    fn status_color(&self, status: NodeStatus) -> &str;
}

/// Configurable status colors; the default palette used by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusColors {
    pub active: String,
    pub starting: String,
    pub inactive: String,
    pub unknown: String,
}

impl Default for StatusColors {
    fn default() -> Self {
        Self {
            active: "#22C55E".into(),
            starting: "#F59E0B".into(),
            inactive: "#EF4444".into(),
            unknown: "#9CA3AF".into(),
        }
    }
}

impl StatusPalette for StatusColors {
    fn status_color(&self, status: NodeStatus) -> &str {
        match status {
            NodeStatus::Active => &self.active,
            NodeStatus::Starting => &self.starting,
            NodeStatus::Inactive => &self.inactive,
            NodeStatus::Unknown => &self.unknown,
        }
    }
}

// =============================================================
// Contrast
// =============================================================

/// Black or white, whichever reads better on top of `color`.
///
/// Accepts `#rgb` and `#rrggbb`; anything else is assumed dark.
#[must_use]
pub fn contrast_color(color: &str) -> &'static str {
    match parse_hex(color) {
        Some((r, g, b)) => {
            let luma = 0.299 * f64::from(r) + 0.587 * f64::from(g) + 0.114 * f64::from(b);
            if luma > 150.0 { "#000000" } else { "#FFFFFF" }
        }
        None => "#FFFFFF",
    }
}

fn parse_hex(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.trim().strip_prefix('#')?;
    if !hex.is_ascii() {
        return None;
    }
    match hex.len() {
        3 => {
            let digit = |i: usize| u8::from_str_radix(&hex[i..=i], 16).map(|v| v * 17);
            match (digit(0), digit(1), digit(2)) {
                (Ok(r), Ok(g), Ok(b)) => Some((r, g, b)),
                _ => None,
            }
        }
        6 => {
            let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16);
            match (byte(0), byte(2), byte(4)) {
                (Ok(r), Ok(g), Ok(b)) => Some((r, g, b)),
                _ => None,
            }
        }
        _ => None,
    }
}

// =============================================================
// Link suppression
// =============================================================

/// Decides whether a visible node connection should still be hidden.
pub trait LinkFilter {
    fn suppress(&self, source: &Node, target: &Node) -> bool;
}

impl<F> LinkFilter for F
where
    F: Fn(&Node, &Node) -> bool,
{
    fn suppress(&self, source: &Node, target: &Node) -> bool {
        self(source, target)
    }
}

/// Suppresses nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoExclusion;

impl LinkFilter for NoExclusion {
    fn suppress(&self, _source: &Node, _target: &Node) -> bool {
        false
    }
}

/// Suppresses connections between listed kind pairs, in either direction.
/// Kind comparison ignores case.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KindPairExclusion {
    pairs: Vec<(String, String)>,
}

impl KindPairExclusion {
    #[must_use]
    pub fn new<I, A, B>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (A, B)>,
        A: Into<String>,
        B: Into<String>,
    {
        Self { pairs: pairs.into_iter().map(|(a, b)| (a.into(), b.into())).collect() }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl LinkFilter for KindPairExclusion {
    fn suppress(&self, source: &Node, target: &Node) -> bool {
        let (s, t) = (source.kind.as_str(), target.kind.as_str());
        self.pairs.iter().any(|(a, b)| {
            (a.eq_ignore_ascii_case(s) && b.eq_ignore_ascii_case(t))
                || (a.eq_ignore_ascii_case(t) && b.eq_ignore_ascii_case(s))
        })
    }
}
