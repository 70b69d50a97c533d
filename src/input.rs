//! Input model: transient UI state and the drag state machine.
//!
//! `UiState` is what the renderer sees (selection and hover). `InputState` is
//! the gesture tracked between pointer-down and pointer-up. Both live on one
//! [`crate::engine::EngineCore`] and are never persisted.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::doc::{BusId, NodeId};
use crate::geom::Point;
use crate::hit::Hit;

/// Selection and hover state visible to the renderer.
///
/// The two are independent and may name the same node. Either may go stale
/// when the store drops a node; the renderer then draws no highlight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UiState {
    /// Node chosen by the last click, if any.
    pub selected_id: Option<NodeId>,
    /// Node currently under the pointer, if any.
    pub hovered_id: Option<NodeId>,
}

/// The entity a drag gesture moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragTarget {
    Node(NodeId),
    Bus(BusId),
}

impl From<Hit> for DragTarget {
    fn from(hit: Hit) -> Self {
        match hit {
            Hit::Node(id) => Self::Node(id),
            Hit::Bus(id) => Self::Bus(id),
        }
    }
}

/// Gesture state between pointer-down and pointer-up.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum InputState {
    /// No gesture in progress; pointer moves update hover.
    #[default]
    Idle,
    /// An entity follows the pointer.
    Dragging {
        target: DragTarget,
        /// Pointer position minus entity position at grab time. Each move
        /// places the entity at `pointer - offset`, so no error accumulates.
        offset: Point,
    },
}

impl InputState {
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        matches!(self, Self::Dragging { .. })
    }

    /// The dragged entity, if a drag is in progress.
    #[must_use]
    pub fn drag_target(&self) -> Option<DragTarget> {
        match self {
            Self::Idle => None,
            Self::Dragging { target, .. } => Some(*target),
        }
    }
}
