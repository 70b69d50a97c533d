use tracing::{debug, warn};
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::config::{CanvasConfig, Theme};
use crate::doc::{DiagramStore, DocStore, EntityMover, Node, NodeId, Snapshot};
use crate::error::CanvasError;
use crate::geom::{Point, Size};
use crate::hit::{self, Hit};
use crate::input::{DragTarget, InputState, UiState};
use crate::render::{self, Frame, IconSource};
use crate::style::{LinkFilter, NoExclusion, StatusPalette};
use crate::surface::{Surface, WebIcons};

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    SetCursor(String),
    RenderNeeded,
}

/// Receives selection changes, typically to show or hide a details panel.
pub trait SelectionListener {
    fn on_node_selected(&mut self, node: &Node);
    fn on_selection_cleared(&mut self);
}

/// A listener that ignores every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopListener;

impl SelectionListener for NoopListener {
    fn on_node_selected(&mut self, _node: &Node) {}
    fn on_selection_cleared(&mut self) {}
}

/// Core engine state: all logic that does not depend on the canvas element.
///
/// Separated from `Engine` so it can be tested without WASM/browser dependencies.
pub struct EngineCore<S = DocStore> {
    pub store: S,
    pub ui: UiState,
    pub input: InputState,
    pub theme: Theme,
    pub palette: Box<dyn StatusPalette>,
    pub links: Box<dyn LinkFilter>,
    pub listener: Box<dyn SelectionListener>,
    pub viewport_width: f64,
    pub viewport_height: f64,
    pub dpr: f64,
}

impl Default for EngineCore<DocStore> {
    fn default() -> Self {
        Self::with_store(DocStore::new())
    }
}

impl EngineCore<DocStore> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the diagram with a full snapshot.
    pub fn load_snapshot(&mut self, snapshot: Snapshot) {
        self.store.load_snapshot(snapshot);
        self.prune_stale();
    }
}

impl<S> EngineCore<S>
where
    S: DiagramStore + EntityMover,
{
    /// Create an engine over an existing store, with the default theme, no
    /// link exclusions and no selection listener.
    pub fn with_store(store: S) -> Self {
        let theme = Theme::default();
        Self {
            store,
            ui: UiState::default(),
            input: InputState::default(),
            palette: Box::new(theme.status.clone()),
            theme,
            links: Box::new(NoExclusion),
            listener: Box::new(NoopListener),
            viewport_width: 0.0,
            viewport_height: 0.0,
            dpr: 1.0,
        }
    }

    /// Apply a config document: theme, status colors and link exclusions.
    #[must_use]
    pub fn with_config(mut self, config: &CanvasConfig) -> Self {
        self.theme = config.theme.clone();
        self.palette = Box::new(config.theme.status.clone());
        self.links = Box::new(config.link_filter());
        self
    }

    #[must_use]
    pub fn with_listener(mut self, listener: impl SelectionListener + 'static) -> Self {
        self.listener = Box::new(listener);
        self
    }

    #[must_use]
    pub fn with_link_filter(mut self, links: impl LinkFilter + 'static) -> Self {
        self.links = Box::new(links);
        self
    }

    #[must_use]
    pub fn with_palette(mut self, palette: impl StatusPalette + 'static) -> Self {
        self.palette = Box::new(palette);
        self
    }

    // --- Viewport ---

    /// Update viewport dimensions and device pixel ratio.
    ///
    /// Safe mid-drag: the gesture keeps its grab offset, which is in the
    /// surface's own coordinates.
    pub fn set_viewport(&mut self, width_css: f64, height_css: f64, dpr: f64) -> Vec<Action> {
        self.viewport_width = width_css.max(0.0);
        self.viewport_height = height_css.max(0.0);
        self.dpr = if dpr.is_finite() && dpr > 0.0 { dpr } else { 1.0 };
        vec![Action::RenderNeeded]
    }

    #[must_use]
    pub fn viewport(&self) -> Size {
        Size::new(self.viewport_width, self.viewport_height)
    }

    // --- Input events ---

    /// Start a drag on the node or bus under `pt`. Nodes win over buses.
    pub fn on_pointer_down(&mut self, pt: Point) -> Vec<Action> {
        let Some(hit) = hit::hit_test(&self.store, pt) else {
            return Vec::new();
        };
        let origin = match hit {
            Hit::Node(id) => self.store.node(id).map(|n| n.position),
            Hit::Bus(id) => self.store.bus(id).map(|b| b.position),
        };
        let Some(origin) = origin else {
            return Vec::new();
        };

        self.input = InputState::Dragging { target: DragTarget::from(hit), offset: pt - origin };
        vec![Action::SetCursor("grabbing".into())]
    }

    /// Move the dragged entity, or update hover when idle.
    pub fn on_pointer_move(&mut self, pt: Point) -> Vec<Action> {
        match self.input {
            InputState::Dragging { target, offset } => {
                if !self.target_exists(target) {
                    debug!(?target, "drag target left the store; ending drag");
                    self.input = InputState::Idle;
                    return vec![Action::SetCursor("default".into()), Action::RenderNeeded];
                }
                let position = pt - offset;
                match target {
                    DragTarget::Node(id) => self.store.move_node(id, position),
                    DragTarget::Bus(id) => self.store.move_bus(id, position),
                }
                vec![Action::RenderNeeded]
            }
            InputState::Idle => {
                self.ui.hovered_id = hit::node_at(&self.store, pt).map(|n| n.id);
                let cursor = if self.ui.hovered_id.is_some() { "pointer" } else { "default" };
                vec![Action::SetCursor(cursor.into()), Action::RenderNeeded]
            }
        }
    }

    /// End any gesture.
    pub fn on_pointer_up(&mut self, _pt: Point) -> Vec<Action> {
        let was_dragging = self.input.is_dragging();
        self.input = InputState::Idle;
        if was_dragging {
            vec![Action::SetCursor("default".into())]
        } else {
            Vec::new()
        }
    }

    /// Select the node under `pt`, or clear the selection on empty space.
    pub fn on_click(&mut self, pt: Point) -> Vec<Action> {
        match hit::node_at(&self.store, pt) {
            Some(node) => {
                self.ui.selected_id = Some(node.id);
                self.listener.on_node_selected(node);
            }
            None => {
                self.ui.selected_id = None;
                self.listener.on_selection_cleared();
            }
        }
        vec![Action::RenderNeeded]
    }

    // --- Render ---

    /// Forget selection, hover and drag references to entities the store no
    /// longer holds.
    pub fn prune_stale(&mut self) {
        if self.ui.selected_id.is_some_and(|id| self.store.node(id).is_none()) {
            self.ui.selected_id = None;
        }
        if self.ui.hovered_id.is_some_and(|id| self.store.node(id).is_none()) {
            self.ui.hovered_id = None;
        }
        if let Some(target) = self.input.drag_target() {
            if !self.target_exists(target) {
                self.input = InputState::Idle;
            }
        }
    }

    /// Draw the current state to `surface`.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::UninitializedSurface`] before the viewport has a
    /// size, or [`CanvasError::Surface`] if the surface rejects the transform.
    pub fn render<G: Surface>(&mut self, surface: &mut G, icons: &dyn IconSource<G::Image>) -> Result<(), CanvasError> {
        self.prune_stale();
        let size = self.viewport();
        if size.is_empty() {
            return Err(CanvasError::UninitializedSurface);
        }
        surface.reset_transform(self.dpr)?;
        let frame = Frame {
            store: &self.store,
            ui: &self.ui,
            theme: &self.theme,
            palette: self.palette.as_ref(),
            links: self.links.as_ref(),
            icons,
        };
        render::draw(surface, size, &frame)
    }

    // --- Queries ---

    /// The currently selected node, if any.
    #[must_use]
    pub fn selection(&self) -> Option<NodeId> {
        self.ui.selected_id
    }

    /// The node under the pointer, if any.
    #[must_use]
    pub fn hovered(&self) -> Option<NodeId> {
        self.ui.hovered_id
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.input.is_dragging()
    }

    fn target_exists(&self, target: DragTarget) -> bool {
        match target {
            DragTarget::Node(id) => self.store.node(id).is_some(),
            DragTarget::Bus(id) => self.store.bus(id).is_some(),
        }
    }
}

/// The full browser engine. Wraps `EngineCore` and owns the canvas element.
///
/// Handlers render immediately when the core asks for it and hand the
/// remaining actions (cursor changes) back to the host.
pub struct Engine<S = DocStore> {
    canvas: HtmlCanvasElement,
    ctx: Option<CanvasRenderingContext2d>,
    pub icons: WebIcons,
    pub core: EngineCore<S>,
}

impl Engine<DocStore> {
    /// Create a new engine bound to the given canvas element.
    #[must_use]
    pub fn new(canvas: HtmlCanvasElement) -> Self {
        Self::with_core(canvas, EngineCore::new())
    }

    pub fn load_snapshot(&mut self, snapshot: Snapshot) {
        self.core.load_snapshot(snapshot);
        self.render();
    }
}

impl<S> Engine<S>
where
    S: DiagramStore + EntityMover,
{
    /// Bind an existing core to a canvas element.
    #[must_use]
    pub fn with_core(canvas: HtmlCanvasElement, core: EngineCore<S>) -> Self {
        let ctx = context_2d(&canvas);
        Self { canvas, ctx, icons: WebIcons::new(), core }
    }

    /// Resize the backing store to `width_css × height_css` at `dpr` and redraw.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn set_viewport(&mut self, width_css: f64, height_css: f64, dpr: f64) -> Vec<Action> {
        let actions = self.core.set_viewport(width_css, height_css, dpr);
        self.canvas.set_width((self.core.viewport_width * self.core.dpr).round() as u32);
        self.canvas.set_height((self.core.viewport_height * self.core.dpr).round() as u32);
        self.dispatch(actions)
    }

    pub fn on_pointer_down(&mut self, pt: Point) -> Vec<Action> {
        let actions = self.core.on_pointer_down(pt);
        self.dispatch(actions)
    }

    pub fn on_pointer_move(&mut self, pt: Point) -> Vec<Action> {
        let actions = self.core.on_pointer_move(pt);
        self.dispatch(actions)
    }

    pub fn on_pointer_up(&mut self, pt: Point) -> Vec<Action> {
        let actions = self.core.on_pointer_up(pt);
        self.dispatch(actions)
    }

    pub fn on_click(&mut self, pt: Point) -> Vec<Action> {
        let actions = self.core.on_click(pt);
        self.dispatch(actions)
    }

    /// Draw the current state to the canvas. Never fails: problems are logged
    /// and the next render tries again.
    pub fn render(&mut self) {
        let Some(ctx) = self.ctx.as_mut() else {
            debug!("render skipped: no 2d context");
            return;
        };
        match self.core.render(ctx, &self.icons) {
            Ok(()) => {}
            Err(CanvasError::UninitializedSurface) => debug!("render skipped: viewport has no size"),
            Err(e) => warn!(error = %e, "render failed"),
        }
    }

    #[must_use]
    pub fn selection(&self) -> Option<NodeId> {
        self.core.selection()
    }

    fn dispatch(&mut self, actions: Vec<Action>) -> Vec<Action> {
        let (render, rest): (Vec<Action>, Vec<Action>) =
            actions.into_iter().partition(|a| *a == Action::RenderNeeded);
        if !render.is_empty() {
            self.render();
        }
        rest
    }
}

fn context_2d(canvas: &HtmlCanvasElement) -> Option<CanvasRenderingContext2d> {
    match canvas.get_context("2d") {
        Ok(Some(obj)) => match obj.dyn_into::<CanvasRenderingContext2d>() {
            Ok(ctx) => Some(ctx),
            Err(_) => {
                warn!("canvas context is not a CanvasRenderingContext2d");
                None
            }
        },
        Ok(None) => {
            warn!("canvas has no 2d context");
            None
        }
        Err(e) => {
            warn!(error = ?e, "failed to acquire 2d context");
            None
        }
    }
}
