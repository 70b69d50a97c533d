//! Diagram rendering and input engine for network topology views.
//!
//! This crate draws a topology of nodes, buses and the links between them
//! onto a 2D surface and turns pointer input into selection, hover and drag
//! interactions. It compiles to WebAssembly for the browser, where
//! [`engine::Engine`] drives a `<canvas>`, and natively, where the same
//! pipeline draws into a [`surface::RecordingSurface`]. The entity store,
//! the movers that persist positions, and the details panel are external;
//! the engine reaches them only through the traits in [`doc`] and
//! [`engine`].
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Browser [`engine::Engine`] and testable [`engine::EngineCore`] |
//! | [`doc`] | Entity types, store traits and the in-memory [`doc::DocStore`] |
//! | [`geom`] | Points, sizes and segment projection |
//! | [`hit`] | Hit-testing and connection anchor geometry |
//! | [`input`] | UI state and the drag state machine |
//! | [`render`] | Full-frame scene rendering |
//! | [`surface`] | Drawing surface trait, Canvas2D backend, draw-call recorder |
//! | [`style`] | Interface-label classes, status colors, link suppression |
//! | [`config`] | JSON theme and exclusion config |
//! | [`consts`] | Shared numeric constants (node size, grid, label metrics) |
//! | [`error`] | Crate error type |

pub mod config;
pub mod consts;
pub mod doc;
pub mod engine;
pub mod error;
pub mod geom;
pub mod hit;
pub mod input;
pub mod render;
pub mod style;
pub mod surface;
