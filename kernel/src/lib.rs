//! Geometry and interaction kernel for a 2-D shape editor.
//!
//! The kernel turns pointer and keyboard events into shape patches. It owns
//! no drawing surface and does no I/O: hosts feed [`input::ModeStateEvent`]s
//! into [`engine::EngineCore`], persist the [`engine::Action`]s it returns,
//! and draw the merged shapes plus the [`render::RenderOverlay`].
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Testable [`engine::EngineCore`] and the host-facing actions |
//! | [`fsm`] | Stack-based mode state machine and grouped states |
//! | [`states`] | Default, moving, resizing, rotating, panning and drawing states |
//! | [`context`] | Selection, live overlay, and document revisions seen by states |
//! | [`composite`] | Per-revision scene index: tree, merged view, geometry queries |
//! | [`doc`] | Shape records, attachments, constraints and patch maps |
//! | [`shape`] | Per-kind geometry contract and its registry |
//! | [`bbox`] | Selection box hit-testing and resize/rotate affines |
//! | [`resize`] | Group-constrained propagation of an affine down shape trees |
//! | [`attach`] | Keeping attached shapes on their hosts |
//! | [`snap`] | Snapping points and rects to guides and the grid |
//! | [`geom`] | Points, affine matrices, rects, polygons and segments |
//! | [`input`] | Input event types |
//! | [`camera`] | Pan/zoom camera and coordinate conversions |
//! | [`render`] | Interaction overlay handed to the renderer |
//! | [`config`] | Tunables with defaults |
//! | [`consts`] | Shared numeric constants (tolerances, handle sizes, etc.) |

pub mod attach;
pub mod bbox;
pub mod camera;
pub mod composite;
pub mod config;
pub mod consts;
pub mod context;
pub mod doc;
pub mod engine;
pub mod fsm;
pub mod geom;
pub mod input;
pub mod render;
pub mod resize;
pub mod shape;
pub mod snap;
pub mod states;
