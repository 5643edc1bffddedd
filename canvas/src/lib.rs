//! Spine annotation editor for a bookshelf photograph.
//!
//! Each book is an item with a label and a location in the photo: an
//! axis-aligned region, optionally refined into four corner points that hug
//! the spine. The crate compiles to WebAssembly for the browser overlay and
//! natively for tests. It maps between pixels and normalized coordinates,
//! hit-tests clicks, runs the four-corner placement state machine, builds
//! the overlay display list, and talks to the record store. The host page
//! wires DOM events to the [`engine::Engine`] and acts on the returned
//! [`engine::Action`]s.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Editor controller: testable [`engine::EngineCore`] and the canvas-bound [`engine::Engine`] |
//! | [`editor`] | Runs controller requests against a [`store::RecordStore`] |
//! | [`doc`] | Item, geometry and wire record types; the in-memory item collection |
//! | [`surface`] | Pixel ↔ normalized coordinate mapping |
//! | [`points`] | The four-slot corner set and its placement cursor |
//! | [`session`] | Editing state for the selected item |
//! | [`hit`] | Hit-testing against control points and item regions |
//! | [`input`] | Input event types and the pointer gesture state machine |
//! | [`render`] | Overlay display list |
//! | [`backend`] | Replays the display list onto a `Canvas2D` context |
//! | [`store`] | Record store client (`RecordStore`, `HttpStore`) |
//! | [`settings`] | Display settings kept by the store |
//! | [`error`] | Editor error kinds |
//! | [`consts`] | Shared numeric constants (hit radius, drag threshold, etc.) |

pub mod backend;
pub mod consts;
pub mod doc;
pub mod editor;
pub mod engine;
pub mod error;
pub mod hit;
pub mod input;
pub mod points;
pub mod render;
pub mod session;
pub mod settings;
pub mod store;
pub mod surface;
