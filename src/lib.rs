// -- Lint policy ---------------------------------------------------------
// This is the single source of truth for crate-wide lints.

// Broad lint groups
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
// Documentation
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::bare_urls)]
// No panicking in library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
// No debug/print artifacts
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
// Import hygiene
#![deny(clippy::wildcard_imports)]
// Complexity limits (thresholds in clippy.toml)
#![deny(clippy::cognitive_complexity)]
#![deny(clippy::too_many_lines)]
#![deny(clippy::excessive_nesting)]
// Function signature hygiene
#![deny(clippy::too_many_arguments)]
#![deny(clippy::fn_params_excessive_bools)]
// Clone / pass-by-value hygiene
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::implicit_clone)]
// String hygiene
#![deny(clippy::inefficient_to_string)]
#![deny(clippy::redundant_closure_for_method_calls)]
#![deny(clippy::manual_string_new)]
#![deny(clippy::str_to_string)]
// Cargo lints (warn, not deny since cargo lints can be noisy)
#![warn(clippy::cargo)]
// Unused / redundant code
#![deny(unused_results)]
#![deny(unused_qualifications)]
// Cast hygiene
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]

//! Interactive 3D nozzle scene built on wgpu.
//!
//! A procedurally built nozzle is drawn above a ground plane, together with
//! a translucent spray cone whose opening angle can be changed at runtime.
//! The spray can be cleared (hidden) and the camera orbited, panned, zoomed
//! or moved along its view axis.
//!
//! # Key entry points
//!
//! - [`NozzleEngine`] - GPU context, renderer and command sink
//! - [`NozzleCommand`] - every state change the engine accepts
//! - [`SprayController`] - cone regeneration on angle events
//! - [`Scene`] - node tree plus refcounted geometry and material pools
//! - [`Options`] - runtime configuration loaded from TOML
//!
//! # Architecture
//!
//! All state changes flow through [`NozzleEngine::execute`]. The scene is
//! plain data; the renderer mirrors it into GPU caches each frame, evicting
//! buffers for resources the scene released. With the `viewer` feature a
//! winit window drives the engine, and with `gui` a wry webview panel
//! exposes the spray and camera sliders.

pub mod camera;
pub mod controller;
pub mod engine;
pub mod error;
pub mod gpu;
#[cfg(feature = "gui")]
pub mod gui;
pub mod input;
pub mod options;
pub mod renderer;
pub mod scene;
pub mod util;
#[cfg(feature = "viewer")]
pub mod viewer;

pub use controller::{ControllerError, SprayController};
pub use engine::{NozzleCommand, NozzleEngine};
pub use error::NozzleError;
pub use input::{InputEvent, MouseButton};
pub use options::Options;
pub use scene::Scene;
#[cfg(feature = "viewer")]
pub use viewer::Viewer;
