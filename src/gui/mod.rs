//! Native-side GUI layer: a wry webview hosting the parameter panel.
//!
//! The webview is created as a child of the winit window and communicates
//! with the engine via a minimal JSON IPC bridge.

/// Panel state owned by the viewer.
pub(crate) mod panel;
/// Wry webview creation, IPC handler, and state push helpers.
pub mod webview;
