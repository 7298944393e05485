//! Camera system for viewing the scene.
//!
//! Provides a perspective camera and an orbit controller with rotation,
//! panning, zoom and a direct eye-Z setter for the parameter panel.

/// Orbit controller managing rotation, pan and zoom.
pub mod controller;
/// Core camera struct and GPU uniform type.
pub mod core;
