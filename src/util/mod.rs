//! Shared utilities for the engine.

/// Frame pacing and FPS measurement.
pub mod frame_timing;
