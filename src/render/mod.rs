//! Frame production: caption rasterization, compositing over the base image, and the frame loop.

/// Title layout and rasterization.
pub mod caption;
/// Premultiplied source-over compositing.
pub mod composite;
/// Frame buffer type.
pub mod frame;
/// Frame loop feeding a sink.
pub mod pipeline;
