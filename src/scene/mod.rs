//! Timed caption plan over the output timeline.

/// Placement timeline and per-time overlay lookup.
pub mod timeline;
