//! Caption animation scheduling.

/// Placement scheduling over the audio timeline.
pub mod scheduler;
