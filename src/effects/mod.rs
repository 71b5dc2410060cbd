//! Caption effects and the catalog a run cycles through.

/// Effect definitions, overlay state and the effect catalog.
pub mod catalog;
