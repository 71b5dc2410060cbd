use crate::effects::catalog::OverlayState;
use crate::foundation::error::{StillcastError, StillcastResult};
use crate::schedule::scheduler::Placement;

/// Ordered caption placements over a fixed total duration.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Timeline {
    duration_secs: f64,
    placements: Vec<Placement>,
}

impl Timeline {
    /// Build a timeline, checking that placements are ordered, non-overlapping and in bounds.
    pub fn new(duration_secs: f64, placements: Vec<Placement>) -> StillcastResult<Self> {
        if !duration_secs.is_finite() || duration_secs <= 0.0 {
            return Err(StillcastError::invalid_config(format!(
                "timeline duration must be positive and finite, got {duration_secs}"
            )));
        }
        for p in &placements {
            if !(p.start_secs >= 0.0 && p.duration_secs > 0.0) {
                return Err(StillcastError::invalid_config(format!(
                    "placement {} at {}s has an invalid window",
                    p.effect, p.start_secs
                )));
            }
            if p.end_secs() > duration_secs {
                return Err(StillcastError::invalid_config(format!(
                    "placement {} ends at {}s, past the timeline end {}s",
                    p.effect,
                    p.end_secs(),
                    duration_secs
                )));
            }
        }
        for w in placements.windows(2) {
            if w[1].start_secs < w[0].end_secs() {
                return Err(StillcastError::invalid_config(format!(
                    "placements at {}s and {}s overlap",
                    w[0].start_secs, w[1].start_secs
                )));
            }
        }
        Ok(Self {
            duration_secs,
            placements,
        })
    }

    /// Total duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.duration_secs
    }

    /// Placements in timeline order.
    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    /// The placement whose window contains `t`, if any.
    pub fn active_at(&self, t: f64) -> Option<&Placement> {
        // Sorted and disjoint: only the last placement starting at or before t can contain it.
        let idx = self.placements.partition_point(|p| p.start_secs <= t);
        let p = self.placements.get(idx.checked_sub(1)?)?;
        p.contains(t).then_some(p)
    }

    /// Overlay state at global time `t`, `None` when no caption is shown.
    pub fn overlay_at(&self, t: f64) -> Option<OverlayState> {
        let p = self.active_at(t)?;
        Some(p.effect.apply(&OverlayState::IDENTITY, t - p.start_secs))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/timeline.rs"]
mod tests;
