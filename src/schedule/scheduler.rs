use rand::Rng;

use crate::effects::catalog::{Effect, EffectCatalog};
use crate::foundation::error::{StillcastError, StillcastResult};

/// One effect bound to a window of the timeline.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Placement {
    /// Effect materialized inside the window.
    pub effect: Effect,
    /// Window start in seconds (>= 0).
    pub start_secs: f64,
    /// Window length in seconds (> 0).
    pub duration_secs: f64,
}

impl Placement {
    /// Exclusive window end.
    pub fn end_secs(&self) -> f64 {
        self.start_secs + self.duration_secs
    }

    /// Return `true` when `t` falls in `[start, end)`.
    pub fn contains(&self, t: f64) -> bool {
        self.start_secs <= t && t < self.end_secs()
    }
}

/// Range the per-run animation duration is drawn from, plus the gap between windows.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AnimationTiming {
    /// Lower bound of the animation duration draw (seconds).
    pub min_secs: f64,
    /// Upper bound of the animation duration draw (seconds, inclusive).
    pub max_secs: f64,
    /// Idle time between two placements (seconds).
    pub gap_secs: f64,
}

impl Default for AnimationTiming {
    fn default() -> Self {
        Self {
            min_secs: 5.0,
            max_secs: 15.0,
            gap_secs: 60.0,
        }
    }
}

impl AnimationTiming {
    /// Check `0 < min <= max` and `gap >= 0`, all finite.
    pub fn validate(&self) -> StillcastResult<()> {
        if !self.min_secs.is_finite() || !self.max_secs.is_finite() {
            return Err(StillcastError::invalid_config("animation duration range must be finite"));
        }
        if self.min_secs <= 0.0 {
            return Err(StillcastError::invalid_config(
                "animation duration range must start above zero",
            ));
        }
        if self.min_secs > self.max_secs {
            return Err(StillcastError::invalid_config(format!(
                "animation duration range is inverted: min {} > max {}",
                self.min_secs, self.max_secs
            )));
        }
        validate_gap(self.gap_secs)
    }

    /// Draw one animation duration uniformly from `[min, max]`.
    pub fn draw_duration<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        if self.min_secs == self.max_secs {
            return self.min_secs;
        }
        rng.gen_range(self.min_secs..=self.max_secs)
    }
}

/// Everything decided for one run: the shuffled order, the drawn duration and the placements.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ScheduledRun {
    /// Catalog order after the per-run shuffle.
    pub order: EffectCatalog,
    /// Animation duration used by every placement of this run.
    pub animation_secs: f64,
    /// Gap between placements.
    pub gap_secs: f64,
    /// Placements in timeline order.
    pub placements: Vec<Placement>,
}

/// Tile `[0, total_secs)` with placements of `animation_secs`, separated by `gap_secs`.
///
/// The catalog is cycled round-robin. A placement is emitted only when it ends strictly before
/// `total_secs`; the first one that would not is where scheduling stops. Placement `i` starts at
/// `i * (animation_secs + gap_secs)`.
pub fn schedule(
    total_secs: f64,
    catalog: &EffectCatalog,
    animation_secs: f64,
    gap_secs: f64,
) -> StillcastResult<Vec<Placement>> {
    if catalog.is_empty() {
        return Err(StillcastError::invalid_config("effect catalog must not be empty"));
    }
    validate_total(total_secs)?;
    if !animation_secs.is_finite() || animation_secs <= 0.0 {
        return Err(StillcastError::invalid_config(format!(
            "animation duration must be positive and finite, got {animation_secs}"
        )));
    }
    validate_gap(gap_secs)?;

    let stride = animation_secs + gap_secs;
    let mut placements = Vec::new();
    for (i, effect) in catalog.effects().iter().cycle().enumerate() {
        let start_secs = (i as f64) * stride;
        if start_secs + animation_secs >= total_secs {
            break;
        }
        placements.push(Placement {
            effect: *effect,
            start_secs,
            duration_secs: animation_secs,
        });
    }
    Ok(placements)
}

/// Plan one run: shuffle the catalog once, draw one animation duration, then [`schedule`].
///
/// All configuration is validated before `rng` is touched.
#[tracing::instrument(skip(catalog, rng), fields(effects = catalog.len()))]
pub fn plan_run<R: Rng + ?Sized>(
    total_secs: f64,
    catalog: &EffectCatalog,
    timing: &AnimationTiming,
    rng: &mut R,
) -> StillcastResult<ScheduledRun> {
    if catalog.is_empty() {
        return Err(StillcastError::invalid_config("effect catalog must not be empty"));
    }
    validate_total(total_secs)?;
    timing.validate()?;

    let order = catalog.shuffled(rng);
    let animation_secs = timing.draw_duration(rng);
    let placements = schedule(total_secs, &order, animation_secs, timing.gap_secs)?;

    tracing::info!(
        animation_secs,
        gap_secs = timing.gap_secs,
        placements = placements.len(),
        "scheduled caption animations"
    );
    for p in &placements {
        tracing::debug!(
            effect = %p.effect,
            start = p.start_secs,
            duration = p.duration_secs,
            "placement"
        );
    }

    Ok(ScheduledRun {
        order,
        animation_secs,
        gap_secs: timing.gap_secs,
        placements,
    })
}

/// One placement of `effect` spanning the whole timeline.
pub fn full_length(total_secs: f64, effect: Effect) -> StillcastResult<Vec<Placement>> {
    validate_total(total_secs)?;
    Ok(vec![Placement {
        effect,
        start_secs: 0.0,
        duration_secs: total_secs,
    }])
}

fn validate_total(total_secs: f64) -> StillcastResult<()> {
    if !total_secs.is_finite() || total_secs <= 0.0 {
        return Err(StillcastError::invalid_config(format!(
            "total duration must be positive and finite, got {total_secs}"
        )));
    }
    Ok(())
}

fn validate_gap(gap_secs: f64) -> StillcastResult<()> {
    if !gap_secs.is_finite() || gap_secs < 0.0 {
        return Err(StillcastError::invalid_config(format!(
            "gap duration must be non-negative and finite, got {gap_secs}"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/schedule/scheduler.rs"]
mod tests;
