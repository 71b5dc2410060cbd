use std::f64::consts::TAU;
use std::fmt;
use std::str::FromStr;

use rand::Rng;
use rand::seq::SliceRandom;

use crate::foundation::error::{StillcastError, StillcastResult};

/// Transformable state of the caption overlay for one frame.
///
/// The caption raster itself never changes; effects only move these knobs.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OverlayState {
    /// Uniform scale about the caption anchor.
    pub scale: f64,
    /// Global opacity in `[0, 1]`.
    pub opacity: f64,
    /// Vertical offset in pixels, applied after scaling.
    pub offset_y: f64,
}

impl OverlayState {
    /// Untransformed caption: unit scale, fully opaque, no offset.
    pub const IDENTITY: Self = Self {
        scale: 1.0,
        opacity: 1.0,
        offset_y: 0.0,
    };

    /// Return `true` when nothing would be drawn.
    pub fn is_invisible(&self) -> bool {
        self.opacity <= 0.0 || self.scale <= 0.0
    }
}

impl Default for OverlayState {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// A named, stateless, time-parameterized caption transform.
///
/// `t` passed to [`Effect::apply`] is local to the placement: it is `0` at the placement start.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Effect {
    /// Scale oscillation, amplitude 0.2, period 1s.
    Wave,
    /// Same transform as [`Effect::Wave`]; kept as its own catalog entry so a shuffled pass still
    /// cycles four effects.
    Accordion,
    /// Opacity oscillation between 0 and 1, period 1s.
    Opacity,
    /// Gentle scale oscillation, amplitude 0.05, period 2s.
    Elastic,
    /// Slow downward drift at 80% opacity. Only used by the static caption mode.
    Drift,
}

const WAVE_AMPLITUDE: f64 = 0.2;
const ELASTIC_AMPLITUDE: f64 = 0.05;
const DRIFT_OPACITY: f64 = 0.8;
const DRIFT_PX_PER_SEC: f64 = 10.0;

impl Effect {
    /// Every effect a catalog may be built from, in source order.
    pub const CATALOG: [Effect; 4] = [
        Effect::Wave,
        Effect::Accordion,
        Effect::Opacity,
        Effect::Elastic,
    ];

    /// Stable lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            Effect::Wave => "wave",
            Effect::Accordion => "accordion",
            Effect::Opacity => "opacity",
            Effect::Elastic => "elastic",
            Effect::Drift => "drift",
        }
    }

    /// Period of the transform in seconds, `None` for non-periodic effects.
    pub fn period_secs(self) -> Option<f64> {
        match self {
            Effect::Wave | Effect::Accordion | Effect::Opacity => Some(1.0),
            Effect::Elastic => Some(2.0),
            Effect::Drift => None,
        }
    }

    /// Apply the transform at local time `t` (seconds since the placement started).
    pub fn apply(self, overlay: &OverlayState, t: f64) -> OverlayState {
        let mut out = *overlay;
        match self {
            Effect::Wave | Effect::Accordion => {
                out.scale *= wave_scale(t);
            }
            Effect::Opacity => {
                let factor = 0.5 + 0.5 * (TAU * t).sin();
                out.opacity = (out.opacity * factor).clamp(0.0, 1.0);
            }
            Effect::Elastic => {
                out.scale *= 1.0 + ELASTIC_AMPLITUDE * (TAU * t / 2.0).sin();
            }
            Effect::Drift => {
                out.opacity = (out.opacity * DRIFT_OPACITY).clamp(0.0, 1.0);
                out.offset_y += DRIFT_PX_PER_SEC * t.max(0.0);
            }
        }
        out
    }
}

fn wave_scale(t: f64) -> f64 {
    1.0 + WAVE_AMPLITUDE * (TAU * t).sin()
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Effect {
    type Err = StillcastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "wave" => Ok(Effect::Wave),
            "accordion" => Ok(Effect::Accordion),
            "opacity" => Ok(Effect::Opacity),
            "elastic" => Ok(Effect::Elastic),
            "drift" => Ok(Effect::Drift),
            _ => Err(StillcastError::unknown_effect(s.trim())),
        }
    }
}

/// Look up a catalog effect by name and apply it.
///
/// `drift` is not a catalog entry and is reported as unknown here.
pub fn apply_named(name: &str, overlay: &OverlayState, t: f64) -> StillcastResult<OverlayState> {
    let effect: Effect = name.parse()?;
    if !Effect::CATALOG.contains(&effect) {
        return Err(StillcastError::unknown_effect(name.trim()));
    }
    Ok(effect.apply(overlay, t))
}

/// Ordered set of effects a run cycles through.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct EffectCatalog {
    effects: Vec<Effect>,
}

impl EffectCatalog {
    /// Wrap an explicit effect order. Emptiness is checked by the scheduler.
    pub fn new(effects: Vec<Effect>) -> Self {
        Self { effects }
    }

    /// `[wave, accordion, opacity, elastic]`.
    pub fn standard() -> Self {
        Self::new(Effect::CATALOG.to_vec())
    }

    /// Resolve catalog entries by name.
    ///
    /// `drift` is reserved for the static caption mode and cannot be scheduled.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> StillcastResult<Self> {
        let mut effects = Vec::with_capacity(names.len());
        for name in names {
            let effect: Effect = name.as_ref().parse()?;
            if !Effect::CATALOG.contains(&effect) {
                return Err(StillcastError::invalid_config(format!(
                    "effect '{effect}' cannot be part of the animation catalog"
                )));
            }
            effects.push(effect);
        }
        Ok(Self::new(effects))
    }

    /// Return a copy permuted once with `rng`.
    pub fn shuffled<R: Rng + ?Sized>(&self, rng: &mut R) -> Self {
        let mut effects = self.effects.clone();
        effects.shuffle(rng);
        Self { effects }
    }

    /// Effects in cycling order.
    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.effects.len()
    }

    /// Return `true` when there is nothing to schedule.
    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }
}

impl Default for EffectCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/catalog.rs"]
mod tests;
