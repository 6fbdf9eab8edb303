//! Core configuration for charanim-core.

use serde::{Deserialize, Serialize};

use crate::error::{AnimationError, Result};

/// Blend timing shared by every actor an engine drives.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Seconds to cross-fade from the previous main animation into a newly pushed one.
    pub mix_duration: f32,
    /// Seconds before the end of the main animation at which the pose starts
    /// handing back to the procedural pose; also the ramp time of the transition factor.
    pub transition_window: f32,
    /// Speed used by `Engine::play` when the caller passes none.
    pub default_speed: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mix_duration: 0.3125,
            transition_window: 0.2,
            default_speed: 1.0,
        }
    }
}

impl Config {
    pub fn from_json(json: &str) -> Result<Self> {
        let cfg: Config = serde_json::from_str(json).map_err(|e| AnimationError::InvalidConfig {
            reason: e.to_string(),
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("mix_duration", self.mix_duration),
            ("transition_window", self.transition_window),
            ("default_speed", self.default_speed),
        ];
        for (name, value) in fields {
            if !(value.is_finite() && value > 0.0) {
                return Err(AnimationError::InvalidConfig {
                    reason: format!("{name} must be a positive number, got {value}"),
                });
            }
        }
        Ok(())
    }
}
