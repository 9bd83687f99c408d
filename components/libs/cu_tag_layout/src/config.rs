//! Tuning of the relation trackers.
//!
//! It can be given as a copper component config or as a RON snippet, with the same keys:
//!
//! ```text
//! (
//!     buffer_length_ms: 3000,
//!     buffer_max_gap_ms: 500,
//!     update_delta_ms: 20,
//!     rot_scale: 5.0,
//!     rot_pow: 2.0,
//! )
//! ```
//! Missing keys take their default value.

use crate::error::{TagLayoutError, TagLayoutResult};
use cu29::config::ComponentConfig;
use cu29::clock::CuDuration;
use serde::Deserialize;

const DEFAULT_BUFFER_LENGTH_MS: u32 = 3000;
const DEFAULT_BUFFER_MAX_GAP_MS: u32 = 500;
const DEFAULT_UPDATE_DELTA_MS: u32 = 20;
// arbitrary scaling of rotation radians relative to translation meters
const DEFAULT_ROT_SCALE: f64 = 5.0;
const DEFAULT_ROT_POW: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TagLayoutConfig {
    /// How long observations of a tag pair are retained.
    pub buffer_length: CuDuration,
    /// Largest gap between two observations of a pair still considered continuous.
    pub buffer_max_gap: CuDuration,
    /// Expected period between two updates.
    pub update_delta: CuDuration,
    /// Weight of the rotation deviation in the distrust score.
    pub rot_scale: f64,
    /// Exponent of the rotation deviation in the distrust score.
    pub rot_pow: f64,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawConfig {
    buffer_length_ms: u32,
    buffer_max_gap_ms: u32,
    update_delta_ms: u32,
    rot_scale: f64,
    rot_pow: f64,
}

impl Default for RawConfig {
    fn default() -> Self {
        Self {
            buffer_length_ms: DEFAULT_BUFFER_LENGTH_MS,
            buffer_max_gap_ms: DEFAULT_BUFFER_MAX_GAP_MS,
            update_delta_ms: DEFAULT_UPDATE_DELTA_MS,
            rot_scale: DEFAULT_ROT_SCALE,
            rot_pow: DEFAULT_ROT_POW,
        }
    }
}

fn from_ms(ms: u32) -> CuDuration {
    CuDuration::from(ms as u64 * 1_000_000u64)
}

impl Default for TagLayoutConfig {
    fn default() -> Self {
        Self::from_raw_unchecked(RawConfig::default())
    }
}

impl TagLayoutConfig {
    /// Default tuning for a given update period.
    pub fn with_update_delta(update_delta: CuDuration) -> Self {
        Self {
            update_delta,
            ..Self::default()
        }
    }

    fn from_raw_unchecked(raw: RawConfig) -> Self {
        Self {
            buffer_length: from_ms(raw.buffer_length_ms),
            buffer_max_gap: from_ms(raw.buffer_max_gap_ms),
            update_delta: from_ms(raw.update_delta_ms),
            rot_scale: raw.rot_scale,
            rot_pow: raw.rot_pow,
        }
    }

    fn from_raw(raw: RawConfig) -> TagLayoutResult<Self> {
        let config = Self::from_raw_unchecked(raw);
        config.validate()?;
        Ok(config)
    }

    /// Reads the tuning from a copper component config, `None` gives the defaults.
    pub fn from_component_config(config: Option<&ComponentConfig>) -> TagLayoutResult<Self> {
        let Some(config) = config else {
            return Ok(Self::default());
        };
        let defaults = RawConfig::default();
        Self::from_raw(RawConfig {
            buffer_length_ms: config
                .get::<u32>("buffer_length_ms")
                .unwrap_or(defaults.buffer_length_ms),
            buffer_max_gap_ms: config
                .get::<u32>("buffer_max_gap_ms")
                .unwrap_or(defaults.buffer_max_gap_ms),
            update_delta_ms: config
                .get::<u32>("update_delta_ms")
                .unwrap_or(defaults.update_delta_ms),
            rot_scale: config.get::<f64>("rot_scale").unwrap_or(defaults.rot_scale),
            rot_pow: config.get::<f64>("rot_pow").unwrap_or(defaults.rot_pow),
        })
    }

    pub fn from_ron(text: &str) -> TagLayoutResult<Self> {
        let raw: RawConfig =
            ron::from_str(text).map_err(|e| TagLayoutError::ConfigParse(e.to_string()))?;
        Self::from_raw(raw)
    }

    pub fn validate(&self) -> TagLayoutResult<()> {
        if self.buffer_length.0 == 0 {
            return Err(TagLayoutError::InvalidConfig(
                "buffer_length must be strictly positive".into(),
            ));
        }
        if self.buffer_max_gap.0 == 0 || self.buffer_max_gap > self.buffer_length {
            return Err(TagLayoutError::InvalidConfig(format!(
                "buffer_max_gap ({}) must be in ]0, buffer_length ({})]",
                self.buffer_max_gap, self.buffer_length
            )));
        }
        if self.update_delta.0.saturating_mul(2) >= self.buffer_length.0 {
            return Err(TagLayoutError::InvalidConfig(format!(
                "update_delta ({}) is too long for a buffer of {}",
                self.update_delta, self.buffer_length
            )));
        }
        if !self.rot_scale.is_finite() || self.rot_scale < 0.0 {
            return Err(TagLayoutError::InvalidConfig(format!(
                "rot_scale must be finite and positive, got {}",
                self.rot_scale
            )));
        }
        if !self.rot_pow.is_finite() || self.rot_pow <= 0.0 {
            return Err(TagLayoutError::InvalidConfig(format!(
                "rot_pow must be finite and strictly positive, got {}",
                self.rot_pow
            )));
        }
        Ok(())
    }

    /// Span a buffer must cover before its content is trusted:
    /// the retention window minus two update periods of jitter.
    pub fn full_window(&self) -> CuDuration {
        CuDuration(
            self.buffer_length
                .0
                .saturating_sub(self.update_delta.0.saturating_mul(2)),
        )
    }
}
