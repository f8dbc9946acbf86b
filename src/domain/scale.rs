// SPDX-License-Identifier: MPL-2.0
//! Scale factor newtype.
//!
//! A [`ScaleFactor`] is the multiplier applied to an SVG's declared viewport
//! before rasterization. It is always finite and strictly positive.

use crate::config::THUMBNAIL_BASE_EDGE;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// Presets
// =============================================================================

/// Scale factors offered as quick choices (1x through 64x).
pub const PRESETS: [f64; 7] = [1.0, 2.0, 4.0, 8.0, 16.0, 32.0, 64.0];

/// Scale used when none is given.
pub const DEFAULT: f64 = 1.0;

// =============================================================================
// ScaleFactor
// =============================================================================

/// Multiplier applied to the SVG viewport, guaranteed finite and `> 0`.
///
/// Unlike the clamping newtypes elsewhere, out-of-range values are rejected:
/// silently turning `0` into something else would produce a surprising file.
///
/// # Example
///
/// ```
/// use svgscale::domain::ScaleFactor;
///
/// let scale: ScaleFactor = "2x".parse().unwrap();
/// assert_eq!(scale.apply_to_dimensions(16.0, 8.0), (32.0, 16.0));
/// assert_eq!(scale.to_string(), "2");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct ScaleFactor(f64);

impl ScaleFactor {
    /// Creates a scale factor, rejecting zero, negative and non-finite values.
    pub fn new(value: f64) -> Result<Self> {
        if value.is_finite() && value > 0.0 {
            Ok(Self(value))
        } else {
            Err(Error::InvalidScale(format!(
                "{value} (scale must be a positive number)"
            )))
        }
    }

    /// Returns the raw multiplier.
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }

    /// Multiplies both dimensions by the factor.
    #[must_use]
    pub fn apply_to_dimensions(self, width: f64, height: f64) -> (f64, f64) {
        (width * self.0, height * self.0)
    }

    /// Edge length in pixels of a square thumbnail at this scale
    /// (`THUMBNAIL_BASE_EDGE * scale`).
    ///
    /// Rounded to the nearest pixel and never smaller than 1.
    #[must_use]
    pub fn thumbnail_edge(self) -> u32 {
        let edge = (f64::from(THUMBNAIL_BASE_EDGE) * self.0).round().max(1.0);
        // The conditional guarantees value is <= u32::MAX, so cast is safe
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let edge = if edge > f64::from(u32::MAX) {
            u32::MAX
        } else {
            edge as u32
        };
        edge
    }

    /// Returns the preset scale factors.
    pub fn presets() -> impl Iterator<Item = ScaleFactor> {
        PRESETS.iter().map(|&value| ScaleFactor(value))
    }

    /// Returns whether this factor is one of the presets.
    #[must_use]
    pub fn is_preset(self) -> bool {
        PRESETS.iter().any(|&p| (p - self.0).abs() < f64::EPSILON)
    }
}

impl Default for ScaleFactor {
    fn default() -> Self {
        Self(DEFAULT)
    }
}

/// Formats as the shortest decimal form: `2`, `1.5`, `0.25`.
impl fmt::Display for ScaleFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Parses `"2"`, `"2x"`, `"2X"` and `"1.5"`.
impl FromStr for ScaleFactor {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let number = trimmed
            .strip_suffix('x')
            .or_else(|| trimmed.strip_suffix('X'))
            .unwrap_or(trimmed);
        let value: f64 = number
            .trim()
            .parse()
            .map_err(|_| Error::InvalidScale(format!("'{s}' is not a number")))?;
        Self::new(value)
    }
}

impl TryFrom<f64> for ScaleFactor {
    type Error = Error;

    fn try_from(value: f64) -> Result<Self> {
        Self::new(value)
    }
}

impl From<ScaleFactor> for f64 {
    fn from(scale: ScaleFactor) -> Self {
        scale.0
    }
}
