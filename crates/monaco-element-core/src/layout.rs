//! Auto-grow height computation.

use serde::{Deserialize, Serialize};

/// Pixel height of one editor line at the engine's default font size.
pub const LINE_HEIGHT: u32 = 19;

/// What to do when the content is taller than `maxHeight`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HeightPolicy {
    /// Apply and report `clamp(raw, min, max)`.
    #[default]
    Clamp,
    /// Leave the frame at its current size once content exceeds `maxHeight`;
    /// the editor scrolls internally.
    SkipOverflow,
}

/// Optional min/max bounds on the auto-grow height.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HeightBounds {
    pub min: Option<u32>,
    pub max: Option<u32>,
}

impl HeightBounds {
    pub fn new(min: Option<u32>, max: Option<u32>) -> Self {
        Self { min, max }
    }

    /// Clamp into the bounds. If they are inverted, `max` wins.
    pub fn clamp(&self, height: u32) -> u32 {
        let mut height = height;
        if let Some(min) = self.min {
            height = height.max(min);
        }
        if let Some(max) = self.max {
            height = height.min(max);
        }
        height
    }
}

/// Normalize a pixel bound from JS: zero, negative and non-finite values
/// mean "no bound".
pub fn bound_from_px(px: f64) -> Option<u32> {
    (px.is_finite() && px > 0.0).then(|| px.round().min(u32::MAX as f64) as u32)
}

/// Height of `line_count` lines before bounds are applied.
pub fn raw_height(line_count: u32, line_height: u32) -> u32 {
    line_count.saturating_mul(line_height)
}

/// Height the sandbox should resize to, or `None` if the policy says to
/// leave the frame alone.
pub fn resolve_height(
    line_count: u32,
    line_height: u32,
    bounds: HeightBounds,
    policy: HeightPolicy,
) -> Option<u32> {
    let raw = raw_height(line_count, line_height);
    match policy {
        HeightPolicy::Clamp => Some(bounds.clamp(raw)),
        HeightPolicy::SkipOverflow => match bounds.max {
            Some(max) if raw > max => None,
            _ => Some(bounds.clamp(raw)),
        },
    }
}
