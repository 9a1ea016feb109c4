//! Mapping of pointer drags onto limb transforms.
//!
//! One drag moves and rotates a limb at the same time:
//!
//! ```text
//! top'        = clamp(top0 + 100 * dy / height, 0, 100)
//! horizontal' = horizontal0 + 100 * dx / width
//! rotation'   = normalize(rotation0 + kx * dx - ky * dy)
//! ```
//!
//! All deltas are measured from the gesture origin and applied to the
//! transform captured when the gesture started, so repeated moves never
//! compound.

use serde::{Deserialize, Serialize};

use crate::limb::LimbTransform;

/// Rendered size of the box a limb is positioned in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContainerSize {
    /// Width in pixels.
    pub width: f64,
    /// Height in pixels.
    pub height: f64,
}

impl ContainerSize {
    /// Create a container size.
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Width usable as a divisor. Degenerate sizes count as one pixel.
    fn safe_width(self) -> f64 {
        guard_dimension(self.width)
    }

    /// Height usable as a divisor. Degenerate sizes count as one pixel.
    fn safe_height(self) -> f64 {
        guard_dimension(self.height)
    }
}

fn guard_dimension(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        1.0
    }
}

/// Pixel offset of the pointer from the gesture origin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PointerDelta {
    /// Horizontal offset in pixels.
    pub dx: f64,
    /// Vertical offset in pixels.
    pub dy: f64,
}

impl PointerDelta {
    /// Create a delta.
    #[must_use]
    pub const fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }
}

/// Rotation sensitivity of a drag.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DragConfig {
    /// Degrees of rotation per pixel of horizontal movement.
    pub rotation_per_px_x: f64,
    /// Degrees of rotation removed per pixel of downward movement.
    pub rotation_per_px_y: f64,
}

impl Default for DragConfig {
    fn default() -> Self {
        Self {
            rotation_per_px_x: 0.8,
            rotation_per_px_y: 0.4,
        }
    }
}

/// Compute the transform for a drag of `delta` that started at `start`.
///
/// Size overrides and the transform origin are carried over unchanged.
#[must_use]
pub fn map_drag(
    start: &LimbTransform,
    delta: PointerDelta,
    container: ContainerSize,
    config: &DragConfig,
) -> LimbTransform {
    let top_delta = delta.dy / container.safe_height() * 100.0;
    let horizontal_delta = delta.dx / container.safe_width() * 100.0;
    let rotation_delta = delta.dx * config.rotation_per_px_x - delta.dy * config.rotation_per_px_y;

    start
        .with_top_percent(start.top_percent() + top_delta)
        .with_horizontal_percent(start.horizontal_percent() + horizontal_delta)
        .with_rotation(start.rotation_degrees() + rotation_delta)
}
