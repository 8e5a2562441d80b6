/// Slider-style controls that write position X, rotation Y and uniform scale
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::transform::Transform;

/// Inclusive bounds of one slider
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SliderRange {
    pub min: f32,
    pub max: f32,
}

impl SliderRange {
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Clamp into the range; a reversed range pins values to `max`
    pub fn clamp(&self, value: f32) -> f32 {
        value.max(self.min).min(self.max)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SliderRanges {
    pub position_x: SliderRange,
    /// Degrees
    pub rotation_y: SliderRange,
    pub scale: SliderRange,
}

impl Default for SliderRanges {
    fn default() -> Self {
        Self {
            position_x: SliderRange::new(-3.0, 3.0),
            rotation_y: SliderRange::new(0.0, 360.0),
            scale: SliderRange::new(1.0, 5.0),
        }
    }
}

impl SliderRanges {
    /// Every bound must be finite
    pub fn validate(&self) -> Result<(), ConfigError> {
        let bounds = [
            ("position_x.min", self.position_x.min),
            ("position_x.max", self.position_x.max),
            ("rotation_y.min", self.rotation_y.min),
            ("rotation_y.max", self.rotation_y.max),
            ("scale.min", self.scale.min),
            ("scale.max", self.scale.max),
        ];
        match bounds.into_iter().find(|(_, value)| !value.is_finite()) {
            Some((field, value)) => Err(ConfigError::NonFinite {
                section: "sliders",
                field,
                value,
            }),
            None => Ok(()),
        }
    }
}

/// Three sliders bound to an object transform
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformController {
    ranges: SliderRanges,
    position_x: f32,
    rotation_y: f32,
    scale: f32,
}

impl TransformController {
    /// Initialise the sliders from the transform's current values
    pub fn from_transform(ranges: SliderRanges, transform: &Transform) -> Self {
        Self {
            ranges,
            position_x: ranges.position_x.clamp(transform.translation.x),
            rotation_y: ranges.rotation_y.clamp(transform.rotation.degrees().y),
            scale: ranges.scale.clamp(transform.scale.x),
        }
    }

    pub fn ranges(&self) -> &SliderRanges {
        &self.ranges
    }

    pub fn position_x(&self) -> f32 {
        self.position_x
    }

    pub fn rotation_y(&self) -> f32 {
        self.rotation_y
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn set_position_x(&mut self, value: f32) {
        self.position_x = self.ranges.position_x.clamp(value);
    }

    pub fn set_rotation_y(&mut self, degrees: f32) {
        self.rotation_y = self.ranges.rotation_y.clamp(degrees);
    }

    pub fn set_scale(&mut self, value: f32) {
        self.scale = self.ranges.scale.clamp(value);
    }

    /// Write the slider values into the transform.
    ///
    /// Y and Z position and the X/Z rotation angles are left as they are.
    pub fn apply(&self, transform: &mut Transform) {
        transform.translation.x = self.position_x;
        transform.rotation.y = self.rotation_y.to_radians();
        transform.set_uniform_scale(self.scale);
    }
}
