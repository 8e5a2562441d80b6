/// Per-frame scripted motion: random hops, constant spin, pulsing scale

use nalgebra::Vector3;
use rand::RngExt;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::transform::Transform;

/// Tuning for [`BasicTransformations`]. Speeds are per second.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationSettings {
    /// New targets are drawn from `[-translation_range, translation_range)`
    pub translation_range: f32,
    /// Seconds between two target changes
    pub translation_interval: f32,
    pub translation_speed: f32,
    /// Degrees per second around each axis
    pub rotation_speed_x: f32,
    pub rotation_speed_y: f32,
    pub rotation_speed_z: f32,
    pub base_scale: f32,
    pub scale_amplitude: f32,
    pub scale_frequency: f32,
}

impl Default for AnimationSettings {
    fn default() -> Self {
        Self {
            translation_range: 3.0,
            translation_interval: 2.0,
            translation_speed: 5.0,
            rotation_speed_x: 30.0,
            rotation_speed_y: 45.0,
            rotation_speed_z: 20.0,
            base_scale: 1.0,
            scale_amplitude: 0.4,
            scale_frequency: 1.5,
        }
    }
}

impl AnimationSettings {
    fn fields(&self) -> [(&'static str, f32); 9] {
        [
            ("translation_range", self.translation_range),
            ("translation_interval", self.translation_interval),
            ("translation_speed", self.translation_speed),
            ("rotation_speed_x", self.rotation_speed_x),
            ("rotation_speed_y", self.rotation_speed_y),
            ("rotation_speed_z", self.rotation_speed_z),
            ("base_scale", self.base_scale),
            ("scale_amplitude", self.scale_amplitude),
            ("scale_frequency", self.scale_frequency),
        ]
    }

    /// Reject `inf` and `nan`, which TOML accepts as float literals
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.fields().into_iter().find(|(_, value)| !value.is_finite()) {
            Some((field, value)) => Err(ConfigError::NonFinite {
                section: "animation",
                field,
                value,
            }),
            None => Ok(()),
        }
    }
}

/// Drives a [`Transform`] one frame at a time.
///
/// Every `translation_interval` seconds a new target is picked by replacing
/// either the X or the Y coordinate of the current position with a random
/// value; each frame the object eases toward that target. Rotation is a
/// constant angular velocity and scale oscillates with `sin(time)`.
#[derive(Debug, Clone)]
pub struct BasicTransformations {
    settings: AnimationSettings,
    target: Vector3<f32>,
    timer: f32,
}

impl BasicTransformations {
    /// Start with the transform's current position as the first target
    pub fn new(settings: AnimationSettings, transform: &Transform) -> Self {
        Self {
            settings,
            target: transform.translation,
            timer: 0.0,
        }
    }

    pub fn settings(&self) -> &AnimationSettings {
        &self.settings
    }

    pub fn target(&self) -> Vector3<f32> {
        self.target
    }

    /// Advance one frame of `dt` seconds; `time` is the elapsed time since start
    pub fn update<R: RngExt>(&mut self, transform: &mut Transform, dt: f32, time: f32, rng: &mut R) {
        self.handle_translation(transform, dt, rng);
        self.handle_rotation(transform, dt);
        self.handle_scale(transform, time);
    }

    fn handle_translation<R: RngExt>(&mut self, transform: &mut Transform, dt: f32, rng: &mut R) {
        self.timer += dt;

        if self.timer >= self.settings.translation_interval {
            self.timer = 0.0;

            let range = self.settings.translation_range;
            let move_on_x = rng.random_bool(0.5);
            let value = if range.is_finite() && range > 0.0 {
                rng.random_range(-range..range)
            } else {
                0.0
            };

            let position = transform.translation;
            self.target = if move_on_x {
                Vector3::new(value, position.y, position.z)
            } else {
                Vector3::new(position.x, value, position.z)
            };
        }

        let direction = self.target - transform.translation;
        transform.translate_world(direction * self.settings.translation_speed * dt);
    }

    fn handle_rotation(&self, transform: &mut Transform, dt: f32) {
        transform.rotate_degrees(
            self.settings.rotation_speed_x * dt,
            self.settings.rotation_speed_y * dt,
            self.settings.rotation_speed_z * dt,
        );
    }

    fn handle_scale(&self, transform: &mut Transform, time: f32) {
        let oscillation = (time * self.settings.scale_frequency).sin();
        transform.set_uniform_scale(self.settings.base_scale + oscillation * self.settings.scale_amplitude);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_rotation_follows_speed() {
        let mut transform = Transform::identity();
        let mut script = BasicTransformations::new(AnimationSettings::default(), &transform);
        let mut rng = StdRng::seed_from_u64(7);

        script.update(&mut transform, 0.5, 0.5, &mut rng);
        assert_relative_eq!(
            transform.rotation.degrees(),
            Vector3::new(15.0, 22.5, 10.0),
            epsilon = 1e-4
        );
    }

    #[test]
    fn test_scale_oscillates() {
        let settings = AnimationSettings::default();
        let mut transform = Transform::identity();
        let mut script = BasicTransformations::new(settings, &transform);
        let mut rng = StdRng::seed_from_u64(7);

        let time = std::f32::consts::FRAC_PI_2 / settings.scale_frequency;
        script.update(&mut transform, 0.01, time, &mut rng);
        assert_relative_eq!(transform.scale, Vector3::new(1.4, 1.4, 1.4), epsilon = 1e-5);
    }

    #[test]
    fn test_no_motion_before_first_interval() {
        let mut transform = Transform::identity();
        transform.translation = Vector3::new(1.0, 2.0, 3.0);
        let mut script = BasicTransformations::new(AnimationSettings::default(), &transform);
        let mut rng = StdRng::seed_from_u64(1);

        for frame in 1..=10 {
            script.update(&mut transform, 0.1, frame as f32 * 0.1, &mut rng);
        }
        assert_eq!(transform.translation, Vector3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_new_target_changes_one_axis() {
        let settings = AnimationSettings {
            translation_interval: 1.0,
            translation_speed: 0.5,
            ..AnimationSettings::default()
        };
        let start = Vector3::new(0.5, -0.5, 2.0);

        for seed in 0..16 {
            let mut transform = Transform::identity();
            transform.translation = start;
            let mut script = BasicTransformations::new(settings, &transform);
            let mut rng = StdRng::seed_from_u64(seed);

            script.update(&mut transform, 1.0, 1.0, &mut rng);
            let target = script.target();

            assert_eq!(target.z, start.z);
            assert!(target.x == start.x || target.y == start.y);
            assert!(target.x.abs() <= 3.0 && target.y.abs() <= 3.0);
            // speed * dt = 0.5, so the object covers half the distance
            assert_relative_eq!(transform.translation, (start + target) / 2.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_infinite_range_does_not_panic() {
        let settings = AnimationSettings {
            translation_range: f32::INFINITY,
            translation_interval: 0.0,
            ..AnimationSettings::default()
        };
        let mut transform = Transform::identity();
        let mut script = BasicTransformations::new(settings, &transform);
        let mut rng = StdRng::seed_from_u64(5);

        script.update(&mut transform, 0.1, 0.1, &mut rng);
        assert_eq!(script.target(), Vector3::zeros());
    }

    #[test]
    fn test_validate_names_non_finite_field() {
        assert!(AnimationSettings::default().validate().is_ok());

        let settings = AnimationSettings {
            scale_frequency: f32::NAN,
            ..AnimationSettings::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::NonFinite { field: "scale_frequency", .. })
        ));
    }

    #[test]
    fn test_zero_range_targets_origin_axis() {
        let settings = AnimationSettings {
            translation_range: 0.0,
            translation_interval: 0.0,
            ..AnimationSettings::default()
        };
        let mut transform = Transform::identity();
        transform.translation = Vector3::new(2.0, 2.0, 0.0);
        let mut script = BasicTransformations::new(settings, &transform);
        let mut rng = StdRng::seed_from_u64(3);

        script.update(&mut transform, 0.1, 0.1, &mut rng);
        let target = script.target();
        assert!(target.x == 0.0 || target.y == 0.0);
    }
}
