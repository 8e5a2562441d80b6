/// 3D transformation matrices, Euler rotation state and object transforms
use nalgebra::{Matrix4, Vector3};

/// Rotation state around three axes (in radians)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationState {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl RotationState {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn zero() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
        }
    }

    pub fn from_degrees(x: f32, y: f32, z: f32) -> Self {
        Self::new(x.to_radians(), y.to_radians(), z.to_radians())
    }

    /// Rotate by delta amounts (in radians)
    pub fn rotate(&mut self, dx: f32, dy: f32, dz: f32) {
        self.x += dx;
        self.y += dy;
        self.z += dz;
    }

    /// Angles in degrees, wrapped into `[0, 360)`
    pub fn degrees(&self) -> Vector3<f32> {
        let wrap = |radians: f32| radians.to_degrees().rem_euclid(360.0);
        Vector3::new(wrap(self.x), wrap(self.y), wrap(self.z))
    }
}

impl Default for RotationState {
    fn default() -> Self {
        Self::zero()
    }
}

/// Create a rotation matrix from a rotation state
pub fn rotation_matrix(rotation: &RotationState) -> Matrix4<f32> {
    let rx = Matrix4::new_rotation(Vector3::new(rotation.x, 0.0, 0.0));
    let ry = Matrix4::new_rotation(Vector3::new(0.0, rotation.y, 0.0));
    let rz = Matrix4::new_rotation(Vector3::new(0.0, 0.0, rotation.z));

    // Apply rotations in order: X, Y, Z
    rz * ry * rx
}

/// Create a translation matrix
pub fn translation_matrix(x: f32, y: f32, z: f32) -> Matrix4<f32> {
    Matrix4::new_translation(&Vector3::new(x, y, z))
}

/// Create a scale matrix
pub fn scale_matrix(sx: f32, sy: f32, sz: f32) -> Matrix4<f32> {
    Matrix4::new_nonuniform_scaling(&Vector3::new(sx, sy, sz))
}

/// Position, orientation and scale of one object in the scene
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vector3<f32>,
    pub rotation: RotationState,
    pub scale: Vector3<f32>,
}

impl Transform {
    pub fn identity() -> Self {
        Self {
            translation: Vector3::zeros(),
            rotation: RotationState::zero(),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }

    /// Model matrix: scale first, then rotate, then translate
    pub fn matrix(&self) -> Matrix4<f32> {
        let t = self.translation;
        let s = self.scale;
        translation_matrix(t.x, t.y, t.z) * rotation_matrix(&self.rotation) * scale_matrix(s.x, s.y, s.z)
    }

    /// Move in world space
    pub fn translate_world(&mut self, delta: Vector3<f32>) {
        self.translation += delta;
    }

    pub fn rotate_degrees(&mut self, dx: f32, dy: f32, dz: f32) {
        self.rotation
            .rotate(dx.to_radians(), dy.to_radians(), dz.to_radians());
    }

    pub fn set_uniform_scale(&mut self, scale: f32) {
        self.scale = Vector3::new(scale, scale, scale);
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Point3;

    #[test]
    fn test_rotation_state() {
        let mut state = RotationState::zero();
        assert_eq!(state.x, 0.0);
        assert_eq!(state.y, 0.0);
        assert_eq!(state.z, 0.0);

        state.rotate(0.1, 0.2, 0.3);
        assert!((state.x - 0.1).abs() < 1e-6);
        assert!((state.y - 0.2).abs() < 1e-6);
        assert!((state.z - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_identity_rotation() {
        let rotation = RotationState::zero();
        let matrix = rotation_matrix(&rotation);
        assert!((matrix - Matrix4::identity()).norm() < 1e-6);
    }

    #[test]
    fn test_degrees_wrap() {
        let state = RotationState::from_degrees(-90.0, 450.0, 30.0);
        assert_relative_eq!(state.degrees(), Vector3::new(270.0, 90.0, 30.0), epsilon = 1e-3);
    }

    #[test]
    fn test_matrix_scales_rotates_then_translates() {
        let mut transform = Transform::identity();
        transform.set_uniform_scale(2.0);
        transform.rotate_degrees(0.0, 90.0, 0.0);
        transform.translate_world(Vector3::new(0.0, 0.0, 5.0));

        // +X scaled to 2, a quarter turn about Y sends it to -Z, then moved by +5 on Z
        let moved = transform.matrix().transform_point(&Point3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(moved, Point3::new(0.0, 0.0, 3.0), epsilon = 1e-5);
    }
}
