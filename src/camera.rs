use glam::{Mat4, Vec3};

use crate::error::ViewerError;

const EPS: f32 = 1e-6;

/// Look-at camera. Construction validates the parameters so the derived
/// matrices are always well defined; a camera whose position coincides with
/// its target is rejected outright.
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    position: Vec3,
    target: Vec3,
    up: Vec3,
    fov_y_deg: f32,
    aspect: f32,
    z_near: f32,
    z_far: f32,
}

impl Camera {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        position: Vec3,
        target: Vec3,
        up: Vec3,
        fov_y_deg: f32,
        aspect: f32,
        z_near: f32,
        z_far: f32,
    ) -> Result<Self, ViewerError> {
        let forward = target - position;
        if forward.length_squared() < EPS {
            return Err(ViewerError::Camera(
                "position and target coincide, forward direction is undefined".into(),
            ));
        }
        if up.length_squared() < EPS {
            return Err(ViewerError::Camera("up vector is zero".into()));
        }
        if forward.cross(up).length_squared() < EPS {
            return Err(ViewerError::Camera(
                "up vector is parallel to the view direction".into(),
            ));
        }
        if !(fov_y_deg > 0.0 && fov_y_deg < 180.0) {
            return Err(ViewerError::Camera(format!(
                "field of view {fov_y_deg} degrees is outside (0, 180)"
            )));
        }
        if !(aspect > 0.0) {
            return Err(ViewerError::Camera(format!("aspect ratio {aspect} must be positive")));
        }
        if !(z_near > 0.0 && z_far > z_near) {
            return Err(ViewerError::Camera(format!(
                "clip planes near={z_near} far={z_far} must satisfy 0 < near < far"
            )));
        }
        Ok(Self {
            position,
            target,
            up,
            fov_y_deg,
            aspect,
            z_near,
            z_far,
        })
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Replaces the aspect ratio, e.g. once the window exists and its real
    /// framebuffer proportions are known.
    pub fn set_aspect(&mut self, aspect: f32) -> Result<(), ViewerError> {
        if !(aspect > 0.0) {
            return Err(ViewerError::Camera(format!(
                "aspect ratio {aspect} must be positive"
            )));
        }
        self.aspect = aspect;
        Ok(())
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh_gl(
            self.fov_y_deg.to_radians(),
            self.aspect,
            self.z_near,
            self.z_far,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_mat4_eq(a: Mat4, b: Mat4) {
        let a = a.to_cols_array();
        let b = b.to_cols_array();
        for i in 0..16 {
            assert!((a[i] - b[i]).abs() < 1e-5, "element {i}: {} != {}", a[i], b[i]);
        }
    }

    #[test]
    fn canonical_camera_has_identity_view() {
        let camera = Camera::new(
            Vec3::ZERO,
            Vec3::new(0.0, 0.0, -1.0),
            Vec3::Y,
            90.0,
            1.0,
            0.1,
            200.0,
        )
        .unwrap();
        assert_mat4_eq(camera.view_matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn unit_cube_in_front_of_camera_is_inside_frustum() {
        let camera = Camera::new(
            Vec3::ZERO,
            Vec3::new(0.0, 0.0, -1.0),
            Vec3::Y,
            90.0,
            1.0,
            0.1,
            200.0,
        )
        .unwrap();
        let clip = camera.projection_matrix() * camera.view_matrix();

        // Unit cube centered three units in front of the camera, identity
        // model matrix. Every corner must land inside clip space.
        for dx in [-0.5f32, 0.5] {
            for dy in [-0.5f32, 0.5] {
                for dz in [-0.5f32, 0.5] {
                    let corner = Vec3::new(dx, dy, -3.0 + dz);
                    let c = clip * corner.extend(1.0);
                    assert!(c.w > 0.0);
                    assert!(c.x.abs() <= c.w, "corner {corner:?} outside x");
                    assert!(c.y.abs() <= c.w, "corner {corner:?} outside y");
                    assert!(c.z.abs() <= c.w, "corner {corner:?} outside z");
                }
            }
        }
    }

    #[test]
    fn set_aspect_reshapes_the_projection() {
        let mut camera = Camera::new(
            Vec3::ZERO,
            Vec3::new(0.0, 0.0, -1.0),
            Vec3::Y,
            45.0,
            1.0,
            0.1,
            200.0,
        )
        .unwrap();
        camera.set_aspect(2.0).unwrap();
        assert_mat4_eq(
            camera.projection_matrix(),
            Mat4::perspective_rh_gl(45.0f32.to_radians(), 2.0, 0.1, 200.0),
        );
        assert!(matches!(camera.set_aspect(0.0), Err(ViewerError::Camera(_))));
        assert!(matches!(camera.set_aspect(-1.0), Err(ViewerError::Camera(_))));
    }

    #[test]
    fn camera_at_its_own_target_is_rejected() {
        let result = Camera::new(
            Vec3::new(1.0, 2.0, 3.0),
            Vec3::new(1.0, 2.0, 3.0),
            Vec3::Y,
            45.0,
            1.0,
            0.1,
            100.0,
        );
        assert!(matches!(result, Err(ViewerError::Camera(_))));
    }

    #[test]
    fn up_parallel_to_view_direction_is_rejected() {
        let result = Camera::new(Vec3::ZERO, Vec3::new(0.0, 2.0, 0.0), Vec3::Y, 45.0, 1.0, 0.1, 100.0);
        assert!(matches!(result, Err(ViewerError::Camera(_))));
    }

    #[test]
    fn bad_fov_and_clip_planes_are_rejected() {
        let target = Vec3::new(0.0, 0.0, -1.0);
        assert!(Camera::new(Vec3::ZERO, target, Vec3::Y, 0.0, 1.0, 0.1, 100.0).is_err());
        assert!(Camera::new(Vec3::ZERO, target, Vec3::Y, 181.0, 1.0, 0.1, 100.0).is_err());
        assert!(Camera::new(Vec3::ZERO, target, Vec3::Y, 45.0, 1.0, 0.0, 100.0).is_err());
        assert!(Camera::new(Vec3::ZERO, target, Vec3::Y, 45.0, 1.0, 5.0, 1.0).is_err());
    }
}
