use glam::{ DMat4, DVec3, DVec4 };

use crate::ray::Ray;

/// A perspective camera.
///
/// `transform` maps camera space to world space; the camera sits at the
/// transform's translation column and looks down its local -Z axis. The
/// inverse transform is retained for world-to-camera queries. `tan_fov` and
/// `aspect` are fixed at construction.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PerspectiveCamera {
    pub transform: DMat4,
    pub inv_transform: DMat4,
    pub position: DVec3,
    pub tan_fov: f64,
    pub aspect: f64,
}

impl PerspectiveCamera {
    /// Creates a camera from a vertical field of view (radians), an aspect
    /// ratio (width over height) and a camera-to-world transform.
    pub fn new(fov: f64, aspect: f64, transform: DMat4) -> PerspectiveCamera {
        PerspectiveCamera {
            transform,
            inv_transform: transform.inverse(),
            position: transform.w_axis.truncate(),
            tan_fov: (fov / 2.0).tan(),
            aspect,
        }
    }

    /// Creates a camera at `eye` looking toward `center`.
    pub fn look_at(fov: f64, aspect: f64, eye: DVec3, center: DVec3,
        up: DVec3) -> PerspectiveCamera {
        PerspectiveCamera::new(fov, aspect,
            DMat4::look_at_rh(eye, center, up).inverse())
    }

    /// Builds the world-space ray for normalized device coordinates
    /// `(x, y)`, each in `[-1, 1]` with +Y up.
    pub fn ray_for_pixel(&self, x: f64, y: f64) -> Ray {
        let direction = DVec4::new(
            x * self.tan_fov * self.aspect,
            y * self.tan_fov,
            -1.0,
            0.0,
        );

        Ray::new(self.position, (self.transform * direction).truncate())
    }
}

/* Tests */

#[cfg(test)]
use std::f64::consts::FRAC_PI_2;

#[test]
fn center_ray_looks_down_negative_z() {
    let c = PerspectiveCamera::new(FRAC_PI_2, 1.0, DMat4::IDENTITY);
    let r = c.ray_for_pixel(0.0, 0.0);

    assert_eq!(r.origin, DVec3::ZERO);
    assert_eq!(r.direction, DVec3::new(0.0, 0.0, -1.0));
}

#[test]
fn corner_ray_at_90_degree_fov() {
    // tan(45 deg) = 1, so the (1, 1) corner ray leaves at 45 degrees on
    // both axes.
    let c = PerspectiveCamera::new(FRAC_PI_2, 1.0, DMat4::IDENTITY);
    let r = c.ray_for_pixel(1.0, 1.0);

    assert!((r.direction.x - 1.0).abs() < 1e-9);
    assert!((r.direction.y - 1.0).abs() < 1e-9);
    assert!((r.direction.z + 1.0).abs() < 1e-9);
}

#[test]
fn aspect_widens_horizontal_rays() {
    let c = PerspectiveCamera::new(FRAC_PI_2, 2.0, DMat4::IDENTITY);
    let r = c.ray_for_pixel(1.0, 1.0);

    assert!((r.direction.x - 2.0).abs() < 1e-9);
    assert!((r.direction.y - 1.0).abs() < 1e-9);
}

#[test]
fn position_comes_from_transform_translation() {
    let transform = DMat4::from_translation(DVec3::new(1.0, 2.0, 3.0));
    let c = PerspectiveCamera::new(FRAC_PI_2, 1.0, transform);

    assert_eq!(c.position, DVec3::new(1.0, 2.0, 3.0));
    assert_eq!(c.ray_for_pixel(0.0, 0.0).origin, DVec3::new(1.0, 2.0, 3.0));
}

#[test]
fn look_at_camera_faces_its_target() {
    let c = PerspectiveCamera::look_at(
        FRAC_PI_2,
        1.0,
        DVec3::new(0.0, 0.0, 5.0),
        DVec3::ZERO,
        DVec3::new(0.0, 1.0, 0.0),
    );

    let r = c.ray_for_pixel(0.0, 0.0);
    assert!((r.origin - DVec3::new(0.0, 0.0, 5.0)).length() < 1e-9);
    assert!((r.direction.normalize() - DVec3::new(0.0, 0.0, -1.0)).length() < 1e-9);
}
