use glam::DVec3;

/// A ray with an origin and a direction.
///
/// The direction is not necessarily normalized; intersection times are
/// expressed in units of the direction's length.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Ray {
    pub origin: DVec3,
    pub direction: DVec3,
}

impl Ray {
    pub fn new(origin: DVec3, direction: DVec3) -> Ray {
        Ray { origin, direction }
    }

    /// Evaluates the ray at parameter `t`: `origin + direction * t`.
    pub fn at(&self, t: f64) -> DVec3 {
        self.origin + self.direction * t
    }
}

#[test]
fn ray_position() {
    let r = Ray::new(
        DVec3::new(2.0, 3.0, 4.0),
        DVec3::new(1.0, 0.0, 0.0),
    );

    assert_eq!(r.at(0.0), DVec3::new(2.0, 3.0, 4.0));
    assert_eq!(r.at(1.0), DVec3::new(3.0, 3.0, 4.0));
    assert_eq!(r.at(-1.0), DVec3::new(1.0, 3.0, 4.0));
    assert_eq!(r.at(2.5), DVec3::new(4.5, 3.0, 4.0));
}

#[test]
fn ray_position_unnormalized_direction() {
    let r = Ray::new(
        DVec3::new(0.0, 0.0, 0.0),
        DVec3::new(0.0, 0.0, 10.0),
    );

    // Parametric distance 1 lands at the tip of the direction vector.
    assert_eq!(r.at(1.0), DVec3::new(0.0, 0.0, 10.0));
    assert_eq!(r.at(0.5), DVec3::new(0.0, 0.0, 5.0));
}
