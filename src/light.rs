use glam::DVec3;

use crate::color::Color;

/// A point light.
///
/// A very simple light source. Provides a color and a position where light
/// is produced from. Light is not attenuated by distance.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PointLight {
    pub position: DVec3,
    pub color: Color,
}

/// The result of sampling a light from a surface point.
///
/// `direction` points from the sampled position toward the light and is not
/// normalized; the light sits at parametric distance 1 along it, which is
/// what shadow tests rely on.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LightSample {
    pub direction: DVec3,
    pub color: Color,
}

/// A light source in a scene.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Light {
    Point(PointLight),
}

impl Light {
    pub fn point(position: DVec3, color: Color) -> Light {
        Light::Point(PointLight { position, color })
    }

    /// Samples this light from `position`.
    pub fn sample(&self, position: DVec3) -> LightSample {
        match self {
            Light::Point(light) => LightSample {
                direction: light.position - position,
                color: light.color,
            },
        }
    }
}

/* Tests */

#[test]
fn point_light_sample_direction_is_unnormalized() {
    let light = Light::point(DVec3::new(0.0, 10.0, 0.0), Color::white());
    let sample = light.sample(DVec3::new(0.0, 2.0, 0.0));

    assert_eq!(sample.direction, DVec3::new(0.0, 8.0, 0.0));
    assert_eq!(sample.color, Color::white());
}

#[test]
fn point_light_sample_from_its_own_position() {
    let light = Light::point(DVec3::new(1.0, 1.0, 1.0), Color::white());
    let sample = light.sample(DVec3::new(1.0, 1.0, 1.0));

    assert_eq!(sample.direction, DVec3::ZERO);
}
