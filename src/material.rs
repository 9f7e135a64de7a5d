use crate::color::Color;
use crate::consts::{ REFLECTION_BIAS, SHADOW_BIAS };
use crate::geometry::ShadingData;
use crate::ray::Ray;
use crate::scene::Scene;

/// Phong reflection parameters.
///
/// All coefficients are fixed at construction. `smoothness` is the specular
/// exponent; `reflectivity` scales the recursively traced mirror color.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Phong {
    pub base_color: Color,
    pub ambient: f64,
    pub diffusivity: f64,
    pub specularity: f64,
    pub smoothness: f64,
    pub reflectivity: f64,
}

impl Default for Phong {
    fn default() -> Phong {
        Phong {
            base_color: Color::white(),
            ambient: 1.0,
            diffusivity: 0.0,
            specularity: 0.0,
            smoothness: 0.0,
            reflectivity: 0.0,
        }
    }
}

/// A surface material.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Material {
    /// A constant color, ignoring lights and shading data entirely.
    Solid(Color),
    Phong(Phong),
}

impl Material {
    pub fn solid(color: Color) -> Material {
        Material::Solid(color)
    }

    /// Computes the surface color for an intersection.
    ///
    /// `recursion_depth` is the remaining reflection budget; the scene has
    /// already decremented it before delegating here.
    pub fn color(&self, data: &ShadingData, scene: &Scene, recursion_depth: u32) -> Color {
        match self {
            Material::Solid(color) => *color,
            Material::Phong(phong) => phong.shade(data, scene, recursion_depth),
        }
    }
}

impl Phong {
    /// Phong shading with hard shadows and recursive mirror reflection.
    fn shade(&self, data: &ShadingData, scene: &Scene, recursion_depth: u32) -> Color {
        // Ambient term.
        let mut col = self.base_color * self.ambient;

        let n = data.normal.normalize();
        let v = data.ray.direction.normalize();
        // Mirror reflection of the view direction about the normal.
        let r = v - n * (2.0 * n.dot(v));

        for light in &scene.lights {
            let sample = light.sample(data.position);

            // The light sits at parametric distance 1 along the unnormalized
            // sample direction, so any occluder with time in (0, 1) blocks
            // it entirely. The bias skips the surface itself.
            let shadow_ray = Ray::new(data.position, sample.direction);
            let shadow = scene.cast(&shadow_ray, SHADOW_BIAS);
            if shadow.time > 0.0 && shadow.time < 1.0 {
                continue;
            }

            let l = sample.direction.normalize();
            let diffuse = (sample.color * self.base_color)
                * (self.diffusivity * n.dot(l).max(0.0));
            let specular = sample.color
                * (self.specularity * r.dot(l).max(0.0).powf(self.smoothness));
            col = col + diffuse + specular;
        }

        // Only reflect off the front side of the surface.
        if v.dot(n) < 0.0 {
            let reflection_ray = Ray::new(data.position, r);
            let reflected = scene.color(&reflection_ray, recursion_depth, REFLECTION_BIAS);
            col = col + reflected * self.reflectivity;
        }

        col
    }
}

/* Tests */

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use glam::DVec3;

    use super::*;
    use crate::geometry::{ AttrMap, BlendData, Geometry, Plane, ShadingData, Triangle };
    use crate::light::Light;
    use crate::scene::{ Scene, SceneObject };

    fn shading_data_at_origin() -> ShadingData {
        // A view ray from z = 2 straight down onto the plane z = 0.
        let ray = Ray::new(DVec3::new(0.0, 0.0, 2.0), DVec3::new(0.0, 0.0, -1.0));
        let mut data = ShadingData::new(&ray, 2.0, AttrMap::new());
        data.normal = DVec3::new(0.0, 0.0, 1.0);
        data
    }

    #[test]
    fn solid_material_ignores_lights() {
        let scene = Scene::new(Color::black());
        let material = Material::solid(Color::green());
        let data = shading_data_at_origin();

        assert_eq!(material.color(&data, &scene, 5), Color::green());
    }

    #[test]
    fn phong_ambient_only() {
        let scene = Scene::new(Color::black());
        let phong = Phong {
            base_color: Color::rgb(0.5, 0.5, 0.5),
            ambient: 0.4,
            ..Default::default()
        };
        let data = shading_data_at_origin();

        assert_eq!(
            Material::Phong(phong).color(&data, &scene, 5),
            Color::rgb(0.2, 0.2, 0.2)
        );
    }

    #[test]
    fn phong_diffuse_from_overhead_light() {
        let mut scene = Scene::new(Color::black());
        scene.add_light(Light::point(DVec3::new(0.0, 0.0, 10.0), Color::white()));

        let phong = Phong {
            base_color: Color::rgb(0.8, 0.4, 0.2),
            ambient: 0.1,
            diffusivity: 0.5,
            ..Default::default()
        };
        let data = shading_data_at_origin();

        // n . l = 1, so the diffuse term is base * 0.5 on top of ambient.
        let expected = Color::rgb(0.8, 0.4, 0.2) * 0.1
            + Color::rgb(0.8, 0.4, 0.2) * 0.5;
        assert_eq!(Material::Phong(phong).color(&data, &scene, 5), expected);
    }

    #[test]
    fn light_behind_occluder_contributes_nothing() {
        let phong = Phong {
            base_color: Color::rgb(0.8, 0.4, 0.2),
            ambient: 0.1,
            diffusivity: 0.5,
            ..Default::default()
        };

        let mut scene = Scene::new(Color::black());
        scene.add_light(Light::point(DVec3::new(0.0, 0.0, 10.0), Color::white()));
        scene.add_object(SceneObject::new(
            Geometry::Plane(Plane::new(DVec3::new(0.0, 0.0, 1.0), 0.0)),
            Arc::new(Material::Phong(phong)),
        ));
        // An opaque triangle halfway between the shaded point and the light;
        // the shadow ray hits it at time 0.5.
        scene.add_object(SceneObject::new(
            Geometry::Triangle(Triangle::new(
                [
                    DVec3::new(-10.0, -10.0, 5.0),
                    DVec3::new(10.0, -10.0, 5.0),
                    DVec3::new(0.0, 10.0, 5.0),
                ],
                BlendData::new(),
            )),
            Arc::new(Material::solid(Color::blue())),
        ));

        let data = shading_data_at_origin();
        let col = Material::Phong(phong).color(&data, &scene, 5);

        // Only the ambient term survives.
        assert_eq!(col, Color::rgb(0.08, 0.04, 0.02));
    }

    #[test]
    fn shadow_ray_does_not_hit_its_own_surface() {
        let phong = Phong {
            base_color: Color::white(),
            ambient: 0.0,
            diffusivity: 1.0,
            ..Default::default()
        };

        // The shaded point lies on this plane; without the shadow bias the
        // plane would occlude its own light at time zero.
        let mut scene = Scene::new(Color::black());
        scene.add_light(Light::point(DVec3::new(0.0, 0.0, 10.0), Color::white()));
        scene.add_object(SceneObject::new(
            Geometry::Plane(Plane::new(DVec3::new(0.0, 0.0, 1.0), 0.0)),
            Arc::new(Material::Phong(phong)),
        ));

        let data = shading_data_at_origin();
        let col = Material::Phong(phong).color(&data, &scene, 5);

        assert_eq!(col, Color::white());
    }

    #[test]
    fn reflection_skipped_on_back_side() {
        // View direction along the normal: v . n > 0, so even a perfectly
        // reflective surface must not recurse.
        let phong = Phong {
            base_color: Color::black(),
            ambient: 0.0,
            reflectivity: 1.0,
            ..Default::default()
        };

        let mut scene = Scene::new(Color::white());
        scene.add_light(Light::point(DVec3::new(0.0, 0.0, 10.0), Color::white()));

        let ray = Ray::new(DVec3::new(0.0, 0.0, -2.0), DVec3::new(0.0, 0.0, 1.0));
        let mut data = ShadingData::new(&ray, 2.0, AttrMap::new());
        data.normal = DVec3::new(0.0, 0.0, 1.0);

        // Were the reflection traced, it would miss everything and add the
        // white background.
        assert_eq!(Material::Phong(phong).color(&data, &scene, 5), Color::black());
    }
}
