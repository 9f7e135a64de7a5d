use std::sync::Arc;

use crate::color::Color;
use crate::geometry::{ AttrMap, Geometry, ShadingData };
use crate::light::Light;
use crate::material::Material;
use crate::ray::Ray;

/// One renderable object: a geometry coupled with a material.
///
/// Materials are shared and immutable, so many objects can reference the
/// same one. `base_data` holds shading attributes merged into every hit's
/// context before the geometry fills in surface details; it defaults to the
/// empty attribute set.
#[derive(Clone, Debug)]
pub struct SceneObject {
    pub geometry: Geometry,
    pub material: Arc<Material>,
    pub base_data: AttrMap,
}

impl SceneObject {
    pub fn new(geometry: Geometry, material: Arc<Material>) -> SceneObject {
        SceneObject { geometry, material, base_data: AttrMap::new() }
    }

    pub fn with_base_data(geometry: Geometry, material: Arc<Material>,
        base_data: AttrMap) -> SceneObject {
        SceneObject { geometry, material, base_data }
    }

    pub fn intersect(&self, ray: &Ray) -> f64 {
        self.geometry.intersect(ray)
    }

    /// Shades a hit on this object at the given intersection time.
    pub fn shade(&self, ray: &Ray, time: f64, scene: &Scene,
        recursion_depth: u32) -> Color {
        let mut data = ShadingData::new(ray, time, self.base_data.clone());
        self.geometry.material_data(&mut data);
        self.material.color(&data, scene, recursion_depth)
    }
}

/// The result of casting a ray into a scene.
///
/// `object` is `None` when nothing was hit, in which case `time` is
/// positive infinity.
#[derive(Copy, Clone, Debug)]
pub struct Hit<'a> {
    pub object: Option<&'a SceneObject>,
    pub time: f64,
}

/// A scene of objects and lights.
///
/// Everything is constructed before rendering and treated as immutable for
/// the duration of a render pass, which keeps per-pixel evaluation free of
/// shared mutable state.
#[derive(Clone, Debug)]
pub struct Scene {
    pub bg_color: Color,
    pub objects: Vec<SceneObject>,
    pub lights: Vec<Light>,
}

impl Scene {
    pub fn new(bg_color: Color) -> Scene {
        Scene { bg_color, objects: Vec::new(), lights: Vec::new() }
    }

    pub fn add_object(&mut self, object: SceneObject) {
        self.objects.push(object);
    }

    pub fn add_objects(&mut self, objects: Vec<SceneObject>) {
        self.objects.extend(objects);
    }

    pub fn add_light(&mut self, light: Light) {
        self.lights.push(light);
    }

    /// Finds the closest intersection of `ray` with time strictly greater
    /// than `min_time`.
    ///
    /// A linear scan over all objects. Non-finite intersection times (NaN,
    /// infinities, the triangle miss sentinel) fail the range comparisons
    /// and never count as hits.
    pub fn cast(&self, ray: &Ray, min_time: f64) -> Hit {
        let mut closest = Hit { object: None, time: f64::INFINITY };
        for object in &self.objects {
            let time = object.intersect(ray);
            if time > min_time && time < closest.time {
                closest = Hit { object: Some(object), time };
            }
        }

        closest
    }

    /// Computes the color seen along `ray`.
    ///
    /// Returns the background color when the recursion budget is exhausted
    /// or nothing is hit; otherwise delegates to the hit object's material
    /// with the budget decremented. This is the sole termination guarantee
    /// for mutually reflective scenes.
    pub fn color(&self, ray: &Ray, recursion_depth: u32, min_time: f64) -> Color {
        if recursion_depth == 0 {
            return self.bg_color;
        }

        let hit = self.cast(ray, min_time);
        match hit.object {
            None => self.bg_color,
            Some(object) => object.shade(ray, hit.time, self, recursion_depth - 1),
        }
    }
}

/* Tests */

#[cfg(test)]
mod tests {
    use glam::DVec3;

    use super::*;
    use crate::geometry::{ BlendData, Plane, Triangle };
    use crate::material::Phong;

    fn solid_plane(z: f64, color: Color) -> SceneObject {
        SceneObject::new(
            Geometry::Plane(Plane::new(DVec3::new(0.0, 0.0, 1.0), z)),
            Arc::new(Material::solid(color)),
        )
    }

    #[test]
    fn cast_in_empty_scene() {
        let scene = Scene::new(Color::black());
        let ray = Ray::new(DVec3::ZERO, DVec3::new(0.0, 0.0, -1.0));

        let hit = scene.cast(&ray, 0.0);
        assert!(hit.object.is_none());
        assert_eq!(hit.time, f64::INFINITY);
    }

    #[test]
    fn cast_finds_closest_object() {
        let mut scene = Scene::new(Color::black());
        scene.add_object(solid_plane(-4.0, Color::red()));
        scene.add_object(solid_plane(-1.0, Color::green()));
        scene.add_object(solid_plane(-9.0, Color::blue()));

        let ray = Ray::new(DVec3::ZERO, DVec3::new(0.0, 0.0, -1.0));
        let hit = scene.cast(&ray, 0.0);

        assert_eq!(hit.time, 1.0);
        assert_eq!(
            *hit.object.unwrap().material,
            Material::solid(Color::green())
        );
    }

    #[test]
    fn cast_respects_min_time() {
        let mut scene = Scene::new(Color::black());
        scene.add_object(solid_plane(-1.0, Color::green()));

        let ray = Ray::new(DVec3::ZERO, DVec3::new(0.0, 0.0, -1.0));
        let hit = scene.cast(&ray, 1.0);

        // The only intersection is at exactly min_time; strictly-greater
        // filtering excludes it.
        assert!(hit.object.is_none());
    }

    #[test]
    fn cast_ignores_objects_behind_ray() {
        let mut scene = Scene::new(Color::black());
        scene.add_object(solid_plane(5.0, Color::red()));

        let ray = Ray::new(DVec3::ZERO, DVec3::new(0.0, 0.0, -1.0));
        assert!(scene.cast(&ray, 0.0).object.is_none());
    }

    #[test]
    fn cast_excludes_triangle_miss_sentinel() {
        let mut scene = Scene::new(Color::black());
        scene.add_object(SceneObject::new(
            Geometry::Triangle(Triangle::new(
                [
                    DVec3::new(10.0, 10.0, 0.0),
                    DVec3::new(11.0, 10.0, 0.0),
                    DVec3::new(10.0, 11.0, 0.0),
                ],
                BlendData::new(),
            )),
            Arc::new(Material::solid(Color::red())),
        ));

        // The ray hits the triangle's plane but misses the triangle; the
        // negative-infinity sentinel must not count as a hit.
        let ray = Ray::new(DVec3::new(0.0, 0.0, 5.0), DVec3::new(0.0, 0.0, -1.0));
        assert!(scene.cast(&ray, 0.0).object.is_none());
    }

    #[test]
    fn color_with_zero_depth_is_background() {
        let mut scene = Scene::new(Color::rgb(0.1, 0.2, 0.3));
        scene.add_object(solid_plane(-1.0, Color::red()));

        let ray = Ray::new(DVec3::ZERO, DVec3::new(0.0, 0.0, -1.0));
        assert_eq!(scene.color(&ray, 0, 0.0), Color::rgb(0.1, 0.2, 0.3));
    }

    #[test]
    fn color_on_miss_is_background() {
        let scene = Scene::new(Color::rgb(0.1, 0.2, 0.3));
        let ray = Ray::new(DVec3::ZERO, DVec3::new(0.0, 0.0, -1.0));

        assert_eq!(scene.color(&ray, 5, 0.0), Color::rgb(0.1, 0.2, 0.3));
    }

    #[test]
    fn color_on_hit_delegates_to_material() {
        let mut scene = Scene::new(Color::black());
        scene.add_object(solid_plane(-1.0, Color::red()));

        let ray = Ray::new(DVec3::ZERO, DVec3::new(0.0, 0.0, -1.0));
        assert_eq!(scene.color(&ray, 5, 0.0), Color::red());
    }

    #[test]
    fn mutually_facing_mirrors_terminate() {
        let mirror = Arc::new(Material::Phong(Phong {
            base_color: Color::black(),
            ambient: 0.0,
            reflectivity: 1.0,
            ..Default::default()
        }));

        let mut scene = Scene::new(Color::white());
        // Two parallel mirrors facing each other at z = 0 and z = 10.
        scene.add_object(SceneObject::new(
            Geometry::Plane(Plane::new(DVec3::new(0.0, 0.0, 1.0), 0.0)),
            Arc::clone(&mirror),
        ));
        scene.add_object(SceneObject::new(
            Geometry::Plane(Plane::new(DVec3::new(0.0, 0.0, -1.0), -10.0)),
            Arc::clone(&mirror),
        ));

        // A ray bouncing between the mirrors forever; the depth budget is
        // the only thing that stops the recursion. The final bounce pays
        // out the background color.
        let ray = Ray::new(DVec3::new(0.0, 0.0, 5.0), DVec3::new(0.0, 0.0, -1.0));
        assert_eq!(scene.color(&ray, 8, 0.0), Color::white());
    }
}
