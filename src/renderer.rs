use std::sync::Arc;
use std::time::{ Duration, Instant };

use crate::buffer::PixelBuffer;
use crate::camera::PerspectiveCamera;
use crate::color::Color;
use crate::scene::Scene;

/// Drives the per-pixel render loop.
///
/// Scene and camera are shared immutably so the same renderer can be handed
/// to worker threads.
#[derive(Clone, Debug)]
pub struct Renderer {
    pub scene: Arc<Scene>,
    pub camera: Arc<PerspectiveCamera>,
    pub max_recursion_depth: u32,
}

impl Renderer {
    pub fn new(scene: Arc<Scene>, camera: Arc<PerspectiveCamera>,
        max_recursion_depth: u32) -> Renderer {
        Renderer { scene, camera, max_recursion_depth }
    }

    /// Resolves the color for a pixel given in normalized device
    /// coordinates.
    pub fn color_pixel(&self, x: f64, y: f64) -> Color {
        let ray = self.camera.ray_for_pixel(x, y);
        self.scene.color(&ray, self.max_recursion_depth, 0.0)
    }

    /// Renders the scene into `img`, one pixel at a time.
    pub fn render(&self, img: &mut PixelBuffer) {
        self.render_inner(img, None);
    }

    /// Renders the scene, cooperatively yielding to `callback` whenever
    /// accumulated wall-clock time exceeds `interval` (the counter resets
    /// after each invocation). The callback exists for progress reporting
    /// only and must not touch scene or buffer state.
    pub fn render_with_progress(&self, img: &mut PixelBuffer,
        interval: Duration, callback: &mut dyn FnMut()) {
        self.render_inner(img, Some((interval, callback)));
    }

    fn render_inner(&self, img: &mut PixelBuffer,
        mut progress: Option<(Duration, &mut dyn FnMut())>) {
        let img_width = img.width();
        let img_height = img.height();

        let mut time_counter = Duration::from_secs(0);
        let mut last_time = Instant::now();

        for px in 0..img_width {
            let x = 2.0 * (px as f64 / img_width as f64) - 1.0;
            for py in 0..img_height {
                // Image row 0 is the top of the frame; NDC +Y is up.
                let y = -2.0 * (py as f64 / img_height as f64) + 1.0;
                let color = self.color_pixel(x, y);
                img.set_color(px, py, &color);

                if let Some((interval, callback)) = progress.as_mut() {
                    let current_time = Instant::now();
                    time_counter += current_time - last_time;
                    last_time = current_time;
                    if time_counter >= *interval {
                        time_counter = Duration::from_secs(0);
                        callback();
                    }
                }
            }
        }
    }
}

/* Tests */

#[cfg(test)]
mod tests {
    use glam::DVec3;

    use super::*;
    use crate::geometry::{ Geometry, Plane };
    use crate::material::Material;
    use crate::scene::SceneObject;

    fn red_plane_renderer() -> Renderer {
        // A single plane at z = 0 facing the camera at (0, 0, 5), solid red
        // on a black background, no lights.
        let mut scene = Scene::new(Color::black());
        scene.add_object(SceneObject::new(
            Geometry::Plane(Plane::new(DVec3::new(0.0, 0.0, 1.0), 0.0)),
            Arc::new(Material::solid(Color::red())),
        ));

        let camera = PerspectiveCamera::look_at(
            std::f64::consts::FRAC_PI_2,
            1.0,
            DVec3::new(0.0, 0.0, 5.0),
            DVec3::ZERO,
            DVec3::new(0.0, 1.0, 0.0),
        );

        Renderer::new(Arc::new(scene), Arc::new(camera), 3)
    }

    #[test]
    fn every_ray_that_hits_the_plane_renders_red() {
        let renderer = red_plane_renderer();
        let mut img = PixelBuffer::new(8, 8);
        renderer.render(&mut img);

        // Every camera ray points toward -Z, so every pixel hits the plane.
        for y in 0..8 {
            for x in 0..8 {
                assert_eq!(img.get_color(x, y).unwrap(), Color::red());
            }
        }
    }

    #[test]
    fn rays_that_miss_render_the_background() {
        // Same scene, but the camera faces +Z, away from the plane; every
        // ray direction has a positive z component and the plane lies
        // behind the ray origins.
        let renderer = red_plane_renderer();
        let camera = PerspectiveCamera::look_at(
            std::f64::consts::FRAC_PI_2,
            1.0,
            DVec3::new(0.0, 0.0, 5.0),
            DVec3::new(0.0, 0.0, 10.0),
            DVec3::new(0.0, 1.0, 0.0),
        );
        let renderer = Renderer::new(renderer.scene, Arc::new(camera), 3);

        let mut img = PixelBuffer::new(4, 4);
        renderer.render(&mut img);

        for y in 0..4 {
            for x in 0..4 {
                assert_eq!(img.get_color(x, y).unwrap(), Color::black());
            }
        }
    }

    #[test]
    fn progress_callback_fires_with_zero_interval() {
        let renderer = red_plane_renderer();
        let mut img = PixelBuffer::new(4, 4);

        // A zero interval is always exceeded, so the callback runs once per
        // pixel.
        let mut calls = 0;
        renderer.render_with_progress(
            &mut img,
            Duration::from_secs(0),
            &mut || calls += 1,
        );

        assert_eq!(calls, 16);
    }

    #[test]
    fn render_without_callback_matches_render_with_progress() {
        let renderer = red_plane_renderer();

        let mut serial = PixelBuffer::new(4, 4);
        renderer.render(&mut serial);

        let mut progress = PixelBuffer::new(4, 4);
        renderer.render_with_progress(
            &mut progress,
            Duration::from_secs(3600),
            &mut || {},
        );

        assert_eq!(serial, progress);
    }
}
