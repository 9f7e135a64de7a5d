pub mod ray;
pub mod color;
pub mod light;

pub mod geometry;
pub mod material;
pub mod scene;
pub mod camera;

pub mod buffer;
pub mod renderer;
pub mod parallel;

pub mod obj;
pub mod scene_file;

pub mod consts;

pub fn feq(left: f64, right: f64) -> bool {
    (left - right).abs() < consts::FEQ_EPSILON
}
