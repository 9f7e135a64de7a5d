// Small positive biases for secondary rays. These keep shadow and
// reflection rays from re-intersecting the surface they start on due to
// floating point error at the intersection point.
pub const SHADOW_BIAS: f64 = 1e-4;
pub const REFLECTION_BIAS: f64 = 1e-3;

// Floating point comparisons
pub const FEQ_EPSILON: f64 = 0.0001;

// Maximum reflection bounces when a scene file does not specify one.
pub const DEFAULT_RECURSION_DEPTH: u32 = 5;

// Default output path for rendered images.
pub const OUT_FILE: &str = "./out.ppm";
