use std::collections::BTreeMap;

use glam::DVec3;

use crate::ray::Ray;

/// Attribute key whose blended value replaces the face normal, giving
/// smooth shading across a triangle.
pub const ATTR_NORMAL: &str = "normal";

/// Attribute key for interpolated texture coordinates.
pub const ATTR_UV: &str = "uv";

/// A single shading attribute value.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum AttrValue {
    Scalar(f64),
    Vector(DVec3),
}

/// A per-vertex attribute attached to a triangle.
///
/// `Scalars` and `Vectors` hold one value per vertex and are interpolated by
/// barycentric weights; a `Constant` passes through uninterpolated.
#[derive(Clone, Debug, PartialEq)]
pub enum BlendSource {
    Scalars([f64; 3]),
    Vectors([DVec3; 3]),
    Constant(AttrValue),
}

/// Named per-vertex attributes carried by a triangle.
pub type BlendData = BTreeMap<String, BlendSource>;

/// Named shading attributes resolved at an intersection point.
pub type AttrMap = BTreeMap<String, AttrValue>;

/// Shading context for a single intersection, handed to a material.
///
/// `normal` may be unnormalized; shading code normalizes it.
#[derive(Clone, Debug)]
pub struct ShadingData {
    pub ray: Ray,
    pub time: f64,
    pub position: DVec3,
    pub normal: DVec3,
    pub bary: Option<DVec3>,
    pub attrs: AttrMap,
}

impl ShadingData {
    /// Builds the base shading context for a hit, before geometry fills in
    /// surface details.
    pub fn new(ray: &Ray, time: f64, attrs: AttrMap) -> ShadingData {
        ShadingData {
            ray: *ray,
            time,
            position: ray.at(time),
            normal: DVec3::ZERO,
            bary: None,
            attrs,
        }
    }
}

/// An infinite plane satisfying `normal . p = delta`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Plane {
    pub normal: DVec3,
    pub delta: f64,
}

impl Plane {
    pub fn new(normal: DVec3, delta: f64) -> Plane {
        Plane { normal, delta }
    }

    /// Intersection time of `ray` with this plane.
    ///
    /// A ray parallel to the plane yields a non-finite time; callers filter
    /// intersection times by range, which rejects infinities and NaN.
    pub fn intersect(&self, ray: &Ray) -> f64 {
        (self.delta - self.normal.dot(ray.origin)) / self.normal.dot(ray.direction)
    }

    pub fn material_data(&self, data: &mut ShadingData) {
        data.normal = self.normal;
    }
}

/// A triangle, stored with the plane it spans.
///
/// The plane normal is derived from the vertex winding,
/// `(v1 - v0) x (v2 - v0)` normalized; degenerate (collinear) triangles
/// produce an undefined normal and must not be constructed.
#[derive(Clone, Debug, PartialEq)]
pub struct Triangle {
    plane: Plane,
    vertices: [DVec3; 3],
    blend: BlendData,
}

impl Triangle {
    pub fn new(vertices: [DVec3; 3], blend: BlendData) -> Triangle {
        let normal = (vertices[1] - vertices[0])
            .cross(vertices[2] - vertices[0])
            .normalize();

        Triangle {
            plane: Plane::new(normal, normal.dot(vertices[0])),
            vertices,
            blend,
        }
    }

    pub fn vertices(&self) -> &[DVec3; 3] {
        &self.vertices
    }

    pub fn normal(&self) -> DVec3 {
        self.plane.normal
    }

    /// Intersection time of `ray` with this triangle.
    ///
    /// Returns negative infinity when the ray hits the containing plane
    /// outside the triangle; that sentinel fails any time-range filter. A
    /// non-finite plane time produces NaN barycentric coordinates, which
    /// fail the containment comparisons and reject the hit the same way.
    pub fn intersect(&self, ray: &Ray) -> f64 {
        let time = self.plane.intersect(ray);
        let bary = self.to_barycentric(ray.at(time));

        if bary.cmpge(DVec3::ZERO).all() && bary.cmple(DVec3::ONE).all() {
            time
        } else {
            f64::NEG_INFINITY
        }
    }

    /// Barycentric coordinates `(u, v, w)` of `p` with respect to this
    /// triangle's vertices, with `u + v + w = 1`.
    ///
    /// Uses the 2x2 solve over the edge basis `v0 = p1 - p0, v1 = p2 - p0`.
    /// Zero-area triangles divide by zero here; undefined by contract.
    pub fn to_barycentric(&self, p: DVec3) -> DVec3 {
        let v0 = self.vertices[1] - self.vertices[0];
        let v1 = self.vertices[2] - self.vertices[0];
        let v2 = p - self.vertices[0];

        let dot00 = v0.dot(v0);
        let dot01 = v0.dot(v1);
        let dot11 = v1.dot(v1);
        let dot20 = v2.dot(v0);
        let dot21 = v2.dot(v1);

        let denom = dot00 * dot11 - dot01 * dot01;
        let v = (dot11 * dot20 - dot01 * dot21) / denom;
        let w = (dot00 * dot21 - dot01 * dot20) / denom;

        DVec3::new(1.0 - v - w, v, w)
    }

    /// Fills in the surface normal and blends per-vertex attributes at the
    /// intersection point. A blended `normal` attribute replaces the face
    /// normal.
    pub fn material_data(&self, data: &mut ShadingData) {
        self.plane.material_data(data);

        let bary = self.to_barycentric(data.position);
        data.bary = Some(bary);

        for (name, source) in &self.blend {
            let value = blend(bary, source);
            if name == ATTR_NORMAL {
                if let AttrValue::Vector(normal) = value {
                    data.normal = normal;
                    continue;
                }
            }
            data.attrs.insert(name.clone(), value);
        }
    }
}

/// Interpolates a per-vertex attribute by barycentric weights.
pub fn blend(bary: DVec3, source: &BlendSource) -> AttrValue {
    match source {
        BlendSource::Scalars([a, b, c]) => {
            AttrValue::Scalar(bary.x * a + bary.y * b + bary.z * c)
        },
        BlendSource::Vectors([a, b, c]) => {
            AttrValue::Vector(*a * bary.x + *b * bary.y + *c * bary.z)
        },
        BlendSource::Constant(value) => *value,
    }
}

/// A geometric primitive that rays can intersect.
#[derive(Clone, Debug, PartialEq)]
pub enum Geometry {
    Plane(Plane),
    Triangle(Triangle),
}

impl Geometry {
    /// Intersection time of `ray` with this primitive.
    ///
    /// May return non-finite values; callers compare against a valid time
    /// range, so infinities and NaN never count as hits.
    pub fn intersect(&self, ray: &Ray) -> f64 {
        match self {
            Geometry::Plane(plane) => plane.intersect(ray),
            Geometry::Triangle(triangle) => triangle.intersect(ray),
        }
    }

    /// Augments `data` with surface details at the intersection point.
    pub fn material_data(&self, data: &mut ShadingData) {
        match self {
            Geometry::Plane(plane) => plane.material_data(data),
            Geometry::Triangle(triangle) => triangle.material_data(data),
        }
    }
}

/* Tests */

#[cfg(test)]
use crate::feq;

#[test]
fn plane_intersection_satisfies_plane_equation() {
    let plane = Plane::new(DVec3::new(0.0, 1.0, 0.0), 2.0);
    let ray = Ray::new(
        DVec3::new(1.0, 5.0, -3.0),
        DVec3::new(0.3, -1.0, 0.4),
    );

    let t = plane.intersect(&ray);
    assert!(t.is_finite());
    assert!(feq(plane.normal.dot(ray.at(t)), plane.delta));
}

#[test]
fn ray_parallel_to_plane_yields_non_finite_time() {
    let plane = Plane::new(DVec3::new(0.0, 1.0, 0.0), 0.0);
    let ray = Ray::new(
        DVec3::new(0.0, 1.0, 0.0),
        DVec3::new(1.0, 0.0, 0.0),
    );

    let t = plane.intersect(&ray);
    assert!(!t.is_finite());

    // A time-range filter must exclude the result either way.
    assert!(!(t > 0.0 && t < f64::INFINITY));
}

#[cfg(test)]
fn unit_triangle() -> Triangle {
    Triangle::new(
        [
            DVec3::new(0.0, 0.0, 0.0),
            DVec3::new(1.0, 0.0, 0.0),
            DVec3::new(0.0, 1.0, 0.0),
        ],
        BlendData::new(),
    )
}

#[test]
fn triangle_normal_follows_winding() {
    let triangle = unit_triangle();

    assert_eq!(triangle.normal(), DVec3::new(0.0, 0.0, 1.0));
}

#[test]
fn barycentric_point_inside() {
    let triangle = unit_triangle();
    let bary = triangle.to_barycentric(DVec3::new(0.25, 0.25, 0.0));

    assert!(bary.x > 0.0 && bary.x < 1.0);
    assert!(bary.y > 0.0 && bary.y < 1.0);
    assert!(bary.z > 0.0 && bary.z < 1.0);
    assert!(feq(bary.x + bary.y + bary.z, 1.0));
}

#[test]
fn barycentric_point_outside() {
    let triangle = unit_triangle();
    let bary = triangle.to_barycentric(DVec3::new(2.0, 2.0, 0.0));

    assert!(bary.x < 0.0 || bary.y < 0.0 || bary.z < 0.0);
}

#[test]
fn barycentric_at_vertices() {
    let triangle = unit_triangle();

    assert_eq!(
        triangle.to_barycentric(DVec3::new(0.0, 0.0, 0.0)),
        DVec3::new(1.0, 0.0, 0.0)
    );
    assert_eq!(
        triangle.to_barycentric(DVec3::new(1.0, 0.0, 0.0)),
        DVec3::new(0.0, 1.0, 0.0)
    );
    assert_eq!(
        triangle.to_barycentric(DVec3::new(0.0, 1.0, 0.0)),
        DVec3::new(0.0, 0.0, 1.0)
    );
}

#[test]
fn triangle_intersect_inside() {
    let triangle = unit_triangle();
    let ray = Ray::new(
        DVec3::new(0.25, 0.25, 5.0),
        DVec3::new(0.0, 0.0, -1.0),
    );

    assert!(feq(triangle.intersect(&ray), 5.0));
}

#[test]
fn triangle_intersect_outside_returns_sentinel() {
    let triangle = unit_triangle();
    let ray = Ray::new(
        DVec3::new(2.0, 2.0, 5.0),
        DVec3::new(0.0, 0.0, -1.0),
    );

    assert_eq!(triangle.intersect(&ray), f64::NEG_INFINITY);
}

#[test]
fn triangle_intersect_parallel_ray_rejected() {
    let triangle = unit_triangle();
    let ray = Ray::new(
        DVec3::new(0.0, 0.0, 5.0),
        DVec3::new(1.0, 0.0, 0.0),
    );

    // The plane time is non-finite; the barycentric containment test must
    // reject it rather than report a hit.
    assert_eq!(triangle.intersect(&ray), f64::NEG_INFINITY);
}

#[test]
fn blend_scalar_attribute() {
    let source = BlendSource::Scalars([1.0, 2.0, 3.0]);
    let value = blend(DVec3::new(0.5, 0.25, 0.25), &source);

    assert_eq!(value, AttrValue::Scalar(0.5 + 0.5 + 0.75));
}

#[test]
fn blend_vector_attribute() {
    let source = BlendSource::Vectors([
        DVec3::new(1.0, 0.0, 0.0),
        DVec3::new(0.0, 1.0, 0.0),
        DVec3::new(0.0, 0.0, 1.0),
    ]);
    let value = blend(DVec3::new(0.2, 0.3, 0.5), &source);

    assert_eq!(value, AttrValue::Vector(DVec3::new(0.2, 0.3, 0.5)));
}

#[test]
fn blend_constant_passes_through() {
    let source = BlendSource::Constant(AttrValue::Scalar(7.0));
    let value = blend(DVec3::new(0.2, 0.3, 0.5), &source);

    assert_eq!(value, AttrValue::Scalar(7.0));
}

#[test]
fn blended_normal_overrides_face_normal() {
    let mut blend_data = BlendData::new();
    blend_data.insert(
        ATTR_NORMAL.into(),
        BlendSource::Vectors([
            DVec3::new(1.0, 0.0, 0.0),
            DVec3::new(1.0, 0.0, 0.0),
            DVec3::new(1.0, 0.0, 0.0),
        ]),
    );

    let triangle = Triangle::new(
        [
            DVec3::new(0.0, 0.0, 0.0),
            DVec3::new(1.0, 0.0, 0.0),
            DVec3::new(0.0, 1.0, 0.0),
        ],
        blend_data,
    );

    let ray = Ray::new(DVec3::new(0.25, 0.25, 5.0), DVec3::new(0.0, 0.0, -1.0));
    let mut data = ShadingData::new(&ray, 5.0, AttrMap::new());
    triangle.material_data(&mut data);

    assert_eq!(data.normal, DVec3::new(1.0, 0.0, 0.0));
    assert!(data.bary.is_some());
}
