use std::fs;
use std::path::Path;
use std::sync::Arc;

use glam::{ DMat4, DVec3, DVec4 };
use thiserror::Error;

use crate::geometry::{ self, BlendData, BlendSource, Geometry, Triangle };
use crate::material::Material;
use crate::scene::SceneObject;

/// Errors raised while parsing an OBJ file.
///
/// All parse errors are fatal; there is no partial-result recovery.
#[derive(Debug, Error)]
pub enum ObjError {
    #[error("failed to read OBJ file: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: malformed `{directive}` directive: {text:?}")]
    Malformed {
        line: usize,
        directive: &'static str,
        text: String,
    },

    #[error("line {line}: unrecognized directive: {text:?}")]
    Unrecognized { line: usize, text: String },

    #[error("line {line}: face index {index} out of range")]
    IndexOutOfRange { line: usize, index: usize },
}

/// One corner of a face: 1-based position index plus optional texture and
/// normal indices.
type FaceIndex = (usize, Option<usize>, Option<usize>);

/// Loads an OBJ file into a list of triangle-backed scene objects.
///
/// Vertex positions are transformed by `transform`; normals by its
/// inverse-transpose.
pub fn load_obj_file(path: &Path, material: Arc<Material>,
    transform: DMat4) -> Result<Vec<SceneObject>, ObjError> {
    let text = fs::read_to_string(path)?;
    parse_obj(&text, material, transform)
}

/// Parses OBJ text into a list of triangle-backed scene objects.
///
/// Recognized directives: `v`, `vt`, `vn` and `f`. Grouping and material
/// directives (`mtllib usemtl s o g vp`) are skipped; anything else is a
/// fatal parse error naming the offending line. Faces with more than three
/// corners are fan-triangulated around the first corner. UV and normal
/// blend data are attached to a triangle only when all three of its corners
/// supply that attribute.
pub fn parse_obj(text: &str, material: Arc<Material>,
    transform: DMat4) -> Result<Vec<SceneObject>, ObjError> {
    let norm_transform = transform.inverse().transpose();

    let mut positions: Vec<DVec3> = Vec::new();
    let mut textures: Vec<DVec3> = Vec::new();
    let mut normals: Vec<DVec3> = Vec::new();
    let mut objects: Vec<SceneObject> = Vec::new();

    for (index, line) in text.lines().enumerate() {
        let number = index + 1;
        let tokens: Vec<&str> = line.split_whitespace().collect();

        let directive = match tokens.first() {
            None => continue,
            Some(first) if first.starts_with('#') => continue,
            Some(first) => *first,
        };

        match directive {
            // Vertex position: 3-4 floats x y z [w], w defaults to 1.
            "v" => {
                let floats = parse_floats(&tokens[1..], number, "v", line)?;
                if floats.len() < 3 || floats.len() > 4 {
                    return Err(malformed(number, "v", line));
                }

                let w = if floats.len() == 4 { floats[3] } else { 1.0 };
                let position = transform
                    * DVec4::new(floats[0], floats[1], floats[2], w);
                positions.push(position.truncate());
            },

            // Texture coordinate: 1-3 floats, missing components default
            // to 0.
            "vt" => {
                let floats = parse_floats(&tokens[1..], number, "vt", line)?;
                if floats.is_empty() || floats.len() > 3 {
                    return Err(malformed(number, "vt", line));
                }

                textures.push(DVec3::new(
                    floats[0],
                    floats.get(1).copied().unwrap_or(0.0),
                    floats.get(2).copied().unwrap_or(0.0),
                ));
            },

            // Vertex normal: 3 floats, transformed by the inverse-transpose
            // of the world matrix and normalized.
            "vn" => {
                let floats = parse_floats(&tokens[1..], number, "vn", line)?;
                if floats.len() != 3 {
                    return Err(malformed(number, "vn", line));
                }

                let normal = DVec3::new(floats[0], floats[1], floats[2]);
                normals.push(norm_transform.transform_vector3(normal).normalize());
            },

            // Face: 2 or more 1-based index groups v[/vt[/vn]], describing
            // a planar polygon.
            "f" => {
                let indices = parse_face(&tokens[1..], number, line)?;
                for &(v, vt, vn) in &indices {
                    check_index(v, positions.len(), number)?;
                    if let Some(vt) = vt {
                        check_index(vt, textures.len(), number)?;
                    }
                    if let Some(vn) = vn {
                        check_index(vn, normals.len(), number)?;
                    }
                }

                // Fan triangulation around the first corner: a polygon with
                // N vertices yields N - 2 triangles.
                for i in 2..indices.len() {
                    let corners = [indices[0], indices[i - 1], indices[i]];

                    let mut blend = BlendData::new();
                    if corners.iter().all(|c| c.1.is_some()) {
                        blend.insert(
                            geometry::ATTR_UV.into(),
                            BlendSource::Vectors([
                                textures[corners[0].1.unwrap() - 1],
                                textures[corners[1].1.unwrap() - 1],
                                textures[corners[2].1.unwrap() - 1],
                            ]),
                        );
                    }
                    if corners.iter().all(|c| c.2.is_some()) {
                        blend.insert(
                            geometry::ATTR_NORMAL.into(),
                            BlendSource::Vectors([
                                normals[corners[0].2.unwrap() - 1],
                                normals[corners[1].2.unwrap() - 1],
                                normals[corners[2].2.unwrap() - 1],
                            ]),
                        );
                    }

                    let triangle = Triangle::new(
                        [
                            positions[corners[0].0 - 1],
                            positions[corners[1].0 - 1],
                            positions[corners[2].0 - 1],
                        ],
                        blend,
                    );
                    objects.push(SceneObject::new(
                        Geometry::Triangle(triangle),
                        Arc::clone(&material),
                    ));
                }
            },

            // Throw away material, smoothing, object, group and parameter
            // data.
            "mtllib" | "usemtl" | "s" | "o" | "g" | "vp" => {
                log::debug!("ignoring OBJ directive on line {}: {:?}", number, line);
            },

            _ => {
                return Err(ObjError::Unrecognized {
                    line: number,
                    text: line.into(),
                });
            },
        }
    }

    Ok(objects)
}

fn malformed(line: usize, directive: &'static str, text: &str) -> ObjError {
    ObjError::Malformed { line, directive, text: text.into() }
}

fn parse_floats(tokens: &[&str], line: usize, directive: &'static str,
    text: &str) -> Result<Vec<f64>, ObjError> {
    tokens.iter()
        .map(|t| t.parse().map_err(|_| malformed(line, directive, text)))
        .collect()
}

/// Parses the index groups of an `f` directive.
fn parse_face(tokens: &[&str], line: usize,
    text: &str) -> Result<Vec<FaceIndex>, ObjError> {
    if tokens.len() < 2 {
        return Err(malformed(line, "f", text));
    }

    let mut indices = Vec::with_capacity(tokens.len());
    for token in tokens {
        let parts: Vec<&str> = token.split('/').collect();
        if parts.is_empty() || parts.len() > 3 {
            return Err(malformed(line, "f", text));
        }

        let v = parts[0].parse()
            .map_err(|_| malformed(line, "f", text))?;
        let vt = match parts.get(1) {
            None => None,
            Some(s) if s.is_empty() => None,
            Some(s) => Some(s.parse().map_err(|_| malformed(line, "f", text))?),
        };
        let vn = match parts.get(2) {
            None => None,
            Some(s) if s.is_empty() => None,
            Some(s) => Some(s.parse().map_err(|_| malformed(line, "f", text))?),
        };

        indices.push((v, vt, vn));
    }

    Ok(indices)
}

fn check_index(index: usize, len: usize, line: usize) -> Result<(), ObjError> {
    if index == 0 || index > len {
        Err(ObjError::IndexOutOfRange { line, index })
    } else {
        Ok(())
    }
}

/* Tests */
