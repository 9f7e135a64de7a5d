use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use glam::{ DMat4, DVec3 };
use serde::{ Serialize, Deserialize };
use thiserror::Error;

use crate::camera::PerspectiveCamera;
use crate::consts::DEFAULT_RECURSION_DEPTH;
use crate::geometry::{ BlendData, Geometry, Plane, Triangle };
use crate::light::Light;
use crate::material::{ Material, Phong };
use crate::obj::{ self, ObjError };
use crate::scene::{ Scene, SceneObject };

/// Errors raised while loading a scene description.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("failed to read scene file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse scene file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("object references unknown material {0:?}")]
    UnknownMaterial(String),

    #[error(transparent)]
    Obj(#[from] ObjError),
}

/// A JSON scene description.
#[derive(Clone, Serialize, Deserialize)]
pub struct SceneFile {
    pub width: usize,
    pub height: usize,
    pub fov_degrees: f64,

    #[serde(default = "default_depth")]
    pub max_recursion_depth: u32,

    #[serde(default)]
    pub background: [f64; 3],

    pub camera: CameraFile,

    #[serde(default)]
    pub lights: Vec<LightFile>,

    #[serde(default)]
    pub materials: BTreeMap<String, MaterialFile>,

    #[serde(default)]
    pub objects: Vec<ObjectFile>,
}

fn default_depth() -> u32 {
    DEFAULT_RECURSION_DEPTH
}

fn default_scale() -> f64 {
    1.0
}

fn default_ambient() -> f64 {
    1.0
}

#[derive(Clone, Serialize, Deserialize)]
pub struct CameraFile {
    pub from: [f64; 3],
    pub to: [f64; 3],
    pub up: [f64; 3],
}

#[derive(Clone, Serialize, Deserialize)]
pub struct LightFile {
    pub position: [f64; 3],
    pub color: [f64; 3],
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MaterialFile {
    Solid {
        color: [f64; 3],
    },
    Phong {
        color: [f64; 3],
        #[serde(default = "default_ambient")]
        ambient: f64,
        #[serde(default)]
        diffusivity: f64,
        #[serde(default)]
        specularity: f64,
        #[serde(default)]
        smoothness: f64,
        #[serde(default)]
        reflectivity: f64,
    },
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ObjectFile {
    Plane {
        normal: [f64; 3],
        delta: f64,
        material: String,
    },
    Triangle {
        vertices: [[f64; 3]; 3],
        material: String,
    },
    Mesh {
        file: String,
        material: String,
        #[serde(default)]
        translate: [f64; 3],
        #[serde(default = "default_scale")]
        scale: f64,
    },
}

/// Everything a render run needs, built from a scene file.
pub struct LoadedScene {
    pub scene: Scene,
    pub camera: PerspectiveCamera,
    pub width: usize,
    pub height: usize,
    pub max_recursion_depth: u32,
}

/// Reads and builds a scene description. Mesh files are resolved relative
/// to the scene file's directory.
pub fn load_scene(path: &Path) -> Result<LoadedScene, SceneError> {
    let text = fs::read_to_string(path)?;
    let file: SceneFile = serde_json::from_str(&text)?;
    build_scene(file, path.parent().unwrap_or_else(|| Path::new(".")))
}

/// Builds a renderable scene from a parsed description.
pub fn build_scene(file: SceneFile, base_dir: &Path) -> Result<LoadedScene, SceneError> {
    // Materials are shared: every object naming the same material holds a
    // reference to the same instance.
    let mut materials: BTreeMap<String, Arc<Material>> = BTreeMap::new();
    for (name, material) in &file.materials {
        let built = match *material {
            MaterialFile::Solid { color } => Material::solid(color.into()),
            MaterialFile::Phong {
                color, ambient, diffusivity, specularity, smoothness,
                reflectivity,
            } => Material::Phong(Phong {
                base_color: color.into(),
                ambient,
                diffusivity,
                specularity,
                smoothness,
                reflectivity,
            }),
        };
        materials.insert(name.clone(), Arc::new(built));
    }

    let lookup = |name: &String| -> Result<Arc<Material>, SceneError> {
        materials.get(name)
            .cloned()
            .ok_or_else(|| SceneError::UnknownMaterial(name.clone()))
    };

    let mut scene = Scene::new(file.background.into());
    for light in &file.lights {
        scene.add_light(Light::point(
            light.position.into(),
            light.color.into(),
        ));
    }

    for object in &file.objects {
        match object {
            ObjectFile::Plane { normal, delta, material } => {
                scene.add_object(SceneObject::new(
                    Geometry::Plane(Plane::new((*normal).into(), *delta)),
                    lookup(material)?,
                ));
            },

            ObjectFile::Triangle { vertices, material } => {
                scene.add_object(SceneObject::new(
                    Geometry::Triangle(Triangle::new(
                        vertices.map(DVec3::from),
                        BlendData::new(),
                    )),
                    lookup(material)?,
                ));
            },

            ObjectFile::Mesh { file: mesh, material, translate, scale } => {
                let transform = DMat4::from_translation((*translate).into())
                    * DMat4::from_scale(DVec3::splat(*scale));
                let objects = obj::load_obj_file(
                    &base_dir.join(mesh),
                    lookup(material)?,
                    transform,
                )?;
                log::info!("loaded {} triangles from {:?}", objects.len(), mesh);
                scene.add_objects(objects);
            },
        }
    }

    let aspect = file.width as f64 / file.height as f64;
    let camera = PerspectiveCamera::look_at(
        file.fov_degrees.to_radians(),
        aspect,
        file.camera.from.into(),
        file.camera.to.into(),
        file.camera.up.into(),
    );

    Ok(LoadedScene {
        scene,
        camera,
        width: file.width,
        height: file.height,
        max_recursion_depth: file.max_recursion_depth,
    })
}

/* Tests */

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;

    fn minimal_scene_json() -> &'static str {
        r#"{
            "width": 4,
            "height": 4,
            "fov_degrees": 90.0,
            "camera": {
                "from": [0.0, 0.0, 5.0],
                "to": [0.0, 0.0, 0.0],
                "up": [0.0, 1.0, 0.0]
            },
            "materials": {
                "red": { "type": "solid", "color": [1.0, 0.0, 0.0] }
            },
            "objects": [
                { "type": "plane", "normal": [0.0, 0.0, 1.0], "delta": 0.0,
                  "material": "red" }
            ]
        }"#
    }

    #[test]
    fn build_minimal_scene() {
        let file: SceneFile = serde_json::from_str(minimal_scene_json())
            .unwrap();
        let loaded = build_scene(file, Path::new(".")).unwrap();

        assert_eq!(loaded.width, 4);
        assert_eq!(loaded.height, 4);
        assert_eq!(loaded.max_recursion_depth, DEFAULT_RECURSION_DEPTH);
        assert_eq!(loaded.scene.objects.len(), 1);
        assert_eq!(loaded.scene.bg_color, Color::black());
    }

    #[test]
    fn built_scene_renders_the_red_plane() {
        use crate::buffer::PixelBuffer;
        use crate::renderer::Renderer;

        let file: SceneFile = serde_json::from_str(minimal_scene_json())
            .unwrap();
        let loaded = build_scene(file, Path::new(".")).unwrap();

        let renderer = Renderer::new(
            Arc::new(loaded.scene),
            Arc::new(loaded.camera),
            loaded.max_recursion_depth,
        );
        let mut img = PixelBuffer::new(loaded.width, loaded.height);
        renderer.render(&mut img);

        for y in 0..loaded.height {
            for x in 0..loaded.width {
                assert_eq!(img.get_color(x, y).unwrap(), Color::red());
            }
        }
    }

    #[test]
    fn unknown_material_is_an_error() {
        let text = r#"{
            "width": 4,
            "height": 4,
            "fov_degrees": 90.0,
            "camera": {
                "from": [0.0, 0.0, 5.0],
                "to": [0.0, 0.0, 0.0],
                "up": [0.0, 1.0, 0.0]
            },
            "objects": [
                { "type": "plane", "normal": [0.0, 0.0, 1.0], "delta": 0.0,
                  "material": "missing" }
            ]
        }"#;

        let file: SceneFile = serde_json::from_str(text).unwrap();
        match build_scene(file, Path::new(".")) {
            Err(SceneError::UnknownMaterial(name)) => assert_eq!(name, "missing"),
            _ => panic!("expected an unknown-material error"),
        }
    }

    #[test]
    fn phong_material_defaults() {
        let text = r#"{ "type": "phong", "color": [1.0, 1.0, 1.0] }"#;
        let file: MaterialFile = serde_json::from_str(text).unwrap();

        match file {
            MaterialFile::Phong { ambient, diffusivity, reflectivity, .. } => {
                assert_eq!(ambient, 1.0);
                assert_eq!(diffusivity, 0.0);
                assert_eq!(reflectivity, 0.0);
            },
            _ => panic!("expected a phong material"),
        }
    }
}
