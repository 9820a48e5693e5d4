use std::convert::TryFrom;
use std::fs;
use std::mem;
use std::path::Path;

use serde::{ Serialize, Deserialize };

use crate::consts::{ BACKGROUND, DEFAULT_WIDTH, DEFAULT_HEIGHT };
use crate::color::Color;
use crate::vector::Vector3;
use crate::light::{ Material, PointLight };
use crate::geometry::Sphere;
use crate::world::World;
use crate::camera::Camera;
use crate::error::{ TraceError, TraceResult };

/// A world together with the camera that views it.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    pub world: World,
    pub camera: Camera,
}

impl Scene {
    /// The built-in scene: three colored spheres resting above a very large
    /// floor sphere, lit by a main light and a dimmer fill light, viewed from
    /// the origin.
    pub fn reference(width: usize, height: usize) -> Scene {
        Scene {
            world: reference_world(),
            camera: Camera::new(width, height, Vector3::zero()),
        }
    }

    /// Checks that the image has pixels and that its frame buffer can be
    /// allocated.
    pub fn validate(&self) -> TraceResult<()> {
        let (width, height) = (self.camera.width, self.camera.height);

        let bytes = self.camera.checked_pixel_count()
            .and_then(|n| n.checked_mul(mem::size_of::<Color>()));
        match bytes {
            Some(0) => Err(TraceError::InvalidScene(format!(
                "image size {}x{} has no pixels", width, height))),
            Some(n) if n <= isize::MAX as usize => Ok(()),
            _ => Err(TraceError::InvalidScene(format!(
                "image size {}x{} is too large", width, height))),
        }
    }

    /// Parses a JSON scene description.
    pub fn from_json(json: &str) -> TraceResult<Scene> {
        let scene_json: SceneJson = serde_json::from_str(json)?;
        Scene::try_from(scene_json)
    }

    /// Reads and parses a JSON scene description file.
    pub fn load(path: &Path) -> TraceResult<Scene> {
        let json = fs::read_to_string(path)?;
        let scene = Scene::from_json(&json)?;

        log::debug!("Loaded scene from {}: {} objects, {} lights",
            path.display(), scene.world.objects.len(), scene.world.lights.len());
        Ok(scene)
    }
}

/// Builds the world of the built-in scene (four spheres, two lights).
pub fn reference_world() -> World {
    let red = Material::new(
        Color::rgb(0.8, 0.2, 0.2),
        Color::rgb(1.0, 1.0, 1.0),
        Color::rgb(0.1, 0.0, 0.0),
        32.0,
    );
    let green = Material::new(
        Color::rgb(0.2, 0.8, 0.2),
        Color::rgb(1.0, 1.0, 1.0),
        Color::rgb(0.0, 0.1, 0.0),
        64.0,
    );
    let blue = Material::new(
        Color::rgb(0.2, 0.2, 0.8),
        Color::rgb(1.0, 1.0, 1.0),
        Color::rgb(0.0, 0.0, 0.1),
        128.0,
    );
    let floor = Material::new(
        Color::rgb(0.7, 0.7, 0.7),
        Color::rgb(0.3, 0.3, 0.3),
        Color::rgb(0.05, 0.05, 0.05),
        16.0,
    );

    let mut world = World::empty();
    world.add_object(Sphere::new(Vector3::new(0.0, 0.0, -5.0), 1.0, red));
    world.add_object(Sphere::new(Vector3::new(-2.0, 0.0, -7.0), 1.5, green));
    world.add_object(Sphere::new(Vector3::new(2.0, 0.0, -6.0), 1.2, blue));
    world.add_object(Sphere::new(Vector3::new(0.0, -1002.0, 0.0), 1000.0, floor));

    // Main light
    world.add_light(PointLight::new(
        Vector3::new(3.0, 5.0, -3.0),
        Color::rgb(0.8, 0.8, 0.8),
        Color::rgb(1.0, 1.0, 1.0),
        Color::rgb(0.1, 0.1, 0.1),
    ));

    // Fill light
    world.add_light(PointLight::new(
        Vector3::new(-3.0, 2.0, -2.0),
        Color::rgb(0.4, 0.4, 0.4),
        Color::rgb(0.5, 0.5, 0.5),
        Color::rgb(0.05, 0.05, 0.05),
    ));

    world
}

fn default_width() -> usize {
    DEFAULT_WIDTH
}

fn default_height() -> usize {
    DEFAULT_HEIGHT
}

/// The on-disk form of a scene.
///
/// Vectors and colors are three-element arrays; shorter arrays are padded
/// with zeros. Everything except `spheres` and `lights` is optional.
#[derive(Serialize, Deserialize, Debug)]
pub struct SceneJson {
    #[serde(default = "default_width")]
    width: usize,
    #[serde(default = "default_height")]
    height: usize,

    #[serde(default)]
    camera: Vec<f64>,
    #[serde(default)]
    background: Option<Vec<f64>>,

    spheres: Vec<SphereJson>,
    lights: Vec<LightJson>,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
struct SphereJson {
    center: Vec<f64>,
    radius: f64,
    #[serde(default)]
    material: Option<MaterialJson>,
}

/// Material fields left out fall back to the default material.
#[derive(Clone, Serialize, Deserialize, Debug)]
struct MaterialJson {
    diffuse: Option<Vec<f64>>,
    specular: Option<Vec<f64>>,
    ambient: Option<Vec<f64>>,
    shininess: Option<f64>,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
struct LightJson {
    position: Vec<f64>,
    diffuse: Vec<f64>,
    specular: Vec<f64>,
    ambient: Vec<f64>,
}

impl From<&MaterialJson> for Material {
    fn from(m: &MaterialJson) -> Material {
        let defaults: Material = Default::default();

        Material {
            diffuse: m.diffuse.as_ref().map_or(defaults.diffuse, |c| c.into()),
            specular: m.specular.as_ref().map_or(defaults.specular, |c| c.into()),
            ambient: m.ambient.as_ref().map_or(defaults.ambient, |c| c.into()),
            shininess: m.shininess.unwrap_or(defaults.shininess),
        }
    }
}

impl From<&LightJson> for PointLight {
    fn from(l: &LightJson) -> PointLight {
        PointLight::new(
            (&l.position).into(),
            (&l.diffuse).into(),
            (&l.specular).into(),
            (&l.ambient).into(),
        )
    }
}

impl TryFrom<SceneJson> for Scene {
    type Error = TraceError;

    fn try_from(scene_json: SceneJson) -> TraceResult<Scene> {
        let mut world = World::empty();
        if let Some(ref bg) = scene_json.background {
            world.background = bg.into();
        } else {
            world.background = BACKGROUND;
        }

        for (i, s) in scene_json.spheres.iter().enumerate() {
            if !s.radius.is_finite() || s.radius <= 0.0 {
                return Err(TraceError::InvalidScene(format!(
                    "sphere {} has invalid radius {}", i, s.radius)));
            }

            let material = s.material.as_ref()
                .map_or_else(Material::default, |m| m.into());
            world.add_object(Sphere::new((&s.center).into(), s.radius, material));
        }

        for l in scene_json.lights.iter() {
            world.add_light(l.into());
        }

        let camera = Camera::new(
            scene_json.width,
            scene_json.height,
            (&scene_json.camera).into(),
        );

        let scene = Scene { world, camera };
        scene.validate()?;

        Ok(scene)
    }
}

#[test]
fn reference_scene_contents() {
    let scene = Scene::reference(800, 600);

    assert_eq!(scene.world.objects.len(), 4);
    assert_eq!(scene.world.lights.len(), 2);
    assert_eq!(scene.world.background, BACKGROUND);
    assert_eq!(scene.camera, Camera::new(800, 600, Vector3::zero()));
}

#[test]
fn parse_minimal_scene() {
    let json = r#"{
        "spheres": [ { "center": [0, 0, -5], "radius": 1.0 } ],
        "lights": [ {
            "position": [3, 5, -3],
            "diffuse": [0.8, 0.8, 0.8],
            "specular": [1, 1, 1],
            "ambient": [0.1, 0.1, 0.1]
        } ]
    }"#;

    let scene = Scene::from_json(json).unwrap();

    assert_eq!(scene.camera.width, DEFAULT_WIDTH);
    assert_eq!(scene.camera.height, DEFAULT_HEIGHT);
    assert_eq!(scene.camera.position, Vector3::zero());
    assert_eq!(scene.world.background, BACKGROUND);
    assert_eq!(scene.world.objects.len(), 1);
    assert_eq!(*scene.world.objects[0].material(), Material::default());
    assert_eq!(scene.world.lights[0].position, Vector3::new(3.0, 5.0, -3.0));
}

#[test]
fn parse_full_scene() {
    let json = r#"{
        "width": 320,
        "height": 240,
        "camera": [0, 1, 2],
        "background": [0, 0, 0],
        "spheres": [ {
            "center": [1, 2, 3],
            "radius": 0.5,
            "material": { "diffuse": [0.9, 0.1], "shininess": 8 }
        } ],
        "lights": []
    }"#;

    let scene = Scene::from_json(json).unwrap();

    assert_eq!(scene.camera, Camera::new(320, 240, Vector3::new(0.0, 1.0, 2.0)));
    assert_eq!(scene.world.background, Color::black());

    let m = scene.world.objects[0].material();
    assert_eq!(m.diffuse, Color::rgb(0.9, 0.1, 0.0));
    assert_eq!(m.specular, Material::default().specular);
    assert_eq!(m.shininess, 8.0);
}

#[test]
fn reject_bad_radius() {
    let json = r#"{
        "spheres": [ { "center": [0, 0, 0], "radius": -1 } ],
        "lights": []
    }"#;

    match Scene::from_json(json) {
        Err(TraceError::InvalidScene(_)) => (),
        other => panic!("expected an invalid scene, got {:?}", other),
    }
}

#[test]
fn reject_empty_image() {
    let json = r#"{ "width": 0, "spheres": [], "lights": [] }"#;

    assert!(matches!(Scene::from_json(json), Err(TraceError::InvalidScene(_))));
}

#[test]
fn reject_oversized_image() {
    let json = format!(r#"{{ "width": {}, "height": 2, "spheres": [], "lights": [] }}"#,
        usize::MAX);

    match Scene::from_json(&json) {
        Err(TraceError::InvalidScene(msg)) => assert!(msg.contains("too large")),
        other => panic!("expected an invalid scene, got {:?}", other),
    }
}

#[test]
fn validate_image_size() {
    assert!(Scene::reference(800, 600).validate().is_ok());
    assert!(Scene::reference(0, 600).validate().is_err());
    assert!(Scene::reference(800, 0).validate().is_err());
    assert!(Scene::reference(usize::MAX, 2).validate().is_err());
    assert!(Scene::reference(1 << 40, 1 << 40).validate().is_err());
}

#[test]
fn reject_malformed_json() {
    assert!(matches!(Scene::from_json("{ \"spheres\": "),
        Err(TraceError::Parse(_))));
}

#[test]
fn load_scene_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scene.json");
    std::fs::write(&path, r#"{ "spheres": [], "lights": [] }"#).unwrap();

    let scene = Scene::load(&path).unwrap();
    assert!(scene.world.objects.is_empty());

    let missing = dir.path().join("missing.json");
    assert!(matches!(Scene::load(&missing), Err(TraceError::Io(_))));
}
