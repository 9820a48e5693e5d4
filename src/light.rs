use crate::color::Color;
use crate::vector::Vector3;

/// A point light.
///
/// Emits separate diffuse, specular and ambient colors from a single position.
/// Intensity does not fall off with distance.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct PointLight {
    pub position: Vector3,
    pub diffuse: Color,
    pub specular: Color,
    pub ambient: Color,
}

impl PointLight {
    pub fn new(position: Vector3, diffuse: Color, specular: Color,
        ambient: Color) -> PointLight {
        PointLight { position, diffuse, specular, ambient }
    }
}

/// A material record.
///
/// Materials use attributes from the Phong reflection model; each of the
/// ambient, diffuse and specular terms has its own reflectance color, which
/// is multiplied channel-wise with the matching light color.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Material {
    pub diffuse: Color,
    pub specular: Color,
    pub ambient: Color,
    pub shininess: f64,
}

/// A gray, moderately glossy material.
impl Default for Material {
    fn default() -> Material {
        Material {
            diffuse: Color::rgb(0.5, 0.5, 0.5),
            specular: Color::rgb(1.0, 1.0, 1.0),
            ambient: Color::rgb(0.1, 0.1, 0.1),
            shininess: 32.0,
        }
    }
}

impl Material {
    pub fn new(diffuse: Color, specular: Color, ambient: Color,
        shininess: f64) -> Material {
        Material { diffuse, specular, ambient, shininess }
    }
}

/// Calculates the contribution of a single light at a surface point.
///
/// `eyev` points from the surface towards the viewer and `normalv` is the
/// unit surface normal. The ambient term is always included. Diffuse and
/// specular terms are dropped when `in_shadow` is set.
///
/// The result is not clamped; callers sum the contributions of every light
/// and clamp once.
pub fn lighting(m: &Material, light: &PointLight, point: Vector3,
    eyev: Vector3, normalv: Vector3, in_shadow: bool) -> Color {
    let ambient = m.ambient * light.ambient;

    if in_shadow {
        return ambient;
    }

    let lightv = (light.position - point).normalize();
    let light_dot_normal = normalv.dot(&lightv);

    let diffuse = m.diffuse * light.diffuse * light_dot_normal.max(0.0);

    // Reflect the light direction about the normal
    let reflectv = (-lightv + normalv * (2.0 * light_dot_normal)).normalize();
    let factor = reflectv.dot(&eyev).max(0.0).powf(m.shininess);
    let specular = m.specular * light.specular * factor;

    ambient + diffuse + specular
}

#[cfg(test)]
fn overhead_light() -> PointLight {
    PointLight::new(
        Vector3::new(0.0, 10.0, 0.0),
        Color::rgb(0.8, 0.6, 0.4),
        Color::rgb(1.0, 1.0, 1.0),
        Color::rgb(0.1, 0.2, 0.3),
    )
}

#[test]
fn default_material() {
    let m: Material = Default::default();

    assert_eq!(m.diffuse, Color::rgb(0.5, 0.5, 0.5));
    assert_eq!(m.specular, Color::white());
    assert_eq!(m.ambient, Color::rgb(0.1, 0.1, 0.1));
    assert_eq!(m.shininess, 32.0);
}

#[test]
fn light_directly_above_surface() {
    let m = Material::new(
        Color::rgb(0.5, 0.5, 0.5),
        Color::white(),
        Color::black(),
        32.0,
    );
    let light = overhead_light();

    // The eye looks along the surface, so no specular highlight is visible
    let eyev = Vector3::new(1.0, 0.0, 0.0);
    let normalv = Vector3::new(0.0, 1.0, 0.0);

    let res = lighting(&m, &light, Vector3::zero(), eyev, normalv, false);
    assert_eq!(res, m.diffuse * light.diffuse * 1.0);
    assert_eq!(res, Color::rgb(0.4, 0.3, 0.2));
}

#[test]
fn eye_in_path_of_reflection() {
    let m: Material = Default::default();
    let light = overhead_light();

    let eyev = Vector3::new(0.0, 1.0, 0.0);
    let normalv = Vector3::new(0.0, 1.0, 0.0);

    let res = lighting(&m, &light, Vector3::zero(), eyev, normalv, false);
    let expected = m.ambient * light.ambient
        + m.diffuse * light.diffuse
        + m.specular * light.specular;
    assert_eq!(res, expected);
}

#[test]
fn shadowed_surface_only_gets_ambient() {
    let m: Material = Default::default();
    let light = overhead_light();

    let eyev = Vector3::new(0.0, 1.0, 0.0);
    let normalv = Vector3::new(0.0, 1.0, 0.0);

    let res = lighting(&m, &light, Vector3::zero(), eyev, normalv, true);
    assert_eq!(res, Color::rgb(0.01, 0.02, 0.03));
}

#[test]
fn light_behind_surface() {
    let m: Material = Default::default();
    let light = overhead_light();

    let eyev = Vector3::new(0.0, -1.0, 0.0);
    let normalv = Vector3::new(0.0, -1.0, 0.0);

    let res = lighting(&m, &light, Vector3::zero(), eyev, normalv, false);
    assert_eq!(res, m.ambient * light.ambient);
}

#[test]
fn eye_offset_45_degrees_from_reflection() {
    let m: Material = Default::default();
    let light = overhead_light();

    let s = 2.0f64.sqrt() / 2.0;
    let eyev = Vector3::new(s, s, 0.0);
    let normalv = Vector3::new(0.0, 1.0, 0.0);

    let res = lighting(&m, &light, Vector3::zero(), eyev, normalv, false);
    let expected = m.ambient * light.ambient
        + m.diffuse * light.diffuse
        + m.specular * light.specular * s.powf(32.0);
    assert_eq!(res, expected);
}
