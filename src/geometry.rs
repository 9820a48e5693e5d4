use crate::vector::Vector3;
use crate::ray::Ray;
use crate::light::Material;

/// A sphere with a center, radius and surface material.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Sphere {
    pub center: Vector3,
    pub radius: f64,
    pub material: Material,
}

impl Sphere {
    pub fn new(center: Vector3, radius: f64, material: Material) -> Sphere {
        Sphere { center, radius, material }
    }

    /// A unit sphere at the origin with the default material.
    pub fn unit() -> Sphere {
        Sphere {
            center: Vector3::zero(),
            radius: 1.0,
            material: Default::default(),
        }
    }

    /// Intersects a ray with the sphere.
    ///
    /// Solves `|O + tD - C|^2 = r^2` for `t`. The smaller root is returned if
    /// it is positive; otherwise the larger root is used, which covers rays
    /// starting inside the sphere. Returns `None` if there is no real root or
    /// the chosen root is not strictly positive.
    pub fn intersect(&self, ray: &Ray) -> Option<f64> {
        let sphere_to_ray = ray.origin - self.center;

        let a = ray.direction.dot(&ray.direction);
        let b = 2.0 * sphere_to_ray.dot(&ray.direction);
        let c = sphere_to_ray.dot(&sphere_to_ray) - self.radius * self.radius;

        let discriminant = b * b - (4.0 * a * c);
        if discriminant < 0.0 {
            return None;
        }

        let sqrt_disc = discriminant.sqrt();
        let t1 = (-b - sqrt_disc) / (2.0 * a);
        let t2 = (-b + sqrt_disc) / (2.0 * a);

        let t = if t1 > 0.0 { t1 } else { t2 };
        if t > 0.0 {
            Some(t)
        } else {
            None
        }
    }

    /// The outward unit normal at a point on the sphere's surface.
    pub fn normal_at(&self, point: Vector3) -> Vector3 {
        (point - self.center).normalize()
    }
}

/// A renderable surface.
///
/// Spheres are the only primitive for now. New primitives become new variants
/// and get an arm in each method below.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Surface {
    Sphere(Sphere),
}

impl Surface {
    /// Parametric distance to the nearest valid (strictly positive)
    /// intersection with `ray`, if any.
    pub fn intersect(&self, ray: &Ray) -> Option<f64> {
        match self {
            Surface::Sphere(s) => s.intersect(ray),
        }
    }

    pub fn normal_at(&self, point: Vector3) -> Vector3 {
        match self {
            Surface::Sphere(s) => s.normal_at(point),
        }
    }

    pub fn material(&self) -> &Material {
        match self {
            Surface::Sphere(s) => &s.material,
        }
    }
}

impl From<Sphere> for Surface {
    fn from(sphere: Sphere) -> Surface {
        Surface::Sphere(sphere)
    }
}

#[test]
fn ray_pierces_sphere() {
    let r = Ray::new(Vector3::new(0.0, 0.0, -5.0),
                     Vector3::new(0.0, 0.0, 1.0));
    let s = Sphere::unit();

    assert_eq!(s.intersect(&r), Some(4.0));
}

#[test]
fn ray_is_tangent_to_sphere() {
    let r = Ray::new(Vector3::new(0.0, 1.0, -5.0),
                     Vector3::new(0.0, 0.0, 1.0));
    let s = Sphere::unit();

    assert_eq!(s.intersect(&r), Some(5.0));
}

#[test]
fn ray_misses_sphere() {
    let r = Ray::new(Vector3::new(0.0, 2.0, -5.0),
                     Vector3::new(0.0, 0.0, 1.0));
    let s = Sphere::unit();

    assert_eq!(s.intersect(&r), None);
}

#[test]
fn ray_is_inside_sphere() {
    let r = Ray::new(Vector3::new(0.0, 0.0, 0.0),
                     Vector3::new(0.0, 0.0, 1.0));
    let s = Sphere::unit();

    // Only the far root is in front of the origin
    assert_eq!(s.intersect(&r), Some(1.0));
}

#[test]
fn sphere_is_behind_ray() {
    let r = Ray::new(Vector3::new(0.0, 0.0, 5.0),
                     Vector3::new(0.0, 0.0, 1.0));
    let s = Sphere::unit();

    assert_eq!(s.intersect(&r), None);
}

#[test]
fn intersect_uses_sphere_center_and_radius() {
    let r = Ray::new(Vector3::new(0.0, 0.0, 0.0),
                     Vector3::new(0.0, 0.0, -10.0));
    let s = Sphere::new(Vector3::new(0.0, 0.0, -5.0), 2.0, Default::default());

    assert_eq!(s.intersect(&r), Some(3.0));
}

#[test]
fn normal_on_sphere_x() {
    let s = Sphere::unit();

    assert_eq!(s.normal_at(Vector3::new(1.0, 0.0, 0.0)),
        Vector3::new(1.0, 0.0, 0.0));
}

#[test]
fn normal_on_sphere_nonaxial() {
    let s = Sphere::unit();
    let k = 3.0f64.sqrt() / 3.0;

    let n = s.normal_at(Vector3::new(k, k, k));
    assert_eq!(n, Vector3::new(k, k, k));
    assert_eq!(n, n.normalize());
}

#[test]
fn normal_on_translated_sphere() {
    let s = Sphere::new(Vector3::new(0.0, 1.0, 0.0), 2.0, Default::default());

    assert_eq!(s.normal_at(Vector3::new(0.0, 3.0, 0.0)),
        Vector3::new(0.0, 1.0, 0.0));
}

#[test]
fn surface_dispatches_to_sphere() {
    let mut m: Material = Default::default();
    m.shininess = 5.0;
    let surface: Surface = Sphere::new(Vector3::zero(), 1.0, m).into();
    let r = Ray::new(Vector3::new(0.0, 0.0, -5.0),
                     Vector3::new(0.0, 0.0, 1.0));

    assert_eq!(surface.intersect(&r), Some(4.0));
    assert_eq!(surface.normal_at(Vector3::new(0.0, 0.0, -1.0)),
        Vector3::new(0.0, 0.0, -1.0));
    assert_eq!(surface.material().shininess, 5.0);
}
