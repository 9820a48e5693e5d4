use crate::vector::Vector3;
use crate::ray::Ray;
use crate::light::Material;
use crate::geometry::Surface;

/// An intersection.
///
/// This structure assumes that some ray produced an intersection. Parameter `t`
/// is the offset along the ray, and `what` is the surface that was hit.
#[derive(Copy, Clone, Debug)]
pub struct Intersection<'a> {
    pub t: f64,
    pub what: &'a Surface,
}

/// Two intersections are equal if their offsets match and they refer to the
/// same surface (by pointer, not by value).
impl<'a> PartialEq for Intersection<'a> {
    fn eq(&self, other: &Intersection<'a>) -> bool {
        self.t == other.t && std::ptr::eq(self.what, other.what)
    }
}

/// A record for computations associated with an `Intersection`.
///
/// Holds everything shading needs to know about a hit.
#[derive(Clone, Debug)]
pub struct IntersectionComputation<'a> {
    /// The "time" of the ray intersection.
    pub t: f64,

    /// The surface being intersected.
    pub obj: &'a Surface,

    /// The point where the intersection occurs.
    pub point: Vector3,

    /// The vector from the hit point back towards the ray origin.
    pub eyev: Vector3,

    /// The outward normal of the surface at `point`.
    pub normalv: Vector3,
}

impl<'a> IntersectionComputation<'a> {
    /// Creates a new intersection computation, given a ray and intersection.
    ///
    /// The normal is not flipped for hits from inside a surface.
    pub fn new(r: &Ray, hit: &Intersection<'a>) -> IntersectionComputation<'a> {
        let t = hit.t;
        let obj = hit.what;
        let point = r.position(t);
        let eyev = -r.direction;
        let normalv = obj.normal_at(point);

        IntersectionComputation { t, obj, point, eyev, normalv }
    }

    /// The material of the surface that was hit.
    pub fn material(&self) -> &'a Material {
        self.obj.material()
    }
}

#[test]
fn precompute_outside_hit() {
    use crate::geometry::Sphere;

    let r = Ray::new(Vector3::new(0.0, 0.0, -5.0),
                     Vector3::new(0.0, 0.0, 1.0));
    let s: Surface = Sphere::unit().into();
    let i = Intersection { t: 4.0, what: &s };

    let comps = IntersectionComputation::new(&r, &i);
    assert_eq!(comps.t, 4.0);
    assert_eq!(comps.point, Vector3::new(0.0, 0.0, -1.0));
    assert_eq!(comps.eyev, Vector3::new(0.0, 0.0, -1.0));
    assert_eq!(comps.normalv, Vector3::new(0.0, 0.0, -1.0));
    assert!(std::ptr::eq(comps.obj, &s));
}

#[test]
fn precompute_inside_hit_keeps_outward_normal() {
    use crate::geometry::Sphere;

    let r = Ray::new(Vector3::zero(), Vector3::new(0.0, 0.0, 1.0));
    let s: Surface = Sphere::unit().into();
    let i = Intersection { t: 1.0, what: &s };

    let comps = IntersectionComputation::new(&r, &i);
    assert_eq!(comps.point, Vector3::new(0.0, 0.0, 1.0));
    assert_eq!(comps.normalv, Vector3::new(0.0, 0.0, 1.0));
}

#[test]
fn intersections_compare_by_surface_identity() {
    use crate::geometry::Sphere;

    let s1: Surface = Sphere::unit().into();
    let s2: Surface = Sphere::unit().into();

    let a = Intersection { t: 1.0, what: &s1 };
    let b = Intersection { t: 1.0, what: &s1 };
    let c = Intersection { t: 1.0, what: &s2 };

    assert_eq!(a, b);
    assert_ne!(a, c);
}
