use crate::consts::{ BACKGROUND, SHADOW_EPSILON };
use crate::ray::Ray;
use crate::vector::Vector3;
use crate::color::Color;
use crate::light::{ PointLight, lighting };
use crate::geometry::Surface;
use crate::intersect::{ Intersection, IntersectionComputation };

/// A world with objects and lights.
///
/// Objects and lights are kept in insertion order. A world is built up front
/// and only read while rendering, so it can be shared between render threads
/// without locking.
#[derive(Clone, Debug, PartialEq)]
pub struct World {
    pub objects: Vec<Surface>,
    pub lights: Vec<PointLight>,

    /// Color returned for rays that hit nothing.
    pub background: Color,
}

impl Default for World {
    fn default() -> World {
        World::empty()
    }
}

impl World {
    /// Creates an empty world with no objects, no lights and the default
    /// background.
    pub fn empty() -> World {
        World {
            objects: Vec::new(),
            lights: Vec::new(),
            background: BACKGROUND,
        }
    }

    /// Appends an object to the world.
    pub fn add_object<S: Into<Surface>>(&mut self, object: S) {
        self.objects.push(object.into());
    }

    /// Appends a light to the world.
    pub fn add_light(&mut self, light: PointLight) {
        self.lights.push(light);
    }

    /// Finds the intersection with the smallest positive `t` along a ray.
    ///
    /// Every object is checked. When two objects are hit at exactly the same
    /// `t`, the one added first wins.
    pub fn find_closest_intersection(&self, r: &Ray) -> Option<Intersection> {
        let mut closest: Option<Intersection> = None;

        for obj in self.objects.iter() {
            if let Some(t) = obj.intersect(r) {
                let nearer = match closest {
                    Some(ref c) => t < c.t,
                    None => true,
                };

                if nearer {
                    closest = Some(Intersection { t, what: obj });
                }
            }
        }

        closest
    }

    /// Determines whether some object blocks `light` from reaching `p`.
    ///
    /// The shadow ray starts `SHADOW_EPSILON` along the light direction so
    /// that the surface containing `p` does not shadow itself. Only hits
    /// closer than the light count as occluders.
    pub fn is_shadowed(&self, p: Vector3, light: &PointLight) -> bool {
        let v = light.position - p;
        let distance = v.length();
        let direction = v.normalize();

        let r = Ray::new(p + direction * SHADOW_EPSILON, direction);

        self.objects.iter().any(|obj| match obj.intersect(&r) {
            Some(t) => t < distance,
            None => false,
        })
    }

    /// Calculates the color for a hit, based on shadows and every light.
    ///
    /// Light contributions are summed, then clamped once.
    pub fn shade_hit(&self, comps: &IntersectionComputation) -> Color {
        let material = comps.material();

        let total = self.lights.iter().fold(Color::black(), |acc, light| {
            let in_shadow = self.is_shadowed(comps.point, light);
            acc + lighting(material, light, comps.point, comps.eyev,
                comps.normalv, in_shadow)
        });

        total.clamp()
    }

    /// Determines the color seen along a ray.
    ///
    /// Rays that hit nothing get the world's background color.
    pub fn color_at(&self, r: &Ray) -> Color {
        match self.find_closest_intersection(r) {
            None => self.background,
            Some(i) => {
                let comps = IntersectionComputation::new(r, &i);
                self.shade_hit(&comps)
            },
        }
    }
}

#[cfg(test)]
fn white_light(position: Vector3) -> PointLight {
    PointLight::new(position, Color::white(), Color::white(),
        Color::rgb(0.1, 0.1, 0.1))
}

#[test]
fn closest_intersection_ignores_insertion_order() {
    use crate::geometry::Sphere;

    let mut w = World::empty();
    w.add_object(Sphere::new(Vector3::new(0.0, 0.0, -10.0), 1.0,
        Default::default()));
    w.add_object(Sphere::new(Vector3::new(0.0, 0.0, -5.0), 1.0,
        Default::default()));

    let r = Ray::new(Vector3::zero(), Vector3::new(0.0, 0.0, -1.0));
    let hit = w.find_closest_intersection(&r).unwrap();

    assert_eq!(hit.t, 4.0);
    assert!(std::ptr::eq(hit.what, &w.objects[1]));
}

#[test]
fn closest_intersection_tie_goes_to_first_object() {
    use crate::geometry::Sphere;
    use crate::light::Material;

    let mut first: Material = Default::default();
    first.shininess = 1.0;
    let mut second: Material = Default::default();
    second.shininess = 2.0;

    let mut w = World::empty();
    w.add_object(Sphere::new(Vector3::new(0.0, 0.0, -5.0), 1.0, first));
    w.add_object(Sphere::new(Vector3::new(0.0, 0.0, -5.0), 1.0, second));

    let r = Ray::new(Vector3::zero(), Vector3::new(0.0, 0.0, -1.0));
    let hit = w.find_closest_intersection(&r).unwrap();

    assert!(std::ptr::eq(hit.what, &w.objects[0]));
    assert_eq!(hit.what.material().shininess, 1.0);
}

#[test]
fn closest_intersection_miss() {
    use crate::geometry::Sphere;

    let mut w = World::empty();
    w.add_object(Sphere::unit());

    let r = Ray::new(Vector3::new(0.0, 0.0, -5.0),
                     Vector3::new(0.0, 1.0, 0.0));

    assert!(w.find_closest_intersection(&r).is_none());
}

#[test]
fn shadow_when_object_between_point_and_light() {
    use crate::geometry::Sphere;

    let mut w = World::empty();
    w.add_object(Sphere::unit());
    let light = white_light(Vector3::new(0.0, 10.0, 0.0));

    assert!(w.is_shadowed(Vector3::new(0.0, -10.0, 0.0), &light));
}

#[test]
fn no_shadow_when_nothing_between_point_and_light() {
    let w = World::empty();
    let light = white_light(Vector3::new(0.0, 10.0, 0.0));

    assert!(!w.is_shadowed(Vector3::new(0.0, -10.0, 0.0), &light));
}

#[test]
fn no_shadow_when_object_behind_light() {
    use crate::geometry::Sphere;

    let mut w = World::empty();
    w.add_object(Sphere::unit());
    let light = white_light(Vector3::new(0.0, -10.0, 0.0));

    assert!(!w.is_shadowed(Vector3::new(0.0, -20.0, 0.0), &light));
}

#[test]
fn no_shadow_when_object_behind_point() {
    use crate::geometry::Sphere;

    let mut w = World::empty();
    w.add_object(Sphere::unit());
    let light = white_light(Vector3::new(0.0, 10.0, 0.0));

    assert!(!w.is_shadowed(Vector3::new(0.0, 5.0, 0.0), &light));
}

#[test]
fn surface_does_not_shadow_itself() {
    use crate::geometry::Sphere;

    let mut w = World::empty();
    w.add_object(Sphere::unit());
    let light = white_light(Vector3::new(0.0, 10.0, 0.0));

    assert!(!w.is_shadowed(Vector3::new(0.0, 1.0, 0.0), &light));
    assert!(w.is_shadowed(Vector3::new(0.0, -1.0, 0.0), &light));
}

#[test]
fn shade_hit_in_shadow_is_ambient_only() {
    use crate::geometry::Sphere;

    let mut w = World::empty();
    w.add_object(Sphere::unit());
    w.add_object(Sphere::new(Vector3::new(0.0, 0.0, 10.0), 1.0,
        Default::default()));
    w.add_light(white_light(Vector3::new(0.0, 0.0, -10.0)));
    w.add_light(white_light(Vector3::new(0.0, 0.0, -20.0)));

    let r = Ray::new(Vector3::new(0.0, 0.0, 5.0),
                     Vector3::new(0.0, 0.0, 1.0));
    let i = w.find_closest_intersection(&r).unwrap();
    assert!(std::ptr::eq(i.what, &w.objects[1]));

    let comps = IntersectionComputation::new(&r, &i);
    let c = w.shade_hit(&comps);

    // Default material ambient 0.1 times light ambient 0.1, twice
    assert_eq!(c, Color::rgb(0.02, 0.02, 0.02));
}

#[test]
fn shade_hit_is_clamped() {
    use crate::geometry::Sphere;

    let mut w = World::empty();
    w.add_object(Sphere::unit());
    for _ in 0..4 {
        w.add_light(white_light(Vector3::new(0.0, 0.0, -10.0)));
    }

    let r = Ray::new(Vector3::new(0.0, 0.0, -5.0),
                     Vector3::new(0.0, 0.0, 1.0));
    let c = w.color_at(&r);

    assert_eq!(c, Color::white());
}

#[test]
fn color_ray_miss_is_background() {
    use crate::geometry::Sphere;

    let mut w = World::empty();
    w.add_object(Sphere::unit());
    w.add_light(white_light(Vector3::new(0.0, 10.0, -10.0)));

    let r = Ray::new(Vector3::new(0.0, 0.0, -5.0),
                     Vector3::new(0.0, 1.0, 0.0));
    let c = w.color_at(&r);

    assert_eq!(c.r, 0.1);
    assert_eq!(c.g, 0.1);
    assert_eq!(c.b, 0.3);
}

#[test]
fn color_ray_hit_facing_light() {
    use crate::geometry::Sphere;
    use crate::light::Material;

    let m = Material::new(Color::rgb(0.6, 0.4, 0.2), Color::black(),
        Color::black(), 10.0);

    let mut w = World::empty();
    w.add_object(Sphere::new(Vector3::zero(), 1.0, m));
    w.add_light(white_light(Vector3::new(0.0, 0.0, -10.0)));

    let r = Ray::new(Vector3::new(0.0, 0.0, -5.0),
                     Vector3::new(0.0, 0.0, 1.0));

    assert_eq!(w.color_at(&r), Color::rgb(0.6, 0.4, 0.2));
}
