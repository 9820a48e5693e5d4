use crate::ray::Ray;
use crate::vector::Vector3;

/// A pinhole camera looking down the negative Z axis.
///
/// Each pixel is mapped to normalized device coordinates in `[-1, 1]` on both
/// axes, sampled at the pixel center, and a primary ray is cast from the
/// camera position through `(ndc_x, ndc_y, -1)` relative to it. There is no
/// aspect ratio correction, so non-square images stretch horizontally.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Camera {
    /// The horizontal size of the resultant canvas, in pixels.
    pub width: usize,

    /// The vertical size of the resultant canvas, in pixels.
    pub height: usize,

    /// Where primary rays start.
    pub position: Vector3,
}

impl Camera {
    pub fn new(width: usize, height: usize, position: Vector3) -> Camera {
        Camera { width, height, position }
    }

    /// Number of pixels in the image.
    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    /// Number of pixels in the image, or `None` if it overflows a `usize`.
    pub fn checked_pixel_count(&self) -> Option<usize> {
        self.width.checked_mul(self.height)
    }

    /// Converts a flat, row-major pixel index into `(x, y)`.
    pub fn pixel_of(&self, index: usize) -> (usize, usize) {
        (index % self.width, index / self.width)
    }

    /// Builds the primary ray through the center of pixel `(px, py)`.
    ///
    /// Row 0 is the top of the image.
    pub fn ray_for_pixel(&self, px: usize, py: usize) -> Ray {
        let ndc_x = (px as f64 + 0.5) / self.width as f64 * 2.0 - 1.0;
        let ndc_y = 1.0 - (py as f64 + 0.5) / self.height as f64 * 2.0;

        Ray::new(self.position, Vector3::new(ndc_x, ndc_y, -1.0))
    }
}

#[test]
fn pixel_of_flat_index() {
    let c = Camera::new(800, 600, Vector3::zero());

    assert_eq!(c.pixel_count(), 480_000);
    assert_eq!(c.pixel_of(0), (0, 0));
    assert_eq!(c.pixel_of(799), (799, 0));
    assert_eq!(c.pixel_of(800), (0, 1));
    assert_eq!(c.pixel_of(479_999), (799, 599));
}

#[test]
fn ray_through_center() {
    let c = Camera::new(201, 101, Vector3::zero());
    let r = c.ray_for_pixel(100, 50);

    assert_eq!(r.origin, Vector3::zero());
    assert_eq!(r.direction, Vector3::new(0.0, 0.0, -1.0));
}

#[test]
fn ray_through_top_left_corner() {
    let c = Camera::new(2, 2, Vector3::zero());
    let r = c.ray_for_pixel(0, 0);

    let e = Vector3::new(-0.5, 0.5, -1.0).normalize();
    assert_eq!(r.direction, e);
}

#[test]
fn ray_through_bottom_right_corner() {
    let c = Camera::new(2, 2, Vector3::zero());
    let r = c.ray_for_pixel(1, 1);

    let e = Vector3::new(0.5, -0.5, -1.0).normalize();
    assert_eq!(r.direction, e);
}

#[test]
fn ray_starts_at_camera_position() {
    let p = Vector3::new(1.0, 2.0, 3.0);
    let c = Camera::new(10, 10, p);

    assert_eq!(c.ray_for_pixel(3, 7).origin, p);
}

#[test]
fn checked_pixel_count_overflow() {
    let camera = Camera::new(800, 600, Vector3::zero());
    assert_eq!(camera.checked_pixel_count(), Some(480_000));

    let camera = Camera::new(usize::MAX, 2, Vector3::zero());
    assert_eq!(camera.checked_pixel_count(), None);
}
