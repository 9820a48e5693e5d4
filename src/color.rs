use std::ops::{ Add, Mul };

use crate::feq;

/// A color.
///
/// Represented with red-green-blue (RGB) values. Channels are unbounded while
/// lighting is accumulated; `clamp` brings them back into 0.0 to 1.0
/// inclusive once shading is done.
///
/// # Examples
///
/// Modulate a light color by a material color:
///
/// ```
/// # use phong_raycaster::color::Color;
/// let light = Color::rgb(0.8, 0.8, 0.8);
/// let material = Color::rgb(0.5, 1.0, 0.0);
/// assert_eq!(light * material, Color::rgb(0.4, 0.8, 0.0));
/// ```
#[derive(Copy, Clone, Debug, Default, PartialOrd)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

/// Partial equality on two colors.
///
/// Colors are compared component-wise, accounting for possible floating point
/// error in comparisons.
impl PartialEq for Color {
    fn eq(&self, other: &Color) -> bool {
        feq(self.r, other.r) &&
            feq(self.g, other.g) &&
            feq(self.b, other.b)
    }
}

/// Conversion from a vector to a `Color`.
///
/// Takes the first `n` elements of a vector, and assigns them to the `r`, `g`
/// and `b` fields of the `Color`, in that order. Missing channels are zero.
impl From<&Vec<f64>> for Color {
    fn from(v: &Vec<f64>) -> Color {
        match v.len() {
            0 => Default::default(),
            1 => Color { r: v[0], ..Default::default() },
            2 => Color { r: v[0], g: v[1], ..Default::default() },
            _ => Color { r: v[0], g: v[1], b: v[2] }
        }
    }
}

impl Color {
    /// Creates a color with red, green and blue values.
    pub fn rgb(r: f64, g: f64, b: f64) -> Color {
        Color { r, g, b }
    }

    /// The color black.
    pub fn black() -> Color {
        Color {
            r: 0.0,
            g: 0.0,
            b: 0.0
        }
    }

    /// The color white.
    pub fn white() -> Color {
        Color {
            r: 1.0,
            g: 1.0,
            b: 1.0
        }
    }

    /// Saturates each channel into the range 0.0 to 1.0.
    ///
    /// Clamping is idempotent:
    ///
    /// ```
    /// # use phong_raycaster::color::Color;
    /// let c = Color::rgb(1.7, -0.2, 0.5);
    /// assert_eq!(c.clamp(), Color::rgb(1.0, 0.0, 0.5));
    /// assert_eq!(c.clamp().clamp(), c.clamp());
    /// ```
    pub fn clamp(&self) -> Color {
        Color {
            r: self.r.max(0.0).min(1.0),
            g: self.g.max(0.0).min(1.0),
            b: self.b.max(0.0).min(1.0),
        }
    }

    /// Quantizes a color to 8 bits per channel.
    ///
    /// Each channel is clamped, scaled to 255 and rounded to the nearest
    /// integer. Both image encoders use this conversion.
    pub fn to_rgb8(&self) -> [u8; 3] {
        let c = self.clamp();
        [
            Self::channel_to_u8(c.r),
            Self::channel_to_u8(c.g),
            Self::channel_to_u8(c.b),
        ]
    }

    fn channel_to_u8(channel: f64) -> u8 {
        (channel * 255.0).round() as u8
    }
}

/// Adds two colors together.
///
/// Components are added together individually.
impl Add<Color> for Color {
    type Output = Color;

    fn add(self, other: Color) -> Self::Output {
        Color {
            r: self.r + other.r,
            g: self.g + other.g,
            b: self.b + other.b,
        }
    }
}

/// Multiplies a color by a scalar.
///
/// Each component is multiplied by the scalar.
impl Mul<f64> for Color {
    type Output = Color;

    fn mul(self, other: f64) -> Self::Output {
        Color {
            r: self.r * other,
            g: self.g * other,
            b: self.b * other,
        }
    }
}

/// Multiplies a color by a color, channel by channel.
///
/// This is how a light's color is filtered by a material's reflectance.
impl Mul<Color> for Color {
    type Output = Color;

    fn mul(self, other: Color) -> Self::Output {
        Color {
            r: self.r * other.r,
            g: self.g * other.g,
            b: self.b * other.b,
        }
    }
}

#[test]
fn add_colors() {
    let c1 = Color::rgb(0.9, 0.6, 0.75);
    let c2 = Color::rgb(0.7, 0.1, 0.25);
    let c3 = Color { r: 1.6, g: 0.7, b: 1.0 };

    assert_eq!(c1 + c2, c3);
}

#[test]
fn multiply_color_by_scalar() {
    let c1 = Color::rgb(0.2, 0.3, 0.4);
    let c2 = Color { r: 0.4, g: 0.6, b: 0.8 };

    assert_eq!(c1 * 2.0, c2);
}

#[test]
fn multiply_colors() {
    let c1 = Color::rgb(1.0, 0.2, 0.4);
    let c2 = Color::rgb(0.9, 1.0, 0.1);

    assert_eq!(c1 * c2, Color::rgb(0.9, 0.2, 0.04));
}

#[test]
fn clamp_saturates_each_channel() {
    let c = Color::rgb(-3.0, 0.25, 42.0);

    assert_eq!(c.clamp(), Color::rgb(0.0, 0.25, 1.0));
}

#[test]
fn clamp_is_idempotent() {
    let samples = [
        Color::rgb(-1.0, 0.0, 2.0),
        Color::rgb(0.3, 0.6, 0.9),
        Color::rgb(1.0, 1.0000001, -0.0000001),
        Color::rgb(1e9, -1e9, 0.5),
    ];

    for c in samples.iter() {
        let once = c.clamp();
        let twice = once.clamp();
        assert_eq!(once.r, twice.r);
        assert_eq!(once.g, twice.g);
        assert_eq!(once.b, twice.b);
    }
}

#[test]
fn quantize_to_rgb8() {
    assert_eq!(Color::white().to_rgb8(), [255, 255, 255]);
    assert_eq!(Color::black().to_rgb8(), [0, 0, 0]);
    assert_eq!(Color::rgb(2.0, -1.0, 0.5).to_rgb8(), [255, 0, 128]);
}
