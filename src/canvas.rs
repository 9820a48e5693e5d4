use std::io::{ BufWriter, Write };
use std::fs::File;
use std::path::Path;

use crate::color::Color;
use crate::error::TraceResult;

/// PPM lines are kept within this many columns.
const PPM_LINE_WIDTH: usize = 70;

/// A canvas for drawing pixels.
///
/// This structure is the frame buffer of the ray tracer: one `Color` per
/// pixel, stored row-major starting from the top-left corner. Once rendering
/// finishes, the `Canvas` is handed to the image encoders.
#[derive(Clone, Default, Debug, PartialEq)]
pub struct Canvas {
    /// The width of the canvas, in pixels.
    pub width: usize,

    /// The height of the canvas, in pixels.
    pub height: usize,

    /// The pixels of the canvas, stored as a flattened vector.
    pixels: Vec<Color>,
}

impl Canvas {
    /// Creates a new black canvas with specified width and height.
    pub fn new(width: usize, height: usize) -> Canvas {
        Canvas {
            width,
            height,
            pixels: vec![Color::black(); width * height]
        }
    }

    /// Writes a color to a location on the `Canvas`.
    ///
    /// Out-of-bounds pixels are ignored. `y` is the row of the pixel and `x`
    /// is the column, both zero-indexed.
    ///
    /// # Examples
    ///
    /// ```
    /// # use phong_raycaster::color::Color;
    /// # use phong_raycaster::canvas::Canvas;
    /// let purple = Color::rgb(1.0, 0.0, 1.0);
    /// let mut canvas = Canvas::new(8, 8);
    /// canvas.write_pixel(4, 2, &purple);
    /// assert_eq!(canvas.read_pixel(4, 2).unwrap(), purple);
    /// ```
    pub fn write_pixel(&mut self, x: usize, y: usize, pixel: &Color) {
        if x >= self.width || y >= self.height {
            return;
        }

        self.pixels[(y * self.width) + x] = *pixel;
    }

    /// Writes a color at a flat, row-major pixel index. Out-of-bounds
    /// indices are ignored.
    pub fn write_index(&mut self, index: usize, pixel: &Color) {
        if let Some(slot) = self.pixels.get_mut(index) {
            *slot = *pixel;
        }
    }

    /// Reads a color from a location on the `Canvas`.
    ///
    /// Returns `None` if the location is out-of-bounds.
    pub fn read_pixel(&self, x: usize, y: usize) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None
        }

        Some(self.pixels[(y * self.width) + x])
    }

    /// All pixels, row-major from the top-left corner.
    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    /// Encodes the canvas as an ASCII (`P3`) PPM image.
    ///
    /// Pixels are written top-to-bottom as `R G B` triplets of integers in
    /// 0..=255. Lines are wrapped so that none exceeds 70 columns; a triplet
    /// may span two lines, which PPM readers accept.
    pub fn write_ppm<W: Write>(&self, out: &mut W) -> TraceResult<()> {
        // Header: magic number, dimensions and maximum color value
        writeln!(out, "P3")?;
        writeln!(out, "{} {}", self.width, self.height)?;
        writeln!(out, "255")?;

        let mut col = 0;
        for pixel in self.pixels.iter() {
            for channel in pixel.to_rgb8().iter() {
                let token = channel.to_string();

                if col > 0 && col + 1 + token.len() > PPM_LINE_WIDTH {
                    writeln!(out)?;
                    col = 0;
                } else if col > 0 {
                    write!(out, " ")?;
                    col += 1;
                }

                write!(out, "{}", token)?;
                col += token.len();
            }
        }

        // Terminate the PPM file with a newline
        writeln!(out)?;
        Ok(())
    }

    /// Saves the canvas to a PPM file at `path`.
    pub fn save_ppm(&self, path: &Path) -> TraceResult<()> {
        let mut out = BufWriter::new(File::create(path)?);
        self.write_ppm(&mut out)?;
        out.flush()?;

        Ok(())
    }
}

#[cfg(test)]
fn ppm_body(canvas: &Canvas) -> String {
    let mut buf = Vec::new();
    canvas.write_ppm(&mut buf).unwrap();
    String::from_utf8(buf).unwrap()
}

#[test]
fn new_canvas_is_black() {
    let c = Canvas::new(10, 20);

    assert_eq!(c.pixels().len(), 200);
    assert!(c.pixels().iter().all(|p| *p == Color::black()));
}

#[test]
fn out_of_bounds_pixels() {
    let mut c = Canvas::new(4, 3);
    c.write_pixel(4, 0, &Color::white());
    c.write_pixel(0, 3, &Color::white());
    c.write_index(12, &Color::white());

    assert!(c.pixels().iter().all(|p| *p == Color::black()));
    assert_eq!(c.read_pixel(4, 0), None);
    assert_eq!(c.read_pixel(0, 3), None);
}

#[test]
fn write_index_is_row_major() {
    let mut c = Canvas::new(4, 3);
    c.write_index(6, &Color::white());

    assert_eq!(c.read_pixel(2, 1), Some(Color::white()));
}

#[test]
fn ppm_header() {
    let c = Canvas::new(5, 3);
    let ppm = ppm_body(&c);

    assert!(ppm.starts_with("P3\n5 3\n255\n"));
}

#[test]
fn ppm_pixel_data() {
    let mut c = Canvas::new(5, 3);
    c.write_pixel(0, 0, &Color::rgb(1.5, 0.0, 0.0));
    c.write_pixel(2, 1, &Color::rgb(0.0, 0.5, 0.0));
    c.write_pixel(4, 2, &Color::rgb(-0.5, 0.0, 1.0));

    let ppm = ppm_body(&c);
    let tokens: Vec<&str> = ppm.split_whitespace().skip(4).collect();

    assert_eq!(tokens.len(), 5 * 3 * 3);
    assert_eq!(&tokens[0..3], &["255", "0", "0"]);
    assert_eq!(&tokens[21..24], &["0", "128", "0"]);
    assert_eq!(&tokens[42..45], &["0", "0", "255"]);
}

#[test]
fn ppm_lines_are_wrapped() {
    let mut c = Canvas::new(10, 2);
    for y in 0..2 {
        for x in 0..10 {
            c.write_pixel(x, y, &Color::rgb(1.0, 0.8, 0.6));
        }
    }

    let ppm = ppm_body(&c);

    assert!(ppm.lines().all(|l| l.len() <= 70));
    assert!(ppm.ends_with('\n'));
    assert_eq!(ppm.split_whitespace().skip(4).count(), 10 * 2 * 3);
}

#[test]
fn save_ppm_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.ppm");

    let c = Canvas::new(3, 2);
    c.save_ppm(&path).unwrap();

    let contents = std::fs::read_to_string(&path).unwrap();
    assert_eq!(contents, ppm_body(&c));
}

#[test]
fn save_ppm_to_missing_directory_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("out.ppm");

    let c = Canvas::new(3, 2);
    assert!(c.save_ppm(&path).is_err());
}
