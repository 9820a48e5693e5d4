use std::io::{ BufWriter, Write };
use std::fs::File;
use std::path::Path;

use crate::canvas::Canvas;
use crate::error::{ TraceError, TraceResult };

/// Size of the BITMAPFILEHEADER, in bytes.
pub const FILE_HEADER_SIZE: u32 = 14;

/// Size of the BITMAPINFOHEADER, in bytes.
pub const INFO_HEADER_SIZE: u32 = 40;

const BYTES_PER_PIXEL: usize = 3;

/// The combined file and info headers of an uncompressed 24-bit BMP.
///
/// All fields are written little-endian, in declaration order. A positive
/// `height` marks the pixel rows as stored bottom-to-top.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BmpHeader {
    pub file_size: u32,
    pub data_offset: u32,
    pub width: i32,
    pub height: i32,
    pub planes: u16,
    pub bits_per_pixel: u16,
    pub compression: u32,
    pub image_size: u32,
    pub x_pixels_per_meter: i32,
    pub y_pixels_per_meter: i32,
    pub colors_used: u32,
    pub colors_important: u32,
}

impl BmpHeader {
    /// Builds the header for a `width` by `height` image.
    ///
    /// The file size is recorded as `54 + 3 * width * height`, without row
    /// padding. `image_size` is left at zero, which is allowed for
    /// uncompressed images.
    pub fn new(width: usize, height: usize) -> TraceResult<BmpHeader> {
        let too_large = || TraceError::Render(format!(
            "{}x{} image is too large for a BMP file", width, height));

        let data_offset = FILE_HEADER_SIZE + INFO_HEADER_SIZE;
        let file_size = width.checked_mul(height)
            .and_then(|n| n.checked_mul(BYTES_PER_PIXEL))
            .and_then(|n| n.checked_add(data_offset as usize))
            .filter(|n| *n <= u32::MAX as usize)
            .ok_or_else(too_large)? as u32;

        if width > i32::MAX as usize || height > i32::MAX as usize {
            return Err(too_large());
        }

        Ok(BmpHeader {
            file_size,
            data_offset,
            width: width as i32,
            height: height as i32,
            planes: 1,
            bits_per_pixel: 24,
            compression: 0,
            image_size: 0,
            x_pixels_per_meter: 0,
            y_pixels_per_meter: 0,
            colors_used: 0,
            colors_important: 0,
        })
    }

    /// Serializes both headers, 54 bytes in total.
    pub fn write_to<W: Write>(&self, out: &mut W) -> TraceResult<()> {
        // BITMAPFILEHEADER
        out.write_all(b"BM")?;
        out.write_all(&self.file_size.to_le_bytes())?;
        out.write_all(&[0u8; 4])?; // reserved
        out.write_all(&self.data_offset.to_le_bytes())?;

        // BITMAPINFOHEADER
        out.write_all(&INFO_HEADER_SIZE.to_le_bytes())?;
        out.write_all(&self.width.to_le_bytes())?;
        out.write_all(&self.height.to_le_bytes())?;
        out.write_all(&self.planes.to_le_bytes())?;
        out.write_all(&self.bits_per_pixel.to_le_bytes())?;
        out.write_all(&self.compression.to_le_bytes())?;
        out.write_all(&self.image_size.to_le_bytes())?;
        out.write_all(&self.x_pixels_per_meter.to_le_bytes())?;
        out.write_all(&self.y_pixels_per_meter.to_le_bytes())?;
        out.write_all(&self.colors_used.to_le_bytes())?;
        out.write_all(&self.colors_important.to_le_bytes())?;

        Ok(())
    }
}

/// Number of zero bytes appended to each pixel row so that rows are a
/// multiple of four bytes long.
pub fn row_padding(width: usize) -> usize {
    (4 - (width * BYTES_PER_PIXEL) % 4) % 4
}

impl Canvas {
    /// Encodes the canvas as an uncompressed 24-bit BMP image.
    ///
    /// Rows are written bottom-to-top, pixels in BGR byte order, each row
    /// padded with zeros to a multiple of four bytes.
    pub fn write_bmp<W: Write>(&self, out: &mut W) -> TraceResult<()> {
        let header = BmpHeader::new(self.width, self.height)?;
        self.write_bmp_with(&header, out)
    }

    fn write_bmp_with<W: Write>(&self, header: &BmpHeader, out: &mut W)
        -> TraceResult<()> {
        header.write_to(out)?;

        let padding = [0u8; 3];
        let pad = row_padding(self.width);

        let mut row = Vec::with_capacity(self.width * BYTES_PER_PIXEL + pad);
        for y in (0..self.height).rev() {
            row.clear();

            let start = y * self.width;
            for pixel in &self.pixels()[start..start + self.width] {
                let [r, g, b] = pixel.to_rgb8();
                row.extend_from_slice(&[b, g, r]);
            }
            row.extend_from_slice(&padding[..pad]);

            out.write_all(&row)?;
        }

        Ok(())
    }

    /// Saves the canvas to a BMP file at `path`.
    ///
    /// Nothing is created if the image is too large for a BMP file.
    pub fn save_bmp(&self, path: &Path) -> TraceResult<()> {
        let header = BmpHeader::new(self.width, self.height)?;

        let mut out = BufWriter::new(File::create(path)?);
        self.write_bmp_with(&header, &mut out)?;
        out.flush()?;

        Ok(())
    }
}

#[cfg(test)]
fn bmp_bytes(canvas: &Canvas) -> Vec<u8> {
    let mut buf = Vec::new();
    canvas.write_bmp(&mut buf).unwrap();
    buf
}

#[cfg(test)]
fn read_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

#[test]
fn header_is_54_bytes() {
    let mut buf = Vec::new();
    BmpHeader::new(800, 600).unwrap().write_to(&mut buf).unwrap();

    assert_eq!(buf.len(), 54);
    assert_eq!(&buf[0..2], b"BM");
    assert_eq!(read_u32(&buf, 2), 54 + 3 * 800 * 600);
    assert_eq!(read_u32(&buf, 6), 0);
    assert_eq!(read_u32(&buf, 10), 54);
    assert_eq!(read_u32(&buf, 14), 40);
    assert_eq!(read_u32(&buf, 18), 800);
    assert_eq!(read_u32(&buf, 22), 600);
    assert_eq!(&buf[26..30], &[1, 0, 24, 0]);
    assert!(buf[30..54].iter().all(|b| *b == 0));
}

#[test]
fn row_padding_to_four_bytes() {
    assert_eq!(row_padding(800), 0);
    assert_eq!(row_padding(1), 1);
    assert_eq!(row_padding(2), 2);
    assert_eq!(row_padding(3), 3);
    assert_eq!(row_padding(4), 0);
    assert_eq!(row_padding(5), 1);
}

#[test]
fn pixels_are_bgr_bottom_up() {
    use crate::color::Color;

    let mut c = Canvas::new(2, 2);
    c.write_pixel(0, 0, &Color::rgb(1.0, 0.0, 0.0));
    c.write_pixel(1, 1, &Color::rgb(0.0, 0.0, 1.0));

    let bytes = bmp_bytes(&c);
    let data = &bytes[54..];

    // Two pixels of three bytes plus two bytes of padding per row
    assert_eq!(data.len(), 2 * 8);

    // Bottom row first: (0, 1) black, (1, 1) blue
    assert_eq!(&data[0..8], &[0, 0, 0, 255, 0, 0, 0, 0]);
    // Then the top row: (0, 0) red, (1, 0) black
    assert_eq!(&data[8..16], &[0, 0, 255, 0, 0, 0, 0, 0]);
}

#[test]
fn file_size_field_ignores_padding() {
    let c = Canvas::new(3, 2);
    let bytes = bmp_bytes(&c);

    assert_eq!(read_u32(&bytes, 2), 54 + 3 * 3 * 2);
    assert_eq!(bytes.len(), 54 + (9 + 3) * 2);
}

#[test]
fn save_bmp_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.bmp");

    let c = Canvas::new(4, 4);
    c.save_bmp(&path).unwrap();

    let contents = std::fs::read(&path).unwrap();
    assert_eq!(contents, bmp_bytes(&c));
    assert_eq!(contents.len(), 54 + 4 * 4 * 3);
}

#[test]
fn save_bmp_to_missing_directory_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("out.bmp");

    let c = Canvas::new(4, 4);
    assert!(c.save_bmp(&path).is_err());
}

#[test]
fn oversized_bmp_creates_no_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("huge.bmp");

    // The header is rejected before any pixel is read
    let mut c = Canvas::new(0, 0);
    c.width = 100_000;
    c.height = 100_000;

    assert!(matches!(c.save_bmp(&path), Err(TraceError::Render(_))));
    assert!(!path.exists());
}
