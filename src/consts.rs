use crate::color::Color;

// Runtime defaults
pub const DEFAULT_WIDTH: usize = 800;
pub const DEFAULT_HEIGHT: usize = 600;
pub const DEFAULT_PPM_FILE: &'static str = "output.ppm";
pub const DEFAULT_BMP_FILE: &'static str = "output.bmp";

/// Log progress after this many rows' worth of pixels have completed.
pub const PROGRESS_ROWS: usize = 10;

// Floating point comparisons
pub const FEQ_EPSILON: f64 = 0.0001;

/// Offset applied to shadow ray origins along the light direction. Keeps a
/// surface from occluding itself; changing it changes rendered output.
pub const SHADOW_EPSILON: f64 = 0.001;

/// Color of pixels whose primary ray hits nothing.
pub const BACKGROUND: Color = Color { r: 0.1, g: 0.1, b: 0.3 };
