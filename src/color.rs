use std::path::Path;

use anyhow::{Context, Result};
use eframe::egui::{Color32, ColorImage};
use palette::{Hsl, IntoColor, Srgb};

use crate::data::model::Frame;

// ---------------------------------------------------------------------------
// Colour scale: value → Color32
// ---------------------------------------------------------------------------

/// Hue of the lowest value (blue); the top of the range is red at 0°.
const LOW_HUE: f32 = 240.0;

/// Maps values in `[vmin, vmax]` onto a blue → red hue ramp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorScale {
    pub vmin: f64,
    pub vmax: f64,
}

impl ColorScale {
    pub fn new(vmin: f64, vmax: f64) -> Self {
        Self { vmin, vmax }
    }

    /// Position of `value` in the range, clamped to `[0, 1]`.
    pub fn fraction(&self, value: f64) -> f32 {
        let span = self.vmax - self.vmin;
        if span <= 0.0 {
            return if value > self.vmin { 1.0 } else { 0.0 };
        }
        ((value - self.vmin) / span).clamp(0.0, 1.0) as f32
    }

    /// Colour at fraction `t` of the ramp.
    pub fn color_at(t: f32) -> Color32 {
        let hue = LOW_HUE * (1.0 - t.clamp(0.0, 1.0));
        let hsl = Hsl::new(hue, 0.85, 0.5);
        let rgb: Srgb = hsl.into_color();
        Color32::from_rgb(
            (rgb.red * 255.0) as u8,
            (rgb.green * 255.0) as u8,
            (rgb.blue * 255.0) as u8,
        )
    }

    pub fn color_for(&self, value: f64) -> Color32 {
        if !value.is_finite() {
            return Color32::BLACK;
        }
        Self::color_at(self.fraction(value))
    }
}

// ---------------------------------------------------------------------------
// Frame rendering
// ---------------------------------------------------------------------------

/// A frame coloured through a [`ColorScale`], row-major RGB8.
#[derive(Debug, Clone, PartialEq)]
pub struct RgbFrame {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<u8>,
}

impl RgbFrame {
    pub fn to_color_image(&self) -> ColorImage {
        ColorImage::from_rgb([self.width, self.height], &self.pixels)
    }
}

pub fn render_rgb(frame: &Frame, scale: ColorScale) -> RgbFrame {
    let (height, width) = frame.dim();
    let mut pixels = Vec::with_capacity(width * height * 3);
    for &v in frame.iter() {
        let c = scale.color_for(v);
        pixels.extend_from_slice(&[c.r(), c.g(), c.b()]);
    }
    RgbFrame {
        width,
        height,
        pixels,
    }
}

/// Save the coloured frame as a PNG.
pub fn export_png(path: &Path, frame: &Frame, scale: ColorScale) -> Result<()> {
    let rgb = render_rgb(frame, scale);
    let image = image::RgbImage::from_raw(rgb.width as u32, rgb.height as u32, rgb.pixels)
        .context("frame buffer does not match its dimensions")?;
    image
        .save_with_format(path, image::ImageFormat::Png)
        .with_context(|| format!("writing {}", path.display()))?;
    log::info!("Exported {}x{} image to {}", rgb.width, rgb.height, path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn ends_of_the_ramp() {
        let scale = ColorScale::new(0.0, 3.0);
        let low = scale.color_for(-1.0);
        let high = scale.color_for(10.0);
        assert!(low.b() > low.r());
        assert!(high.r() > high.b());
        assert_eq!(low, ColorScale::color_at(0.0));
        assert_eq!(high, ColorScale::color_at(1.0));
    }

    #[test]
    fn fraction_clamps_and_handles_flat_range() {
        let scale = ColorScale::new(500.0, 2000.0);
        assert_eq!(scale.fraction(1250.0), 0.5);
        assert_eq!(scale.fraction(0.0), 0.0);
        let flat = ColorScale::new(1.0, 1.0);
        assert_eq!(flat.fraction(1.0), 0.0);
        assert_eq!(flat.fraction(2.0), 1.0);
    }

    #[test]
    fn non_finite_is_black() {
        assert_eq!(ColorScale::new(0.0, 1.0).color_for(f64::NAN), Color32::BLACK);
    }

    #[test]
    fn rendering_is_row_major() {
        let frame = array![[0.0, 3.0, 0.0]];
        let rgb = render_rgb(&frame, ColorScale::new(0.0, 3.0));
        assert_eq!((rgb.width, rgb.height), (3, 1));
        assert_eq!(rgb.pixels.len(), 9);
        assert_eq!(rgb.pixels[0..3], rgb.pixels[6..9]);
        assert_ne!(rgb.pixels[0..3], rgb.pixels[3..6]);
    }

    #[test]
    fn png_export_writes_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("od.png");
        export_png(&path, &array![[0.0, 1.0], [2.0, 3.0]], ColorScale::new(0.0, 3.0)).unwrap();
        let decoded = image::open(&path).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (2, 2));
    }
}
