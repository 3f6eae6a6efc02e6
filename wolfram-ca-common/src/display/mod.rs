use std::io::Write;

use image::codecs::png::PngEncoder as ImagePngEncoder;
use image::{ExtendedColorType, ImageEncoder, Rgb, RgbImage};
use serde::{Deserialize, Serialize};
use wolfram_ca_automaton::Rule;

use crate::automaton::Grid;
use crate::{Error, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    /// Live cells.
    pub foreground: [u8; 3],
    pub background: [u8; 3],
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            foreground: [0, 0, 0],
            background: [255, 255, 255],
        }
    }
}

impl Palette {
    pub fn color(&self, cell: bool) -> Rgb<u8> {
        if cell {
            Rgb(self.foreground)
        } else {
            Rgb(self.background)
        }
    }
}

/// Turns a finished [`Grid`] into bytes of some raster format.
pub trait GridEncoder {
    fn content_type(&self) -> &'static str;

    fn extension(&self) -> &'static str;

    fn encode(&self, grid: &Grid, out: &mut dyn Write) -> Result<()>;

    fn encode_to_vec(&self, grid: &Grid) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        self.encode(grid, &mut buffer)?;
        Ok(buffer)
    }
}

/// One pixel per cell, one image row per generation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PngEncoder {
    palette: Palette,
}

impl PngEncoder {
    pub fn new(palette: Palette) -> Self {
        Self { palette }
    }

    pub fn rasterize(&self, grid: &Grid) -> Result<RgbImage> {
        let width = dimension(grid.width(), "width")?;
        let height = dimension(grid.height(), "height")?;
        let mut image = RgbImage::from_pixel(width, height, self.palette.color(false));
        for (y, row) in grid.rows().iter().enumerate() {
            for (x, &cell) in row.iter().enumerate() {
                if cell {
                    image.put_pixel(x as u32, y as u32, self.palette.color(true));
                }
            }
        }
        Ok(image)
    }
}

impl GridEncoder for PngEncoder {
    fn content_type(&self) -> &'static str {
        "image/png"
    }

    fn extension(&self) -> &'static str {
        "png"
    }

    fn encode(&self, grid: &Grid, out: &mut dyn Write) -> Result<()> {
        let image = self.rasterize(grid)?;
        ImagePngEncoder::new(out).write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            ExtendedColorType::Rgb8,
        )?;
        Ok(())
    }
}

/// `rule<N>.<ext>`, the name offered to browsers saving the image.
pub fn suggested_filename(rule: Rule, encoder: &dyn GridEncoder) -> String {
    format!("rule{}.{}", rule, encoder.extension())
}

fn dimension(len: usize, name: &str) -> Result<u32> {
    u32::try_from(len)
        .ok()
        .filter(|&len| len > 0)
        .ok_or_else(|| Error::invalid_argument(format!("image {name} {len} is out of range")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::AutomatonRenderer;
    use crate::init::InitPolicy;

    const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];

    fn grid() -> Grid {
        AutomatonRenderer::new(Rule::new(90))
            .render(5, 2, &InitPolicy::SingleMiddle)
            .unwrap()
    }

    #[test]
    fn test_rasterize() {
        let image = PngEncoder::default().rasterize(&grid()).unwrap();
        assert_eq!(image.dimensions(), (5, 3));
        assert_eq!(image.get_pixel(2, 0), &Rgb([0, 0, 0]));
        assert_eq!(image.get_pixel(1, 0), &Rgb([255, 255, 255]));
        assert_eq!(image.get_pixel(1, 1), &Rgb([0, 0, 0]));
        assert_eq!(image.get_pixel(2, 1), &Rgb([255, 255, 255]));
    }

    #[test]
    fn test_custom_palette() {
        let palette = Palette {
            foreground: [255, 0, 0],
            background: [0, 0, 255],
        };
        let image = PngEncoder::new(palette).rasterize(&grid()).unwrap();
        assert_eq!(image.get_pixel(2, 0), &Rgb([255, 0, 0]));
        assert_eq!(image.get_pixel(0, 0), &Rgb([0, 0, 255]));
    }

    #[test]
    fn test_encode_png() {
        let encoder = PngEncoder::default();
        let bytes = encoder.encode_to_vec(&grid()).unwrap();
        assert_eq!(bytes[..8], PNG_SIGNATURE);
        assert_eq!(encoder.content_type(), "image/png");
    }

    #[test]
    fn test_suggested_filename() {
        assert_eq!(
            suggested_filename(Rule::new(30), &PngEncoder::default()),
            "rule30.png"
        );
    }
}
