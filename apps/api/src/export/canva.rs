//! Canva strip: a 1000×200 PNG of equal-width vertical swatches, left to right.

use png::{BitDepth, ColorType, Encoder};

use super::{palette_rgb, ExportError};
use crate::models::palette::Palette;

pub const STRIP_WIDTH: u32 = 1000;
pub const STRIP_HEIGHT: u32 = 200;

pub fn to_canva_png(palette: &Palette) -> Result<Vec<u8>, ExportError> {
    let colors = palette_rgb(palette)?;
    if colors.is_empty() {
        return Err(ExportError::NoColors);
    }

    // One row, repeated for every line of the image.
    let n = colors.len();
    let row: Vec<u8> = (0..STRIP_WIDTH as usize)
        .flat_map(|x| {
            let rgb = colors[(x * n / STRIP_WIDTH as usize).min(n - 1)];
            [rgb.0, rgb.1, rgb.2]
        })
        .collect();
    let pixels = row.repeat(STRIP_HEIGHT as usize);

    let mut out = Vec::new();
    {
        let mut encoder = Encoder::new(&mut out, STRIP_WIDTH, STRIP_HEIGHT);
        encoder.set_color(ColorType::Rgb);
        encoder.set_depth(BitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(&pixels)?;
        // IEND is written when the writer drops.
    }
    Ok(out)
}
