//! Adobe Swatch Exchange (ASE) 1.0 encoder. All values are big-endian.
//!
//! Layout: `ASEF`, version `1.0`, block count, then one colour entry block per
//! swatch: block type, block length, UTF-16 name with NUL terminator, colour
//! model, three `f32` channels and the colour type.

use bytes::{BufMut, BytesMut};

use super::{palette_rgb, ExportError};
use crate::models::palette::Palette;

const SIGNATURE: &[u8; 4] = b"ASEF";
const VERSION: (u16, u16) = (1, 0);
const BLOCK_COLOR_ENTRY: u16 = 0x0001;
const MODEL_RGB: &[u8; 4] = b"RGB ";
const COLOR_TYPE_GLOBAL: u16 = 0;

pub fn to_ase(palette: &Palette) -> Result<Vec<u8>, ExportError> {
    let colors = palette_rgb(palette)?;

    let mut buf = BytesMut::new();
    buf.put_slice(SIGNATURE);
    buf.put_u16(VERSION.0);
    buf.put_u16(VERSION.1);
    buf.put_u32(colors.len() as u32);

    for (swatch, rgb) in palette.colors.iter().zip(colors) {
        let mut name: Vec<u16> = swatch.name.encode_utf16().collect();
        name.push(0);
        // the length prefix counts the terminator
        let name_len =
            u16::try_from(name.len()).map_err(|_| ExportError::NameTooLong(name.len() - 1))?;

        let block_len = 2 + name.len() * 2 + MODEL_RGB.len() + 3 * 4 + 2;
        buf.put_u16(BLOCK_COLOR_ENTRY);
        buf.put_u32(block_len as u32);
        buf.put_u16(name_len);
        for unit in &name {
            buf.put_u16(*unit);
        }
        buf.put_slice(MODEL_RGB);
        for channel in rgb.to_unit() {
            buf.put_f32(channel);
        }
        buf.put_u16(COLOR_TYPE_GLOBAL);
    }

    Ok(buf.to_vec())
}
