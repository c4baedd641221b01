//! Sprite sheet slicing

use image::RgbaImage;
use macroquad::texture::{FilterMode, Texture2D};

use crate::error::{Result, StandardsError};

/// Cut a sheet into `frame_width` x `frame_height` frames, row by row.
/// Partial frames at the right or bottom edge are ignored.
pub fn slice_sheet(sheet: &RgbaImage, frame_width: u32, frame_height: u32) -> Result<Vec<RgbaImage>> {
    if frame_width == 0 || frame_height == 0 {
        return Err(StandardsError::InvalidConfig("frame size must be non-zero".into()));
    }
    let cols = sheet.width() / frame_width;
    let rows = sheet.height() / frame_height;

    let mut frames = Vec::with_capacity((cols * rows) as usize);
    for row in 0..rows {
        for col in 0..cols {
            let frame = image::imageops::crop_imm(
                sheet,
                col * frame_width,
                row * frame_height,
                frame_width,
                frame_height,
            )
            .to_image();
            frames.push(frame);
        }
    }
    Ok(frames)
}

/// Decode a sheet from encoded bytes (PNG, JPEG, BMP) and slice it
pub fn slice_sheet_bytes(bytes: &[u8], frame_width: u32, frame_height: u32) -> Result<Vec<RgbaImage>> {
    let sheet = image::load_from_memory(bytes)?.to_rgba8();
    slice_sheet(&sheet, frame_width, frame_height)
}

/// Upload a frame as a pixel-art texture. Needs a live macroquad context.
pub fn to_texture(frame: &RgbaImage) -> Texture2D {
    let tex = Texture2D::from_rgba8(frame.width() as u16, frame.height() as u16, frame.as_raw());
    tex.set_filter(FilterMode::Nearest);
    tex
}
