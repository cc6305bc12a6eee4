//! Still-image codec for synthesized frames (JPEG, like a canvas `toDataURL("image/jpeg")`).

use image::ImageEncoder as _;

use crate::foundation::error::{ReelError, ReelResult};
use crate::foundation::math::flatten_premul_to_rgb8;
use crate::render::surface::FrameRGBA;

/// Default JPEG quality (0.8 on a 0..1 scale).
pub const DEFAULT_JPEG_QUALITY: u8 = 80;

/// Encode a rendered frame as a baseline JPEG, flattening any alpha over black.
pub fn encode_jpeg(frame: &FrameRGBA, quality: u8) -> ReelResult<Vec<u8>> {
    if !(1..=100).contains(&quality) {
        return Err(ReelError::validation("jpeg quality must be within 1..=100"));
    }
    let expected = (frame.width as usize)
        .saturating_mul(frame.height as usize)
        .saturating_mul(4);
    if frame.data.len() != expected {
        return Err(ReelError::render(
            "frame.data size mismatch with width*height*4",
        ));
    }

    let rgb = if frame.premultiplied {
        flatten_premul_to_rgb8(&frame.data, [0, 0, 0])
    } else {
        let mut premul = frame.data.clone();
        crate::foundation::math::premultiply_rgba8_in_place(&mut premul);
        flatten_premul_to_rgb8(&premul, [0, 0, 0])
    };

    let mut out = Vec::new();
    image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, quality)
        .write_image(
            &rgb,
            frame.width,
            frame.height,
            image::ExtendedColorType::Rgb8,
        )
        .map_err(|e| ReelError::render(format!("jpeg encode failed: {e}")))?;
    Ok(out)
}

/// Decoded still in straight-alpha RGBA8.
#[derive(Clone, Debug)]
pub struct DecodedStill {
    pub width: u32,
    pub height: u32,
    pub rgba8: Vec<u8>,
}

pub fn decode_jpeg(bytes: &[u8]) -> ReelResult<DecodedStill> {
    let img = image::load_from_memory_with_format(bytes, image::ImageFormat::Jpeg)
        .map_err(|e| ReelError::render(format!("jpeg decode failed: {e}")))?;
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(DecodedStill {
        width,
        height,
        rgba8: rgba.into_raw(),
    })
}

/// Encode a rendered frame as PNG (lossless, used by the CLI `frame` command).
pub fn encode_png(frame: &FrameRGBA) -> ReelResult<Vec<u8>> {
    let rgb = flatten_premul_to_rgb8(&frame.data, [0, 0, 0]);
    let mut out = Vec::new();
    image::codecs::png::PngEncoder::new(&mut out)
        .write_image(
            &rgb,
            frame.width,
            frame.height,
            image::ExtendedColorType::Rgb8,
        )
        .map_err(|e| ReelError::render(format!("png encode failed: {e}")))?;
    Ok(out)
}
