/// `round(x * y / 255)` for 8-bit channel products.
pub(crate) fn mul_div255(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

/// Premultiply straight-alpha RGBA8 pixels in place.
pub(crate) fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a == 255 {
            continue;
        }
        px[0] = mul_div255(u16::from(px[0]), a) as u8;
        px[1] = mul_div255(u16::from(px[1]), a) as u8;
        px[2] = mul_div255(u16::from(px[2]), a) as u8;
    }
}

/// Un-premultiply and force every pixel opaque.
///
/// Blending rounds partially covered edges of opaque content down to alpha 254; the colour is
/// scaled back up so the pixel keeps its hue instead of darkening when flattened.
pub(crate) fn unpremultiply_to_opaque_in_place(rgba_premul: &mut [u8]) {
    for px in rgba_premul.chunks_exact_mut(4) {
        let a = u32::from(px[3]);
        if a == 255 {
            continue;
        }
        if a > 0 {
            for c in &mut px[..3] {
                *c = ((u32::from(*c) * 255 + a / 2) / a).min(255) as u8;
            }
        }
        px[3] = 255;
    }
}

/// Flatten premultiplied RGBA8 over an opaque background into packed RGB8.
pub(crate) fn flatten_premul_to_rgb8(src_premul: &[u8], bg_rgb: [u8; 3]) -> Vec<u8> {
    let mut out = Vec::with_capacity(src_premul.len() / 4 * 3);
    for s in src_premul.chunks_exact(4) {
        let inv = 255u16 - u16::from(s[3]);
        for c in 0..3 {
            let v = u16::from(s[c]) + mul_div255(u16::from(bg_rgb[c]), inv);
            out.push(v.min(255) as u8);
        }
    }
    out
}
