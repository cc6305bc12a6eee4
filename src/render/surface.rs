use std::path::PathBuf;
use std::sync::Arc;

use crate::foundation::core::{Affine, Canvas, Rect, Vec2};
use crate::foundation::error::{ReelError, ReelResult};
use crate::foundation::math::{mul_div255, unpremultiply_to_opaque_in_place};
use crate::render::blur::{blur_alpha8, radius_for_sigma};
use crate::render::text::{TextBrushRgba8, TextLayoutEngine, fill_layout};
use crate::scene::color::Rgba;
use crate::scene::motion::{DESIGN_HEIGHT, DESIGN_WIDTH, DiagonalGradient, SceneFrame, TextOverlay};

/// A rendered frame as RGBA8 pixels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    pub width: u32,
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether `data` is premultiplied alpha.
    pub premultiplied: bool,
}

/// Surface construction options.
#[derive(Clone, Debug, Default)]
pub struct SurfaceOpts {
    /// Font file for the text overlay; a system face is used when unset.
    pub font_path: Option<PathBuf>,
}

/// The single drawing surface shared by synthesis and replay.
///
/// Not `Clone`: whoever holds the value (or a `&mut` to it) is the only writer.
pub struct Surface {
    canvas: Canvas,
    width: u16,
    height: u16,
    /// Maps the 1920x1080 design space onto the canvas.
    view: Affine,
    ctx: vello_cpu::RenderContext,
    pixmap: vello_cpu::Pixmap,
    text: TextLayoutEngine,
    gradient_scratch: Vec<u8>,
}

impl std::fmt::Debug for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Surface")
            .field("canvas", &self.canvas)
            .finish_non_exhaustive()
    }
}

impl Surface {
    pub fn new(canvas: Canvas, opts: SurfaceOpts) -> ReelResult<Self> {
        canvas.validate()?;
        let width: u16 = canvas
            .width
            .try_into()
            .map_err(|_| ReelError::validation("surface width exceeds u16"))?;
        let height: u16 = canvas
            .height
            .try_into()
            .map_err(|_| ReelError::validation("surface height exceeds u16"))?;

        let view = Affine::scale_non_uniform(
            f64::from(canvas.width) / DESIGN_WIDTH,
            f64::from(canvas.height) / DESIGN_HEIGHT,
        );

        Ok(Self {
            canvas,
            width,
            height,
            view,
            ctx: vello_cpu::RenderContext::new(width, height),
            pixmap: vello_cpu::Pixmap::new(width, height),
            text: TextLayoutEngine::new(opts.font_path),
            gradient_scratch: Vec::new(),
        })
    }

    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Current surface pixels (premultiplied RGBA8).
    pub fn pixels(&self) -> &[u8] {
        self.pixmap.data_as_u8_slice()
    }

    /// Copy the current surface content out.
    pub fn snapshot(&self) -> FrameRGBA {
        FrameRGBA {
            width: self.canvas.width,
            height: self.canvas.height,
            data: self.pixels().to_vec(),
            premultiplied: true,
        }
    }

    /// Repaint the whole surface with one evaluated scene.
    pub fn paint_scene(&mut self, scene: &SceneFrame) -> ReelResult<()> {
        self.ctx.reset();
        self.ctx
            .set_blend_mode(vello_cpu::peniko::BlendMode::default());
        self.ctx
            .set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);

        let full = vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(self.width),
            f64::from(self.height),
        );

        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx
            .set_paint(vello_cpu::peniko::Color::from_rgba8(0, 0, 0, 255));
        self.ctx.fill_rect(&full);

        let gradient = self.gradient_image(&scene.background)?;
        self.ctx.set_paint(gradient);
        self.ctx.fill_rect(&full);

        self.ctx.set_transform(affine_to_cpu(self.view));
        for circle in &scene.circles {
            let [r, g, b, a] = circle.color.to_rgba8();
            self.ctx
                .set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
            let shape = vello_cpu::kurbo::Circle::new(
                vello_cpu::kurbo::Point::new(circle.center.x, circle.center.y),
                circle.radius.max(0.0),
            );
            let mut path = vello_cpu::kurbo::BezPath::new();
            for el in vello_cpu::kurbo::Shape::path_elements(&shape, 0.1) {
                path.push(el);
            }
            self.ctx.fill_path(&path);
        }

        if let Some(overlay) = &scene.text {
            self.draw_text(overlay)?;
        }

        self.ctx.flush();
        self.ctx.render_to_pixmap(&mut self.pixmap);
        unpremultiply_to_opaque_in_place(self.pixmap.data_as_u8_slice_mut());
        Ok(())
    }

    /// Draw a decoded still at the origin, replacing the surface content.
    pub fn draw_rgba8(&mut self, rgba_straight: &[u8], width: u32, height: u32) -> ReelResult<()> {
        if width != self.canvas.width || height != self.canvas.height {
            return Err(ReelError::render(format!(
                "frame size mismatch: got {width}x{height}, surface is {}x{}",
                self.canvas.width, self.canvas.height
            )));
        }
        let mut premul = rgba_straight.to_vec();
        crate::foundation::math::premultiply_rgba8_in_place(&mut premul);
        let image = rgba_premul_to_image(&premul, width, height)?;

        self.ctx.reset();
        self.ctx
            .set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_paint(image);
        self.ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(width),
            f64::from(height),
        ));
        self.ctx.flush();
        self.ctx.render_to_pixmap(&mut self.pixmap);
        Ok(())
    }

    fn gradient_image(&mut self, g: &DiagonalGradient) -> ReelResult<vello_cpu::Image> {
        let w = self.canvas.width;
        let h = self.canvas.height;
        let start = g.start.to_rgba8();
        let end = g.end.to_rgba8();

        // Projection of each pixel centre onto the (0,0) -> (w,h) diagonal.
        let wf = f64::from(w);
        let hf = f64::from(h);
        let len2 = wf * wf + hf * hf;

        let bytes = &mut self.gradient_scratch;
        bytes.clear();
        bytes.resize(self.canvas.byte_len_rgba8(), 0);
        for y in 0..h {
            let row_dot = (f64::from(y) + 0.5) * hf;
            let row = (y as usize) * (w as usize) * 4;
            for x in 0..w {
                let t = (((f64::from(x) + 0.5) * wf + row_dot) / len2).clamp(0.0, 1.0);
                let idx = row + (x as usize) * 4;
                for c in 0..4 {
                    let a = f64::from(start[c]);
                    let b = f64::from(end[c]);
                    bytes[idx + c] = (a + (b - a) * t).round().clamp(0.0, 255.0) as u8;
                }
            }
        }
        // Both stops are opaque, so straight and premultiplied bytes coincide.
        rgba_premul_to_image(bytes, w, h)
    }

    fn draw_text(&mut self, overlay: &TextOverlay) -> ReelResult<()> {
        let [r, g, b, a] = overlay.color.to_rgba8();
        let (layout, font) = self.text.layout_line(
            &overlay.text,
            overlay.font_size as f32,
            TextBrushRgba8 { r, g, b, a },
        )?;

        let tw = f64::from(layout.width());
        let th = f64::from(layout.height());
        let text_tr = self.view
            * Affine::translate((overlay.center.x - tw / 2.0, overlay.center.y - th / 2.0));

        let scale = (f64::from(self.canvas.width) / DESIGN_WIDTH)
            .min(f64::from(self.canvas.height) / DESIGN_HEIGHT);
        if let Some((origin, shadow)) = self.shadow_image(
            &layout,
            &font,
            text_tr,
            Rect::new(0.0, 0.0, tw, th),
            overlay.shadow.color,
            overlay.shadow.sigma() * scale,
            overlay.shadow.offset * scale,
        )? {
            self.ctx.set_transform(affine_to_cpu(Affine::translate(origin)));
            self.ctx.set_paint(shadow.paint);
            self.ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                0.0,
                0.0,
                f64::from(shadow.w),
                f64::from(shadow.h),
            ));
        }

        self.ctx.set_transform(affine_to_cpu(text_tr));
        fill_layout(&mut self.ctx, &layout, &font, None);
        Ok(())
    }

    /// Rasterize the text coverage into an offscreen layer, blur it and tint it.
    ///
    /// Returns the layer and its top-left position on the canvas, or `None` when the shadow
    /// falls entirely outside the canvas.
    #[allow(clippy::too_many_arguments)]
    fn shadow_image(
        &self,
        layout: &parley::Layout<TextBrushRgba8>,
        font: &vello_cpu::peniko::FontData,
        text_tr: Affine,
        text_rect: Rect,
        color: Rgba,
        sigma: f64,
        offset: Vec2,
    ) -> ReelResult<Option<(Vec2, ImagePaint)>> {
        let radius = radius_for_sigma(sigma);
        let margin = f64::from(radius);
        let bbox = text_tr.transform_rect_bbox(text_rect);

        let x0 = (bbox.x0 + offset.x - margin).floor().max(0.0);
        let y0 = (bbox.y0 + offset.y - margin).floor().max(0.0);
        let x1 = (bbox.x1 + offset.x + margin)
            .ceil()
            .min(f64::from(self.width));
        let y1 = (bbox.y1 + offset.y + margin)
            .ceil()
            .min(f64::from(self.height));
        if x1 <= x0 || y1 <= y0 {
            return Ok(None);
        }
        let w = (x1 - x0) as u16;
        let h = (y1 - y0) as u16;

        let mut layer = vello_cpu::RenderContext::new(w, h);
        layer.set_transform(affine_to_cpu(
            Affine::translate((offset.x - x0, offset.y - y0)) * text_tr,
        ));
        fill_layout(
            &mut layer,
            layout,
            font,
            Some(vello_cpu::peniko::Color::from_rgba8(255, 255, 255, 255)),
        );
        layer.flush();
        let mut pixmap = vello_cpu::Pixmap::new(w, h);
        layer.render_to_pixmap(&mut pixmap);

        let coverage: Vec<u8> = pixmap
            .data_as_u8_slice()
            .chunks_exact(4)
            .map(|px| px[3])
            .collect();
        let blurred = blur_alpha8(&coverage, u32::from(w), u32::from(h), radius, sigma as f32)?;

        let [r, g, b, a] = color.to_rgba8();
        let mut bytes = Vec::with_capacity(blurred.len() * 4);
        for cov in blurred {
            let alpha = mul_div255(u16::from(cov), u16::from(a));
            bytes.extend_from_slice(&[
                mul_div255(u16::from(r), alpha) as u8,
                mul_div255(u16::from(g), alpha) as u8,
                mul_div255(u16::from(b), alpha) as u8,
                alpha as u8,
            ]);
        }

        let paint = rgba_premul_to_image(&bytes, u32::from(w), u32::from(h))?;
        Ok(Some((
            Vec2::new(x0, y0),
            ImagePaint {
                paint,
                w: u32::from(w),
                h: u32::from(h),
            },
        )))
    }
}

struct ImagePaint {
    paint: vello_cpu::Image,
    w: u32,
    h: u32,
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn pixmap_from_premul_bytes(bytes: &[u8], width: u32, height: u32) -> ReelResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| ReelError::render("pixmap width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| ReelError::render("pixmap height exceeds u16"))?;
    if bytes.len()
        != (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4)
    {
        return Err(ReelError::render("pixmap byte len mismatch"));
    }
    let pixels: Vec<vello_cpu::peniko::color::PremulRgba8> = bytes
        .chunks_exact(4)
        .map(|px| vello_cpu::peniko::color::PremulRgba8::from_u8_array([px[0], px[1], px[2], px[3]]))
        .collect();
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels, w, h, true,
    ))
}

fn rgba_premul_to_image(bytes_premul: &[u8], width: u32, height: u32) -> ReelResult<vello_cpu::Image> {
    let pixmap = pixmap_from_premul_bytes(bytes_premul, width, height)?;
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
