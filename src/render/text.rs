use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::foundation::error::{ReelError, ReelResult};

/// Families tried, in order, when no explicit font file is configured.
const PREFERRED_FAMILIES: [&str; 4] = ["Arial", "Helvetica", "Liberation Sans", "DejaVu Sans"];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// RGBA8 brush color used by Parley text layout.
pub(crate) struct TextBrushRgba8 {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
    pub(crate) a: u8,
}

/// Raw font file bytes plus the face index inside the file.
#[derive(Clone)]
pub(crate) struct LoadedFont {
    pub(crate) bytes: Arc<Vec<u8>>,
    pub(crate) index: u32,
    pub(crate) origin: String,
}

impl std::fmt::Debug for LoadedFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedFont")
            .field("len", &self.bytes.len())
            .field("index", &self.index)
            .field("origin", &self.origin)
            .finish()
    }
}

/// Load the overlay font: the configured file if any, otherwise a bold sans-serif system face.
pub(crate) fn load_overlay_font(font_path: Option<&Path>) -> ReelResult<LoadedFont> {
    if let Some(path) = font_path {
        let bytes = std::fs::read(path).map_err(|e| {
            ReelError::render(format!("failed to read font '{}': {e}", path.display()))
        })?;
        return Ok(LoadedFont {
            bytes: Arc::new(bytes),
            index: 0,
            origin: path.display().to_string(),
        });
    }

    let mut db = usvg::fontdb::Database::new();
    db.load_system_fonts();

    let mut families: Vec<usvg::fontdb::Family<'_>> = PREFERRED_FAMILIES
        .iter()
        .map(|name| usvg::fontdb::Family::Name(*name))
        .collect();
    families.push(usvg::fontdb::Family::SansSerif);

    let query = usvg::fontdb::Query {
        families: &families,
        weight: usvg::fontdb::Weight::BOLD,
        stretch: usvg::fontdb::Stretch::Normal,
        style: usvg::fontdb::Style::Normal,
    };
    let id = db.query(&query).ok_or_else(|| {
        ReelError::render("text overlay needs a font, but no sans-serif system font was found")
    })?;
    let origin = db
        .face(id)
        .and_then(|f| f.families.first().map(|(name, _)| name.clone()))
        .unwrap_or_else(|| "system font".to_owned());
    let (bytes, index) = db
        .with_face_data(id, |data, index| (data.to_vec(), index))
        .ok_or_else(|| ReelError::render("failed to read system font data"))?;

    tracing::debug!(font = %origin, "resolved overlay font");
    Ok(LoadedFont {
        bytes: Arc::new(bytes),
        index,
        origin,
    })
}

/// The face the overlay text resolves to.
#[derive(Clone)]
pub struct OverlayFont {
    /// File path or family name the face came from.
    pub origin: String,
    pub face_index: u32,
    pub bytes: Arc<Vec<u8>>,
}

/// Resolve the overlay font the same way a [`Surface`](crate::render::surface::Surface) would.
pub fn resolve_overlay_font(font_path: Option<&Path>) -> ReelResult<OverlayFont> {
    let loaded = load_overlay_font(font_path)?;
    Ok(OverlayFont {
        origin: loaded.origin,
        face_index: loaded.index,
        bytes: loaded.bytes,
    })
}

struct RegisteredFont {
    family_name: String,
    data: vello_cpu::peniko::FontData,
}

/// Parley text shaping for the overlay.
///
/// The font is resolved on first use and registered once.
pub(crate) struct TextLayoutEngine {
    font_path: Option<PathBuf>,
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    font: Option<RegisteredFont>,
}

impl TextLayoutEngine {
    pub(crate) fn new(font_path: Option<PathBuf>) -> Self {
        Self {
            font_path,
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            font: None,
        }
    }

    fn ensure_font(&mut self) -> ReelResult<()> {
        if self.font.is_some() {
            return Ok(());
        }
        let loaded = load_overlay_font(self.font_path.as_deref())?;

        let families = self.font_ctx.collection.register_fonts(
            parley::fontique::Blob::from(loaded.bytes.as_ref().clone()),
            None,
        );
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            ReelError::render(format!(
                "no font families registered from '{}'",
                loaded.origin
            ))
        })?;
        let family_name = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| ReelError::render("registered font family has no name"))?
            .to_string();

        let data = vello_cpu::peniko::FontData::new(
            vello_cpu::peniko::Blob::from(loaded.bytes.as_ref().clone()),
            loaded.index,
        );
        self.font = Some(RegisteredFont { family_name, data });
        Ok(())
    }

    /// Shape `text` on a single line in bold at `size_px`.
    pub(crate) fn layout_line(
        &mut self,
        text: &str,
        size_px: f32,
        brush: TextBrushRgba8,
    ) -> ReelResult<(parley::Layout<TextBrushRgba8>, vello_cpu::peniko::FontData)> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(ReelError::validation("text size must be finite and > 0"));
        }
        self.ensure_font()?;
        let font = self
            .font
            .as_ref()
            .ok_or_else(|| ReelError::render("overlay font not registered"))?;

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(Cow::Owned(font.family_name.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontWeight(
            parley::style::FontWeight::BOLD,
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);
        Ok((layout, font.data.clone()))
    }
}

/// Fill every glyph run of `layout` with either its own brush or `paint_override`.
pub(crate) fn fill_layout(
    ctx: &mut vello_cpu::RenderContext,
    layout: &parley::Layout<TextBrushRgba8>,
    font: &vello_cpu::peniko::FontData,
    paint_override: Option<vello_cpu::peniko::Color>,
) {
    for line in layout.lines() {
        for item in line.items() {
            let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                continue;
            };
            let paint = paint_override.unwrap_or_else(|| {
                let brush = run.style().brush;
                vello_cpu::peniko::Color::from_rgba8(brush.r, brush.g, brush.b, brush.a)
            });
            ctx.set_paint(paint);
            let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                id: g.id,
                x: g.x,
                y: g.y,
            });
            ctx.glyph_run(font)
                .font_size(run.run().font_size())
                .fill_glyphs(glyphs);
        }
    }
}
