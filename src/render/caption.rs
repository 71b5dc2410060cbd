use std::path::Path;
use std::sync::Arc;

use crate::config::{CaptionStyle, HAlign, VAlign};
use crate::effects::catalog::OverlayState;
use crate::foundation::core::Canvas;
use crate::foundation::error::{StillcastError, StillcastResult};

/// Approximate ascent/descent split of the em box, used to place baselines.
const ASCENT: f32 = 0.8;
const LINE_HEIGHT: f32 = 1.2;

/// The title laid out once as an SVG text tree, rasterized per overlay state.
pub struct Caption {
    tree: usvg::Tree,
    canvas: Canvas,
    anchor: (f32, f32),
    has_text: bool,
}

impl std::fmt::Debug for Caption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Caption")
            .field("canvas", &self.canvas)
            .field("anchor", &self.anchor)
            .field("has_text", &self.has_text)
            .finish_non_exhaustive()
    }
}

impl Caption {
    /// Lay out `title` on `canvas` according to `style`.
    pub fn new(title: &str, style: &CaptionStyle, canvas: Canvas) -> StillcastResult<Self> {
        canvas.validate()?;
        let layout = CaptionLayout::compute(title, style, canvas);
        let svg = layout.to_svg(style, canvas);

        let opts = usvg::Options {
            fontdb: build_fontdb(style.font_dir.as_deref()),
            font_resolver: make_font_resolver(),
            font_family: style.font_family.clone(),
            ..Default::default()
        };
        let tree = usvg::Tree::from_str(&svg, &opts)
            .map_err(|e| StillcastError::media(format!("failed to lay out caption: {e}")))?;

        Ok(Self {
            tree,
            canvas,
            anchor: layout.anchor,
            has_text: !layout.lines.is_empty(),
        })
    }

    /// Return `false` for an empty or whitespace-only title.
    pub fn has_text(&self) -> bool {
        self.has_text
    }

    /// Canvas the caption is laid out on.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Point the caption scales about, in canvas pixels.
    pub fn anchor(&self) -> (f32, f32) {
        self.anchor
    }

    /// Rasterize at `state.scale` about the anchor, shifted by `state.offset_y`.
    ///
    /// Opacity is not applied here; it is a compositing parameter. The result is premultiplied
    /// RGBA8 of canvas size.
    pub fn rasterize(&self, state: &OverlayState) -> StillcastResult<Vec<u8>> {
        let mut pixmap = resvg::tiny_skia::Pixmap::new(self.canvas.width, self.canvas.height)
            .ok_or_else(|| StillcastError::media("failed to allocate caption pixmap"))?;
        if !self.has_text || state.scale <= 0.0 {
            return Ok(pixmap.data().to_vec());
        }

        let s = state.scale as f32;
        let (ax, ay) = self.anchor;
        let xform = resvg::tiny_skia::Transform::from_row(
            s,
            0.0,
            0.0,
            s,
            ax * (1.0 - s),
            ay * (1.0 - s) + state.offset_y as f32,
        );
        resvg::render(&self.tree, xform, &mut pixmap.as_mut());
        Ok(pixmap.data().to_vec())
    }
}

/// Line positions for a title on a canvas.
#[derive(Clone, Debug, PartialEq)]
struct CaptionLayout {
    lines: Vec<String>,
    x: f32,
    baselines: Vec<f32>,
    anchor: (f32, f32),
    text_anchor: &'static str,
}

impl CaptionLayout {
    fn compute(title: &str, style: &CaptionStyle, canvas: Canvas) -> Self {
        let lines: Vec<String> = if title.trim().is_empty() {
            Vec::new()
        } else {
            title.lines().map(|l| l.trim().to_string()).collect()
        };

        let w = canvas.width as f32;
        let h = canvas.height as f32;
        let fs = style.font_size;
        let n = lines.len().max(1) as f32;
        let block_h = fs * LINE_HEIGHT * (n - 1.0) + fs;

        let (x, text_anchor) = match style.align {
            HAlign::Left => (style.margin, "start"),
            HAlign::Center => (w / 2.0, "middle"),
            HAlign::Right => (w - style.margin, "end"),
        };
        let top = match style.vertical {
            VAlign::Top => style.margin,
            VAlign::Center => (h - block_h) / 2.0,
            VAlign::Bottom => h - style.margin - block_h,
        };

        let baselines = (0..lines.len())
            .map(|i| top + fs * ASCENT + (i as f32) * fs * LINE_HEIGHT)
            .collect();

        Self {
            lines,
            x,
            baselines,
            anchor: (x, top + block_h / 2.0),
            text_anchor,
        }
    }

    fn to_svg(&self, style: &CaptionStyle, canvas: Canvas) -> String {
        let mut svg = format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = canvas.width,
            h = canvas.height
        );
        if !self.lines.is_empty() {
            svg.push_str(&format!(
                r#"<text font-family="{family}, serif" font-size="{size}" fill="{fill}" text-anchor="{anchor}">"#,
                family = escape_xml(style.font_family.trim()),
                size = style.font_size,
                fill = escape_xml(style.color.trim()),
                anchor = self.text_anchor,
            ));
            for (line, y) in self.lines.iter().zip(&self.baselines) {
                svg.push_str(&format!(
                    r#"<tspan x="{x}" y="{y}">{text}</tspan>"#,
                    x = self.x,
                    text = escape_xml(line),
                ));
            }
            svg.push_str("</text>");
        }
        svg.push_str("</svg>");
        svg
    }
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

fn build_fontdb(font_dir: Option<&Path>) -> Arc<usvg::fontdb::Database> {
    let mut db = usvg::fontdb::Database::new();
    db.load_system_fonts();
    if let Some(dir) = font_dir {
        load_fonts_from_dir(&mut db, dir);
    }
    tracing::debug!(faces = db.len(), "loaded caption fonts");
    Arc::new(db)
}

fn load_fonts_from_dir(db: &mut usvg::fontdb::Database, dir: &Path) {
    let Ok(rd) = std::fs::read_dir(dir) else {
        tracing::warn!(dir = %dir.display(), "caption font directory is not readable");
        return;
    };

    for entry in rd.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
            continue;
        };
        let ext = ext.to_ascii_lowercase();
        if ext != "ttf" && ext != "otf" && ext != "ttc" {
            continue;
        }
        if let Err(e) = db.load_font_file(&path) {
            tracing::warn!(path = %path.display(), error = %e, "skipping unreadable font");
        }
    }
}

/// Requested families, then generic serif and sans-serif, then the first loaded face.
///
/// The caption markup only sets family and size, so stretch and style stay normal.
fn make_font_resolver() -> usvg::FontResolver<'static> {
    use usvg::fontdb::{Family, Query, Stretch, Style, Weight};

    usvg::FontResolver {
        select_font: Box::new(|font, fontdb| {
            let mut families: Vec<Family<'_>> = font.families().iter().map(fontdb_family).collect();
            families.extend([Family::Serif, Family::SansSerif]);
            let query = Query {
                families: &families,
                weight: Weight(font.weight()),
                stretch: Stretch::Normal,
                style: Style::Normal,
            };
            fontdb
                .query(&query)
                .or_else(|| fontdb.faces().next().map(|f| f.id))
        }),
        select_fallback: usvg::FontResolver::default_fallback_selector(),
    }
}

fn fontdb_family(family: &usvg::FontFamily) -> usvg::fontdb::Family<'_> {
    use usvg::fontdb::Family;

    match family {
        usvg::FontFamily::Serif => Family::Serif,
        usvg::FontFamily::SansSerif => Family::SansSerif,
        usvg::FontFamily::Cursive => Family::Cursive,
        usvg::FontFamily::Fantasy => Family::Fantasy,
        usvg::FontFamily::Monospace => Family::Monospace,
        usvg::FontFamily::Named(name) => Family::Name(name),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/caption.rs"]
mod tests;
