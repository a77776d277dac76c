//! Title typography: the embedded display face, line measurement and
//! glyph coverage.

use std::sync::OnceLock;

use fontdue::{Font, FontSettings};
use log::error;

use crate::rendering::layout::Point;

static FACE_DATA: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans-Bold.ttf");
static FACE: OnceLock<Option<Font>> = OnceLock::new();

/// The bold face used for display text. `None` only if the embedded font
/// fails to parse.
pub fn title_face() -> Option<&'static Font> {
    FACE.get_or_init(|| {
        let settings = FontSettings {
            scale: 120.0,
            ..FontSettings::default()
        };
        Font::from_bytes(FACE_DATA, settings)
            .map_err(|e| error!("Failed to load the embedded title font: {}", e))
            .ok()
    })
    .as_ref()
}

/// A character and its pen position along the line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedGlyph {
    pub ch: char,
    pub pen_x: f32,
}

/// Kerned pen positions for `text`, plus the advance of the whole line
pub fn layout_line(font: &Font, text: &str, size_px: f32) -> (Vec<PlacedGlyph>, f32) {
    let mut pen = 0.0;
    let mut prev = None;
    let mut glyphs = Vec::with_capacity(text.len());
    for ch in text.chars() {
        if let Some(left) = prev {
            pen += font.horizontal_kern(left, ch, size_px).unwrap_or(0.0);
        }
        glyphs.push(PlacedGlyph { ch, pen_x: pen });
        pen += font.metrics(ch, size_px).advance_width;
        prev = Some(ch);
    }
    (glyphs, pen)
}

/// Advance width of a single line at `size_px`
pub fn measure(text: &str, size_px: f32) -> f32 {
    match title_face() {
        Some(font) if size_px > 0.0 => layout_line(font, text, size_px).1,
        _ => 0.0,
    }
}

/// Distance from the top of the line box to the baseline
pub fn ascent(font: &Font, size_px: f32) -> f32 {
    font.horizontal_line_metrics(size_px)
        .map(|m| m.ascent)
        .unwrap_or(size_px * 0.8)
}

/// Rasterize one line with its box's top-left at `origin`, reporting
/// each covered pixel as (x, y, coverage).
pub fn rasterize_line(text: &str, origin: Point, size_px: f32, mut plot: impl FnMut(i32, i32, u8)) {
    let Some(font) = title_face() else {
        return;
    };
    if size_px <= 0.0 {
        return;
    }
    let baseline = (origin.y + ascent(font, size_px)).round() as i32;
    let (glyphs, _) = layout_line(font, text, size_px);
    for glyph in glyphs {
        let (metrics, bitmap) = font.rasterize(glyph.ch, size_px);
        if metrics.width == 0 {
            continue;
        }
        let left = (origin.x + glyph.pen_x).round() as i32 + metrics.xmin;
        let top = baseline - metrics.height as i32 - metrics.ymin;
        for (i, &coverage) in bitmap.iter().enumerate() {
            if coverage > 0 {
                plot(
                    left + (i % metrics.width) as i32,
                    top + (i / metrics.width) as i32,
                    coverage,
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_face_loads() {
        assert!(title_face().is_some());
    }

    #[test]
    fn accented_capitals_have_their_own_glyphs() {
        let font = title_face().unwrap();
        let (_, question) = font.rasterize('?', 48.0);
        for ch in ['É', 'Ü', 'Ñ', 'Ø'] {
            assert_ne!(font.lookup_glyph_index(ch), 0, "{}", ch);
            let (_, bitmap) = font.rasterize(ch, 48.0);
            assert_ne!(bitmap, question, "{}", ch);
        }
    }

    #[test]
    fn measure_grows_with_text_and_size() {
        let one = measure("LOCAL", 80.0);
        assert!(one > 0.0);
        assert!(measure("LOCAL MAG", 80.0) > one);
        assert!((measure("LOCAL", 160.0) - 2.0 * one).abs() < 2.0);
        assert_eq!(measure("", 80.0), 0.0);
        assert_eq!(measure("LOCAL", 0.0), 0.0);
    }

    #[test]
    fn rasterized_line_stays_near_its_box() {
        let mut lit = Vec::new();
        rasterize_line("HI", Point::new(10.0, 20.0), 40.0, |x, y, _| lit.push((x, y)));
        assert!(!lit.is_empty());
        let width = measure("HI", 40.0);
        for (x, y) in lit {
            assert!(x >= 10 && (x as f32) <= 10.0 + width + 1.0);
            assert!(y >= 20 && y <= 20 + 50);
        }
    }
}
