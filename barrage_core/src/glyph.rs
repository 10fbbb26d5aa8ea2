// Copyright 2026 the Barrage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Text measurement and outlines.
//!
//! The engine does not shape text itself. A [`GlyphSource`] supplies font
//! metrics, advance widths, and glyph outlines as [`BezPath`]s. Outlines are
//! laid out on a baseline at `y = 0` starting at `x = 0`, with ascenders at
//! negative `y`.

use kurbo::{BezPath, Rect, Shape, Size};

/// Font metrics and outlines for the overlay font.
pub trait GlyphSource {
    /// Distance between consecutive baselines, in pixels.
    fn line_height(&self) -> f64;

    /// Distance from the top of the line box to the baseline, in pixels.
    fn ascent(&self) -> f64;

    /// Returns the advance width and line height of `text`.
    fn measure(&self, text: &str) -> Size;

    /// Returns the filled outline of `text` on a baseline at the origin.
    fn outline(&self, text: &str) -> BezPath;
}

impl<G: GlyphSource + ?Sized> GlyphSource for &G {
    fn line_height(&self) -> f64 {
        (**self).line_height()
    }

    fn ascent(&self) -> f64 {
        (**self).ascent()
    }

    fn measure(&self, text: &str) -> Size {
        (**self).measure(text)
    }

    fn outline(&self, text: &str) -> BezPath {
        (**self).outline(text)
    }
}

/// A deterministic stand-in font that draws one box per character.
///
/// ASCII characters advance by half the font size; everything else is
/// treated as full width. Whitespace advances without drawing. Useful for
/// headless runs and tests where real font data is unavailable.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BlockGlyphs {
    font_size: f64,
}

impl BlockGlyphs {
    /// Creates block glyphs for a pixel font size.
    #[must_use]
    pub const fn new(font_size: f64) -> Self {
        Self { font_size }
    }

    /// The pixel font size.
    #[must_use]
    pub const fn font_size(&self) -> f64 {
        self.font_size
    }

    fn advance(&self, c: char) -> f64 {
        if c.is_ascii() {
            self.font_size * 0.5
        } else {
            self.font_size
        }
    }

    fn descent(&self) -> f64 {
        self.font_size * 0.2
    }
}

impl Default for BlockGlyphs {
    fn default() -> Self {
        Self::new(24.0)
    }
}

impl GlyphSource for BlockGlyphs {
    fn line_height(&self) -> f64 {
        self.font_size
    }

    fn ascent(&self) -> f64 {
        self.font_size * 0.8
    }

    fn measure(&self, text: &str) -> Size {
        let width = text.chars().map(|c| self.advance(c)).sum();
        Size::new(width, self.line_height())
    }

    fn outline(&self, text: &str) -> BezPath {
        let mut path = BezPath::new();
        let top = -self.ascent() * 0.9;
        let bottom = self.descent() * 0.5;
        let mut x = 0.0;
        for c in text.chars() {
            let advance = self.advance(c);
            if !c.is_whitespace() {
                let inset = advance * 0.1;
                let cell = Rect::new(x + inset, top, x + advance - inset, bottom);
                path.extend(cell.path_elements(0.1));
            }
            x += advance;
        }
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn measure_counts_wide_characters() {
        let glyphs = BlockGlyphs::new(20.0);
        assert_eq!(glyphs.measure("ab").width, 20.0);
        assert_eq!(glyphs.measure("弹幕").width, 40.0);
        assert_eq!(glyphs.measure("").width, 0.0);
        assert_eq!(glyphs.measure("x").height, 20.0);
    }

    #[test]
    fn outline_sits_on_baseline_within_advance() {
        let glyphs = BlockGlyphs::new(20.0);
        let bounds = glyphs.outline("hi there").bounding_box();
        assert!(bounds.y0 < 0.0 && bounds.y0 >= -glyphs.ascent());
        assert!(bounds.y1 > 0.0);
        assert!(bounds.x0 >= 0.0);
        assert!(bounds.x1 <= glyphs.measure("hi there").width);
    }

    #[test]
    fn whitespace_draws_nothing() {
        let glyphs = BlockGlyphs::default();
        assert!(glyphs.outline("   ").elements().is_empty());
    }
}
