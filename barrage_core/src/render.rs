// Copyright 2026 the Barrage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Memoized entity images and the per-tick render set.
//!
//! Each active slot is rasterized at most once per activation: the first
//! request builds the glyph outline, strokes it for the outline, fills both
//! into a [`Drawable`], and stores it on the slot. Later requests return the
//! same [`Arc`]. Position and opacity are not baked in; the renderer applies
//! them when painting a [`RenderItem`].

use std::sync::Arc;

use kurbo::{Affine, Cap, Join, Point, Stroke, StrokeOpts};

use crate::entry::Rgb8;
use crate::glyph::GlyphSource;
use crate::pool::{EntityPool, SlotId};
use crate::raster::Drawable;

/// Path tolerance for stroking, in pixels.
const STROKE_TOLERANCE: f64 = 0.1;

/// Outline appearance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderStyle {
    /// Outline margin in pixels; the stroke itself is twice as wide and
    /// centered on the glyph edges. Zero disables the outline.
    pub stroke_width: f64,
    /// Outline color.
    pub outline: Rgb8,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            stroke_width: 2.0,
            outline: Rgb8::BLACK,
        }
    }
}

/// One entity to paint this tick.
#[derive(Clone, Debug)]
pub struct RenderItem {
    /// The entity's slot.
    pub slot: SlotId,
    /// Cached image.
    pub drawable: Arc<Drawable>,
    /// Viewport position of the image's top-left corner.
    pub origin: Point,
    /// Opacity to paint with.
    pub opacity: f32,
}

/// Rasterizes entities on demand and caches the result on their slots.
#[derive(Debug)]
pub struct RenderCache<G> {
    glyphs: G,
    style: RenderStyle,
}

impl<G: GlyphSource> RenderCache<G> {
    /// Creates a cache drawing with `glyphs`.
    #[must_use]
    pub fn new(glyphs: G, style: RenderStyle) -> Self {
        Self { glyphs, style }
    }

    /// The glyph source.
    #[must_use]
    pub fn glyphs(&self) -> &G {
        &self.glyphs
    }

    /// The current style.
    #[must_use]
    pub fn style(&self) -> RenderStyle {
        self.style
    }

    /// Replaces the style. Images already cached keep the old style until
    /// their slots are reactivated.
    pub fn set_style(&mut self, style: RenderStyle) {
        self.style = style;
    }

    /// Returns the image for an active slot, rasterizing it on first use.
    ///
    /// Returns `None` if `id` is stale or free.
    pub fn drawable(&self, pool: &mut EntityPool, id: SlotId) -> Option<Arc<Drawable>> {
        if let Some(cached) = pool.cached_drawable(id) {
            return Some(Arc::clone(cached));
        }
        let text = pool.text(id)?;
        let color = pool.color(id)?;
        let drawable = Arc::new(self.rasterize(text, color)?);
        pool.store_drawable(id, Arc::clone(&drawable));
        Some(drawable)
    }

    /// Rasterizes `text` with an outline into a fresh image.
    ///
    /// The image covers the measured text box plus `stroke_width` on every
    /// side. The baseline sits at `ascent + stroke_width` from the top.
    /// Returns `None` if the image would be too large to allocate.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "image extents are clamped to u32 before narrowing"
    )]
    pub fn rasterize(&self, text: &str, color: Rgb8) -> Option<Drawable> {
        let margin = self.style.stroke_width;
        let size = self.glyphs.measure(text);
        let extent = |len: f64| (len + 2.0 * margin).ceil().clamp(1.0, f64::from(u32::MAX)) as u32;
        let mut image = Drawable::new(extent(size.width), extent(size.height))?;

        let outline = Affine::translate((margin, self.glyphs.ascent() + margin))
            * self.glyphs.outline(text);
        if margin > 0.0 {
            let stroke = Stroke::new(2.0 * margin)
                .with_caps(Cap::Round)
                .with_join(Join::Round);
            let contour = kurbo::stroke(
                outline.iter(),
                &stroke,
                &StrokeOpts::default(),
                STROKE_TOLERANCE,
            );
            image.fill_path(&contour, self.style.outline);
        }
        image.fill_path(&outline, color);
        Some(image)
    }

    /// Returns the active entities in paint order with their images and
    /// top-left origins.
    pub fn render_set(&self, pool: &mut EntityPool, opacity: f32) -> Vec<RenderItem> {
        let margin = self.style.stroke_width;
        let ascent = self.glyphs.ascent();
        let ids: Vec<SlotId> = pool.active().collect();
        let mut items = Vec::with_capacity(ids.len());
        for slot in ids {
            let (Some(position), Some(drawable)) = (pool.position(slot), self.drawable(pool, slot))
            else {
                continue;
            };
            items.push(RenderItem {
                slot,
                drawable,
                origin: Point::new(position.x - margin, position.y - margin - ascent),
                opacity,
            });
        }
        items
    }
}
