//! Text measurement cache
//!
//! Measuring text against the surface is the dominant cost of layout, so
//! widths are memoized by `(text, font descriptor)`. The cache is owned by
//! one render session and passed explicitly; it is never global state.
//!
//! Because the surface's active font is process-wide mutable state shared
//! with the painter, a cache miss sets the font, measures, and restores the
//! previous font before returning. Restoration here is a correctness
//! requirement, not a courtesy.

use crate::render::surface::DrawSurface;
use crate::theme::FontSpec;
use std::collections::HashMap;

/// Memoized `(text, font) -> width` lookups against a drawing surface
#[derive(Debug, Default)]
pub struct TextMeasureCache {
    widths: HashMap<(String, String), f32>,
}

impl TextMeasureCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Measure the width of `text` at `font`, consulting the cache first.
    ///
    /// The surface's active font is left exactly as it was before the call.
    pub fn measure(&mut self, surface: &mut dyn DrawSurface, text: &str, font: &FontSpec) -> f32 {
        let key = (text.to_string(), font.descriptor());
        if let Some(width) = self.widths.get(&key) {
            return *width;
        }

        let previous = surface.font();
        surface.set_font(font);
        let metrics = surface.measure_text(text);
        surface.set_font(&previous);

        self.widths.insert(key, metrics.width);
        metrics.width
    }

    /// Number of cached measurements
    pub fn len(&self) -> usize {
        self.widths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widths.is_empty()
    }

    /// Discard all cached measurements. Call between independent documents
    /// when reusing one cache across many renders.
    pub fn clear(&mut self) {
        self.widths.clear();
    }
}
