//! Render session: card composition over one parsed document
//!
//! A session owns the per-render mutable state (measurement cache, cursor,
//! surface sizing) and drives the strictly two-phase pipeline: estimate the
//! content height, size the surface, then paint chrome, both document
//! sections and the watermark. Paint phases go through an explicit
//! [`RenderQueue`] so a host can interleave its own work via the injected
//! yield hook.
//!
//! No two passes for one document ever run concurrently; a new render
//! simply starts with a fresh cursor (the measurement cache is reused).

use crate::config::MIN_CANVAS_DIMENSION;
use crate::error::{CardResult, SurfaceError, SurfaceResult};
use crate::markdown::parser::{parse, MarkdownNode};
use crate::render::engine::{render_nodes, RenderContext};
use crate::render::estimate::estimate_height;
use crate::render::measure::TextMeasureCache;
use crate::render::queue::RenderQueue;
use crate::render::surface::DrawSurface;
use crate::theme::{BubbleStyle, Theme};

/// Title painted in the page chrome
pub const APP_TITLE: &str = "Markcard";

/// Section labels
pub const QUESTION_LABEL: &str = "Question";
pub const ANSWER_LABEL: &str = "Answer";

/// Watermark text stamped bottom-right when enabled
pub const WATERMARK_TEXT: &str = "Generated with Markcard";

/// Vertical space reserved above the content panel
const TOP_SPACE: f32 = 60.0;

/// Vertical space reserved below the content
const BOTTOM_SPACE: f32 = 60.0;

/// First content baseline inside the panel
const CONTENT_START_Y: f32 = 90.0;

/// Cursor advance after painting a section label
const LABEL_ADVANCE: f32 = 30.0;

/// Gap between the question and answer sections
const SECTION_GAP: f32 = 30.0;

/// Dialog layout: title bar height and first bubble offset
const TITLE_BAR_HEIGHT: f32 = 50.0;
const BUBBLE_START_Y: f32 = 80.0;

/// Dialog layout: outer bubble margin and interior inset
const BUBBLE_MARGIN: f32 = 15.0;
const BUBBLE_INNER_PAD: f32 = 10.0;

/// What the surface sizing collaborator reports at session start
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceInfo {
    /// Available width in logical pixels
    pub width: f32,
    /// Available height in logical pixels
    pub height: f32,
    /// Device pixel density multiplier
    pub pixel_ratio: f32,
}

impl SurfaceInfo {
    fn validate(&self) -> SurfaceResult<()> {
        if self.width < MIN_CANVAS_DIMENSION || self.height < MIN_CANVAS_DIMENSION {
            return Err(SurfaceError::InvalidSize {
                width: self.width,
                height: self.height,
            });
        }
        if self.pixel_ratio <= 0.0 {
            return Err(SurfaceError::InvalidPixelRatio {
                ratio: self.pixel_ratio,
            });
        }
        Ok(())
    }
}

/// A two-part document, parsed once and re-rendered under any theme
#[derive(Debug, Clone, PartialEq)]
pub struct CardDocument {
    pub question: Vec<MarkdownNode>,
    pub answer: Vec<MarkdownNode>,
    /// Stamp the watermark when painting
    pub watermark: bool,
}

impl CardDocument {
    /// Parse both fields into node trees
    pub fn parse_fields(question: &str, answer: &str, watermark: bool) -> Self {
        Self {
            question: parse(question),
            answer: parse(answer),
            watermark,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.question.is_empty() && self.answer.is_empty()
    }
}

/// Summary of one finished render pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderStats {
    /// Height the estimator predicted for the content
    pub estimated_height: f32,
    /// Final surface height after sizing
    pub canvas_height: f32,
    /// Measurement cache entries at end of pass
    pub cache_entries: usize,
}

/// Which document part a queued paint operation covers
#[derive(Debug, Clone, Copy, PartialEq)]
enum Section {
    Question,
    Answer,
}

/// One queued paint phase
#[derive(Debug, Clone, Copy)]
enum PaintOp {
    Chrome,
    Section(Section),
    Watermark,
}

/// Which side a bubble tail points to
#[derive(Debug, Clone, Copy)]
enum BubbleDirection {
    Left,
    Right,
}

/// One estimate-then-paint pass over one document under one theme
pub struct RenderSession<'a> {
    surface: &'a mut dyn DrawSurface,
    info: SurfaceInfo,
    theme: Theme,
    cache: TextMeasureCache,
    yield_hook: Option<Box<dyn FnMut() + 'a>>,
    cursor_y: f32,
}

impl<'a> RenderSession<'a> {
    /// Start a session over an acquired surface. The device pixel ratio is
    /// applied to the coordinate space exactly once, here.
    pub fn new(
        surface: &'a mut dyn DrawSurface,
        info: SurfaceInfo,
        theme: Theme,
    ) -> SurfaceResult<Self> {
        info.validate()?;
        surface.scale(info.pixel_ratio, info.pixel_ratio);
        log::debug!(
            "render session: {}x{} @{}x, theme '{}'",
            info.width,
            info.height,
            info.pixel_ratio,
            theme.name
        );
        Ok(Self {
            surface,
            info,
            theme,
            cache: TextMeasureCache::new(),
            yield_hook: None,
            cursor_y: 0.0,
        })
    }

    /// Install a host callback invoked between queued paint phases
    pub fn with_yield_hook(mut self, hook: impl FnMut() + 'a) -> Self {
        self.yield_hook = Some(Box::new(hook));
        self
    }

    /// Discard cached measurements (call between unrelated documents)
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Phase one: predict the total content height for surface sizing.
    pub fn estimate_document_height(&mut self, doc: &CardDocument) -> f32 {
        let total = match self.theme.bubble.clone() {
            Some(bubble) => self.estimate_dialog_height(doc, &bubble),
            None => self.estimate_panel_height(doc),
        };
        total.max(self.info.height)
    }

    fn estimate_panel_height(&mut self, doc: &CardDocument) -> f32 {
        let content_x = self.theme.chrome.padding + self.theme.content_inset;
        let max_width =
            self.info.width - 2.0 * self.theme.chrome.padding - 2.0 * self.theme.content_inset;

        let mut total = TOP_SPACE;
        total += LABEL_ADVANCE;
        total = estimate_height(
            &mut self.cache,
            &mut *self.surface,
            &doc.question,
            content_x,
            total,
            max_width,
            &self.theme,
        );
        total += LABEL_ADVANCE;
        total = estimate_height(
            &mut self.cache,
            &mut *self.surface,
            &doc.answer,
            content_x,
            total,
            max_width,
            &self.theme,
        );
        total + BOTTOM_SPACE
    }

    fn estimate_dialog_height(&mut self, doc: &CardDocument, bubble: &BubbleStyle) -> f32 {
        let mut total = BUBBLE_START_Y;
        total += self.bubble_height(&doc.question, bubble);
        total += SECTION_GAP;
        total += self.bubble_height(&doc.answer, bubble);
        total + BOTTOM_SPACE
    }

    /// Bubble height for one section: content estimate plus interior pad
    fn bubble_height(&mut self, nodes: &[MarkdownNode], bubble: &BubbleStyle) -> f32 {
        let inner_width = self.info.width * bubble.width_ratio - 2.0 * BUBBLE_INNER_PAD;
        let content = estimate_height(
            &mut self.cache,
            &mut *self.surface,
            nodes,
            0.0,
            0.0,
            inner_width,
            &self.theme,
        );
        content + self.theme.text.line_height + BUBBLE_INNER_PAD
    }

    /// Phase two (entry point): estimate, size the surface, then paint
    /// every phase through the render queue.
    pub fn render(&mut self, doc: &CardDocument) -> CardResult<RenderStats> {
        let estimated = self.estimate_document_height(doc);

        if estimated > self.info.height {
            log::debug!(
                "growing surface from {} to {} logical px",
                self.info.height,
                estimated
            );
            self.surface.resize(
                self.info.width * self.info.pixel_ratio,
                estimated * self.info.pixel_ratio,
            );
            self.surface.scale(self.info.pixel_ratio, self.info.pixel_ratio);
            self.info.height = estimated;
        }

        self.surface
            .clear_rect(0.0, 0.0, self.info.width, self.info.height);

        let mut queue = RenderQueue::new();
        queue.push(2, PaintOp::Chrome);
        queue.push(1, PaintOp::Section(Section::Question));
        queue.push(1, PaintOp::Section(Section::Answer));
        queue.push(0, PaintOp::Watermark);

        let mut hook = self.yield_hook.take();
        queue.drain(
            || {
                if let Some(hook) = hook.as_mut() {
                    hook();
                }
            },
            |op| self.paint_op(op, doc),
        );
        self.yield_hook = hook;

        Ok(RenderStats {
            estimated_height: estimated,
            canvas_height: self.info.height,
            cache_entries: self.cache.len(),
        })
    }

    fn paint_op(&mut self, op: PaintOp, doc: &CardDocument) -> CardResult<()> {
        match op {
            PaintOp::Chrome => self.paint_chrome(),
            PaintOp::Section(section) => self.paint_section(section, doc),
            PaintOp::Watermark => self.paint_watermark(doc),
        }
        Ok(())
    }

    fn paint_chrome(&mut self) {
        let chrome = self.theme.chrome.clone();

        self.surface.set_fill_style(chrome.background);
        self.surface
            .fill_rect(0.0, 0.0, self.info.width, self.info.height);

        match self.theme.bubble.clone() {
            Some(bubble) => {
                self.surface.set_fill_style(bubble.title_bar);
                self.surface
                    .fill_rect(0.0, 0.0, self.info.width, TITLE_BAR_HEIGHT);

                self.surface.set_fill_style(chrome.title_color);
                self.surface.set_font(&chrome.title_font);
                self.surface
                    .fill_text(APP_TITLE, self.info.width / 2.0 - 30.0, 30.0);

                self.cursor_y = BUBBLE_START_Y;
            }
            None => {
                let panel_width = self.info.width - 2.0 * chrome.padding;
                self.surface.set_fill_style(chrome.content_background);
                self.surface.fill_rect(
                    chrome.padding,
                    TOP_SPACE,
                    panel_width,
                    self.info.height - TOP_SPACE - BOTTOM_SPACE,
                );

                self.surface.set_fill_style(chrome.title_color);
                self.surface.set_font(&chrome.title_font);
                self.surface.fill_text(APP_TITLE, 20.0, 40.0);

                self.cursor_y = CONTENT_START_Y;
            }
        }
    }

    fn paint_section(&mut self, section: Section, doc: &CardDocument) {
        let nodes = match section {
            Section::Question => &doc.question,
            Section::Answer => &doc.answer,
        };
        match self.theme.bubble.clone() {
            Some(bubble) => self.paint_bubble_section(section, nodes, &bubble),
            None => self.paint_panel_section(section, nodes),
        }
    }

    fn paint_panel_section(&mut self, section: Section, nodes: &[MarkdownNode]) {
        let label = match section {
            Section::Question => QUESTION_LABEL,
            Section::Answer => ANSWER_LABEL,
        };
        let label_style = self.theme.section_label.clone();
        let content_x = self.theme.chrome.padding + self.theme.content_inset;
        let max_width =
            self.info.width - 2.0 * self.theme.chrome.padding - 2.0 * self.theme.content_inset;

        self.surface.set_fill_style(label_style.color);
        self.surface.set_font(&label_style.font);
        self.surface.fill_text(label, content_x, self.cursor_y);

        if self.theme.label_rule {
            // short printed rule under the label, book-style
            self.surface.set_stroke_style(label_style.color);
            self.surface.set_line_width(1.0);
            self.surface.begin_path();
            self.surface.move_to(content_x, self.cursor_y + 5.0);
            self.surface.line_to(content_x + 50.0, self.cursor_y + 5.0);
            self.surface.stroke();
        }

        self.cursor_y += LABEL_ADVANCE;

        let mut ctx = RenderContext {
            surface: &mut *self.surface,
            cache: &mut self.cache,
            theme: &self.theme,
            x: content_x,
            y: self.cursor_y,
            max_width,
        };
        let end_y = render_nodes(&mut ctx, nodes);

        self.cursor_y = end_y;
        if section == Section::Question {
            self.cursor_y += SECTION_GAP;
        }
    }

    fn paint_bubble_section(
        &mut self,
        section: Section,
        nodes: &[MarkdownNode],
        bubble: &BubbleStyle,
    ) {
        let bubble_width = self.info.width * bubble.width_ratio;
        let height = self.bubble_height(nodes, bubble);

        let (bubble_x, direction, color) = match section {
            Section::Question => (BUBBLE_MARGIN, BubbleDirection::Left, bubble.incoming),
            Section::Answer => (
                self.info.width - BUBBLE_MARGIN - bubble_width,
                BubbleDirection::Right,
                bubble.outgoing,
            ),
        };

        self.surface.set_fill_style(color);
        draw_bubble(
            &mut *self.surface,
            bubble_x,
            self.cursor_y,
            bubble_width,
            height,
            bubble.radius,
            direction,
        );

        // first content baseline sits one body line below the bubble top
        let content_y = self.cursor_y + self.theme.text.line_height;
        let mut ctx = RenderContext {
            surface: &mut *self.surface,
            cache: &mut self.cache,
            theme: &self.theme,
            x: bubble_x + BUBBLE_INNER_PAD,
            y: content_y,
            max_width: bubble_width - 2.0 * BUBBLE_INNER_PAD,
        };
        render_nodes(&mut ctx, nodes);

        self.cursor_y += height + SECTION_GAP;
    }

    fn paint_watermark(&mut self, doc: &CardDocument) {
        if !doc.watermark {
            return;
        }
        let chrome = &self.theme.chrome;
        self.surface.set_fill_style(chrome.watermark_color);
        self.surface.set_font(&chrome.watermark_font);
        self.surface.fill_text(
            WATERMARK_TEXT,
            self.info.width - 150.0,
            self.info.height - 30.0,
        );
    }
}

/// Trace one rounded speech bubble with a tail and fill it with the
/// surface's current fill style.
fn draw_bubble(
    surface: &mut dyn DrawSurface,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    radius: f32,
    direction: BubbleDirection,
) {
    surface.begin_path();
    surface.move_to(x + radius, y);
    surface.line_to(x + width - radius, y);
    surface.quadratic_curve_to(x + width, y, x + width, y + radius);
    surface.line_to(x + width, y + height - radius);
    surface.quadratic_curve_to(x + width, y + height, x + width - radius, y + height);
    surface.line_to(x + radius, y + height);
    surface.quadratic_curve_to(x, y + height, x, y + height - radius);
    surface.line_to(x, y + radius);
    surface.quadratic_curve_to(x, y, x + radius, y);

    match direction {
        BubbleDirection::Left => {
            surface.move_to(x, y + 20.0);
            surface.line_to(x - 10.0, y + 30.0);
            surface.line_to(x, y + 40.0);
        }
        BubbleDirection::Right => {
            surface.move_to(x + width, y + 20.0);
            surface.line_to(x + width + 10.0, y + 30.0);
            surface.line_to(x + width, y + 40.0);
        }
    }

    surface.close_path();
    surface.fill();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::surface::{DrawCommand, RecordingSurface};
    use crate::theme::ThemeRegistry;

    fn info() -> SurfaceInfo {
        SurfaceInfo {
            width: 375.0,
            height: 470.0,
            pixel_ratio: 2.0,
        }
    }

    fn document() -> CardDocument {
        CardDocument::parse_fields(
            "# What is wrapping?\n\nGreedy, per code point.",
            "It emits **lines** until the text runs out.\n\n- cheap\n- predictable",
            false,
        )
    }

    #[test]
    fn test_invalid_surface_size_rejected() {
        let mut surface = RecordingSurface::new(0.0, 0.0);
        let bad = SurfaceInfo {
            width: 0.0,
            height: 470.0,
            pixel_ratio: 2.0,
        };
        let err = RenderSession::new(&mut surface, bad, Theme::default_card()).err();
        assert!(matches!(err, Some(SurfaceError::InvalidSize { .. })));
    }

    #[test]
    fn test_pixel_ratio_applied_once_at_start() {
        let mut surface = RecordingSurface::new(750.0, 940.0);
        let session = RenderSession::new(&mut surface, info(), Theme::default_card()).unwrap();
        drop(session);
        assert_eq!(
            surface.commands(),
            &[DrawCommand::Scale { x: 2.0, y: 2.0 }]
        );
    }

    #[test]
    fn test_render_paints_labels_between_sections() {
        let mut surface = RecordingSurface::new(750.0, 940.0);
        let doc = document();
        let mut session =
            RenderSession::new(&mut surface, info(), Theme::default_card()).unwrap();
        session.render(&doc).unwrap();
        drop(session);

        let texts = surface.painted_texts();
        let question_label = texts.iter().position(|t| *t == QUESTION_LABEL).unwrap();
        let answer_label = texts.iter().position(|t| *t == ANSWER_LABEL).unwrap();
        let question_body = texts
            .iter()
            .position(|t| t.contains("Greedy"))
            .expect("question painted");
        let answer_body = texts
            .iter()
            .position(|t| t.contains("lines"))
            .expect("answer painted");

        assert!(question_label < question_body);
        assert!(question_body < answer_label);
        assert!(answer_label < answer_body);
    }

    #[test]
    fn test_surface_grows_to_estimate() {
        let mut surface = RecordingSurface::new(750.0, 200.0);
        let small = SurfaceInfo {
            width: 375.0,
            height: 100.0,
            pixel_ratio: 2.0,
        };
        let doc = document();
        let mut session =
            RenderSession::new(&mut surface, small, Theme::default_card()).unwrap();
        let stats = session.render(&doc).unwrap();
        drop(session);

        assert!(stats.canvas_height > 100.0);
        assert_eq!(stats.canvas_height, stats.estimated_height);
        assert!(surface
            .commands()
            .iter()
            .any(|c| matches!(c, DrawCommand::Resize { .. })));
    }

    #[test]
    fn test_watermark_painted_only_when_enabled() {
        for watermark in [false, true] {
            let mut surface = RecordingSurface::new(750.0, 940.0);
            let mut doc = document();
            doc.watermark = watermark;
            let mut session =
                RenderSession::new(&mut surface, info(), Theme::default_card()).unwrap();
            session.render(&doc).unwrap();
            drop(session);

            let stamped = surface.painted_texts().contains(&WATERMARK_TEXT);
            assert_eq!(stamped, watermark);
        }
    }

    #[test]
    fn test_dialog_theme_draws_two_bubbles() {
        let mut surface = RecordingSurface::new(750.0, 940.0);
        let doc = document();
        let mut session = RenderSession::new(&mut surface, info(), Theme::dialog()).unwrap();
        session.render(&doc).unwrap();
        drop(session);

        let fills = surface
            .commands()
            .iter()
            .filter(|c| matches!(c, DrawCommand::Fill { .. }))
            .count();
        assert_eq!(fills, 2);

        let curves = surface
            .commands()
            .iter()
            .filter(|c| matches!(c, DrawCommand::QuadraticCurveTo { .. }))
            .count();
        assert_eq!(curves, 8);
    }

    #[test]
    fn test_same_document_renders_under_every_theme() {
        let doc = document();
        for theme in ThemeRegistry::builtin().themes() {
            let mut surface = RecordingSurface::new(750.0, 940.0);
            let mut session =
                RenderSession::new(&mut surface, info(), theme.clone()).unwrap();
            let stats = session.render(&doc).unwrap();
            drop(session);
            assert!(stats.canvas_height >= 470.0);
            assert!(!surface.painted_texts().is_empty());
        }
    }

    #[test]
    fn test_yield_hook_called_between_phases() {
        let mut surface = RecordingSurface::new(750.0, 940.0);
        let doc = document();
        let mut yields = 0usize;
        {
            let mut session = RenderSession::new(&mut surface, info(), Theme::default_card())
                .unwrap()
                .with_yield_hook(|| yields += 1);
            session.render(&doc).unwrap();
        }
        // four queued phases, a yield between each consecutive pair
        assert_eq!(yields, 3);
    }
}
