//! Drawing surface abstraction
//!
//! The render engine only ever consumes the primitive set defined by
//! [`DrawSurface`]: text measurement, filled text/rects, path strokes and
//! fills, clearing, scaling, and mutable font/fill/stroke state. A host
//! embeds the engine by implementing this trait over its 2D canvas.
//!
//! [`RecordingSurface`] is the in-tree implementation: deterministic
//! per-code-point metrics plus a serializable log of draw commands. It
//! backs the test suite, the height estimator's scratch context, and the
//! CLI's draw-command dump.

use crate::theme::{Color, FontSpec};
use serde::Serialize;

/// Result of measuring a piece of text at the surface's current font
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextMetrics {
    pub width: f32,
}

/// The 2D drawing primitives the engine paints with.
///
/// The font/fill/stroke setters mutate surface-wide state; paint routines
/// therefore always re-set what they need immediately before drawing and
/// never rely on state surviving a call boundary.
pub trait DrawSurface {
    /// Measure text at the current font. Empty text measures zero.
    fn measure_text(&mut self, text: &str) -> TextMetrics;

    fn fill_text(&mut self, text: &str, x: f32, y: f32);
    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32);
    fn clear_rect(&mut self, x: f32, y: f32, width: f32, height: f32);

    fn begin_path(&mut self);
    fn move_to(&mut self, x: f32, y: f32);
    fn line_to(&mut self, x: f32, y: f32);
    fn quadratic_curve_to(&mut self, cpx: f32, cpy: f32, x: f32, y: f32);
    fn close_path(&mut self);
    fn fill(&mut self);
    fn stroke(&mut self);

    /// Scale the coordinate space (applied once per session for the
    /// device pixel ratio).
    fn scale(&mut self, x: f32, y: f32);

    /// Resize the backing store. Existing content is discarded.
    fn resize(&mut self, width: f32, height: f32);

    /// Current font state
    fn font(&self) -> FontSpec;
    fn set_font(&mut self, font: &FontSpec);

    fn set_fill_style(&mut self, color: Color);
    fn set_stroke_style(&mut self, color: Color);
    fn set_line_width(&mut self, width: f32);
}

/// One recorded drawing operation, in execution order
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCommand {
    FillText {
        text: String,
        x: f32,
        y: f32,
        font: String,
        color: String,
    },
    FillRect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: String,
    },
    ClearRect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
    BeginPath,
    MoveTo {
        x: f32,
        y: f32,
    },
    LineTo {
        x: f32,
        y: f32,
    },
    QuadraticCurveTo {
        cpx: f32,
        cpy: f32,
        x: f32,
        y: f32,
    },
    ClosePath,
    Fill {
        color: String,
    },
    Stroke {
        color: String,
        line_width: f32,
    },
    Scale {
        x: f32,
        y: f32,
    },
    Resize {
        width: f32,
        height: f32,
    },
}

/// A surface that records commands instead of rasterizing.
///
/// Measurement model: every ASCII code point advances 0.6x the font size,
/// every other code point a full font size. Deterministic and monotone in
/// appended characters, which is all the wrapping engine requires.
#[derive(Debug)]
pub struct RecordingSurface {
    width: f32,
    height: f32,
    font: FontSpec,
    fill_style: Color,
    stroke_style: Color,
    line_width: f32,
    commands: Vec<DrawCommand>,
}

/// Advance factor for ASCII code points, as a fraction of font size
const ASCII_ADVANCE: f32 = 0.6;

impl RecordingSurface {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            font: FontSpec::default(),
            fill_style: Color::rgb(0, 0, 0),
            stroke_style: Color::rgb(0, 0, 0),
            line_width: 1.0,
            commands: Vec::new(),
        }
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    /// Recorded commands, in execution order
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Drop all recorded commands, keeping state
    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }

    /// Recorded `FillText` texts, in paint order (test convenience)
    pub fn painted_texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::FillText { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl DrawSurface for RecordingSurface {
    fn measure_text(&mut self, text: &str) -> TextMetrics {
        let size = self.font.size;
        let width = text
            .chars()
            .map(|c| {
                if c.is_ascii() {
                    size * ASCII_ADVANCE
                } else {
                    size
                }
            })
            .sum();
        TextMetrics { width }
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32) {
        self.commands.push(DrawCommand::FillText {
            text: text.to_string(),
            x,
            y,
            font: self.font.descriptor(),
            color: self.fill_style.to_css(),
        });
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.commands.push(DrawCommand::FillRect {
            x,
            y,
            width,
            height,
            color: self.fill_style.to_css(),
        });
    }

    fn clear_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.commands.push(DrawCommand::ClearRect {
            x,
            y,
            width,
            height,
        });
    }

    fn begin_path(&mut self) {
        self.commands.push(DrawCommand::BeginPath);
    }

    fn move_to(&mut self, x: f32, y: f32) {
        self.commands.push(DrawCommand::MoveTo { x, y });
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.commands.push(DrawCommand::LineTo { x, y });
    }

    fn quadratic_curve_to(&mut self, cpx: f32, cpy: f32, x: f32, y: f32) {
        self.commands
            .push(DrawCommand::QuadraticCurveTo { cpx, cpy, x, y });
    }

    fn close_path(&mut self) {
        self.commands.push(DrawCommand::ClosePath);
    }

    fn fill(&mut self) {
        self.commands.push(DrawCommand::Fill {
            color: self.fill_style.to_css(),
        });
    }

    fn stroke(&mut self) {
        self.commands.push(DrawCommand::Stroke {
            color: self.stroke_style.to_css(),
            line_width: self.line_width,
        });
    }

    fn scale(&mut self, x: f32, y: f32) {
        self.commands.push(DrawCommand::Scale { x, y });
    }

    fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
        self.commands.push(DrawCommand::Resize { width, height });
    }

    fn font(&self) -> FontSpec {
        self.font
    }

    fn set_font(&mut self, font: &FontSpec) {
        self.font = *font;
    }

    fn set_fill_style(&mut self, color: Color) {
        self.fill_style = color;
    }

    fn set_stroke_style(&mut self, color: Color) {
        self.stroke_style = color;
    }

    fn set_line_width(&mut self, width: f32) {
        self.line_width = width;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measure_empty_is_zero() {
        let mut surface = RecordingSurface::new(300.0, 200.0);
        assert_eq!(surface.measure_text("").width, 0.0);
    }

    #[test]
    fn test_measure_scales_with_font_size() {
        let mut surface = RecordingSurface::new(300.0, 200.0);
        surface.set_font(&FontSpec::sans(10.0));
        let small = surface.measure_text("abc").width;
        surface.set_font(&FontSpec::sans(20.0));
        let large = surface.measure_text("abc").width;
        assert_eq!(small, 18.0);
        assert_eq!(large, 36.0);
    }

    #[test]
    fn test_measure_wide_code_points() {
        let mut surface = RecordingSurface::new(300.0, 200.0);
        surface.set_font(&FontSpec::sans(10.0));
        // non-ASCII advances a full font size
        assert_eq!(surface.measure_text("你好").width, 20.0);
    }

    #[test]
    fn test_fill_text_records_state() {
        let mut surface = RecordingSurface::new(300.0, 200.0);
        surface.set_font(&FontSpec::sans(16.0).bold());
        surface.set_fill_style(Color::rgb(0x40, 0x80, 0xff));
        surface.fill_text("hi", 5.0, 20.0);

        assert_eq!(
            surface.commands(),
            &[DrawCommand::FillText {
                text: "hi".to_string(),
                x: 5.0,
                y: 20.0,
                font: "bold 16px sans-serif".to_string(),
                color: "#4080ff".to_string(),
            }]
        );
    }

    #[test]
    fn test_resize_updates_dimensions() {
        let mut surface = RecordingSurface::new(300.0, 200.0);
        surface.resize(300.0, 900.0);
        assert_eq!(surface.height(), 900.0);
        assert!(matches!(
            surface.commands().last(),
            Some(DrawCommand::Resize { height, .. }) if *height == 900.0
        ));
    }
}
