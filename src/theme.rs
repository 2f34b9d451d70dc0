//! Visual themes for card rendering
//!
//! A theme is a pure data bundle mapping node kinds to font/color/line-height
//! values plus page-level chrome (background, content panel, title, watermark).
//! Switching themes never requires re-parsing a document, only re-running the
//! paint pass (and the height estimate when the theme changes panel geometry,
//! as the dialog bubbles do).

use crate::error::ThemeError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An RGBA color. Alpha is a 0.0..=1.0 factor so translucent watermarks
/// serialize the same way the host canvas expects them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Color {
    /// Create an opaque color
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Create a color with explicit alpha
    pub const fn rgba(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// CSS-style representation used in draw-command dumps
    pub fn to_css(&self) -> String {
        if (self.a - 1.0).abs() < f32::EPSILON {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
        }
    }
}

/// Font family classes understood by the drawing surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FontFamily {
    SansSerif,
    Serif,
    Monospace,
}

impl FontFamily {
    fn as_css(&self) -> &'static str {
        match self {
            FontFamily::SansSerif => "sans-serif",
            FontFamily::Serif => "serif",
            FontFamily::Monospace => "monospace",
        }
    }
}

/// Font weight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

/// Font slant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum FontSlant {
    #[default]
    Normal,
    Italic,
}

/// A font descriptor: family, size and the bold/italic axes.
///
/// Bold/italic are typed flags rather than substrings of a descriptor
/// string, so applying them twice cannot duplicate anything.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FontSpec {
    pub family: FontFamily,
    pub size: f32,
    pub weight: FontWeight,
    pub slant: FontSlant,
}

impl FontSpec {
    pub fn sans(size: f32) -> Self {
        Self {
            family: FontFamily::SansSerif,
            size,
            weight: FontWeight::Normal,
            slant: FontSlant::Normal,
        }
    }

    pub fn serif(size: f32) -> Self {
        Self {
            family: FontFamily::Serif,
            ..Self::sans(size)
        }
    }

    pub fn mono(size: f32) -> Self {
        Self {
            family: FontFamily::Monospace,
            ..Self::sans(size)
        }
    }

    /// Return the bold variant (idempotent)
    pub fn bold(mut self) -> Self {
        self.weight = FontWeight::Bold;
        self
    }

    /// Return the italic variant (idempotent)
    pub fn italic(mut self) -> Self {
        self.slant = FontSlant::Italic;
        self
    }

    /// Canonical descriptor string, used as the measurement cache key and
    /// in draw-command dumps (e.g. `"italic bold 14px sans-serif"`)
    pub fn descriptor(&self) -> String {
        let mut out = String::new();
        if self.slant == FontSlant::Italic {
            out.push_str("italic ");
        }
        if self.weight == FontWeight::Bold {
            out.push_str("bold ");
        }
        out.push_str(&format!("{}px {}", self.size, self.family.as_css()));
        out
    }
}

impl Default for FontSpec {
    fn default() -> Self {
        Self::sans(14.0)
    }
}

impl fmt::Display for FontSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.descriptor())
    }
}

/// How one node kind paints in one theme
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub font: FontSpec,
    pub color: Color,
    pub line_height: f32,
}

impl TextStyle {
    pub fn new(font: FontSpec, color: Color, line_height: f32) -> Self {
        Self {
            font,
            color,
            line_height,
        }
    }
}

/// Page-level chrome constants for one theme
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageChrome {
    /// Full-bleed page background
    pub background: Color,
    /// Content panel fill
    pub content_background: Color,
    /// App title color
    pub title_color: Color,
    /// App title font
    pub title_font: FontSpec,
    /// Watermark color (translucent)
    pub watermark_color: Color,
    /// Watermark font
    pub watermark_font: FontSpec,
    /// Outer padding around the content panel
    pub padding: f32,
}

/// Speech-bubble geometry and colors for chat-style themes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BubbleStyle {
    /// Question bubble fill (left side)
    pub incoming: Color,
    /// Answer bubble fill (right side)
    pub outgoing: Color,
    /// Title bar fill
    pub title_bar: Color,
    /// Bubble width as a fraction of the canvas width
    pub width_ratio: f32,
    /// Corner radius
    pub radius: f32,
}

/// A named visual theme: per-kind text styles plus page chrome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,
    /// Body text
    pub text: TextStyle,
    /// Heading styles, index 0 = h1
    pub heading: [TextStyle; 6],
    pub link: TextStyle,
    pub list: TextStyle,
    pub blockquote: TextStyle,
    pub code: TextStyle,
    /// "Question" / "Answer" section labels
    pub section_label: TextStyle,
    /// Draw a short underline beneath section labels
    pub label_rule: bool,
    /// Horizontal inset of content within the panel
    pub content_inset: f32,
    /// Background behind inline code and code blocks
    pub code_background: Color,
    /// Horizontal rule stroke color
    pub rule_color: Color,
    /// Blockquote accent bar color
    pub quote_bar: Color,
    pub chrome: PageChrome,
    /// Present on chat-style themes; drives the bubble layout path
    pub bubble: Option<BubbleStyle>,
}

impl Theme {
    /// Resolve a heading style by level, clamping out-of-range levels
    /// into 1..=6 rather than rejecting them.
    pub fn heading_style(&self, level: u8) -> &TextStyle {
        let index = (level.clamp(1, 6) - 1) as usize;
        &self.heading[index]
    }

    /// The dark default card theme
    pub fn default_card() -> Self {
        let white = Color::rgb(0xff, 0xff, 0xff);
        Self {
            name: "default".to_string(),
            text: TextStyle::new(FontSpec::sans(14.0), white, 24.0),
            heading: Self::heading_scale(FontFamily::SansSerif, white),
            link: TextStyle::new(FontSpec::sans(14.0), Color::rgb(0x40, 0x80, 0xff), 24.0),
            list: TextStyle::new(FontSpec::sans(14.0), white, 24.0),
            blockquote: TextStyle::new(
                FontSpec::sans(14.0).italic(),
                Color::rgb(0xaa, 0xaa, 0xaa),
                24.0,
            ),
            code: TextStyle::new(FontSpec::mono(13.0), Color::rgb(0xe6, 0xe6, 0xe6), 22.0),
            section_label: TextStyle::new(
                FontSpec::sans(16.0),
                Color::rgb(0x40, 0x80, 0xff),
                24.0,
            ),
            label_rule: false,
            content_inset: 10.0,
            code_background: Color::rgb(0x2a, 0x2a, 0x2a),
            rule_color: Color::rgb(0x55, 0x55, 0x55),
            quote_bar: Color::rgb(0x55, 0x55, 0x55),
            chrome: PageChrome {
                background: Color::rgb(0x00, 0x00, 0x00),
                content_background: Color::rgb(0x1a, 0x1a, 0x1a),
                title_color: white,
                title_font: FontSpec::sans(24.0).bold(),
                watermark_color: Color::rgba(0xff, 0xff, 0xff, 0.1),
                watermark_font: FontSpec::sans(12.0),
                padding: 20.0,
            },
            bubble: None,
        }
    }

    /// The light minimal theme
    pub fn simple() -> Self {
        let ink = Color::rgb(0x33, 0x33, 0x33);
        let mut theme = Self::default_card();
        theme.name = "simple".to_string();
        theme.text.color = ink;
        theme.list.color = ink;
        for heading in theme.heading.iter_mut() {
            heading.color = ink;
        }
        theme.section_label.font = FontSpec::sans(18.0);
        theme.content_inset = 20.0;
        theme.chrome = PageChrome {
            background: Color::rgb(0xff, 0xff, 0xff),
            content_background: Color::rgb(0xf5, 0xf5, 0xf5),
            title_color: ink,
            title_font: FontSpec::sans(24.0).bold(),
            watermark_color: Color::rgba(0x00, 0x00, 0x00, 0.1),
            watermark_font: FontSpec::sans(12.0),
            padding: 30.0,
        };
        theme
    }

    /// The paper-and-print book theme
    pub fn book() -> Self {
        let sepia = Color::rgb(0x5d, 0x40, 0x37);
        let ink = Color::rgb(0x33, 0x33, 0x33);
        let mut theme = Self::default_card();
        theme.name = "book".to_string();
        theme.text = TextStyle::new(FontSpec::serif(15.0), ink, 24.0);
        theme.list.color = ink;
        for (i, heading) in theme.heading.iter_mut().enumerate() {
            heading.font = FontSpec::serif(24.0 - (i as f32) * 2.0).bold();
            heading.color = sepia;
        }
        theme.section_label = TextStyle::new(FontSpec::serif(20.0).bold(), sepia, 24.0);
        theme.label_rule = true;
        theme.content_inset = 30.0;
        theme.chrome = PageChrome {
            background: Color::rgb(0xf8, 0xf4, 0xe5),
            content_background: Color::rgb(0xff, 0xff, 0xff),
            title_color: sepia,
            title_font: FontSpec::serif(28.0).bold(),
            watermark_color: Color::rgba(0x5d, 0x40, 0x37, 0.1),
            watermark_font: FontSpec::serif(12.0).italic(),
            padding: 40.0,
        };
        theme
    }

    /// The chat-bubble dialog theme
    pub fn dialog() -> Self {
        let accent = Color::rgb(0x40, 0x80, 0xff);
        let mut theme = Self::default_card();
        theme.name = "dialog".to_string();
        theme.chrome = PageChrome {
            background: Color::rgb(0x12, 0x12, 0x12),
            content_background: Color::rgb(0x1e, 0x1e, 0x1e),
            title_color: accent,
            title_font: FontSpec::sans(18.0).bold(),
            watermark_color: Color::rgba(0x40, 0x80, 0xff, 0.1),
            watermark_font: FontSpec::sans(12.0),
            padding: 15.0,
        };
        theme.bubble = Some(BubbleStyle {
            incoming: Color::rgb(0x33, 0x33, 0x33),
            outgoing: accent,
            title_bar: Color::rgb(0x33, 0x33, 0x33),
            width_ratio: 0.7,
            radius: 10.0,
        });
        theme
    }

    fn heading_scale(family: FontFamily, color: Color) -> [TextStyle; 6] {
        // h1 = 24px/36, stepping down 2px of size and line height per level
        std::array::from_fn(|i| {
            let size = 24.0 - (i as f32) * 2.0;
            let font = FontSpec {
                family,
                size,
                weight: FontWeight::Bold,
                slant: FontSlant::Normal,
            };
            TextStyle::new(font, color, 36.0 - (i as f32) * 2.0)
        })
    }
}

/// The fixed set of named themes shipped with the renderer
#[derive(Debug, Clone)]
pub struct ThemeRegistry {
    themes: Vec<Theme>,
}

impl ThemeRegistry {
    /// Registry with the built-in themes: default, simple, book, dialog
    pub fn builtin() -> Self {
        Self {
            themes: vec![
                Theme::default_card(),
                Theme::simple(),
                Theme::book(),
                Theme::dialog(),
            ],
        }
    }

    /// Look up a theme by name
    pub fn get(&self, name: &str) -> Result<&Theme, ThemeError> {
        self.themes
            .iter()
            .find(|t| t.name == name)
            .ok_or_else(|| ThemeError::UnknownTheme {
                name: name.to_string(),
                known: self.names().join(", "),
            })
    }

    /// Registered theme names, in registration order
    pub fn names(&self) -> Vec<&str> {
        self.themes.iter().map(|t| t.name.as_str()).collect()
    }

    /// All registered themes
    pub fn themes(&self) -> &[Theme] {
        &self.themes
    }
}

impl Default for ThemeRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_registry() {
        let registry = ThemeRegistry::builtin();
        assert_eq!(registry.names(), vec!["default", "simple", "book", "dialog"]);
    }

    #[test]
    fn test_unknown_theme() {
        let registry = ThemeRegistry::builtin();
        let err = registry.get("neon").unwrap_err();
        assert!(err.to_string().contains("neon"));
        assert!(err.to_string().contains("book"));
    }

    #[test]
    fn test_heading_level_clamp() {
        let theme = Theme::default_card();
        assert_eq!(theme.heading_style(0), &theme.heading[0]);
        assert_eq!(theme.heading_style(1), &theme.heading[0]);
        assert_eq!(theme.heading_style(6), &theme.heading[5]);
        assert_eq!(theme.heading_style(9), &theme.heading[5]);
    }

    #[test]
    fn test_font_variants_idempotent() {
        let font = FontSpec::sans(14.0).bold().bold().italic().italic();
        assert_eq!(font.descriptor(), "italic bold 14px sans-serif");
    }

    #[test]
    fn test_bubble_only_on_dialog() {
        let registry = ThemeRegistry::builtin();
        for theme in registry.themes() {
            assert_eq!(theme.bubble.is_some(), theme.name == "dialog");
        }
    }

    #[test]
    fn test_color_css() {
        assert_eq!(Color::rgb(0x40, 0x80, 0xff).to_css(), "#4080ff");
        assert_eq!(
            Color::rgba(255, 255, 255, 0.1).to_css(),
            "rgba(255, 255, 255, 0.1)"
        );
    }
}
