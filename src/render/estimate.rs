//! Content-height estimation
//!
//! A structural walk over the node tree that predicts the rendered height
//! without painting, used to size the drawing surface before the real
//! pass. Under-sizing causes silent clipping, so every per-kind increment
//! is the painter's own arithmetic or deliberately above it: paragraphs
//! and headings run the real wrapping algorithm against a scratch surface;
//! structural kinds use the painter's fixed increments plus margin.

use crate::markdown::parser::MarkdownNode;
use crate::render::engine::{
    CODE_BLOCK_PADDING, LIST_INDENT, LIST_ITEM_SPACING, NODE_SPACING, QUOTE_INDENT, QUOTE_PADDING,
    RULE_OFFSET, RULE_TRAILING,
};
use crate::render::measure::TextMeasureCache;
use crate::render::surface::DrawSurface;
use crate::render::wrap::wrap_text;
use crate::theme::{TextStyle, Theme};

/// Predict the height consumed by painting `nodes` from `y` down.
///
/// Uses the same per-kind dispatch shape as the paint engine, minus the
/// drawing. The result is an upper-ish bound on the paint pass.
pub fn estimate_height(
    cache: &mut TextMeasureCache,
    surface: &mut dyn DrawSurface,
    nodes: &[MarkdownNode],
    x: f32,
    y: f32,
    max_width: f32,
    theme: &Theme,
) -> f32 {
    let mut height = y;
    for node in nodes {
        height = estimate_node(cache, surface, node, x, height, max_width, theme);
        height += NODE_SPACING;
    }
    height
}

#[allow(clippy::too_many_arguments)]
fn estimate_node(
    cache: &mut TextMeasureCache,
    surface: &mut dyn DrawSurface,
    node: &MarkdownNode,
    x: f32,
    y: f32,
    max_width: f32,
    theme: &Theme,
) -> f32 {
    match node {
        MarkdownNode::Heading { level, content } => {
            let style = theme.heading_style(*level);
            let text = gather_text(content);
            let lines = wrapped_line_count(cache, surface, &text, max_width, style);
            // painter: 0.8 lead-in + one line height per wrapped line;
            // one extra line height of margin keeps this an upper bound
            y + style.line_height * 0.8
                + lines as f32 * style.line_height
                + style.line_height
        }
        MarkdownNode::Paragraph { content } => {
            // mirror the painter: each inline child starts its own run
            let mut height = y;
            for child in content {
                height += estimate_inline_run(cache, surface, child, max_width, theme);
            }
            height
        }
        MarkdownNode::Hr => y + RULE_OFFSET + RULE_TRAILING,
        MarkdownNode::List { items } => {
            let line_height = theme.list.line_height;
            let mut height = y;
            for item in items {
                let item_start = height;
                for node in item {
                    height = estimate_node(
                        cache,
                        surface,
                        node,
                        x + LIST_INDENT,
                        height,
                        max_width - LIST_INDENT,
                        theme,
                    );
                }
                height = height.max(item_start + line_height);
                height += LIST_ITEM_SPACING;
            }
            height
        }
        MarkdownNode::Blockquote { content } => {
            let mut height = y + QUOTE_PADDING;
            for node in content {
                height = match node {
                    // direct text children paint with the quote style
                    MarkdownNode::Text { text } => {
                        height
                            + estimate_text_run(
                                cache,
                                surface,
                                text,
                                max_width - QUOTE_INDENT,
                                &theme.blockquote,
                            )
                    }
                    other => estimate_node(
                        cache,
                        surface,
                        other,
                        x + QUOTE_INDENT,
                        height,
                        max_width - QUOTE_INDENT,
                        theme,
                    ),
                };
            }
            height + QUOTE_PADDING
        }
        MarkdownNode::CodeBlock { text } => {
            let lines = text.split('\n').count();
            y + lines as f32 * theme.code.line_height + CODE_BLOCK_PADDING * 2.0
        }
        MarkdownNode::Text { text } => {
            y + estimate_text_run(cache, surface, text, max_width, &theme.text)
        }
        // the painter skips inline kinds at block position; budgeting a
        // line anyway keeps the estimate on the safe side
        MarkdownNode::Strong { .. }
        | MarkdownNode::Em { .. }
        | MarkdownNode::Link { .. }
        | MarkdownNode::Code { .. } => y + theme.text.line_height,
    }
}

/// Height of one inline child inside a paragraph, mirroring the painter's
/// per-child line advancement.
fn estimate_inline_run(
    cache: &mut TextMeasureCache,
    surface: &mut dyn DrawSurface,
    node: &MarkdownNode,
    max_width: f32,
    theme: &Theme,
) -> f32 {
    match node {
        MarkdownNode::Text { text } => {
            estimate_text_run(cache, surface, text, max_width, &theme.text)
        }
        MarkdownNode::Strong { content } | MarkdownNode::Em { content } => {
            let mut height = 0.0;
            for child in content {
                if let MarkdownNode::Text { text } = child {
                    height += estimate_text_run(cache, surface, text, max_width, &theme.text);
                }
            }
            height
        }
        MarkdownNode::Link { content, .. } => {
            let text: String = content
                .iter()
                .filter_map(|n| match n {
                    MarkdownNode::Text { text } => Some(text.as_str()),
                    _ => None,
                })
                .collect();
            estimate_text_run(cache, surface, &text, max_width, &theme.link)
        }
        MarkdownNode::Code { text } => {
            estimate_text_run(cache, surface, text, max_width, &theme.code)
        }
        other => {
            log::debug!("no height estimate for '{}' inside paragraph", other.kind());
            0.0
        }
    }
}

/// Wrapped height of a single text run (empty runs still occupy a line,
/// as in the painter).
fn estimate_text_run(
    cache: &mut TextMeasureCache,
    surface: &mut dyn DrawSurface,
    text: &str,
    max_width: f32,
    style: &TextStyle,
) -> f32 {
    let lines = wrapped_line_count(cache, surface, text, max_width, style);
    lines as f32 * style.line_height
}

fn wrapped_line_count(
    cache: &mut TextMeasureCache,
    surface: &mut dyn DrawSurface,
    text: &str,
    max_width: f32,
    style: &TextStyle,
) -> usize {
    let lines = wrap_text(
        cache,
        surface,
        text,
        0.0,
        0.0,
        max_width,
        style.line_height,
        &style.font,
    );
    lines.len().max(1)
}

fn gather_text(nodes: &[MarkdownNode]) -> String {
    let mut out = String::new();
    for node in nodes {
        if let MarkdownNode::Text { text } = node {
            out.push_str(text);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::engine::{render_nodes, RenderContext};
    use crate::render::surface::RecordingSurface;
    use crate::theme::ThemeRegistry;

    fn paint_height(nodes: &[MarkdownNode], theme: &Theme, max_width: f32) -> f32 {
        let mut surface = RecordingSurface::new(375.0, 4000.0);
        let mut cache = TextMeasureCache::new();
        let mut ctx = RenderContext {
            surface: &mut surface,
            cache: &mut cache,
            theme,
            x: 30.0,
            y: 90.0,
            max_width,
        };
        render_nodes(&mut ctx, nodes)
    }

    fn estimated(nodes: &[MarkdownNode], theme: &Theme, max_width: f32) -> f32 {
        let mut surface = RecordingSurface::new(375.0, 4000.0);
        let mut cache = TextMeasureCache::new();
        estimate_height(&mut cache, &mut surface, nodes, 30.0, 90.0, max_width, theme)
    }

    fn paragraph(text: &str) -> MarkdownNode {
        MarkdownNode::Paragraph {
            content: vec![MarkdownNode::Text {
                text: text.to_string(),
            }],
        }
    }

    #[test]
    fn test_estimate_bounds_hard_break_paragraphs_in_every_theme() {
        // a document of explicit line breaks, none of which overflow
        let nodes = vec![
            paragraph("first line\nsecond line\nthird line"),
            paragraph("alpha\nbeta"),
        ];
        for theme in ThemeRegistry::builtin().themes() {
            let painted = paint_height(&nodes, theme, 315.0);
            let estimate = estimated(&nodes, theme, 315.0);
            assert!(
                estimate >= painted,
                "theme '{}': estimate {estimate} < painted {painted}",
                theme.name
            );
        }
    }

    #[test]
    fn test_estimate_bounds_wrapped_heading() {
        let nodes = vec![MarkdownNode::Heading {
            level: 1,
            content: vec![MarkdownNode::Text {
                text: "a very long heading title that will certainly wrap".to_string(),
            }],
        }];
        for theme in ThemeRegistry::builtin().themes() {
            let painted = paint_height(&nodes, theme, 120.0);
            let estimate = estimated(&nodes, theme, 120.0);
            assert!(
                estimate >= painted,
                "theme '{}': estimate {estimate} < painted {painted}",
                theme.name
            );
        }
    }

    #[test]
    fn test_estimate_bounds_mixed_document() {
        let nodes = vec![
            MarkdownNode::Heading {
                level: 2,
                content: vec![MarkdownNode::Text {
                    text: "Section".to_string(),
                }],
            },
            paragraph("some body text that wraps across a couple of lines at this width"),
            MarkdownNode::List {
                items: vec![
                    vec![paragraph("first item")],
                    vec![paragraph("second item")],
                ],
            },
            MarkdownNode::Blockquote {
                content: vec![MarkdownNode::Text {
                    text: "quoted".to_string(),
                }],
            },
            MarkdownNode::CodeBlock {
                text: "fn main() {}\nmain();".to_string(),
            },
            MarkdownNode::Hr,
        ];
        for theme in ThemeRegistry::builtin().themes() {
            let painted = paint_height(&nodes, theme, 200.0);
            let estimate = estimated(&nodes, theme, 200.0);
            assert!(
                estimate >= painted,
                "theme '{}': estimate {estimate} < painted {painted}",
                theme.name
            );
        }
    }

    #[test]
    fn test_estimate_adds_no_height_for_empty_input() {
        let theme = Theme::default_card();
        assert_eq!(estimated(&[], &theme, 300.0), 90.0);
    }
}
