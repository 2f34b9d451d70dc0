//! Node layout and paint engine
//!
//! Walks the parsed node tree recursively, dispatching each node kind to a
//! themed paint routine. Routines share one contract: take the context
//! positioned at the node's start baseline, paint, and return the new
//! vertical offset. Callers must always use the returned offset; nothing
//! assumes a fixed per-node increment.
//!
//! Every routine sets the fill/font it needs immediately before drawing.
//! Surface state is never assumed to survive a call boundary.

use crate::markdown::parser::MarkdownNode;
use crate::render::measure::TextMeasureCache;
use crate::render::surface::DrawSurface;
use crate::render::wrap::wrap_text;
use crate::theme::{TextStyle, Theme};

/// Vertical spacing appended after every block node
pub(crate) const NODE_SPACING: f32 = 10.0;

/// Horizontal indent of list item content past the bullet
pub(crate) const LIST_INDENT: f32 = 20.0;

/// Extra spacing between list items
pub(crate) const LIST_ITEM_SPACING: f32 = 5.0;

/// Horizontal indent of blockquote content past the accent bar
pub(crate) const QUOTE_INDENT: f32 = 15.0;

/// Vertical padding above and below blockquote content
pub(crate) const QUOTE_PADDING: f32 = 10.0;

/// Padding inside code block backgrounds
pub(crate) const CODE_BLOCK_PADDING: f32 = 10.0;

/// Padding around inline code backgrounds
pub(crate) const INLINE_CODE_PADDING: f32 = 3.0;

/// Gap above a horizontal rule and trailing space after it
pub(crate) const RULE_OFFSET: f32 = 10.0;
pub(crate) const RULE_TRAILING: f32 = 20.0;

/// Cursor state threaded through one top-to-bottom paint pass.
///
/// Exactly one context flows through a pass. Nested content (list items,
/// blockquotes) narrows `x`/`max_width` for the duration of the recursion
/// and restores them afterwards; `y` progression is carried through return
/// values.
pub struct RenderContext<'a> {
    pub surface: &'a mut dyn DrawSurface,
    pub cache: &'a mut TextMeasureCache,
    pub theme: &'a Theme,
    /// Left edge for the current node
    pub x: f32,
    /// Next paint baseline
    pub y: f32,
    /// Wrap width at the current indent
    pub max_width: f32,
}

/// Paint a sequence of block nodes, threading the cursor through each and
/// appending the fixed inter-node spacing. Returns the final offset.
pub fn render_nodes(ctx: &mut RenderContext<'_>, nodes: &[MarkdownNode]) -> f32 {
    for node in nodes {
        let new_y = render_node(ctx, node);
        ctx.y = new_y + NODE_SPACING;
    }
    ctx.y
}

/// Paint a single node at the context's cursor, returning the new offset.
///
/// The match is exhaustive over the closed node set; a new node kind will
/// not compile without a paint decision here.
fn render_node(ctx: &mut RenderContext<'_>, node: &MarkdownNode) -> f32 {
    match node {
        MarkdownNode::Heading { level, content } => render_heading(ctx, *level, content),
        MarkdownNode::Paragraph { content } => render_paragraph(ctx, content),
        MarkdownNode::Hr => render_rule(ctx),
        MarkdownNode::List { items } => render_list(ctx, items),
        MarkdownNode::Blockquote { content } => render_blockquote(ctx, content),
        MarkdownNode::CodeBlock { text } => render_code_block(ctx, text),
        MarkdownNode::Text { text } => {
            let style = ctx.theme.text.clone();
            render_text_run(ctx, text, &style)
        }
        node @ (MarkdownNode::Strong { .. }
        | MarkdownNode::Em { .. }
        | MarkdownNode::Link { .. }
        | MarkdownNode::Code { .. }) => {
            log::warn!("skipping inline node '{}' at block position", node.kind());
            ctx.y
        }
    }
}

/// Wrap and paint one text run with the given style. Empty input still
/// advances one line height.
fn render_text_run(ctx: &mut RenderContext<'_>, text: &str, style: &TextStyle) -> f32 {
    ctx.surface.set_fill_style(style.color);
    ctx.surface.set_font(&style.font);

    let lines = wrap_text(
        ctx.cache,
        ctx.surface,
        text,
        ctx.x,
        ctx.y,
        ctx.max_width,
        style.line_height,
        &style.font,
    );

    for line in &lines {
        ctx.surface.fill_text(&line.text, line.x, line.y);
    }

    match lines.last() {
        Some(last) => last.y + style.line_height,
        None => ctx.y + style.line_height,
    }
}

fn render_heading(ctx: &mut RenderContext<'_>, level: u8, content: &[MarkdownNode]) -> f32 {
    let style = ctx.theme.heading_style(level).clone();
    ctx.surface.set_fill_style(style.color);
    ctx.surface.set_font(&style.font);

    // headings sit a little lower than their nominal baseline
    let mut current_y = ctx.y + style.line_height * 0.8;

    for child in content {
        if let MarkdownNode::Text { text } = child {
            let lines = wrap_text(
                ctx.cache,
                ctx.surface,
                text,
                ctx.x,
                current_y,
                ctx.max_width,
                style.line_height,
                &style.font,
            );
            for line in &lines {
                ctx.surface.fill_text(&line.text, line.x, line.y);
                current_y = line.y + style.line_height;
            }
        } else {
            log::debug!("skipping non-text heading child '{}'", child.kind());
        }
    }

    current_y
}

fn render_paragraph(ctx: &mut RenderContext<'_>, content: &[MarkdownNode]) -> f32 {
    let mut current_y = ctx.y;

    for child in content {
        ctx.y = current_y;
        current_y = match child {
            MarkdownNode::Text { text } => {
                let style = ctx.theme.text.clone();
                render_text_run(ctx, text, &style)
            }
            MarkdownNode::Strong { content } => render_emphasis(ctx, content, true),
            MarkdownNode::Em { content } => render_emphasis(ctx, content, false),
            MarkdownNode::Link { content, .. } => render_link(ctx, content),
            MarkdownNode::Code { text } => render_inline_code(ctx, text),
            other => {
                log::warn!("skipping node '{}' inside paragraph", other.kind());
                current_y
            }
        };
    }

    current_y
}

/// Paint strong/em runs with a bold or italic variant of the body style.
/// The variant flags are typed, so re-applying them cannot stack.
fn render_emphasis(ctx: &mut RenderContext<'_>, content: &[MarkdownNode], strong: bool) -> f32 {
    let mut style = ctx.theme.text.clone();
    style.font = if strong {
        style.font.bold()
    } else {
        style.font.italic()
    };

    let mut current_y = ctx.y;
    for child in content {
        if let MarkdownNode::Text { text } = child {
            ctx.y = current_y;
            current_y = render_text_run(ctx, text, &style);
        }
    }
    current_y
}

/// Paint link text and stroke an underline beneath each emitted line at
/// its measured width.
fn render_link(ctx: &mut RenderContext<'_>, content: &[MarkdownNode]) -> f32 {
    let style = ctx.theme.link.clone();
    let text = gather_text(content);

    ctx.surface.set_fill_style(style.color);
    ctx.surface.set_font(&style.font);

    let lines = wrap_text(
        ctx.cache,
        ctx.surface,
        &text,
        ctx.x,
        ctx.y,
        ctx.max_width,
        style.line_height,
        &style.font,
    );

    for line in &lines {
        ctx.surface.fill_text(&line.text, line.x, line.y);

        let underline_y = line.y + 2.0;
        ctx.surface.set_stroke_style(style.color);
        ctx.surface.set_line_width(1.0);
        ctx.surface.begin_path();
        ctx.surface.move_to(line.x, underline_y);
        ctx.surface.line_to(line.x + line.width, underline_y);
        ctx.surface.stroke();
    }

    match lines.last() {
        Some(last) => last.y + style.line_height,
        None => ctx.y + style.line_height,
    }
}

/// Paint an inline code span: a padded background box per line, then the
/// text on top.
fn render_inline_code(ctx: &mut RenderContext<'_>, text: &str) -> f32 {
    let style = ctx.theme.code.clone();
    let background = ctx.theme.code_background;

    let lines = wrap_text(
        ctx.cache,
        ctx.surface,
        text,
        ctx.x,
        ctx.y,
        ctx.max_width,
        style.line_height,
        &style.font,
    );

    for line in &lines {
        let bg_width = line.width + INLINE_CODE_PADDING * 2.0;
        let bg_height = style.line_height * 0.8;

        ctx.surface.set_fill_style(background);
        ctx.surface.fill_rect(
            line.x - INLINE_CODE_PADDING,
            line.y - bg_height + 4.0,
            bg_width,
            bg_height,
        );

        ctx.surface.set_fill_style(style.color);
        ctx.surface.set_font(&style.font);
        ctx.surface.fill_text(&line.text, line.x, line.y);
    }

    match lines.last() {
        Some(last) => last.y + style.line_height,
        None => ctx.y + style.line_height,
    }
}

fn render_rule(ctx: &mut RenderContext<'_>) -> f32 {
    let line_y = ctx.y + RULE_OFFSET;

    ctx.surface.set_stroke_style(ctx.theme.rule_color);
    ctx.surface.set_line_width(1.0);
    ctx.surface.begin_path();
    ctx.surface.move_to(ctx.x, line_y);
    ctx.surface.line_to(ctx.x + ctx.max_width, line_y);
    ctx.surface.stroke();

    line_y + RULE_TRAILING
}

fn render_list(ctx: &mut RenderContext<'_>, items: &[Vec<MarkdownNode>]) -> f32 {
    let list_style = ctx.theme.list.clone();
    let origin_x = ctx.x;
    let mut current_y = ctx.y;

    for item in items {
        let bullet_y = current_y + list_style.line_height * 0.7;
        ctx.surface.set_fill_style(list_style.color);
        ctx.surface.set_font(&list_style.font);
        ctx.surface.fill_text("\u{2022}", origin_x, bullet_y);

        let item_start_y = current_y;

        ctx.x = origin_x + LIST_INDENT;
        ctx.max_width -= LIST_INDENT;
        for node in item {
            ctx.y = current_y;
            current_y = render_node(ctx, node);
        }
        ctx.x = origin_x;
        ctx.max_width += LIST_INDENT;

        // an empty or very short item still occupies one line
        current_y = current_y.max(item_start_y + list_style.line_height);
        current_y += LIST_ITEM_SPACING;
    }

    current_y
}

/// Paint a blockquote: content first (indented past the bar lane), then
/// the accent bar once its true height is known. The bar lane and the
/// content never overlap, so paint order carries no dependency.
fn render_blockquote(ctx: &mut RenderContext<'_>, content: &[MarkdownNode]) -> f32 {
    let block_start = ctx.y;
    let origin_x = ctx.x;
    let mut current_y = ctx.y + QUOTE_PADDING;

    ctx.x = origin_x + QUOTE_INDENT;
    ctx.max_width -= QUOTE_INDENT;
    for node in content {
        ctx.y = current_y;
        current_y = match node {
            MarkdownNode::Text { text } => {
                let style = ctx.theme.blockquote.clone();
                render_text_run(ctx, text, &style)
            }
            other => render_node(ctx, other),
        };
    }
    ctx.x = origin_x;
    ctx.max_width += QUOTE_INDENT;

    let end_y = current_y + QUOTE_PADDING;
    ctx.surface.set_fill_style(ctx.theme.quote_bar);
    ctx.surface
        .fill_rect(origin_x + 3.0, block_start, 3.0, end_y - block_start);

    end_y
}

fn render_code_block(ctx: &mut RenderContext<'_>, text: &str) -> f32 {
    let style = ctx.theme.code.clone();
    let block_start = ctx.y;

    let lines: Vec<&str> = text.split('\n').collect();
    let block_height = lines.len() as f32 * style.line_height + CODE_BLOCK_PADDING * 2.0;

    ctx.surface.set_fill_style(ctx.theme.code_background);
    ctx.surface
        .fill_rect(ctx.x, block_start, ctx.max_width, block_height);

    ctx.surface.set_fill_style(style.color);
    ctx.surface.set_font(&style.font);
    let text_y = block_start + CODE_BLOCK_PADDING;
    for (i, line) in lines.iter().enumerate() {
        ctx.surface.fill_text(
            line,
            ctx.x + CODE_BLOCK_PADDING,
            text_y + i as f32 * style.line_height,
        );
    }

    block_start + block_height
}

/// Concatenate the text content of a node sequence
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
    use crate::render::surface::{DrawCommand, RecordingSurface};

    fn text_node(text: &str) -> MarkdownNode {
        MarkdownNode::Text {
            text: text.to_string(),
        }
    }

    fn render(nodes: &[MarkdownNode]) -> (RecordingSurface, f32) {
        let mut surface = RecordingSurface::new(375.0, 1000.0);
        let mut cache = TextMeasureCache::new();
        let theme = Theme::default_card();
        let mut ctx = RenderContext {
            surface: &mut surface,
            cache: &mut cache,
            theme: &theme,
            x: 30.0,
            y: 90.0,
            max_width: 315.0,
        };
        let end_y = render_nodes(&mut ctx, nodes);
        (surface, end_y)
    }

    #[test]
    fn test_every_node_painted_once_in_order() {
        let nodes = vec![
            MarkdownNode::Heading {
                level: 1,
                content: vec![text_node("HEAD")],
            },
            MarkdownNode::Paragraph {
                content: vec![text_node("PARA")],
            },
            MarkdownNode::Hr,
            MarkdownNode::List {
                items: vec![vec![text_node("ITEM")]],
            },
            MarkdownNode::Blockquote {
                content: vec![text_node("QUOTE")],
            },
            MarkdownNode::CodeBlock {
                text: "CODE".to_string(),
            },
        ];

        let (surface, _) = render(&nodes);
        let texts = surface.painted_texts();
        let order: Vec<&str> = texts
            .iter()
            .copied()
            .filter(|t| ["HEAD", "PARA", "ITEM", "QUOTE", "CODE"].contains(t))
            .collect();
        assert_eq!(order, vec!["HEAD", "PARA", "ITEM", "QUOTE", "CODE"]);
    }

    #[test]
    fn test_heading_level_clamped_to_six() {
        let theme = Theme::default_card();
        let nodes = vec![MarkdownNode::Heading {
            level: 9,
            content: vec![text_node("deep")],
        }];
        let (surface, _) = render(&nodes);

        let font = surface
            .commands()
            .iter()
            .find_map(|c| match c {
                DrawCommand::FillText { text, font, .. } if text == "deep" => Some(font.clone()),
                _ => None,
            })
            .expect("heading painted");
        assert_eq!(font, theme.heading[5].font.descriptor());
    }

    #[test]
    fn test_list_reserves_minimum_item_height() {
        let theme = Theme::default_card();
        let line_height = theme.list.line_height;
        let nodes = vec![MarkdownNode::List {
            items: vec![vec![text_node("a")], vec![text_node("b")]],
        }];

        let (_, end_y) = render(&nodes);
        let expected_min = 90.0 + 2.0 * line_height + 2.0 * LIST_ITEM_SPACING;
        assert!(end_y >= expected_min, "end_y = {end_y}");
    }

    #[test]
    fn test_link_underlined_per_line() {
        // 14px link font, 6px max width per char budget forces wrapping
        let mut surface = RecordingSurface::new(375.0, 1000.0);
        let mut cache = TextMeasureCache::new();
        let theme = Theme::default_card();
        let mut ctx = RenderContext {
            surface: &mut surface,
            cache: &mut cache,
            theme: &theme,
            x: 0.0,
            y: 20.0,
            max_width: 60.0,
        };
        let nodes = vec![MarkdownNode::Paragraph {
            content: vec![MarkdownNode::Link {
                target: "https://example.com".to_string(),
                title: None,
                content: vec![text_node("click here for more")],
            }],
        }];
        render_nodes(&mut ctx, &nodes);

        let strokes = surface
            .commands()
            .iter()
            .filter(|c| matches!(c, DrawCommand::Stroke { .. }))
            .count();
        let texts = surface.painted_texts().len();
        assert!(texts > 1, "expected the link to wrap");
        assert_eq!(strokes, texts);
    }

    #[test]
    fn test_inline_code_paints_background_first() {
        let nodes = vec![MarkdownNode::Paragraph {
            content: vec![MarkdownNode::Code {
                text: "let x".to_string(),
            }],
        }];
        let (surface, _) = render(&nodes);
        let theme = Theme::default_card();

        let rect_index = surface
            .commands()
            .iter()
            .position(|c| matches!(c, DrawCommand::FillRect { color, .. } if *color == theme.code_background.to_css()))
            .expect("background painted");
        let text_index = surface
            .commands()
            .iter()
            .position(|c| matches!(c, DrawCommand::FillText { text, .. } if text == "let x"))
            .expect("code painted");
        assert!(rect_index < text_index);
    }

    #[test]
    fn test_blockquote_bar_spans_block_height() {
        let nodes = vec![MarkdownNode::Blockquote {
            content: vec![text_node("wise words")],
        }];
        let (surface, end_y) = render(&nodes);
        let theme = Theme::default_card();

        let bar = surface
            .commands()
            .iter()
            .find_map(|c| match c {
                DrawCommand::FillRect {
                    y, height, color, ..
                } if *color == theme.quote_bar.to_css() => Some((*y, *height)),
                _ => None,
            })
            .expect("accent bar painted");
        assert_eq!(bar.0, 90.0);
        // bar ends where the block ends (end_y includes node spacing)
        assert_eq!(bar.0 + bar.1, end_y - NODE_SPACING);
    }

    #[test]
    fn test_inline_node_at_block_position_is_noop() {
        let nodes = vec![MarkdownNode::Strong {
            content: vec![text_node("loose")],
        }];
        let (surface, end_y) = render(&nodes);
        assert!(surface.painted_texts().is_empty());
        // only the inter-node spacing advances the cursor
        assert_eq!(end_y, 90.0 + NODE_SPACING);
    }

    #[test]
    fn test_indent_restored_after_nested_blocks() {
        let mut surface = RecordingSurface::new(375.0, 1000.0);
        let mut cache = TextMeasureCache::new();
        let theme = Theme::default_card();
        let mut ctx = RenderContext {
            surface: &mut surface,
            cache: &mut cache,
            theme: &theme,
            x: 30.0,
            y: 90.0,
            max_width: 315.0,
        };
        let nodes = vec![
            MarkdownNode::List {
                items: vec![vec![text_node("one")]],
            },
            MarkdownNode::Blockquote {
                content: vec![text_node("two")],
            },
        ];
        render_nodes(&mut ctx, &nodes);
        assert_eq!(ctx.x, 30.0);
        assert_eq!(ctx.max_width, 315.0);
    }
}
