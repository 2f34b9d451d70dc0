//! Markdown parsing
//!
//! This module parses Markdown text into a tree of [`MarkdownNode`] values
//! using pulldown-cmark. The node set is deliberately small: the block and
//! inline kinds the card painter knows how to draw. Constructs outside that
//! set (tables, footnotes, raw HTML) are dropped with a diagnostic.
//!
//! Parsing never fails from the caller's point of view: any internal
//! failure degrades to a single paragraph wrapping the raw input, so the
//! render pipeline always receives a valid tree.

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag};
use thiserror::Error;

/// Deepest builder nesting accepted before the parse bails out to the
/// plain-paragraph fallback.
const MAX_NESTING_DEPTH: usize = 32;

/// A node in the parsed document tree.
///
/// Terminal kinds (`Text`, `Code`, `CodeBlock`) carry only strings;
/// container kinds carry only child sequences. The enum is closed: adding
/// a kind forces every exhaustive match in the layout engine to be
/// revisited.
#[derive(Debug, Clone, PartialEq)]
pub enum MarkdownNode {
    /// Heading with level 1-6 (consumers clamp out-of-range levels)
    Heading {
        level: u8,
        content: Vec<MarkdownNode>,
    },
    Paragraph {
        content: Vec<MarkdownNode>,
    },
    /// Bulleted list; each item is its own block sequence
    List {
        items: Vec<Vec<MarkdownNode>>,
    },
    /// Horizontal rule
    Hr,
    Blockquote {
        content: Vec<MarkdownNode>,
    },
    /// Fenced or indented code block (raw text, trailing newline trimmed)
    CodeBlock {
        text: String,
    },
    /// Plain text run
    Text {
        text: String,
    },
    Strong {
        content: Vec<MarkdownNode>,
    },
    Em {
        content: Vec<MarkdownNode>,
    },
    Link {
        target: String,
        title: Option<String>,
        content: Vec<MarkdownNode>,
    },
    /// Inline code span
    Code {
        text: String,
    },
}

impl MarkdownNode {
    /// Node kind name for diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            MarkdownNode::Heading { .. } => "heading",
            MarkdownNode::Paragraph { .. } => "paragraph",
            MarkdownNode::List { .. } => "list",
            MarkdownNode::Hr => "hr",
            MarkdownNode::Blockquote { .. } => "blockquote",
            MarkdownNode::CodeBlock { .. } => "code_block",
            MarkdownNode::Text { .. } => "text",
            MarkdownNode::Strong { .. } => "strong",
            MarkdownNode::Em { .. } => "em",
            MarkdownNode::Link { .. } => "link",
            MarkdownNode::Code { .. } => "code",
        }
    }

    fn text(text: impl Into<String>) -> Self {
        MarkdownNode::Text { text: text.into() }
    }
}

/// Internal reasons a parse can bail out to the fallback
#[derive(Debug, Error)]
enum ParseFailure {
    #[error("nesting exceeds {MAX_NESTING_DEPTH} levels")]
    TooDeep,
    #[error("unbalanced parse events")]
    Unbalanced,
}

/// Parse Markdown text into a sequence of block nodes.
///
/// Empty input yields an empty sequence. Any internal failure yields a
/// single paragraph wrapping the raw input. The function is pure:
/// identical input always yields an identical tree.
pub fn parse(source: &str) -> Vec<MarkdownNode> {
    if source.is_empty() {
        return Vec::new();
    }

    match parse_blocks(source) {
        Ok(nodes) => nodes,
        Err(failure) => {
            log::warn!("markdown parse degraded to plain paragraph: {failure}");
            fallback_paragraph(source)
        }
    }
}

/// The degenerate tree used when parsing fails: one paragraph holding the
/// raw input as a single text node.
fn fallback_paragraph(source: &str) -> Vec<MarkdownNode> {
    vec![MarkdownNode::Paragraph {
        content: vec![MarkdownNode::text(source)],
    }]
}

fn parse_blocks(source: &str) -> Result<Vec<MarkdownNode>, ParseFailure> {
    // Block grammars need a trailing blank line to close the final block.
    let padded = format!("{source}\n\n");
    let parser = Parser::new_ext(&padded, Options::empty());

    let mut output = Vec::new();
    let mut stack: Vec<NodeBuilder> = Vec::new();

    for event in parser {
        match event {
            Event::Start(tag) => {
                if stack.len() >= MAX_NESTING_DEPTH {
                    return Err(ParseFailure::TooDeep);
                }
                stack.push(NodeBuilder::for_tag(tag));
            }
            Event::End(_tag) => {
                let builder = stack.pop().ok_or(ParseFailure::Unbalanced)?;
                finish_builder(builder, &mut stack, &mut output)?;
            }
            Event::Text(text) => add_text(&mut stack, &mut output, &text),
            Event::Code(code) => add_inline(
                &mut stack,
                &mut output,
                MarkdownNode::Code {
                    text: code.to_string(),
                },
            ),
            Event::SoftBreak | Event::HardBreak => add_text(&mut stack, &mut output, "\n"),
            Event::Rule => add_inline(&mut stack, &mut output, MarkdownNode::Hr),
            Event::Html(html) => {
                log::debug!("dropping raw HTML ({} bytes)", html.len());
            }
            Event::FootnoteReference(label) => {
                add_text(&mut stack, &mut output, &format!("[^{label}]"));
            }
            Event::TaskListMarker(_) => {
                log::debug!("dropping task list marker");
            }
        }
    }

    if !stack.is_empty() {
        return Err(ParseFailure::Unbalanced);
    }

    Ok(output)
}

/// Builder for the node under construction at one nesting level
#[derive(Debug)]
enum NodeBuilder {
    Paragraph(Vec<MarkdownNode>),
    Heading {
        level: u8,
        content: Vec<MarkdownNode>,
    },
    Blockquote(Vec<MarkdownNode>),
    CodeBlock(String),
    List(Vec<Vec<MarkdownNode>>),
    Item(Vec<MarkdownNode>),
    Strong(Vec<MarkdownNode>),
    Em(Vec<MarkdownNode>),
    Link {
        target: String,
        title: Option<String>,
        content: Vec<MarkdownNode>,
    },
    /// Image alt text is collected, then the image collapses to plain text
    Image(String),
    /// Children pass through to the parent unchanged (e.g. strikethrough)
    Transparent(Vec<MarkdownNode>),
    /// Content inside is dropped entirely (tables, footnote definitions)
    Discard,
}

impl NodeBuilder {
    fn for_tag(tag: Tag<'_>) -> Self {
        match tag {
            Tag::Paragraph => NodeBuilder::Paragraph(Vec::new()),
            Tag::Heading(level, _id, _classes) => NodeBuilder::Heading {
                level: heading_level(level),
                content: Vec::new(),
            },
            Tag::BlockQuote => NodeBuilder::Blockquote(Vec::new()),
            Tag::CodeBlock(kind) => {
                if let CodeBlockKind::Fenced(lang) = &kind {
                    if !lang.is_empty() {
                        log::debug!("ignoring code block language '{lang}'");
                    }
                }
                NodeBuilder::CodeBlock(String::new())
            }
            Tag::List(_start) => NodeBuilder::List(Vec::new()),
            Tag::Item => NodeBuilder::Item(Vec::new()),
            Tag::Strong => NodeBuilder::Strong(Vec::new()),
            Tag::Emphasis => NodeBuilder::Em(Vec::new()),
            Tag::Link(_link_type, target, title) => NodeBuilder::Link {
                target: target.to_string(),
                title: if title.is_empty() {
                    None
                } else {
                    Some(title.to_string())
                },
                content: Vec::new(),
            },
            Tag::Image(_link_type, _target, _title) => NodeBuilder::Image(String::new()),
            Tag::Strikethrough => NodeBuilder::Transparent(Vec::new()),
            Tag::Table(_) | Tag::TableHead | Tag::TableRow | Tag::TableCell => {
                log::debug!("dropping unsupported table construct");
                NodeBuilder::Discard
            }
            Tag::FootnoteDefinition(_) => {
                log::debug!("dropping unsupported footnote definition");
                NodeBuilder::Discard
            }
        }
    }

    /// Attach a finished child node to this builder
    fn add_child(&mut self, node: MarkdownNode) {
        match self {
            NodeBuilder::Paragraph(children)
            | NodeBuilder::Blockquote(children)
            | NodeBuilder::Item(children)
            | NodeBuilder::Strong(children)
            | NodeBuilder::Em(children)
            | NodeBuilder::Transparent(children)
            | NodeBuilder::Link {
                content: children, ..
            } => children.push(node),
            NodeBuilder::Heading { content, .. } => content.push(node),
            NodeBuilder::CodeBlock(text) | NodeBuilder::Image(text) => {
                if let MarkdownNode::Text { text: t } | MarkdownNode::Code { text: t } = node {
                    text.push_str(&t);
                }
            }
            NodeBuilder::List(_) => {
                log::debug!("dropping non-item child of list");
            }
            NodeBuilder::Discard => {}
        }
    }
}

fn heading_level(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

/// Add a text run to the innermost builder (or as loose top-level text)
fn add_text(stack: &mut Vec<NodeBuilder>, output: &mut Vec<MarkdownNode>, text: &str) {
    add_inline(stack, output, MarkdownNode::text(text));
}

fn add_inline(stack: &mut Vec<NodeBuilder>, output: &mut Vec<MarkdownNode>, node: MarkdownNode) {
    match stack.last_mut() {
        Some(builder) => builder.add_child(node),
        None => output.push(node),
    }
}

/// Finalize a popped builder, attaching its node to the parent (or the
/// output sequence at top level).
fn finish_builder(
    builder: NodeBuilder,
    stack: &mut Vec<NodeBuilder>,
    output: &mut Vec<MarkdownNode>,
) -> Result<(), ParseFailure> {
    let finished = match builder {
        NodeBuilder::Paragraph(children) => {
            let content = coalesce_text(children);
            if content.is_empty() {
                return Ok(());
            }
            Some(MarkdownNode::Paragraph { content })
        }
        NodeBuilder::Heading { level, content } => Some(MarkdownNode::Heading {
            level,
            content: coalesce_text(content),
        }),
        NodeBuilder::Blockquote(children) => Some(MarkdownNode::Blockquote { content: children }),
        NodeBuilder::CodeBlock(text) => Some(MarkdownNode::CodeBlock {
            text: text.strip_suffix('\n').unwrap_or(&text).to_string(),
        }),
        NodeBuilder::List(items) => Some(MarkdownNode::List { items }),
        NodeBuilder::Item(children) => {
            // items attach to their list, not as ordinary children
            match stack.last_mut() {
                Some(NodeBuilder::List(items)) => items.push(coalesce_text(children)),
                _ => return Err(ParseFailure::Unbalanced),
            }
            None
        }
        NodeBuilder::Strong(children) => Some(MarkdownNode::Strong {
            content: coalesce_text(children),
        }),
        NodeBuilder::Em(children) => Some(MarkdownNode::Em {
            content: coalesce_text(children),
        }),
        NodeBuilder::Link {
            target,
            title,
            content,
        } => Some(MarkdownNode::Link {
            target,
            title,
            content: coalesce_text(content),
        }),
        NodeBuilder::Image(alt) => {
            // no image kind in the node set; keep the alt text visible
            if alt.is_empty() {
                None
            } else {
                Some(MarkdownNode::text(alt))
            }
        }
        NodeBuilder::Transparent(children) => {
            for child in children {
                add_inline(stack, output, child);
            }
            None
        }
        NodeBuilder::Discard => None,
    };

    if let Some(node) = finished {
        add_inline(stack, output, node);
    }
    Ok(())
}

/// Merge adjacent text runs so soft breaks stay inside one wrappable run
fn coalesce_text(nodes: Vec<MarkdownNode>) -> Vec<MarkdownNode> {
    let mut out: Vec<MarkdownNode> = Vec::new();
    for node in nodes {
        match (out.last_mut(), node) {
            (Some(MarkdownNode::Text { text: last }), MarkdownNode::Text { text }) => {
                last.push_str(&text);
            }
            (_, node) => out.push(node),
        }
    }
    out
}
