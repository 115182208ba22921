//! Markdown → document tree.
//!
//! Folds the flat pulldown-cmark event stream into an owned `Node` tree so
//! materialization can be overridden per node type.

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag};
use serde::Serialize;

use super::RenderError;

/// Inputs above this size are rejected instead of rendered.
pub const MAX_MARKDOWN_BYTES: usize = 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Node {
    Heading {
        level: u8,
        children: Vec<Node>,
    },
    Paragraph {
        children: Vec<Node>,
    },
    List {
        ordered: bool,
        start: Option<u64>,
        children: Vec<Node>,
    },
    ListItem {
        children: Vec<Node>,
    },
    BlockQuote {
        children: Vec<Node>,
    },
    CodeBlock {
        language: Option<String>,
        code: String,
    },
    Emphasis {
        children: Vec<Node>,
    },
    Strong {
        children: Vec<Node>,
    },
    Strikethrough {
        children: Vec<Node>,
    },
    Link {
        href: String,
        title: Option<String>,
        children: Vec<Node>,
    },
    Image {
        src: String,
        alt: String,
        title: Option<String>,
    },
    InlineCode {
        code: String,
    },
    Text {
        text: String,
    },
    Html {
        html: String,
    },
    SoftBreak,
    HardBreak,
    Rule,
    TaskMarker {
        checked: bool,
    },
    /// Structural containers without a dedicated variant (tables, footnotes).
    Block {
        tag: String,
        children: Vec<Node>,
    },
}

/// Discriminant used to key materializer overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Heading,
    Paragraph,
    List,
    ListItem,
    BlockQuote,
    CodeBlock,
    Emphasis,
    Strong,
    Strikethrough,
    Link,
    Image,
    InlineCode,
    Text,
    Html,
    SoftBreak,
    HardBreak,
    Rule,
    TaskMarker,
    Block,
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Heading { .. } => NodeKind::Heading,
            Node::Paragraph { .. } => NodeKind::Paragraph,
            Node::List { .. } => NodeKind::List,
            Node::ListItem { .. } => NodeKind::ListItem,
            Node::BlockQuote { .. } => NodeKind::BlockQuote,
            Node::CodeBlock { .. } => NodeKind::CodeBlock,
            Node::Emphasis { .. } => NodeKind::Emphasis,
            Node::Strong { .. } => NodeKind::Strong,
            Node::Strikethrough { .. } => NodeKind::Strikethrough,
            Node::Link { .. } => NodeKind::Link,
            Node::Image { .. } => NodeKind::Image,
            Node::InlineCode { .. } => NodeKind::InlineCode,
            Node::Text { .. } => NodeKind::Text,
            Node::Html { .. } => NodeKind::Html,
            Node::SoftBreak => NodeKind::SoftBreak,
            Node::HardBreak => NodeKind::HardBreak,
            Node::Rule => NodeKind::Rule,
            Node::TaskMarker { .. } => NodeKind::TaskMarker,
            Node::Block { .. } => NodeKind::Block,
        }
    }

    pub fn children(&self) -> &[Node] {
        match self {
            Node::Heading { children, .. }
            | Node::Paragraph { children }
            | Node::List { children, .. }
            | Node::ListItem { children }
            | Node::BlockQuote { children }
            | Node::Emphasis { children }
            | Node::Strong { children }
            | Node::Strikethrough { children }
            | Node::Link { children, .. }
            | Node::Block { children, .. } => children,
            _ => &[],
        }
    }

    /// Plain text content of this node and its descendants.
    pub fn plain_text(&self) -> String {
        match self {
            Node::Text { text } => text.clone(),
            Node::InlineCode { code } | Node::CodeBlock { code, .. } => code.clone(),
            Node::SoftBreak | Node::HardBreak => " ".to_string(),
            Node::Image { alt, .. } => alt.clone(),
            other => other.children().iter().map(Node::plain_text).collect(),
        }
    }
}

/// Open container while folding events.
enum Frame {
    Heading(u8),
    Paragraph,
    List(Option<u64>),
    ListItem,
    BlockQuote,
    CodeBlock(Option<String>),
    Emphasis,
    Strong,
    Strikethrough,
    Link { href: String, title: Option<String> },
    Image { src: String, title: Option<String> },
    Block(&'static str),
}

impl Frame {
    fn from_tag(tag: Tag<'_>) -> Self {
        match tag {
            Tag::Heading { level, .. } => Frame::Heading(level as u8),
            Tag::Paragraph => Frame::Paragraph,
            Tag::List(start) => Frame::List(start),
            Tag::Item => Frame::ListItem,
            Tag::BlockQuote(..) => Frame::BlockQuote,
            Tag::CodeBlock(CodeBlockKind::Fenced(info)) => {
                // Info strings may carry attributes after the language ("rust,ignore").
                let language = info
                    .split(|c: char| c.is_whitespace() || c == ',')
                    .next()
                    .filter(|l| !l.is_empty())
                    .map(str::to_string);
                Frame::CodeBlock(language)
            }
            Tag::CodeBlock(CodeBlockKind::Indented) => Frame::CodeBlock(None),
            Tag::Emphasis => Frame::Emphasis,
            Tag::Strong => Frame::Strong,
            Tag::Strikethrough => Frame::Strikethrough,
            Tag::Link {
                dest_url, title, ..
            } => Frame::Link {
                href: dest_url.to_string(),
                title: non_empty(title.to_string()),
            },
            Tag::Image {
                dest_url, title, ..
            } => Frame::Image {
                src: dest_url.to_string(),
                title: non_empty(title.to_string()),
            },
            Tag::Table(_) => Frame::Block("table"),
            Tag::TableHead => Frame::Block("thead"),
            Tag::TableRow => Frame::Block("tr"),
            Tag::TableCell => Frame::Block("td"),
            Tag::FootnoteDefinition(_) => Frame::Block("aside"),
            _ => Frame::Block("div"),
        }
    }

    fn into_node(self, children: Vec<Node>) -> Node {
        match self {
            Frame::Heading(level) => Node::Heading { level, children },
            Frame::Paragraph => Node::Paragraph { children },
            Frame::List(start) => Node::List {
                ordered: start.is_some(),
                start,
                children,
            },
            Frame::ListItem => Node::ListItem { children },
            Frame::BlockQuote => Node::BlockQuote { children },
            Frame::CodeBlock(language) => Node::CodeBlock {
                language,
                code: children.iter().map(Node::plain_text).collect(),
            },
            Frame::Emphasis => Node::Emphasis { children },
            Frame::Strong => Node::Strong { children },
            Frame::Strikethrough => Node::Strikethrough { children },
            Frame::Link { href, title } => Node::Link {
                href,
                title,
                children,
            },
            Frame::Image { src, title } => Node::Image {
                src,
                alt: children.iter().map(Node::plain_text).collect(),
                title,
            },
            Frame::Block(tag) => Node::Block {
                tag: tag.to_string(),
                children,
            },
        }
    }
}

fn non_empty(s: String) -> Option<String> {
    (!s.is_empty()).then_some(s)
}

/// Parses markdown into a document tree.
pub fn parse(markdown: &str) -> Result<Vec<Node>, RenderError> {
    if markdown.len() > MAX_MARKDOWN_BYTES {
        return Err(RenderError::TooLarge {
            limit: MAX_MARKDOWN_BYTES,
        });
    }

    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let mut root: Vec<Node> = Vec::new();
    let mut stack: Vec<(Frame, Vec<Node>)> = Vec::new();

    for event in Parser::new_ext(markdown, options) {
        let leaf = match event {
            Event::Start(tag) => {
                stack.push((Frame::from_tag(tag), Vec::new()));
                continue;
            }
            Event::End(_) => {
                let (frame, children) = stack
                    .pop()
                    .ok_or(RenderError::Unbalanced("closing tag without an open container"))?;
                frame.into_node(children)
            }
            Event::Text(text) => Node::Text {
                text: text.to_string(),
            },
            Event::Code(code) => Node::InlineCode {
                code: code.to_string(),
            },
            Event::Html(html) | Event::InlineHtml(html) => Node::Html {
                html: html.to_string(),
            },
            Event::SoftBreak => Node::SoftBreak,
            Event::HardBreak => Node::HardBreak,
            Event::Rule => Node::Rule,
            Event::TaskListMarker(checked) => Node::TaskMarker { checked },
            Event::FootnoteReference(label) => Node::Text {
                text: format!("[{label}]"),
            },
            _ => continue,
        };

        match stack.last_mut() {
            Some((_, children)) => children.push(leaf),
            None => root.push(leaf),
        }
    }

    if !stack.is_empty() {
        return Err(RenderError::Unbalanced("unclosed container at end of input"));
    }

    Ok(root)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_and_paragraph() {
        let tree = parse("## Hello\n\nSome *emphasis* here.").unwrap();
        assert_eq!(tree.len(), 2);
        assert!(matches!(tree[0], Node::Heading { level: 2, .. }));
        assert_eq!(tree[0].plain_text(), "Hello");
        let Node::Paragraph { children } = &tree[1] else {
            panic!("expected paragraph, got {:?}", tree[1]);
        };
        assert!(children.iter().any(|c| c.kind() == NodeKind::Emphasis));
    }

    #[test]
    fn test_fenced_code_keeps_language_and_text() {
        let tree = parse("```rust,ignore\nfn main() {}\n```").unwrap();
        assert_eq!(
            tree,
            vec![Node::CodeBlock {
                language: Some("rust".to_string()),
                code: "fn main() {}\n".to_string(),
            }]
        );
    }

    #[test]
    fn test_ordered_list_records_start() {
        let tree = parse("3. three\n4. four").unwrap();
        let Node::List {
            ordered,
            start,
            children,
        } = &tree[0]
        else {
            panic!("expected list");
        };
        assert!(*ordered);
        assert_eq!(*start, Some(3));
        assert_eq!(children.len(), 2);
    }

    #[test]
    fn test_unordered_list_and_link() {
        let tree = parse("- [docs](https://example.com \"Docs\")\n- plain").unwrap();
        let Node::List { ordered, children, .. } = &tree[0] else {
            panic!("expected list");
        };
        assert!(!*ordered);
        let link = children[0]
            .children()
            .iter()
            .find(|n| n.kind() == NodeKind::Link)
            .expect("link inside first item");
        assert_eq!(
            link,
            &Node::Link {
                href: "https://example.com".to_string(),
                title: Some("Docs".to_string()),
                children: vec![Node::Text {
                    text: "docs".to_string()
                }],
            }
        );
    }

    #[test]
    fn test_image_alt_is_flattened() {
        let tree = parse("![a *pipeline* diagram](img.png)").unwrap();
        let image = &tree[0].children()[0];
        assert_eq!(
            image,
            &Node::Image {
                src: "img.png".to_string(),
                alt: "a pipeline diagram".to_string(),
                title: None,
            }
        );
    }

    #[test]
    fn test_oversized_input_is_rejected() {
        let huge = "a".repeat(MAX_MARKDOWN_BYTES + 1);
        assert_eq!(
            parse(&huge),
            Err(RenderError::TooLarge {
                limit: MAX_MARKDOWN_BYTES
            })
        );
    }

    #[test]
    fn test_empty_input_is_empty_tree() {
        assert!(parse("").unwrap().is_empty());
    }
}
