//! Renderable nodes and their HTML serialization.

use serde::Serialize;
use serde_json::Value;

use super::tree::Node;

const VOID_TAGS: [&str; 4] = ["br", "hr", "img", "input"];

/// A materialized node, ready for the presentation layer.
///
/// `Component` nodes are substitution points: the front-end hydrates them by
/// `name` and `props`, while `html` is the server-side fallback.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Renderable {
    Element {
        tag: String,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        attrs: Vec<(String, String)>,
        children: Vec<Renderable>,
    },
    Text {
        text: String,
    },
    Component {
        name: String,
        props: Value,
        html: String,
    },
}

impl Renderable {
    pub fn element(tag: &str, attrs: Vec<(String, String)>, children: Vec<Renderable>) -> Self {
        Renderable::Element {
            tag: tag.to_string(),
            attrs,
            children,
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Renderable::Text { text: text.into() }
    }

    pub fn write_html(&self, out: &mut String) {
        match self {
            Renderable::Element {
                tag,
                attrs,
                children,
            } => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in attrs {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    out.push_str(&escape_attr(value));
                    out.push('"');
                }
                out.push('>');
                if VOID_TAGS.contains(&tag.as_str()) {
                    return;
                }
                for child in children {
                    child.write_html(out);
                }
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
            Renderable::Text { text } => out.push_str(&escape_html(text)),
            Renderable::Component { html, .. } => out.push_str(html),
        }
    }
}

/// Default materialization of a node whose children are already materialized.
pub fn default_materialize(node: &Node, children: Vec<Renderable>) -> Renderable {
    match node {
        Node::Heading { level, .. } => Renderable::element(&format!("h{level}"), vec![], children),
        Node::Paragraph { .. } => Renderable::element("p", vec![], children),
        Node::List { ordered, start, .. } => {
            if *ordered {
                let attrs = match start {
                    Some(n) if *n != 1 => vec![("start".to_string(), n.to_string())],
                    _ => vec![],
                };
                Renderable::element("ol", attrs, children)
            } else {
                Renderable::element("ul", vec![], children)
            }
        }
        Node::ListItem { .. } => Renderable::element("li", vec![], children),
        Node::BlockQuote { .. } => Renderable::element("blockquote", vec![], children),
        Node::CodeBlock { language, code } => {
            let attrs = language
                .as_ref()
                .map(|l| vec![("class".to_string(), format!("language-{l}"))])
                .unwrap_or_default();
            Renderable::element(
                "pre",
                vec![],
                vec![Renderable::element("code", attrs, vec![Renderable::text(code)])],
            )
        }
        Node::Emphasis { .. } => Renderable::element("em", vec![], children),
        Node::Strong { .. } => Renderable::element("strong", vec![], children),
        Node::Strikethrough { .. } => Renderable::element("del", vec![], children),
        Node::Link { href, title, .. } => {
            let mut attrs = vec![("href".to_string(), safe_url(href))];
            if let Some(title) = title {
                attrs.push(("title".to_string(), title.clone()));
            }
            Renderable::element("a", attrs, children)
        }
        Node::Image { src, alt, title } => {
            let mut attrs = vec![
                ("src".to_string(), safe_url(src)),
                ("alt".to_string(), alt.clone()),
            ];
            if let Some(title) = title {
                attrs.push(("title".to_string(), title.clone()));
            }
            Renderable::element("img", attrs, vec![])
        }
        Node::InlineCode { code } => {
            Renderable::element("code", vec![], vec![Renderable::text(code)])
        }
        Node::Text { text } => Renderable::text(text),
        // Raw HTML from post bodies is shown, never executed.
        Node::Html { html } => Renderable::text(html),
        Node::SoftBreak => Renderable::text("\n"),
        Node::HardBreak => Renderable::element("br", vec![], vec![]),
        Node::Rule => Renderable::element("hr", vec![], vec![]),
        Node::TaskMarker { checked } => {
            let mut attrs = vec![
                ("type".to_string(), "checkbox".to_string()),
                ("disabled".to_string(), String::new()),
            ];
            if *checked {
                attrs.push(("checked".to_string(), String::new()));
            }
            Renderable::element("input", attrs, vec![])
        }
        Node::Block { tag, .. } => Renderable::element(tag, vec![], children),
    }
}

/// Neutralizes script-bearing URL schemes.
fn safe_url(url: &str) -> String {
    let lowered = url.trim().to_ascii_lowercase();
    if lowered.starts_with("javascript:") || lowered.starts_with("vbscript:") {
        "#".to_string()
    } else {
        url.to_string()
    }
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn escape_attr(s: &str) -> String {
    escape_html(s).replace('"', "&quot;").replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_is_escaped() {
        let mut out = String::new();
        Renderable::text("<script>&").write_html(&mut out);
        assert_eq!(out, "&lt;script&gt;&amp;");
    }

    #[test]
    fn test_void_element_has_no_closing_tag() {
        let mut out = String::new();
        Renderable::element("hr", vec![], vec![]).write_html(&mut out);
        assert_eq!(out, "<hr>");
    }

    #[test]
    fn test_javascript_links_are_neutralized() {
        let node = Node::Link {
            href: "JavaScript:alert(1)".to_string(),
            title: None,
            children: vec![],
        };
        let rendered = default_materialize(&node, vec![Renderable::text("x")]);
        let mut out = String::new();
        rendered.write_html(&mut out);
        assert_eq!(out, "<a href=\"#\">x</a>");
    }

    #[test]
    fn test_ordered_list_start_attribute_only_when_not_one() {
        let from_one = Node::List {
            ordered: true,
            start: Some(1),
            children: vec![],
        };
        let from_five = Node::List {
            ordered: true,
            start: Some(5),
            children: vec![],
        };
        let mut out = String::new();
        default_materialize(&from_one, vec![]).write_html(&mut out);
        default_materialize(&from_five, vec![]).write_html(&mut out);
        assert_eq!(out, "<ol></ol><ol start=\"5\"></ol>");
    }
}
