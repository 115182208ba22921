use serde_json::json;

use super::html::{default_materialize, escape_attr, escape_html, Renderable};
use super::tree::Node;
use super::NodeMaterializer;

/// Component name the front-end hydrates into a code block with a copy button.
pub const COPYABLE_CODE_BLOCK: &str = "copyable-code-block";

/// Replaces fenced code with a copy-to-clipboard component.
pub struct CopyableCodeBlock;

impl NodeMaterializer for CopyableCodeBlock {
    fn materialize(&self, node: &Node, children: Vec<Renderable>) -> Renderable {
        let Node::CodeBlock { language, code } = node else {
            return default_materialize(node, children);
        };

        let label = language.as_deref().unwrap_or("text");
        let code_class = language
            .as_ref()
            .map(|l| format!(" class=\"language-{}\"", escape_attr(l)))
            .unwrap_or_default();

        let html = format!(
            "<div class=\"code-block\" data-component=\"{COPYABLE_CODE_BLOCK}\">\
             <div class=\"code-block-header\"><span class=\"code-block-language\">{}</span>\
             <button type=\"button\" class=\"copy-button\" data-copy=\"{}\" aria-label=\"Copy code\">Copy</button></div>\
             <pre><code{code_class}>{}</code></pre></div>",
            escape_html(label),
            escape_attr(code),
            escape_html(code),
        );

        Renderable::Component {
            name: COPYABLE_CODE_BLOCK.to_string(),
            props: json!({
                "language": language,
                "code": code,
            }),
            html,
        }
    }
}
