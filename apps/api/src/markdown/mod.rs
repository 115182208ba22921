//! Markdown Renderer: markdown text → document tree → renderable nodes.
//!
//! Materialization is pluggable per node type: `MarkdownRenderer::with_override`
//! swaps how one `NodeKind` becomes a `Renderable`. The site renderer routes
//! fenced code blocks through `CopyableCodeBlock`.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

pub mod code_block;
pub mod html;
pub mod tree;

pub use code_block::{CopyableCodeBlock, COPYABLE_CODE_BLOCK};
pub use html::{default_materialize, Renderable};
pub use tree::{Node, NodeKind};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RenderError {
    #[error("markdown input exceeds {limit} bytes")]
    TooLarge { limit: usize },

    #[error("malformed markdown structure: {0}")]
    Unbalanced(&'static str),
}

/// Turns one node (whose children are already materialized) into a renderable.
pub trait NodeMaterializer: Send + Sync {
    fn materialize(&self, node: &Node, children: Vec<Renderable>) -> Renderable;
}

/// Output of a successful render.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedDocument {
    pub nodes: Vec<Renderable>,
}

impl RenderedDocument {
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        for node in &self.nodes {
            node.write_html(&mut out);
        }
        out
    }
}

#[derive(Clone, Default)]
pub struct MarkdownRenderer {
    overrides: HashMap<NodeKind, Arc<dyn NodeMaterializer>>,
}

impl MarkdownRenderer {
    /// A renderer with default materialization for every node type.
    pub fn new() -> Self {
        Self::default()
    }

    /// The renderer used by the site: copyable code blocks.
    pub fn site() -> Self {
        Self::new().with_override(NodeKind::CodeBlock, CopyableCodeBlock)
    }

    pub fn with_override(
        mut self,
        kind: NodeKind,
        materializer: impl NodeMaterializer + 'static,
    ) -> Self {
        self.overrides.insert(kind, Arc::new(materializer));
        self
    }

    pub fn render(&self, markdown: &str) -> Result<RenderedDocument, RenderError> {
        let tree = tree::parse(markdown)?;
        Ok(RenderedDocument {
            nodes: tree.iter().map(|node| self.materialize(node)).collect(),
        })
    }

    fn materialize(&self, node: &Node) -> Renderable {
        let children = node
            .children()
            .iter()
            .map(|child| self.materialize(child))
            .collect();
        match self.overrides.get(&node.kind()) {
            Some(materializer) => materializer.materialize(node, children),
            None => default_materialize(node, children),
        }
    }
}
