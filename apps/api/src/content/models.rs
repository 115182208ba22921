use serde::{Deserialize, Serialize};

use crate::markdown::Renderable;

/// Reading speed used for read-time estimates.
pub const WORDS_PER_MINUTE: usize = 200;

/// A blog post as stored in, or resolved from, the Content Store.
///
/// `body`, `excerpt` and `tags` may be missing on disk; the resolution
/// pipeline backfills them. `read_time` is derived and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    pub slug: String,
    pub title: String,
    pub excerpt: Option<String>,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// ISO `yyyy-mm-dd`.
    pub publish_date: String,
    pub image_url: Option<String>,
    pub image_hint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_time: Option<u32>,
}

impl ContentItem {
    /// Body text, empty when absent.
    pub fn body_text(&self) -> &str {
        self.body.as_deref().unwrap_or_default()
    }

    /// The same item without its body, for list views.
    pub fn summary_view(&self) -> Self {
        Self {
            body: None,
            ..self.clone()
        }
    }
}

/// Result of rendering a body for the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RenderState {
    Ready {
        html: String,
        tree: Vec<Renderable>,
    },
    Error {
        message: String,
    },
}

/// A fully resolved post: enriched fields plus its rendered body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedItem {
    #[serde(flatten)]
    pub item: ContentItem,
    pub rendered_body: RenderState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MetricUnit {
    #[serde(rename = "USD")]
    Usd,
    #[serde(rename = "percentage")]
    Percentage,
    #[serde(rename = "hours")]
    Hours,
    #[serde(rename = "count")]
    Count,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMetric {
    pub label: String,
    pub value: f64,
    pub unit: MetricUnit,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub slug: String,
    pub title: String,
    pub short_description: String,
    /// Markdown case study.
    pub long_description: Option<String>,
    pub tags: Vec<String>,
    pub image_url: Option<String>,
    pub image_hint: Option<String>,
    pub metrics: Vec<ProjectMetric>,
    pub github_url: Option<String>,
    pub live_url: Option<String>,
    pub publish_date: String,
}

/// Read time in minutes at `WORDS_PER_MINUTE`, rounded up, never below 1.
pub fn read_time_minutes(body: &str) -> u32 {
    let words = body.split_whitespace().count();
    words.div_ceil(WORDS_PER_MINUTE).max(1) as u32
}

/// Trims tags and drops blanks and case-insensitive duplicates, keeping order.
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = std::collections::HashSet::new();
    tags.into_iter()
        .map(|t| t.as_ref().trim().to_string())
        .filter(|t| !t.is_empty())
        .filter(|t| seen.insert(t.to_lowercase()))
        .collect()
}

/// Keyword hint for image search, derived from the first two tags.
pub fn image_hint_from_tags(tags: &[String]) -> Option<String> {
    let hint = tags
        .iter()
        .take(2)
        .map(|t| t.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ");
    (!hint.is_empty()).then_some(hint)
}
