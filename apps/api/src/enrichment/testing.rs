//! Deterministic in-process gateway for pipeline and router tests.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::enrichment::{ChatTurn, EnrichmentError, EnrichmentGateway, RelatedCandidate};

pub const SCRIPTED_IMAGE: &str = "data:image/png;base64,iVBORw0KGgo=";
pub const SCRIPTED_AUDIO: &str = "data:audio/wav;base64,UklGRiQAAABXQVZF";

#[derive(Default)]
pub struct ScriptedGateway {
    failing: Mutex<HashSet<&'static str>>,
    calls: Mutex<Vec<&'static str>>,
    related: Mutex<Option<Vec<String>>>,
    last_candidate_count: Mutex<Option<usize>>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every call of `operation` fail with a schema error.
    pub fn fail(self, operation: &'static str) -> Self {
        self.failing.lock().unwrap().insert(operation);
        self
    }

    pub fn with_related(self, slugs: &[&str]) -> Self {
        *self.related.lock().unwrap() = Some(slugs.iter().map(|s| s.to_string()).collect());
        self
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, operation: &str) -> usize {
        self.calls().iter().filter(|c| **c == operation).count()
    }

    pub fn last_candidate_count(&self) -> Option<usize> {
        *self.last_candidate_count.lock().unwrap()
    }

    fn record(&self, operation: &'static str) -> Result<(), EnrichmentError> {
        self.calls.lock().unwrap().push(operation);
        if self.failing.lock().unwrap().contains(operation) {
            return Err(EnrichmentError::Schema {
                operation,
                message: "scripted failure".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl EnrichmentGateway for ScriptedGateway {
    async fn summarize(&self, content: &str) -> Result<String, EnrichmentError> {
        self.record("summarize")?;
        let lead: String = content.split_whitespace().take(8).collect::<Vec<_>>().join(" ");
        Ok(format!("Summary: {lead}"))
    }

    async fn extract_tags(&self, _content: &str) -> Result<Vec<String>, EnrichmentError> {
        self.record("extractTags")?;
        Ok(vec![
            "Data Engineering".to_string(),
            "Python".to_string(),
            "SQL".to_string(),
        ])
    }

    async fn generate_content(
        &self,
        title: &str,
        _tags: &[String],
    ) -> Result<String, EnrichmentError> {
        self.record("generateContent")?;
        Ok(format!(
            "## {title}\n\nThis generated article walks through the topic step by step, \
             with enough detail to be useful.\n\n```python\nprint(\"hello\")\n```\n"
        ))
    }

    async fn generate_image(&self, _topic: &str) -> Result<String, EnrichmentError> {
        self.record("generateImage")?;
        Ok(SCRIPTED_IMAGE.to_string())
    }

    async fn text_to_speech(&self, _text: &str) -> Result<String, EnrichmentError> {
        self.record("textToSpeech")?;
        Ok(SCRIPTED_AUDIO.to_string())
    }

    async fn find_related_posts(
        &self,
        _current_title: &str,
        _current_content: &str,
        candidates: &[RelatedCandidate],
    ) -> Result<Vec<String>, EnrichmentError> {
        self.record("findRelatedPosts")?;
        *self.last_candidate_count.lock().unwrap() = Some(candidates.len());
        let scripted = self.related.lock().unwrap().clone();
        Ok(scripted.unwrap_or_else(|| {
            candidates.iter().take(2).map(|c| c.slug.clone()).collect()
        }))
    }

    async fn converse(
        &self,
        question: &str,
        _history: &[ChatTurn],
    ) -> Result<String, EnrichmentError> {
        self.record("converse")?;
        Ok(format!("You asked: {question}"))
    }
}
