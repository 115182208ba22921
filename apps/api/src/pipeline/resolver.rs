//! Content resolution: turns a stored post into a render-ready one.
//!
//! Flow per item: load → cached derived fields (if the body hash matches) →
//! tags → body → excerpt → persist new derived fields. The detail view then
//! renders the body; both views compute read time from the final body.
//!
//! Enrichment failures never escape the read path. Each missing field falls
//! back to its placeholder and the failure is logged.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use crate::content::models::{read_time_minutes, ContentItem, RenderState, ResolvedItem};
use crate::content::store::{content_hash, ContentStore, DerivedFields};
use crate::enrichment::operations::MAX_RELATED_CANDIDATES;
use crate::enrichment::{EnrichmentGateway, RelatedCandidate};
use crate::errors::AppError;
use crate::markdown::MarkdownRenderer;

pub const BODY_PLACEHOLDER: &str = "Content is being generated. Please check back later.";
pub const EXCERPT_PLACEHOLDER: &str = "Summary unavailable.";
/// Bodies shorter than this (in characters) are regenerated.
pub const MIN_BODY_CHARS: usize = 50;
const DEFAULT_LIST_CONCURRENCY: usize = 4;

pub struct ContentResolver {
    store: Arc<dyn ContentStore>,
    gateway: Arc<dyn EnrichmentGateway>,
    renderer: Arc<MarkdownRenderer>,
    persist_derived: bool,
    list_concurrency: usize,
}

fn has_usable_body(item: &ContentItem) -> bool {
    item.body_text().trim().chars().count() >= MIN_BODY_CHARS
}

/// Newest first; equal dates keep enumeration order.
pub fn sort_newest_first(items: &mut [ContentItem]) {
    items.sort_by(|a, b| b.publish_date.cmp(&a.publish_date));
}

fn with_read_time(mut item: ContentItem) -> ContentItem {
    item.read_time = Some(read_time_minutes(item.body_text()));
    item
}

impl ContentResolver {
    pub fn new(
        store: Arc<dyn ContentStore>,
        gateway: Arc<dyn EnrichmentGateway>,
        renderer: Arc<MarkdownRenderer>,
    ) -> Self {
        Self {
            store,
            gateway,
            renderer,
            persist_derived: true,
            list_concurrency: DEFAULT_LIST_CONCURRENCY,
        }
    }

    pub fn with_persist_derived(mut self, persist: bool) -> Self {
        self.persist_derived = persist;
        self
    }

    pub fn with_list_concurrency(mut self, concurrency: usize) -> Self {
        self.list_concurrency = concurrency.max(1);
        self
    }

    /// Detail view: enriched fields, rendered body and read time.
    pub async fn resolve_one(&self, slug: &str) -> Result<ResolvedItem, AppError> {
        let raw = self.store.get_item(slug).await?;
        let item = with_read_time(self.enrich(raw).await);

        let rendered_body = match self.renderer.render(item.body_text()) {
            Ok(doc) => {
                let html = doc.to_html();
                RenderState::Ready {
                    html,
                    tree: doc.nodes,
                }
            }
            Err(e) => {
                warn!("Rendering {} failed: {}", item.slug, e);
                RenderState::Error {
                    message: e.to_string(),
                }
            }
        };

        Ok(ResolvedItem {
            item,
            rendered_body,
        })
    }

    /// List view: every item enriched (bounded concurrency), bodies dropped,
    /// newest first.
    pub async fn resolve_all(&self) -> Result<Vec<ContentItem>, AppError> {
        let raw = self.store.list_items().await?;
        debug!("Resolving {} items", raw.len());

        let mut items: Vec<ContentItem> = stream::iter(raw)
            .map(|item| self.enrich(item))
            .buffered(self.list_concurrency)
            .map(|item| with_read_time(item).summary_view())
            .collect()
            .await;

        sort_newest_first(&mut items);
        Ok(items)
    }

    /// Up to three posts related to `slug`. Any enrichment failure yields an
    /// empty list.
    pub async fn related_posts(&self, slug: &str) -> Result<Vec<ContentItem>, AppError> {
        let current = self.enrich(self.store.get_item(slug).await?).await;

        let mut others: Vec<ContentItem> = self
            .store
            .list_items()
            .await?
            .into_iter()
            .filter(|item| item.slug != current.slug)
            .collect();
        if others.is_empty() {
            return Ok(vec![]);
        }
        sort_newest_first(&mut others);

        let candidates: Vec<RelatedCandidate> = others
            .iter()
            .take(MAX_RELATED_CANDIDATES)
            .map(|item| RelatedCandidate {
                slug: item.slug.clone(),
                title: item.title.clone(),
                excerpt: item.excerpt.clone(),
                tags: item.tags.clone(),
            })
            .collect();

        let slugs = match self
            .gateway
            .find_related_posts(&current.title, current.body_text(), &candidates)
            .await
        {
            Ok(slugs) => slugs,
            Err(e) => {
                warn!("Related posts for {} unavailable: {}", slug, e);
                return Ok(vec![]);
            }
        };

        let mut related = Vec::with_capacity(slugs.len());
        for wanted in slugs {
            if let Some(item) = others.iter().find(|item| item.slug == wanted) {
                let item = self.enrich(item.clone()).await;
                related.push(with_read_time(item).summary_view());
            }
        }
        Ok(related)
    }

    /// Narrates the post's excerpt (or its title when no real excerpt exists).
    pub async fn speak(&self, slug: &str) -> Result<String, AppError> {
        let item = self.enrich(self.store.get_item(slug).await?).await;
        let text = match item.excerpt.as_deref() {
            Some(excerpt) if excerpt != EXCERPT_PLACEHOLDER => excerpt,
            _ => item.title.as_str(),
        };
        Ok(self.gateway.text_to_speech(text).await?)
    }

    async fn cached_fields(&self, slug: &str, hash: &str) -> Option<DerivedFields> {
        match self.store.load_derived(slug).await {
            Ok(Some(fields)) if fields.content_hash == hash => Some(fields),
            Ok(Some(_)) => {
                debug!("Derived fields for {} are stale", slug);
                None
            }
            Ok(None) => None,
            Err(e) => {
                warn!("Ignoring unreadable derived fields for {}: {}", slug, e);
                None
            }
        }
    }

    /// Fills tags, body and excerpt. Tags come first because they seed body
    /// generation; the excerpt comes last because it summarizes the final body.
    async fn enrich(&self, mut item: ContentItem) -> ContentItem {
        let hash = content_hash(item.body.as_deref());
        let cached = self.cached_fields(&item.slug, &hash).await;
        let mut derived = cached.unwrap_or_else(|| DerivedFields::for_hash(hash));
        let mut dirty = false;

        if item.tags.is_empty() {
            if let Some(tags) = &derived.tags {
                item.tags = tags.clone();
            } else {
                let source = if item.body_text().trim().is_empty() {
                    item.title.clone()
                } else {
                    item.body_text().to_string()
                };
                match self.gateway.extract_tags(&source).await {
                    Ok(tags) => {
                        item.tags = tags.clone();
                        derived.tags = Some(tags);
                        dirty = true;
                    }
                    Err(e) => warn!("Tags for {} unavailable: {}", item.slug, e),
                }
            }
        }

        if !has_usable_body(&item) {
            if let Some(body) = &derived.body {
                item.body = Some(body.clone());
            } else {
                match self.gateway.generate_content(&item.title, &item.tags).await {
                    Ok(body) => {
                        item.body = Some(body.clone());
                        derived.body = Some(body);
                        dirty = true;
                    }
                    Err(e) => {
                        warn!("Body for {} unavailable: {}", item.slug, e);
                        item.body = Some(BODY_PLACEHOLDER.to_string());
                    }
                }
            }
        }

        if item.excerpt.is_none() {
            if let Some(excerpt) = &derived.excerpt {
                item.excerpt = Some(excerpt.clone());
            } else if item.body_text() == BODY_PLACEHOLDER {
                item.excerpt = Some(EXCERPT_PLACEHOLDER.to_string());
            } else {
                match self.gateway.summarize(item.body_text()).await {
                    Ok(summary) => {
                        item.excerpt = Some(summary.clone());
                        derived.excerpt = Some(summary);
                        dirty = true;
                    }
                    Err(e) => {
                        warn!("Excerpt for {} unavailable: {}", item.slug, e);
                        item.excerpt = Some(EXCERPT_PLACEHOLDER.to_string());
                    }
                }
            }
        }

        if dirty && self.persist_derived {
            match self.store.save_derived(&item.slug, &derived).await {
                Ok(()) => info!("Cached derived fields for {}", item.slug),
                Err(e) => warn!("Could not cache derived fields for {}: {}", item.slug, e),
            }
        }

        item
    }
}
