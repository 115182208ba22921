//! Creation pipeline: generates a complete post or project from a title.
//!
//! Flow: validate → derive slug → reserve slug → generate content →
//!       summarize → extract tags → generate image → assign date → persist.
//!
//! Provider calls run one after another with `step_delay` between them. Any
//! failure aborts before the single write at the end, so a failed creation
//! leaves no trace in either store.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use rand::Rng;
use tracing::info;

use crate::content::models::{image_hint_from_tags, normalize_tags, ContentItem, Project};
use crate::content::projects::ProjectStore;
use crate::content::slug::derive_slug;
use crate::content::store::{ContentStore, StoreError};
use crate::enrichment::EnrichmentGateway;
use crate::errors::AppError;

const MAX_TITLE_CHARS: usize = 200;
/// Publish dates are drawn from this many days back from today.
const PUBLISH_WINDOW_DAYS: i64 = 365;

// ────────────────────────────────────────────────────────────────────────────
// Slug reservations
// ────────────────────────────────────────────────────────────────────────────

/// In-process set of slugs whose creation is in flight. Stops two requests
/// for the same title from both paying for generation.
#[derive(Clone, Default)]
struct SlugReservations(Arc<Mutex<HashSet<String>>>);

/// Releases its slug on drop, whether creation succeeded or not.
struct Reservation {
    set: Arc<Mutex<HashSet<String>>>,
    key: String,
}

impl SlugReservations {
    fn reserve(&self, key: String) -> Option<Reservation> {
        let mut set = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        set.insert(key.clone()).then(|| Reservation {
            set: self.0.clone(),
            key,
        })
    }
}

impl Drop for Reservation {
    fn drop(&mut self) {
        self.set
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Pipeline
// ────────────────────────────────────────────────────────────────────────────

struct GeneratedFields {
    body: String,
    excerpt: String,
    tags: Vec<String>,
    image_url: String,
}

pub struct CreationPipeline {
    store: Arc<dyn ContentStore>,
    projects: Arc<ProjectStore>,
    gateway: Arc<dyn EnrichmentGateway>,
    step_delay: Duration,
    reservations: SlugReservations,
}

/// A uniformly random day within the past year, as `yyyy-mm-dd`.
pub fn random_publish_date<R: Rng + ?Sized>(today: NaiveDate, rng: &mut R) -> String {
    let days_back = rng.gen_range(0..=PUBLISH_WINDOW_DAYS);
    (today - chrono::Duration::days(days_back))
        .format("%Y-%m-%d")
        .to_string()
}

fn validate_title(title: &str) -> Result<(String, String), AppError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(AppError::Validation("title must not be empty".to_string()));
    }
    if title.chars().count() > MAX_TITLE_CHARS {
        return Err(AppError::Validation(format!(
            "title must be at most {MAX_TITLE_CHARS} characters"
        )));
    }
    let slug = derive_slug(title);
    if slug.is_empty() {
        return Err(AppError::Validation(format!(
            "title '{title}' does not produce a usable slug"
        )));
    }
    Ok((title.to_string(), slug))
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

impl CreationPipeline {
    pub fn new(
        store: Arc<dyn ContentStore>,
        projects: Arc<ProjectStore>,
        gateway: Arc<dyn EnrichmentGateway>,
        step_delay: Duration,
    ) -> Self {
        Self {
            store,
            projects,
            gateway,
            step_delay,
            reservations: SlugReservations::default(),
        }
    }

    async fn pause(&self) {
        if !self.step_delay.is_zero() {
            tokio::time::sleep(self.step_delay).await;
        }
    }

    async fn generate_fields(
        &self,
        title: &str,
        seed_tags: &[String],
    ) -> Result<GeneratedFields, AppError> {
        let body = self.gateway.generate_content(title, seed_tags).await?;
        self.pause().await;

        let excerpt = self.gateway.summarize(&body).await?;
        self.pause().await;

        // Model-refined tags replace the seed tags.
        let tags = self.gateway.extract_tags(&body).await?;
        self.pause().await;

        let topic = format!("{title}: {}", tags.join(", "));
        let image_url = self.gateway.generate_image(&topic).await?;

        Ok(GeneratedFields {
            body,
            excerpt,
            tags,
            image_url,
        })
    }

    /// Generates and persists a new post. Returns the stored item.
    pub async fn create_post(
        &self,
        title: &str,
        seed_tags: &[String],
    ) -> Result<ContentItem, AppError> {
        let (title, slug) = validate_title(title)?;
        let _reservation = self
            .reservations
            .reserve(format!("post:{slug}"))
            .ok_or_else(|| AppError::from(StoreError::AlreadyExists(slug.clone())))?;
        if self.store.contains(&slug).await? {
            return Err(StoreError::AlreadyExists(slug).into());
        }

        info!("Creating post '{}' ({})", title, slug);
        let fields = self.generate_fields(&title, &normalize_tags(seed_tags)).await?;
        let publish_date = random_publish_date(today(), &mut rand::thread_rng());

        let item = ContentItem {
            slug,
            title,
            excerpt: Some(fields.excerpt),
            image_hint: image_hint_from_tags(&fields.tags),
            tags: fields.tags,
            body: Some(fields.body),
            publish_date,
            image_url: Some(fields.image_url),
            read_time: None,
        };
        self.store.create_item(&item).await?;
        info!("Post {} created", item.slug);
        Ok(item)
    }

    /// Generates a new project and adds it to the project registry.
    pub async fn create_project(
        &self,
        title: &str,
        seed_tags: &[String],
    ) -> Result<Project, AppError> {
        let (title, slug) = validate_title(title)?;
        let _reservation = self
            .reservations
            .reserve(format!("project:{slug}"))
            .ok_or_else(|| AppError::from(StoreError::AlreadyExists(slug.clone())))?;
        if self.projects.contains(&slug).await {
            return Err(StoreError::AlreadyExists(slug).into());
        }

        info!("Creating project '{}' ({})", title, slug);
        let fields = self.generate_fields(&title, &normalize_tags(seed_tags)).await?;
        let publish_date = random_publish_date(today(), &mut rand::thread_rng());

        let project = Project {
            slug,
            title,
            short_description: fields.excerpt,
            long_description: Some(fields.body),
            image_hint: image_hint_from_tags(&fields.tags),
            tags: fields.tags,
            image_url: Some(fields.image_url),
            metrics: vec![],
            github_url: None,
            live_url: None,
            publish_date,
        };
        self.projects.add_project(project.clone()).await?;
        Ok(project)
    }
}
