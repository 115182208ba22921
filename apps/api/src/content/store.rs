//! Content Store: flat-file markdown posts with YAML front-matter.
//!
//! One file per post at `<dir>/<slug>.md`. AI-derived fields are cached in
//! sidecar JSON files under `<dir>/.derived/`, keyed by slug and a hash of the
//! stored body so an edited body invalidates its cache entry.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use gray_matter::engine::YAML;
use gray_matter::Matter;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

use crate::content::models::{normalize_tags, ContentItem};
use crate::content::slug::is_valid_slug;

const DERIVED_DIR: &str = ".derived";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("content item '{0}' not found")]
    NotFound(String),

    #[error("content item '{0}' already exists")]
    AlreadyExists(String),

    #[error("invalid front-matter in '{slug}': {message}")]
    FrontMatter { slug: String, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// AI-derived fields cached for one item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedFields {
    /// SHA-256 of the stored body the fields were derived from.
    pub content_hash: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl DerivedFields {
    pub fn for_hash(content_hash: String) -> Self {
        Self {
            content_hash,
            ..Default::default()
        }
    }
}

/// Hex SHA-256 of a stored body (absent bodies hash as empty).
pub fn content_hash(body: Option<&str>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(body.unwrap_or_default().as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Storage contract for posts.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Every item with raw (unvalidated, unenriched) fields, in enumeration order.
    async fn list_items(&self) -> Result<Vec<ContentItem>, StoreError>;

    async fn get_item(&self, slug: &str) -> Result<ContentItem, StoreError>;

    async fn contains(&self, slug: &str) -> Result<bool, StoreError>;

    /// Persists a new item. Fails with `AlreadyExists` without touching the
    /// existing entry when the slug is taken.
    async fn create_item(&self, item: &ContentItem) -> Result<String, StoreError>;

    async fn load_derived(&self, slug: &str) -> Result<Option<DerivedFields>, StoreError>;

    async fn save_derived(&self, slug: &str, fields: &DerivedFields) -> Result<(), StoreError>;
}

/// On-disk front-matter layout.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FrontMatter {
    title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    excerpt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    image_url: Option<String>,
    #[serde(default, rename = "aiHint", skip_serializing_if = "Option::is_none")]
    ai_hint: Option<String>,
    #[serde(default)]
    publish_date: String,
    #[serde(default)]
    tags: Vec<String>,
}

pub struct FileContentStore {
    dir: PathBuf,
}

impl FileContentStore {
    /// Opens (creating if needed) the store directory.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(dir.join(DERIVED_DIR)).await?;
        info!("Content store opened at {}", dir.display());
        Ok(Self { dir })
    }

    fn item_path(&self, slug: &str) -> PathBuf {
        self.dir.join(format!("{slug}.md"))
    }

    fn derived_path(&self, slug: &str) -> PathBuf {
        self.dir.join(DERIVED_DIR).join(format!("{slug}.json"))
    }

    async fn read_item(&self, path: &Path, slug: &str) -> Result<ContentItem, StoreError> {
        let raw = fs::read_to_string(path).await?;
        parse_item(slug, &raw)
    }
}

/// Parses one `<slug>.md` file.
fn parse_item(slug: &str, raw: &str) -> Result<ContentItem, StoreError> {
    let parsed = Matter::<YAML>::new().parse(raw);

    let front: FrontMatter = parsed
        .data
        .ok_or_else(|| StoreError::FrontMatter {
            slug: slug.to_string(),
            message: "no front-matter block".to_string(),
        })?
        .deserialize()
        .map_err(|e| StoreError::FrontMatter {
            slug: slug.to_string(),
            message: e.to_string(),
        })?;

    let body = parsed.content.trim();

    Ok(ContentItem {
        slug: slug.to_string(),
        title: front.title,
        excerpt: front.excerpt.filter(|e| !e.trim().is_empty()),
        tags: normalize_tags(front.tags),
        body: (!body.is_empty()).then(|| body.to_string()),
        publish_date: front.publish_date,
        image_url: front.image_url,
        image_hint: front.ai_hint,
        read_time: None,
    })
}

/// Serializes an item back into front-matter + body.
fn render_item(item: &ContentItem) -> Result<String, StoreError> {
    let front = FrontMatter {
        title: item.title.clone(),
        excerpt: item.excerpt.clone(),
        image_url: item.image_url.clone(),
        ai_hint: item.image_hint.clone(),
        publish_date: item.publish_date.clone(),
        tags: item.tags.clone(),
    };
    let yaml =
        serde_yaml::to_string(&front).map_err(|e| StoreError::Serialization(e.to_string()))?;
    Ok(format!("---\n{yaml}---\n\n{}\n", item.body_text().trim()))
}

#[async_trait]
impl ContentStore for FileContentStore {
    async fn list_items(&self) -> Result<Vec<ContentItem>, StoreError> {
        let mut paths = Vec::new();
        let mut entries = fs::read_dir(&self.dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) == Some("md") {
                paths.push(path);
            }
        }
        // read_dir order is platform-dependent; sort for a stable enumeration.
        paths.sort();

        let mut items = Vec::with_capacity(paths.len());
        for path in paths {
            let Some(slug) = path.file_stem().and_then(|s| s.to_str()).map(str::to_string) else {
                continue;
            };
            if !is_valid_slug(&slug) {
                warn!("Skipping {}: file name is not a valid slug", path.display());
                continue;
            }
            match self.read_item(&path, &slug).await {
                Ok(item) => items.push(item),
                Err(e) => warn!("Skipping {}: {}", path.display(), e),
            }
        }
        Ok(items)
    }

    async fn get_item(&self, slug: &str) -> Result<ContentItem, StoreError> {
        if !is_valid_slug(slug) {
            return Err(StoreError::NotFound(slug.to_string()));
        }
        match self.read_item(&self.item_path(slug), slug).await {
            Err(StoreError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(slug.to_string()))
            }
            other => other,
        }
    }

    async fn contains(&self, slug: &str) -> Result<bool, StoreError> {
        Ok(fs::try_exists(self.item_path(slug)).await?)
    }

    async fn create_item(&self, item: &ContentItem) -> Result<String, StoreError> {
        if !is_valid_slug(&item.slug) {
            return Err(StoreError::Serialization(format!(
                "'{}' is not a valid slug",
                item.slug
            )));
        }
        let contents = render_item(item)?;
        let path = self.item_path(&item.slug);

        // create_new makes the existence check and the reservation one atomic step.
        let mut file = match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                return Err(StoreError::AlreadyExists(item.slug.clone()));
            }
            Err(e) => return Err(e.into()),
        };

        let written = async {
            file.write_all(contents.as_bytes()).await?;
            file.flush().await
        }
        .await;

        if let Err(e) = written {
            // Never leave a half-written post behind.
            drop(file);
            let _ = fs::remove_file(&path).await;
            return Err(e.into());
        }

        info!("Created content item {}", item.slug);
        Ok(item.slug.clone())
    }

    async fn load_derived(&self, slug: &str) -> Result<Option<DerivedFields>, StoreError> {
        match fs::read(self.derived_path(slug)).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(|e| StoreError::Serialization(e.to_string())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save_derived(&self, slug: &str, fields: &DerivedFields) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(fields)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        let path = self.derived_path(slug);
        let dir = self.dir.join(DERIVED_DIR);

        // Each writer gets its own temp file; the rename is the commit point.
        tokio::task::spawn_blocking(move || -> Result<(), StoreError> {
            use std::io::Write;

            let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
            tmp.write_all(&json)?;
            tmp.persist(&path).map_err(|e| StoreError::Io(e.error))?;
            Ok(())
        })
        .await
        .map_err(|e| StoreError::Io(std::io::Error::other(e)))?
    }
}
