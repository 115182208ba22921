use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::llm_client::DEFAULT_BASE_URL;

/// Per-call timeout bounds for AI provider calls, in seconds.
const MIN_AI_TIMEOUT_SECS: u64 = 10;
const MAX_AI_TIMEOUT_SECS: u64 = 30;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub ai_base_url: String,
    pub content_dir: PathBuf,
    pub resume_path: PathBuf,
    pub site_base_url: String,
    pub port: u16,
    pub rust_log: String,
    pub ai_timeout: Duration,
    pub ai_max_concurrency: usize,
    pub ai_min_interval: Duration,
    pub creation_step_delay: Duration,
    pub persist_derived_fields: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let timeout_secs: u64 = parse_env("AI_TIMEOUT_SECS", 30)?;

        Ok(Config {
            gemini_api_key: require_env("GEMINI_API_KEY")?,
            ai_base_url: optional_env("AI_BASE_URL", DEFAULT_BASE_URL),
            content_dir: PathBuf::from(optional_env("CONTENT_DIR", "content/posts")),
            resume_path: PathBuf::from(optional_env("RESUME_PATH", "content/resume.md")),
            site_base_url: optional_env("SITE_BASE_URL", "http://localhost:3000")
                .trim_end_matches('/')
                .to_string(),
            port: parse_env("PORT", 8080)?,
            rust_log: optional_env("RUST_LOG", "info"),
            ai_timeout: Duration::from_secs(
                timeout_secs.clamp(MIN_AI_TIMEOUT_SECS, MAX_AI_TIMEOUT_SECS),
            ),
            ai_max_concurrency: parse_env::<usize>("AI_MAX_CONCURRENCY", 4)?.max(1),
            ai_min_interval: Duration::from_millis(parse_env("AI_MIN_INTERVAL_MS", 250)?),
            creation_step_delay: Duration::from_millis(parse_env("CREATION_STEP_DELAY_MS", 1000)?),
            persist_derived_fields: parse_env("PERSIST_DERIVED_FIELDS", true)?,
        })
    }
}

#[cfg(test)]
impl Config {
    /// Defaults with no provider key; paths point into a test directory.
    pub fn for_tests(dir: &std::path::Path) -> Self {
        Config {
            gemini_api_key: String::new(),
            ai_base_url: "http://127.0.0.1:0".to_string(),
            content_dir: dir.join("posts"),
            resume_path: dir.join("resume.md"),
            site_base_url: "https://folio.test".to_string(),
            port: 0,
            rust_log: "debug".to_string(),
            ai_timeout: Duration::from_secs(MIN_AI_TIMEOUT_SECS),
            ai_max_concurrency: 2,
            ai_min_interval: Duration::ZERO,
            creation_step_delay: Duration::ZERO,
            persist_derived_fields: true,
        }
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value: '{raw}'")),
        Err(_) => Ok(default),
    }
}
