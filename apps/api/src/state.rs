use std::sync::Arc;

use crate::config::Config;
use crate::content::projects::ProjectStore;
use crate::content::skills::SkillProfile;
use crate::content::store::ContentStore;
use crate::enrichment::EnrichmentGateway;
use crate::markdown::MarkdownRenderer;
use crate::pipeline::{ContentResolver, CreationPipeline};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ContentStore>,
    pub resolver: Arc<ContentResolver>,
    pub creator: Arc<CreationPipeline>,
    /// Ephemeral: projects added at runtime are lost on restart.
    pub projects: Arc<ProjectStore>,
    pub skills: Arc<SkillProfile>,
    /// Pluggable gateway. Production: GenAiGateway over Gemini.
    pub gateway: Arc<dyn EnrichmentGateway>,
    pub renderer: Arc<MarkdownRenderer>,
    pub config: Config,
}

impl AppState {
    /// Wires the pipelines around one store, gateway and renderer.
    pub fn new(
        config: Config,
        store: Arc<dyn ContentStore>,
        gateway: Arc<dyn EnrichmentGateway>,
        projects: Arc<ProjectStore>,
        skills: Arc<SkillProfile>,
    ) -> Self {
        let renderer = Arc::new(MarkdownRenderer::site());
        let resolver = ContentResolver::new(store.clone(), gateway.clone(), renderer.clone())
            .with_persist_derived(config.persist_derived_fields)
            .with_list_concurrency(config.ai_max_concurrency);
        let creator = CreationPipeline::new(
            store.clone(),
            projects.clone(),
            gateway.clone(),
            config.creation_step_delay,
        );

        Self {
            store,
            resolver: Arc::new(resolver),
            creator: Arc::new(creator),
            projects,
            skills,
            gateway,
            renderer,
            config,
        }
    }
}
