//! Project registry.
//!
//! Intentionally ephemeral: projects live in memory, seeded at startup, and
//! anything added at runtime is lost on restart. Writers go through the
//! `RwLock` so concurrent additions cannot lose updates.

use tokio::sync::RwLock;
use tracing::info;

use crate::content::models::{MetricUnit, Project, ProjectMetric};
use crate::content::store::StoreError;

pub struct ProjectStore {
    projects: RwLock<Vec<Project>>,
}

impl ProjectStore {
    pub fn new(seed: Vec<Project>) -> Self {
        Self {
            projects: RwLock::new(seed),
        }
    }

    /// Store pre-populated with the portfolio's showcase projects.
    pub fn seeded() -> Self {
        Self::new(seed_projects())
    }

    /// Newest first.
    pub async fn list(&self) -> Vec<Project> {
        self.projects.read().await.clone()
    }

    pub async fn get(&self, slug: &str) -> Option<Project> {
        self.projects
            .read()
            .await
            .iter()
            .find(|p| p.slug == slug)
            .cloned()
    }

    pub async fn contains(&self, slug: &str) -> bool {
        self.projects.read().await.iter().any(|p| p.slug == slug)
    }

    /// Adds a project at the front of the list. The uniqueness check and the
    /// insert happen under one write lock.
    pub async fn add_project(&self, project: Project) -> Result<(), StoreError> {
        let mut projects = self.projects.write().await;
        if projects.iter().any(|p| p.slug == project.slug) {
            return Err(StoreError::AlreadyExists(project.slug));
        }
        info!("Added project {}", project.slug);
        projects.insert(0, project);
        Ok(())
    }
}

fn metric(label: &str, value: f64, unit: MetricUnit, description: &str) -> ProjectMetric {
    ProjectMetric {
        label: label.to_string(),
        value,
        unit,
        description: description.to_string(),
    }
}

fn seed_projects() -> Vec<Project> {
    vec![
        Project {
            slug: "real-time-fraud-detection-pipeline".to_string(),
            title: "Real-Time Fraud Detection Pipeline".to_string(),
            short_description: "Streaming pipeline scoring card transactions in under a second."
                .to_string(),
            long_description: Some(
                "## Overview\n\nA Kafka and Spark Structured Streaming pipeline that scores \
                 every card transaction against a gradient-boosted model.\n\n\
                 ## Results\n\n- Sub-second scoring latency\n- Automated alerting for analysts\n"
                    .to_string(),
            ),
            tags: vec![
                "Kafka".to_string(),
                "Spark".to_string(),
                "Python".to_string(),
            ],
            image_url: None,
            image_hint: Some("fraud detection".to_string()),
            metrics: vec![
                metric(
                    "Fraud losses prevented",
                    1_200_000.0,
                    MetricUnit::Usd,
                    "Annualized chargebacks avoided after launch",
                ),
                metric(
                    "Detection rate",
                    94.0,
                    MetricUnit::Percentage,
                    "Share of confirmed fraud flagged before settlement",
                ),
            ],
            github_url: None,
            live_url: None,
            publish_date: "2024-02-12".to_string(),
        },
        Project {
            slug: "warehouse-cost-optimizer".to_string(),
            title: "Warehouse Cost Optimizer".to_string(),
            short_description: "dbt models and scheduling changes that halved warehouse spend."
                .to_string(),
            long_description: Some(
                "## Overview\n\nIncremental dbt models, clustering keys and workload \
                 isolation for a Snowflake warehouse.\n\n```sql\nSELECT warehouse_name, \
                 SUM(credits_used) FROM metering_history GROUP BY 1;\n```\n"
                    .to_string(),
            ),
            tags: vec![
                "dbt".to_string(),
                "Snowflake".to_string(),
                "SQL".to_string(),
            ],
            image_url: None,
            image_hint: Some("cloud costs".to_string()),
            metrics: vec![
                metric(
                    "Monthly savings",
                    18_000.0,
                    MetricUnit::Usd,
                    "Reduction in warehouse credits",
                ),
                metric(
                    "Engineering hours saved",
                    40.0,
                    MetricUnit::Hours,
                    "Per month, from removing manual backfills",
                ),
                metric(
                    "Models migrated",
                    120.0,
                    MetricUnit::Count,
                    "Legacy SQL scripts converted to dbt",
                ),
            ],
            github_url: Some("https://github.com/example/warehouse-cost-optimizer".to_string()),
            live_url: None,
            publish_date: "2023-09-30".to_string(),
        },
    ]
}
