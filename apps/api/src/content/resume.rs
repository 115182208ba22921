use std::path::Path;

use gray_matter::engine::YAML;
use gray_matter::Matter;
use serde::Serialize;
use serde_json::Value;

use crate::errors::AppError;
use crate::markdown::MarkdownRenderer;

/// The résumé page: front-matter passed through as metadata, body as HTML.
#[derive(Debug, Clone, Serialize)]
pub struct Resume {
    pub metadata: Value,
    pub html: String,
}

pub async fn load_resume(path: &Path, renderer: &MarkdownRenderer) -> Result<Resume, AppError> {
    let raw = match tokio::fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(AppError::NotFound("Résumé not found".to_string()));
        }
        Err(e) => return Err(AppError::Storage(e.to_string())),
    };

    let parsed = Matter::<YAML>::new().parse(&raw);
    let metadata = match parsed.data {
        Some(data) => data
            .deserialize::<Value>()
            .map_err(|e| AppError::Storage(format!("Invalid résumé front-matter: {e}")))?,
        None => Value::Object(Default::default()),
    };

    let html = renderer.render(&parsed.content)?.to_html();

    Ok(Resume { metadata, html })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_resume_front_matter_passes_through() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("resume.md");
        std::fs::write(
            &path,
            "---\nname: Jordan Lee\nrole: Data Engineer\n---\n\n## Experience\n\n- Built pipelines\n",
        )
        .unwrap();

        let resume = load_resume(&path, &MarkdownRenderer::site()).await.unwrap();
        assert_eq!(resume.metadata["name"], "Jordan Lee");
        assert_eq!(resume.metadata["role"], "Data Engineer");
        assert!(resume.html.contains("<h2>Experience</h2>"));
        assert!(resume.html.contains("<li>Built pipelines</li>"));
    }

    #[tokio::test]
    async fn test_missing_resume_is_not_found() {
        let dir = TempDir::new().unwrap();
        let err = load_resume(&dir.path().join("missing.md"), &MarkdownRenderer::site())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
