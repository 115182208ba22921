pub mod health;
pub mod site;

use axum::{
    routing::{get, post},
    Router,
};

use crate::content::handlers as content;
use crate::enrichment::handlers as chat;
use crate::pipeline::handlers as posts;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Posts
        .route(
            "/api/v1/posts",
            get(posts::handle_list_posts).post(posts::handle_create_post),
        )
        .route("/api/v1/posts/:slug", get(posts::handle_get_post))
        .route(
            "/api/v1/posts/:slug/related",
            get(posts::handle_related_posts),
        )
        .route("/api/v1/posts/:slug/speech", post(posts::handle_post_speech))
        // Projects, skills, résumé
        .route(
            "/api/v1/projects",
            get(content::handle_list_projects).post(posts::handle_create_project),
        )
        .route("/api/v1/projects/:slug", get(content::handle_get_project))
        .route("/api/v1/skills", get(content::handle_list_skills))
        .route("/api/v1/resume", get(content::handle_get_resume))
        // Chat
        .route("/api/v1/chat", post(chat::handle_chat))
        // Site generation
        .route("/api/v1/static-paths", get(site::handle_static_paths))
        .route("/sitemap.xml", get(site::handle_sitemap))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tempfile::TempDir;
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::content::projects::ProjectStore;
    use crate::content::skills::SkillProfile;
    use crate::content::store::FileContentStore;
    use crate::enrichment::testing::ScriptedGateway;

    const POST: &str = "---\ntitle: Incremental Models in dbt\npublishDate: 2024-04-02\n\
        excerpt: Only process what changed.\ntags:\n  - dbt\n  - SQL\n  - Snowflake\n---\n\n\
        ## Why incremental\n\nFull refreshes got slow once the events table passed a billion rows.\n\n\
        ```sql\nselect * from events where ts > (select max(ts) from {{ this }})\n```\n";

    async fn app(gateway: ScriptedGateway) -> (TempDir, Router) {
        let dir = TempDir::new().unwrap();
        let config = Config::for_tests(dir.path());
        std::fs::create_dir_all(&config.content_dir).unwrap();
        std::fs::write(config.content_dir.join("incremental-models-in-dbt.md"), POST).unwrap();
        std::fs::write(
            &config.resume_path,
            "---\nname: Jordan Lee\n---\n\n## Experience\n\nData engineer.\n",
        )
        .unwrap();

        let store = Arc::new(FileContentStore::open(&config.content_dir).await.unwrap());
        let state = AppState::new(
            config,
            store,
            Arc::new(gateway),
            Arc::new(ProjectStore::seeded()),
            Arc::new(SkillProfile::default()),
        );
        (dir, build_router(state))
    }

    async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    async fn get_json(router: &Router, uri: &str) -> (StatusCode, Value) {
        let (status, body) = send(router, Request::get(uri).body(Body::empty()).unwrap()).await;
        (status, serde_json::from_slice(&body).unwrap())
    }

    async fn post_json(router: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let (status, body) = send(router, request).await;
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let (_dir, router) = app(ScriptedGateway::new()).await;
        let (status, body) = get_json(&router, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["service"], "folio-api");
    }

    #[tokio::test]
    async fn test_get_post_renders_body() {
        let (_dir, router) = app(ScriptedGateway::new()).await;
        let (status, body) = get_json(&router, "/api/v1/posts/incremental-models-in-dbt").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["slug"], "incremental-models-in-dbt");
        assert_eq!(body["readTime"], 1);
        assert_eq!(body["renderedBody"]["status"], "ready");
        assert!(body["renderedBody"]["html"]
            .as_str()
            .unwrap()
            .contains("<h2>Why incremental</h2>"));
    }

    #[tokio::test]
    async fn test_unrenderable_post_is_still_served() {
        let (dir, router) = app(ScriptedGateway::new()).await;
        let body = "word ".repeat(crate::markdown::tree::MAX_MARKDOWN_BYTES / 5 + 10);
        let oversized = format!(
            "---\ntitle: Oversized\npublishDate: 2024-01-01\nexcerpt: Big.\n\
             tags:\n  - SQL\n  - dbt\n  - Spark\n---\n\n{body}\n"
        );
        std::fs::write(dir.path().join("posts/oversized.md"), oversized).unwrap();

        let (status, body) = get_json(&router, "/api/v1/posts/oversized").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["slug"], "oversized");
        assert_eq!(body["renderedBody"]["status"], "error");
    }

    #[tokio::test]
    async fn test_missing_post_is_404() {
        let (_dir, router) = app(ScriptedGateway::new()).await;
        let (status, body) = get_json(&router, "/api/v1/posts/does-not-exist").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_create_then_list_posts() {
        let (_dir, router) = app(ScriptedGateway::new()).await;

        let (status, created) = post_json(
            &router,
            "/api/v1/posts",
            json!({"title": "Partitioning Strategies", "tags": ["Spark"]}),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["slug"], "partitioning-strategies");

        let (status, list) = get_json(&router, "/api/v1/posts").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list.as_array().unwrap().len(), 2);

        let (status, body) = post_json(
            &router,
            "/api/v1/posts",
            json!({"title": "Partitioning Strategies"}),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "ALREADY_EXISTS");
    }

    #[tokio::test]
    async fn test_create_failure_is_502() {
        let (_dir, router) = app(ScriptedGateway::new().fail("generateContent")).await;
        let (status, body) =
            post_json(&router, "/api/v1/posts", json!({"title": "Never Written"})).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"]["code"], "ENRICHMENT_ERROR");
    }

    #[tokio::test]
    async fn test_speech_returns_wav_uri() {
        let (_dir, router) = app(ScriptedGateway::new()).await;
        let (status, body) = post_json(
            &router,
            "/api/v1/posts/incremental-models-in-dbt/speech",
            json!({}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["audioDataUri"]
            .as_str()
            .unwrap()
            .starts_with("data:audio/wav;base64,"));
    }

    #[tokio::test]
    async fn test_projects_and_skills() {
        let (_dir, router) = app(ScriptedGateway::new()).await;

        let (status, projects) = get_json(&router, "/api/v1/projects").await;
        assert_eq!(status, StatusCode::OK);
        let first = projects[0]["slug"].as_str().unwrap().to_string();

        let (status, detail) = get_json(&router, &format!("/api/v1/projects/{first}")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(detail["longDescriptionHtml"].as_str().unwrap().contains("<h2>"));

        let (status, skills) = get_json(&router, "/api/v1/skills").await;
        assert_eq!(status, StatusCode::OK);
        assert!(skills.as_array().unwrap().iter().any(|s| s["name"] == "SQL"));
    }

    #[tokio::test]
    async fn test_chat_rejects_blank_question() {
        let (_dir, router) = app(ScriptedGateway::new()).await;
        let (status, _) = post_json(&router, "/api/v1/chat", json!({"question": "  "})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) =
            post_json(&router, "/api/v1/chat", json!({"question": "What do you build?"})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["answer"], "You asked: What do you build?");
    }

    #[tokio::test]
    async fn test_resume_and_site_surface() {
        let (_dir, router) = app(ScriptedGateway::new()).await;

        let (status, resume) = get_json(&router, "/api/v1/resume").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(resume["metadata"]["name"], "Jordan Lee");

        let (status, paths) = get_json(&router, "/api/v1/static-paths").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(paths["posts"][0], "incremental-models-in-dbt");

        let (status, xml) = send(
            &router,
            Request::get("/sitemap.xml").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let xml = String::from_utf8(xml).unwrap();
        assert!(xml.contains("<loc>https://folio.test/blog/incremental-models-in-dbt</loc>"));
    }
}
