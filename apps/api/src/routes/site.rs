//! Site generation surface: sitemap and build-time path enumeration.
//!
//! Both read the raw store listing. Neither needs enrichment, so neither
//! triggers provider calls.

use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
    Json,
};
use serde::Serialize;

use crate::content::models::{ContentItem, Project};
use crate::errors::AppError;
use crate::markdown::html::escape_html;
use crate::pipeline::resolver::sort_newest_first;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct StaticPaths {
    pub posts: Vec<String>,
    pub projects: Vec<String>,
}

struct SitemapEntry {
    loc: String,
    lastmod: Option<String>,
}

fn sitemap_xml(base_url: &str, posts: &[ContentItem], projects: &[Project]) -> String {
    let mut entries = vec![
        SitemapEntry {
            loc: format!("{base_url}/"),
            lastmod: None,
        },
        SitemapEntry {
            loc: format!("{base_url}/blog"),
            lastmod: posts.first().map(|p| p.publish_date.clone()),
        },
        SitemapEntry {
            loc: format!("{base_url}/resume"),
            lastmod: None,
        },
    ];
    entries.extend(posts.iter().map(|post| SitemapEntry {
        loc: format!("{base_url}/blog/{}", post.slug),
        lastmod: Some(post.publish_date.clone()),
    }));
    entries.extend(projects.iter().map(|project| SitemapEntry {
        loc: format!("{base_url}/projects/{}", project.slug),
        lastmod: Some(project.publish_date.clone()),
    }));

    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
    );
    for entry in entries {
        xml.push_str("  <url>\n");
        xml.push_str(&format!("    <loc>{}</loc>\n", escape_html(&entry.loc)));
        if let Some(lastmod) = entry.lastmod.filter(|d| !d.is_empty()) {
            xml.push_str(&format!("    <lastmod>{}</lastmod>\n", escape_html(&lastmod)));
        }
        xml.push_str("  </url>\n");
    }
    xml.push_str("</urlset>\n");
    xml
}

/// GET /sitemap.xml
pub async fn handle_sitemap(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let mut posts = state.store.list_items().await?;
    sort_newest_first(&mut posts);
    let projects = state.projects.list().await;

    Ok((
        [(header::CONTENT_TYPE, "application/xml; charset=utf-8")],
        sitemap_xml(&state.config.site_base_url, &posts, &projects),
    ))
}

/// GET /api/v1/static-paths
pub async fn handle_static_paths(
    State(state): State<AppState>,
) -> Result<Json<StaticPaths>, AppError> {
    let posts = state
        .store
        .list_items()
        .await?
        .into_iter()
        .map(|item| item.slug)
        .collect();
    let projects = state
        .projects
        .list()
        .await
        .into_iter()
        .map(|project| project.slug)
        .collect();
    Ok(Json(StaticPaths { posts, projects }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(slug: &str, date: &str) -> ContentItem {
        ContentItem {
            slug: slug.to_string(),
            title: slug.to_string(),
            excerpt: None,
            tags: vec![],
            body: None,
            publish_date: date.to_string(),
            image_url: None,
            image_hint: None,
            read_time: None,
        }
    }

    #[test]
    fn test_sitemap_lists_posts_with_lastmod() {
        let xml = sitemap_xml(
            "https://example.dev",
            &[item("newest", "2024-05-01"), item("older", "2023-01-01")],
            &[],
        );
        assert!(xml.starts_with("<?xml"));
        assert!(xml.contains("<loc>https://example.dev/blog/newest</loc>"));
        assert!(xml.contains("<lastmod>2024-05-01</lastmod>"));
        assert_eq!(xml.matches("<url>").count(), 5);
    }

    #[test]
    fn test_sitemap_skips_empty_lastmod() {
        let xml = sitemap_xml("https://example.dev", &[item("undated", "")], &[]);
        assert!(!xml.contains("<lastmod></lastmod>"));
    }
}
