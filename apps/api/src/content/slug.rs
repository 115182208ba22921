/// Derives a URL-safe slug from a title.
///
/// Lowercases, drops everything except ASCII alphanumerics, whitespace and
/// hyphens, then joins the remaining words with single hyphens.
pub fn derive_slug(title: &str) -> String {
    let kept: String = title
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace() || *c == '-')
        .collect();

    kept.split(|c: char| c.is_whitespace() || c == '-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// True when `slug` is something `derive_slug` could have produced.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty() && derive_slug(slug) == slug
}
