//! URL slug generation for events.
//!
//! Slugs are lowercase ASCII alphanumerics with single `-` separators. Every
//! run of other characters collapses to one `-`, and leading/trailing
//! separators are stripped, so `slugify` is idempotent on its own output.

/// Turn an arbitrary title into a URL-safe slug.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_separator = false;
    for c in input.chars() {
        let c = c.to_ascii_lowercase();
        if c.is_ascii_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.push(c);
        } else {
            pending_separator = true;
        }
    }
    slug
}

/// Disambiguate a colliding slug by appending an epoch-millis suffix.
pub fn with_millis_suffix(slug: &str, epoch_millis: i64) -> String {
    format!("{slug}-{epoch_millis}")
}
