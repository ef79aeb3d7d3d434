//! URL slug helpers for courses and roadmaps.

/// Lower-case, kebab-case slug of `text`.
///
/// Runs of non-alphanumeric characters collapse into a single `-`; leading
/// and trailing separators are dropped.
///
/// ```
/// use learnlabs_core::slug::slugify;
///
/// assert_eq!(slugify("Intro to Rust: Ownership!"), "intro-to-rust-ownership");
/// assert_eq!(slugify("  C++ & Go  "), "c-go");
/// ```
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;

    for ch in text.chars() {
        if ch.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(ch.to_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug
}

/// Slug of `text` with a short random suffix, so repeated generations for the
/// same topic produce distinct course rows.
pub fn unique_slug(text: &str) -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    let base = slugify(text);
    if base.is_empty() {
        suffix[..8].to_string()
    } else {
        format!("{base}-{}", &suffix[..8])
    }
}
