//! Input sanitization helpers.

/// Strip control characters other than newline and tab.
///
/// Scenario text ends up inside a generation prompt and in Firestore, so
/// escape sequences and NULs are dropped before validation.
pub fn sanitize_string(input: &str) -> String {
    input
        .chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect()
}

/// Project ids are UUIDs we mint, but older clients used shorter slugs.
///
/// Valid format: ASCII alphanumerics, hyphens and underscores, 1-64 chars.
/// Anything else could escape the Firestore document path.
pub fn is_valid_project_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= 64
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
