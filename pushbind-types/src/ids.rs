//! Identifier normalization.
//!
//! Push SDKs and session stores hand back identifiers that may be empty,
//! whitespace, or the literal string `"null"` when they are not ready.
//! All of those mean "absent".

/// Returns `None` for blank or `"null"` identifiers, the trimmed value otherwise.
pub fn normalize_id(value: Option<String>) -> Option<String> {
    normalize_id_ref(value.as_deref())
}

/// Borrowing variant of [`normalize_id`].
pub fn normalize_id_ref(value: Option<&str>) -> Option<String> {
    let trimmed = value?.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("null") {
        None
    } else {
        Some(trimmed.to_string())
    }
}
