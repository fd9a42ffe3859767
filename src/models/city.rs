//! City name normalization
//!
//! City names arrive as free text and are stored with inconsistent casing,
//! so all matching happens on the trimmed, lowercased form. `CityName` is
//! the only way a city value reaches the query layer.

use super::ValidationError;

/// A normalized city name: trimmed and lowercased at construction.
///
/// Guarantees that `"Paris"`, `"paris "` and `"PARIS"` all compare equal
/// against a `LOWER(ville)` column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CityName(String);

impl CityName {
    /// Normalize a raw city value. Rejects empty or all-whitespace input.
    pub fn new(raw: &str) -> Result<Self, ValidationError> {
        let normalized = raw.trim().to_lowercase();
        if normalized.is_empty() {
            return Err(ValidationError::Empty { field: "city" });
        }
        Ok(Self(normalized))
    }

    /// The normalized form, suitable for binding against `LOWER(ville)`.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Re-capitalize a normalized city name for display: first letter
/// uppercased, the rest left as stored.
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
