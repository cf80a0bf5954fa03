#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Canonical student keys.
//!
//! Submissions arrive as `studentkey_assignment[_LATE_...].ext` files while
//! the gradebook shows display names such as `Maria Jane Smith-Doe`. Both are
//! reduced to a key and compared with plain equality.

use std::path::Path;

use crate::constants::LATE_MARKER;

/// Errors raised while turning a raw name into a canonical key.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum NameError {
    /// A display name needs at least a first and a last name.
    #[error("Invalid name format: {0}")]
    InvalidNameFormat(String),
    /// The filename produced an empty key.
    #[error("Could not find a student key in file name `{0}`")]
    EmptyKey(String),
}

/// Resolves either a submission filename or a display name into a canonical
/// key.
///
/// Input without whitespace that contains `_` or carries a file extension is a
/// filename; everything else is a display name.
pub fn resolve(raw: &str) -> Result<String, NameError> {
    let trimmed = raw.trim();
    let single_token = !trimmed.contains(char::is_whitespace);
    let file_like = trimmed.contains('_') || Path::new(trimmed).extension().is_some();
    if single_token && file_like {
        key_from_filename(trimmed)
    } else {
        key_from_display_name(trimmed)
    }
}

/// Returns the substring before the first underscore, verbatim.
///
/// A filename without any underscore falls back to its stem.
pub fn key_from_filename(file_name: &str) -> Result<String, NameError> {
    let key = match file_name.split_once('_') {
        Some((head, _)) => head,
        None => Path::new(file_name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(file_name),
    };

    if key.is_empty() {
        return Err(NameError::EmptyKey(file_name.to_string()));
    }
    Ok(key.to_string())
}

/// Builds `lower(middle names + last name without hyphens + first name)`.
pub fn key_from_display_name(display_name: &str) -> Result<String, NameError> {
    let parts: Vec<&str> = display_name.split_whitespace().collect();
    let [first, middle @ .., last] = parts.as_slice() else {
        return Err(NameError::InvalidNameFormat(display_name.to_string()));
    };

    let key = format!("{}{}{}", middle.concat(), last.replace('-', ""), first);
    Ok(key.to_lowercase())
}

/// Whether the filename carries the late marker.
pub fn is_late(file_name: &str) -> bool {
    file_name.contains(LATE_MARKER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_token_display_name_is_rejected() {
        assert_eq!(
            key_from_display_name("Cher"),
            Err(NameError::InvalidNameFormat("Cher".into()))
        );
        assert!(key_from_display_name("   ").is_err());
    }

    #[test]
    fn two_token_display_name_has_no_middle() {
        assert_eq!(key_from_display_name("Ada Lovelace").unwrap(), "lovelaceada");
    }
}
