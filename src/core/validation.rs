//! Input validation rules
//!
//! Every write goes through these checks before it reaches the store. They are
//! pure functions so the repositories and the HTTP layer share one definition.

use serde_json::Value;
use crate::core::error::ValidationError;

/// Check an asset upload against an extension allow-list.
///
/// Content is checked first, so an empty file is reported as such whatever its
/// name. The extension match is a case-sensitive suffix match.
pub fn validate_asset_upload(
    filename: &str,
    content: &[u8],
    allowed_extensions: &[&str],
) -> Result<(), ValidationError> {
    if content.is_empty() {
        return Err(ValidationError::EmptyContent);
    }
    if !allowed_extensions.iter().any(|ext| filename.ends_with(ext)) {
        return Err(ValidationError::UnsupportedExtension {
            filename: filename.to_string(),
        });
    }
    Ok(())
}

/// Check a score submission and return the score as an integer.
///
/// `score` is the raw JSON value so that strings, floats and nulls can be told
/// apart from integers.
pub fn validate_score(player_name: &str, score: &Value) -> Result<i64, ValidationError> {
    if player_name.is_empty() {
        return Err(ValidationError::MissingName);
    }
    let score = match score {
        Value::Number(n) => match n.as_i64() {
            Some(v) => v,
            None if n.is_u64() => return Err(ValidationError::ScoreOutOfRange),
            None => return Err(ValidationError::NonIntegerScore),
        },
        _ => return Err(ValidationError::NonIntegerScore),
    };
    if score < 0 {
        return Err(ValidationError::NegativeScore);
    }
    Ok(score)
}

/// Strip every character outside `[A-Za-z0-9 ]`.
pub fn sanitize_player_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == ' ')
        .collect()
}

/// Validate, sanitize, then re-check the sanitized name.
///
/// Returns the name and score exactly as they will be persisted.
pub fn prepare_score(player_name: &str, score: &Value) -> Result<(String, i64), ValidationError> {
    let score = validate_score(player_name, score)?;
    let name = sanitize_player_name(player_name);
    if name.is_empty() {
        return Err(ValidationError::NameEmptyAfterSanitization);
    }
    Ok((name, score))
}
