//! Validation helpers for DTOs.

use validator::ValidationError;

/// Validates an identifier used inside animation keys.
///
/// Identifiers must be non-empty and free of `:` since keys are
/// `type:gameId:entityId`.
///
/// # Examples
///
/// ```ignore
/// validate_identifier("clue-42")  // Ok
/// validate_identifier("")         // Err - empty
/// validate_identifier("a:b")      // Err - separator
/// ```
pub fn validate_identifier(id: &str) -> Result<(), ValidationError> {
    if id.trim().is_empty() {
        let mut err = ValidationError::new("identifier_empty");
        err.message = Some("Identifier must not be blank".into());
        return Err(err);
    }

    if id.contains(':') {
        let mut err = ValidationError::new("identifier_separator");
        err.message = Some(format!("Identifier must not contain ':' (got {id})").into());
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_identifier_valid() {
        assert!(validate_identifier("c42").is_ok());
        assert!(validate_identifier("player-7").is_ok());
        assert!(validate_identifier("3f0b9a1e-5c1d-4c43-8f4c-1d2b3c4d5e6f").is_ok());
    }

    #[test]
    fn test_validate_identifier_invalid() {
        assert!(validate_identifier("").is_err());
        assert!(validate_identifier("   ").is_err());
        assert!(validate_identifier("g1:c1").is_err());
    }
}
