//! Validation helpers for DTOs.

use validator::ValidationError;

use crate::dao::models::parse_date;

const MAX_NAME_LEN: usize = 120;

/// Validates that a display name is not blank and at most 120 characters.
///
/// # Examples
///
/// ```ignore
/// validate_name("Sunday league") // Ok
/// validate_name("   ")           // Err - blank
/// ```
pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        let mut err = ValidationError::new("name_blank");
        err.message = Some("Name must not be blank".into());
        return Err(err);
    }

    let len = trimmed.chars().count();
    if len > MAX_NAME_LEN {
        let mut err = ValidationError::new("name_length");
        err.message =
            Some(format!("Name must be at most {MAX_NAME_LEN} characters (got {len})").into());
        return Err(err);
    }

    Ok(())
}

/// Validates a calendar date written as `YYYY-MM-DD`.
pub fn validate_date(raw: &str) -> Result<(), ValidationError> {
    parse_date(raw).map(|_| ()).map_err(|parse_err| {
        let mut err = ValidationError::new("date_format");
        err.message = Some(format!("Date must be formatted as YYYY-MM-DD ({parse_err})").into());
        err
    })
}

/// Validates a phone number: digits with optional leading `+`, spaces or dashes, 6 to 20 digits.
pub fn validate_phone(raw: &str) -> Result<(), ValidationError> {
    let body = raw.strip_prefix('+').unwrap_or(raw);
    let allowed = body
        .chars()
        .all(|c| c.is_ascii_digit() || c == ' ' || c == '-');
    let digits = body.chars().filter(char::is_ascii_digit).count();

    if !allowed || !(6..=20).contains(&digits) {
        let mut err = ValidationError::new("phone_format");
        err.message = Some("Phone must contain 6 to 20 digits".into());
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert!(validate_name("Domino Club").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("  \t ").is_err());
        assert!(validate_name(&"x".repeat(121)).is_err());
        assert!(validate_name(&"x".repeat(120)).is_ok());
    }

    #[test]
    fn test_validate_date() {
        assert!(validate_date("2025-01-31").is_ok());
        assert!(validate_date("2025-02-30").is_err()); // not a day
        assert!(validate_date("31/01/2025").is_err());
    }

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("+53 5555-1234").is_ok());
        assert!(validate_phone("123").is_err()); // too short
        assert!(validate_phone("55a5555").is_err());
    }
}
