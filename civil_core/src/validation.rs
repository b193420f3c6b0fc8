//! Shared input checks for names and numeric fields.

use crate::errors::{CoreError, CoreResult, EntityKind};

/// Trim a user-entered name and reject empty or whitespace-only input.
pub fn normalize_name(kind: EntityKind, raw: &str) -> CoreResult<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(CoreError::empty_name(kind));
    }
    Ok(name.to_string())
}

/// Parse a form field as a finite number.
///
/// Accepts a decimal comma (`"25,5"`) since Turkish-locale users type it.
/// Non-numeric text is an `InvalidNumber` error, never coerced to zero.
pub fn parse_number(field: &str, text: &str) -> CoreResult<f64> {
    let trimmed = text.trim();
    let value: f64 = trimmed
        .replace(',', ".")
        .parse()
        .map_err(|_| CoreError::invalid_number(field, trimmed))?;
    if !value.is_finite() {
        return Err(CoreError::invalid_number(field, trimmed));
    }
    Ok(value)
}

/// Require a material property to be a positive finite number.
pub fn require_positive(field: &str, value: f64) -> CoreResult<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(CoreError::invalid_number(field, value.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_name() {
        assert_eq!(
            normalize_name(EntityKind::Material, "  Beton C25 ").unwrap(),
            "Beton C25"
        );
        assert_eq!(
            normalize_name(EntityKind::Profile, "   \t").unwrap_err(),
            CoreError::empty_name(EntityKind::Profile)
        );
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("fck", " 30 ").unwrap(), 30.0);
        assert_eq!(parse_number("fck", "27,5").unwrap(), 27.5);
        assert_eq!(
            parse_number("fck", "abc").unwrap_err().error_code(),
            "INVALID_NUMBER"
        );
        assert!(parse_number("fck", "").is_err());
        assert!(parse_number("fck", "inf").is_err());
        assert!(parse_number("fck", "NaN").is_err());
    }

    #[test]
    fn test_require_positive() {
        assert_eq!(require_positive("fyk", 420.0).unwrap(), 420.0);
        assert!(require_positive("fyk", 0.0).is_err());
        assert!(require_positive("fyk", -1.0).is_err());
        assert!(require_positive("fyk", f64::NAN).is_err());
    }
}
