//! Validation rules for customer-supplied session input.

use crate::error::ValidationError;
use crate::value_objects::{Location, PhoneNumber};

/// Minimum alphabetic characters required in a name.
const MIN_NAME_LETTERS: usize = 2;

/// Minimum digits required in a phone number.
const MIN_PHONE_DIGITS: usize = 7;

/// Validates a customer name: at least two alphabetic characters.
///
/// Returns the trimmed name on success.
pub fn validate_name(input: &str) -> Result<String, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyInput);
    }

    let letters = trimmed.chars().filter(|c| c.is_alphabetic()).count();
    if letters < MIN_NAME_LETTERS {
        return Err(ValidationError::NameTooShort {
            min: MIN_NAME_LETTERS,
        });
    }

    Ok(trimmed.to_string())
}

/// Normalizes a phone number: strips everything but digits, keeps a
/// leading `+`, and requires at least seven digits.
pub fn normalize_phone(input: &str) -> Result<PhoneNumber, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyInput);
    }

    let mut normalized = String::with_capacity(trimmed.len());
    if trimmed.starts_with('+') {
        normalized.push('+');
    }
    normalized.extend(trimmed.chars().filter(|c| c.is_ascii_digit()));

    let digits = normalized.chars().filter(|c| c.is_ascii_digit()).count();
    if digits < MIN_PHONE_DIGITS {
        return Err(ValidationError::PhoneTooShort {
            min: MIN_PHONE_DIGITS,
        });
    }

    Ok(PhoneNumber::new_unchecked(normalized))
}

/// Parses a location: `lat,lon` coordinates when the text is a valid
/// pair within range, otherwise free text.
pub fn parse_location(input: &str) -> Result<Location, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyInput);
    }

    if let Some((lat_s, lon_s)) = trimmed.split_once(',')
        && let (Ok(lat), Ok(lon)) = (lat_s.trim().parse::<f64>(), lon_s.trim().parse::<f64>())
        && (-90.0..=90.0).contains(&lat)
        && (-180.0..=180.0).contains(&lon)
    {
        return Ok(Location::Point { lat, lon });
    }

    Ok(Location::Text(trimmed.to_string()))
}

/// Returns true for a purchase-intent utterance (thumbs-up or a
/// "yes"-like token).
///
/// Used only to re-prompt the current stage mid-session; intent is never
/// treated as stage input.
pub fn is_purchase_intent(text: &str) -> bool {
    let lowered = text.trim().to_lowercase();
    if lowered.contains('\u{1F44D}') {
        return true;
    }
    matches!(
        lowered.as_str(),
        "yes" | "ok" | "okay" | "ha" | "xop" | "mayli" | "да" | "хорошо" | "олайм" | "olaman"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_names() {
        assert_eq!(validate_name("Ali Valiyev").unwrap(), "Ali Valiyev");
        assert_eq!(validate_name("  Bo  ").unwrap(), "Bo");
    }

    #[test]
    fn test_name_too_short() {
        assert_eq!(
            validate_name("A1"),
            Err(ValidationError::NameTooShort { min: 2 })
        );
        assert_eq!(
            validate_name("123"),
            Err(ValidationError::NameTooShort { min: 2 })
        );
        assert_eq!(validate_name("   "), Err(ValidationError::EmptyInput));
    }

    #[test]
    fn test_phone_normalization() {
        let phone = normalize_phone("+998 90 123-45-67").unwrap();
        assert_eq!(phone.as_str(), "+998901234567");

        let phone = normalize_phone("(90) 123 45 67").unwrap();
        assert_eq!(phone.as_str(), "901234567");
    }

    #[test]
    fn test_phone_too_short() {
        assert_eq!(
            normalize_phone("+12345"),
            Err(ValidationError::PhoneTooShort { min: 7 })
        );
        assert_eq!(normalize_phone(""), Err(ValidationError::EmptyInput));
    }

    #[test]
    fn test_location_coordinates() {
        let loc = parse_location("41.2, 69.2").unwrap();
        assert_eq!(loc, Location::Point { lat: 41.2, lon: 69.2 });
    }

    #[test]
    fn test_location_free_text() {
        let loc = parse_location("Chilonzor 5, Tashkent").unwrap();
        // The leading segment is not a number pair, so the comma stays text.
        assert_eq!(loc, Location::Text("Chilonzor 5, Tashkent".to_string()));
    }

    #[test]
    fn test_location_out_of_range_falls_back_to_text() {
        let loc = parse_location("120.0,200.0").unwrap();
        assert_eq!(loc, Location::Text("120.0,200.0".to_string()));
    }

    #[test]
    fn test_purchase_intent() {
        assert!(is_purchase_intent("\u{1F44D}"));
        assert!(is_purchase_intent("Yes"));
        assert!(is_purchase_intent("xop"));
        assert!(!is_purchase_intent("no"));
        assert!(!is_purchase_intent("Ali Valiyev"));
    }
}
