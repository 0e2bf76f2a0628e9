//! Line sanitizer
//!
//! Turns a raw input line into the digit string that goes into the dial
//! string, or rejects it. International numbers keep their country code; no
//! rewriting happens.

/// Shortest digit string accepted as dialable
pub const MIN_DIALABLE_DIGITS: usize = 11;

/// Strip everything but ASCII digits and accept the result if it is long enough.
///
/// A leading `+` is dropped like any other non-digit.
///
/// ```rust
/// use autodial_call_engine::sanitize;
///
/// assert_eq!(sanitize("+44 (20) 7946-0958").as_deref(), Some("442079460958"));
/// assert_eq!(sanitize("0300 123"), None);
/// ```
pub fn sanitize(input: &str) -> Option<String> {
    let digits: String = input
        .trim()
        .chars()
        .filter(|c| c.is_ascii_digit())
        .collect();

    if digits.len() >= MIN_DIALABLE_DIGITS {
        Some(digits)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_accepts_international_formats_unchanged() {
        assert_eq!(sanitize("+2348012345678").as_deref(), Some("2348012345678"));
        assert_eq!(sanitize("  1-555-123-4567 ").as_deref(), Some("15551234567"));
        assert_eq!(sanitize("08012345678").as_deref(), Some("08012345678"));
    }

    #[test]
    fn test_rejects_short_and_empty() {
        assert_eq!(sanitize(""), None);
        assert_eq!(sanitize("+"), None);
        assert_eq!(sanitize("5551234567"), None);
        assert_eq!(sanitize("no digits at all"), None);
    }

    #[test]
    fn test_ignores_non_ascii_digits() {
        // Arabic-Indic digits are not dialable
        assert_eq!(sanitize("٠١٢٣٤٥٦٧٨٩٠"), None);
    }

    proptest! {
        #[test]
        fn sanitized_output_is_long_digit_string(input in ".*") {
            if let Some(number) = sanitize(&input) {
                prop_assert!(number.len() >= MIN_DIALABLE_DIGITS);
                prop_assert!(number.chars().all(|c| c.is_ascii_digit()));
            }
        }

        #[test]
        fn digits_survive_any_punctuation(digits in "[0-9]{11,15}", sep in "[ +()./-]{0,3}") {
            let decorated: String = digits
                .chars()
                .flat_map(|c| std::iter::once(c).chain(sep.chars()))
                .collect();
            prop_assert_eq!(sanitize(&decorated), Some(digits));
        }
    }
}
