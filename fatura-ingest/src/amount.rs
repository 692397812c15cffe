//! Amount normalization for locale-formatted statement amounts.
//!
//! `.` and `,` may both appear. The last separator is the decimal point
//! only when it is followed by one or two trailing digits; every other
//! separator groups thousands.

use fatura_core::RecordError;

pub fn parse_amount(text: &str) -> Result<f64, RecordError> {
    let malformed = || RecordError::MalformedAmount(text.to_string());

    let trimmed = text.trim();
    let start = trimmed.find(|c: char| c.is_ascii_digit()).ok_or_else(malformed)?;
    let (marker, body) = trimmed.split_at(start);

    // Statement amounts are magnitudes; a sign here means the line is not one.
    if marker.contains(['-', '\u{2212}']) {
        return Err(malformed());
    }

    let body = body.trim_end_matches(|c: char| c == '.' || c == ',' || c.is_whitespace());
    if !body.chars().all(|c| c.is_ascii_digit() || c == '.' || c == ',') {
        return Err(malformed());
    }

    let digits_only = |s: &str| s.chars().filter(char::is_ascii_digit).collect::<String>();

    let normalized = match body.rfind(['.', ',']) {
        Some(idx) if (1..=2).contains(&(body.len() - idx - 1)) => {
            format!("{}.{}", digits_only(&body[..idx]), &body[idx + 1..])
        }
        _ => digits_only(body),
    };

    let value: f64 = normalized.parse().map_err(|_| malformed())?;
    if !value.is_finite() {
        return Err(malformed());
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comma_decimal() {
        assert_eq!(parse_amount("R$ 23,50"), Ok(23.50));
        assert_eq!(parse_amount("R$ 500,00"), Ok(500.0));
        assert_eq!(parse_amount("1.234,56"), Ok(1234.56));
    }

    #[test]
    fn test_dot_decimal() {
        assert_eq!(parse_amount("$1,234.56"), Ok(1234.56));
        assert_eq!(parse_amount("5.8"), Ok(5.8));
    }

    #[test]
    fn test_thousands_only() {
        assert_eq!(parse_amount("1,234"), Ok(1234.0));
        assert_eq!(parse_amount("1.234.567"), Ok(1234567.0));
        assert_eq!(parse_amount("42"), Ok(42.0));
    }

    #[test]
    fn test_trailing_separator_ignored() {
        assert_eq!(parse_amount("23,50."), Ok(23.50));
    }

    #[test]
    fn test_malformed() {
        assert!(matches!(parse_amount("R$"), Err(RecordError::MalformedAmount(_))));
        assert!(matches!(parse_amount(""), Err(RecordError::MalformedAmount(_))));
        assert!(matches!(parse_amount("-R$ 10,00"), Err(RecordError::MalformedAmount(_))));
        assert!(matches!(parse_amount("12a,00"), Err(RecordError::MalformedAmount(_))));
    }
}
