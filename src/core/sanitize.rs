//! Normalization of raw amount input

/// Reduces raw keystrokes to a decimal-number string.
///
/// Everything except ASCII digits and `.` is dropped. When more than one dot
/// survives, only the first one is kept and the remaining digits are folded
/// into the fractional part, so `"12.3.4abc"` becomes `"12.34"`.
pub fn sanitize_amount(raw: &str) -> String {
    let kept: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    if let Some((whole, fraction)) = kept.split_once('.')
        && fraction.contains('.')
    {
        return format!("{whole}.{}", fraction.replace('.', ""));
    }
    kept
}

/// Reads the numeric value of an amount field.
///
/// An empty field counts as zero. Anything that is not a plain decimal
/// (digits with at most one dot, at least one digit) is NaN.
pub fn parse_amount(text: &str) -> f64 {
    let text = text.trim();
    if text.is_empty() {
        return 0.0;
    }

    let well_formed = text.chars().all(|c| c.is_ascii_digit() || c == '.')
        && text.matches('.').count() <= 1
        && text.chars().any(|c| c.is_ascii_digit());
    if !well_formed {
        return f64::NAN;
    }

    text.parse::<f64>().unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_strips_letters_and_extra_dots() {
        assert_eq!(sanitize_amount("12.3.4abc"), "12.34");
        assert_eq!(sanitize_amount("1..2"), "1.2");
        assert_eq!(sanitize_amount("..5"), ".5");
        assert_eq!(sanitize_amount("$1,000"), "1000");
        assert_eq!(sanitize_amount("-42"), "42");
    }

    #[test]
    fn test_sanitize_keeps_valid_input() {
        assert_eq!(sanitize_amount("123.45"), "123.45");
        assert_eq!(sanitize_amount("12."), "12.");
        assert_eq!(sanitize_amount(""), "");
        assert_eq!(sanitize_amount("abc"), "");
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount(""), 0.0);
        assert_eq!(parse_amount("   "), 0.0);
        assert_eq!(parse_amount("10"), 10.0);
        assert_eq!(parse_amount("12."), 12.0);
        assert_eq!(parse_amount(".5"), 0.5);
        assert_eq!(parse_amount("007"), 7.0);
        assert!(parse_amount(".").is_nan());
        assert!(parse_amount("1.2.3").is_nan());
        assert!(parse_amount("inf").is_nan());
        assert!(parse_amount("1e3").is_nan());
    }
}
