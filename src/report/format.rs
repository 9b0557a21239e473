//! Number formatting for table cells.

/// Format a number like JavaScript's `Number.prototype.toExponential()`
/// without a digits argument: shortest round-trip mantissa and a signed
/// exponent, e.g. `12345` -> `1.2345e+4`.
pub fn to_exponential(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if value == 0.0 {
        // Negative zero renders unsigned.
        return "0e+0".to_string();
    }

    let formatted = format!("{:e}", value);
    match formatted.split_once('e') {
        Some((mantissa, exponent)) if !exponent.starts_with('-') => {
            format!("{}e+{}", mantissa, exponent)
        }
        _ => formatted,
    }
}

/// Plain shortest representation (`5` rather than `5.0`).
pub fn format_plain(value: f64) -> String {
    if value == 0.0 {
        // Avoid rendering "-0".
        return "0".to_string();
    }
    format!("{}", value)
}

/// Parse a cell's text as a finite number.
pub fn parse_numeric(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Reformat numeric text in exponential notation; other text is returned
/// unchanged. Applying it twice gives the same result as applying it once.
pub fn reformat_scientific(text: &str) -> String {
    match parse_numeric(text) {
        Some(value) => to_exponential(value),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_exponential_matches_js_style() {
        assert_eq!(to_exponential(12345.0), "1.2345e+4");
        assert_eq!(to_exponential(0.00015), "1.5e-4");
        assert_eq!(to_exponential(-5.0), "-5e+0");
        assert_eq!(to_exponential(0.0), "0e+0");
        assert_eq!(to_exponential(-0.0), "0e+0");
        assert_eq!(to_exponential(f64::INFINITY), "Infinity");
    }

    #[test]
    fn test_format_plain() {
        assert_eq!(format_plain(5.0), "5");
        assert_eq!(format_plain(-0.0), "0");
        assert_eq!(format_plain(2.5), "2.5");
    }

    #[test]
    fn test_parse_numeric() {
        assert_eq!(parse_numeric(" 42 "), Some(42.0));
        assert_eq!(parse_numeric("1.5e+3"), Some(1500.0));
        assert_eq!(parse_numeric("cityA"), None);
        assert_eq!(parse_numeric(""), None);
        assert_eq!(parse_numeric("NaN"), None);
    }

    #[test]
    fn test_reformat_scientific_is_idempotent() {
        let once = reformat_scientific("98765.4321");
        let twice = reformat_scientific(&once);
        assert_eq!(once, "9.87654321e+4");
        assert_eq!(once, twice);
        assert_eq!(reformat_scientific("cityA"), "cityA");
    }
}
