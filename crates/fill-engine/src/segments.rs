//! Splitting postal codes and phone numbers across segment inputs.

fn digits(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).collect()
}

fn hyphen_parts(value: &str) -> Option<Vec<String>> {
    if !value.contains('-') {
        return None;
    }
    let parts: Vec<String> = value
        .split('-')
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect();
    (!parts.is_empty()).then_some(parts)
}

/// `1234567` -> `123`/`4567`; hyphenated input splits on the hyphen.
pub fn postal_segments(value: &str) -> Vec<String> {
    if let Some(parts) = hyphen_parts(value) {
        return parts;
    }
    let digits = digits(value);
    if digits.is_empty() {
        return Vec::new();
    }
    if digits.len() <= 3 {
        return vec![digits];
    }
    if digits.len() >= 7 {
        return vec![digits[..3].to_string(), digits[3..7].to_string()];
    }
    vec![digits[..3].to_string(), digits[3..].to_string()]
}

/// `09012345678` -> `090`/`1234`/`5678`; 5-9 digits give two segments,
/// shorter numbers one. Hyphenated input splits on the hyphen.
pub fn phone_segments(value: &str) -> Vec<String> {
    if let Some(parts) = hyphen_parts(value) {
        return parts;
    }
    let digits = digits(value);
    let n = digits.len();
    match n {
        0 => Vec::new(),
        n if n >= 10 => vec![
            digits[..3].to_string(),
            digits[3..n - 4].to_string(),
            digits[n - 4..].to_string(),
        ],
        5..=9 => vec![digits[..n - 4].to_string(), digits[n - 4..].to_string()],
        _ => vec![digits],
    }
}

/// Segments for a group of `slots` inputs: pairs take postal codes, triples phone numbers.
pub fn segments_for(value: &str, slots: usize) -> Vec<String> {
    let parts = if slots >= 3 {
        phone_segments(value)
    } else {
        postal_segments(value)
    };
    if parts.len() <= slots {
        return parts;
    }
    // More hyphenated parts than inputs: fall back to the digit rule.
    let digits = digits(value);
    if slots >= 3 {
        phone_segments(&digits)
    } else {
        postal_segments(&digits)
    }
}
