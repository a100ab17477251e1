/// Clean a raw cell into a finite number.
///
/// Surrounding whitespace is trimmed, comma decimal separators become dots and
/// inner whitespace runs collapse to a single space before parsing. Anything
/// that still fails to parse, or parses to NaN/infinity, is missing.
pub fn clean_numeric(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let normalized = trimmed.replace(',', ".");
    let collapsed = normalized.split_whitespace().collect::<Vec<_>>().join(" ");

    collapsed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Truncate a numeric identifier to an integer the way catalog numbers are
/// written (`303.0` → `303`). Values outside the `i64` range are rejected.
pub fn identifier_integer(value: f64) -> Option<i64> {
    if !value.is_finite() {
        return None;
    }
    let truncated = value.trunc();
    if truncated.abs() >= i64::MAX as f64 {
        return None;
    }
    Some(truncated as i64)
}
