//! Shared helper functions for CLI commands

/// Format a value with a number of decimals suited to a reference precision
///
/// The reference is usually the spec band width or the worst-case range, so
/// a stackup toleranced in tenths prints three decimals and one toleranced in
/// microns prints up to six.
pub fn smart_round(value: f64, ref_precision: f64) -> String {
    let decimals = if ref_precision.is_finite() && ref_precision > 0.0 {
        ((-ref_precision.log10()).ceil() as i32 + 2).clamp(2, 6) as usize
    } else {
        4
    };
    format!("{:.*}", decimals, value)
}

/// Format an optional spec limit
pub fn format_limit(limit: Option<f64>, ref_precision: f64) -> String {
    match limit {
        Some(v) => smart_round(v, ref_precision),
        None => "none".to_string(),
    }
}

/// Truncate a string to max_len, adding "..." if truncated
///
/// Counts characters, not bytes, so multi-byte names never split.
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Horizontal bar of `width` cells scaled from `fraction` (0..=1)
pub fn bar(fraction: f64, width: usize) -> String {
    let cells = (fraction.clamp(0.0, 1.0) * width as f64).round() as usize;
    "█".repeat(cells)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smart_round() {
        // 0.2 band -> 3 decimals
        assert_eq!(smart_round(5.0, 0.2), "5.000");
        // coarse references clamp at 2 decimals
        assert_eq!(smart_round(1.23456, 10.0), "1.23");
        // fine references clamp at 6 decimals
        assert_eq!(smart_round(1.0, 1e-9), "1.000000");
        // unusable reference falls back to 4
        assert_eq!(smart_round(2.5, 0.0), "2.5000");
    }

    #[test]
    fn test_format_limit() {
        assert_eq!(format_limit(None, 0.2), "none");
        assert_eq!(format_limit(Some(0.5), 0.2), "0.500");
    }

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("hello", 10), "hello");
        assert_eq!(truncate_str("hello world", 8), "hello...");
        assert_eq!(truncate_str("hi", 2), "hi");
        assert_eq!(truncate_str("Ø-bore Ø-bore", 6), "Ø-b...");
    }

    #[test]
    fn test_bar() {
        assert_eq!(bar(0.5, 10), "█████");
        assert_eq!(bar(0.0, 10), "");
        assert_eq!(bar(2.0, 4), "████");
    }
}
