//! Formatting helpers shared by the reconciliation and comparison engines.

/// Formats a lap duration in seconds as `M:SS.sss`.
///
/// Non-positive durations have no meaningful rendering and come back as the
/// `"-"` placeholder, matching the rest of the view model's missing-data
/// convention.
pub fn format_lap_time(duration: f64) -> String {
    if duration <= 0.0 || !duration.is_finite() {
        return "-".to_string();
    }
    let minutes = (duration / 60.0).floor() as u32;
    let seconds = duration % 60.0;
    format!("{minutes}:{seconds:06.3}")
}

/// Formats a sector duration with millisecond precision, or `"-"` when the
/// value is absent or non-positive.
pub fn format_sector_time(duration: Option<f64>) -> String {
    match duration {
        Some(d) if d > 0.0 && d.is_finite() => format!("{d:.3}"),
        _ => "-".to_string(),
    }
}

/// Parses an `M:SS.sss` lap-time string back into total seconds.
///
/// Returns `None` for the `"-"` placeholder or anything else that does not
/// follow the format.
pub fn parse_lap_time(text: &str) -> Option<f64> {
    let (minutes, seconds) = text.split_once(':')?;
    let minutes: f64 = minutes.parse().ok()?;
    let seconds: f64 = seconds.parse().ok()?;
    Some(minutes * 60.0 + seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lap_times_render_with_padded_seconds() {
        assert_eq!(format_lap_time(91.234), "1:31.234");
        assert_eq!(format_lap_time(65.001), "1:05.001");
        assert_eq!(format_lap_time(125.5), "2:05.500");
    }

    #[test]
    fn missing_durations_render_as_placeholder() {
        assert_eq!(format_lap_time(0.0), "-");
        assert_eq!(format_lap_time(-1.0), "-");
        assert_eq!(format_sector_time(None), "-");
        assert_eq!(format_sector_time(Some(0.0)), "-");
        assert_eq!(format_sector_time(Some(28.441)), "28.441");
    }

    #[test]
    fn parse_inverts_format_for_valid_times() {
        for duration in [91.234, 65.001, 125.5, 59.999] {
            let parsed = parse_lap_time(&format_lap_time(duration)).unwrap();
            assert!((parsed - duration).abs() < 1e-6);
        }
        assert_eq!(parse_lap_time("-"), None);
        assert_eq!(parse_lap_time("91.234"), None);
    }
}
