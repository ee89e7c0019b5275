//! Clock-style time formatting

/// Format seconds as `H:MM:SS` when at least an hour, else `MM:SS`.
///
/// Fractions are truncated, so a countdown only shows `00:00` once it has
/// really run out.
pub fn format_clock(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    let h = total / 3600;
    let m = (total % 3600) / 60;
    let s = total % 60;

    if h > 0 {
        format!("{}:{:02}:{:02}", h, m, s)
    } else {
        format!("{:02}:{:02}", m, s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hours_use_long_form() {
        assert_eq!(format_clock(5025.0), "1:23:45");
        assert_eq!(format_clock(36_000.0), "10:00:00");
    }

    #[test]
    fn test_under_an_hour_uses_short_form() {
        assert_eq!(format_clock(65.0), "01:05");
        assert_eq!(format_clock(3599.0), "59:59");
    }

    #[test]
    fn test_fractions_truncate() {
        assert_eq!(format_clock(0.99), "00:00");
        assert_eq!(format_clock(59.999), "00:59");
    }

    #[test]
    fn test_negative_and_nan_render_zero() {
        assert_eq!(format_clock(-4.0), "00:00");
        assert_eq!(format_clock(f64::NAN), "00:00");
    }
}
