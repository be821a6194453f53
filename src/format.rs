//! Display formatting shared by the extractor and the views.

/// Format a number of seconds as `M:SS`.
///
/// Minutes are not padded and grow past 59 (`75:00`). Negative, NaN and
/// infinite inputs render as `0:00`.
pub fn format_duration(seconds: f64) -> String {
    if !seconds.is_finite() || seconds <= 0.0 {
        return "0:00".to_string();
    }
    let total = seconds.floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}
