use repline::summary::SessionSummary;

/// Bars for the summary chart: active vs rest seconds
pub fn summary_bars(summary: &SessionSummary) -> [(&'static str, u64); 2] {
    [
        ("Active", summary.active_duration_secs),
        ("Rest", summary.rest_duration_secs),
    ]
}

/// Share of planned time spent moving, as a whole percentage
pub fn active_percent(summary: &SessionSummary) -> u64 {
    let planned = summary.active_duration_secs + summary.rest_duration_secs;
    if planned == 0 {
        return 0;
    }
    ((summary.active_duration_secs as f64 / planned as f64) * 100.0).round() as u64
}

/// Fraction of a timed exercise already done, clamped to `0.0..=1.0`
pub fn exercise_progress(duration_secs: u32, time_left_secs: u32) -> f64 {
    if duration_secs == 0 {
        return 1.0;
    }
    let done = duration_secs.saturating_sub(time_left_secs) as f64;
    (done / duration_secs as f64).clamp(0.0, 1.0)
}
