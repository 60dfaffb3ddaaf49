//! Small numeric helpers shared by the aggregators.
//!
//! Every helper returns a finite value; a zero denominator or an empty input
//! yields `0.0`.

/// `numerator / denominator`, or 0 when the denominator is 0.
pub(crate) fn safe_div(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 || !denominator.is_finite() {
        0.0
    } else {
        numerator / denominator
    }
}

/// Share of `part` in `whole` as a 0-100 percentage.
pub(crate) fn percentage(part: f64, whole: f64) -> f64 {
    safe_div(part, whole) * 100.0
}

pub(crate) fn mean(values: &[f64]) -> f64 {
    safe_div(values.iter().sum::<f64>(), values.len() as f64)
}

pub(crate) fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Percentage change from `previous` to `current`, 0 when `previous` is 0.
pub(crate) fn percent_change(current: f64, previous: f64) -> f64 {
    safe_div(current - previous, previous) * 100.0
}
