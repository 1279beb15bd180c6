use statrs::statistics::Statistics;

/// Arithmetic mean; `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().mean())
}

/// Relative distance of `price` from `reference`, as a fraction of `reference`.
pub fn pct_distance(price: f64, reference: f64) -> f64 {
    if reference == 0.0 {
        return f64::INFINITY;
    }
    ((price - reference) / reference).abs()
}

/// Rounds a 0-100 score to the integer scale used on signals.
pub fn to_confidence(score: f64) -> u8 {
    if !score.is_finite() {
        return 0;
    }
    score.round().clamp(0.0, 100.0) as u8
}
