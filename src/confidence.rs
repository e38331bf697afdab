pub const CONFIDENCE_MIN: u8 = 0;
pub const CONFIDENCE_MAX: u8 = 100;

/// Options for [`ratio_confidence`].
#[derive(Debug, Clone, Copy)]
pub struct RatioOptions {
    pub min_confidence: u8,
    /// Returned when the total is zero.
    pub fallback: u8,
}

impl Default for RatioOptions {
    fn default() -> Self {
        Self {
            min_confidence: CONFIDENCE_MIN,
            fallback: 50,
        }
    }
}

/// Options for [`competition_penalty`].
#[derive(Debug, Clone, Copy)]
pub struct PenaltyOptions {
    /// Fraction of the primary score the runner-up must trail by.
    pub threshold: f64,
    pub penalty: u8,
    pub min_confidence: u8,
}

impl Default for PenaltyOptions {
    fn default() -> Self {
        Self {
            threshold: 0.15,
            penalty: 15,
            min_confidence: 60,
        }
    }
}

/// Round and clamp to an integer in `[0, 100]`. NaN maps to 0.
pub fn clamp(value: f64) -> u8 {
    if value.is_nan() {
        return CONFIDENCE_MIN;
    }
    value
        .round()
        .clamp(CONFIDENCE_MIN as f64, CONFIDENCE_MAX as f64) as u8
}

/// `100 * primary / total`, floored at `min_confidence`.
pub fn ratio_confidence(primary: f64, total: f64, opts: RatioOptions) -> u8 {
    if total <= 0.0 {
        return opts.fallback.min(CONFIDENCE_MAX);
    }
    clamp(100.0 * primary / total).max(opts.min_confidence.min(CONFIDENCE_MAX))
}

/// Lower `confidence` when the runner-up score is within `threshold` of the
/// primary. The floor never lifts a value above where it started.
pub fn competition_penalty(confidence: u8, primary: f64, secondary: f64, opts: PenaltyOptions) -> u8 {
    let confidence = confidence.min(CONFIDENCE_MAX);
    if primary > 0.0 && (primary - secondary) < primary * opts.threshold {
        let floor = opts.min_confidence.min(confidence);
        confidence.saturating_sub(opts.penalty).max(floor)
    } else {
        confidence
    }
}

/// `base` plus every bonus whose condition holds, clamped.
pub fn additive_confidence(base: f64, bonuses: &[(bool, f64)]) -> u8 {
    let total = bonuses
        .iter()
        .filter(|(condition, _)| *condition)
        .fold(base, |acc, (_, bonus)| acc + bonus);
    clamp(total)
}

/// Weighted mean of `(value, weight)` pairs, clamped. 50 when the weights sum to zero.
pub fn weighted_confidence(parts: &[(f64, f64)]) -> u8 {
    let total_weight: f64 = parts.iter().map(|(_, w)| w).sum();
    if total_weight <= 0.0 {
        return 50;
    }
    let sum: f64 = parts.iter().map(|(v, w)| v * w).sum();
    clamp(sum / total_weight)
}
