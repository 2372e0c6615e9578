use super::aggregate::{AggregateResult, StrengthStat};
use super::domain::MajorIndicator;

pub const BATCH_THRESHOLD: f64 = 0.80;
pub const INTERACTIVE_THRESHOLD: f64 = 0.70;

/// Graduation requirements whose composite score is strictly below `threshold`.
pub fn evaluate(aggregates: &[AggregateResult], threshold: f64) -> Vec<MajorIndicator> {
    aggregates
        .iter()
        .filter(|result| result.composite_score < threshold)
        .map(|result| result.major_indicator)
        .collect()
}

/// (indicator, strength) groups whose mean attainment is below `threshold`.
pub fn weak_points(stats: &[StrengthStat], threshold: f64) -> Vec<StrengthStat> {
    stats
        .iter()
        .filter(|stat| stat.mean < threshold)
        .cloned()
        .collect()
}
