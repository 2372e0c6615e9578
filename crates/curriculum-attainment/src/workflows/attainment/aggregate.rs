use super::domain::{FactRow, IndicatorId, MajorIndicator, Strength, StrengthWeights};
use serde::Serialize;
use std::collections::BTreeMap;

/// Mean, spread and course count for one (indicator, strength) pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrengthStat {
    pub indicator: IndicatorId,
    pub strength: Strength,
    pub mean: f64,
    /// Sample standard deviation; absent with fewer than two courses.
    pub std_dev: Option<f64>,
    pub course_count: usize,
}

/// Level-1 rollup for a decomposed indicator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorScore {
    pub indicator: IndicatorId,
    pub major: MajorIndicator,
    #[serde(rename = "H")]
    pub high: Option<f64>,
    #[serde(rename = "M")]
    pub medium: Option<f64>,
    #[serde(rename = "L")]
    pub low: Option<f64>,
    pub weighted_score: f64,
    /// Composite score of the parent graduation requirement.
    pub major_score: f64,
}

impl IndicatorScore {
    pub fn strength_mean(&self, strength: Strength) -> Option<f64> {
        match strength {
            Strength::H => self.high,
            Strength::M => self.medium,
            Strength::L => self.low,
        }
    }
}

/// Level-2 rollup for a graduation requirement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateResult {
    pub major_indicator: MajorIndicator,
    pub composite_score: f64,
    #[serde(rename = "H_score")]
    pub high_score: Option<f64>,
    #[serde(rename = "M_score")]
    pub medium_score: Option<f64>,
    #[serde(rename = "L_score")]
    pub low_score: Option<f64>,
}

impl AggregateResult {
    pub fn per_strength_score(&self, strength: Strength) -> Option<f64> {
        match strength {
            Strength::H => self.high_score,
            Strength::M => self.medium_score,
            Strength::L => self.low_score,
        }
    }
}

/// Every table produced by one aggregation pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AttainmentAggregates {
    pub strength_stats: Vec<StrengthStat>,
    pub indicators: Vec<IndicatorScore>,
    pub requirements: Vec<AggregateResult>,
    /// Indicators whose applicable weights summed to zero; scored as 0.
    pub degenerate_indicators: Vec<IndicatorId>,
}

/// Rolls facts up through decomposed indicators into graduation requirements.
///
/// Within an indicator the per-strength means are combined with `weights`,
/// renormalised over the strengths actually present. Indicators are then
/// averaged without weighting inside their requirement. The per-strength
/// columns use plain means at both levels and ignore `weights`.
pub fn aggregate(facts: &[FactRow], weights: &StrengthWeights) -> AttainmentAggregates {
    let mut grouped: BTreeMap<IndicatorId, BTreeMap<Strength, Vec<f64>>> = BTreeMap::new();
    for fact in facts {
        grouped
            .entry(fact.indicator.clone())
            .or_default()
            .entry(fact.strength)
            .or_default()
            .push(fact.attainment);
    }

    let mut aggregates = AttainmentAggregates::default();
    let mut by_major: BTreeMap<MajorIndicator, Vec<IndicatorScore>> = BTreeMap::new();

    for (indicator, by_strength) in &grouped {
        let mut means: BTreeMap<Strength, f64> = BTreeMap::new();
        for (strength, values) in by_strength {
            let Some(value) = mean(values) else {
                continue;
            };
            means.insert(*strength, value);
            aggregates.strength_stats.push(StrengthStat {
                indicator: indicator.clone(),
                strength: *strength,
                mean: value,
                std_dev: sample_std_dev(values, value),
                course_count: values.len(),
            });
        }

        let weighted_score = match weighted_mean(&means, weights) {
            Some(score) => score,
            None => {
                aggregates.degenerate_indicators.push(indicator.clone());
                0.0
            }
        };

        by_major
            .entry(indicator.major())
            .or_default()
            .push(IndicatorScore {
                indicator: indicator.clone(),
                major: indicator.major(),
                high: means.get(&Strength::H).copied(),
                medium: means.get(&Strength::M).copied(),
                low: means.get(&Strength::L).copied(),
                weighted_score,
                major_score: 0.0,
            });
    }

    for (major, mut indicators) in by_major {
        let composite: Vec<f64> = indicators.iter().map(|score| score.weighted_score).collect();
        let composite_score = mean(&composite).unwrap_or(0.0);

        let strength_score = |strength: Strength| {
            let present: Vec<f64> = indicators
                .iter()
                .filter_map(|score| score.strength_mean(strength))
                .collect();
            mean(&present)
        };

        aggregates.requirements.push(AggregateResult {
            major_indicator: major,
            composite_score,
            high_score: strength_score(Strength::H),
            medium_score: strength_score(Strength::M),
            low_score: strength_score(Strength::L),
        });

        for score in &mut indicators {
            score.major_score = composite_score;
        }
        aggregates.indicators.extend(indicators);
    }

    aggregates
}

/// Weighted mean of per-strength means, renormalised over present strengths.
/// `None` when the applicable weights sum to zero.
pub fn weighted_mean(means: &BTreeMap<Strength, f64>, weights: &StrengthWeights) -> Option<f64> {
    let (score_sum, weight_sum) = means.iter().fold((0.0, 0.0), |(score, total), (strength, value)| {
        let weight = weights.weight(*strength);
        (score + value * weight, total + weight)
    });

    if weight_sum == 0.0 {
        None
    } else {
        Some(score_sum / weight_sum)
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

fn sample_std_dev(values: &[f64], mean: f64) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let variance = values
        .iter()
        .map(|value| (value - mean).powi(2))
        .sum::<f64>()
        / (values.len() - 1) as f64;
    Some(variance.sqrt())
}
