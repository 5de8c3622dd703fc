use serde::{Deserialize, Serialize};

use super::classify::{classify, effective, level_key, ScoreResult};
use super::levels::ScoreLevelSet;
use super::rollup::neutral_score;
use super::thresholds::Threshold;

/// How a key result's actual value compares against its thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MetricType {
    HigherBetter,
    LowerBetter,
    Qualitative,
}

impl MetricType {
    pub const fn label(self) -> &'static str {
        match self {
            MetricType::HigherBetter => "Higher is Better",
            MetricType::LowerBetter => "Lower is Better",
            MetricType::Qualitative => "Qualitative (A-E)",
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Score one key result from its recorded actual value.
///
/// Quantitative metrics interpolate linearly inside the threshold band the
/// actual value falls into; qualitative metrics use the A-E grade table.
/// Unparseable numeric input scores as 0 and is treated as unscored upstream.
pub fn score_actual(
    actual: &str,
    metric_type: MetricType,
    thresholds: &Threshold,
    levels: &ScoreLevelSet,
) -> ScoreResult {
    match metric_type {
        MetricType::Qualitative => qualitative_score(actual, levels),
        MetricType::HigherBetter | MetricType::LowerBetter => {
            let value = actual.trim().parse::<f64>().unwrap_or(0.0);
            quantitative_score(value, metric_type, thresholds, levels)
        }
    }
}

/// Grade table for qualitative key results. A is the top grade here, unlike
/// the HR letter scale.
fn qualitative_score(grade: &str, levels: &ScoreLevelSet) -> ScoreResult {
    let score = match grade.trim().to_ascii_uppercase().as_str() {
        "A" => 5.0,
        "B" => 4.75,
        "C" => 4.5,
        "D" => 4.25,
        _ => 3.0,
    };
    classify(score, levels)
}

fn quantitative_score(
    actual: f64,
    metric_type: MetricType,
    thresholds: &Threshold,
    levels: &ScoreLevelSet,
) -> ScoreResult {
    let levels = effective(levels);
    let slots = thresholds.slots();
    let last = levels.len() - 1;

    // Band 0 spans below..meets, band 3 spans very_good..exceptional; above
    // the top slot the score pins to the highest level, beneath the bottom
    // slot it pins to the lowest.
    let banded = match metric_type {
        MetricType::HigherBetter => {
            if actual >= slots[4] {
                None
            } else {
                (0..4)
                    .rev()
                    .find(|b| actual >= slots[*b])
                    .map(|b| (b, (actual - slots[b]) / (slots[b + 1] - slots[b]).max(1.0)))
            }
        }
        MetricType::LowerBetter => {
            if actual <= slots[4] {
                None
            } else {
                (0..4)
                    .rev()
                    .find(|b| actual <= slots[*b])
                    .map(|b| (b, 1.0 - (actual - slots[b + 1]) / (slots[b] - slots[b + 1]).max(1.0)))
            }
        }
        MetricType::Qualitative => unreachable!("qualitative metrics never reach the band search"),
    };

    let (score, level_index) = match banded {
        // Past the exceptional slot in the favorable direction.
        None if past_top(actual, metric_type, &slots) => {
            (levels.get(last).map(|l| l.score_value).unwrap_or(5.0), last)
        }
        None => (levels.min_score(), 0),
        Some((band, ratio)) => {
            let index = band_level_index(band, last);
            let start = levels.get(index).map(|l| l.score_value).unwrap_or(3.0);
            let end = levels
                .get((index + 1).min(last))
                .map(|l| l.score_value)
                .unwrap_or(start);
            (start + ratio * (end - start), index)
        }
    };

    let min = levels.min_score();
    let max = levels.max_score();
    let score = round2(score.clamp(min, max));
    let matched = levels
        .get(level_index)
        .expect("band index is always within the effective set");

    let range = max - min;
    let percentage = if range == 0.0 {
        0.0
    } else {
        (((score - min) / range) * 100.0).clamp(0.0, 100.0)
    };

    ScoreResult {
        score,
        level: level_key(&matched.name),
        color: matched.color.clone(),
        percentage,
    }
}

fn past_top(actual: f64, metric_type: MetricType, slots: &[f64; 5]) -> bool {
    match metric_type {
        MetricType::HigherBetter => actual >= slots[4],
        MetricType::LowerBetter => actual <= slots[4],
        MetricType::Qualitative => false,
    }
}

/// Map a threshold band onto a level index, clamped for sets smaller or
/// larger than the five slots.
fn band_level_index(band: usize, last: usize) -> usize {
    if band == 0 {
        return 0;
    }
    let shifted = last as isize - (4 - band as isize);
    shifted.clamp(0, band as isize) as usize
}

/// Mean of the key-result scores under one objective, classified against the
/// current levels. No key results means the neutral floor.
pub fn objective_score(key_result_scores: &[f64], levels: &ScoreLevelSet) -> ScoreResult {
    if key_result_scores.is_empty() {
        return neutral_score(levels);
    }
    let mean = key_result_scores.iter().sum::<f64>() / key_result_scores.len() as f64;
    classify(round2(mean), levels)
}

/// Weight-normalized mean over the objectives of one department. Entries are
/// the objectives that have key results, as `(weight, objective score)`;
/// missing weights share the remainder equally.
pub fn department_score(objectives: &[(Option<f64>, f64)], levels: &ScoreLevelSet) -> ScoreResult {
    if objectives.is_empty() {
        return neutral_score(levels);
    }

    let default_weight = 100.0 / objectives.len() as f64;
    let mut weighted_sum = 0.0;
    let mut total_weight = 0.0;
    for (weight, score) in objectives {
        let weight = weight.unwrap_or(default_weight);
        weighted_sum += score * weight;
        total_weight += weight;
    }

    if total_weight <= 0.0 {
        return neutral_score(levels);
    }
    classify(round2(weighted_sum / total_weight), levels)
}
