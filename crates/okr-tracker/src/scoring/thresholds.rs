use serde::{Deserialize, Serialize};

use super::classify::level_key;
use super::levels::ScoreLevelSet;

/// The backend's fixed threshold record for one key result: five ordered
/// cutoffs on the metric's own unit scale.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Threshold {
    pub below: f64,
    pub meets: f64,
    pub good: f64,
    pub very_good: f64,
    pub exceptional: f64,
}

impl Threshold {
    pub fn new(below: f64, meets: f64, good: f64, very_good: f64, exceptional: f64) -> Self {
        Self {
            below,
            meets,
            good,
            very_good,
            exceptional,
        }
    }

    pub fn slots(&self) -> [f64; 5] {
        [
            self.below,
            self.meets,
            self.good,
            self.very_good,
            self.exceptional,
        ]
    }

    pub fn from_slots(slots: [f64; 5]) -> Self {
        Self {
            below: slots[0],
            meets: slots[1],
            good: slots[2],
            very_good: slots[3],
            exceptional: slots[4],
        }
    }
}

/// A reconstructed per-level cutoff for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NamedCutoff {
    pub level: String,
    pub color: String,
    pub value: f64,
}

/// Which level index fills each of the five backend slots for a set of `n`
/// levels. Cardinalities outside 2..=5 degrade to index clamping so display
/// never fails, only approximates.
fn slot_assignments(n: usize) -> [usize; 5] {
    match n {
        5 => [0, 1, 2, 3, 4],
        4 => [0, 1, 2, 2, 3],
        3 => [0, 0, 1, 1, 2],
        2 => [0, 0, 0, 0, 1],
        _ => {
            let last = n.saturating_sub(1);
            [
                0.min(last),
                1.min(last),
                2.min(last),
                3.min(last),
                4.min(last),
            ]
        }
    }
}

/// Map per-level cutoffs entered at key-result creation into the fixed
/// backend record, duplicating levels across slots per the cardinality rules.
///
/// An empty input yields the zeroed record rather than an error; the backend
/// rejects it downstream.
pub fn to_backend(cutoffs: &[f64]) -> Threshold {
    if cutoffs.is_empty() {
        return Threshold::default();
    }
    let assignments = slot_assignments(cutoffs.len());
    let mut slots = [0.0; 5];
    for (slot, level_index) in assignments.iter().enumerate() {
        slots[slot] = cutoffs[*level_index];
    }
    Threshold::from_slots(slots)
}

/// Reconstruct per-level cutoffs from a stored backend record for a set of
/// `n` levels. Each level reads the first slot assigned to it, so the n=5
/// case round-trips exactly and smaller cardinalities drop the duplicated
/// slots.
///
/// When the level set has been reconfigured since the key result was created
/// the reconstruction is approximate by design.
pub fn from_backend(threshold: &Threshold, n: usize) -> Vec<f64> {
    let slots = threshold.slots();
    if n == 0 {
        return Vec::new();
    }
    if !(2..=5).contains(&n) {
        return (0..n).map(|i| slots[i.min(4)]).collect();
    }

    let assignments = slot_assignments(n);
    (0..n)
        .map(|level_index| {
            let first_slot = assignments
                .iter()
                .position(|assigned| *assigned == level_index)
                .unwrap_or(4);
            slots[first_slot]
        })
        .collect()
}

/// Pair the reconstructed cutoffs with the current level names and colors for
/// threshold display on cards.
pub fn named_cutoffs(threshold: &Threshold, levels: &ScoreLevelSet) -> Vec<NamedCutoff> {
    let levels = super::classify::effective(levels);
    let values = from_backend(threshold, levels.len());
    levels
        .iter()
        .zip(values)
        .map(|(level, value)| NamedCutoff {
            level: level_key(&level.name),
            color: level.color.clone(),
            value,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::levels::ScoreLevel;

    #[test]
    fn five_levels_round_trip_exactly() {
        let cutoffs = [10.0, 25.0, 40.0, 60.0, 85.0];
        let record = to_backend(&cutoffs);
        assert_eq!(record, Threshold::new(10.0, 25.0, 40.0, 60.0, 85.0));
        assert_eq!(from_backend(&record, 5), cutoffs.to_vec());
    }

    #[test]
    fn two_levels_quadruple_the_floor() {
        let record = to_backend(&[50.0, 90.0]);
        assert_eq!(record.below, 50.0);
        assert_eq!(record.meets, 50.0);
        assert_eq!(record.good, 50.0);
        assert_eq!(record.very_good, 50.0);
        assert_eq!(record.exceptional, 90.0);
        assert_eq!(from_backend(&record, 2), vec![50.0, 90.0]);
    }

    #[test]
    fn three_levels_pair_up_the_lower_slots() {
        let record = to_backend(&[10.0, 40.0, 80.0]);
        assert_eq!(record.slots(), [10.0, 10.0, 40.0, 40.0, 80.0]);
        assert_eq!(from_backend(&record, 3), vec![10.0, 40.0, 80.0]);
    }

    #[test]
    fn four_levels_duplicate_very_good() {
        let record = to_backend(&[10.0, 30.0, 50.0, 90.0]);
        assert_eq!(record.slots(), [10.0, 30.0, 50.0, 50.0, 90.0]);
        assert_eq!(from_backend(&record, 4), vec![10.0, 30.0, 50.0, 90.0]);
    }

    #[test]
    fn oversized_sets_clamp_to_the_last_slot() {
        let record = Threshold::new(1.0, 2.0, 3.0, 4.0, 5.0);
        assert_eq!(
            from_backend(&record, 7),
            vec![1.0, 2.0, 3.0, 4.0, 5.0, 5.0, 5.0]
        );
        let single = to_backend(&[42.0]);
        assert_eq!(single.slots(), [42.0; 5]);
    }

    #[test]
    fn named_cutoffs_follow_the_current_level_set() {
        let record = Threshold::new(10.0, 10.0, 40.0, 40.0, 80.0);
        let levels = ScoreLevelSet::new(vec![
            ScoreLevel::new("Low", 3.0, "#dc3545", 0),
            ScoreLevel::new("Mid", 4.0, "#ffc107", 1),
            ScoreLevel::new("High", 5.0, "#1e7b34", 2),
        ]);
        let named = named_cutoffs(&record, &levels);
        assert_eq!(named.len(), 3);
        assert_eq!(named[0].level, "low");
        assert_eq!(named[0].value, 10.0);
        assert_eq!(named[1].value, 40.0);
        assert_eq!(named[2].value, 80.0);
    }

    #[test]
    fn empty_level_input_yields_the_zeroed_record() {
        assert_eq!(to_backend(&[]), Threshold::default());
        assert!(from_backend(&Threshold::default(), 0).is_empty());
    }
}
