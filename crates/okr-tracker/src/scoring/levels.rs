use serde::{Deserialize, Serialize};

/// Minimum cardinality for a set to define a usable score range.
pub const MIN_LEVELS: usize = 2;

/// A named score band with its cutoff and display color.
///
/// Serialized in the backend's camelCase wire shape (`scoreValue`,
/// `displayOrder`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreLevel {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub score_value: f64,
    pub color: String,
    #[serde(default)]
    pub display_order: usize,
}

impl ScoreLevel {
    pub fn new(name: &str, score_value: f64, color: &str, display_order: usize) -> Self {
        Self {
            id: None,
            name: name.to_string(),
            score_value,
            color: color.to_string(),
            display_order,
        }
    }
}

/// Ordered collection of score levels, kept sorted ascending by cutoff.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScoreLevelSet {
    levels: Vec<ScoreLevel>,
}

impl ScoreLevelSet {
    pub fn new(levels: Vec<ScoreLevel>) -> Self {
        let mut set = Self { levels };
        set.ensure_sorted();
        set
    }

    /// The published 5-level defaults used whenever no configuration exists.
    pub fn canonical() -> Self {
        Self::new(vec![
            ScoreLevel::new("Below", 3.0, "#dc3545", 0),
            ScoreLevel::new("Meets", 4.25, "#ffc107", 1),
            ScoreLevel::new("Good", 4.5, "#5cb85c", 2),
            ScoreLevel::new("Very Good", 4.75, "#28a745", 3),
            ScoreLevel::new("Exceptional", 5.0, "#1e7b34", 4),
        ])
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn get(&self, index: usize) -> Option<&ScoreLevel> {
        self.levels.get(index)
    }

    pub fn first(&self) -> Option<&ScoreLevel> {
        self.levels.first()
    }

    pub fn last(&self) -> Option<&ScoreLevel> {
        self.levels.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ScoreLevel> {
        self.levels.iter()
    }

    pub fn min_score(&self) -> f64 {
        self.levels.first().map(|l| l.score_value).unwrap_or(3.0)
    }

    pub fn max_score(&self) -> f64 {
        self.levels.last().map(|l| l.score_value).unwrap_or(5.0)
    }

    /// Re-order by cutoff ascending and reassign `display_order = index`.
    pub fn ensure_sorted(&mut self) {
        self.levels
            .sort_by(|a, b| a.score_value.total_cmp(&b.score_value));
        for (index, level) in self.levels.iter_mut().enumerate() {
            level.display_order = index;
        }
    }

    /// Append a placeholder level for the user to edit.
    pub fn add_level(&mut self) {
        let order = self.levels.len();
        self.levels
            .push(ScoreLevel::new("New Level", 4.0, "#6c757d", order));
        self.ensure_sorted();
    }

    pub fn remove_level(&mut self, index: usize) -> Result<ScoreLevel, ValidationError> {
        if index >= self.levels.len() {
            return Err(ValidationError::LevelOutOfRange(index));
        }
        if self.levels.len() <= MIN_LEVELS {
            return Err(ValidationError::TooFewLevels);
        }
        let removed = self.levels.remove(index);
        self.ensure_sorted();
        Ok(removed)
    }

    /// Wholesale replacement; the incoming list is re-sorted and re-indexed.
    pub fn replace(&mut self, levels: Vec<ScoreLevel>) {
        self.levels = levels;
        self.ensure_sorted();
    }

    pub fn into_levels(self) -> Vec<ScoreLevel> {
        self.levels
    }
}

impl<'a> IntoIterator for &'a ScoreLevelSet {
    type Item = &'a ScoreLevel;
    type IntoIter = std::slice::Iter<'a, ScoreLevel>;

    fn into_iter(self) -> Self::IntoIter {
        self.levels.iter()
    }
}

/// Error raised by score-level set mutations.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("score level sets require at least {MIN_LEVELS} levels")]
    TooFewLevels,
    #[error("no score level at index {0}")]
    LevelOutOfRange(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_set_matches_published_defaults() {
        let set = ScoreLevelSet::canonical();
        let expected = [
            ("Below", 3.0, "#dc3545"),
            ("Meets", 4.25, "#ffc107"),
            ("Good", 4.5, "#5cb85c"),
            ("Very Good", 4.75, "#28a745"),
            ("Exceptional", 5.0, "#1e7b34"),
        ];
        assert_eq!(set.len(), 5);
        for (index, (name, value, color)) in expected.iter().enumerate() {
            let level = set.get(index).expect("level present");
            assert_eq!(level.name, *name);
            assert_eq!(level.score_value, *value);
            assert_eq!(level.color, *color);
            assert_eq!(level.display_order, index);
        }
    }

    #[test]
    fn ensure_sorted_reorders_and_reindexes() {
        let mut set = ScoreLevelSet::new(vec![
            ScoreLevel::new("Top", 5.0, "#1e7b34", 9),
            ScoreLevel::new("Floor", 3.0, "#dc3545", 7),
            ScoreLevel::new("Middle", 4.0, "#ffc107", 3),
        ]);
        set.ensure_sorted();
        let names: Vec<&str> = set.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["Floor", "Middle", "Top"]);
        let orders: Vec<usize> = set.iter().map(|l| l.display_order).collect();
        assert_eq!(orders, vec![0, 1, 2]);
    }

    #[test]
    fn remove_refuses_to_shrink_below_minimum() {
        let mut set = ScoreLevelSet::new(vec![
            ScoreLevel::new("Low", 3.0, "#dc3545", 0),
            ScoreLevel::new("High", 5.0, "#1e7b34", 1),
        ]);
        let err = set.remove_level(0).expect_err("minimum enforced");
        assert!(matches!(err, ValidationError::TooFewLevels));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn add_level_inserts_sorted_placeholder() {
        let mut set = ScoreLevelSet::new(vec![
            ScoreLevel::new("Low", 3.0, "#dc3545", 0),
            ScoreLevel::new("High", 5.0, "#1e7b34", 1),
        ]);
        set.add_level();
        assert_eq!(set.len(), 3);
        // Placeholder 4.0 lands between the two existing cutoffs.
        assert_eq!(set.get(1).map(|l| l.name.as_str()), Some("New Level"));
    }

    #[test]
    fn iteration_scans_in_both_directions() {
        let set = ScoreLevelSet::canonical();
        let ascending: Vec<&str> = set.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(ascending.first(), Some(&"Below"));

        // The classifier walks cutoffs from the top down.
        let descending: Vec<&str> = set.iter().rev().map(|l| l.name.as_str()).collect();
        assert_eq!(descending.first(), Some(&"Exceptional"));
        assert_eq!(descending.last(), Some(&"Below"));
    }

    #[test]
    fn wire_shape_is_camel_case() {
        let level = ScoreLevel::new("Very Good", 4.75, "#28a745", 3);
        let json = serde_json::to_value(&level).expect("serializes");
        assert_eq!(json["scoreValue"], 4.75);
        assert_eq!(json["displayOrder"], 3);
    }
}
