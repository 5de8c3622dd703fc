use std::sync::Arc;

use okr_tracker::scoring::evaluation::{combine, stars_from_score, stars_to_score, LetterGrade};
use okr_tracker::scoring::metrics::score_actual;
use okr_tracker::scoring::store::{ScoreLevelSource, ScoreLevelStore, SourceError};
use okr_tracker::scoring::thresholds::{from_backend, to_backend};
use okr_tracker::scoring::{
    classify, roll_up, MetricType, ScoreLevel, ScoreLevelSet, ScoreStatus,
};

fn canonical() -> ScoreLevelSet {
    ScoreLevelSet::canonical()
}

#[test]
fn classification_percentage_is_monotone_in_the_score() {
    let levels = canonical();
    let mut previous = -1.0;
    let mut score = 2.5;
    while score <= 5.5 {
        let result = classify(score, &levels);
        assert!(
            result.percentage >= previous,
            "percentage regressed at score {score}"
        );
        previous = result.percentage;
        score += 0.05;
    }
}

#[test]
fn scores_below_every_cutoff_land_on_the_lowest_level() {
    let levels = canonical();
    let floor = classify(1.0, &levels);
    assert_eq!(floor.level, "below");
    assert_eq!(floor.color, "#dc3545");

    let exact = classify(3.0, &levels);
    assert_eq!(exact.level, "below");
}

#[test]
fn empty_level_sets_classify_exactly_like_the_canonical_defaults() {
    let empty = ScoreLevelSet::default();
    let canonical = canonical();
    for score in [0.0, 3.0, 4.3, 4.6, 4.8, 5.0, 6.0] {
        assert_eq!(classify(score, &empty), classify(score, &canonical));
    }
}

#[test]
fn five_level_threshold_mapping_round_trips() {
    let cutoffs = [95.0, 97.0, 98.0, 99.0, 99.9];
    let backend = to_backend(&cutoffs);
    assert_eq!(from_backend(&backend, 5), cutoffs.to_vec());
}

#[test]
fn two_level_sets_duplicate_the_lower_cutoff_across_backend_slots() {
    let backend = to_backend(&[3.0, 5.0]);
    assert_eq!(backend.below, 3.0);
    assert_eq!(backend.meets, 3.0);
    assert_eq!(backend.good, 3.0);
    assert_eq!(backend.very_good, 3.0);
    assert_eq!(backend.exceptional, 5.0);
    assert_eq!(from_backend(&backend, 2), vec![3.0, 5.0]);
}

#[test]
fn rolling_up_nothing_yields_the_neutral_score() {
    let levels = canonical();

    let empty: Vec<ScoreStatus> = Vec::new();
    let result = roll_up(&empty, &levels);
    assert_eq!(result.score, 3.0);
    assert_eq!(result.percentage, 0.0);
    assert_eq!(result.level, "below");

    let unscored = vec![ScoreStatus::Unscored, ScoreStatus::Unscored];
    let result = roll_up(&unscored, &levels);
    assert_eq!(result.score, 3.0);
    assert_eq!(result.percentage, 0.0);
}

#[test]
fn roll_up_takes_the_unweighted_mean() {
    let levels = canonical();
    let children = vec![
        ScoreStatus::from(classify(4.5, &levels)),
        ScoreStatus::from(classify(5.0, &levels)),
    ];
    let result = roll_up(&children, &levels);
    assert_eq!(result.score, 4.75);
    assert_eq!(result.level, "very_good");
}

#[test]
fn director_stars_interpolate_between_floor_and_ceiling() {
    assert_eq!(stars_to_score(1).expect("1 star valid"), 4.25);
    assert_eq!(stars_to_score(3).expect("3 stars valid"), 4.625);
    assert_eq!(stars_to_score(5).expect("5 stars valid"), 5.0);
    assert_eq!(stars_from_score(4.625), Some(3));
    assert_eq!(stars_from_score(4.0), None);
}

#[test]
fn hr_letters_map_to_exact_scores() {
    assert_eq!(LetterGrade::D.score(), 5.0);
    assert_eq!(LetterGrade::C.score(), 4.75);
    assert_eq!(LetterGrade::B.score(), 4.5);
    assert_eq!(LetterGrade::A.score(), 4.25);
}

#[test]
fn missing_inputs_block_the_final_score_entirely() {
    assert_eq!(combine(Some(4.8), Some(4.625), None), None);
}

#[test]
fn complete_inputs_blend_sixty_twenty_twenty() {
    let blended =
        combine(Some(4.8), Some(4.625), Some(LetterGrade::D.score())).expect("all inputs present");
    assert!(
        (blended - 4.805).abs() < 1e-9,
        "expected 4.805, got {blended}"
    );
}

struct SeededSource {
    levels: Vec<ScoreLevel>,
}

impl ScoreLevelSource for SeededSource {
    fn fetch(&self) -> Result<Vec<ScoreLevel>, SourceError> {
        Ok(self.levels.clone())
    }
}

#[test]
fn reset_restores_the_published_level_table() {
    let source = Arc::new(SeededSource {
        levels: vec![
            ScoreLevel::new("Fail", 1.0, "#000000", 0),
            ScoreLevel::new("Pass", 2.0, "#ffffff", 1),
        ],
    });
    let store = ScoreLevelStore::new(source);
    assert_eq!(store.load().len(), 2);

    let reset = store.reset();
    let expected = [
        ("Below", 3.0, "#dc3545"),
        ("Meets", 4.25, "#ffc107"),
        ("Good", 4.5, "#5cb85c"),
        ("Very Good", 4.75, "#28a745"),
        ("Exceptional", 5.0, "#1e7b34"),
    ];
    assert_eq!(reset.len(), expected.len());
    for (index, (name, value, color)) in expected.iter().enumerate() {
        let level = reset.get(index).expect("level present");
        assert_eq!(level.name, *name);
        assert_eq!(level.score_value, *value);
        assert_eq!(level.color, *color);
    }
}

#[test]
fn quantitative_actuals_interpolate_between_bands() {
    let levels = canonical();
    let thresholds = to_backend(&[95.0, 97.0, 98.0, 99.0, 99.9]);

    // Halfway between the good and very-good cutoffs.
    let result = score_actual("98.5", MetricType::HigherBetter, &thresholds, &levels);
    assert_eq!(result.score, 4.63);
    assert_eq!(result.level, "good");

    // Past the top cutoff pins to the maximum.
    let top = score_actual("101", MetricType::HigherBetter, &thresholds, &levels);
    assert_eq!(top.score, 5.0);
    assert_eq!(top.level, "exceptional");

    // Below the bottom cutoff floors at the minimum.
    let bottom = score_actual("90", MetricType::HigherBetter, &thresholds, &levels);
    assert_eq!(bottom.score, 3.0);
}

#[test]
fn qualitative_actuals_grade_a_highest() {
    let levels = canonical();
    let thresholds = to_backend(&[]);
    let a = score_actual("A", MetricType::Qualitative, &thresholds, &levels);
    assert_eq!(a.score, 5.0);
    let d = score_actual("D", MetricType::Qualitative, &thresholds, &levels);
    assert_eq!(d.score, 4.25);
    let unknown = score_actual("F", MetricType::Qualitative, &thresholds, &levels);
    assert_eq!(unknown.score, 3.0);
}
