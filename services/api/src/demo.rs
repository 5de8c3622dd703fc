use crate::infra::{InMemoryOkrRepository, RepositoryLevelSource};
use clap::Args;
use okr_tracker::error::AppError;
use okr_tracker::okr::export::write_score_report;
use okr_tracker::okr::{KeyResult, Objective, OkrRepository, OkrService, ServiceError};
use okr_tracker::scoring::metrics::score_actual;
use okr_tracker::scoring::store::{ScoreLevelSource, ScoreLevelStore};
use okr_tracker::scoring::{MetricType, ScoreLevelSet, ScoreStatus, Threshold};
use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct ExportArgs {
    /// Write the CSV report here instead of stdout
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Recorded actual value (a number, or a letter grade for qualitative metrics)
    #[arg(long)]
    pub(crate) actual: String,
    /// Metric direction: higher, lower, or qualitative
    #[arg(long, default_value = "higher", value_parser = parse_metric_type)]
    pub(crate) metric: MetricType,
    /// Five cutoffs from the lowest band to the highest, comma separated
    #[arg(long, value_parser = parse_thresholds, default_value = "3,4.25,4.5,4.75,5")]
    pub(crate) thresholds: Threshold,
}

pub(crate) fn parse_metric_type(raw: &str) -> Result<MetricType, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "higher" | "higher-better" => Ok(MetricType::HigherBetter),
        "lower" | "lower-better" => Ok(MetricType::LowerBetter),
        "qualitative" | "grade" => Ok(MetricType::Qualitative),
        other => Err(format!(
            "unknown metric type '{other}', expected higher, lower, or qualitative"
        )),
    }
}

pub(crate) fn parse_thresholds(raw: &str) -> Result<Threshold, String> {
    let values: Result<Vec<f64>, _> = raw
        .split(',')
        .map(|part| part.trim().parse::<f64>())
        .collect();
    let values = values.map_err(|err| format!("thresholds must be numbers ({err})"))?;
    if values.len() != 5 {
        return Err(format!(
            "expected 5 comma-separated cutoffs, got {}",
            values.len()
        ));
    }
    Ok(Threshold::from_slots([
        values[0], values[1], values[2], values[3], values[4],
    ]))
}

fn key_result(
    id: &str,
    name: &str,
    metric_type: MetricType,
    unit: Option<&str>,
    weight: f64,
    thresholds: Threshold,
    actual_value: &str,
) -> KeyResult {
    KeyResult {
        id: id.to_string(),
        name: name.to_string(),
        description: None,
        metric_type,
        unit: unit.map(str::to_string),
        weight,
        thresholds,
        actual_value: actual_value.to_string(),
        objective_id: String::new(),
        score: ScoreStatus::Unscored,
    }
}

/// Populate a fresh repository with two departments worth of sample OKRs.
pub(crate) fn seed<R, S>(service: &OkrService<R, S>) -> Result<(), ServiceError>
where
    R: OkrRepository + 'static,
    S: ScoreLevelSource + 'static,
{
    service.create_department(
        "Engineering",
        vec![
            Objective {
                id: "obj-platform".to_string(),
                name: "Platform reliability".to_string(),
                weight: Some(60.0),
                department_id: String::new(),
                key_results: vec![
                    key_result(
                        "kr-uptime",
                        "Service uptime",
                        MetricType::HigherBetter,
                        Some("%"),
                        50.0,
                        Threshold::from_slots([95.0, 97.0, 98.0, 99.0, 99.9]),
                        "99.2",
                    ),
                    key_result(
                        "kr-mttr",
                        "Mean time to recovery",
                        MetricType::LowerBetter,
                        Some("minutes"),
                        50.0,
                        Threshold::from_slots([60.0, 45.0, 30.0, 20.0, 10.0]),
                        "25",
                    ),
                ],
                score: ScoreStatus::Unscored,
            },
            Objective {
                id: "obj-delivery".to_string(),
                name: "Delivery predictability".to_string(),
                weight: Some(40.0),
                department_id: String::new(),
                key_results: vec![key_result(
                    "kr-roadmap",
                    "Roadmap execution",
                    MetricType::Qualitative,
                    None,
                    100.0,
                    Threshold::default(),
                    "B",
                )],
                score: ScoreStatus::Unscored,
            },
        ],
    )?;

    service.create_department(
        "Sales",
        vec![Objective {
            id: "obj-revenue".to_string(),
            name: "Revenue growth".to_string(),
            weight: None,
            department_id: String::new(),
            key_results: vec![key_result(
                "kr-quota",
                "Quota attainment",
                MetricType::HigherBetter,
                Some("%"),
                100.0,
                Threshold::from_slots([80.0, 90.0, 100.0, 110.0, 120.0]),
                "105",
            )],
            score: ScoreStatus::Unscored,
        }],
    )?;

    Ok(())
}

type DemoService = OkrService<InMemoryOkrRepository, RepositoryLevelSource<InMemoryOkrRepository>>;

pub(crate) fn build_demo_service() -> Arc<DemoService> {
    let repository = Arc::new(InMemoryOkrRepository::default());
    let source = Arc::new(RepositoryLevelSource::new(repository.clone()));
    let store = Arc::new(ScoreLevelStore::new(source));
    Arc::new(OkrService::new(repository, store))
}

/// `export` command: score the sample departments and write the CSV report.
pub(crate) fn run_export(args: ExportArgs) -> Result<(), AppError> {
    let service = build_demo_service();
    seed(&service)?;
    let departments = service.departments()?;

    match args.output {
        Some(path) => {
            let file = File::create(&path)?;
            write_score_report(file, &departments)?;
            println!("score report written to {}", path.display());
        }
        None => {
            let stdout = std::io::stdout();
            write_score_report(stdout.lock(), &departments)?;
        }
    }
    Ok(())
}

/// `score` command: run one actual value through the scoring rules and print
/// the classified result.
pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let levels = ScoreLevelSet::canonical();
    let result = score_actual(&args.actual, args.metric, &args.thresholds, &levels);
    let rendered = serde_json::to_string_pretty(&result)
        .map_err(|err| AppError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, err)))?;
    println!("{rendered}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_parser_requires_five_cutoffs() {
        let parsed = parse_thresholds("95, 97, 98, 99, 99.9").expect("five cutoffs parse");
        assert_eq!(parsed.below, 95.0);
        assert_eq!(parsed.exceptional, 99.9);
        assert!(parse_thresholds("1,2,3").is_err());
        assert!(parse_thresholds("a,b,c,d,e").is_err());
    }

    #[test]
    fn seeded_departments_score_end_to_end() {
        let service = build_demo_service();
        seed(&service).expect("demo data seeds");
        let departments = service.departments().expect("departments list");
        assert_eq!(departments.len(), 2);
        for department in &departments {
            let result = department.score.scored().expect("department scored");
            assert!(result.score >= 3.0 && result.score <= 5.0);
        }
    }

    #[test]
    fn export_writes_one_row_per_key_result() {
        let service = build_demo_service();
        seed(&service).expect("demo data seeds");
        let departments = service.departments().expect("departments list");
        let mut buffer = Vec::new();
        write_score_report(&mut buffer, &departments).expect("report writes");
        let text = String::from_utf8(buffer).expect("valid utf8");
        // Header, four key results, two department totals.
        assert_eq!(text.lines().count(), 7);
    }
}
