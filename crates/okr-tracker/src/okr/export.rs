use std::io::Write;

use serde::Serialize;

use super::domain::Department;

/// One flattened row of the score report, one per key result.
#[derive(Debug, Clone, Serialize)]
pub struct ScoreReportRow {
    pub department: String,
    pub objective: String,
    pub key_result: String,
    pub metric_type: &'static str,
    pub unit: String,
    pub weight: f64,
    pub actual_value: String,
    pub score: String,
    pub level: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to write report row: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to flush report: {0}")]
    Io(#[from] std::io::Error),
}

fn report_rows(departments: &[Department]) -> Vec<ScoreReportRow> {
    let mut rows = Vec::new();
    for department in departments {
        for objective in &department.objectives {
            for key_result in &objective.key_results {
                let (score, level) = match key_result.score.scored() {
                    Some(result) => (format!("{:.2}", result.score), result.level.clone()),
                    None => (String::new(), String::new()),
                };
                rows.push(ScoreReportRow {
                    department: department.name.clone(),
                    objective: objective.name.clone(),
                    key_result: key_result.name.clone(),
                    metric_type: key_result.metric_type.label(),
                    unit: key_result.unit.clone().unwrap_or_default(),
                    weight: key_result.weight,
                    actual_value: key_result.actual_value.clone(),
                    score,
                    level,
                });
            }
        }
    }
    rows
}

/// Write the score report as CSV, one row per key result, with a trailing
/// summary row per department carrying its display score.
pub fn write_score_report<W: Write>(
    writer: W,
    departments: &[Department],
) -> Result<(), ExportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in report_rows(departments) {
        csv_writer.serialize(row)?;
    }
    for department in departments {
        if let Some(result) = department.display_score().scored() {
            csv_writer.serialize(ScoreReportRow {
                department: department.name.clone(),
                objective: "TOTAL".to_string(),
                key_result: String::new(),
                metric_type: "",
                unit: String::new(),
                weight: 100.0,
                actual_value: String::new(),
                score: format!("{:.2}", result.score),
                level: result.level.clone(),
            })?;
        }
    }
    csv_writer.flush()?;
    Ok(())
}
