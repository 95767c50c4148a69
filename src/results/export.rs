//! Flat `framework,metric,value` export of a run's metrics.

use serde_json::Value;
use std::io::Write;
use std::path::Path;

use crate::error::Result;
use crate::frameworks::FrameworkResult;

pub const DEFAULT_EXPORT_FILE: &str = "simulation_results.csv";
pub const CSV_HEADER: [&str; 3] = ["framework", "metric", "value"];

#[derive(Debug, Clone, PartialEq)]
pub struct MetricRow {
    pub framework: String,
    pub metric: String,
    pub value: String,
}

/// Value text as written to the file: strings bare, everything else as JSON.
fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// One row per metric, in result order then backend key order.
pub fn export_rows(results: &[FrameworkResult]) -> Vec<MetricRow> {
    results
        .iter()
        .flat_map(|r| {
            r.raw_metrics.iter().map(|(metric, value)| MetricRow {
                framework: r.framework.as_str().to_string(),
                metric: metric.clone(),
                value: value_text(value),
            })
        })
        .collect()
}

/// Write header and rows. Fields are never quoted or escaped.
pub fn write_csv<W: Write>(writer: W, results: &[FrameworkResult]) -> Result<usize> {
    let mut wtr = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Never)
        .from_writer(writer);
    wtr.write_record(CSV_HEADER)?;
    let rows = export_rows(results);
    for row in &rows {
        wtr.write_record([&row.framework, &row.metric, &row.value])?;
    }
    wtr.flush()?;
    Ok(rows.len())
}

pub fn to_csv_string(results: &[FrameworkResult]) -> Result<String> {
    let mut buf = Vec::new();
    write_csv(&mut buf, results)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Export to `path`, returning the number of data rows written.
pub fn export_to_file(path: &Path, results: &[FrameworkResult]) -> Result<usize> {
    let file = std::fs::File::create(path)?;
    let count = write_csv(file, results)?;
    tracing::info!("Exported {} metric rows to {}", count, path.display());
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frameworks::Framework;
    use serde_json::json;

    fn run() -> Vec<FrameworkResult> {
        vec![
            FrameworkResult::with_metrics(Framework::Utilitarian, json!({"total_utility": 7})),
            FrameworkResult::with_metrics(Framework::Fairness, json!({"parity_gap": 0.2})),
            FrameworkResult::with_metrics(
                Framework::RuleBased,
                json!({"constraint_satisfaction_rate": 0.9}),
            ),
        ]
    }

    #[test]
    fn test_header_and_rows_in_order() {
        let csv = to_csv_string(&run()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines,
            vec![
                "framework,metric,value",
                "utilitarian,total_utility,7",
                "fairness,parity_gap,0.2",
                "rule_based,constraint_satisfaction_rate,0.9",
            ]
        );
    }

    #[test]
    fn test_backend_key_order_and_nested_values() {
        let results = vec![FrameworkResult::with_metrics(
            Framework::Fairness,
            json!({"selection_rates": {"f": 0.5}, "parity_gap": 0.1, "note": "ok"}),
        )];
        let rows = export_rows(&results);
        let metrics: Vec<&str> = rows.iter().map(|r| r.metric.as_str()).collect();
        assert_eq!(metrics, vec!["selection_rates", "parity_gap", "note"]);
        assert_eq!(rows[0].value, r#"{"f":0.5}"#);
        assert_eq!(rows[2].value, "ok");
    }

    #[test]
    fn test_empty_run_writes_header_only() {
        assert_eq!(to_csv_string(&[]).unwrap(), "framework,metric,value\n");
    }
}
