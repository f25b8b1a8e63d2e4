use std::fmt::Write;

use chrono::NaiveDate;

use crate::aggregate::WideTable;
use crate::error::ReportError;
use crate::models::TargetEstimate;
use crate::term::{Intake, Term};

/// Sum of a report's latest column next to the column before it.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricTotal {
    pub report: String,
    pub column: String,
    pub total: u64,
    pub previous: Option<(String, u64)>,
}

impl MetricTotal {
    pub fn from_table(report: &str, table: &WideTable) -> Option<Self> {
        let column = table.columns.last()?;
        let total = table.column_total(column)?;
        let previous = table
            .columns
            .len()
            .checked_sub(2)
            .and_then(|index| table.columns.get(index))
            .and_then(|name| table.column_total(name).map(|sum| (name.clone(), sum)));
        Some(Self {
            report: report.to_string(),
            column: column.clone(),
            total,
            previous,
        })
    }
}

/// Everything a run leaves behind, for the markdown summary.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub intake: Intake,
    pub latest: Term,
    pub generated_on: NaiveDate,
    pub sheets: Vec<String>,
    pub failures: Vec<ReportError>,
    pub totals: Vec<MetricTotal>,
    pub estimates: Vec<TargetEstimate>,
}

/// Year-over-year change in percent; `None` when there is nothing to compare
/// against.
pub fn percent_change(current: u64, previous: u64) -> Option<f64> {
    if previous == 0 {
        return None;
    }
    Some((current as f64 - previous as f64) / previous as f64 * 100.0)
}

pub fn build_summary(summary: &RunSummary) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Enrolment Dashboard Run");
    let _ = writeln!(
        output,
        "Generated on {} for the {} intake (latest term {})",
        summary.generated_on, summary.intake, summary.latest
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Sheets");

    if summary.sheets.is_empty() {
        let _ = writeln!(output, "No sheets were produced.");
    } else {
        for sheet in summary.sheets.iter() {
            let _ = writeln!(output, "- {sheet}");
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Failures");

    if summary.failures.is_empty() {
        let _ = writeln!(output, "All reports completed.");
    } else {
        for failure in summary.failures.iter() {
            let _ = writeln!(output, "- {failure}");
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Intake Totals");

    if summary.totals.is_empty() {
        let _ = writeln!(output, "No totals available.");
    } else {
        for total in summary.totals.iter() {
            match &total.previous {
                Some((column, previous)) => {
                    let change = percent_change(total.total, *previous)
                        .map_or_else(|| "change n/a".to_string(), |pct| format!("{pct:+.1}%"));
                    let _ = writeln!(
                        output,
                        "- {}: {} ({}) vs {} ({}), {}",
                        total.report, total.total, total.column, previous, column, change
                    );
                }
                None => {
                    let _ = writeln!(output, "- {}: {} ({})", total.report, total.total, total.column);
                }
            }
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Target Probabilities");

    if summary.estimates.is_empty() {
        let _ = writeln!(output, "No programs had a budget and a registration history.");
    } else {
        let mut estimates = summary.estimates.clone();
        estimates.sort_by(|a, b| {
            a.probability
                .unwrap_or(f64::INFINITY)
                .total_cmp(&b.probability.unwrap_or(f64::INFINITY))
        });
        for estimate in estimates.iter() {
            match estimate.probability {
                Some(probability) => {
                    let _ = writeln!(
                        output,
                        "- {}: {:.1}% chance of reaching target, projected {}",
                        estimate.program,
                        probability * 100.0,
                        estimate.projected
                    );
                }
                None => {
                    let _ = writeln!(
                        output,
                        "- {}: probability unavailable, projected {}",
                        estimate.program, estimate.projected
                    );
                }
            }
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{Spine, WideRow};

    fn table(values: &[&[u64]]) -> WideTable {
        WideTable {
            spine: Spine::Programs,
            columns: vec!["Offers 2023F".to_string(), "Offers 2024F".to_string()],
            rows: values
                .iter()
                .map(|row| WideRow {
                    program: "ACTG".to_string(),
                    school: "Business".to_string(),
                    residency: None,
                    values: row.to_vec(),
                })
                .collect(),
        }
    }

    #[test]
    fn percent_change_guards_zero_denominator() {
        assert_eq!(percent_change(12, 0), None);
        assert_eq!(percent_change(15, 10), Some(50.0));
        assert_eq!(percent_change(5, 10), Some(-50.0));
    }

    #[test]
    fn totals_compare_last_two_columns() {
        let total = MetricTotal::from_table("Offers", &table(&[&[4, 6], &[1, 2]])).expect("total");
        assert_eq!(total.total, 8);
        assert_eq!(total.column, "Offers 2024F");
        assert_eq!(total.previous, Some(("Offers 2023F".to_string(), 5)));
    }

    #[test]
    fn summary_lists_failures_and_unavailable_probabilities() {
        let term: Term = "2024F".parse().expect("valid term");
        let summary = RunSummary {
            intake: Intake::Fall,
            latest: term,
            generated_on: NaiveDate::from_ymd_opt(2024, 7, 1).expect("valid date"),
            sheets: vec!["Applications".to_string()],
            failures: vec![ReportError::for_term("Offers", term, "timeout")],
            totals: vec![MetricTotal::from_table("Offers", &table(&[&[0, 3]])).expect("total")],
            estimates: vec![
                TargetEstimate {
                    program: "ACTG".to_string(),
                    probability: None,
                    projected: 12,
                },
                TargetEstimate {
                    program: "BUSN".to_string(),
                    probability: Some(0.25),
                    projected: 30,
                },
            ],
        };

        let report = build_summary(&summary);
        assert!(report.contains("for the fall intake (latest term 2024F)"));
        assert!(report.contains("- Offers report for term 2024F failed: timeout"));
        assert!(report.contains("- Offers: 3 (Offers 2024F) vs 0 (Offers 2023F), change n/a"));
        let busn = report.find("- BUSN: 25.0% chance").expect("busn line");
        let actg = report.find("- ACTG: probability unavailable").expect("actg line");
        assert!(busn < actg);
    }
}
