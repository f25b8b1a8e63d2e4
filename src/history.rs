//! Per-program daily history series kept in the document store.

use chrono::{Duration, NaiveDate};
use tracing::{debug, info};

use crate::models::{DailyPoint, Metric, OrderTable};
use crate::source::EnrolmentSource;
use crate::store::DocumentStore;
use crate::term::{self, Term};
use crate::workbook::{Cell, Sheet};

/// Brings a program's stored series up to `today` and returns it.
///
/// An existing file is extended with every date after its last point. A
/// missing file is built from scratch over every enrolment cycle from
/// `first_year` to `latest`.
pub async fn refresh_series<S: EnrolmentSource + ?Sized>(
    source: &S,
    store: &DocumentStore,
    metric: Metric,
    program: &str,
    latest: &Term,
    first_year: i32,
    today: NaiveDate,
) -> anyhow::Result<Vec<DailyPoint>> {
    let existing = store.read_series(latest, metric, program)?;
    let last_date = existing
        .as_ref()
        .and_then(|points| points.iter().map(|point| point.ds).max());

    let (mut points, windows) = match (existing, last_date) {
        (Some(points), Some(last)) => {
            let windows = if last < today {
                vec![(*latest, last + Duration::days(1), today)]
            } else {
                Vec::new()
            };
            (points, windows)
        }
        _ => {
            info!(
                program,
                metric = metric.folder(),
                term = %latest,
                "building history series from {first_year}"
            );
            (Vec::new(), term::history_cycles(first_year, latest, today))
        }
    };

    if windows.is_empty() {
        return Ok(points);
    }

    for (term, start, end) in windows {
        for date in term::dates_between(start, end) {
            let y = source.daily_count(metric, program, &term, date).await?;
            debug!(program, metric = metric.folder(), term = %term, %date, y, "history point");
            points.push(DailyPoint { ds: date, y, term });
        }
    }

    store.write_series(latest, metric, program, &points)?;
    Ok(points)
}

/// Every stored series of a metric, stacked with program and school columns.
pub fn cumulative_sheet(
    store: &DocumentStore,
    latest: &Term,
    metric: Metric,
    order: &OrderTable,
    name: &str,
) -> anyhow::Result<Sheet> {
    let mut rows = Vec::new();
    for program in store.list_series(latest, metric)? {
        let Some(points) = store.read_series(latest, metric, &program)? else {
            continue;
        };
        let school = order.school_of(&program);
        for point in points {
            rows.push(vec![
                Cell::Date(point.ds),
                Cell::Number(point.y as f64),
                Cell::text(point.term.to_string()),
                Cell::text(&program),
                Cell::optional_text(school),
            ]);
        }
    }
    Ok(Sheet::with_headers(
        name,
        &["ds", "y", "term", "program", "school"],
        rows,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OrderEntry;
    use crate::source::testing::FixtureSource;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn term(code: &str) -> Term {
        code.parse().expect("valid term")
    }

    #[tokio::test]
    async fn missing_series_is_built_over_every_cycle() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = DocumentStore::new(dir.path());
        let source = FixtureSource {
            daily_value: 3,
            ..FixtureSource::default()
        };
        let latest = term("2024F");
        let today = date(2023, 9, 23);

        let points = refresh_series(
            &source,
            &store,
            Metric::Registrations,
            "ACTG",
            &latest,
            2023,
            today,
        )
        .await
        .expect("refreshed");

        // 2022-09-21..=2023-09-20 for 2023F, then 2023-09-21..=2023-09-23 for 2024F.
        assert_eq!(points.len(), 365 + 3);
        assert_eq!(points[364].ds, date(2023, 9, 20));
        assert_eq!(points[365].ds, date(2023, 9, 21));
        assert_eq!(points[365].term, latest);
        assert_eq!(points[0].term, term("2023F"));
        assert_eq!(points.last().map(|point| point.term), Some(latest));
        assert!(points.iter().all(|point| point.y == 3));
        assert!(store
            .series_path(&latest, Metric::Registrations, "ACTG")
            .exists());
    }

    #[tokio::test]
    async fn existing_series_only_fetches_new_dates() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = DocumentStore::new(dir.path());
        let latest = term("2024F");
        let stored = vec![DailyPoint {
            ds: date(2024, 5, 1),
            y: 7,
            term: latest,
        }];
        store
            .write_series(&latest, Metric::Applications, "BUSN", &stored)
            .expect("seeded");

        let source = FixtureSource {
            daily_value: 9,
            ..FixtureSource::default()
        };
        let points = refresh_series(
            &source,
            &store,
            Metric::Applications,
            "BUSN",
            &latest,
            2020,
            date(2024, 5, 3),
        )
        .await
        .expect("refreshed");

        assert_eq!(
            points.iter().map(|point| point.y).collect::<Vec<_>>(),
            [7, 9, 9]
        );
        let calls = source.daily_calls.lock().expect("calls").clone();
        let dates: Vec<NaiveDate> = calls.iter().map(|call| call.3).collect();
        assert_eq!(dates, [date(2024, 5, 2), date(2024, 5, 3)]);

        let again = refresh_series(
            &source,
            &store,
            Metric::Applications,
            "BUSN",
            &latest,
            2020,
            date(2024, 5, 3),
        )
        .await
        .expect("refreshed");
        assert_eq!(again.len(), 3);
        assert_eq!(source.daily_calls.lock().expect("calls").len(), 2);
    }

    #[test]
    fn cumulative_sheet_stacks_series_with_school() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = DocumentStore::new(dir.path());
        let latest = term("2024F");
        for program in ["ACTG", "ZZZZ"] {
            store
                .write_series(
                    &latest,
                    Metric::Confirmations,
                    program,
                    &[DailyPoint {
                        ds: date(2024, 4, 1),
                        y: 2,
                        term: latest,
                    }],
                )
                .expect("written");
        }
        let order = OrderTable::new(vec![OrderEntry {
            program: "ACTG".to_string(),
            school: "Business".to_string(),
        }]);

        let sheet = cumulative_sheet(&store, &latest, Metric::Confirmations, &order, "confs_cumulative")
            .expect("sheet");
        assert_eq!(sheet.rows.len(), 2);
        assert_eq!(sheet.rows[0][4], Cell::text("Business"));
        assert_eq!(sheet.rows[1][4], Cell::Empty);
    }
}
