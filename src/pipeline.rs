//! One batch run for an intake: refresh the side lists, extract every term,
//! build each report, forecast the budget targets and publish the workbook.

use std::fs;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use anyhow::{bail, Context};
use chrono::NaiveDate;
use tracing::{debug, error, info, warn};

use crate::aggregate::{self, TermSnapshot, TermWindow, WideTable};
use crate::config::IntakeSettings;
use crate::error::ReportError;
use crate::forecast;
use crate::history;
use crate::models::{BudgetEntry, Campus, Metric, OrderTable, ProgramTitle, TargetEstimate};
use crate::report::{self, MetricTotal, RunSummary};
use crate::reports::{self, ApplicationReport};
use crate::rules::{OfferEpochPolicy, StudentKind};
use crate::sidefiles::{self, OttawaLine};
use crate::source::EnrolmentSource;
use crate::store::{DocumentStore, BUDGETS, ORDERS};
use crate::term::Term;
use crate::workbook::{self, Sheet};

pub const PROJECTIONS_FILE: &str = "projections.xlsx";
const OTTAWA_SHEET: &str = "Ottawa";
const DASHBOARD_INPUT: &str = "DashboardInput.xlsx";

/// Reports whose latest totals are compared year over year in the summary.
const TOTALED: &[&str] = &["Applications", "Offers", "Confirmations", "TotalRegistrations"];

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub settings: IntakeSettings,
    pub today: NaiveDate,
    pub policy: OfferEpochPolicy,
    pub report_dir: PathBuf,
}

#[derive(Debug)]
pub struct RunOutcome {
    pub workbook: PathBuf,
    pub published: PathBuf,
    pub summary: PathBuf,
    pub sheets: Vec<String>,
    pub failures: Vec<ReportError>,
    pub estimates: Vec<TargetEstimate>,
}

impl RunOutcome {
    pub fn ensure_complete(&self) -> anyhow::Result<()> {
        if self.failures.is_empty() {
            return Ok(());
        }
        bail!(
            "{} report(s) failed; see {}",
            self.failures.len(),
            self.summary.display()
        )
    }

    /// Programs whose chance of reaching budget is below `threshold`, least
    /// likely first. Programs without a probability are left out.
    pub fn programs_at_risk(&self, threshold: f64) -> Vec<&TargetEstimate> {
        let mut at_risk: Vec<&TargetEstimate> = self
            .estimates
            .iter()
            .filter(|estimate| estimate.probability.is_some_and(|p| p < threshold))
            .collect();
        at_risk.sort_by(|a, b| {
            a.probability
                .unwrap_or_default()
                .total_cmp(&b.probability.unwrap_or_default())
        });
        at_risk
    }
}

/// Rebuilds the intake's order and budget lists from the projections
/// workbook and writes them to the store.
pub fn refresh_lists(
    store: &DocumentStore,
    settings: &IntakeSettings,
    projections: &Path,
) -> anyhow::Result<(OrderTable, Vec<BudgetEntry>)> {
    let latest = settings.latest().context("intake has no terms")?;
    let range = sidefiles::load_projection_range(projections, None)?;
    let lines = sidefiles::parse_projections(&sidefiles::range_to_grid(&range), &latest)?;
    let (order, budgets) = sidefiles::order_and_budget(&lines);

    let order_rows: Vec<(String, String)> = order
        .entries
        .iter()
        .map(|entry| (entry.program.clone(), entry.school.clone()))
        .collect();
    let budget_rows: Vec<(String, String)> = budgets
        .iter()
        .map(|budget| (budget.program.clone(), budget.target.to_string()))
        .collect();

    store.write(
        ORDERS,
        &settings.order_file,
        sidefiles::render_two_column(("Program", "School"), &order_rows).as_bytes(),
    )?;
    store.write(
        BUDGETS,
        &settings.budget_file,
        sidefiles::render_two_column(("Program", "Budget"), &budget_rows).as_bytes(),
    )?;
    info!(
        intake = %settings.intake,
        programs = order.entries.len(),
        "order and budget lists refreshed"
    );
    Ok((order, budgets))
}

fn load_ottawa_lines(projections: &Path, latest: &Term) -> anyhow::Result<Vec<OttawaLine>> {
    let range = sidefiles::load_projection_range(projections, Some(OTTAWA_SHEET))?;
    Ok(sidefiles::parse_ottawa_projections(
        &sidefiles::range_to_grid(&range),
        latest,
    )?)
}

type Extract<'a, R> = Pin<Box<dyn Future<Output = anyhow::Result<Vec<R>>> + Send + 'a>>;

/// Extracts one snapshot per term window, stopping at the first failure.
async fn gather<'a, R>(
    name: &str,
    windows: &[TermWindow],
    mut fetch: impl FnMut(TermWindow) -> Extract<'a, R>,
) -> Result<Vec<TermSnapshot<R>>, ReportError> {
    let mut snapshots = Vec::with_capacity(windows.len());
    for window in windows {
        match fetch(*window).await {
            Ok(rows) => {
                let snapshot = window.snapshot(rows);
                debug!(
                    extract = name,
                    term = %snapshot.term,
                    years_back = snapshot.years_back,
                    as_of = %snapshot.as_of,
                    rows = snapshot.rows.len(),
                    "extracted"
                );
                snapshots.push(snapshot);
            }
            Err(err) => {
                warn!(extract = name, term = %window.term, "extract failed: {err:#}");
                return Err(ReportError::for_term(name, window.term, format!("{err:#}")));
            }
        }
    }
    Ok(snapshots)
}

fn needs<'r, T>(extract: &'r Result<T, ReportError>, report: &str) -> Result<&'r T, ReportError> {
    extract.as_ref().map_err(|err| err.renamed(report))
}

#[derive(Default)]
struct RunState {
    sheets: Vec<Sheet>,
    failures: Vec<ReportError>,
    totals: Vec<MetricTotal>,
}

impl RunState {
    fn record(&mut self, result: Result<Sheet, ReportError>) {
        match result {
            Ok(sheet) => {
                info!(report = %sheet.name, rows = sheet.rows.len(), "report ready");
                self.sheets.push(sheet);
            }
            Err(failure) => {
                error!(
                    report = failure.report(),
                    term = %failure.term().map(|term| term.to_string()).unwrap_or_default(),
                    "{failure}"
                );
                self.failures.push(failure);
            }
        }
    }

    fn record_table(&mut self, name: &str, result: Result<WideTable, ReportError>) {
        if let Ok(table) = &result {
            if TOTALED.contains(&name) {
                if let Some(total) = MetricTotal::from_table(name, table) {
                    self.totals.push(total);
                }
            }
        }
        self.record(result.map(|table| table.to_sheet(name)));
    }
}

/// Refreshes a program's three history series and forecasts its
/// registrations against `target`.
pub async fn estimate_program<S: EnrolmentSource + ?Sized>(
    source: &S,
    store: &DocumentStore,
    program: &str,
    target: i64,
    latest: &Term,
    first_year: i32,
    today: NaiveDate,
) -> anyhow::Result<TargetEstimate> {
    let mut registrations = Vec::new();
    for metric in Metric::ALL {
        let series =
            history::refresh_series(source, store, metric, program, latest, first_year, today)
                .await?;
        if metric == Metric::Registrations {
            registrations = series;
        }
    }

    match forecast::estimate_target(program, &registrations, target, latest, today) {
        Ok(estimate) => Ok(estimate),
        Err(err) => {
            warn!(program, "no forecast: {err}");
            Ok(TargetEstimate {
                program: program.to_string(),
                probability: None,
                projected: registrations.last().map_or(0, |point| point.y),
            })
        }
    }
}

async fn probability_targets<S: EnrolmentSource + ?Sized>(
    source: &S,
    store: &DocumentStore,
    order: &OrderTable,
    budgets: &[BudgetEntry],
    latest: &Term,
    first_year: i32,
    today: NaiveDate,
) -> Result<Vec<TargetEstimate>, ReportError> {
    let mut estimates = Vec::new();
    for program in order.programs() {
        let Some(budget) = budgets.iter().find(|budget| budget.program == program) else {
            continue;
        };
        let estimate = estimate_program(
            source,
            store,
            program,
            budget.target,
            latest,
            first_year,
            today,
        )
        .await
        .map_err(|err| {
            ReportError::for_term("probability_targets", *latest, format!("{err:#}"))
        })?;
        estimates.push(estimate);
    }
    Ok(estimates)
}

/// Runs every report for one intake and publishes the workbook. Report
/// failures are collected in the outcome; only problems that stop the whole
/// run, like a missing order list, are returned as errors.
pub async fn run_intake<S: EnrolmentSource + ?Sized>(
    source: &S,
    store: &DocumentStore,
    options: &RunOptions,
) -> anyhow::Result<RunOutcome> {
    let settings = &options.settings;
    let today = options.today;
    let latest = settings.latest().context("intake has no terms")?;
    let first_year = settings.first_year().context("intake has no terms")?;
    info!(intake = %settings.intake, latest = %latest, %today, "starting run");

    let mut state = RunState::default();

    let projections = store.file(BUDGETS, PROJECTIONS_FILE);
    let mut ottawa_lines = Vec::new();
    if projections.exists() {
        if let Err(err) = refresh_lists(store, settings, &projections) {
            state.record(Err(ReportError::for_run("order", format!("{err:#}"))));
        }
        match load_ottawa_lines(&projections, &latest) {
            Ok(lines) => ottawa_lines = lines,
            Err(err) => warn!("no Ottawa projections: {err:#}"),
        }
    }

    let order = sidefiles::parse_order(&store.read(ORDERS, &settings.order_file)?)
        .with_context(|| format!("invalid order list {}", settings.order_file))?;
    let budgets = sidefiles::parse_budget(&store.read(BUDGETS, &settings.budget_file)?)
        .with_context(|| format!("invalid budget list {}", settings.budget_file))?;

    options.policy.warn_if_diverging(&settings.terms);
    let windows = aggregate::term_windows(&settings.terms, today);

    let applications = gather("application", &windows, move |window| {
        Box::pin(async move { source.application_snapshot(&window.term, window.as_of).await })
    })
    .await;
    let profiles = gather("applicant profile", &windows, move |window| {
        Box::pin(async move { source.applicant_profiles(&window.term, window.as_of).await })
    })
    .await;
    let main_registrations = gather("registration", &windows, move |window| {
        Box::pin(async move {
            source
                .registrations(&window.term, window.as_of, Campus::Main)
                .await
        })
    })
    .await;
    let ottawa_registrations = gather("Ottawa registration", &windows, move |window| {
        Box::pin(async move {
            source
                .registrations(&window.term, window.as_of, Campus::Ottawa)
                .await
        })
    })
    .await;
    let deposits = gather("deposit", &windows, move |window| {
        Box::pin(async move { source.deposits(&window.term, window.as_of).await })
    })
    .await;
    let titles: Result<Vec<ProgramTitle>, ReportError> = source
        .program_titles()
        .await
        .map_err(|err| ReportError::for_run("program titles", format!("{err:#}")));

    for report in ApplicationReport::ALL {
        let name = report.sheet_name();
        let table = needs(&applications, name).map(|snapshots| {
            reports::application_report(report, &order, options.policy, snapshots)
        });
        state.record_table(name, table);
    }

    let table = needs(&main_registrations, "TotalRegistrations")
        .map(|snapshots| reports::total_registrations(&order, snapshots));
    state.record_table("TotalRegistrations", table);

    for (name, kind) in [
        ("Term01Deposits", StudentKind::New),
        ("UpperYearDeposits", StudentKind::Returning),
    ] {
        let table = needs(&deposits, name)
            .map(|snapshots| reports::deposits_by_residency(&order, kind, snapshots));
        state.record_table(name, table);
    }
    for (name, kind) in [
        ("Term01Registrations", StudentKind::New),
        ("UpperYearRegistrations", StudentKind::Returning),
    ] {
        let table = needs(&main_registrations, name)
            .map(|snapshots| reports::registrations_by_residency(&order, kind, snapshots));
        state.record_table(name, table);
    }

    state.record(needs(&profiles, "MapInfo").map(|snapshots| reports::map_info(&order, snapshots)));
    state.record(
        needs(&ottawa_registrations, "Ottawa")
            .map(|snapshots| reports::ottawa(&ottawa_lines, snapshots)),
    );

    for (name, extract) in [
        ("regs_all_progs_all_aals", &main_registrations),
        ("regs_all_progs_all_aals_ott", &ottawa_registrations),
    ] {
        let sheet = needs(extract, name).and_then(|snapshots| {
            let titles = needs(&titles, name)?;
            Ok(reports::registrations_all_programs(name, titles, snapshots))
        });
        state.record(sheet);
    }

    state.record(Ok(reports::order_sheet(&order)));
    state.record(needs(&titles, "order_names").map(|titles| reports::order_names(&order, titles)));

    let estimates =
        probability_targets(source, store, &order, &budgets, &latest, first_year, today).await;
    state.record(
        estimates
            .as_ref()
            .map(|estimates| reports::probability_targets(&order, &budgets, estimates))
            .map_err(Clone::clone),
    );

    for (name, metric) in [
        ("apps_cumulative", Metric::Applications),
        ("confs_cumulative", Metric::Confirmations),
    ] {
        let sheet = history::cumulative_sheet(store, &latest, metric, &order, name)
            .map_err(|err| ReportError::for_run(name, format!("{err:#}")));
        state.record(sheet);
    }

    let counts = needs(&main_registrations, "registration_counts").and_then(|main| {
        let ottawa = needs(&ottawa_registrations, "registration_counts")?;
        let titles = needs(&titles, "registration_counts")?;
        let latest_rows = |snapshots: &[TermSnapshot<_>]| {
            snapshots
                .iter()
                .find(|snapshot| snapshot.term == latest)
                .map(|snapshot| snapshot.rows.clone())
                .unwrap_or_default()
        };
        let main_rows = latest_rows(main.as_slice());
        let ottawa_rows = latest_rows(ottawa.as_slice());
        Ok(reports::registration_counts(
            titles,
            &[main_rows.as_slice(), ottawa_rows.as_slice()],
        ))
    });
    state.record(counts);

    fs::create_dir_all(&options.report_dir)
        .with_context(|| format!("failed to create {}", options.report_dir.display()))?;
    let workbook_path = options
        .report_dir
        .join(format!("{latest}_EnrolmentReport.xlsx"));
    workbook::write_workbook(&workbook_path, &state.sheets)?;
    let dashboard_input = options.report_dir.join(DASHBOARD_INPUT);
    fs::copy(&workbook_path, &dashboard_input)
        .with_context(|| format!("failed to copy workbook to {}", dashboard_input.display()))?;
    let published = store.publish(&workbook_path, &settings.published_name())?;
    info!(path = %published.display(), "workbook published");

    let estimates = estimates.unwrap_or_default();
    let sheet_names: Vec<String> = state.sheets.iter().map(|sheet| sheet.name.clone()).collect();
    let summary = RunSummary {
        intake: settings.intake,
        latest,
        generated_on: today,
        sheets: sheet_names.clone(),
        failures: state.failures.clone(),
        totals: state.totals,
        estimates: estimates.clone(),
    };
    let summary_path = options.report_dir.join(format!("{latest}_run_summary.md"));
    fs::write(&summary_path, report::build_summary(&summary))
        .with_context(|| format!("failed to write {}", summary_path.display()))?;

    if state.failures.is_empty() {
        info!(sheets = sheet_names.len(), "run complete");
    } else {
        warn!(
            sheets = sheet_names.len(),
            failures = state.failures.len(),
            "run complete with failed reports"
        );
    }

    Ok(RunOutcome {
        workbook: workbook_path,
        published,
        summary: summary_path,
        sheets: sheet_names,
        failures: state.failures,
        estimates,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use calamine::{open_workbook, Data, Reader, Xlsx};
    use rust_xlsxwriter::Workbook;

    use super::*;
    use crate::models::{ApplicationRow, RegistrationRow};
    use crate::source::testing::FixtureSource;
    use crate::term::Intake;

    fn term(code: &str) -> Term {
        code.parse().expect("valid term")
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn application(program: &str, status: &str) -> ApplicationRow {
        ApplicationRow {
            program: program.to_string(),
            level: Some(1),
            choice: Some(1),
            status: status.to_string(),
            status_history: vec!["APP".to_string(), status.to_string()],
        }
    }

    fn registration(id: &str, program: &str, immigration: &str) -> RegistrationRow {
        RegistrationRow {
            student_id: id.to_string(),
            program: program.to_string(),
            aal: Some("01".to_string()),
            acad_level: "PS".to_string(),
            location: "MAIN".to_string(),
            current_load: Some("F".to_string()),
            tenth_day_load: None,
            immigration_status: Some(immigration.to_string()),
        }
    }

    fn seeded_store(dir: &Path) -> DocumentStore {
        let store = DocumentStore::new(dir.join("store"));
        store
            .write(
                ORDERS,
                "order_fall.txt",
                b"Program\tSchool\nACTG\tBusiness\nNURS\tHealth\n",
            )
            .expect("order written");
        store
            .write(BUDGETS, "budget_fall.txt", b"Program\tBudget\nACTG\t40\n")
            .expect("budget written");
        store
    }

    fn fixture() -> FixtureSource {
        let mut source = FixtureSource {
            daily_value: 2,
            ..FixtureSource::default()
        };
        source.applications.insert(
            term("2023F"),
            vec![application("ACTG", "APP"), application("NURS", "CCC")],
        );
        source.applications.insert(
            term("2024F"),
            vec![
                application("ACTG", "APP"),
                application("ACTG", "APP"),
                application("ACTG", "DLT"),
            ],
        );
        source.registrations.insert(
            (term("2024F"), "MAIN"),
            vec![registration("S1", "ACTG", "SV"), registration("S2", "ACTG", "CA")],
        );
        source
    }

    fn options(dir: &Path) -> RunOptions {
        RunOptions {
            settings: IntakeSettings::for_intake(Intake::Fall)
                .with_terms(vec![term("2023F"), term("2024F")]),
            today: date(2024, 7, 1),
            policy: OfferEpochPolicy::AsDeployed,
            report_dir: dir.join("reports"),
        }
    }

    fn number_at(path: &Path, sheet: &str, row: usize, col: usize) -> Option<f64> {
        let mut workbook: Xlsx<_> = open_workbook(path).expect("workbook opens");
        let range = workbook.worksheet_range(sheet).expect("sheet exists");
        match range.get((row, col)) {
            Some(Data::Float(value)) => Some(*value),
            Some(Data::Int(value)) => Some(*value as f64),
            _ => None,
        }
    }

    #[tokio::test]
    async fn full_run_publishes_every_sheet() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = seeded_store(dir.path());
        let source = fixture();
        let options = options(dir.path());

        let outcome = run_intake(&source, &store, &options).await.expect("run");

        assert!(outcome.failures.is_empty(), "{:?}", outcome.failures);
        outcome.ensure_complete().expect("complete");
        for sheet in [
            "FirstChoiceApplications",
            "Applications",
            "DeletedApplications",
            "Offers",
            "Confirmations",
            "OutstandingOffers",
            "Holds",
            "Withdrawals",
            "Waitlist",
            "TotalRegistrations",
            "Term01Deposits",
            "UpperYearDeposits",
            "Term01Registrations",
            "UpperYearRegistrations",
            "MapInfo",
            "Ottawa",
            "regs_all_progs_all_aals",
            "regs_all_progs_all_aals_ott",
            "order",
            "order_names",
            "probability_targets",
            "apps_cumulative",
            "confs_cumulative",
            "registration_counts",
        ] {
            assert!(outcome.sheets.iter().any(|name| name == sheet), "missing {sheet}");
        }

        assert!(outcome.workbook.ends_with("2024F_EnrolmentReport.xlsx"));
        assert!(options.report_dir.join("DashboardInput.xlsx").exists());
        assert!(store.file("reports", "DashboardInput_fall.xlsx").exists());
        assert_eq!(outcome.published, store.file("reports", "DashboardInput_fall.xlsx"));

        // Applications: ACTG row, 2023F then 2024F columns.
        assert_eq!(number_at(&outcome.workbook, "Applications", 1, 2), Some(1.0));
        assert_eq!(number_at(&outcome.workbook, "Applications", 1, 3), Some(2.0));
        assert_eq!(number_at(&outcome.workbook, "Applications", 2, 3), Some(0.0));

        let seen = source.as_of_seen.lock().expect("seen").clone();
        assert!(seen.contains(&(term("2023F"), date(2023, 7, 1))));
        assert!(seen.contains(&(term("2024F"), date(2024, 7, 1))));

        assert_eq!(outcome.estimates.len(), 1);
        assert_eq!(outcome.estimates[0].program, "ACTG");
        // A flat two-a-day series never gets near a budget of 40.
        let at_risk: Vec<&str> = outcome
            .programs_at_risk(0.5)
            .iter()
            .map(|estimate| estimate.program.as_str())
            .collect();
        assert_eq!(at_risk, ["ACTG"]);

        let summary = fs::read_to_string(&outcome.summary).expect("summary written");
        assert!(summary.contains("All reports completed."));
        assert!(summary.contains("- Applications: 2 (Applications 2024F) vs 2 (Applications 2023F), +0.0%"));
    }

    #[test]
    fn programs_at_risk_skip_unknown_and_likely_programs() {
        let estimate = |program: &str, probability: Option<f64>| TargetEstimate {
            program: program.to_string(),
            probability,
            projected: 10,
        };
        let outcome = RunOutcome {
            workbook: PathBuf::from("2024F_EnrolmentReport.xlsx"),
            published: PathBuf::from("DashboardInput_fall.xlsx"),
            summary: PathBuf::from("2024F_run_summary.md"),
            sheets: Vec::new(),
            failures: Vec::new(),
            estimates: vec![
                estimate("ACTG", Some(0.4)),
                estimate("BUSN", None),
                estimate("NURS", Some(0.9)),
                estimate("PHRM", Some(0.1)),
            ],
        };
        let at_risk: Vec<&str> = outcome
            .programs_at_risk(0.5)
            .iter()
            .map(|estimate| estimate.program.as_str())
            .collect();
        assert_eq!(at_risk, ["PHRM", "ACTG"]);
    }

    #[tokio::test]
    async fn failed_term_fails_its_reports_but_not_the_run() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = seeded_store(dir.path());
        let mut source = fixture();
        source.failing = HashSet::from([term("2023F")]);
        let options = options(dir.path());

        let outcome = run_intake(&source, &store, &options).await.expect("run");

        let messages: Vec<String> = outcome.failures.iter().map(ToString::to_string).collect();
        assert!(messages.iter().any(|message| message
            .starts_with("Applications report for term 2023F failed: connection reset")));
        assert!(messages
            .iter()
            .any(|message| message.starts_with("Offers report for term 2023F failed")));
        assert!(outcome.sheets.iter().any(|name| name == "order"));
        assert!(!outcome.sheets.iter().any(|name| name == "Applications"));
        assert!(outcome.workbook.exists());
        assert!(outcome.ensure_complete().is_err());

        let summary = fs::read_to_string(&outcome.summary).expect("summary written");
        assert!(summary.contains("- Offers report for term 2023F failed"));
    }

    #[tokio::test]
    async fn missing_order_list_stops_the_run() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = DocumentStore::new(dir.path().join("empty"));
        let source = fixture();
        assert!(run_intake(&source, &store, &options(dir.path())).await.is_err());
    }

    #[test]
    fn projections_workbook_rebuilds_lists() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = DocumentStore::new(dir.path());
        let path = dir.path().join(PROJECTIONS_FILE);

        let rows: [&[&str]; 4] = [
            &["School", "Program", "Previous Program Codes", "Active", "", "", "", "", ""],
            &["", "", "", "", "2024F", "", "", "", ""],
            &["Business", "ACTG1", "", "Y", "2024F", "1", "35", "12", "47"],
            &["Health", "NURS", "", "N", "2024F", "1", "50", "0", "50"],
        ];
        let mut book = Workbook::new();
        let sheet = book.add_worksheet();
        for (r, row) in rows.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                if !value.is_empty() {
                    sheet
                        .write_string(r as u32, c as u16, *value)
                        .expect("cell written");
                }
            }
        }
        book.save(&path).expect("projections saved");

        let settings = IntakeSettings::for_intake(Intake::Fall);
        let (order, budgets) = refresh_lists(&store, &settings, &path).expect("refreshed");
        assert_eq!(order.programs().collect::<Vec<_>>(), ["ACTG"]);
        assert_eq!(budgets[0].target, 47);
        assert_eq!(
            store.read(ORDERS, "order_fall.txt").expect("order"),
            "Program\tSchool\nACTG\tBusiness\n"
        );
        assert_eq!(
            store.read(BUDGETS, "budget_fall.txt").expect("budget"),
            "Program\tBudget\nACTG\t47\n"
        );
    }
}
