//! Report builders. Each one turns per-term snapshots into a sheet of the
//! published workbook.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use chrono::{Months, NaiveDate};

use crate::aggregate::{
    self, count_by_program, Counts, Residency, Spine, SpineKey, TermSnapshot, WideTable,
};
use crate::models::{
    ApplicantProfile, ApplicationRow, BudgetEntry, Campus, DepositRow, OrderTable, ProgramTitle,
    RegistrationRow, TargetEstimate,
};
use crate::rules::{self, OfferEpochPolicy, StudentKind};
use crate::sidefiles::OttawaLine;
use crate::term::{self, Term};
use crate::workbook::{Cell, Sheet};

/// Reports computed from the shared application snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplicationReport {
    FirstChoice,
    Applications,
    Deleted,
    Offers,
    Confirmations,
    OutstandingOffers,
    Holds,
    Withdrawals,
    Waitlist,
}

impl ApplicationReport {
    pub const ALL: [ApplicationReport; 9] = [
        ApplicationReport::FirstChoice,
        ApplicationReport::Applications,
        ApplicationReport::Deleted,
        ApplicationReport::Offers,
        ApplicationReport::Confirmations,
        ApplicationReport::OutstandingOffers,
        ApplicationReport::Holds,
        ApplicationReport::Withdrawals,
        ApplicationReport::Waitlist,
    ];

    pub fn sheet_name(self) -> &'static str {
        match self {
            ApplicationReport::FirstChoice => "FirstChoiceApplications",
            ApplicationReport::Applications => "Applications",
            ApplicationReport::Deleted => "DeletedApplications",
            ApplicationReport::Offers => "Offers",
            ApplicationReport::Confirmations => "Confirmations",
            ApplicationReport::OutstandingOffers => "OutstandingOffers",
            ApplicationReport::Holds => "Holds",
            ApplicationReport::Withdrawals => "Withdrawals",
            ApplicationReport::Waitlist => "Waitlist",
        }
    }

    fn column_label(self) -> &'static str {
        match self {
            ApplicationReport::FirstChoice => "First Choice",
            ApplicationReport::Applications => "Applications",
            ApplicationReport::Deleted => "Deleted",
            ApplicationReport::Offers => "Offers",
            ApplicationReport::Confirmations => "Confirmations",
            ApplicationReport::OutstandingOffers => "Outstanding",
            ApplicationReport::Holds => "Holds",
            ApplicationReport::Withdrawals => "Withdrawals",
            ApplicationReport::Waitlist => "Waitlist",
        }
    }

    /// Whether an application counts towards this report for `term`.
    pub fn keeps(self, row: &ApplicationRow, term: &Term, policy: OfferEpochPolicy) -> bool {
        let status = row.status.as_str();
        let is_new = rules::classify(&row.program, row.level) == StudentKind::New;
        match self {
            ApplicationReport::FirstChoice => row.choice == Some(1),
            ApplicationReport::Applications => is_new && status != rules::DELETED,
            ApplicationReport::Deleted => is_new && status == rules::DELETED,
            ApplicationReport::Offers => {
                is_new && rules::is_accepted_offer(row, policy.epoch_for(term))
            }
            ApplicationReport::Confirmations => rules::CONFIRMED.contains(&status),
            ApplicationReport::OutstandingOffers => {
                row.choice.is_some() && rules::OUTSTANDING_OFFER.contains(&status)
            }
            ApplicationReport::Holds => row.choice.is_some() && rules::HOLD.contains(&status),
            ApplicationReport::Withdrawals => {
                row.choice.is_some() && rules::WITHDRAWN_OR_REFUSED.contains(&status)
            }
            ApplicationReport::Waitlist => {
                row.choice.is_some() && rules::WAITLIST.contains(&status)
            }
        }
    }
}

pub fn application_report(
    report: ApplicationReport,
    order: &OrderTable,
    policy: OfferEpochPolicy,
    snapshots: &[TermSnapshot<ApplicationRow>],
) -> WideTable {
    aggregate::assemble(
        order,
        report.column_label(),
        Spine::Programs,
        snapshots,
        |snapshot| {
            count_by_program(
                &snapshot.rows,
                |row| row.program.as_str(),
                |row| report.keeps(row, &snapshot.term, policy),
            )
        },
    )
}

/// Registrations carrying a full-time, overload or part-time load.
pub fn total_registrations(
    order: &OrderTable,
    snapshots: &[TermSnapshot<RegistrationRow>],
) -> WideTable {
    aggregate::assemble(order, "Registrations", Spine::Programs, snapshots, |snapshot| {
        count_by_program(
            &snapshot.rows,
            |row| row.program.as_str(),
            |row| rules::is_counted_load(row.current_load.as_deref()),
        )
    })
}

/// Full-time registrations of one kind of student, split by residency. A
/// student counts once per program.
pub fn registrations_by_residency(
    order: &OrderTable,
    kind: StudentKind,
    snapshots: &[TermSnapshot<RegistrationRow>],
) -> WideTable {
    aggregate::assemble(order, "Registrations", Spine::ByResidency, snapshots, |snapshot| {
        let mut seen = HashSet::new();
        let mut counts = Counts::new();
        for row in &snapshot.rows {
            if !rules::is_full_time(row.current_load.as_deref())
                || rules::classify_registration(row) != kind
                || !seen.insert((row.student_id.as_str(), row.program.as_str()))
            {
                continue;
            }
            let key = SpineKey::split(
                row.program.clone(),
                Residency::of(row.immigration_status.as_deref()),
            );
            *counts.entry(key).or_insert(0) += 1;
        }
        counts
    })
}

/// Students of one kind who had committed to attend by the term's as-of
/// date, counted once each and split by residency.
pub fn deposits_by_residency(
    order: &OrderTable,
    kind: StudentKind,
    snapshots: &[TermSnapshot<DepositRow>],
) -> WideTable {
    aggregate::assemble(order, "Deposits", Spine::ByResidency, snapshots, |snapshot| {
        let mut seen = HashSet::new();
        let mut counts = Counts::new();
        for row in &snapshot.rows {
            if rules::classify_deposit(row) != kind
                || !rules::has_qualifying_deposit(row, snapshot.as_of)
            {
                continue;
            }
            if !seen.insert(row.student_id.as_str()) {
                continue;
            }
            let key = SpineKey::split(
                row.program.clone(),
                Residency::of(row.immigration_status.as_deref()),
            );
            *counts.entry(key).or_insert(0) += 1;
        }
        counts
    })
}

/// Birth dates on or after the reference date were stored with the wrong
/// century.
fn corrected_birth_date(birth: NaiveDate, reference: NaiveDate) -> NaiveDate {
    if birth >= reference {
        birth.checked_sub_months(Months::new(1200)).unwrap_or(birth)
    } else {
        birth
    }
}

/// One row per applicant, indigenous flag and program across every term,
/// with the applicant's age group on the term's as-of date.
pub fn map_info(order: &OrderTable, snapshots: &[TermSnapshot<ApplicantProfile>]) -> Sheet {
    let mut seen: HashSet<(&str, bool, &str)> = HashSet::new();
    let mut rows = Vec::new();
    for snapshot in snapshots {
        for profile in &snapshot.rows {
            let key = (
                profile.applicant_id.as_str(),
                profile.indigenous,
                profile.program.as_str(),
            );
            if !seen.insert(key) {
                continue;
            }
            let age = profile
                .birth_date
                .map(|birth| term::age_on(corrected_birth_date(birth, snapshot.as_of), snapshot.as_of));
            rows.push(vec![
                Cell::text(&profile.applicant_id),
                Cell::text(&profile.program),
                Cell::optional_text(order.school_of(&profile.program)),
                Cell::text(snapshot.term.to_string()),
                Cell::optional_text(profile.gender.as_deref()),
                Cell::optional_number(age.map(f64::from)),
                Cell::optional_text(age.map(rules::age_group)),
                Cell::text(if profile.indigenous { "Y" } else { "N" }),
                Cell::optional_text(profile.city.as_deref()),
                Cell::optional_text(profile.postal_code.as_deref()),
                Cell::text(&profile.status),
                Cell::optional_number(profile.choice.map(f64::from)),
            ]);
        }
    }
    Sheet::with_headers(
        "MapInfo",
        &[
            "Applicant ID",
            "Program",
            "School",
            "Term",
            "Gender",
            "Age",
            "Age Group",
            "Indigenous",
            "City",
            "Postal Code",
            "Status",
            "Choice",
        ],
        rows,
    )
}

/// Ottawa campus projections next to the new full-time registrations of each
/// term.
pub fn ottawa(lines: &[OttawaLine], snapshots: &[TermSnapshot<RegistrationRow>]) -> Sheet {
    let mut headers = vec![
        "School".to_string(),
        "Program".to_string(),
        "Level".to_string(),
        "Projected International".to_string(),
    ];
    headers.extend(
        snapshots
            .iter()
            .map(|snapshot| format!("Registrations {}", snapshot.term)),
    );

    let counts: Vec<HashMap<&str, u64>> = snapshots
        .iter()
        .map(|snapshot| {
            let mut counts = HashMap::new();
            for row in &snapshot.rows {
                if rules::is_full_time(row.current_load.as_deref())
                    && rules::classify_registration(row) == StudentKind::New
                {
                    *counts.entry(row.program.as_str()).or_insert(0) += 1;
                }
            }
            counts
        })
        .collect();

    let rows = lines
        .iter()
        .filter(|line| {
            line.active
                && line
                    .level
                    .is_some_and(|level| rules::is_intake_level(&line.program, level))
        })
        .map(|line| {
            let program: String = line.program.chars().take(4).collect();
            let mut cells = vec![
                Cell::text(&line.school),
                Cell::text(&program),
                Cell::optional_number(line.level.map(f64::from)),
                Cell::Number(line.international),
            ];
            cells.extend(counts.iter().map(|per_term| {
                Cell::Number(per_term.get(program.as_str()).copied().unwrap_or(0) as f64)
            }));
            cells
        })
        .collect();

    Sheet::new("Ottawa", headers, rows)
}

/// Post-secondary full-time registrations of every program, whether or not
/// it is on the order list.
pub fn registrations_all_programs(
    name: &str,
    titles: &[ProgramTitle],
    snapshots: &[TermSnapshot<RegistrationRow>],
) -> Sheet {
    let per_term: Vec<BTreeMap<&str, u64>> = snapshots
        .iter()
        .map(|snapshot| {
            let mut counts = BTreeMap::new();
            for row in &snapshot.rows {
                if row.acad_level.trim() == "PS"
                    && rules::is_full_time(row.current_load.as_deref())
                {
                    *counts.entry(row.program.as_str()).or_insert(0) += 1;
                }
            }
            counts
        })
        .collect();
    let programs: BTreeSet<&str> = per_term.iter().flat_map(|counts| counts.keys().copied()).collect();

    let mut headers = vec!["Program".to_string(), "Title".to_string()];
    headers.extend(
        snapshots
            .iter()
            .map(|snapshot| format!("Registrations {}", snapshot.term)),
    );
    let rows = programs
        .into_iter()
        .map(|program| {
            let mut cells = vec![
                Cell::text(program),
                Cell::optional_text(title_of(titles, program)),
            ];
            cells.extend(per_term.iter().map(|counts| {
                Cell::Number(counts.get(program).copied().unwrap_or(0) as f64)
            }));
            cells
        })
        .collect();

    Sheet::new(name, headers, rows)
}

fn title_of<'a>(titles: &'a [ProgramTitle], program: &str) -> Option<&'a str> {
    titles
        .iter()
        .find(|title| title.program == program)
        .map(|title| title.title.as_str())
}

/// Latest-term registrations by location, program, load and
/// residency, with readable labels. The last column counts the rows that were
/// full-time on the tenth day of classes.
pub fn registration_counts(
    titles: &[ProgramTitle],
    campuses: &[&[RegistrationRow]],
) -> Sheet {
    let mut counts: BTreeMap<(&str, &str, &str, &str), (u64, u64)> = BTreeMap::new();
    for rows in campuses {
        for row in rows.iter() {
            let location = Campus::from_code(&row.location)
                .map_or(row.location.as_str(), |campus| campus.label());
            let load = row
                .current_load
                .as_deref()
                .and_then(rules::load_label)
                .unwrap_or("Other");
            let residency = row
                .immigration_status
                .as_deref()
                .and_then(rules::residency_label)
                .unwrap_or("Unknown");
            let entry = counts
                .entry((location, row.program.as_str(), load, residency))
                .or_insert((0, 0));
            entry.0 += 1;
            if rules::is_full_time(row.tenth_day_load.as_deref()) {
                entry.1 += 1;
            }
        }
    }
    let rows = counts
        .into_iter()
        .map(|((campus, program, load, residency), (count, tenth_day))| {
            vec![
                Cell::text(campus),
                Cell::text(program),
                Cell::optional_text(title_of(titles, program)),
                Cell::text(load),
                Cell::text(residency),
                Cell::Number(count as f64),
                Cell::Number(tenth_day as f64),
            ]
        })
        .collect();
    Sheet::with_headers(
        "registration_counts",
        &[
            "Location",
            "Program",
            "Title",
            "Load",
            "Residency",
            "Count",
            "Tenth Day Full-time",
        ],
        rows,
    )
}

pub fn order_sheet(order: &OrderTable) -> Sheet {
    let rows = order
        .entries
        .iter()
        .map(|entry| vec![Cell::text(&entry.program), Cell::text(&entry.school)])
        .collect();
    Sheet::with_headers("order", &["Program", "School"], rows)
}

pub fn order_names(order: &OrderTable, titles: &[ProgramTitle]) -> Sheet {
    let rows = order
        .entries
        .iter()
        .map(|entry| {
            vec![
                Cell::text(&entry.program),
                Cell::text(&entry.school),
                Cell::optional_text(title_of(titles, &entry.program)),
            ]
        })
        .collect();
    Sheet::with_headers("order_names", &["Program", "School", "Title"], rows)
}

pub fn probability_targets(
    order: &OrderTable,
    budgets: &[BudgetEntry],
    estimates: &[TargetEstimate],
) -> Sheet {
    let rows = estimates
        .iter()
        .map(|estimate| {
            let target = budgets
                .iter()
                .find(|budget| budget.program == estimate.program)
                .map(|budget| budget.target as f64);
            vec![
                Cell::text(&estimate.program),
                Cell::optional_text(order.school_of(&estimate.program)),
                Cell::optional_number(target),
                Cell::optional_number(estimate.probability),
                Cell::Number(estimate.projected as f64),
            ]
        })
        .collect();
    Sheet::with_headers(
        "probability_targets",
        &["Program", "School", "Target", "Probability", "Projected"],
        rows,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OrderEntry;

    fn term(code: &str) -> Term {
        code.parse().expect("valid term")
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn order(programs: &[&str]) -> OrderTable {
        OrderTable::new(
            programs
                .iter()
                .map(|program| OrderEntry {
                    program: program.to_string(),
                    school: "Technology".to_string(),
                })
                .collect(),
        )
    }

    fn snapshot<R>(code: &str, rows: Vec<R>) -> TermSnapshot<R> {
        TermSnapshot {
            term: term(code),
            years_back: 0,
            as_of: date(2024, 6, 1),
            rows,
        }
    }

    fn application(program: &str, level: i32, choice: Option<i32>, status: &str) -> ApplicationRow {
        ApplicationRow {
            program: program.to_string(),
            level: Some(level),
            choice,
            status: status.to_string(),
            status_history: vec!["APP".to_string(), status.to_string()],
        }
    }

    fn registration(program: &str, aal: &str, load: &str, immigration: &str) -> RegistrationRow {
        RegistrationRow {
            student_id: format!("{program}-{aal}-{immigration}"),
            program: program.to_string(),
            aal: Some(aal.to_string()),
            acad_level: "PS".to_string(),
            location: "MAIN".to_string(),
            current_load: Some(load.to_string()),
            tenth_day_load: None,
            immigration_status: Some(immigration.to_string()),
        }
    }

    #[test]
    fn applications_skip_returning_and_deleted() {
        let rows = vec![
            application("ACTG", 1, Some(1), "APP"),
            application("ACTG", 3, Some(1), "APP"),
            application("ACTG", 1, Some(2), "DLT"),
            application("FIRE", 4, None, "APP"),
        ];
        let snaps = [snapshot("2024F", rows)];
        let order = order(&["ACTG", "FIRE", "NURS"]);
        let policy = OfferEpochPolicy::AsDeployed;

        let apps = application_report(ApplicationReport::Applications, &order, policy, &snaps);
        assert_eq!(apps.value("ACTG", None, "Applications 2024F"), Some(1));
        assert_eq!(apps.value("FIRE", None, "Applications 2024F"), Some(1));
        assert_eq!(apps.value("NURS", None, "Applications 2024F"), Some(0));

        let deleted = application_report(ApplicationReport::Deleted, &order, policy, &snaps);
        assert_eq!(deleted.value("ACTG", None, "Deleted 2024F"), Some(1));

        let first = application_report(ApplicationReport::FirstChoice, &order, policy, &snaps);
        assert_eq!(first.value("ACTG", None, "First Choice 2024F"), Some(2));
    }

    #[test]
    fn status_reports_need_a_choice() {
        let rows = vec![
            application("ACTG", 1, Some(1), "HLD"),
            application("ACTG", 1, None, "HLD"),
            application("ACTG", 2, Some(1), "WTL"),
            application("ACTG", 1, Some(3), "ACU"),
        ];
        let snaps = [snapshot("2024F", rows)];
        let order = order(&["ACTG"]);
        let policy = OfferEpochPolicy::AsDeployed;
        let count = |report: ApplicationReport| {
            application_report(report, &order, policy, &snaps).rows[0].values[0]
        };
        assert_eq!(count(ApplicationReport::Holds), 1);
        assert_eq!(count(ApplicationReport::Waitlist), 1);
        assert_eq!(count(ApplicationReport::OutstandingOffers), 1);
        assert_eq!(count(ApplicationReport::Withdrawals), 0);
    }

    #[test]
    fn offers_follow_the_selected_epoch_policy() {
        let rows = vec![application("ACTG", 1, Some(1), "DLT")];
        let snaps = [snapshot("2024F", rows)];
        let order = order(&["ACTG"]);
        let deployed =
            application_report(ApplicationReport::Offers, &order, OfferEpochPolicy::AsDeployed, &snaps);
        let corrected =
            application_report(ApplicationReport::Offers, &order, OfferEpochPolicy::Corrected, &snaps);
        assert_eq!(deployed.rows[0].values, [0]);
        assert_eq!(corrected.rows[0].values, [1]);
    }

    #[test]
    fn residency_split_counts_full_time_new_students() {
        let rows = vec![
            registration("ACTG", "01", "F", "CA"),
            registration("ACTG", "01", "O", "SV"),
            registration("ACTG", "01", "P", "SV"),
            registration("ACTG", "03", "F", "SV"),
        ];
        let snaps = [snapshot("2024F", rows)];
        let order = order(&["ACTG"]);

        let new = registrations_by_residency(&order, StudentKind::New, &snaps);
        assert_eq!(new.value("ACTG", Some(Residency::Domestic), "Registrations 2024F"), Some(1));
        assert_eq!(
            new.value("ACTG", Some(Residency::International), "Registrations 2024F"),
            Some(1)
        );
        let upper = registrations_by_residency(&order, StudentKind::Returning, &snaps);
        assert_eq!(
            upper.value("ACTG", Some(Residency::International), "Registrations 2024F"),
            Some(1)
        );
        let total = total_registrations(&order, &snaps);
        assert_eq!(total.value("ACTG", None, "Registrations 2024F"), Some(4));
    }

    #[test]
    fn deposits_count_each_student_once() {
        let deposit = |student: &str, amount: f64| DepositRow {
            student_id: student.to_string(),
            program: "ACTG".to_string(),
            aal: Some("01".to_string()),
            immigration_status: Some("SV".to_string()),
            payment_amount: Some(amount),
            ro_noted_on: None,
            sponsorship_applied_on: None,
        };
        let snaps = [snapshot(
            "2024F",
            vec![deposit("S1", 500.0), deposit("S1", 500.0), deposit("S2", 2.0)],
        )];
        let table = deposits_by_residency(&order(&["ACTG"]), StudentKind::New, &snaps);
        assert_eq!(
            table.value("ACTG", Some(Residency::International), "Deposits 2024F"),
            Some(1)
        );
        assert_eq!(
            table.value("ACTG", Some(Residency::Domestic), "Deposits 2024F"),
            Some(0)
        );
    }

    #[test]
    fn deposits_dedupe_only_rows_that_qualify() {
        let deposit = |aal: &str, amount: f64| DepositRow {
            student_id: "S1".to_string(),
            program: "ACTG".to_string(),
            aal: Some(aal.to_string()),
            immigration_status: Some("CA".to_string()),
            payment_amount: Some(amount),
            ro_noted_on: None,
            sponsorship_applied_on: None,
        };
        let column = "Deposits 2024F";

        let returning_first = [snapshot("2024F", vec![deposit("02", 500.0), deposit("01", 500.0)])];
        let table = deposits_by_residency(&order(&["ACTG"]), StudentKind::New, &returning_first);
        assert_eq!(table.value("ACTG", Some(Residency::Domestic), column), Some(1));

        let unpaid_first = [snapshot("2024F", vec![deposit("01", 2.0), deposit("01", 500.0)])];
        let table = deposits_by_residency(&order(&["ACTG"]), StudentKind::New, &unpaid_first);
        assert_eq!(table.value("ACTG", Some(Residency::Domestic), column), Some(1));
    }

    #[test]
    fn map_info_dedupes_and_shifts_future_birth_dates() {
        let profile = |id: &str, birth: NaiveDate| ApplicantProfile {
            applicant_id: id.to_string(),
            birth_date: Some(birth),
            gender: Some("F".to_string()),
            indigenous: false,
            city: Some("Sarnia".to_string()),
            postal_code: None,
            program: "ACTG".to_string(),
            status: "APP".to_string(),
            choice: Some(1),
        };
        let snaps = [snapshot(
            "2024F",
            vec![
                profile("A1", date(2005, 1, 1)),
                profile("A1", date(2005, 1, 1)),
                profile("A2", date(2030, 1, 1)),
            ],
        )];
        let sheet = map_info(&order(&["ACTG"]), &snaps);
        assert_eq!(sheet.rows.len(), 2);
        let age = sheet.column("Age").expect("age column");
        let group = sheet.column("Age Group").expect("group column");
        assert_eq!(sheet.rows[0][age], Cell::Number(19.0));
        assert_eq!(sheet.rows[0][group], Cell::text("18-21"));
        assert_eq!(sheet.rows[1][age], Cell::Number(94.0));
        assert_eq!(sheet.rows[1][group], Cell::text(">50"));
    }

    #[test]
    fn registration_counts_use_readable_labels() {
        let mut confirmed = registration("ACTG", "02", "O", "PR");
        confirmed.tenth_day_load = Some("F".to_string());
        let main = vec![registration("ACTG", "01", "F", "CA"), confirmed];
        let mut ottawa = registration("ACTG", "01", "T", "SV");
        ottawa.location = "OTT".to_string();
        let titles = vec![ProgramTitle {
            program: "ACTG".to_string(),
            title: "Accounting".to_string(),
        }];
        let sheet = registration_counts(
            &titles,
            &[main.as_slice(), std::slice::from_ref(&ottawa)],
        );
        assert_eq!(
            sheet.rows,
            vec![
                vec![
                    Cell::text("Ottawa"),
                    Cell::text("ACTG"),
                    Cell::text("Accounting"),
                    Cell::text("Potential regs"),
                    Cell::text("International"),
                    Cell::Number(1.0),
                    Cell::Number(0.0),
                ],
                vec![
                    Cell::text("Sarnia"),
                    Cell::text("ACTG"),
                    Cell::text("Accounting"),
                    Cell::text("Full-time regs"),
                    Cell::text("Domestic"),
                    Cell::Number(2.0),
                    Cell::Number(1.0),
                ],
            ]
        );
    }

    #[test]
    fn all_program_registrations_include_unordered_programs() {
        let mut upgrading = registration("UPGR", "01", "F", "CA");
        upgrading.acad_level = "CE".to_string();
        let snaps = [
            snapshot("2023F", vec![registration("ZZZZ", "01", "F", "CA")]),
            snapshot("2024F", vec![registration("ACTG", "02", "O", "SV"), upgrading]),
        ];
        let sheet = registrations_all_programs("regs_all_progs_all_aals", &[], &snaps);
        assert_eq!(sheet.headers[2], "Registrations 2023F");
        let programs: Vec<&Cell> = sheet.rows.iter().map(|row| &row[0]).collect();
        assert_eq!(programs, [&Cell::text("ACTG"), &Cell::text("ZZZZ")]);
        assert_eq!(sheet.rows[0][2..], [Cell::Number(0.0), Cell::Number(1.0)]);
    }
}
