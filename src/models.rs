use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::term::Term;

/// One application as it stood on the extract's "as of" date.
#[derive(Debug, Clone)]
pub struct ApplicationRow {
    pub program: String,
    pub level: Option<i32>,
    pub choice: Option<i32>,
    pub status: String,
    /// Status codes recorded up to the as-of date, oldest first.
    pub status_history: Vec<String>,
}

impl ApplicationRow {
    pub fn history_contains(&self, codes: &[&str]) -> bool {
        self.status_history
            .iter()
            .any(|status| codes.contains(&status.as_str()))
    }
}

#[derive(Debug, Clone)]
pub struct ApplicantProfile {
    pub applicant_id: String,
    pub birth_date: Option<NaiveDate>,
    pub gender: Option<String>,
    pub indigenous: bool,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub program: String,
    pub status: String,
    pub choice: Option<i32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Campus {
    Main,
    Ottawa,
}

impl Campus {
    pub fn code(self) -> &'static str {
        match self {
            Campus::Main => "MAIN",
            Campus::Ottawa => "OTT",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "MAIN" => Some(Campus::Main),
            "OTT" => Some(Campus::Ottawa),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Campus::Main => "Sarnia",
            Campus::Ottawa => "Ottawa",
        }
    }
}

/// Control-course registration of one student in one program.
#[derive(Debug, Clone)]
pub struct RegistrationRow {
    pub student_id: String,
    pub program: String,
    pub aal: Option<String>,
    pub acad_level: String,
    pub location: String,
    pub current_load: Option<String>,
    pub tenth_day_load: Option<String>,
    pub immigration_status: Option<String>,
}

/// A registered student together with the evidence that they committed to
/// attend: a payment, an RO term note, or a sponsorship.
#[derive(Debug, Clone)]
pub struct DepositRow {
    pub student_id: String,
    pub program: String,
    pub aal: Option<String>,
    pub immigration_status: Option<String>,
    pub payment_amount: Option<f64>,
    pub ro_noted_on: Option<NaiveDate>,
    pub sponsorship_applied_on: Option<NaiveDate>,
}

#[derive(Debug, Clone)]
pub struct ProgramTitle {
    pub program: String,
    pub title: String,
}

/// Which tracked series a daily count belongs to. Doubles as the document
/// store folder holding that series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    Applications,
    Confirmations,
    Registrations,
}

impl Metric {
    pub const ALL: [Metric; 3] = [
        Metric::Registrations,
        Metric::Applications,
        Metric::Confirmations,
    ];

    pub fn folder(self) -> &'static str {
        match self {
            Metric::Applications => "applications",
            Metric::Confirmations => "confirmations",
            Metric::Registrations => "registrations",
        }
    }
}

/// One point of a per-program history series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyPoint {
    pub ds: NaiveDate,
    pub y: i64,
    pub term: Term,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderEntry {
    pub program: String,
    pub school: String,
}

/// Canonical list of reportable programs for an intake. Every report is
/// left-joined onto it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderTable {
    pub entries: Vec<OrderEntry>,
}

impl OrderTable {
    pub fn new(entries: Vec<OrderEntry>) -> Self {
        Self { entries }
    }

    pub fn programs(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.program.as_str())
    }

    pub fn school_of(&self, program: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.program == program)
            .map(|entry| entry.school.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BudgetEntry {
    pub program: String,
    pub target: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TargetEstimate {
    pub program: String,
    pub probability: Option<f64>,
    pub projected: i64,
}
