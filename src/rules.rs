use chrono::NaiveDate;
use tracing::warn;

use crate::models::{ApplicationRow, DepositRow, RegistrationRow};
use crate::term::{Intake, Term};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudentKind {
    New,
    Returning,
}

/// A student is new when they enter at the program's intake level: level 1
/// everywhere, plus level 4 for FIRE and level 3 for TREX.
pub fn classify(program: &str, level: Option<i32>) -> StudentKind {
    let level = level.unwrap_or(1);
    let is_new = level == 1
        || (program == "FIRE" && level == 4)
        || (program == "TREX" && matches!(level, 1 | 3));
    if is_new {
        StudentKind::New
    } else {
        StudentKind::Returning
    }
}

/// Academic levels arrive as section codes like `01`. Missing or unreadable
/// codes are treated as level 1.
pub fn parse_aal(aal: Option<&str>) -> Option<i32> {
    aal.and_then(|value| value.trim().parse::<i32>().ok())
}

pub fn classify_registration(row: &RegistrationRow) -> StudentKind {
    classify(&row.program, parse_aal(row.aal.as_deref()))
}

pub fn classify_deposit(row: &DepositRow) -> StudentKind {
    classify(&row.program, parse_aal(row.aal.as_deref()))
}

/// Section code a program's entering students are registered under.
pub fn intake_section(program: &str) -> &'static str {
    match program {
        "FIRE" => "04",
        "TREX" => "03",
        _ => "01",
    }
}

/// Intake levels used when choosing which projection lines budget a new cohort.
pub fn is_intake_level(program: &str, level: i32) -> bool {
    level == 1 || (program == "FIRE" && level == 4) || (program == "TREX" && level == 3)
}

pub const CONFIRMED: &[&str] = &["CCC", "CUC", "MTS", "MVD"];
/// Codes that mark a confirmation anywhere in a status history.
pub const CONFIRMED_HISTORY: &[&str] = &["CCC", "CUC", "MTS"];
pub const OUTSTANDING_OFFER: &[&str] = &["ACC", "ACU"];
pub const HOLD: &[&str] = &[
    "HDE", "HLCI", "HLD", "HLF", "HLG", "HLM", "HLN", "HLR", "HLS", "HLT", "HLX", "HMD", "HME",
    "HMM", "HMS", "HLB", "HLA",
];
pub const WITHDRAWN_OR_REFUSED: &[&str] = &["RFQ", "RST", "WAC", "WAP", "WCF", "WMS"];
pub const WAITLIST: &[&str] = &["WTL", "WTN"];
pub const DELETED: &str = "DLT";
pub const REGISTERED: &[&str] = &["A", "D", "N"];

const OFFER_ACCEPTED_LEGACY: &[&str] = &[
    "WAC", "WCF", "MTS", "MVD", "WMS", "ACC", "ACU", "HMS", "WTN", "AOF",
];
const OFFER_ACCEPTED_2022: &[&str] = &[
    "WAC", "WCF", "MTS", "MVD", "WMS", "ACC", "ACU", "HMS", "WTN", "DNO", "AOF",
];
const OFFER_ACCEPTED_2023: &[&str] = &[
    "WAC", "WCF", "MTS", "MVD", "WMS", "ACC", "ACU", "HMS", "WTN", "DNO", "AOF", "DLT",
];

/// Period during which one offer coding scheme was in force.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusEpoch {
    /// Before 2022F: a declined-not-accepted (DNA) application still counts
    /// when ACC or ACU appears in its history.
    Legacy,
    /// 2022F up to, not including, 2023F: DNO joins the accepted set.
    Fall2022,
    /// 2023F onward: deleted offers (DLT) are kept as well.
    Fall2023,
}

impl StatusEpoch {
    pub fn for_term(term: &Term) -> Self {
        if *term < Term::new(2022, Intake::Fall) {
            StatusEpoch::Legacy
        } else if *term < Term::new(2023, Intake::Fall) {
            StatusEpoch::Fall2022
        } else {
            StatusEpoch::Fall2023
        }
    }

    pub fn accepted_offer_statuses(self) -> &'static [&'static str] {
        match self {
            StatusEpoch::Legacy => OFFER_ACCEPTED_LEGACY,
            StatusEpoch::Fall2022 => OFFER_ACCEPTED_2022,
            StatusEpoch::Fall2023 => OFFER_ACCEPTED_2023,
        }
    }
}

/// How the offer epoch table is applied.
///
/// The deployed dashboard guarded the epoch switch with a comparison that is
/// always true, so every term has been counted under the legacy rule.
/// `AsDeployed` keeps those published numbers; `Corrected` applies the
/// documented table and is opt-in until the registrar signs off on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OfferEpochPolicy {
    #[default]
    AsDeployed,
    Corrected,
}

impl OfferEpochPolicy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "as-deployed" | "as_deployed" | "legacy" => Some(OfferEpochPolicy::AsDeployed),
            "corrected" | "fixed" => Some(OfferEpochPolicy::Corrected),
            _ => None,
        }
    }

    pub fn epoch_for(self, term: &Term) -> StatusEpoch {
        match self {
            OfferEpochPolicy::AsDeployed => StatusEpoch::Legacy,
            OfferEpochPolicy::Corrected => StatusEpoch::for_term(term),
        }
    }

    /// Logs when the deployed rule diverges from the documented one.
    pub fn warn_if_diverging(self, terms: &[Term]) {
        if self != OfferEpochPolicy::AsDeployed {
            return;
        }
        let diverging: Vec<String> = terms
            .iter()
            .filter(|term| StatusEpoch::for_term(term) != StatusEpoch::Legacy)
            .map(Term::to_string)
            .collect();
        if !diverging.is_empty() {
            warn!(
                terms = %diverging.join(","),
                "offers counted with the pre-2022F status rule as deployed; \
                 set ENROLMENT_OFFER_EPOCHS=corrected to apply the epoch table"
            );
        }
    }
}

pub fn is_accepted_offer(row: &ApplicationRow, epoch: StatusEpoch) -> bool {
    let status = row.status.as_str();
    match epoch {
        StatusEpoch::Legacy => {
            epoch.accepted_offer_statuses().contains(&status)
                || (status == "DNA" && row.history_contains(OUTSTANDING_OFFER))
        }
        StatusEpoch::Fall2022 | StatusEpoch::Fall2023 => {
            epoch.accepted_offer_statuses().contains(&status)
        }
    }
}

pub fn is_international(immigration_status: Option<&str>) -> bool {
    immigration_status.map(str::trim) == Some("SV")
}

/// Full-time loads (F) and overloads (O).
pub fn is_full_time(load: Option<&str>) -> bool {
    matches!(load.map(str::trim), Some("F") | Some("O"))
}

/// Full-time, overload, or part-time.
pub fn is_counted_load(load: Option<&str>) -> bool {
    matches!(load.map(str::trim), Some("F") | Some("O") | Some("P"))
}

pub fn load_label(load: &str) -> Option<&'static str> {
    match load.trim() {
        "F" | "O" => Some("Full-time regs"),
        "T" => Some("Potential regs"),
        "P" => Some("Part-time regs"),
        "C" => Some("Coop"),
        _ => None,
    }
}

pub fn residency_label(immigration_status: &str) -> Option<&'static str> {
    match immigration_status.trim() {
        "CA" | "NA" | "PR" | "CR" => Some("Domestic"),
        "SV" => Some("International"),
        _ => None,
    }
}

pub const MINIMUM_DEPOSIT: f64 = 10.0;

/// Whether a student had committed to attend by `as_of`. A deposit of at
/// least ten dollars always counts; otherwise an RO note settles it, and only
/// without one does a sponsorship decide.
pub fn has_qualifying_deposit(row: &DepositRow, as_of: NaiveDate) -> bool {
    if row.payment_amount.is_some_and(|amount| amount >= MINIMUM_DEPOSIT) {
        return true;
    }
    if let Some(noted_on) = row.ro_noted_on {
        return noted_on <= as_of;
    }
    if let Some(applied_on) = row.sponsorship_applied_on {
        return applied_on < as_of;
    }
    false
}

/// Age bucket shown on the map sheet.
pub fn age_group(age: i32) -> &'static str {
    match age {
        i32::MIN..=18 => "<18",
        19..=21 => "18-21",
        22..=25 => "22-25",
        26..=30 => "26-30",
        31..=40 => "31-40",
        41..=50 => "41-50",
        _ => ">50",
    }
}
