use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TermError {
    #[error("term code '{0}' must be four digits followed by F, W or S")]
    Malformed(String),
    #[error("unknown intake '{0}' (expected fall, winter or summer)")]
    UnknownIntake(String),
}

/// Intake within an academic year. Declaration order is calendar order, which
/// is the rank used when ordering terms of the same year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Intake {
    Winter,
    Spring,
    Fall,
}

impl Intake {
    pub fn letter(self) -> char {
        match self {
            Intake::Winter => 'W',
            Intake::Spring => 'S',
            Intake::Fall => 'F',
        }
    }

    pub fn from_letter(letter: char) -> Option<Self> {
        match letter.to_ascii_uppercase() {
            'W' => Some(Intake::Winter),
            'S' => Some(Intake::Spring),
            'F' => Some(Intake::Fall),
            _ => None,
        }
    }

    /// Name used for intake-level files and CLI arguments.
    pub fn name(self) -> &'static str {
        match self {
            Intake::Winter => "winter",
            Intake::Spring => "summer",
            Intake::Fall => "fall",
        }
    }

    pub fn month(self) -> u32 {
        match self {
            Intake::Winter => 1,
            Intake::Spring => 5,
            Intake::Fall => 9,
        }
    }

    /// (month, day) on which an enrolment cycle closes.
    fn cycle_end(self) -> (u32, u32) {
        match self {
            Intake::Winter => (1, 6),
            Intake::Spring => (5, 6),
            Intake::Fall => (9, 20),
        }
    }

    /// (month, day) on which the next enrolment cycle opens, one year before its term.
    fn cycle_start(self) -> (u32, u32) {
        match self {
            Intake::Winter => (1, 5),
            Intake::Spring => (5, 5),
            Intake::Fall => (9, 21),
        }
    }
}

impl FromStr for Intake {
    type Err = TermError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "fall" | "f" => Ok(Intake::Fall),
            "winter" | "w" => Ok(Intake::Winter),
            "summer" | "spring" | "s" => Ok(Intake::Spring),
            other => Err(TermError::UnknownIntake(other.to_string())),
        }
    }
}

impl fmt::Display for Intake {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Academic term such as `2024F`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Term {
    year: i32,
    intake: Intake,
}

impl Term {
    pub fn new(year: i32, intake: Intake) -> Self {
        Self { year, intake }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn intake(&self) -> Intake {
        self.intake
    }

    /// How many years this term lies behind `latest`, never negative.
    pub fn years_back(&self, latest: &Term) -> u32 {
        (latest.year - self.year).max(0) as u32
    }

    /// Tenth day of classes, the census day budgets are measured against.
    pub fn census_day(&self) -> NaiveDate {
        ymd(self.year, self.intake.month(), 20)
    }

    /// Days left until the census day, floored at one so forecasts always
    /// have a horizon.
    pub fn days_until_census(&self, today: NaiveDate) -> i64 {
        (self.census_day() - today).num_days().max(1)
    }

    /// Enrolment cycle of this term: opens in the previous year, closes near
    /// the start of the term.
    pub fn cycle(&self) -> (NaiveDate, NaiveDate) {
        let (start_month, start_day) = self.intake.cycle_start();
        let (end_month, end_day) = self.intake.cycle_end();
        (
            ymd(self.year - 1, start_month, start_day),
            ymd(self.year, end_month, end_day),
        )
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}{}", self.year, self.intake.letter())
    }
}

impl FromStr for Term {
    type Err = TermError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let malformed = || TermError::Malformed(value.to_string());
        if trimmed.len() != 5 || !trimmed.is_ascii() {
            return Err(malformed());
        }
        let (digits, letter) = trimmed.split_at(4);
        if !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(malformed());
        }
        let year = digits.parse::<i32>().map_err(|_| malformed())?;
        let intake = letter
            .chars()
            .next()
            .and_then(Intake::from_letter)
            .ok_or_else(malformed)?;
        Ok(Term::new(year, intake))
    }
}

impl TryFrom<String> for Term {
    type Error = TermError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Term> for String {
    fn from(value: Term) -> Self {
        value.to_string()
    }
}

/// Parses a comma separated term list and sorts it chronologically.
pub fn parse_terms(value: &str) -> Result<Vec<Term>, TermError> {
    let mut terms = value
        .split(',')
        .filter(|part| !part.trim().is_empty())
        .map(str::parse)
        .collect::<Result<Vec<Term>, _>>()?;
    terms.sort();
    terms.dedup();
    Ok(terms)
}

/// Shifts `today` back by whole calendar years. Feb 29 lands on Feb 28.
pub fn as_of(today: NaiveDate, years_back: u32) -> NaiveDate {
    today
        .checked_sub_months(Months::new(12 * years_back))
        .unwrap_or(today)
}

/// Every date from `start` to `end`, both inclusive.
pub fn dates_between(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let mut dates = Vec::new();
    let mut current = start;
    while current <= end {
        dates.push(current);
        current += Duration::days(1);
    }
    dates
}

/// Enrolment cycles for every term of `latest`'s intake from `first_year` up
/// to `latest`, each clamped so no cycle runs past `today`. A cycle closes on
/// its window end or the day before the next one opens, whichever is first,
/// so no date belongs to two cycles.
pub fn history_cycles(
    first_year: i32,
    latest: &Term,
    today: NaiveDate,
) -> Vec<(Term, NaiveDate, NaiveDate)> {
    let mut cycles = Vec::new();
    for year in first_year..=latest.year() {
        let term = Term::new(year, latest.intake());
        let (start, mut end) = term.cycle();
        if year < latest.year() {
            let next_start = Term::new(year + 1, latest.intake()).cycle().0;
            end = end.min(next_start - Duration::days(1));
        }
        if end > today {
            end = today;
        }
        if start <= end {
            cycles.push((term, start, end));
        }
    }
    cycles
}

/// Whole years between a birth date and a reference date.
pub fn age_on(birth: NaiveDate, reference: NaiveDate) -> i32 {
    let mut age = reference.year() - birth.year();
    if (reference.month(), reference.day()) < (birth.month(), birth.day()) {
        age -= 1;
    }
    age
}

fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(NaiveDate::MIN)
}
