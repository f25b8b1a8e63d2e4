use async_trait::async_trait;
use chrono::NaiveDate;

use crate::models::{
    ApplicantProfile, ApplicationRow, Campus, DepositRow, Metric, ProgramTitle, RegistrationRow,
};
use crate::term::Term;

/// Extracts the pipeline needs from the student-information system. Every
/// extract is taken "as of" a date so older terms can be compared at the same
/// point of their cycle.
#[async_trait]
pub trait EnrolmentSource: Send + Sync {
    async fn application_snapshot(
        &self,
        term: &Term,
        as_of: NaiveDate,
    ) -> anyhow::Result<Vec<ApplicationRow>>;

    async fn applicant_profiles(
        &self,
        term: &Term,
        as_of: NaiveDate,
    ) -> anyhow::Result<Vec<ApplicantProfile>>;

    async fn registrations(
        &self,
        term: &Term,
        as_of: NaiveDate,
        campus: Campus,
    ) -> anyhow::Result<Vec<RegistrationRow>>;

    async fn deposits(&self, term: &Term, as_of: NaiveDate) -> anyhow::Result<Vec<DepositRow>>;

    /// One point of a program's history series.
    async fn daily_count(
        &self,
        metric: Metric,
        program: &str,
        term: &Term,
        date: NaiveDate,
    ) -> anyhow::Result<i64>;

    async fn program_titles(&self) -> anyhow::Result<Vec<ProgramTitle>>;
}

#[cfg(test)]
pub mod testing {
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;

    use anyhow::anyhow;

    use super::*;

    /// In-memory source keyed by term. Terms listed in `failing` error on
    /// every extract.
    #[derive(Default)]
    pub struct FixtureSource {
        pub applications: HashMap<Term, Vec<ApplicationRow>>,
        pub profiles: HashMap<Term, Vec<ApplicantProfile>>,
        pub registrations: HashMap<(Term, &'static str), Vec<RegistrationRow>>,
        pub deposits: HashMap<Term, Vec<DepositRow>>,
        pub titles: Vec<ProgramTitle>,
        pub failing: HashSet<Term>,
        /// Count returned for every daily point.
        pub daily_value: i64,
        pub daily_calls: Mutex<Vec<(Metric, String, Term, NaiveDate)>>,
        pub as_of_seen: Mutex<Vec<(Term, NaiveDate)>>,
    }

    impl FixtureSource {
        fn check(&self, term: &Term, as_of: NaiveDate) -> anyhow::Result<()> {
            if let Ok(mut seen) = self.as_of_seen.lock() {
                seen.push((*term, as_of));
            }
            if self.failing.contains(term) {
                return Err(anyhow!("connection reset while reading {term}"));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl EnrolmentSource for FixtureSource {
        async fn application_snapshot(
            &self,
            term: &Term,
            as_of: NaiveDate,
        ) -> anyhow::Result<Vec<ApplicationRow>> {
            self.check(term, as_of)?;
            Ok(self.applications.get(term).cloned().unwrap_or_default())
        }

        async fn applicant_profiles(
            &self,
            term: &Term,
            as_of: NaiveDate,
        ) -> anyhow::Result<Vec<ApplicantProfile>> {
            self.check(term, as_of)?;
            Ok(self.profiles.get(term).cloned().unwrap_or_default())
        }

        async fn registrations(
            &self,
            term: &Term,
            as_of: NaiveDate,
            campus: Campus,
        ) -> anyhow::Result<Vec<RegistrationRow>> {
            self.check(term, as_of)?;
            Ok(self
                .registrations
                .get(&(*term, campus.code()))
                .cloned()
                .unwrap_or_default())
        }

        async fn deposits(&self, term: &Term, as_of: NaiveDate) -> anyhow::Result<Vec<DepositRow>> {
            self.check(term, as_of)?;
            Ok(self.deposits.get(term).cloned().unwrap_or_default())
        }

        async fn daily_count(
            &self,
            metric: Metric,
            program: &str,
            term: &Term,
            date: NaiveDate,
        ) -> anyhow::Result<i64> {
            if self.failing.contains(term) {
                return Err(anyhow!("connection reset while counting {program}"));
            }
            if let Ok(mut calls) = self.daily_calls.lock() {
                calls.push((metric, program.to_string(), *term, date));
            }
            Ok(self.daily_value)
        }

        async fn program_titles(&self) -> anyhow::Result<Vec<ProgramTitle>> {
            Ok(self.titles.clone())
        }
    }
}
