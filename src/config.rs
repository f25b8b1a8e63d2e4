use std::env;
use std::path::PathBuf;

use thiserror::Error;

use crate::rules::OfferEpochPolicy;
use crate::term::{Intake, Term};

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{key} has invalid value '{value}'")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub store_dir: PathBuf,
    pub report_dir: PathBuf,
    pub log_level: String,
    pub offer_epochs: OfferEpochPolicy,
    pub db_max_connections: u32,
}

impl AppConfig {
    /// Reads the environment, after loading `.env` when one exists.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup("DATABASE_URL")
            .filter(|value| !value.trim().is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let offer_epochs = match lookup("ENROLMENT_OFFER_EPOCHS") {
            Some(value) => OfferEpochPolicy::parse(&value).ok_or(ConfigError::Invalid {
                key: "ENROLMENT_OFFER_EPOCHS",
                value,
            })?,
            None => OfferEpochPolicy::default(),
        };

        let db_max_connections = match lookup("ENROLMENT_DB_MAX_CONNECTIONS") {
            Some(value) => value
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|size| *size > 0)
                .ok_or(ConfigError::Invalid {
                    key: "ENROLMENT_DB_MAX_CONNECTIONS",
                    value,
                })?,
            None => 5,
        };

        Ok(Self {
            database_url,
            store_dir: lookup("ENROLMENT_STORE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("store")),
            report_dir: lookup("ENROLMENT_REPORT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("reports")),
            log_level: lookup("ENROLMENT_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            offer_epochs,
            db_max_connections,
        })
    }
}

/// Terms and side files an intake is reported with.
#[derive(Debug, Clone, PartialEq)]
pub struct IntakeSettings {
    pub intake: Intake,
    pub terms: Vec<Term>,
    pub order_file: String,
    pub budget_file: String,
}

impl IntakeSettings {
    pub fn for_intake(intake: Intake) -> Self {
        let (first, last) = match intake {
            Intake::Fall => (2020, 2024),
            Intake::Winter | Intake::Spring => (2021, 2025),
        };
        Self {
            intake,
            terms: (first..=last).map(|year| Term::new(year, intake)).collect(),
            order_file: format!("order_{}.txt", intake.name()),
            budget_file: format!("budget_{}.txt", intake.name()),
        }
    }

    pub fn with_terms(mut self, terms: Vec<Term>) -> Self {
        self.terms = terms;
        self
    }

    pub fn latest(&self) -> Option<Term> {
        self.terms.iter().max().copied()
    }

    pub fn first_year(&self) -> Option<i32> {
        self.terms.iter().min().map(Term::year)
    }

    /// File name the workbook is published under in the document store.
    pub fn published_name(&self) -> String {
        format!("DashboardInput_{}.xlsx", self.intake.name())
    }
}
