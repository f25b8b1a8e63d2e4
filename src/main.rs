use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};

mod aggregate;
mod config;
mod db;
mod error;
mod forecast;
mod history;
mod models;
mod pipeline;
mod report;
mod reports;
mod rules;
mod sidefiles;
mod source;
mod store;
mod telemetry;
mod term;
mod workbook;

use config::{AppConfig, IntakeSettings};
use db::PgSource;
use pipeline::RunOptions;
use store::{DocumentStore, BUDGETS};
use term::Intake;

#[derive(Parser)]
#[command(name = "enrolment-dashboard")]
#[command(about = "Builds the enrolment dashboard workbook from the student-information system", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load realistic seed data
    Seed,
    /// Rebuild an intake's order and budget lists from a projections workbook
    RefreshLists {
        #[arg(long)]
        intake: Intake,
        #[arg(long)]
        projections: PathBuf,
    },
    /// Run every report for one intake and publish the workbook
    Run {
        #[arg(long)]
        intake: Intake,
        /// Comma separated terms, e.g. 2022F,2023F,2024F
        #[arg(long)]
        terms: Option<String>,
    },
    /// Run the winter, fall and summer batches on a fixed interval
    Watch {
        #[arg(long, default_value_t = 6)]
        every_hours: u64,
    },
    /// Refresh one program's history and print its target estimate
    Probability {
        #[arg(long)]
        intake: Intake,
        #[arg(long)]
        program: String,
        #[arg(long)]
        json: bool,
    },
}

async fn connect(config: &AppConfig) -> anyhow::Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await
        .context("failed to connect to Postgres")
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

async fn run_once(
    source: &PgSource,
    store: &DocumentStore,
    config: &AppConfig,
    settings: IntakeSettings,
) -> anyhow::Result<()> {
    let options = RunOptions {
        settings,
        today: today(),
        policy: config.offer_epochs,
        report_dir: config.report_dir.clone(),
    };
    let outcome = pipeline::run_intake(source, store, &options).await?;
    println!(
        "Wrote {} sheets to {} (published as {}).",
        outcome.sheets.len(),
        outcome.workbook.display(),
        outcome.published.display()
    );
    for estimate in outcome.programs_at_risk(0.5) {
        println!(
            "  {} is at risk: {:.1}% chance of budget, projected {}.",
            estimate.program,
            estimate.probability.unwrap_or_default() * 100.0,
            estimate.projected
        );
    }
    outcome.ensure_complete()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load().context("invalid configuration")?;
    telemetry::init(&config.log_level)?;
    let store = DocumentStore::new(&config.store_dir);

    match cli.command {
        Commands::InitDb => {
            let pool = connect(&config).await?;
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            let pool = connect(&config).await?;
            db::seed(&pool).await?;
            println!("Seed data inserted.");
        }
        Commands::RefreshLists {
            intake,
            projections,
        } => {
            let settings = IntakeSettings::for_intake(intake);
            let (order, budgets) = pipeline::refresh_lists(&store, &settings, &projections)?;
            println!(
                "Wrote {} programs to {} and {} budgets to {}.",
                order.entries.len(),
                settings.order_file,
                budgets.len(),
                settings.budget_file
            );
        }
        Commands::Run { intake, terms } => {
            let mut settings = IntakeSettings::for_intake(intake);
            if let Some(terms) = terms {
                let terms = term::parse_terms(&terms)?;
                if let Some(term) = terms.iter().find(|term| term.intake() != intake) {
                    anyhow::bail!("term {term} does not belong to the {intake} intake");
                }
                settings = settings.with_terms(terms);
            }
            let source = PgSource::new(connect(&config).await?);
            run_once(&source, &store, &config, settings).await?;
        }
        Commands::Watch { every_hours } => {
            let source = PgSource::new(connect(&config).await?);
            let mut interval = tokio::time::interval(Duration::from_secs(every_hours.max(1) * 3600));
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                for intake in [Intake::Winter, Intake::Fall, Intake::Spring] {
                    let settings = IntakeSettings::for_intake(intake);
                    match run_once(&source, &store, &config, settings).await {
                        Ok(()) => info!(intake = %intake, "batch finished"),
                        Err(err) => error!(intake = %intake, "batch failed: {err:#}"),
                    }
                }
            }
        }
        Commands::Probability {
            intake,
            program,
            json,
        } => {
            let settings = IntakeSettings::for_intake(intake);
            let latest = settings.latest().context("intake has no terms")?;
            let first_year = settings.first_year().context("intake has no terms")?;
            let budgets = sidefiles::parse_budget(&store.read(BUDGETS, &settings.budget_file)?)?;
            let target = budgets
                .iter()
                .find(|budget| budget.program == program)
                .map(|budget| budget.target)
                .with_context(|| format!("{program} has no budget in {}", settings.budget_file))?;

            let source = PgSource::new(connect(&config).await?);
            let estimate = pipeline::estimate_program(
                &source,
                &store,
                &program,
                target,
                &latest,
                first_year,
                today(),
            )
            .await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&estimate)?);
            } else {
                match estimate.probability {
                    Some(probability) => println!(
                        "{program}: {:.1}% chance of reaching {target} by census, projected {}.",
                        probability * 100.0,
                        estimate.projected
                    ),
                    None => println!(
                        "{program}: probability unavailable, projected {} against {target}.",
                        estimate.projected
                    ),
                }
            }
        }
    }

    Ok(())
}
