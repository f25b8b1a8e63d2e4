use anyhow::Context;
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{PgPool, Row};
use tracing::debug;
use uuid::Uuid;

use crate::models::{
    ApplicantProfile, ApplicationRow, Campus, DepositRow, Metric, ProgramTitle, RegistrationRow,
};
use crate::rules::{self, CONFIRMED_HISTORY, REGISTERED};
use crate::source::EnrolmentSource;
use crate::term::Term;

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

fn day(year: i32, month: u32, day: u32) -> anyhow::Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day).context("invalid date")
}

pub async fn seed(pool: &PgPool) -> anyhow::Result<()> {
    let programs = [
        ("ACTG", "Accounting"),
        ("BUSN", "Business"),
        ("FIRE", "Pre-Service Firefighter"),
        ("NURS", "Practical Nursing"),
        ("TREX", "Trades Exploration"),
    ];
    for (code, title) in programs {
        sqlx::query(
            r#"
            INSERT INTO enrolment.programs (code, title)
            VALUES ($1, $2)
            ON CONFLICT (code) DO UPDATE SET title = EXCLUDED.title
            "#,
        )
        .bind(code)
        .bind(title)
        .execute(pool)
        .await?;
    }

    let persons = vec![
        ("0100001", day(2005, 3, 14)?, "F", "CA", "Sarnia", "N7T 1A1", false),
        ("0100002", day(2001, 11, 2)?, "M", "SV", "Ottawa", "K1N 5T5", false),
        ("0100003", day(1998, 6, 30)?, "M", "CA", "Petrolia", "N0N 1R0", true),
        ("0100004", day(2004, 1, 9)?, "F", "PR", "Sarnia", "N7S 3H4", false),
        ("0100005", day(1987, 8, 21)?, "F", "SV", "Sarnia", "N7T 7H7", false),
        ("0100006", day(2003, 4, 5)?, "M", "CA", "Corunna", "N0N 1G0", false),
    ];
    for (id, birth_date, gender, immigration, city, postal, indigenous) in persons {
        sqlx::query(
            r#"
            INSERT INTO enrolment.persons
            (id, birth_date, gender, immigration_status, city, postal_code, indigenous)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO UPDATE
            SET birth_date = EXCLUDED.birth_date,
                immigration_status = EXCLUDED.immigration_status,
                city = EXCLUDED.city,
                postal_code = EXCLUDED.postal_code,
                indigenous = EXCLUDED.indigenous
            "#,
        )
        .bind(id)
        .bind(birth_date)
        .bind(gender)
        .bind(immigration)
        .bind(city)
        .bind(postal)
        .bind(indigenous)
        .execute(pool)
        .await?;
    }

    // Statuses are listed oldest first.
    let applications = vec![
        (
            "seed-app-001",
            "0100001",
            "2024F",
            "ACTG",
            1,
            1,
            vec![("APP", day(2024, 1, 10)?), ("ACC", day(2024, 2, 20)?), ("CCC", day(2024, 4, 2)?)],
        ),
        (
            "seed-app-002",
            "0100002",
            "2024F",
            "BUSN",
            1,
            1,
            vec![("APP", day(2024, 1, 15)?), ("ACU", day(2024, 3, 1)?)],
        ),
        (
            "seed-app-003",
            "0100003",
            "2024F",
            "FIRE",
            4,
            2,
            vec![("APP", day(2024, 2, 1)?), ("WTL", day(2024, 3, 15)?)],
        ),
        (
            "seed-app-004",
            "0100004",
            "2024F",
            "NURS",
            1,
            1,
            vec![("APP", day(2024, 1, 20)?), ("HLD", day(2024, 2, 28)?)],
        ),
        (
            "seed-app-005",
            "0100006",
            "2024F",
            "ACTG",
            1,
            3,
            vec![("APP", day(2024, 1, 5)?), ("DLT", day(2024, 1, 25)?)],
        ),
        (
            "seed-app-006",
            "0100005",
            "2023F",
            "ACTG",
            1,
            1,
            vec![("APP", day(2023, 1, 12)?), ("ACC", day(2023, 2, 14)?), ("MTS", day(2023, 5, 1)?)],
        ),
        (
            "seed-app-007",
            "0100006",
            "2023F",
            "TREX",
            3,
            1,
            vec![("APP", day(2023, 2, 3)?), ("ACC", day(2023, 3, 3)?), ("DNA", day(2023, 4, 4)?)],
        ),
    ];

    for (source_key, applicant, term, program, level, choice, statuses) in applications {
        let application_id: Uuid = sqlx::query(
            r#"
            INSERT INTO enrolment.applications
            (id, applicant_id, start_term, program, level, choice, source_key)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (source_key) DO UPDATE
            SET program = EXCLUDED.program, level = EXCLUDED.level, choice = EXCLUDED.choice
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(applicant)
        .bind(term)
        .bind(program)
        .bind(level)
        .bind(choice)
        .bind(source_key)
        .fetch_one(pool)
        .await?
        .try_get("id")?;

        let count = statuses.len() as i32;
        for (index, (status, status_date)) in statuses.into_iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO enrolment.application_statuses
                (application_id, pos, status, status_date)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (application_id, pos) DO NOTHING
                "#,
            )
            .bind(application_id)
            .bind(count - index as i32)
            .bind(status)
            .bind(status_date)
            .execute(pool)
            .await?;
        }
    }

    let credits = vec![
        ("seed-stc-001", "0100001", "2024F", "ACTG", "01", "MAIN", "F", day(2024, 6, 3)?),
        ("seed-stc-002", "0100002", "2024F", "BUSN", "01", "MAIN", "F", day(2024, 6, 10)?),
        ("seed-stc-003", "0100004", "2024F", "NURS", "02", "MAIN", "P", day(2024, 5, 27)?),
        ("seed-stc-004", "0100005", "2024F", "ACTG", "01", "OTT", "O", day(2024, 7, 1)?),
        ("seed-stc-005", "0100005", "2023F", "ACTG", "01", "MAIN", "F", day(2023, 6, 5)?),
    ];
    for (source_key, person, term, program, section, location, load, registered_on) in credits {
        let credit_id: Uuid = sqlx::query(
            r#"
            INSERT INTO enrolment.course_credits
            (id, person_id, term, program, section, acad_level, location,
             current_load, tenth_day_load, source_key)
            VALUES ($1, $2, $3, $4, $5, 'PS', $6, $7, $7, $8)
            ON CONFLICT (source_key) DO UPDATE
            SET current_load = EXCLUDED.current_load, location = EXCLUDED.location
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(person)
        .bind(term)
        .bind(program)
        .bind(section)
        .bind(location)
        .bind(load)
        .bind(source_key)
        .fetch_one(pool)
        .await?
        .try_get("id")?;

        sqlx::query(
            r#"
            INSERT INTO enrolment.credit_statuses (credit_id, pos, status, status_date)
            VALUES ($1, 1, 'A', $2)
            ON CONFLICT (credit_id, pos) DO NOTHING
            "#,
        )
        .bind(credit_id)
        .bind(registered_on)
        .execute(pool)
        .await?;
    }

    let payments = vec![
        ("seed-pay-001", "0100001", "2024F", 500.0, day(2024, 6, 3)?),
        ("seed-pay-002", "0100002", "2024F", 5.0, day(2024, 6, 10)?),
        ("seed-pay-003", "0100005", "2023F", 250.0, day(2023, 6, 5)?),
    ];
    for (source_key, person, term, amount, paid_on) in payments {
        sqlx::query(
            r#"
            INSERT INTO enrolment.payments (id, person_id, term, amount, paid_on, source_key)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (source_key) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(person)
        .bind(term)
        .bind(amount)
        .bind(paid_on)
        .bind(source_key)
        .execute(pool)
        .await?;
    }

    sqlx::query(
        r#"
        INSERT INTO enrolment.sponsorships (id, person_id, term, sponsorship, applied_on, source_key)
        VALUES ($1, '0100004', '2024F', 'OSAP', $2, 'seed-spon-001')
        ON CONFLICT (source_key) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(day(2024, 5, 15)?)
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO enrolment.term_notes (id, person_id, term, note, noted_on, source_key)
        VALUES ($1, '0100002', '2024F', 'RO', $2, 'seed-note-001')
        ON CONFLICT (source_key) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(day(2024, 6, 12)?)
    .execute(pool)
    .await?;

    Ok(())
}

/// Status of an application as it stood on `$2`: the latest status dated on
/// or before it, the lowest position breaking ties.
const APPLICATION_STATUS_AS_OF: &str = r#"
    JOIN LATERAL (
        SELECT s.status
        FROM enrolment.application_statuses s
        WHERE s.application_id = a.id AND s.status_date <= $2
        ORDER BY s.status_date DESC, s.pos ASC
        LIMIT 1
    ) cur ON TRUE
"#;

const CREDIT_STATUS_AS_OF: &str = r#"
    JOIN LATERAL (
        SELECT s.status
        FROM enrolment.credit_statuses s
        WHERE s.credit_id = c.id AND s.status_date <= $2
        ORDER BY s.status_date DESC, s.pos ASC
        LIMIT 1
    ) cur ON TRUE
"#;

fn status_list(codes: &[&str]) -> Vec<String> {
    codes.iter().map(|code| code.to_string()).collect()
}

/// Extracts from the student-information replica.
#[derive(Debug, Clone)]
pub struct PgSource {
    pool: PgPool,
}

impl PgSource {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EnrolmentSource for PgSource {
    async fn application_snapshot(
        &self,
        term: &Term,
        as_of: NaiveDate,
    ) -> anyhow::Result<Vec<ApplicationRow>> {
        let mut query = String::from(
            "SELECT a.program, a.level, a.choice, cur.status, \
             COALESCE(hist.statuses, '') AS statuses \
             FROM enrolment.applications a",
        );
        query.push_str(APPLICATION_STATUS_AS_OF);
        query.push_str(
            "LEFT JOIN LATERAL ( \
                SELECT string_agg(s.status, ',' ORDER BY s.status_date ASC, s.pos DESC) AS statuses \
                FROM enrolment.application_statuses s \
                WHERE s.application_id = a.id AND s.status_date <= $2 \
             ) hist ON TRUE \
             WHERE a.start_term = $1 \
             ORDER BY a.program, a.applicant_id",
        );

        let records = sqlx::query(&query)
            .bind(term.to_string())
            .bind(as_of)
            .fetch_all(&self.pool)
            .await
            .with_context(|| format!("application extract for {term} as of {as_of}"))?;

        let mut rows = Vec::with_capacity(records.len());
        for record in records {
            let statuses: String = record.try_get("statuses")?;
            rows.push(ApplicationRow {
                program: record.try_get("program")?,
                level: record.try_get("level")?,
                choice: record.try_get("choice")?,
                status: record.try_get("status")?,
                status_history: statuses
                    .split(',')
                    .filter(|code| !code.is_empty())
                    .map(str::to_string)
                    .collect(),
            });
        }
        debug!(term = %term, %as_of, rows = rows.len(), "application snapshot");
        Ok(rows)
    }

    async fn applicant_profiles(
        &self,
        term: &Term,
        as_of: NaiveDate,
    ) -> anyhow::Result<Vec<ApplicantProfile>> {
        let mut query = String::from(
            "SELECT a.applicant_id, p.birth_date, p.gender, p.indigenous, p.city, \
             p.postal_code, a.program, cur.status, a.choice \
             FROM enrolment.applications a \
             JOIN enrolment.persons p ON p.id = a.applicant_id",
        );
        query.push_str(APPLICATION_STATUS_AS_OF);
        query.push_str("WHERE a.start_term = $1 ORDER BY a.applicant_id, a.program");

        let records = sqlx::query(&query)
            .bind(term.to_string())
            .bind(as_of)
            .fetch_all(&self.pool)
            .await
            .with_context(|| format!("applicant profile extract for {term} as of {as_of}"))?;

        let mut profiles = Vec::with_capacity(records.len());
        for record in records {
            profiles.push(ApplicantProfile {
                applicant_id: record.try_get("applicant_id")?,
                birth_date: record.try_get("birth_date")?,
                gender: record.try_get("gender")?,
                indigenous: record.try_get("indigenous")?,
                city: record.try_get("city")?,
                postal_code: record.try_get("postal_code")?,
                program: record.try_get("program")?,
                status: record.try_get("status")?,
                choice: record.try_get("choice")?,
            });
        }
        Ok(profiles)
    }

    async fn registrations(
        &self,
        term: &Term,
        as_of: NaiveDate,
        campus: Campus,
    ) -> anyhow::Result<Vec<RegistrationRow>> {
        let mut query = String::from(
            "SELECT c.person_id, c.program, c.section, c.acad_level, c.location, \
             c.current_load, c.tenth_day_load, p.immigration_status \
             FROM enrolment.course_credits c \
             JOIN enrolment.persons p ON p.id = c.person_id",
        );
        query.push_str(CREDIT_STATUS_AS_OF);
        query.push_str(
            "WHERE c.term = $1 AND c.location = $3 AND cur.status = ANY($4) \
             ORDER BY c.program, c.person_id",
        );

        let records = sqlx::query(&query)
            .bind(term.to_string())
            .bind(as_of)
            .bind(campus.code())
            .bind(status_list(REGISTERED))
            .fetch_all(&self.pool)
            .await
            .with_context(|| {
                format!("{} registration extract for {term} as of {as_of}", campus.label())
            })?;

        let mut rows = Vec::with_capacity(records.len());
        for record in records {
            rows.push(RegistrationRow {
                student_id: record.try_get("person_id")?,
                program: record.try_get("program")?,
                aal: record.try_get("section")?,
                acad_level: record.try_get("acad_level")?,
                location: record.try_get("location")?,
                current_load: record.try_get("current_load")?,
                tenth_day_load: record.try_get("tenth_day_load")?,
                immigration_status: record.try_get("immigration_status")?,
            });
        }
        Ok(rows)
    }

    async fn deposits(&self, term: &Term, as_of: NaiveDate) -> anyhow::Result<Vec<DepositRow>> {
        let mut query = String::from(
            "SELECT c.person_id, c.program, c.section, p.immigration_status, \
             pay.amount, note.noted_on, spon.applied_on \
             FROM enrolment.course_credits c \
             JOIN enrolment.persons p ON p.id = c.person_id",
        );
        query.push_str(CREDIT_STATUS_AS_OF);
        query.push_str(
            "LEFT JOIN LATERAL ( \
                SELECT SUM(x.amount) AS amount FROM enrolment.payments x \
                WHERE x.person_id = c.person_id AND x.term = c.term AND x.paid_on <= $2 \
             ) pay ON TRUE \
             LEFT JOIN LATERAL ( \
                SELECT MIN(n.noted_on) AS noted_on FROM enrolment.term_notes n \
                WHERE n.person_id = c.person_id AND n.term = c.term AND n.note = 'RO' \
             ) note ON TRUE \
             LEFT JOIN LATERAL ( \
                SELECT MIN(sp.applied_on) AS applied_on FROM enrolment.sponsorships sp \
                WHERE sp.person_id = c.person_id AND sp.term = c.term \
             ) spon ON TRUE \
             WHERE c.term = $1 AND c.location = $3 AND cur.status = ANY($4) \
             ORDER BY c.program, c.person_id",
        );

        let records = sqlx::query(&query)
            .bind(term.to_string())
            .bind(as_of)
            .bind(Campus::Main.code())
            .bind(status_list(REGISTERED))
            .fetch_all(&self.pool)
            .await
            .with_context(|| format!("deposit extract for {term} as of {as_of}"))?;

        let mut rows = Vec::with_capacity(records.len());
        for record in records {
            rows.push(DepositRow {
                student_id: record.try_get("person_id")?,
                program: record.try_get("program")?,
                aal: record.try_get("section")?,
                immigration_status: record.try_get("immigration_status")?,
                payment_amount: record.try_get("amount")?,
                ro_noted_on: record.try_get("noted_on")?,
                sponsorship_applied_on: record.try_get("applied_on")?,
            });
        }
        Ok(rows)
    }

    async fn daily_count(
        &self,
        metric: Metric,
        program: &str,
        term: &Term,
        date: NaiveDate,
    ) -> anyhow::Result<i64> {
        let mut query = String::new();
        match metric {
            Metric::Applications => {
                query.push_str("SELECT COUNT(a.id) AS y FROM enrolment.applications a");
                query.push_str(APPLICATION_STATUS_AS_OF);
                query.push_str("WHERE a.start_term = $1 AND a.program = $3");
            }
            Metric::Confirmations => {
                query.push_str("SELECT COUNT(a.id) AS y FROM enrolment.applications a");
                query.push_str(APPLICATION_STATUS_AS_OF);
                query.push_str(
                    "WHERE a.start_term = $1 AND a.program = $3 AND EXISTS ( \
                        SELECT 1 FROM enrolment.application_statuses h \
                        WHERE h.application_id = a.id AND h.status_date <= $2 \
                        AND h.status = ANY($4))",
                );
            }
            Metric::Registrations => {
                query.push_str("SELECT COUNT(c.id) AS y FROM enrolment.course_credits c");
                query.push_str(CREDIT_STATUS_AS_OF);
                query.push_str(
                    "WHERE c.term = $1 AND c.program = $3 AND cur.status = ANY($4) \
                     AND c.section = $5",
                );
            }
        }

        let mut statement = sqlx::query(&query)
            .bind(term.to_string())
            .bind(date)
            .bind(program);
        match metric {
            Metric::Applications => {}
            Metric::Confirmations => {
                statement = statement.bind(status_list(CONFIRMED_HISTORY));
            }
            Metric::Registrations => {
                statement = statement
                    .bind(status_list(REGISTERED))
                    .bind(rules::intake_section(program));
            }
        }

        let count: i64 = statement
            .fetch_one(&self.pool)
            .await
            .with_context(|| format!("{} count for {program} {term} on {date}", metric.folder()))?
            .try_get("y")?;
        Ok(count)
    }

    async fn program_titles(&self) -> anyhow::Result<Vec<ProgramTitle>> {
        let records = sqlx::query("SELECT code, title FROM enrolment.programs ORDER BY code")
            .fetch_all(&self.pool)
            .await
            .context("program title extract")?;
        let mut titles = Vec::with_capacity(records.len());
        for record in records {
            titles.push(ProgramTitle {
                program: record.try_get("code")?,
                title: record.try_get("title")?,
            });
        }
        Ok(titles)
    }
}
