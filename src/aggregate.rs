//! Cross-term assembly: run one per-term count over every term snapshot and
//! left-join the results onto the order table, one column per term.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::models::OrderTable;
use crate::term::{self, Term};
use crate::workbook::{Cell, Sheet};

/// Rows extracted for one term, as they stood on that term's as-of date.
#[derive(Debug, Clone)]
pub struct TermSnapshot<R> {
    pub term: Term,
    pub years_back: u32,
    pub as_of: NaiveDate,
    pub rows: Vec<R>,
}

/// When and how far back to extract each term of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TermWindow {
    pub term: Term,
    pub years_back: u32,
    pub as_of: NaiveDate,
}

impl TermWindow {
    pub fn snapshot<R>(self, rows: Vec<R>) -> TermSnapshot<R> {
        TermSnapshot {
            term: self.term,
            years_back: self.years_back,
            as_of: self.as_of,
            rows,
        }
    }
}

/// Each term is compared at the same point of its cycle as the latest term is
/// today.
pub fn term_windows(terms: &[Term], today: NaiveDate) -> Vec<TermWindow> {
    let Some(latest) = terms.iter().max() else {
        return Vec::new();
    };
    terms
        .iter()
        .map(|term| {
            let years_back = term.years_back(latest);
            TermWindow {
                term: *term,
                years_back,
                as_of: term::as_of(today, years_back),
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Residency {
    Domestic,
    International,
}

impl Residency {
    pub fn of(immigration_status: Option<&str>) -> Self {
        if crate::rules::is_international(immigration_status) {
            Residency::International
        } else {
            Residency::Domestic
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Residency::Domestic => "domestic",
            Residency::International => "international",
        }
    }
}

/// Rows of the output table: one per program, or one per program and
/// residency with every domestic row ahead of every international row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Spine {
    Programs,
    ByResidency,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SpineKey {
    pub program: String,
    pub residency: Option<Residency>,
}

impl SpineKey {
    pub fn program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            residency: None,
        }
    }

    pub fn split(program: impl Into<String>, residency: Residency) -> Self {
        Self {
            program: program.into(),
            residency: Some(residency),
        }
    }
}

pub type Counts = HashMap<SpineKey, u64>;

/// Counts rows per program, keeping only rows the predicate accepts.
pub fn count_by_program<R>(
    rows: &[R],
    program: impl Fn(&R) -> &str,
    keep: impl Fn(&R) -> bool,
) -> Counts {
    let mut counts = Counts::new();
    for row in rows.iter().filter(|row| keep(row)) {
        *counts.entry(SpineKey::program(program(row))).or_insert(0) += 1;
    }
    counts
}

#[derive(Debug, Clone, PartialEq)]
pub struct WideRow {
    pub program: String,
    pub school: String,
    pub residency: Option<Residency>,
    pub values: Vec<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WideTable {
    pub spine: Spine,
    pub columns: Vec<String>,
    pub rows: Vec<WideRow>,
}

impl WideTable {
    #[cfg(test)]
    pub fn value(&self, program: &str, residency: Option<Residency>, column: &str) -> Option<u64> {
        let index = self.columns.iter().position(|name| name == column)?;
        self.rows
            .iter()
            .find(|row| row.program == program && row.residency == residency)
            .map(|row| row.values[index])
    }

    pub fn column_total(&self, column: &str) -> Option<u64> {
        let index = self.columns.iter().position(|name| name == column)?;
        Some(self.rows.iter().map(|row| row.values[index]).sum())
    }

    pub fn to_sheet(&self, name: &str) -> Sheet {
        let mut headers = vec!["Program".to_string(), "School".to_string()];
        if self.spine == Spine::ByResidency {
            headers.push("student".to_string());
        }
        headers.extend(self.columns.iter().cloned());

        let rows = self
            .rows
            .iter()
            .map(|row| {
                let mut cells = vec![Cell::text(&row.program), Cell::text(&row.school)];
                if let Some(residency) = row.residency {
                    cells.push(Cell::text(residency.label()));
                }
                cells.extend(row.values.iter().map(|value| Cell::Number(*value as f64)));
                cells
            })
            .collect();

        Sheet::new(name, headers, rows)
    }
}

/// Runs `count` over every snapshot and left-joins each result as a column
/// named `"<label> <term>"` onto the order table. Keys the order table does
/// not know are dropped; spine rows without a count get 0. The order table is
/// only read.
pub fn assemble<R>(
    order: &OrderTable,
    label: &str,
    spine: Spine,
    snapshots: &[TermSnapshot<R>],
    count: impl Fn(&TermSnapshot<R>) -> Counts,
) -> WideTable {
    let mut rows = spine_rows(order, spine);
    let mut columns = Vec::with_capacity(snapshots.len());

    for snapshot in snapshots {
        let counts = count(snapshot);
        columns.push(format!("{label} {}", snapshot.term));
        for row in rows.iter_mut() {
            let key = SpineKey {
                program: row.program.clone(),
                residency: row.residency,
            };
            row.values.push(counts.get(&key).copied().unwrap_or(0));
        }
    }

    WideTable {
        spine,
        columns,
        rows,
    }
}

fn spine_rows(order: &OrderTable, spine: Spine) -> Vec<WideRow> {
    let residencies: &[Option<Residency>] = match spine {
        Spine::Programs => &[None],
        Spine::ByResidency => &[
            Some(Residency::Domestic),
            Some(Residency::International),
        ],
    };
    residencies
        .iter()
        .flat_map(|residency| {
            order.entries.iter().map(move |entry| WideRow {
                program: entry.program.clone(),
                school: entry.school.clone(),
                residency: *residency,
                values: Vec::new(),
            })
        })
        .collect()
}
