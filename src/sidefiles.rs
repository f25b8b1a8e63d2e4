//! Order and budget lists, and the projections workbook they are cut from.

use std::path::Path;

use calamine::{open_workbook, Data, Range, Reader, Xlsx};
use csv::{ReaderBuilder, Trim};
use thiserror::Error;

use crate::models::{BudgetEntry, OrderEntry, OrderTable};
use crate::rules;
use crate::term::Term;

#[derive(Debug, Error)]
pub enum ListFileError {
    #[error("list file is empty")]
    Empty,
    #[error("list file needs two columns, header has {0}")]
    TooFewColumns(usize),
    #[error("line {line}: {message}")]
    Row { line: usize, message: String },
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("projections workbook: {0}")]
    Workbook(String),
    #[error("projections sheet '{sheet}' has no column for term {term}")]
    TermNotFound { sheet: String, term: String },
    #[error("projections sheet '{sheet}' is missing column '{column}'")]
    MissingColumn { sheet: String, column: String },
}

/// Parses a two-column list with a header row. Tab separated when the header
/// contains a tab, comma separated otherwise.
pub fn parse_two_column(contents: &str) -> Result<Vec<(String, String)>, ListFileError> {
    let header = contents
        .lines()
        .find(|line| !line.trim().is_empty())
        .ok_or(ListFileError::Empty)?;
    let delimiter = if header.contains('\t') { b'\t' } else { b',' };

    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(Trim::All)
        .flexible(true)
        .from_reader(contents.as_bytes());
    let width = reader.headers()?.len();
    if width < 2 {
        return Err(ListFileError::TooFewColumns(width));
    }

    let mut pairs = Vec::new();
    for record in reader.records() {
        let record = record?;
        let first = record.get(0).unwrap_or_default();
        if first.is_empty() {
            continue;
        }
        let second = record.get(1).unwrap_or_default();
        pairs.push((first.to_string(), second.to_string()));
    }
    Ok(pairs)
}

pub fn parse_order(contents: &str) -> Result<OrderTable, ListFileError> {
    let entries = parse_two_column(contents)?
        .into_iter()
        .map(|(program, school)| OrderEntry { program, school })
        .collect();
    Ok(OrderTable::new(entries))
}

pub fn parse_budget(contents: &str) -> Result<Vec<BudgetEntry>, ListFileError> {
    parse_two_column(contents)?
        .into_iter()
        .enumerate()
        .map(|(index, (program, target))| {
            let value = target
                .parse::<f64>()
                .map_err(|_| ListFileError::Row {
                    line: index + 2,
                    message: format!("budget '{target}' for {program} is not a number"),
                })?;
            Ok(BudgetEntry {
                program,
                target: value.trunc() as i64,
            })
        })
        .collect()
}

pub fn render_two_column(headers: (&str, &str), rows: &[(String, String)]) -> String {
    let mut output = format!("{}\t{}\n", headers.0, headers.1);
    for (first, second) in rows {
        output.push_str(first);
        output.push('\t');
        output.push_str(second);
        output.push('\n');
    }
    output
}

/// Main-campus projection for one program at one level.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionLine {
    pub school: String,
    pub program: String,
    pub active: bool,
    pub level: Option<i32>,
    pub domestic: f64,
    pub international: f64,
    pub total_full_time: f64,
}

/// Ottawa-campus projection, which only budgets international students.
#[derive(Debug, Clone, PartialEq)]
pub struct OttawaLine {
    pub school: String,
    pub program: String,
    pub active: bool,
    pub level: Option<i32>,
    pub international: f64,
}

pub fn load_projection_range(path: &Path, sheet: Option<&str>) -> Result<Range<Data>, ListFileError> {
    let mut workbook: Xlsx<_> =
        open_workbook(path).map_err(|err: calamine::XlsxError| ListFileError::Workbook(err.to_string()))?;
    let sheet_name = match sheet {
        Some(name) => name.to_string(),
        None => workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| ListFileError::Workbook("workbook has no sheets".to_string()))?,
    };
    workbook
        .worksheet_range(&sheet_name)
        .map_err(|err| ListFileError::Workbook(format!("{sheet_name}: {err}")))
}

/// Row-major view of a sheet as trimmed strings.
pub fn range_to_grid(range: &Range<Data>) -> Vec<Vec<String>> {
    range
        .rows()
        .map(|row| row.iter().map(|cell| cell.to_string().trim().to_string()).collect())
        .collect()
}

struct ProjectionLayout {
    school: usize,
    program: usize,
    active: usize,
    block: usize,
}

/// The header row names the fixed columns; the row below it carries a term
/// label at the first column of each term's block.
fn locate(grid: &[Vec<String>], sheet: &str, term: &Term) -> Result<ProjectionLayout, ListFileError> {
    let header = grid.first().ok_or_else(|| ListFileError::MissingColumn {
        sheet: sheet.to_string(),
        column: "School".to_string(),
    })?;
    let find = |name: &str| {
        header
            .iter()
            .position(|cell| cell == name)
            .ok_or_else(|| ListFileError::MissingColumn {
                sheet: sheet.to_string(),
                column: name.to_string(),
            })
    };
    let school = find("School")?;
    let program = find("Program")?;
    let active = find("Active")?;

    let label = term.to_string();
    let block = grid
        .get(1)
        .and_then(|row| row.iter().position(|cell| *cell == label))
        .ok_or_else(|| ListFileError::TermNotFound {
            sheet: sheet.to_string(),
            term: label.clone(),
        })?;

    Ok(ProjectionLayout {
        school,
        program,
        active,
        block,
    })
}

fn cell<'a>(row: &'a [String], index: usize) -> &'a str {
    row.get(index).map(String::as_str).unwrap_or_default()
}

fn number(row: &[String], index: usize) -> f64 {
    cell(row, index).parse::<f64>().unwrap_or(0.0)
}

fn level(row: &[String], index: usize) -> Option<i32> {
    cell(row, index).parse::<f64>().ok().map(|value| value as i32)
}

/// Reads the main projections sheet. Within a term block the columns are
/// Term, Level, Domestic, International, Total FT.
pub fn parse_projections(grid: &[Vec<String>], term: &Term) -> Result<Vec<ProjectionLine>, ListFileError> {
    let layout = locate(grid, "projections", term)?;
    Ok(grid
        .iter()
        .skip(1)
        .filter(|row| !cell(row, layout.program).is_empty())
        .map(|row| ProjectionLine {
            school: cell(row, layout.school).to_string(),
            program: cell(row, layout.program).to_string(),
            active: cell(row, layout.active) == "Y",
            level: level(row, layout.block + 1),
            domestic: number(row, layout.block + 2),
            international: number(row, layout.block + 3),
            total_full_time: number(row, layout.block + 4),
        })
        .collect())
}

/// Reads the Ottawa sheet: Term, Level, International.
pub fn parse_ottawa_projections(grid: &[Vec<String>], term: &Term) -> Result<Vec<OttawaLine>, ListFileError> {
    let layout = locate(grid, "Ottawa", term)?;
    Ok(grid
        .iter()
        .skip(1)
        .filter(|row| !cell(row, layout.program).is_empty())
        .map(|row| OttawaLine {
            school: cell(row, layout.school).to_string(),
            program: cell(row, layout.program).to_string(),
            active: cell(row, layout.active) == "Y",
            level: level(row, layout.block + 1),
            international: number(row, layout.block + 2),
        })
        .collect())
}

/// Order and budget lists for an intake: active programs budgeted at their
/// intake level, codes cut to four characters.
pub fn order_and_budget(lines: &[ProjectionLine]) -> (OrderTable, Vec<BudgetEntry>) {
    let mut entries = Vec::new();
    let mut budgets = Vec::new();
    for line in lines {
        let Some(level) = line.level else { continue };
        if !line.active || !rules::is_intake_level(&line.program, level) {
            continue;
        }
        let budget = line.total_full_time.trunc() as i64;
        if budget <= 0 {
            continue;
        }
        let program: String = line.program.chars().take(4).collect();
        entries.push(OrderEntry {
            program: program.clone(),
            school: line.school.clone(),
        });
        budgets.push(BudgetEntry {
            program,
            target: budget,
        });
    }
    (OrderTable::new(entries), budgets)
}
