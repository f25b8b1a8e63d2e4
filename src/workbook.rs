use std::path::Path;

use anyhow::Context;
use chrono::NaiveDate;
use rust_xlsxwriter::{Format, FormatBorder, Workbook};

/// Excel caps sheet names at 31 characters.
const MAX_SHEET_NAME: usize = 31;

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Date(NaiveDate),
    Empty,
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    pub fn optional_text(value: Option<&str>) -> Self {
        value.map_or(Cell::Empty, Cell::text)
    }

    pub fn optional_number(value: Option<f64>) -> Self {
        value.map_or(Cell::Empty, Cell::Number)
    }
}

/// One worksheet of the published workbook.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Sheet {
    pub fn new(name: &str, headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self {
            name: name.chars().take(MAX_SHEET_NAME).collect(),
            headers,
            rows,
        }
    }

    pub fn with_headers(name: &str, headers: &[&str], rows: Vec<Vec<Cell>>) -> Self {
        Self::new(
            name,
            headers.iter().map(|header| header.to_string()).collect(),
            rows,
        )
    }

    #[cfg(test)]
    pub fn column(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|name| name == header)
    }
}

/// Writes the sheets, in order, to an `.xlsx` file.
pub fn write_workbook(path: &Path, sheets: &[Sheet]) -> anyhow::Result<()> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold().set_border(FormatBorder::Thin);
    let date_format = Format::new().set_num_format("yyyy-mm-dd");

    for sheet in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet
            .set_name(&sheet.name)
            .with_context(|| format!("invalid sheet name '{}'", sheet.name))?;

        for (col, header) in sheet.headers.iter().enumerate() {
            worksheet.write_string_with_format(0, col as u16, header, &header_format)?;
        }

        for (index, row) in sheet.rows.iter().enumerate() {
            let row_number = (index + 1) as u32;
            for (col, cell) in row.iter().enumerate() {
                let col = col as u16;
                match cell {
                    Cell::Text(value) => {
                        worksheet.write_string(row_number, col, value)?;
                    }
                    Cell::Number(value) => {
                        worksheet.write_number(row_number, col, *value)?;
                    }
                    Cell::Date(value) => {
                        let days = excel_serial(*value);
                        worksheet.write_number_with_format(row_number, col, days, &date_format)?;
                    }
                    Cell::Empty => {}
                }
            }
        }
    }

    workbook
        .save(path)
        .with_context(|| format!("failed to write workbook {}", path.display()))?;
    Ok(())
}

/// Days since Excel's 1899-12-30 epoch.
fn excel_serial(date: NaiveDate) -> f64 {
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30).unwrap_or(NaiveDate::MIN);
    (date - epoch).num_days() as f64
}
