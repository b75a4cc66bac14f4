// Excel import (xlsx, xls, xlsb, ods) as text rows for the reconciliation engine.
//
// Cells are rendered the way a user reads them: integral numbers without
// decimals, dates in the caller's format. Column positions are absolute,
// so a sheet whose data starts at C1 yields two leading empty cells.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader, Sheets};
use chrono::{Days, NaiveDate, NaiveDateTime};
use ledgercheck_recon::{ReconError, TabularSource};

/// A workbook on disk, read one sheet at a time.
pub struct WorkbookSource {
    name: String,
    date_format: String,
    workbook: Sheets<BufReader<File>>,
}

impl WorkbookSource {
    /// Open a workbook. Date-typed cells are formatted with `date_format`
    /// (a chrono strftime pattern) so they read like typed-in text.
    pub fn open(path: &Path, date_format: &str) -> Result<Self, ReconError> {
        let name = path.display().to_string();
        let workbook = open_workbook_auto(path).map_err(|e| ReconError::Source {
            name: name.clone(),
            message: format!("failed to open workbook: {e}"),
        })?;
        log::debug!("opened workbook '{name}'");

        Ok(Self {
            name,
            date_format: date_format.to_string(),
            workbook,
        })
    }
}

impl TabularSource for WorkbookSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn sheet_names(&self) -> Vec<String> {
        self.workbook.sheet_names().to_vec()
    }

    fn rows(&mut self, sheet: &str) -> Result<Vec<Vec<String>>, ReconError> {
        if !self.sheet_names().iter().any(|s| s == sheet) {
            return Err(ReconError::SheetNotFound {
                name: self.name.clone(),
                sheet: sheet.to_string(),
            });
        }

        let range = self.workbook.worksheet_range(sheet).map_err(|e| ReconError::Source {
            name: self.name.clone(),
            message: format!("failed to read sheet '{sheet}': {e}"),
        })?;

        // Range start offset (data may not begin at A1)
        let (_, start_col) = range.start().unwrap_or((0, 0));
        let rows = range
            .rows()
            .map(|row| {
                let mut cells = vec![String::new(); start_col as usize];
                cells.extend(row.iter().map(|cell| cell_text(cell, &self.date_format)));
                cells
            })
            .collect();
        Ok(rows)
    }
}

/// Render one cell as text.
pub fn cell_text(cell: &Data, date_format: &str) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(n) => {
            // Format nicely: integers without decimals
            if n.fract() == 0.0 && n.abs() < 1e15 {
                format!("{}", *n as i64)
            } else {
                format!("{}", n)
            }
        }
        Data::Int(n) => n.to_string(),
        Data::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        Data::Error(e) => format!("#{:?}", e),
        Data::DateTime(dt) => {
            // calamine doesn't expose the 1904 flag; assume the 1900 system.
            let serial = dt.as_f64();
            match serial_to_date(serial) {
                Some(date) => date.format(date_format).to_string(),
                None => {
                    log::warn!("date serial {serial} out of range; kept as number");
                    format!("{}", serial)
                }
            }
        }
        Data::DateTimeIso(s) => match iso_date(s) {
            Some(date) => date.format(date_format).to_string(),
            None => s.clone(),
        },
        Data::DurationIso(s) => s.clone(),
    }
}

/// Excel 1900-system serial to calendar date; the time of day is dropped.
/// Day 0 is 1899-12-30, which absorbs the phantom 1900-02-29.
pub fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_days(Days::new(serial.floor() as u64))
}

fn iso_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").map(|dt| dt.date()))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledgercheck_recon::dates::{LEDGER_DATE_FORMAT, LOG_DATE_FORMAT};
    use rust_xlsxwriter::{Format, Workbook as XlsxWorkbook};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_serial_to_date() {
        assert_eq!(serial_to_date(45078.0), Some(date(2023, 6, 1)));
        assert_eq!(serial_to_date(45078.75), Some(date(2023, 6, 1)));
        assert_eq!(serial_to_date(1.0), Some(date(1899, 12, 31)));
        assert_eq!(serial_to_date(-1.0), None);
        assert_eq!(serial_to_date(f64::NAN), None);
    }

    #[test]
    fn test_cell_text_numbers() {
        assert_eq!(cell_text(&Data::Float(1000.0), LEDGER_DATE_FORMAT), "1000");
        assert_eq!(cell_text(&Data::Float(1.4), LEDGER_DATE_FORMAT), "1.4");
        assert_eq!(cell_text(&Data::Int(18), LEDGER_DATE_FORMAT), "18");
        assert_eq!(cell_text(&Data::Empty, LEDGER_DATE_FORMAT), "");
        assert_eq!(cell_text(&Data::Bool(true), LEDGER_DATE_FORMAT), "TRUE");
    }

    #[test]
    fn test_cell_text_iso_dates() {
        let cell = Data::DateTimeIso("2023-06-01T00:00:00".to_string());
        assert_eq!(cell_text(&cell, LEDGER_DATE_FORMAT), "06-01-23");
        assert_eq!(cell_text(&cell, LOG_DATE_FORMAT), "6/1");

        let cell = Data::DateTimeIso("not a date".to_string());
        assert_eq!(cell_text(&cell, LOG_DATE_FORMAT), "not a date");
    }

    #[test]
    fn test_read_workbook_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("invoice.xlsx");

        let mut wb = XlsxWorkbook::new();
        let date_format = Format::new().set_num_format("mm-dd-yy");
        {
            let ws = wb.add_worksheet();
            ws.set_name("May").unwrap();
            ws.write_string(0, 0, "old").unwrap();
        }
        {
            let ws = wb.add_worksheet();
            ws.set_name("June").unwrap();
            ws.write_string(0, 0, "No.").unwrap();
            ws.write_string(0, 1, "Case").unwrap();
            ws.write_number(1, 0, 1.0).unwrap();
            ws.write_string(1, 1, "ALP-1001").unwrap();
            ws.write_string(1, 2, "翻訳").unwrap();
            ws.write_number_with_format(1, 3, 45078.0, &date_format).unwrap();
            ws.write_number(1, 4, 1200.0).unwrap();
            ws.write_number(1, 5, 1.4).unwrap();
        }
        wb.save(&path).unwrap();

        let mut source = WorkbookSource::open(&path, LEDGER_DATE_FORMAT).unwrap();
        assert_eq!(source.sheet_names(), vec!["May", "June"]);

        let rows = source.rows("June").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1], vec!["1", "ALP-1001", "翻訳", "06-01-23", "1200", "1.4"]);
    }

    #[test]
    fn test_columns_are_absolute() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("offset.xlsx");

        let mut wb = XlsxWorkbook::new();
        let ws = wb.add_worksheet();
        ws.write_string(0, 2, "翻訳").unwrap();
        ws.write_number(0, 3, 500.0).unwrap();
        wb.save(&path).unwrap();

        let mut source = WorkbookSource::open(&path, LOG_DATE_FORMAT).unwrap();
        let rows = source.rows("Sheet1").unwrap();
        assert_eq!(rows[0], vec!["", "", "翻訳", "500"]);
    }

    #[test]
    fn test_missing_sheet_and_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("one.xlsx");
        let mut wb = XlsxWorkbook::new();
        wb.add_worksheet();
        wb.save(&path).unwrap();

        let mut source = WorkbookSource::open(&path, LOG_DATE_FORMAT).unwrap();
        assert!(matches!(
            source.rows("W99"),
            Err(ReconError::SheetNotFound { ref sheet, .. }) if sheet == "W99"
        ));

        let missing = dir.path().join("missing.xlsx");
        assert!(matches!(
            WorkbookSource::open(&missing, LOG_DATE_FORMAT),
            Err(ReconError::Source { .. })
        ));
    }
}
