use crate::data::{Error, MeetingRecord, Table};
use calamine::{open_workbook_auto, Data, Reader};
use chrono::{NaiveDate, NaiveDateTime};
use log::warn;
use std::path::Path;

/// Date formats seen across the tracker sheet variants, tried in order. ISO
/// first, then day-first (the sheets are maintained day-first), then the
/// US-style and spelled-out forms some exports produce.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d", "%Y/%m/%d", "%d-%m-%Y", "%d/%m/%Y", "%m/%d/%Y", "%d %b %Y", "%b %d, %Y",
    "%B %d, %Y",
];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// Loads the tracker sheet at `path` into a `Table`.
///
/// Workbook extensions go through `calamine` (first worksheet only, matching
/// how the sheet is actually maintained); everything else is treated as a CSV
/// export of the same sheet. Missing file and missing columns are hard errors;
/// unreadable cell values inside a row are not, they just become "missing" so
/// one bad cell can't take down the whole dashboard.
pub fn load(path: &Path) -> Result<Table, Error> {
    if !path.exists() {
        return Err(Error::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match extension.as_str() {
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => {
            let (headers, rows) = workbook_rows(path)?;
            build_table(path, headers, rows)
        }
        _ => {
            let file = std::fs::File::open(path).map_err(|e| load_error(path, e))?;
            table_from_csv(path, file)
        }
    }
}

/// CSV half of the loader, split out so tests can feed it byte slices.
pub(crate) fn table_from_csv<R: std::io::Read>(path: &Path, reader: R) -> Result<Table, Error> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let headers = rdr
        .headers()
        .map_err(|e| load_error(path, e))?
        .iter()
        .map(str::to_string)
        .collect();
    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record.map_err(|e| load_error(path, e))?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    build_table(path, headers, rows)
}

/// Reads the first worksheet of a workbook into header + data rows, with every
/// cell flattened to text so the same row parser serves both input formats.
fn workbook_rows(path: &Path) -> Result<(Vec<String>, Vec<Vec<String>>), Error> {
    let mut workbook = open_workbook_auto(path).map_err(|e| load_error(path, e))?;
    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| load_error(path, "workbook has no worksheets"))?;
    let range = workbook
        .worksheet_range(&sheet)
        .map_err(|e| load_error(path, e))?;
    let mut rows = range
        .rows()
        .map(|row| row.iter().map(cell_to_string).collect::<Vec<String>>());
    let headers = rows
        .next()
        .ok_or_else(|| load_error(path, format!("worksheet {sheet:?} is empty")))?;
    Ok((headers, rows.collect()))
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(n) => n.to_string(),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::Error(e) => format!("#ERR({e:?})"),
        // Excel serial dates; render as ISO so the shared date parser gets them.
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|d| d.date().to_string())
            .unwrap_or_default(),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
    }
}

/// Finds a required column by its trimmed, case-folded name. The sheet
/// variants disagree on header whitespace and capitalization, so matching is
/// always done on the normalized form; the caption is what the error shows.
fn column_index(
    path: &Path,
    normalized: &[String],
    key: &str,
    caption: &str,
) -> Result<usize, Error> {
    normalized
        .iter()
        .position(|h| h == key)
        .ok_or_else(|| Error::SchemaError {
            path: path.to_path_buf(),
            column: caption.to_string(),
        })
}

fn build_table(path: &Path, headers: Vec<String>, rows: Vec<Vec<String>>) -> Result<Table, Error> {
    let normalized: Vec<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();
    let account = column_index(path, &normalized, "account name", "Account Name")?;
    let quarter = column_index(path, &normalized, "quarter", "Quarter")?;
    let meeting_date = column_index(path, &normalized, "meeting date", "Meeting Date")?;
    let status = column_index(path, &normalized, "meeting status", "Meeting Status")?;
    let cadence = column_index(path, &normalized, "meeting cadence", "Meeting Cadence")?;
    let follow_up = column_index(path, &normalized, "follow-up date", "Follow-Up Date")?;
    let score = column_index(
        path,
        &normalized,
        "feedback score (1-10)",
        "Feedback Score (1-10)",
    )?;
    let notes = column_index(path, &normalized, "mom notes", "MoM Notes")?;
    let next_planned = column_index(
        path,
        &normalized,
        "next meeting planned (yes/no)",
        "Next Meeting Planned (Yes/No)",
    )?;
    let next_date = column_index(
        path,
        &normalized,
        "date of next meeting",
        "Date of Next Meeting",
    )?;
    let escalations = column_index(path, &normalized, "escalations (yes/no)", "Escalations (Yes/No)")?;
    let owner = column_index(path, &normalized, "csm owner", "CSM Owner")?;

    let mut records = Vec::with_capacity(rows.len());
    let mut account_names: Vec<String> = Vec::new();
    for row in &rows {
        if row.iter().all(|cell| cell.trim().is_empty()) {
            // Trailing junk rows are common in hand-maintained sheets.
            continue;
        }
        // Ragged rows read as empty cells past their end.
        let cell = |idx: usize| row.get(idx).map(|c| c.trim()).unwrap_or("").to_string();
        let record = MeetingRecord {
            account_name: cell(account),
            quarter: cell(quarter),
            meeting_date: parse_date(&cell(meeting_date)),
            meeting_status: cell(status),
            meeting_cadence: cell(cadence),
            follow_up_date: parse_date(&cell(follow_up)),
            feedback_score: parse_score(&cell(score)),
            mom_notes: cell(notes),
            next_meeting_planned: cell(next_planned),
            date_of_next_meeting: parse_date(&cell(next_date)),
            escalations: cell(escalations),
            csm_owner: cell(owner),
        };
        if record.account_name.is_empty() {
            warn!("skipping a row with no account name in {}", path.display());
            continue;
        }
        if !account_names.contains(&record.account_name) {
            account_names.push(record.account_name.clone());
        }
        records.push(record);
    }
    Ok(Table {
        records,
        account_names,
    })
}

/// Free-form date parsing. Anything that matches none of the known formats is
/// kept as unknown rather than failing the load; the dashboard degrades fine
/// for a missing date but not for a missing table.
fn parse_date(text: &str) -> Option<NaiveDate> {
    if text.is_empty() {
        return None;
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return Some(date);
        }
    }
    for format in DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(text, format) {
            return Some(datetime.date());
        }
    }
    warn!("unparsable date {text:?}, keeping it as unknown");
    None
}

fn parse_score(text: &str) -> Option<f64> {
    if text.is_empty() {
        return None;
    }
    match text.parse::<f64>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("unparsable feedback score {text:?}, treating it as missing");
            None
        }
    }
}

fn load_error(path: &Path, detail: impl std::string::ToString) -> Error {
    Error::LoadError {
        path: path.to_path_buf(),
        detail: detail.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::{load, parse_date, table_from_csv};
    use crate::data::Error;
    use chrono::NaiveDate;
    use std::path::Path;

    const HEADER: &str = "Account Name,Quarter,Meeting Date,Meeting Status,Meeting Cadence,\
Follow-Up Date,Feedback Score (1-10),MoM Notes,Next Meeting Planned (Yes/No),\
Date of Next Meeting,Escalations (Yes/No),CSM Owner";

    fn date(text: &str) -> NaiveDate {
        NaiveDate::parse_from_str(text, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn loads_a_tracker_sheet() {
        let sheet = format!(
            "{HEADER}\n\
             Acme, Q1, 2024-01-15, Completed, Monthly, 2024-01-20, 8, Kickoff went well, Yes, 2024-02-15, No, Priya\n\
             Globex, Q1, 2024-01-18, Scheduled, Quarterly, , , , No, , No, Ravi\n\
             Acme, Q1, 2024-02-15, Completed, Monthly, , 6, Follow-up on rollout, Yes, 2024-03-15, Yes, Priya\n"
        );
        let table = table_from_csv(Path::new("tracker.csv"), sheet.as_bytes()).unwrap();
        assert_eq!(table.records.len(), 3);
        assert_eq!(table.account_names, ["Acme", "Globex"]);
        let first = &table.records[0];
        assert_eq!(first.account_name, "Acme");
        assert_eq!(first.meeting_date, Some(date("2024-01-15")));
        assert_eq!(first.feedback_score, Some(8.0));
        assert_eq!(first.mom_notes, "Kickoff went well");
        assert_eq!(first.csm_owner, "Priya");
        // Blank score and blank dates come through as missing, not zero.
        let second = &table.records[1];
        assert_eq!(second.feedback_score, None);
        assert_eq!(second.follow_up_date, None);
        assert_eq!(second.date_of_next_meeting, None);
    }

    #[test]
    fn headers_are_normalized_before_matching() {
        let sheet = "ACCOUNT NAME,quarter,Meeting Date,meeting STATUS,Meeting Cadence,\
Follow-Up Date,FEEDBACK SCORE (1-10),MoM Notes,Next Meeting Planned (Yes/No),\
Date of Next Meeting,Escalations (Yes/No),csm owner\n\
Acme,Q2,2024-04-01,Completed,Monthly,,7,,Yes,,No,Priya\n";
        let table = table_from_csv(Path::new("tracker.csv"), sheet.as_bytes()).unwrap();
        assert_eq!(table.account_names, ["Acme"]);
        assert_eq!(table.records[0].feedback_score, Some(7.0));
    }

    #[test]
    fn missing_column_is_a_schema_error() {
        let sheet = "Account Name,Quarter,Meeting Date,Meeting Status,Meeting Cadence,\
Follow-Up Date,Feedback Score (1-10),MoM Notes,Next Meeting Planned (Yes/No),\
Date of Next Meeting,Escalations (Yes/No)\n\
Acme,Q1,2024-01-15,Completed,Monthly,,8,,Yes,,No\n";
        let err = table_from_csv(Path::new("tracker.csv"), sheet.as_bytes()).unwrap_err();
        assert_eq!(
            err,
            Error::SchemaError {
                path: "tracker.csv".into(),
                column: "CSM Owner".to_string(),
            }
        );
    }

    #[test]
    fn bad_dates_do_not_abort_the_load() {
        let sheet = format!(
            "{HEADER}\n\
             Acme,Q1,sometime soon,Completed,Monthly,,8,,Yes,,No,Priya\n"
        );
        let table = table_from_csv(Path::new("tracker.csv"), sheet.as_bytes()).unwrap();
        assert_eq!(table.records[0].meeting_date, None);
        assert_eq!(table.records[0].feedback_score, Some(8.0));
    }

    #[test]
    fn blank_and_ragged_rows_are_tolerated() {
        let sheet = format!(
            "{HEADER}\n\
             ,,,,,,,,,,,\n\
             Acme,Q1,2024-01-15,Completed\n"
        );
        let table = table_from_csv(Path::new("tracker.csv"), sheet.as_bytes()).unwrap();
        assert_eq!(table.records.len(), 1);
        assert_eq!(table.records[0].meeting_status, "Completed");
        assert_eq!(table.records[0].csm_owner, "");
    }

    #[test]
    fn missing_file_is_reported_with_its_path() {
        let err = load(Path::new("/no/such/tracker.csv")).unwrap_err();
        assert_eq!(
            err,
            Error::FileNotFound {
                path: "/no/such/tracker.csv".into(),
            }
        );
    }

    #[test]
    fn date_formats_from_the_sheet_variants() {
        assert_eq!(parse_date("2024-01-15"), Some(date("2024-01-15")));
        assert_eq!(parse_date("15/01/2024"), Some(date("2024-01-15")));
        assert_eq!(parse_date("15 Jan 2024"), Some(date("2024-01-15")));
        assert_eq!(parse_date("2024-01-15 00:00:00"), Some(date("2024-01-15")));
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("next tuesday"), None);
    }
}
