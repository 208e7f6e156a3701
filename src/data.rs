use chrono::NaiveDate;
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// One row of the tracker sheet, kept close to the source columns. Anything the
/// dashboard doesn't interpret (quarter labels, cadence, owner) stays a plain
/// string and passes through untouched. The fields that can legitimately be
/// blank or unreadable in the sheet are `Option`s rather than sentinel values,
/// so a missing feedback score never counts as 0 and an unreadable date never
/// counts as "today".
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeetingRecord {
    pub account_name: String,
    pub quarter: String,
    pub meeting_date: Option<NaiveDate>,
    pub meeting_status: String,
    pub meeting_cadence: String,
    pub follow_up_date: Option<NaiveDate>,
    pub feedback_score: Option<f64>,
    pub mom_notes: String,
    pub next_meeting_planned: String,
    pub date_of_next_meeting: Option<NaiveDate>,
    pub escalations: String,
    pub csm_owner: String,
}

/// The whole sheet after one load: every record in source order plus the
/// distinct account names in first-seen order. The name list is the
/// authoritative selection set; asking for anything else is `UnknownAccount`.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub records: Vec<MeetingRecord>,
    pub account_names: Vec<String>,
}

/// One point of the per-account score trend. The chart plots every meeting
/// individually, so both halves can be missing independently.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScorePoint {
    pub meeting_date: Option<NaiveDate>,
    pub feedback_score: Option<f64>,
}

/// The per-account slice handed to whatever renders it: filtered rows in
/// source order, the five summary metrics, and the chronologically sorted
/// score series. Derived on demand and thrown away after rendering; only the
/// base `Table` is ever cached.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountView {
    pub account: String,
    pub records: Vec<MeetingRecord>,
    pub total_meetings: usize,
    pub completed_meetings: usize,
    /// Mean of the present scores; `None` when every score is missing. The
    /// renderer shows "N/A" for `None`, never 0.0 or NaN.
    pub average_feedback_score: Option<f64>,
    pub next_meeting_count: usize,
    pub escalations_count: usize,
    pub score_series: Vec<ScorePoint>,
}

/// Everything that can go wrong in the pipeline. All of these are recoverable
/// at the rendering boundary: the caller shows the message and skips that
/// render cycle, it never has to abort the process. Each loader variant
/// carries the source path so the message is actionable on its own.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("source file not found: {}", .path.display())]
    FileNotFound { path: PathBuf },
    #[error("required column {column:?} is missing from {}", .path.display())]
    SchemaError { path: PathBuf, column: String },
    #[error("could not load {}: {detail}", .path.display())]
    LoadError { path: PathBuf, detail: String },
    #[error("unknown account {0:?}")]
    UnknownAccount(String),
}
