use crate::data::{AccountView, Table};
use chrono::NaiveDate;

/// Plain-text stand-in for the dashboard widgets. Everything here is derived
/// from the view-model only; no aggregation happens at this layer.
pub(crate) fn write_account_report<W: std::io::Write>(
    mut writer: W,
    view: &AccountView,
) -> Result<(), anyhow::Error> {
    writeln!(writer, "Details for account: {}", view.account)?;
    for record in &view.records {
        writeln!(
            writer,
            "  {}  {}  {}  {}  score {}  next: {}  escalation: {}  CSM: {}",
            fmt_date(record.meeting_date),
            record.quarter,
            record.meeting_status,
            record.meeting_cadence,
            fmt_score(record.feedback_score),
            record.next_meeting_planned,
            record.escalations,
            record.csm_owner,
        )?;
    }
    writeln!(writer)?;
    writeln!(writer, "Total meetings:     {}", view.total_meetings)?;
    writeln!(writer, "Completed meetings: {}", view.completed_meetings)?;
    writeln!(
        writer,
        "Avg feedback score: {}",
        fmt_score(view.average_feedback_score)
    )?;
    writeln!(writer, "Next meetings:      {}", view.next_meeting_count)?;
    writeln!(writer, "Escalations:        {}", view.escalations_count)?;
    writeln!(writer)?;
    writeln!(writer, "Score trend:")?;
    for point in &view.score_series {
        writeln!(
            writer,
            "  {}  {}",
            fmt_date(point.meeting_date),
            fmt_score(point.feedback_score)
        )?;
    }
    let notes: Vec<_> = view
        .records
        .iter()
        .filter(|r| !r.mom_notes.is_empty())
        .collect();
    if !notes.is_empty() {
        writeln!(writer)?;
        writeln!(writer, "MoM notes:")?;
        for record in notes {
            writeln!(
                writer,
                "  {}: {}",
                fmt_date(record.meeting_date),
                record.mom_notes
            )?;
        }
    }
    Ok(())
}

/// The same view-model as structured JSON, for anything downstream that wants
/// to draw its own widgets.
pub(crate) fn write_account_json<W: std::io::Write>(
    writer: W,
    view: &AccountView,
) -> Result<(), anyhow::Error> {
    serde_json::to_writer_pretty(writer, view)?;
    Ok(())
}

/// The selection list, one account per line.
pub(crate) fn write_account_list<W: std::io::Write>(
    mut writer: W,
    table: &Table,
) -> Result<(), anyhow::Error> {
    for name in &table.account_names {
        writeln!(writer, "{name}")?;
    }
    Ok(())
}

fn fmt_date(date: Option<NaiveDate>) -> String {
    match date {
        Some(date) => date.to_string(),
        None => "unknown".to_string(),
    }
}

fn fmt_score(score: Option<f64>) -> String {
    match score {
        Some(score) => format!("{score:.1}"),
        None => "N/A".to_string(),
    }
}
