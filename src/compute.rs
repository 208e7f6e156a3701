use crate::data::{AccountView, Error, ScorePoint, Table};

/// The selection list, in the order accounts first appear in the sheet. This
/// is the authoritative set: `build_view` refuses anything not in it.
pub fn account_names(table: &Table) -> &[String] {
    &table.account_names
}

/// Builds the per-account view-model: the account's rows in source order, the
/// five summary metrics, and the chronological score series.
///
/// Pure function of its inputs; calling it twice with the same table and name
/// yields the same view, and the table itself is never reordered or mutated.
/// Matching is exact and case-sensitive, the same as the sheet's own values.
pub fn build_view(table: &Table, account: &str) -> Result<AccountView, Error> {
    if !table.account_names.iter().any(|name| name == account) {
        return Err(Error::UnknownAccount(account.to_string()));
    }
    let records: Vec<_> = table
        .records
        .iter()
        .filter(|record| record.account_name == account)
        .cloned()
        .collect();

    let completed_meetings = records
        .iter()
        .filter(|r| r.meeting_status == "Completed")
        .count();
    let next_meeting_count = records
        .iter()
        .filter(|r| r.next_meeting_planned == "Yes")
        .count();
    let escalations_count = records.iter().filter(|r| r.escalations == "Yes").count();

    // Mean over the scores that are actually present. No scores at all means
    // "not available", which stays a None all the way to the renderer.
    let scores: Vec<f64> = records.iter().filter_map(|r| r.feedback_score).collect();
    let average_feedback_score = if scores.is_empty() {
        None
    } else {
        Some(scores.iter().sum::<f64>() / scores.len() as f64)
    };

    // The trend chart wants chronological order, which is not the sheet order.
    // Sort a separate projection: known dates ascending, unknown dates last,
    // sheet order preserved among ties (the sort is stable).
    let mut score_series: Vec<ScorePoint> = records
        .iter()
        .map(|r| ScorePoint {
            meeting_date: r.meeting_date,
            feedback_score: r.feedback_score,
        })
        .collect();
    score_series.sort_by_key(|point| (point.meeting_date.is_none(), point.meeting_date));

    Ok(AccountView {
        account: account.to_string(),
        total_meetings: records.len(),
        completed_meetings,
        average_feedback_score,
        next_meeting_count,
        escalations_count,
        score_series,
        records,
    })
}
