use chrono::NaiveDate;
use thiserror::Error;
use tracing::debug;
use crate::models::NormalizedTable;

/// A table restricted to an inclusive window, plus the window actually used
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredTable {
    pub table: NormalizedTable,
    pub effective_start: NaiveDate,
    pub effective_end: NaiveDate,
}

/// Valid data was fetched, but nothing is left to display in the window
#[derive(Debug, Clone, PartialEq, Error)]
#[error("no rows between {} and {}", display_bound(.start), display_bound(.end))]
pub struct EmptyWindow {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

fn display_bound(bound: &Option<NaiveDate>) -> String {
    bound
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "(open)".to_string())
}

/// Keep rows with `start <= date <= end`.
///
/// An omitted bound defaults to the table's own first/last date, computed
/// before filtering.
pub fn filter(
    table: NormalizedTable,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<FilteredTable, EmptyWindow> {
    let empty = EmptyWindow { start, end };

    let effective_start = start.or(table.first_date()).ok_or_else(|| empty.clone())?;
    let effective_end = end.or(table.last_date()).ok_or_else(|| empty.clone())?;

    let before = table.len();
    let NormalizedTable { columns, mut records } = table;
    records.retain(|r| r.date >= effective_start && r.date <= effective_end);

    debug!(
        "Date filter {} → {} kept {} of {} rows",
        effective_start, effective_end, records.len(), before
    );

    if records.is_empty() {
        return Err(empty);
    }

    Ok(FilteredTable {
        table: NormalizedTable { columns, records },
        effective_start,
        effective_end,
    })
}
