use std::collections::HashSet;
use chrono::NaiveDate;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;
use crate::api::alphavantage::RawSeries;
use crate::models::{Field, FieldValue, NormalizedRecord, NormalizedTable};

/// Structural problems with a raw series. Any of these aborts the whole table.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NormalizeError {
    #[error("invalid date key '{0}' in time series")]
    InvalidDate(String),
    #[error("row '{0}' is not an object")]
    MalformedRow(String),
    #[error("date {0} appears more than once in time series")]
    DuplicateDate(NaiveDate),
}

/// Parse a provider date key (YYYY-MM-DD)
pub fn parse_date_key(key: &str) -> Result<NaiveDate, NormalizeError> {
    NaiveDate::parse_from_str(key.trim(), "%Y-%m-%d")
        .map_err(|_| NormalizeError::InvalidDate(key.to_string()))
}

/// Convert a raw series into an ordered table of typed records.
///
/// Field names lose their ordinal prefix, values are coerced one field at a
/// time (non-numeric values are kept as text), and rows are sorted by date.
pub fn normalize(raw: &RawSeries) -> Result<NormalizedTable, NormalizeError> {
    let mut columns: Vec<Field> = Vec::new();
    let mut records: Vec<NormalizedRecord> = Vec::with_capacity(raw.len());
    let mut seen_dates = HashSet::with_capacity(raw.len());

    for (key, row) in raw {
        let date = parse_date_key(key)?;
        if !seen_dates.insert(date) {
            return Err(NormalizeError::DuplicateDate(date));
        }

        let Value::Object(fields) = row else {
            return Err(NormalizeError::MalformedRow(key.clone()));
        };

        let mut record = NormalizedRecord::new(date);
        for (name, value) in fields {
            let field = Field::from_raw_name(name);
            if !columns.contains(&field) {
                columns.push(field.clone());
            }
            record.fields.insert(field, FieldValue::from_json(value));
        }
        records.push(record);
    }

    records.sort_by_key(|r| r.date);

    debug!("Normalized {} rows with columns {:?}", records.len(), columns);

    Ok(NormalizedTable { columns, records })
}
