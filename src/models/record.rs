//! Normalized price table models

use chrono::NaiveDate;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Role of a column in a price record, discovered from the cleaned field name
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Open,
    High,
    Low,
    Close,
    Volume,
    Other(String),
}

impl Field {
    /// Build a field from a raw provider name such as `"1. open"`
    pub fn from_raw_name(raw: &str) -> Self {
        Self::from_clean_name(clean_field_name(raw))
    }

    pub fn from_clean_name(name: &str) -> Self {
        match name {
            "open" => Field::Open,
            "high" => Field::High,
            "low" => Field::Low,
            "close" => Field::Close,
            "volume" => Field::Volume,
            other => Field::Other(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Field::Open => "open",
            Field::High => "high",
            Field::Low => "low",
            Field::Close => "close",
            Field::Volume => "volume",
            Field::Other(name) => name,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Strip a leading ordinal prefix like `"1. "` or `"1a. "` from a provider field name.
/// Names without such a prefix are returned unchanged.
pub fn clean_field_name(raw: &str) -> &str {
    let Some((prefix, rest)) = raw.split_once(". ") else {
        return raw;
    };

    let digits = prefix.chars().take_while(|c| c.is_ascii_digit()).count();
    let is_ordinal = digits > 0
        && prefix[digits..].chars().all(|c| c.is_ascii_lowercase());

    if is_ordinal {
        rest
    } else {
        raw
    }
}

/// A single field value after type coercion.
/// Values that are not numeric are kept verbatim rather than dropped.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Integer(i64),
    Decimal(f64),
    Text(String),
}

impl FieldValue {
    /// Coerce a provider string, trying integer first, then decimal
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if let Ok(n) = trimmed.parse::<i64>() {
            return FieldValue::Integer(n);
        }
        match trimmed.parse::<f64>() {
            Ok(n) if n.is_finite() => FieldValue::Decimal(n),
            _ => FieldValue::Text(raw.to_string()),
        }
    }

    /// Coerce an arbitrary JSON value. Strings go through [`FieldValue::parse`].
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::String(s) => Self::parse(s),
            Value::Number(n) => match n.as_i64() {
                Some(i) => FieldValue::Integer(i),
                None => n
                    .as_f64()
                    .map(FieldValue::Decimal)
                    .unwrap_or_else(|| FieldValue::Text(n.to_string())),
            },
            other => FieldValue::Text(other.to_string()),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Integer(n) => Some(*n as f64),
            FieldValue::Decimal(n) => Some(*n),
            FieldValue::Text(_) => None,
        }
    }

    #[cfg(test)]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(n) => Some(*n),
            FieldValue::Decimal(n) if n.fract() == 0.0 => Some(*n as i64),
            _ => None,
        }
    }

    /// Render back to the provider's string form.
    /// Decimals keep their fractional part so they re-parse as decimals.
    #[cfg(test)]
    pub fn to_raw_string(&self) -> String {
        match self {
            FieldValue::Integer(n) => n.to_string(),
            FieldValue::Decimal(n) => format!("{:?}", n),
            FieldValue::Text(s) => s.clone(),
        }
    }
}

/// One row of the normalized table
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRecord {
    pub date: NaiveDate,
    pub fields: BTreeMap<Field, FieldValue>,
}

impl NormalizedRecord {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            fields: BTreeMap::new(),
        }
    }

    pub fn get(&self, field: &Field) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    /// Numeric value of a field, `None` when absent or non-numeric
    pub fn number(&self, field: &Field) -> Option<f64> {
        self.get(field).and_then(FieldValue::as_f64)
    }

    #[cfg(test)]
    pub fn open(&self) -> Option<f64> {
        self.number(&Field::Open)
    }

    #[cfg(test)]
    pub fn high(&self) -> Option<f64> {
        self.number(&Field::High)
    }

    #[cfg(test)]
    pub fn low(&self) -> Option<f64> {
        self.number(&Field::Low)
    }

    #[cfg(test)]
    pub fn close(&self) -> Option<f64> {
        self.number(&Field::Close)
    }

    #[cfg(test)]
    pub fn volume(&self) -> Option<i64> {
        self.get(&Field::Volume).and_then(FieldValue::as_i64)
    }
}

/// Ordered OHLC(V) table. Records are strictly ascending by date.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NormalizedTable {
    /// Cleaned column names in the order they first appeared
    pub columns: Vec<Field>,
    pub records: Vec<NormalizedRecord>,
}

impl NormalizedTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn has_column(&self, field: &Field) -> bool {
        self.columns.contains(field)
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.records.first().map(|r| r.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.records.last().map(|r| r.date)
    }

    /// Serialize back into the provider's raw shape:
    /// `{"YYYY-MM-DD": {"1. open": "...", ...}}`
    ///
    /// Ordinals are zero-padded to a common width so the raw keys sort in column order.
    #[cfg(test)]
    pub fn to_raw(&self) -> serde_json::Map<String, Value> {
        let width = self.columns.len().to_string().len();
        let mut raw = serde_json::Map::new();
        for record in &self.records {
            let mut row = serde_json::Map::new();
            for (idx, column) in self.columns.iter().enumerate() {
                if let Some(value) = record.get(column) {
                    row.insert(
                        format!("{:0width$}. {}", idx + 1, column.name(), width = width),
                        Value::String(value.to_raw_string()),
                    );
                }
            }
            raw.insert(record.date.format("%Y-%m-%d").to_string(), Value::Object(row));
        }
        raw
    }
}
