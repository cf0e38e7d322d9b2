use std::collections::HashSet;

use domain::HoldingRecord;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::warn;

use crate::calculate::{percent_of, value_holding};

const DEFAULT_BLOCKCHAIN: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("entry {index} is not an object")]
    NotAnObject { index: usize },
    #[error("entry {index} is missing `{field}`")]
    MissingField { index: usize, field: &'static str },
    #[error("entry {index} has a non-text `{field}`")]
    NotText { index: usize, field: &'static str },
    #[error("entry {index} has a non-numeric `{field}`")]
    NotNumeric { index: usize, field: &'static str },
    #[error("entry {index} has a non-finite `{field}`")]
    NonFinite { index: usize, field: &'static str },
    #[error("entry {index} has a negative `{field}` ({value})")]
    Negative {
        index: usize,
        field: &'static str,
        value: f64,
    },
    #[error("entry {index} repeats id `{id}`")]
    DuplicateId { index: usize, id: String },
    #[error("entry {index} is too large to value")]
    Overflow { index: usize },
}

impl ValidationError {
    pub fn index(&self) -> usize {
        match self {
            Self::NotAnObject { index }
            | Self::MissingField { index, .. }
            | Self::NotText { index, .. }
            | Self::NotNumeric { index, .. }
            | Self::NonFinite { index, .. }
            | Self::Negative { index, .. }
            | Self::DuplicateId { index, .. }
            | Self::Overflow { index } => *index,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Normalized {
    pub records: Vec<HoldingRecord>,
    pub rejected: Vec<ValidationError>,
}

impl Normalized {
    pub fn skipped(&self) -> usize {
        self.rejected.len()
    }
}

/// Shapes raw holding entries into records, dropping every entry that fails
/// validation. Input order is preserved; the first entry with a given id wins.
pub fn normalize(entries: &[Value]) -> Normalized {
    let mut out = Normalized::default();
    let mut seen = HashSet::with_capacity(entries.len());
    let mut running = Running::default();

    for (index, entry) in entries.iter().enumerate() {
        let result = normalize_entry(index, entry)
            .and_then(|record| running.admit(index, record))
            .and_then(|record| {
                if seen.insert(record.id.clone()) {
                    Ok(record)
                } else {
                    Err(ValidationError::DuplicateId {
                        index,
                        id: record.id,
                    })
                }
            });
        match result {
            Ok(record) => {
                running.add(&record);
                out.records.push(record);
            }
            Err(err) => {
                warn!(index = err.index(), error = %err, "holding entry rejected");
                out.rejected.push(err);
            }
        }
    }

    out
}

/// Totals of the records accepted so far. An entry whose metrics, or whose
/// contribution to these totals, would leave the finite range is rejected.
#[derive(Default)]
struct Running {
    value: f64,
    cost: f64,
}

impl Running {
    fn admit(
        &self,
        index: usize,
        record: HoldingRecord,
    ) -> Result<HoldingRecord, ValidationError> {
        let metrics = value_holding(&record);
        let value = self.value + metrics.value;
        let cost = self.cost + metrics.cost;
        let finite = [
            metrics.value,
            metrics.cost,
            metrics.gain_percent,
            value,
            cost,
            percent_of(value - cost, cost),
        ]
        .iter()
        .all(|n| n.is_finite());
        if finite {
            Ok(record)
        } else {
            Err(ValidationError::Overflow { index })
        }
    }

    fn add(&mut self, record: &HoldingRecord) {
        let metrics = value_holding(record);
        self.value += metrics.value;
        self.cost += metrics.cost;
    }
}

fn normalize_entry(index: usize, entry: &Value) -> Result<HoldingRecord, ValidationError> {
    let obj = entry
        .as_object()
        .ok_or(ValidationError::NotAnObject { index })?;

    Ok(HoldingRecord {
        id: required_id(index, obj)?,
        name: required_text(index, obj, "name")?,
        ticker: required_text(index, obj, "ticker")?,
        shares: required_amount(index, obj, "shares", "shares")?,
        cost_basis: required_amount(index, obj, "costBasis", "cost_basis")?,
        current_price: required_amount(index, obj, "currentPrice", "current_price")?,
        blockchain: optional_text(obj, "blockchain")
            .unwrap_or_else(|| DEFAULT_BLOCKCHAIN.to_string()),
        logo: optional_text(obj, "logo"),
    })
}

fn lookup<'a>(obj: &'a Map<String, Value>, key: &str, alias: &str) -> Option<&'a Value> {
    obj.get(key)
        .or_else(|| obj.get(alias))
        .filter(|value| !value.is_null())
}

fn required_id(index: usize, obj: &Map<String, Value>) -> Result<String, ValidationError> {
    match lookup(obj, "id", "id") {
        Some(Value::String(id)) if !id.trim().is_empty() => Ok(id.trim().to_string()),
        Some(Value::Number(id)) => Ok(id.to_string()),
        Some(Value::String(_)) | None => Err(ValidationError::MissingField { index, field: "id" }),
        Some(_) => Err(ValidationError::NotText { index, field: "id" }),
    }
}

fn required_text(
    index: usize,
    obj: &Map<String, Value>,
    field: &'static str,
) -> Result<String, ValidationError> {
    match lookup(obj, field, field) {
        Some(Value::String(text)) if !text.trim().is_empty() => Ok(text.trim().to_string()),
        Some(Value::String(_)) | None => Err(ValidationError::MissingField { index, field }),
        Some(_) => Err(ValidationError::NotText { index, field }),
    }
}

fn optional_text(obj: &Map<String, Value>, field: &str) -> Option<String> {
    obj.get(field)
        .and_then(|value| value.as_str())
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

fn required_amount(
    index: usize,
    obj: &Map<String, Value>,
    field: &'static str,
    alias: &str,
) -> Result<f64, ValidationError> {
    let raw = lookup(obj, field, alias).ok_or(ValidationError::MissingField { index, field })?;
    let value = match raw {
        Value::Number(number) => number.as_f64(),
        // token amounts often arrive pre-formatted as decimal strings
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }
    .ok_or(ValidationError::NotNumeric { index, field })?;

    if !value.is_finite() {
        return Err(ValidationError::NonFinite { index, field });
    }
    if value < 0.0 {
        return Err(ValidationError::Negative {
            index,
            field,
            value,
        });
    }
    Ok(value)
}
