use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Positive client identifier (`SK_ID_CURR` in the source data).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(u64);

impl ClientId {
    pub const MIN: u64 = 1;

    /// Returns `None` for zero; identifiers start at 1.
    pub const fn new(raw: u64) -> Option<Self> {
        if raw >= Self::MIN {
            Some(Self(raw))
        } else {
            None
        }
    }

    pub const fn get(self) -> u64 {
        self.0
    }

    /// Accept integer cells as well as integral floats (`100002.0`) written by dataframe exports.
    pub fn parse_cell(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if let Ok(value) = trimmed.parse::<u64>() {
            return Self::new(value);
        }

        let value = trimmed.parse::<f64>().ok()?;
        if value.is_finite() && value.fract() == 0.0 && value >= 1.0 && value <= u64::MAX as f64
        {
            Self::new(value as u64)
        } else {
            None
        }
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single cell of the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Number(f64),
    Category(String),
    Missing,
}

impl FeatureValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FeatureValue::Number(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_category(&self) -> Option<&str> {
        match self {
            FeatureValue::Category(value) => Some(value.as_str()),
            FeatureValue::Number(_) | FeatureValue::Missing => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, FeatureValue::Missing)
    }

    /// Map an arbitrary JSON value from the remote client-info payload.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => FeatureValue::Missing,
            Value::Number(number) => number
                .as_f64()
                .map(FeatureValue::Number)
                .unwrap_or_else(|| FeatureValue::Category(number.to_string())),
            Value::String(text) => FeatureValue::Category(text.clone()),
            Value::Bool(flag) => FeatureValue::Category(flag.to_string()),
            other => FeatureValue::Category(other.to_string()),
        }
    }
}

impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureValue::Number(value) => write!(f, "{value}"),
            FeatureValue::Category(value) => f.write_str(value),
            FeatureValue::Missing => f.write_str("-"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Numeric,
    Categorical,
}

impl ColumnKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Numeric => "numeric",
            Self::Categorical => "categorical",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
}

/// One applicant row; `values` is aligned with the catalog's feature columns.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplicantRecord {
    pub id: ClientId,
    pub values: Vec<FeatureValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureRow {
    pub feature: String,
    pub value: FeatureValue,
}

/// Descriptive features for one client, in display order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientInfo {
    pub client_id: ClientId,
    pub rows: Vec<FeatureRow>,
}

impl ClientInfo {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
