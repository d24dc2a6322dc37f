use once_cell::sync::OnceCell;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// One row of `SHOW GLOBAL STATUS`, with the variable name lowercased.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusRow {
    pub name: String,
    pub value: String,
}

impl StatusRow {
    pub fn new(name: impl AsRef<str>, value: impl Into<String>) -> Self {
        Self {
            name: name.as_ref().to_ascii_lowercase(),
            value: value.into(),
        }
    }
}

/// A value in the per-poll output mapping.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetricValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl MetricValue {
    /// Coerce a raw status string for verbatim passthrough.
    ///
    /// Strings shaped like `digits.digits` are tried as floats first, then
    /// everything is tried as an integer; whatever fails both is kept as text.
    #[must_use]
    pub fn coerce(raw: &str) -> Self {
        if is_decimal(raw)
            && let Ok(v) = raw.parse::<f64>()
        {
            return Self::Float(v);
        }

        if let Ok(v) = raw.parse::<i64>() {
            return Self::Int(v);
        }

        Self::Text(raw.to_string())
    }

    /// Numeric view of the value, `None` for text.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            Self::Text(_) => None,
        }
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(v) => f.write_str(v),
        }
    }
}

/// Metrics produced by one poll, keyed by output name.
pub type OutputMetricSet = BTreeMap<String, MetricValue>;

fn is_decimal(raw: &str) -> bool {
    static RE: OnceCell<Regex> = OnceCell::new();
    let re = RE.get_or_init(|| {
        #[allow(clippy::expect_used)]
        Regex::new(r"^[0-9]*\.[0-9]*$").expect("Invalid regex")
    });
    re.is_match(raw)
}
