use std::fmt;

/// Placeholder shown when a metric cannot be produced
pub const UNAVAILABLE: &str = "N/A";

/// A single metric reading
#[derive(Debug, Clone, PartialEq)]
pub enum MetricValue {
    Float(f64),
    Int(i64),
    Str(String),
}

impl MetricValue {
    pub fn unavailable() -> Self {
        MetricValue::Str(UNAVAILABLE.to_string())
    }

    /// NaN stands in for numeric metrics that cannot be read
    pub fn unavailable_number() -> Self {
        MetricValue::Float(f64::NAN)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MetricValue::Float(v) => Some(*v),
            MetricValue::Int(v) => Some(*v as f64),
            MetricValue::Str(_) => None,
        }
    }

    pub fn is_unavailable(&self) -> bool {
        match self {
            MetricValue::Float(v) => v.is_nan(),
            MetricValue::Int(_) => false,
            MetricValue::Str(s) => s == UNAVAILABLE,
        }
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Float(v) => write!(f, "{}", v),
            MetricValue::Int(v) => write!(f, "{}", v),
            MetricValue::Str(s) => f.write_str(s),
        }
    }
}

impl From<f64> for MetricValue {
    fn from(value: f64) -> Self {
        MetricValue::Float(value)
    }
}

impl From<u64> for MetricValue {
    fn from(value: u64) -> Self {
        MetricValue::Int(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<String> for MetricValue {
    fn from(value: String) -> Self {
        MetricValue::Str(value)
    }
}

impl From<&str> for MetricValue {
    fn from(value: &str) -> Self {
        MetricValue::Str(value.to_string())
    }
}
