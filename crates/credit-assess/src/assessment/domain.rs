use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::numeric::{format_grouped, to_number_or_zero};

/// Scalar captured from user entry. Free-text forms deliver numbers, strings, or nothing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
    Empty,
}

impl<'de> Deserialize<'de> for RawValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        // Booleans carry no arithmetic meaning and read as empty.
        match serde_json::Value::deserialize(deserializer)? {
            serde_json::Value::Number(number) => Ok(number
                .as_f64()
                .map(RawValue::Number)
                .unwrap_or(RawValue::Empty)),
            serde_json::Value::String(text) => Ok(RawValue::Text(text)),
            serde_json::Value::Null | serde_json::Value::Bool(_) => Ok(RawValue::Empty),
            other => Err(serde::de::Error::custom(format!(
                "unsupported raw input value: {other}"
            ))),
        }
    }
}

impl RawValue {
    pub fn is_empty(&self) -> bool {
        match self {
            RawValue::Empty => true,
            RawValue::Text(text) => text.trim().is_empty(),
            RawValue::Number(_) => false,
        }
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Number(value)
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        RawValue::Text(value)
    }
}

/// Flat snapshot of user-entered fields. Owned by the caller, never mutated by the engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawInputs {
    fields: BTreeMap<String, RawValue>,
}

impl RawInputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<RawValue>) {
        self.fields.insert(key.into(), value.into());
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<RawValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&RawValue> {
        self.fields.get(key)
    }

    /// Coerced numeric view of a field; absent, empty, or non-numeric values read as zero.
    pub fn number(&self, key: &str) -> f64 {
        self.fields.get(key).map(to_number_or_zero).unwrap_or(0.0)
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        match self.fields.get(key) {
            Some(RawValue::Text(text)) if !text.trim().is_empty() => Some(text.trim()),
            _ => None,
        }
    }

    pub fn is_present(&self, key: &str) -> bool {
        self.fields
            .get(key)
            .map(|value| !value.is_empty())
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &RawValue)> {
        self.fields.iter()
    }
}

impl<K, V> FromIterator<(K, V)> for RawInputs
where
    K: Into<String>,
    V: Into<RawValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let fields = iter
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();
        Self { fields }
    }
}

/// Output of a single calculator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DerivedValue {
    Number(f64),
    Text(String),
    Series(Vec<f64>),
}

impl DerivedValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            DerivedValue::Number(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            DerivedValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_series(&self) -> Option<&[f64]> {
        match self {
            DerivedValue::Series(values) => Some(values),
            _ => None,
        }
    }
}

impl From<f64> for DerivedValue {
    fn from(value: f64) -> Self {
        DerivedValue::Number(value)
    }
}

impl From<String> for DerivedValue {
    fn from(value: String) -> Self {
        DerivedValue::Text(value)
    }
}

impl From<Vec<f64>> for DerivedValue {
    fn from(values: Vec<f64>) -> Self {
        DerivedValue::Series(values)
    }
}

/// Display hint declared per calculator. Never consulted during evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    Currency,
    Percentage,
    Ratio,
    Score,
    Text,
    Raw,
}

impl OutputFormat {
    pub const fn label(self) -> &'static str {
        match self {
            OutputFormat::Currency => "currency",
            OutputFormat::Percentage => "percentage",
            OutputFormat::Ratio => "ratio",
            OutputFormat::Score => "score",
            OutputFormat::Text => "text",
            OutputFormat::Raw => "raw",
        }
    }

    pub fn render(self, value: &DerivedValue) -> String {
        match (self, value) {
            (_, DerivedValue::Text(text)) => text.clone(),
            (_, DerivedValue::Series(values)) => values
                .iter()
                .map(|value| trim_decimals(*value))
                .collect::<Vec<_>>()
                .join(", "),
            (OutputFormat::Currency, DerivedValue::Number(value)) => format_grouped(*value, 2),
            (OutputFormat::Percentage, DerivedValue::Number(value)) => {
                format!("{}%", unsigned_zero(format!("{value:.2}")))
            }
            (OutputFormat::Ratio, DerivedValue::Number(value)) => {
                unsigned_zero(format!("{value:.2}"))
            }
            (OutputFormat::Score, DerivedValue::Number(value)) => {
                unsigned_zero(format!("{value:.1}"))
            }
            (OutputFormat::Text | OutputFormat::Raw, DerivedValue::Number(value)) => {
                trim_decimals(*value)
            }
        }
    }
}

fn trim_decimals(value: f64) -> String {
    let rendered = format!("{value:.4}");
    unsigned_zero(rendered.trim_end_matches('0').trim_end_matches('.').to_string())
}

/// Drops the sign from a rendering that rounded to zero, e.g. `-0.00`.
fn unsigned_zero(rendered: String) -> String {
    if let Some(magnitude) = rendered.strip_prefix('-') {
        if magnitude.chars().all(|c| c == '0' || c == '.') {
            return magnitude.to_string();
        }
    }
    rendered
}

/// Values produced by one evaluation pass, keyed by calculator name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DerivedSnapshot {
    values: BTreeMap<String, DerivedValue>,
}

impl DerivedSnapshot {
    pub(crate) fn from_values(values: BTreeMap<String, DerivedValue>) -> Self {
        Self { values }
    }

    pub fn get(&self, name: &str) -> Option<&DerivedValue> {
        self.values.get(name)
    }

    pub fn number(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(DerivedValue::as_number)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(DerivedValue::as_text)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &DerivedValue)> {
        self.values.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_inputs_deserialize_mixed_scalars() {
        let inputs: RawInputs = serde_json::from_str(
            r#"{"loan_amount": 100000, "interest_rate": "12", "tenure_months": null, "notes": ""}"#,
        )
        .expect("raw inputs parse");

        assert_eq!(inputs.number("loan_amount"), 100000.0);
        assert_eq!(inputs.number("interest_rate"), 12.0);
        assert_eq!(inputs.number("tenure_months"), 0.0);
        assert!(!inputs.is_present("tenure_months"));
        assert!(!inputs.is_present("notes"));
        assert_eq!(inputs.number("missing"), 0.0);
    }

    #[test]
    fn formats_render_display_strings() {
        assert_eq!(
            OutputFormat::Currency.render(&DerivedValue::Number(1234567.891)),
            "1,234,567.89"
        );
        assert_eq!(
            OutputFormat::Percentage.render(&DerivedValue::Number(70.0)),
            "70.00%"
        );
        assert_eq!(OutputFormat::Ratio.render(&DerivedValue::Number(1.5)), "1.50");
        assert_eq!(OutputFormat::Score.render(&DerivedValue::Number(78.0)), "78.0");
        assert_eq!(
            OutputFormat::Raw.render(&DerivedValue::Series(vec![1.5, 2.0])),
            "1.5, 2"
        );
    }

    #[test]
    fn values_rounding_to_zero_render_without_sign() {
        let tiny_negative = DerivedValue::Number(-0.001);

        assert_eq!(OutputFormat::Percentage.render(&tiny_negative), "0.00%");
        assert_eq!(OutputFormat::Ratio.render(&tiny_negative), "0.00");
        assert_eq!(OutputFormat::Score.render(&tiny_negative), "0.0");
        assert_eq!(OutputFormat::Text.render(&DerivedValue::Number(-0.00001)), "0");
        assert_eq!(OutputFormat::Ratio.render(&DerivedValue::Number(-0.5)), "-0.50");
    }
}
