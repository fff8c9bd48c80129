//! Loading raw inputs, selections, and scorecards from documents on disk.
//!
//! Raw inputs come either as a JSON object (`{"loan_amount": 500000, ...}`) or as a
//! two-column CSV export with `Field` and `Value` headers. Selections and custom
//! scorecards are JSON only.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use super::domain::{RawInputs, RawValue};
use super::scoring::{deserialize_selections, Scorecard, Selections};

#[derive(Debug, Error)]
pub enum InputImportError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse CSV inputs: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to parse JSON document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("duplicate field '{0}' in CSV inputs")]
    DuplicateField(String),
}

#[derive(Debug, Deserialize)]
struct InputRow {
    #[serde(rename = "Field")]
    field: String,
    #[serde(rename = "Value", default)]
    value: String,
}

/// Parse a `Field,Value` CSV export. Blank values become [`RawValue::Empty`].
pub fn inputs_from_csv<R: Read>(reader: R) -> Result<RawInputs, InputImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut inputs = RawInputs::new();

    for record in csv_reader.deserialize::<InputRow>() {
        let row = record?;
        if row.field.is_empty() {
            continue;
        }
        if inputs.get(&row.field).is_some() {
            return Err(InputImportError::DuplicateField(row.field));
        }

        let value = if row.value.is_empty() {
            RawValue::Empty
        } else {
            RawValue::Text(row.value)
        };
        inputs.insert(row.field, value);
    }

    Ok(inputs)
}

pub fn inputs_from_json<R: Read>(reader: R) -> Result<RawInputs, InputImportError> {
    Ok(serde_json::from_reader(reader)?)
}

/// Parse selections. A `null` answer is treated as unanswered.
pub fn selections_from_json<R: Read>(reader: R) -> Result<Selections, InputImportError> {
    let mut deserializer = serde_json::Deserializer::from_reader(reader);
    let selections = deserialize_selections(&mut deserializer)?;
    deserializer.end()?;
    Ok(selections)
}

pub fn scorecard_from_json<R: Read>(reader: R) -> Result<Scorecard, InputImportError> {
    Ok(serde_json::from_reader(reader)?)
}

/// Load raw inputs, choosing the parser from the file extension (`.csv`, else JSON).
pub fn load_inputs(path: &Path) -> Result<RawInputs, InputImportError> {
    let reader = open(path)?;
    let is_csv = path
        .extension()
        .and_then(|extension| extension.to_str())
        .map(|extension| extension.eq_ignore_ascii_case("csv"))
        .unwrap_or(false);

    if is_csv {
        inputs_from_csv(reader)
    } else {
        inputs_from_json(reader)
    }
}

pub fn load_selections(path: &Path) -> Result<Selections, InputImportError> {
    selections_from_json(open(path)?)
}

pub fn load_scorecard(path: &Path) -> Result<Scorecard, InputImportError> {
    scorecard_from_json(open(path)?)
}

fn open(path: &Path) -> Result<BufReader<File>, InputImportError> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| InputImportError::Io {
            path: path.display().to_string(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn csv_rows_become_raw_inputs() {
        let csv = "Field,Value\nloan_amount,\" 5,00,000 \"\ncollateral_value,\napplicant_name,Asha Traders\n";

        let inputs = inputs_from_csv(Cursor::new(csv)).expect("csv parses");

        assert_eq!(inputs.len(), 3);
        assert_eq!(inputs.number("loan_amount"), 500_000.0);
        assert!(!inputs.is_present("collateral_value"));
        assert_eq!(inputs.text("applicant_name"), Some("Asha Traders"));
    }

    #[test]
    fn csv_rejects_duplicate_fields() {
        let csv = "Field,Value\nloan_amount,100\nloan_amount,200\n";

        let error = inputs_from_csv(Cursor::new(csv)).unwrap_err();

        assert!(matches!(error, InputImportError::DuplicateField(field) if field == "loan_amount"));
    }

    #[test]
    fn json_inputs_accept_numbers_strings_and_nulls() {
        let json = r#"{"loan_amount": 250000, "interest_rate": "10.5", "tenure_months": null}"#;

        let inputs = inputs_from_json(Cursor::new(json)).expect("json parses");

        assert_eq!(inputs.number("loan_amount"), 250_000.0);
        assert_eq!(inputs.number("interest_rate"), 10.5);
        assert_eq!(inputs.number("tenure_months"), 0.0);
    }

    #[test]
    fn selections_parse_from_json() {
        let json = r#"{"industry_outlook": "Positive", "management_quality": "Strong"}"#;

        let selections = selections_from_json(Cursor::new(json)).expect("json parses");

        assert_eq!(selections.get("industry_outlook").map(String::as_str), Some("Positive"));
    }

    #[test]
    fn null_selections_are_treated_as_unanswered() {
        let json = r#"{"industry_outlook": null, "management_quality": "Strong"}"#;

        let selections = selections_from_json(Cursor::new(json)).expect("json parses");

        assert_eq!(selections.len(), 1);
        assert!(selections.get("industry_outlook").is_none());
    }

    #[test]
    fn missing_file_reports_path() {
        let error = load_inputs(Path::new("/nonexistent/inputs.json")).unwrap_err();
        assert!(error.to_string().contains("/nonexistent/inputs.json"));
    }
}
