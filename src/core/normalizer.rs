use crate::models::MeasurementSet;
use serde_json::{Map, Value};
use thiserror::Error;

/// Wire names of the eight required clinical measurements, in reporting order.
const REQUIRED_FIELDS: [&str; 8] = [
    "Pregnancies",
    "Glucose",
    "BloodPressure",
    "SkinThickness",
    "Insulin",
    "BMI",
    "DiabetesPedigreeFunction",
    "Age",
];

const NAME_FIELD: &str = "name";

/// Why a single input field was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldReason {
    Missing,
    NotNumeric,
    Negative,
}

impl std::fmt::Display for FieldReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldReason::Missing => write!(f, "missing"),
            FieldReason::NotNumeric => write!(f, "not numeric"),
            FieldReason::Negative => write!(f, "negative"),
        }
    }
}

/// One rejected field with its reason
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub reason: FieldReason,
}

/// Input rejection naming every bad field, not just the first
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid measurement input: {}", self.summary())]
pub struct ValidationError {
    pub fields: Vec<FieldError>,
}

impl ValidationError {
    pub fn summary(&self) -> String {
        self.fields
            .iter()
            .map(|e| format!("{} ({})", e.field, e.reason))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Validate and coerce a raw field map into a well-typed MeasurementSet
///
/// All required fields are checked before returning, so the error names every
/// missing or non-numeric field at once. The subject name is the one
/// deliberately permissive field: absent or non-string values fall back to
/// "Unknown". Numeric values may arrive as JSON numbers or numeric strings;
/// an uncoercible value is reported, never defaulted to zero.
pub fn normalize(raw: &Map<String, Value>) -> Result<MeasurementSet, ValidationError> {
    let mut errors = Vec::new();
    let mut values = [0.0f64; 8];

    for (slot, field) in REQUIRED_FIELDS.iter().enumerate() {
        match lookup(raw, field) {
            None => errors.push(FieldError {
                field: field.to_string(),
                reason: FieldReason::Missing,
            }),
            Some(value) => match coerce_numeric(value) {
                None => errors.push(FieldError {
                    field: field.to_string(),
                    reason: FieldReason::NotNumeric,
                }),
                Some(n) if n < 0.0 => errors.push(FieldError {
                    field: field.to_string(),
                    reason: FieldReason::Negative,
                }),
                Some(n) => values[slot] = n,
            },
        }
    }

    if !errors.is_empty() {
        return Err(ValidationError { fields: errors });
    }

    let subject_name = lookup(raw, NAME_FIELD)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .unwrap_or("Unknown")
        .to_string();

    Ok(MeasurementSet {
        subject_name,
        pregnancies: values[0].trunc() as u32,
        glucose: values[1],
        blood_pressure: values[2],
        skin_thickness: values[3],
        insulin: values[4],
        bmi: values[5],
        diabetes_pedigree: values[6],
        age: values[7].trunc() as u32,
    })
}

/// Case-insensitive field lookup so callers may send e.g. "glucose" for
/// "Glucose". Exact matches win.
fn lookup<'a>(raw: &'a Map<String, Value>, field: &str) -> Option<&'a Value> {
    raw.get(field)
        .or_else(|| raw.iter().find(|(k, _)| k.eq_ignore_ascii_case(field)).map(|(_, v)| v))
}

/// Coerce a JSON value to f64: numbers directly, strings by parsing.
/// Anything else (bool, null, array, object) is not numeric.
fn coerce_numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite()),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_input() -> Map<String, Value> {
        json!({
            "name": "Jane",
            "Pregnancies": 2,
            "Glucose": 120.5,
            "BloodPressure": "72",
            "SkinThickness": 20,
            "Insulin": 85,
            "BMI": 28.1,
            "DiabetesPedigreeFunction": 0.52,
            "Age": 33
        })
        .as_object()
        .unwrap()
        .clone()
    }

    #[test]
    fn test_normalize_full_input() {
        let set = normalize(&full_input()).unwrap();
        assert_eq!(set.subject_name, "Jane");
        assert_eq!(set.pregnancies, 2);
        assert_eq!(set.glucose, 120.5);
        // numeric string coerced
        assert_eq!(set.blood_pressure, 72.0);
        assert_eq!(set.age, 33);
    }

    #[test]
    fn test_missing_name_defaults_to_unknown() {
        let mut raw = full_input();
        raw.remove("name");
        let set = normalize(&raw).unwrap();
        assert_eq!(set.subject_name, "Unknown");
    }

    #[test]
    fn test_case_insensitive_lookup() {
        let mut raw = full_input();
        let glucose = raw.remove("Glucose").unwrap();
        raw.insert("glucose".to_string(), glucose);
        let set = normalize(&raw).unwrap();
        assert_eq!(set.glucose, 120.5);
    }

    #[test]
    fn test_reports_every_bad_field() {
        let mut raw = full_input();
        raw.remove("Glucose");
        raw.insert("BMI".to_string(), json!("not-a-number"));
        raw.insert("Insulin".to_string(), json!(-4));

        let err = normalize(&raw).unwrap_err();
        assert_eq!(err.fields.len(), 3);
        assert!(err.fields.contains(&FieldError {
            field: "Glucose".to_string(),
            reason: FieldReason::Missing,
        }));
        assert!(err.fields.contains(&FieldError {
            field: "BMI".to_string(),
            reason: FieldReason::NotNumeric,
        }));
        assert!(err.fields.contains(&FieldError {
            field: "Insulin".to_string(),
            reason: FieldReason::Negative,
        }));
    }

    #[test]
    fn test_uncoercible_is_error_not_zero() {
        let mut raw = full_input();
        raw.insert("Age".to_string(), json!(null));
        assert!(normalize(&raw).is_err());
    }

    #[test]
    fn test_integer_fields_truncate() {
        let mut raw = full_input();
        raw.insert("Pregnancies".to_string(), json!(2.9));
        let set = normalize(&raw).unwrap();
        assert_eq!(set.pregnancies, 2);
    }
}
