//! Lenient decoding of the JSON body: numbers may arrive as JSON numbers or strings.

use super::MeasurementRecord;
use crate::error::DiagnosisError;
use serde::Deserialize;
use serde_json::Value;

/// Untyped request body. Every field is optional here so that a missing field
/// surfaces as `InvalidInput` naming it rather than a generic serde error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawMeasurement {
    pub edad: Option<Value>,
    pub genero: Option<Value>,
    pub ps: Option<Value>,
    pub pd: Option<Value>,
    pub colesterol: Option<Value>,
    pub glucosa: Option<Value>,
    pub fuma: Option<Value>,
    pub alcohol: Option<Value>,
    pub actividad: Option<Value>,
    pub peso: Option<Value>,
    pub estatura: Option<Value>,
}

fn required<'a>(field: &str, value: &'a Option<Value>) -> Result<&'a Value, DiagnosisError> {
    match value {
        None | Some(Value::Null) => Err(DiagnosisError::invalid(format!("missing field '{}'", field))),
        Some(v) => Ok(v),
    }
}

/// Integer field: JSON integer, JSON float (truncated toward zero) or integer string.
fn int_field(field: &str, value: &Option<Value>) -> Result<i64, DiagnosisError> {
    let bad = || DiagnosisError::invalid(format!("field '{}' is not an integer", field));
    match required(field, value)? {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(i)
            } else {
                let f = n.as_f64().ok_or_else(bad)?;
                if !f.is_finite() || f.abs() >= i64::MAX as f64 {
                    return Err(bad());
                }
                Ok(f.trunc() as i64)
            }
        }
        Value::String(s) => s.trim().parse::<i64>().map_err(|_| bad()),
        _ => Err(bad()),
    }
}

fn float_field(field: &str, value: &Option<Value>) -> Result<f64, DiagnosisError> {
    let bad = || DiagnosisError::invalid(format!("field '{}' is not a number", field));
    let f = match required(field, value)? {
        Value::Number(n) => n.as_f64().ok_or_else(bad)?,
        Value::String(s) => s.trim().parse::<f64>().map_err(|_| bad())?,
        _ => return Err(bad()),
    };
    if f.is_finite() {
        Ok(f)
    } else {
        Err(bad())
    }
}

fn text_field(field: &str, value: &Option<Value>) -> Result<String, DiagnosisError> {
    match required(field, value)? {
        Value::String(s) => Ok(s.clone()),
        _ => Err(DiagnosisError::invalid(format!("field '{}' must be text", field))),
    }
}

/// Yes/no token; a JSON boolean maps onto the affirmative/negative token.
fn token_field(field: &str, value: &Option<Value>) -> Result<String, DiagnosisError> {
    match required(field, value)? {
        Value::String(s) => Ok(s.clone()),
        Value::Bool(true) => Ok("yes".to_string()),
        Value::Bool(false) => Ok("no".to_string()),
        _ => Err(DiagnosisError::invalid(format!("field '{}' must be a yes/no token", field))),
    }
}

impl TryFrom<RawMeasurement> for MeasurementRecord {
    type Error = DiagnosisError;

    fn try_from(raw: RawMeasurement) -> Result<Self, Self::Error> {
        Ok(MeasurementRecord {
            age: int_field("edad", &raw.edad)?,
            sex: text_field("genero", &raw.genero)?,
            systolic: int_field("ps", &raw.ps)?,
            diastolic: int_field("pd", &raw.pd)?,
            cholesterol: float_field("colesterol", &raw.colesterol)?,
            glucose: float_field("glucosa", &raw.glucosa)?,
            smoker: token_field("fuma", &raw.fuma)?,
            alcohol: token_field("alcohol", &raw.alcohol)?,
            activity: text_field("actividad", &raw.actividad)?,
            weight: float_field("peso", &raw.peso)?,
            height: int_field("estatura", &raw.estatura)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(v: Value) -> RawMeasurement {
        serde_json::from_value(v).unwrap()
    }

    fn full() -> Value {
        json!({
            "edad": 30, "genero": "femenino", "ps": 110, "pd": 70,
            "colesterol": 180, "glucosa": 90, "fuma": "n", "alcohol": "n",
            "actividad": "alta", "peso": 60, "estatura": 165
        })
    }

    #[test]
    fn numeric_strings_are_accepted() {
        let mut v = full();
        v["edad"] = json!(" 52 ");
        v["colesterol"] = json!("210.5");
        let rec = MeasurementRecord::try_from(raw(v)).unwrap();
        assert_eq!(rec.age, 52);
        assert_eq!(rec.cholesterol, 210.5);
    }

    #[test]
    fn float_for_integer_field_truncates() {
        let mut v = full();
        v["estatura"] = json!(170.9);
        let rec = MeasurementRecord::try_from(raw(v)).unwrap();
        assert_eq!(rec.height, 170);
    }

    #[test]
    fn missing_field_is_named() {
        let mut v = full();
        v.as_object_mut().unwrap().remove("glucosa");
        let err = MeasurementRecord::try_from(raw(v)).unwrap_err();
        assert!(matches!(err, DiagnosisError::InvalidInput(ref m) if m.contains("glucosa")));
    }

    #[test]
    fn null_counts_as_missing() {
        let mut v = full();
        v["genero"] = Value::Null;
        assert!(MeasurementRecord::try_from(raw(v)).is_err());
    }

    #[test]
    fn non_numeric_rejected() {
        let mut v = full();
        v["ps"] = json!("alta");
        assert!(MeasurementRecord::try_from(raw(v.clone())).is_err());
        v["ps"] = json!("120.5");
        assert!(MeasurementRecord::try_from(raw(v)).is_err());
    }

    #[test]
    fn boolean_tokens() {
        let mut v = full();
        v["fuma"] = json!(true);
        v["alcohol"] = json!(false);
        let rec = MeasurementRecord::try_from(raw(v)).unwrap();
        assert_eq!(rec.smoker, "yes");
        assert_eq!(rec.alcohol, "no");
    }
}
