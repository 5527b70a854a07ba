use super::FeatureVector;
use crate::error::PredictError;
use serde_json::{Map, Value};

/// Yes/no columns, in training column order.
pub const BINARY_COLUMNS: [&str; 6] = [
    "mainroad",
    "guestroom",
    "basement",
    "hotwaterheating",
    "airconditioning",
    "prefarea",
];

pub const CATEGORICAL_COLUMN: &str = "furnishingstatus";

/// Furnishing categories the front-end offers. Other values are accepted and
/// produce an indicator column the model does not know, which alignment drops.
pub const FURNISHING_STATUSES: [&str; 3] = ["furnished", "semi-furnished", "unfurnished"];

/// Maps exactly `"yes"` to 1 and everything else to 0.
///
/// This is lossy on purpose: typos and unexpected values default to 0
/// instead of rejecting the request.
pub fn binary_flag(value: &str) -> f64 {
    if value == "yes" { 1.0 } else { 0.0 }
}

/// A feature request after every field has been coerced to its declared type.
#[derive(Debug, Clone, PartialEq)]
pub struct HouseFeatures {
    pub area: f64,
    pub bedrooms: i64,
    pub bathrooms: i64,
    pub stories: i64,
    pub mainroad: String,
    pub guestroom: String,
    pub basement: String,
    pub hotwaterheating: String,
    pub airconditioning: String,
    pub parking: i64,
    pub prefarea: String,
    pub furnishingstatus: String,
}

impl HouseFeatures {
    pub fn from_raw(raw: &Map<String, Value>) -> Result<Self, PredictError> {
        Ok(Self {
            area: coerce_float(raw, "area")?,
            bedrooms: coerce_int(raw, "bedrooms")?,
            bathrooms: coerce_int(raw, "bathrooms")?,
            stories: coerce_int(raw, "stories")?,
            mainroad: coerce_text(raw, "mainroad")?,
            guestroom: coerce_text(raw, "guestroom")?,
            basement: coerce_text(raw, "basement")?,
            hotwaterheating: coerce_text(raw, "hotwaterheating")?,
            airconditioning: coerce_text(raw, "airconditioning")?,
            parking: coerce_int(raw, "parking")?,
            prefarea: coerce_text(raw, "prefarea")?,
            furnishingstatus: coerce_text(raw, "furnishingstatus")?,
        })
    }

    /// Builds the request-derived row: numeric columns, yes/no columns mapped
    /// to 0/1, then one indicator per observed furnishing category.
    ///
    /// A single live row never drops its category; drop-first only applies
    /// when deriving the training schema.
    pub fn expand(&self) -> FeatureVector {
        let mut row = FeatureVector::new();
        row.push("area", self.area);
        row.push("bedrooms", self.bedrooms as f64);
        row.push("bathrooms", self.bathrooms as f64);
        row.push("stories", self.stories as f64);
        row.push("mainroad", binary_flag(&self.mainroad));
        row.push("guestroom", binary_flag(&self.guestroom));
        row.push("basement", binary_flag(&self.basement));
        row.push("hotwaterheating", binary_flag(&self.hotwaterheating));
        row.push("airconditioning", binary_flag(&self.airconditioning));
        row.push("parking", self.parking as f64);
        row.push("prefarea", binary_flag(&self.prefarea));
        row.push(
            format!("{}_{}", CATEGORICAL_COLUMN, self.furnishingstatus),
            1.0,
        );
        row
    }
}

fn field<'a>(raw: &'a Map<String, Value>, name: &str) -> Result<&'a Value, PredictError> {
    raw.get(name)
        .ok_or_else(|| PredictError::malformed(format!("missing field '{name}'")))
}

fn coerce_float(raw: &Map<String, Value>, name: &str) -> Result<f64, PredictError> {
    let value = field(raw, name)?;
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    };

    match parsed {
        Some(v) if v.is_finite() => Ok(v),
        _ => Err(PredictError::malformed(format!(
            "field '{name}' is not a number: {value}"
        ))),
    }
}

fn coerce_int(raw: &Map<String, Value>, name: &str) -> Result<i64, PredictError> {
    let value = field(raw, name)?;
    let parsed = match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            // Fractional numbers truncate toward zero.
            n.as_f64()
                .filter(|f| f.is_finite() && f.abs() < i64::MAX as f64)
                .map(|f| f.trunc() as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        Value::Bool(b) => Some(i64::from(*b)),
        _ => None,
    };

    parsed.ok_or_else(|| {
        PredictError::malformed(format!("field '{name}' is not an integer: {value}"))
    })
}

/// Renders any JSON value to text. Only a missing key is an error; values
/// that are not strings can never equal `"yes"` or a known category.
fn coerce_text(raw: &Map<String, Value>, name: &str) -> Result<String, PredictError> {
    let text = match field(raw, name)? {
        Value::String(s) => s.clone(),
        Value::Null => "None".to_string(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        other => other.to_string(),
    };
    Ok(text)
}
