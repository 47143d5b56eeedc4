use indexmap::IndexMap;
use serde::Deserialize;

/// One cell of a flat input row.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
    Flag(bool),
    #[default]
    Missing,
}

impl FieldValue {
    /// Numeric coercion: finite numbers pass through, text is parsed, anything else is 0.
    pub fn as_number(&self) -> f64 {
        let value = match self {
            Self::Number(value) => *value,
            Self::Text(text) => text.trim().parse::<f64>().unwrap_or(0.0),
            Self::Flag(_) | Self::Missing => 0.0,
        };

        if value.is_finite() { value } else { 0.0 }
    }

    /// Text form used for grouping keys and identifiers.
    pub fn as_key(&self) -> String {
        match self {
            Self::Number(value) if value.fract() == 0.0 && value.abs() < 1e15 => {
                format!("{}", *value as i64)
            }
            Self::Number(value) => value.to_string(),
            Self::Text(text) => text.clone(),
            Self::Flag(flag) => flag.to_string(),
            Self::Missing => String::new(),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

/// A flat input row: field name to value, in source order.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: IndexMap<String, FieldValue>,
}

impl Record {
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    /// Key text of `field`; missing fields read as the empty string.
    pub fn text(&self, field: &str) -> String {
        self.fields
            .get(field)
            .map(FieldValue::as_key)
            .unwrap_or_default()
    }

    /// Numeric value of `field`, coerced to 0 when missing or malformed.
    pub fn number(&self, field: &str) -> f64 {
        self.fields.get(field).map_or(0.0, FieldValue::as_number)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(field.into(), value.into());
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Four-digit year columns of a wide row, sorted by year.
    pub fn year_columns(&self) -> Vec<(i32, f64)> {
        let mut years = self
            .fields
            .iter()
            .filter(|(name, _)| name.len() == 4 && name.bytes().all(|byte| byte.is_ascii_digit()))
            .filter_map(|(name, value)| {
                name.parse::<i32>()
                    .ok()
                    .map(|year| (year, value.as_number()))
            })
            .collect::<Vec<_>>();
        years.sort_by_key(|(year, _)| *year);
        years
    }
}

impl<K, V> FromIterator<(K, V)> for Record
where
    K: Into<String>,
    V: Into<FieldValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        }
    }
}
