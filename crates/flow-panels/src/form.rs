use crate::schema::VisualField;
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// Errors raised while reading typed values back out of a form.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormError {
    #[error("Unknown form field '{0}'")]
    UnknownField(String),

    #[error("Field '{field}' should hold {expected}")]
    TypeMismatch { field: String, expected: &'static str },

    #[error("Panel for '{expected}' cannot edit a '{found}' node")]
    KindMismatch {
        expected: &'static str,
        found: &'static str,
    },
}

/// The state of a panel form: fields, values and per-field errors.
#[derive(Debug, Default, Clone)]
pub struct FormState {
    /// The fields to display in the UI.
    pub fields: Vec<VisualField>,
    /// The current values of each field.
    pub values: HashMap<String, Value>,
    /// Validation errors for each field.
    pub errors: HashMap<String, String>,
}

impl FormState {
    /// Builds a form with every field at its default value, then validates.
    pub fn new(fields: Vec<VisualField>) -> Self {
        let values = fields
            .iter()
            .map(|f| (f.id.clone(), f.default_value.clone().unwrap_or(Value::Null)))
            .collect();
        let mut form = Self {
            fields,
            values,
            errors: HashMap::new(),
        };
        form.validate_all();
        form
    }

    /// Updates the value of a field and performs validation.
    pub fn update_value(&mut self, field_id: &str, value: impl Into<Value>) {
        self.values.insert(field_id.to_string(), value.into());
        self.validate_field(field_id);
    }

    /// Validates a specific field; the first failing validator wins.
    pub fn validate_field(&mut self, field_id: &str) {
        let Some(field) = self.fields.iter().find(|f| f.id == field_id) else {
            return;
        };
        let value = self.values.get(field_id).unwrap_or(&Value::Null);
        match field.validators.iter().find_map(|v| v.check(value)) {
            Some(message) => {
                self.errors.insert(field_id.to_string(), message);
            }
            None => {
                self.errors.remove(field_id);
            }
        }
    }

    pub fn validate_all(&mut self) {
        let ids: Vec<String> = self.fields.iter().map(|f| f.id.clone()).collect();
        for id in ids {
            self.validate_field(&id);
        }
    }

    /// Returns true if all fields are valid.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn error(&self, field_id: &str) -> Option<&str> {
        self.errors.get(field_id).map(String::as_str)
    }

    pub fn value(&self, field_id: &str) -> Result<&Value, FormError> {
        self.values
            .get(field_id)
            .ok_or_else(|| FormError::UnknownField(field_id.to_string()))
    }

    /// Text value; null reads as empty.
    pub fn string(&self, field_id: &str) -> Result<String, FormError> {
        match self.value(field_id)? {
            Value::Null => Ok(String::new()),
            Value::String(s) => Ok(s.clone()),
            Value::Number(n) => Ok(n.to_string()),
            _ => Err(mismatch(field_id, "text")),
        }
    }

    /// Text value with blank mapped to `None`.
    pub fn optional_string(&self, field_id: &str) -> Result<Option<String>, FormError> {
        let text = self.string(field_id)?;
        Ok((!text.trim().is_empty()).then_some(text))
    }

    pub fn optional_u64(&self, field_id: &str) -> Result<Option<u64>, FormError> {
        match self.value(field_id)? {
            Value::Null => Ok(None),
            Value::Number(n) => n.as_u64().map(Some).ok_or_else(|| mismatch(field_id, "a whole number")),
            Value::String(s) if s.trim().is_empty() => Ok(None),
            Value::String(s) => s
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| mismatch(field_id, "a whole number")),
            _ => Err(mismatch(field_id, "a whole number")),
        }
    }

    pub fn u64(&self, field_id: &str) -> Result<u64, FormError> {
        self.optional_u64(field_id)?
            .ok_or_else(|| mismatch(field_id, "a whole number"))
    }

    /// Newline- or comma-separated text as a trimmed list without blanks.
    pub fn list(&self, field_id: &str) -> Result<Vec<String>, FormError> {
        match self.value(field_id)? {
            Value::Array(items) => Ok(items
                .iter()
                .filter_map(|v| v.as_str())
                .map(str::to_string)
                .collect()),
            _ => Ok(self
                .string(field_id)?
                .split(['\n', ','])
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()),
        }
    }

    /// A JSON object given either as a value or as its text form.
    pub fn json_object(&self, field_id: &str) -> Result<Value, FormError> {
        match self.value(field_id)? {
            Value::Null => Ok(Value::Object(Default::default())),
            Value::Object(_) => self.value(field_id).cloned(),
            Value::String(s) if s.trim().is_empty() => Ok(Value::Object(Default::default())),
            Value::String(s) => match serde_json::from_str::<Value>(s) {
                Ok(value @ Value::Object(_)) => Ok(value),
                _ => Err(mismatch(field_id, "a JSON object")),
            },
            _ => Err(mismatch(field_id, "a JSON object")),
        }
    }
}

fn mismatch(field: &str, expected: &'static str) -> FormError {
    FormError::TypeMismatch {
        field: field.to_string(),
        expected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Validator;
    use serde_json::json;

    fn form() -> FormState {
        FormState::new(vec![
            VisualField::text("name").required(),
            VisualField::number("pages").validate(Validator::Positive),
        ])
    }

    #[test]
    fn test_new_form_validates_defaults() {
        let form = form();
        assert!(!form.is_valid());
        assert_eq!(form.error("name"), Some("Required"));
        assert_eq!(form.error("pages"), None);
    }

    #[test]
    fn test_update_clears_and_sets_errors() {
        let mut form = form();
        form.update_value("name", "scraper");
        assert!(form.is_valid());

        form.update_value("pages", 0);
        assert!(!form.is_valid());
        form.update_value("pages", json!(4));
        assert!(form.is_valid());
        assert_eq!(form.u64("pages").unwrap(), 4);
    }

    #[test]
    fn test_typed_reads() {
        let mut form = form();
        form.update_value("name", json!({"not": "text"}));
        assert!(matches!(form.string("name"), Err(FormError::TypeMismatch { .. })));
        assert!(matches!(form.string("missing"), Err(FormError::UnknownField(_))));

        form.update_value("name", "a, b\n c,,");
        assert_eq!(form.list("name").unwrap(), vec!["a", "b", "c"]);
    }
}
