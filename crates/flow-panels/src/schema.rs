use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldType {
    Text,
    Number,
    Boolean,
    Select { options: Vec<String> },
    Code { language: String },
    Json,
}

/// Rule checked against a field value on every change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Validator {
    /// Not null and not a blank string.
    Required,
    /// A JSON object, either as a value or as text that parses to one.
    JsonObject,
    /// Text of at least this many characters.
    MinLength(usize),
    /// A number greater than zero.
    Positive,
}

impl Validator {
    /// The error message for `value`, or `None` when it passes.
    pub fn check(&self, value: &Value) -> Option<String> {
        match self {
            Validator::Required => {
                let missing = match value {
                    Value::Null => true,
                    Value::String(s) => s.trim().is_empty(),
                    _ => false,
                };
                missing.then(|| "Required".to_string())
            }
            Validator::JsonObject => match value {
                Value::Object(_) | Value::Null => None,
                Value::String(s) if s.trim().is_empty() => None,
                Value::String(s) => match serde_json::from_str::<Value>(s) {
                    Ok(Value::Object(_)) => None,
                    Ok(_) => Some("Must be a JSON object".to_string()),
                    Err(e) => Some(format!("Invalid JSON: {e}")),
                },
                _ => Some("Must be a JSON object".to_string()),
            },
            Validator::MinLength(min) => match value {
                Value::String(s) if s.chars().count() < *min => {
                    Some(format!("Must be at least {min} characters"))
                }
                _ => None,
            },
            Validator::Positive => match value {
                Value::Null => None,
                Value::Number(n) if n.as_f64().is_some_and(|v| v > 0.0) => None,
                Value::String(s) if s.trim().parse::<f64>().is_ok_and(|v| v > 0.0) => None,
                _ => Some("Must be greater than zero".to_string()),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualField {
    pub id: String,
    pub label: String,
    pub field_type: FieldType,
    pub validators: Vec<Validator>,
    pub default_value: Option<Value>,
}

impl VisualField {
    pub fn new(id: &str, field_type: FieldType) -> Self {
        Self {
            id: id.to_string(),
            label: capitalize(&id.replace('_', " ")),
            field_type,
            validators: Vec::new(),
            default_value: None,
        }
    }

    pub fn text(id: &str) -> Self {
        Self::new(id, FieldType::Text)
    }

    pub fn number(id: &str) -> Self {
        Self::new(id, FieldType::Number)
    }

    pub fn python(id: &str) -> Self {
        Self::new(
            id,
            FieldType::Code {
                language: "python".to_string(),
            },
        )
    }

    pub fn required(self) -> Self {
        self.validate(Validator::Required)
    }

    pub fn validate(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    pub fn with_default(mut self, value: Value) -> Self {
        self.default_value = Some(value);
        self
    }

    pub fn is_required(&self) -> bool {
        self.validators.contains(&Validator::Required)
    }
}

fn capitalize(s: &str) -> String {
    let mut c = s.chars();
    match c.next() {
        None => String::new(),
        Some(f) => f.to_uppercase().collect::<String>() + c.as_str(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_label_from_id() {
        let field = VisualField::text("output_variable_path").required();
        assert_eq!(field.label, "Output variable path");
        assert!(field.is_required());
    }

    #[test]
    fn test_required_rejects_blank_text() {
        assert!(Validator::Required.check(&json!("  ")).is_some());
        assert!(Validator::Required.check(&Value::Null).is_some());
        assert!(Validator::Required.check(&json!("x")).is_none());
        assert!(Validator::Required.check(&json!(0)).is_none());
    }

    #[test]
    fn test_json_object_accepts_objects_only() {
        assert!(Validator::JsonObject.check(&json!({"a": 1})).is_none());
        assert!(Validator::JsonObject.check(&json!("{\"a\": 1}")).is_none());
        assert!(Validator::JsonObject.check(&json!("[1, 2]")).is_some());
        assert!(Validator::JsonObject.check(&json!("{oops")).is_some());
    }

    #[test]
    fn test_positive_and_min_length() {
        assert!(Validator::Positive.check(&json!(3)).is_none());
        assert!(Validator::Positive.check(&json!(0)).is_some());
        assert!(Validator::Positive.check(&json!("2")).is_none());
        assert!(Validator::MinLength(3).check(&json!("ab")).is_some());
        assert!(Validator::MinLength(3).check(&json!("abc")).is_none());
    }
}
