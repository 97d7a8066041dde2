//! Server function response shape
//!
//! Every server function answers with exactly one of `{"data": ...}`,
//! `{"error": "..."}` or `{"inputValidationError": {...}}`.

use crate::queries::QueryError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use validator::{Validate, ValidationErrors};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ServerResponse<T> {
    Data(T),
    Error(String),
    InputValidationError(InputValidationError),
}

/// Validation failures split into whole-form and per-field messages
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputValidationError {
    pub form_errors: Vec<String>,
    pub field_errors: BTreeMap<String, Vec<String>>,
}

fn to_camel_case(field: &str) -> String {
    let mut camel = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = !camel.is_empty();
        } else if upper {
            camel.extend(c.to_uppercase());
            upper = false;
        } else {
            camel.push(c);
        }
    }
    camel
}

impl InputValidationError {
    pub fn form(message: impl Into<String>) -> Self {
        Self {
            form_errors: vec![message.into()],
            field_errors: BTreeMap::new(),
        }
    }

    pub fn field(name: &str, message: impl Into<String>) -> Self {
        let mut error = Self::default();
        error.add_field_error(name, message);
        error
    }

    pub fn add_field_error(&mut self, name: &str, message: impl Into<String>) {
        self.field_errors
            .entry(name.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.form_errors.is_empty() && self.field_errors.is_empty()
    }

    /// Shape errors from deserializing the input; a missing field is reported on that field
    pub fn from_serde(error: &serde_json::Error) -> Self {
        let message = error.to_string();
        let missing = message
            .strip_prefix("missing field `")
            .and_then(|rest| rest.split('`').next());

        match missing {
            Some(field) => Self::field(field, "Required"),
            None => Self::form(message),
        }
    }
}

impl From<ValidationErrors> for InputValidationError {
    fn from(errors: ValidationErrors) -> Self {
        let mut converted = Self::default();
        for (field, field_errors) in errors.field_errors() {
            let field = field.to_string();
            for error in field_errors.iter() {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value ({})", error.code));

                if field == "__all__" {
                    converted.form_errors.push(message);
                } else {
                    converted.add_field_error(&to_camel_case(&field), message);
                }
            }
        }
        converted.form_errors.sort();
        converted
    }
}

impl fmt::Display for InputValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = self.form_errors.clone();
        for (field, messages) in &self.field_errors {
            parts.push(format!("{}: {}", field, messages.join(", ")));
        }
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for InputValidationError {}

/// Deserialize and validate a server function input
pub fn parse_input<I: DeserializeOwned + Validate>(input: Value) -> Result<I, InputValidationError> {
    let parsed: I =
        serde_json::from_value(input).map_err(|e| InputValidationError::from_serde(&e))?;
    parsed.validate()?;
    Ok(parsed)
}

impl<T> ServerResponse<T> {
    pub fn from_result<E: fmt::Display>(result: Result<T, E>) -> Self {
        match result {
            Ok(data) => ServerResponse::Data(data),
            Err(error) => ServerResponse::Error(error.to_string()),
        }
    }

    pub fn is_data(&self) -> bool {
        matches!(self, ServerResponse::Data(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ServerResponse<U> {
        match self {
            ServerResponse::Data(data) => ServerResponse::Data(f(data)),
            ServerResponse::Error(message) => ServerResponse::Error(message),
            ServerResponse::InputValidationError(errors) => {
                ServerResponse::InputValidationError(errors)
            }
        }
    }

    /// Payload, or the error the response carries
    pub fn into_result(self) -> Result<T, QueryError> {
        match self {
            ServerResponse::Data(data) => Ok(data),
            ServerResponse::Error(message) => Err(QueryError::Server(message)),
            ServerResponse::InputValidationError(errors) => Err(QueryError::Validation(errors)),
        }
    }
}

impl<T: Serialize> ServerResponse<T> {
    pub fn into_json(self) -> ServerResponse<Value> {
        match self {
            ServerResponse::Data(data) => match serde_json::to_value(data) {
                Ok(value) => ServerResponse::Data(value),
                Err(e) => ServerResponse::Error(e.to_string()),
            },
            ServerResponse::Error(message) => ServerResponse::Error(message),
            ServerResponse::InputValidationError(errors) => {
                ServerResponse::InputValidationError(errors)
            }
        }
    }
}

impl<T> From<InputValidationError> for ServerResponse<T> {
    fn from(errors: InputValidationError) -> Self {
        ServerResponse::InputValidationError(errors)
    }
}
