use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Map, Value};

use crate::error::ServiceError;
use crate::users::dto::{CreateUserInput, UpdateUserInput};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

enum Kind {
    Text(&'static str),
    Email(&'static str),
}

struct FieldRule {
    field: &'static str,
    required: &'static str,
    kind: Kind,
}

const NAME: FieldRule = FieldRule {
    field: "name",
    required: "El nombre es requerido",
    kind: Kind::Text("El nombre debe de ser un cadena de texto"),
};

const EMAIL: FieldRule = FieldRule {
    field: "email",
    required: "El email es requerido",
    kind: Kind::Email("email must be an email"),
};

const PASSWORD: FieldRule = FieldRule {
    field: "password",
    required: "La contraseña es requerido",
    kind: Kind::Text("La contraseña debe ser una cadena de texto"),
};

impl FieldRule {
    /// Returns the accepted text, or the `"<field> - <messages>"` entry.
    fn check(&self, value: Option<&Value>) -> Result<String, String> {
        let mut messages = Vec::new();

        let empty = match value {
            None | Some(Value::Null) => true,
            Some(Value::String(s)) => s.is_empty(),
            _ => false,
        };
        if empty {
            messages.push(self.required);
        }

        let text = value.and_then(Value::as_str);
        match (&self.kind, text) {
            (Kind::Text(msg), None) | (Kind::Email(msg), None) => messages.push(*msg),
            (Kind::Email(msg), Some(s)) if !is_valid_email(s) => messages.push(*msg),
            _ => {}
        }

        match text {
            Some(s) if messages.is_empty() => Ok(s.to_string()),
            _ => Err(format!("{} - {}", self.field, messages.join(", "))),
        }
    }
}

fn as_object(payload: &Value) -> Map<String, Value> {
    match payload {
        Value::Object(map) => map.clone(),
        _ => Map::new(),
    }
}

/// Validates a create_user payload; any failing field rejects the whole input.
pub fn validate_create(payload: &Value) -> Result<CreateUserInput, ServiceError> {
    let fields = as_object(payload);
    let name = NAME.check(fields.get(NAME.field));
    let email = EMAIL.check(fields.get(EMAIL.field));
    let password = PASSWORD.check(fields.get(PASSWORD.field));

    match (name, email, password) {
        (Ok(name), Ok(email), Ok(password)) => Ok(CreateUserInput {
            name,
            email,
            password,
        }),
        (name, email, password) => Err(ServiceError::Validation(
            [name.err(), email.err(), password.err()]
                .into_iter()
                .flatten()
                .collect(),
        )),
    }
}

/// Validates an update_user patch. Only keys that are present are checked;
/// unknown keys are dropped.
pub fn validate_patch(payload: &Value) -> Result<UpdateUserInput, ServiceError> {
    let fields = as_object(payload);
    let mut patch = UpdateUserInput::default();
    let mut errors = Vec::new();

    for (rule, slot) in [
        (&NAME, &mut patch.name),
        (&EMAIL, &mut patch.email),
        (&PASSWORD, &mut patch.password),
    ] {
        if let Some(value) = fields.get(rule.field) {
            match rule.check(Some(value)) {
                Ok(text) => *slot = Some(text),
                Err(message) => errors.push(message),
            }
        }
    }

    if errors.is_empty() {
        Ok(patch)
    } else {
        Err(ServiceError::Validation(errors))
    }
}
