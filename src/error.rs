use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

pub const EMAIL_IN_USE: &str = "El email ya se encuentra en uso";
pub const USER_NOT_FOUND: &str = "Usuario no encontrado";
pub const SAVE_FAILED: &str = "Error al guardar el usuario";

/// Failure kinds surfaced by the user service.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// One `"<field> - <messages>"` entry per offending field.
    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("{0}")]
    Conflict(String),

    #[error("Usuario no encontrado")]
    NotFound,

    #[error("{0}")]
    Persistence(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// The message body could not be decoded as `{pattern: {cmd}, data}`.
    #[error("malformed message: {0}")]
    MalformedMessage(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServiceError::Validation(_)
            | ServiceError::UnknownCommand(_)
            | ServiceError::MalformedMessage(_) => StatusCode::BAD_REQUEST,
            ServiceError::NotFound => StatusCode::NOT_FOUND,
            ServiceError::Conflict(_) => StatusCode::CONFLICT,
            ServiceError::Persistence(_) | ServiceError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// The value the caller receives as the rejected response.
    pub fn body(&self) -> serde_json::Value {
        match self {
            ServiceError::Validation(messages) => json!(messages),
            ServiceError::NotFound => json!({ "success": false, "message": USER_NOT_FOUND }),
            ServiceError::Conflict(message) | ServiceError::Persistence(message) => {
                json!({ "success": false, "message": message })
            }
            ServiceError::Internal(_) => {
                json!({ "success": false, "message": "Error interno del servidor" })
            }
            ServiceError::UnknownCommand(cmd) => {
                json!({ "success": false, "message": format!("Comando desconocido: {cmd}") })
            }
            ServiceError::MalformedMessage(detail) => {
                json!({ "success": false, "message": format!("Mensaje inválido: {detail}") })
            }
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_carries_fixed_message() {
        let err = ServiceError::NotFound;
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.body(), json!({"success": false, "message": "Usuario no encontrado"}));
    }

    #[test]
    fn validation_is_a_bare_message_list() {
        let err = ServiceError::Validation(vec!["name - El nombre es requerido".into()]);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.body(), json!(["name - El nombre es requerido"]));
    }

    #[test]
    fn internal_details_are_not_leaked() {
        let err = ServiceError::Internal("pool timed out".into());
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.body().to_string().contains("pool"));
    }
}
