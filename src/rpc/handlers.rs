use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use serde::Serialize;
use serde_json::Value;
use tracing::{error, instrument, warn};
use uuid::Uuid;

use super::dto::{Command, RpcMessage};
use crate::{
    error::{ServiceError, ServiceResult},
    state::AppState,
    users::{
        validation::{validate_create, validate_patch},
        UserService,
    },
};

pub fn rpc_routes() -> Router<AppState> {
    Router::new().route("/rpc", post(handle_message))
}

#[instrument(skip(state, payload), fields(cmd = tracing::field::Empty))]
pub async fn handle_message(
    State(state): State<AppState>,
    payload: Result<Json<RpcMessage>, JsonRejection>,
) -> Result<Json<Value>, ServiceError> {
    let message = match decode_message(payload) {
        Ok(message) => message,
        Err(e) => {
            warn!(error = %e, "message rejected");
            return Err(e);
        }
    };
    tracing::Span::current().record("cmd", message.pattern.cmd.as_str());

    match dispatch(&state.users, message).await {
        Ok(value) => Ok(Json(value)),
        Err(e) => {
            if e.status().is_server_error() {
                error!(error = %e, "command failed");
            } else {
                warn!(error = %e, "command rejected");
            }
            Err(e)
        }
    }
}

fn decode_message(payload: Result<Json<RpcMessage>, JsonRejection>) -> ServiceResult<RpcMessage> {
    payload
        .map(|Json(message)| message)
        .map_err(|rejection| ServiceError::MalformedMessage(rejection.body_text()))
}

/// Routes one message to the user service and returns the success value.
pub async fn dispatch(users: &UserService, message: RpcMessage) -> ServiceResult<Value> {
    let command: Command = message.pattern.cmd.parse()?;
    let data = message.data;

    match command {
        Command::CreateUser => {
            let input = validate_create(&data)?;
            to_json(users.create(input).await?)
        }
        Command::GetUserById => {
            let id = parse_id(&data, "id")?.ok_or(ServiceError::NotFound)?;
            to_json(users.find_by_id(id).await?)
        }
        Command::GetUserByEmail => {
            let email = expect_text(&data, "email")?;
            to_json(users.find_by_email(email).await?)
        }
        Command::GetAllUsers => to_json(users.get_all().await?),
        Command::UpdateUser => {
            let id = parse_id(data.get("id").unwrap_or(&Value::Null), "id")?;
            let patch = match data.get("data") {
                None | Some(Value::Null) => Default::default(),
                Some(Value::Object(_)) => validate_patch(&data["data"])?,
                Some(_) => {
                    return Err(ServiceError::Validation(vec![
                        "data - Los datos deben ser un objeto".into(),
                    ]))
                }
            };
            let id = id.ok_or(ServiceError::NotFound)?;
            to_json(users.update_user(id, patch).await?)
        }
        Command::DeleteUser => {
            let id = parse_id(&data, "id")?.ok_or(ServiceError::NotFound)?;
            to_json(users.delete(id).await?)
        }
    }
}

fn expect_text<'a>(value: &'a Value, field: &str) -> ServiceResult<&'a str> {
    value.as_str().ok_or_else(|| {
        ServiceError::Validation(vec![format!(
            "{field} - El {field} debe ser una cadena de texto"
        )])
    })
}

/// A string that is not a UUID cannot name a stored record, so it maps to `None`.
fn parse_id(value: &Value, field: &str) -> ServiceResult<Option<Uuid>> {
    let raw = expect_text(value, field)?;
    Ok(Uuid::parse_str(raw).ok())
}

fn to_json<T: Serialize>(value: T) -> ServiceResult<Value> {
    serde_json::to_value(value).map_err(|e| ServiceError::Internal(e.to_string()))
}
