use std::str::FromStr;

use serde::Deserialize;
use serde_json::Value;

use crate::error::ServiceError;

/// `{"cmd": "<command>"}` routing key of an inbound message.
#[derive(Debug, Deserialize)]
pub struct Pattern {
    pub cmd: String,
}

/// Inbound message: routing pattern plus command payload.
#[derive(Debug, Deserialize)]
pub struct RpcMessage {
    pub pattern: Pattern,
    #[serde(default)]
    pub data: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    CreateUser,
    GetUserById,
    GetUserByEmail,
    GetAllUsers,
    UpdateUser,
    DeleteUser,
}

impl FromStr for Command {
    type Err = ServiceError;

    fn from_str(cmd: &str) -> Result<Self, Self::Err> {
        match cmd {
            "create_user" => Ok(Command::CreateUser),
            "get_user_by_id" => Ok(Command::GetUserById),
            "get_user_by_email" => Ok(Command::GetUserByEmail),
            "get_all_users" => Ok(Command::GetAllUsers),
            "update_user" => Ok(Command::UpdateUser),
            "delete_user" => Ok(Command::DeleteUser),
            other => Err(ServiceError::UnknownCommand(other.to_string())),
        }
    }
}
