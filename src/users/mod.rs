pub mod dto;
#[cfg(test)]
pub mod memory;
mod password;
pub mod repo;
pub mod repo_types;
pub mod services;
pub mod validation;

pub use repo::{PgUserRepository, UserRepository};
pub use services::UserService;
