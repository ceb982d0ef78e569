use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let url = match std::env::var("DATABASE_URL") {
            Ok(url) => url,
            Err(_) => database_url_from_parts(
                &env_or("DB_HOST", "localhost"),
                &env_or("DB_PORT", "5432"),
                &env_or("DB_USERNAME", "firstservice"),
                &env_or("DB_PASSWORD", "firstservice"),
                &env_or("DB_NAME", "db_first_service"),
            ),
        };
        let database = DatabaseConfig {
            url,
            max_connections: std::env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(10),
        };
        let port = std::env::var("APP_PORT")
            .ok()
            .map(|v| v.parse::<u16>())
            .transpose()?
            .unwrap_or(4000);
        Ok(Self {
            database,
            host: env_or("APP_HOST", "0.0.0.0"),
            port,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn database_url_from_parts(host: &str, port: &str, user: &str, password: &str, name: &str) -> String {
    format!("postgres://{user}:{password}@{host}:{port}/{name}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_postgres_url_from_parts() {
        let url = database_url_from_parts("db", "5433", "svc", "secret", "users");
        assert_eq!(url, "postgres://svc:secret@db:5433/users");
    }
}
