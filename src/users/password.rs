use argon2::{
    password_hash::{PasswordHasher, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use tokio::task::spawn_blocking;
use tracing::error;

pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

/// Runs [`hash_password`] on the blocking pool so argon2 never stalls a runtime worker.
pub async fn hash_password_off_runtime(plain: String) -> anyhow::Result<String> {
    spawn_blocking(move || hash_password(&plain)).await?
}

#[cfg(test)]
mod tests {
    use super::*;
    use argon2::{PasswordHash, PasswordVerifier};

    #[test]
    fn hash_verifies_against_original() {
        let password = "Secur3P@ssw0rd!";
        let hash = hash_password(password).expect("hashing should succeed");
        let parsed = PasswordHash::new(&hash).expect("hash should be a PHC string");
        assert!(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok());
    }

    #[test]
    fn hash_never_contains_plaintext() {
        let hash = hash_password("test123").expect("hashing should succeed");
        assert!(!hash.contains("test123"));
        assert!(hash.starts_with("$argon2"));
    }

    #[tokio::test]
    async fn off_runtime_hash_verifies() {
        let hash = hash_password_off_runtime("test123".to_string())
            .await
            .expect("hashing should succeed");
        let parsed = PasswordHash::new(&hash).expect("hash should be a PHC string");
        assert!(Argon2::default()
            .verify_password(b"test123", &parsed)
            .is_ok());
    }

    #[test]
    fn salts_differ_between_calls() {
        let a = hash_password("same").expect("hash a");
        let b = hash_password("same").expect("hash b");
        assert_ne!(a, b);
    }
}
