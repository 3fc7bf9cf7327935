use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
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

pub fn verify_password(plain: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        error!(error = %e, "argon2 parse hash error");
        anyhow::anyhow!(e.to_string())
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

/// Recovery answers are matched case-insensitively: "Fluffy" and "fluffy"
/// are the same answer. Normalize before hashing and before verifying.
fn normalize_answer(answer: &str) -> String {
    answer.trim().to_lowercase()
}

pub fn hash_recovery_answer(answer: &str) -> anyhow::Result<String> {
    hash_password(&normalize_answer(answer))
}

pub fn verify_recovery_answer(answer: &str, hash: &str) -> anyhow::Result<bool> {
    verify_password(&normalize_answer(answer), hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_roundtrip() {
        let password = "Secur3P@ssw0rd!";
        let hash = hash_password(password).expect("hashing should succeed");
        assert!(verify_password(password, &hash).expect("verify should succeed"));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let password = "correct-horse-battery-staple";
        let hash = hash_password(password).expect("hashing should succeed");
        assert!(!verify_password("wrong-password", &hash).expect("verify should not error"));
    }

    #[test]
    fn verify_errors_on_malformed_hash() {
        let err = verify_password("anything", "not-a-valid-hash").unwrap_err();
        assert!(!err.to_string().is_empty());
    }

    #[test]
    fn recovery_answers_are_case_insensitive() {
        let hash = hash_recovery_answer("Fluffy").expect("hashing should succeed");
        assert!(verify_recovery_answer("fluffy", &hash).expect("verify should succeed"));
        assert!(verify_recovery_answer("  FLUFFY  ", &hash).expect("verify should succeed"));
        assert!(!verify_recovery_answer("rex", &hash).expect("verify should not error"));
    }
}
