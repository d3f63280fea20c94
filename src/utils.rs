use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::{DateTime, Utc};
use rand_core::{OsRng, RngCore};

use crate::errors::AppError;

const MIN_PASSWORD_LENGTH: usize = 8;
const TEMP_PASSWORD_LENGTH: usize = 12;

// No look-alike characters (0/O, 1/l/I); temporary passwords are read aloud
// or copied by hand from a one-time dialog.
const TEMP_PASSWORD_ALPHABET: &[u8] = b"abcdefghjkmnpqrstuvwxyzABCDEFGHJKMNPQRSTUVWXYZ23456789";

pub fn hash_password(password: &str) -> Result<String, AppError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AppError::bad_request(format!(
            "password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }

    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| AppError::internal(format!("failed to hash password: {err}")))
}

pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, AppError> {
    let parsed_hash = PasswordHash::new(password_hash)
        .map_err(|err| AppError::internal(format!("invalid password hash: {err}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Generate a one-shot temporary password for a newly provisioned account.
/// The plaintext is returned to the caller exactly once and never stored.
pub fn generate_temp_password() -> String {
    let mut bytes = [0u8; TEMP_PASSWORD_LENGTH];
    OsRng.fill_bytes(&mut bytes);

    bytes
        .iter()
        .map(|b| TEMP_PASSWORD_ALPHABET[*b as usize % TEMP_PASSWORD_ALPHABET.len()] as char)
        .collect()
}

pub fn utc_now() -> DateTime<Utc> {
    Utc::now()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_passwords_are_long_enough_to_hash() {
        let password = generate_temp_password();
        assert!(password.len() >= MIN_PASSWORD_LENGTH);
        assert!(hash_password(&password).is_ok());
    }

    #[test]
    fn temp_passwords_differ() {
        assert_ne!(generate_temp_password(), generate_temp_password());
    }
}
