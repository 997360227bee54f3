//! Argon2 password hashing shared by the API and the admin CLI.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, Params,
};
use std::sync::LazyLock;

/// Fast, insecure password hashing for dev and test databases.
static INSECURE_HASHING: LazyLock<bool> =
    LazyLock::new(|| std::env::var("INSECURE_PASSWORD_HASHING").is_ok());

fn get_argon2() -> Argon2<'static> {
    if *INSECURE_HASHING {
        match Params::new(1024, 1, 1, None) {
            Ok(params) => {
                Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params)
            }
            Err(_) => Argon2::default(),
        }
    } else {
        Argon2::default()
    }
}

/// PHC string with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = get_argon2().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Hashes made under either parameter set verify, since the PHC string
/// carries its own parameters.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(hash) else {
        return false;
    };
    get_argon2()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}
