use argon2::password_hash::{rand_core::OsRng, Error, PasswordHash, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, PasswordHasher, Version};

use crate::config::PasswordHashSettings;

fn hasher(settings: &PasswordHashSettings) -> Result<Argon2<'static>, Error> {
    let params = Params::new(
        settings.memory_kib.unwrap_or(Params::DEFAULT_M_COST),
        settings.iterations.unwrap_or(Params::DEFAULT_T_COST),
        settings.parallelism.unwrap_or(Params::DEFAULT_P_COST),
        None,
    )?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

pub fn hash_password(password: &str, settings: &PasswordHashSettings) -> Result<String, Error> {
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = hasher(settings)?
        .hash_password(password.as_bytes(), &salt)?
        .to_string();
    Ok(password_hash)
}

/// Cost parameters are read back from the PHC string, so hashes made under
/// older settings keep verifying.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, Error> {
    let parsed_hash = PasswordHash::new(hash)?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap() -> PasswordHashSettings {
        PasswordHashSettings {
            memory_kib: Some(1024),
            iterations: Some(1),
            parallelism: Some(1),
        }
    }

    #[test]
    fn hash_then_verify() {
        let hash = hash_password("hunter2", &cheap()).unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(hash.contains("m=1024,t=1,p=1"));
        assert!(verify_password("hunter2", &hash).unwrap());
        assert!(!verify_password("hunter3", &hash).unwrap());
    }

    #[test]
    fn malformed_hash_is_an_error() {
        assert!(verify_password("hunter2", "not-a-phc-string").is_err());
    }

    #[test]
    fn invalid_cost_parameters_are_rejected() {
        let settings = PasswordHashSettings {
            memory_kib: Some(1),
            ..cheap()
        };
        assert!(hash_password("hunter2", &settings).is_err());
    }
}
