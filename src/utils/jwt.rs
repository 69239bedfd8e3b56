use std::collections::HashSet;

use jsonwebtoken::{
    decode, encode, errors::Error, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header,
    TokenData, Validation,
};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

use crate::config::JwtSettings;
use crate::models::claims::Claims;

/// Minimum acceptable size for a JWT secret in bytes.
pub const MIN_JWT_SECRET_LENGTH: usize = 32;
/// Minimum number of unique bytes expected for a JWT secret to avoid trivially guessable values.
const MIN_UNIQUE_JWT_BYTES: usize = 8;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum JwtSecretError {
    #[error("{name} must be at least {required} bytes, but {actual} bytes were provided")]
    TooShort {
        name: &'static str,
        actual: usize,
        required: usize,
    },
    #[error(
        "{name} must contain sufficient entropy (at least {required} unique bytes); only {actual} unique bytes found"
    )]
    LowEntropy {
        name: &'static str,
        actual: usize,
        required: usize,
    },
    #[error("JWT_ACCESS_SECRET and JWT_REFRESH_SECRET must differ")]
    Reused,
}

#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl std::fmt::Debug for JwtKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtKeys").finish_non_exhaustive()
    }
}

impl JwtKeys {
    pub fn from_secret(name: &'static str, secret: impl AsRef<[u8]>) -> Result<Self, JwtSecretError> {
        let bytes = secret.as_ref();
        validate_secret(name, bytes)?;

        Ok(Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
        })
    }

    pub fn encoding_key(&self) -> &EncodingKey {
        &self.encoding
    }

    pub fn decoding_key(&self) -> &DecodingKey {
        &self.decoding
    }
}

/// The access and refresh signing keys. They are always distinct so a
/// token of one kind can never verify as the other.
#[derive(Clone, Debug)]
pub struct TokenKeys {
    pub access: JwtKeys,
    pub refresh: JwtKeys,
}

impl TokenKeys {
    pub fn from_settings(settings: &JwtSettings) -> Result<Self, JwtSecretError> {
        if settings.access_secret == settings.refresh_secret {
            return Err(JwtSecretError::Reused);
        }
        Ok(Self {
            access: JwtKeys::from_secret("JWT_ACCESS_SECRET", &settings.access_secret)?,
            refresh: JwtKeys::from_secret("JWT_REFRESH_SECRET", &settings.refresh_secret)?,
        })
    }
}

fn validate_secret(name: &'static str, secret: &[u8]) -> Result<(), JwtSecretError> {
    if secret.len() < MIN_JWT_SECRET_LENGTH {
        return Err(JwtSecretError::TooShort {
            name,
            actual: secret.len(),
            required: MIN_JWT_SECRET_LENGTH,
        });
    }

    let unique = secret.iter().copied().collect::<HashSet<_>>().len();
    if unique < MIN_UNIQUE_JWT_BYTES {
        return Err(JwtSecretError::LowEntropy {
            name,
            actual: unique,
            required: MIN_UNIQUE_JWT_BYTES,
        });
    }

    Ok(())
}

pub fn create_jwt(claims: &Claims, keys: &JwtKeys) -> Result<String, Error> {
    encode(&Header::default(), claims, keys.encoding_key())
}

pub fn decode_jwt(token: &str, keys: &JwtKeys) -> Result<TokenData<Claims>, Error> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation.validate_exp = true;
    validation.required_spec_claims.insert("exp".to_string());
    let data = decode::<Claims>(token, keys.decoding_key(), &validation)?;

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|_| Error::from(ErrorKind::InvalidToken))?
        .as_secs();

    if (data.claims.exp as u64) <= now {
        return Err(Error::from(ErrorKind::ExpiredSignature));
    }

    Ok(data)
}
