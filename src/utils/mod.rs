pub mod fingerprint;
pub mod jwt;
pub mod password;
