pub mod address;
pub mod basket;
pub mod claims;
pub mod product;
pub mod refresh_token;
pub mod registration;
pub mod user;
