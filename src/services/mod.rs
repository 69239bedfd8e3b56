pub mod auth_service;
pub mod basket_service;
pub mod pricing;
pub mod product_service;
pub mod smtp_mailer;
pub mod token_service;
pub mod user_service;
