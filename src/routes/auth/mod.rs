pub mod activate;
pub mod cookies;
pub mod login;
pub mod logout;
pub mod refresh;
pub mod registration;
pub mod session;

pub use activate::handle_activate;
pub use login::handle_login;
pub use logout::handle_logout;
pub use refresh::handle_refresh;
pub use registration::handle_registration;
