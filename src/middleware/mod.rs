pub mod auth;
pub mod request_logger;

pub use auth::AuthMiddleware;
pub use request_logger::RequestLogger;
