/// Re-export tonic's Interceptor trait for convenience
pub use tonic::service::Interceptor;

pub mod auth;

pub use auth::{APP_NAME_HEADER, AUTHORIZATION_HEADER, InvestApiCredentials};
