//! Business logic services layer

pub mod auth_service;
pub mod backend_client;

pub use auth_service::{AuthService, CredentialAuthority};
pub use backend_client::BackendClient;
