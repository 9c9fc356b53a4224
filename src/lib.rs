#![doc = include_str!("../README.md")]

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod response;
pub mod session;
pub mod store;

// Re-exports for convenient access
pub use auth::{
    Ack, AuthApi, AuthResponse, HealthStatus, ImageUpload, LoginReply, RegisterRequest, User,
};
pub use client::{ApiClient, AuthMode};
pub use config::ApiConfig;
pub use error::Error;
pub use http::RetryPolicy;
pub use session::{LoginOutcome, Navigation, SessionManager, SessionState};
pub use store::{CredentialStore, FileCredentialStore, MemoryCredentialStore, Token};
