//! Account lifecycle for drivers and administrators.
//!
//! Layers, innermost first:
//! - `domain`: records, public projections and request inputs
//! - `repository`: storage trait plus an in-memory implementation
//! - `repo`: database-backed implementations
//! - `service` and `profile`: the workflows exposed to the HTTP layer

pub mod domain;
pub mod errors;
pub mod otp;
pub mod password;
pub mod profile;
pub mod repo;
pub mod repository;
pub mod service;
pub mod token;
pub mod validation;

pub use errors::AuthError;
pub use service::{AuthConfig, AuthService};

#[cfg(test)]
mod tests;
