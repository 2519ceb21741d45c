//! Business layer of the parking auth backend.
//! - `auth` owns registration, verification, login, password recovery and profile workflows.
//! - `email` abstracts outbound mail so workflows stay transport-agnostic.
//! - Persistence goes through `models` behind the `AuthRepository` trait.

pub mod auth;
pub mod email;

#[cfg(test)]
mod test_support;
