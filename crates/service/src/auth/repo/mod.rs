//! Concrete `AuthRepository` implementations.
pub mod seaorm;
