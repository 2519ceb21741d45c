pub mod errors;
pub mod db;
pub mod user;
pub mod admin;
pub mod otp;

#[cfg(test)]
mod tests;
