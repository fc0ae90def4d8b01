/// Things that can go wrong in the API
pub mod error;
pub use error::Error;

/// The HTTP client itself
pub mod client;
pub use client::Client;

/// Updating profile fields on the user accounts API
pub mod accounts;

/// Logging in
pub mod login;

/// Creating an account
pub mod register;
