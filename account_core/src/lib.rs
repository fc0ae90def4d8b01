//! Client-side account management for the learning platform: logging in
//! (including the account migration flow), registering, and linking or
//! unlinking third-party sign-in providers.

/// Talking to the platform's HTTP API.
pub mod api;
pub use api::Client;

/// Where analytics context for login requests comes from.
pub mod analytics;
pub use analytics::Analytics;

/// Anti-forgery tokens attached to state-changing requests.
pub mod csrf;
pub use csrf::CsrfToken;

/// Linking and unlinking third-party providers.
pub mod link_account;

/// Login requests, including the migration pipeline negotiation.
pub mod negotiator;
pub use negotiator::LoginNegotiator;

/// Submitting the registration form.
pub mod registration;
