/// A single provider's link/unlink field
pub mod view;
pub use view::{LinkAccountView, LinkField};

/// The "Linked Accounts" settings section
pub mod section;
pub use section::{AuthData, LinkAccountSection, Provider};

/// Confirming (or backing out of) a freshly linked account
pub mod confirm;
pub use confirm::{LinkAccountConfirm, LinkError};
