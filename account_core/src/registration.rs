use crate::api::{self, register, Client};
use thiserror::Error;
use url::Url;

/// Where new accounts go if the server doesn't say otherwise.
pub const DEFAULT_REDIRECT: &str = "/course/";

/// Why registration didn't work.
#[derive(Debug, Error)]
pub enum RegistrationError {
    /// The server looked at the form and said no. The message is meant to be
    /// shown to the user as-is.
    #[error("{0}")]
    Rejected(String),

    /// Something went wrong that the server didn't explain.
    #[error(transparent)]
    Api(#[from] api::Error),
}

/// Submit the registration form and figure out where the new user should go
/// next.
///
/// ## Errors
///
/// `RegistrationError::Rejected` if the server explained what was wrong with
/// the form, `RegistrationError::Api` for everything else.
#[tracing::instrument(skip_all)]
pub async fn submit(
    client: &Client,
    http: &reqwest::Client,
    form: &register::Req,
) -> Result<Url, RegistrationError> {
    match client.register(http, form).await {
        Ok(resp) => {
            let destination = resp
                .redirect_url
                .as_deref()
                .filter(|url| !url.is_empty())
                .unwrap_or(DEFAULT_REDIRECT);

            tracing::info!(destination, "registered");

            Ok(client.url(destination)?)
        }
        Err(err) => match err.message() {
            Some(message) => Err(RegistrationError::Rejected(message)),
            None => Err(err.into()),
        },
    }
}
