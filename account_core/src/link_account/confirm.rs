use crate::api::{self, accounts, Client};
use thiserror::Error;
use url::Url;

/// Where to go after unlinking. `msa_only` asks the server to end only the
/// provider session.
pub const DEFAULT_LOGOUT_URL: &str = "/logout?msa_only=true";

/// Where to go after confirming.
pub const DEFAULT_DASHBOARD_URL: &str = "/dashboard";

/// Shown when confirmation fails and the server didn't say why.
pub const GENERIC_CONFIRM_ERROR: &str = "There was an error confirming your account details.";

/// Problems linking or unlinking an account
#[derive(Debug, Error)]
pub enum LinkError {
    /// The provider couldn't be unlinked.
    #[error("Error Disconnecting User Account")]
    Disconnect(#[source] api::Error),

    /// There was nothing to confirm. No request was made.
    #[error("Error Updating User Account")]
    MissingUserData,

    /// The server rejected the profile update.
    #[error("{message}")]
    Confirm {
        /// What to show the user.
        message: String,

        /// The underlying failure.
        #[source]
        source: api::Error,
    },

    /// We couldn't work out where to send the user.
    #[error(transparent)]
    Api(#[from] api::Error),
}

/// After linking a new provider, the user either confirms the profile details
/// it brought along (email, name) or backs out by unlinking it again.
#[derive(Debug, Clone)]
pub struct LinkAccountConfirm {
    /// Who we talk to.
    client: Client,

    /// Where to post to unlink the provider.
    disconnect_url: String,

    /// The user accounts API resource to patch.
    user_accounts_api_url: String,

    /// The profile fields to save on confirmation.
    user_data: Option<accounts::Patch>,

    /// Where to go after unlinking.
    logout_url: String,

    /// Where to go after confirming.
    dashboard_url: String,
}

impl LinkAccountConfirm {
    /// Set up the confirmation step.
    pub fn new(
        client: Client,
        disconnect_url: impl Into<String>,
        user_accounts_api_url: impl Into<String>,
        user_data: Option<accounts::Patch>,
    ) -> Self {
        Self {
            client,
            disconnect_url: disconnect_url.into(),
            user_accounts_api_url: user_accounts_api_url.into(),
            user_data,
            logout_url: DEFAULT_LOGOUT_URL.to_string(),
            dashboard_url: DEFAULT_DASHBOARD_URL.to_string(),
        }
    }

    /// Send the user somewhere else after unlinking.
    #[must_use]
    pub fn with_logout_url(mut self, logout_url: impl Into<String>) -> Self {
        self.logout_url = logout_url.into();
        self
    }

    /// Send the user somewhere else after confirming.
    #[must_use]
    pub fn with_dashboard_url(mut self, dashboard_url: impl Into<String>) -> Self {
        self.dashboard_url = dashboard_url.into();
        self
    }

    /// Unlink the provider. Returns where to send the user next.
    ///
    /// ## Errors
    ///
    /// `LinkError::Disconnect` if the server wouldn't unlink.
    #[tracing::instrument(skip(self, http), fields(disconnect_url = %self.disconnect_url))]
    pub async fn disconnect(&self, http: &reqwest::Client) -> Result<Url, LinkError> {
        self.client
            .disconnect(http, &self.disconnect_url)
            .await
            .map_err(|err| {
                tracing::error!(?err, "error disconnecting user account");
                LinkError::Disconnect(err)
            })?;

        Ok(self.client.url(&self.logout_url)?)
    }

    /// Save the linked profile details. Returns where to send the user next.
    ///
    /// ## Errors
    ///
    /// - `LinkError::MissingUserData` if there's nothing to save
    /// - `LinkError::Confirm` if the server rejected the update, with the most
    ///   specific message we could find
    #[tracing::instrument(skip(self, http))]
    pub async fn confirm(&self, http: &reqwest::Client) -> Result<Url, LinkError> {
        let Some(user_data) = &self.user_data else {
            tracing::error!("no user data to confirm");
            return Err(LinkError::MissingUserData);
        };

        if let Err(source) = self
            .client
            .update_account(http, &self.user_accounts_api_url, user_data)
            .await
        {
            tracing::error!(err = ?source, "error confirming account migration");

            return Err(LinkError::Confirm {
                message: self.confirm_error_message(&source),
                source,
            });
        }

        Ok(self.client.url(&self.dashboard_url)?)
    }

    /// Prefer an error about a field we sent, then any field error, then the
    /// server's general message.
    fn confirm_error_message(&self, err: &api::Error) -> String {
        let field_errors = err.field_errors();

        let submitted = self
            .user_data
            .iter()
            .flat_map(|data| data.keys())
            .filter_map(|field| field_errors.get(field));

        submitted
            .chain(field_errors.values())
            .find_map(|error| error.user_message.clone())
            .or_else(|| err.message())
            .unwrap_or_else(|| GENERIC_CONFIRM_ERROR.to_string())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::csrf;
    use crate::test::{mock_server, TOKEN};
    use serde_json::{json, Value};
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, ResponseTemplate};

    const DISCONNECT: &str = "/auth/disconnect/azuread-oauth2/";
    const ACCOUNTS: &str = "/api/user/v1/accounts/ada";

    fn user_data() -> accounts::Patch {
        let mut data = accounts::Patch::new();
        data.insert("email".to_string(), Value::from("ada@new.example.com"));
        data.insert("name".to_string(), Value::from("Ada Lovelace"));
        data
    }

    #[test_log::test(tokio::test)]
    async fn disconnect_goes_to_logout() {
        let (server, client) = mock_server().await;

        Mock::given(method("POST"))
            .and(path(DISCONNECT))
            .and(header(csrf::HEADER, TOKEN))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
            .expect(1)
            .mount(&server)
            .await;

        let view = LinkAccountConfirm::new(client, DISCONNECT, ACCOUNTS, None);

        let destination = view.disconnect(&reqwest::Client::new()).await.unwrap();

        assert_eq!(destination.path(), "/logout");
        assert_eq!(destination.query(), Some("msa_only=true"));
    }

    #[test_log::test(tokio::test)]
    async fn disconnect_failure_is_reported() {
        let (server, client) = mock_server().await;

        Mock::given(method("POST"))
            .and(path(DISCONNECT))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let view = LinkAccountConfirm::new(client, DISCONNECT, ACCOUNTS, None);

        let err = view.disconnect(&reqwest::Client::new()).await.unwrap_err();

        assert!(matches!(err, LinkError::Disconnect(_)));
        assert_eq!(err.to_string(), "Error Disconnecting User Account");
    }

    #[test_log::test(tokio::test)]
    async fn confirm_without_data_sends_nothing() {
        let (server, client) = mock_server().await;

        Mock::given(method("PATCH"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let view = LinkAccountConfirm::new(client, DISCONNECT, ACCOUNTS, None);

        let err = view.confirm(&reqwest::Client::new()).await.unwrap_err();

        assert!(matches!(err, LinkError::MissingUserData));
    }

    #[test_log::test(tokio::test)]
    async fn confirm_goes_to_dashboard() {
        let (server, client) = mock_server().await;

        Mock::given(method("PATCH"))
            .and(path(ACCOUNTS))
            .and(body_json(json!({"email": "ada@new.example.com", "name": "Ada Lovelace"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"username": "ada"})))
            .expect(1)
            .mount(&server)
            .await;

        let view = LinkAccountConfirm::new(client, DISCONNECT, ACCOUNTS, Some(user_data()));

        let destination = view.confirm(&reqwest::Client::new()).await.unwrap();

        assert_eq!(destination.path(), DEFAULT_DASHBOARD_URL);
    }

    #[test_log::test(tokio::test)]
    async fn confirm_failure_shows_field_error() {
        let (server, client) = mock_server().await;

        Mock::given(method("PATCH"))
            .and(path(ACCOUNTS))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "field_errors": {
                    "email": {
                        "developer_message": "duplicate email",
                        "user_message": "That email is already linked to another account."
                    }
                }
            })))
            .mount(&server)
            .await;

        let view = LinkAccountConfirm::new(client, DISCONNECT, ACCOUNTS, Some(user_data()));

        let err = view.confirm(&reqwest::Client::new()).await.unwrap_err();

        assert_eq!(
            err.to_string(),
            "That email is already linked to another account."
        );
    }

    #[test_log::test(tokio::test)]
    async fn confirm_failure_without_details_is_generic() {
        let (server, client) = mock_server().await;

        Mock::given(method("PATCH"))
            .and(path(ACCOUNTS))
            .respond_with(ResponseTemplate::new(500).set_body_string("oops"))
            .mount(&server)
            .await;

        let view = LinkAccountConfirm::new(client, DISCONNECT, ACCOUNTS, Some(user_data()))
            .with_dashboard_url("/elsewhere");

        let err = view.confirm(&reqwest::Client::new()).await.unwrap_err();

        assert_eq!(err.to_string(), GENERIC_CONFIRM_ERROR);
    }
}
