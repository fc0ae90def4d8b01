use super::error::{self, Error};
use super::{accounts, login, register};
use crate::csrf::{self, CsrfToken};
use reqwest::header::CONTENT_TYPE;
use reqwest::Method;
use serde_json::Value;
use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;
use url::Url;

/// Client for the account API
#[derive(Clone)]
pub struct Client {
    /// The server to connect to. Should only be the protocol and domain, e.g.
    /// `https://courses.example.com`. Relative paths are resolved against this.
    pub server: Url,

    /// Where anti-forgery tokens come from.
    csrf: Arc<dyn CsrfToken>,
}

impl Client {
    /// Construct a new client
    pub fn new(server: Url, csrf: impl CsrfToken + 'static) -> Self {
        Self {
            server,
            csrf: Arc::new(csrf),
        }
    }

    /// Construct a new client from a string URL.
    ///
    /// ## Errors
    ///
    /// `Error::UrlParse` if `server` isn't a valid URL.
    pub fn parse(server: &str, csrf: impl CsrfToken + 'static) -> error::Result<Self> {
        Ok(Self::new(Url::parse(server)?, csrf))
    }

    /// Resolve a path (or an absolute URL) against the server.
    ///
    /// ## Errors
    ///
    /// `Error::UrlParse` if the result isn't a valid URL.
    pub fn url(&self, path: &str) -> error::Result<Url> {
        Ok(self.server.join(path)?)
    }

    /// Register a new account.
    ///
    /// ## Errors
    ///
    /// Errors are the same as `handle_response`.
    #[tracing::instrument(skip(self, http, req), fields(field_count = req.fields().len()))]
    pub async fn register(
        &self,
        http: &reqwest::Client,
        req: &register::Req,
    ) -> error::Result<register::Resp> {
        let url = self.url(register::PATH)?;

        let resp = Self::handle_response(self.protected(http.post(url).form(req))).await?;

        Ok(serde_json::from_slice(&resp)?)
    }

    /// Log in (or ask whether an account has been migrated.) An empty or
    /// non-object body is read as a response with no fields, since the server
    /// doesn't always bother to send JSON on success.
    ///
    /// ## Errors
    ///
    /// Errors are the same as `handle_response`, plus `Error::Json` if the body
    /// isn't JSON at all.
    #[tracing::instrument(skip(self, http, req), fields(lookup = req.is_email_lookup()))]
    pub async fn login(
        &self,
        http: &reqwest::Client,
        method: Method,
        endpoint: &str,
        req: &login::Req,
    ) -> error::Result<login::Resp> {
        let url = self.url(endpoint)?;

        let body =
            Self::handle_response(self.protected(http.request(method, url).form(req))).await?;

        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(login::Resp::default());
        }

        match serde_json::from_slice::<Value>(&body)? {
            object @ Value::Object(_) => Ok(serde_json::from_value(object)?),
            other => {
                tracing::debug!(?other, "login response was not an object");
                Ok(login::Resp::default())
            }
        }
    }

    /// Remove the link between the current account and a third-party
    /// provider. We don't care what the server sends back on success.
    ///
    /// ## Errors
    ///
    /// Errors are the same as `handle_response`.
    #[tracing::instrument(skip(self, http))]
    pub async fn disconnect(
        &self,
        http: &reqwest::Client,
        disconnect_url: &str,
    ) -> error::Result<()> {
        let url = self.url(disconnect_url)?;

        Self::handle_response(self.protected(http.post(url))).await?;

        Ok(())
    }

    /// Partially update the current user's profile.
    ///
    /// ## Errors
    ///
    /// Errors are the same as `handle_response`, plus `Error::Json` if the
    /// patch can't be encoded.
    #[tracing::instrument(skip(self, http, patch))]
    pub async fn update_account(
        &self,
        http: &reqwest::Client,
        accounts_url: &str,
        patch: &accounts::Patch,
    ) -> error::Result<()> {
        let url = self.url(accounts_url)?;
        let body = serde_json::to_vec(patch)?;

        Self::handle_response(
            self.protected(
                http.patch(url)
                    .header(CONTENT_TYPE, accounts::MERGE_PATCH_CONTENT_TYPE)
                    .body(body),
            ),
        )
        .await?;

        Ok(())
    }

    /// Attach the anti-forgery header, if we have a token.
    fn protected(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.csrf.csrf_token() {
            Some(token) => req.header(csrf::HEADER, token),
            None => {
                tracing::warn!("no CSRF token available, sending request without one");
                req
            }
        }
    }

    /// Send a request and hand back the body of a successful response.
    ///
    /// ## Errors
    ///
    /// - `Ok(..)` if the server returned a success (2xx)
    /// - `Error::Status` for anything else, with the body kept verbatim
    /// - `Error::Http` if we couldn't talk to the server at all
    async fn handle_response(req: reqwest::RequestBuilder) -> error::Result<Vec<u8>> {
        let resp = req.send().await?;

        let status = resp.status();

        if status.is_success() {
            Ok(resp.bytes().await?.to_vec())
        } else {
            let body = resp.text().await?;
            tracing::debug!(%status, "request failed");

            Err(Error::Status { status, body })
        }
    }
}

impl Debug for Client {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("server", &self.server.as_str())
            .field("csrf", &self.csrf)
            .finish()
    }
}
