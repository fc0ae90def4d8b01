//! Decides what to send for each login attempt and how to read the answer.
//!
//! During an account migration rollout, logging in can take two steps: first
//! we send only the email (with a placeholder password) to ask the server
//! whether the account has moved to the new identity provider, then we send
//! the real password. The server tells us which step we're on through the
//! `msa_migration_pipeline_status` field, and we echo it back on the next
//! request.

use crate::api::login::{self, PipelineStatus, EMAIL_LOOKUP_PASSWORD};
use crate::api::{error, Client};
use crate::Analytics;
use reqwest::Method;

/// What the user typed into the login form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    /// Email to log in with.
    pub email: String,

    /// Password. Empty when we only want to look the account up.
    pub password: String,

    /// Keep the session after the browser closes.
    pub remember: bool,

    /// A pipeline status to send instead of the one the negotiator tracks.
    pub pipeline_status: Option<PipelineStatus>,
}

impl Credentials {
    /// Email and password, not remembered.
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            ..Self::default()
        }
    }

    /// Just an email, for the lookup step.
    pub fn email_only(email: impl Into<String>) -> Self {
        Self::new(email, String::new())
    }

    /// Set whether the session should be remembered.
    #[must_use]
    pub fn remember(mut self, remember: bool) -> Self {
        self.remember = remember;
        self
    }
}

/// A successful round trip.
#[derive(Debug, Clone, PartialEq)]
pub struct LoginSync {
    /// What we sent, updated with whatever the server told us about the
    /// pipeline status.
    pub payload: login::Req,

    /// What the server sent back.
    pub response: login::Resp,
}

impl LoginSync {
    /// Was this only an email lookup? If so, the caller still needs to ask
    /// for a password.
    pub fn was_email_lookup(&self) -> bool {
        self.payload.is_email_lookup()
    }
}

/// Builds login requests and tracks the migration pipeline status across
/// attempts. Lives as long as the login form does.
#[derive(Debug)]
pub struct LoginNegotiator {
    /// Who we talk to.
    client: Client,

    /// How to send the request (usually `POST`.)
    method: Method,

    /// Where to send it, relative to the client's server.
    endpoint: String,

    /// Whether to take part in the migration flow at all.
    migration_enabled: bool,

    /// The last status we sent or were told about. `None` until we have one.
    pipeline_status: Option<PipelineStatus>,

    /// Sent with every request, if set.
    analytics: Option<Analytics>,
}

impl LoginNegotiator {
    /// A negotiator with migration turned off.
    pub fn new(client: Client, method: Method, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            method,
            endpoint: endpoint.into(),
            migration_enabled: false,
            pipeline_status: None,
            analytics: None,
        }
    }

    /// Turn on the migration flow, optionally picking up a status the page was
    /// rendered with.
    #[must_use]
    pub fn with_migration(mut self, initial: Option<PipelineStatus>) -> Self {
        self.migration_enabled = true;
        self.pipeline_status = initial;
        self
    }

    /// Send analytics context with every request.
    #[must_use]
    pub fn with_analytics(mut self, analytics: Option<Analytics>) -> Self {
        self.analytics = analytics;
        self
    }

    /// Is the migration flow on?
    pub fn migration_enabled(&self) -> bool {
        self.migration_enabled
    }

    /// The current pipeline status. An empty status means the server told us
    /// to stop treating this as a migration login.
    pub fn pipeline_status(&self) -> Option<&PipelineStatus> {
        self.pipeline_status.as_ref()
    }

    /// Build the payload for a login attempt.
    ///
    /// With migration on, a missing status defaults to `email_lookup` and a
    /// missing password is replaced with the lookup placeholder. The status we
    /// pick is remembered, so preparing the same credentials twice gives the
    /// same payload.
    pub fn prepare(&mut self, credentials: &Credentials) -> login::Req {
        let mut payload = login::Req {
            email: credentials.email.clone(),
            password: credentials.password.clone(),
            remember: credentials.remember,
            analytics: self.analytics.as_ref().map(Analytics::to_json),
            msa_migration_pipeline_status: None,
        };

        if self.migration_enabled {
            let status = credentials.pipeline_status.clone().unwrap_or_else(|| {
                self.pipeline_status
                    .clone()
                    .filter(|status| !status.is_cleared())
                    .unwrap_or_else(PipelineStatus::email_lookup)
            });

            if payload.password.is_empty() {
                payload.password = EMAIL_LOOKUP_PASSWORD.to_string();
            }

            self.pipeline_status = Some(status.clone());
            payload.msa_migration_pipeline_status = Some(status);
        }

        payload
    }

    /// Update our status from a successful response and return the payload as
    /// the caller should see it.
    ///
    /// If the server says the account isn't migrated after we sent a real
    /// password, the status is cleared so the caller falls back to ordinary
    /// login error handling.
    pub fn apply_response(
        &mut self,
        mut payload: login::Req,
        response: &login::Resp,
    ) -> login::Req {
        if !self.migration_enabled {
            return payload;
        }

        if let Some(status) = response.pipeline_status() {
            tracing::debug!(%status, "server updated pipeline status");
            payload.msa_migration_pipeline_status = Some(status.clone());
            self.pipeline_status = Some(status);
        }

        let not_migrated = payload
            .msa_migration_pipeline_status
            .as_ref()
            .is_some_and(PipelineStatus::is_login_not_migrated);

        if not_migrated && !payload.is_email_lookup() {
            payload.msa_migration_pipeline_status = Some(PipelineStatus::cleared());
            self.pipeline_status = Some(PipelineStatus::cleared());
        }

        payload
    }

    /// Send one login attempt.
    ///
    /// ## Errors
    ///
    /// Whatever went wrong with the request, untouched. A failed request leaves
    /// the pipeline status where `prepare` put it.
    #[tracing::instrument(
        skip(self, http, credentials),
        fields(migration = self.migration_enabled)
    )]
    pub async fn submit(
        &mut self,
        http: &reqwest::Client,
        credentials: &Credentials,
    ) -> error::Result<LoginSync> {
        let payload = self.prepare(credentials);

        let response = self
            .client
            .login(http, self.method.clone(), &self.endpoint, &payload)
            .await
            .inspect_err(|err| tracing::info!(?err, "login request failed"))?;

        let payload = self.apply_response(payload, &response);

        Ok(LoginSync { payload, response })
    }
}
