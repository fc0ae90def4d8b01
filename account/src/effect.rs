use crate::config::Command;
use account_core::api::{self, accounts, login::PipelineStatus, register};
use account_core::csrf::{CookieJarToken, StaticToken};
use account_core::link_account::{AuthData, LinkAccountConfirm, LinkAccountSection, LinkError};
use account_core::negotiator::{Credentials, LoginNegotiator, LoginSync};
use account_core::registration::{self, RegistrationError};
use account_core::{Analytics, Client};
use reqwest::cookie::Jar;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tokio::fs;
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};
use url::Url;

/// Connections to external services that commands use.
pub struct EffectContext {
    /// an HTTP client with reqwest
    http: reqwest::Client,

    /// The account API, with a CSRF token source attached
    client: Client,
}

impl EffectContext {
    /// Set up HTTP. Without a configured CSRF token we visit the server once
    /// so it sets the token cookie, then read the token from the cookie jar
    /// on every request.
    ///
    /// ## Errors
    ///
    /// `Problem::Http` if we can't build the client or reach the server.
    pub async fn new(server: &Url, csrf_token: Option<&str>) -> Result<Self, Problem> {
        let jar = Arc::new(Jar::default());

        let http = reqwest::Client::builder()
            .cookie_provider(Arc::clone(&jar))
            .build()?;

        let client = match csrf_token {
            Some(token) => Client::new(server.clone(), StaticToken::new(token)),
            None => {
                tracing::debug!(%server, "fetching CSRF cookie");
                http.get(server.clone()).send().await?;

                Client::new(server.clone(), CookieJarToken::new(jar, server.clone()))
            }
        };

        Ok(Self { http, client })
    }
}

/// What the user should see when a command finishes.
#[derive(Debug, PartialEq)]
pub enum Outcome {
    /// Send the user to this URL (in a browser, this is where the page would
    /// navigate.)
    Navigate(Url),

    /// Show some text.
    Show(String),
}

impl Command {
    /// Perform the command, returning what to show the user.
    pub async fn run(self, ctx: &EffectContext, platform_name: &str) -> Result<Outcome, Problem> {
        match self {
            Self::Login {
                email,
                password,
                remember,
                msa_migration,
                pipeline_status,
                course_id,
                page_url,
                endpoint,
                method,
            } => {
                tracing::info!(msa_migration, "logging in");

                let analytics = course_id
                    .map(Analytics::for_course)
                    .or_else(|| page_url.as_ref().and_then(Analytics::from_page_url));

                let mut negotiator = LoginNegotiator::new(ctx.client.clone(), method, endpoint)
                    .with_analytics(analytics);

                if msa_migration {
                    negotiator =
                        negotiator.with_migration(pipeline_status.map(PipelineStatus::from));
                }

                let mut credentials =
                    Credentials::new(email, password.unwrap_or_default()).remember(remember);

                let mut sync = negotiator.submit(&ctx.http, &credentials).await?;

                if sync.was_email_lookup() {
                    tracing::info!(status = ?negotiator.pipeline_status(), "account looked up");

                    credentials.password = prompt_password().await?;
                    sync = negotiator.submit(&ctx.http, &credentials).await?;
                }

                login_outcome(&ctx.client, &sync)
            }

            Self::Register { fields, form } => {
                tracing::info!("registering");

                let mut req = form
                    .as_deref()
                    .map(register::Req::from_query)
                    .unwrap_or_default();

                for (name, value) in fields {
                    req.push(name, value);
                }

                let destination = registration::submit(&ctx.client, &ctx.http, &req).await?;

                Ok(Outcome::Navigate(destination))
            }

            Self::Providers { auth_data } => {
                let auth_data = read_auth_data(&auth_data).await?;

                let section = LinkAccountSection::new(&auth_data, platform_name);

                Ok(Outcome::Show(section.to_string()))
            }

            Self::Link {
                auth_data,
                provider_id,
            } => {
                let auth_data = read_auth_data(&auth_data).await?;

                let section = LinkAccountSection::new(&auth_data, platform_name);
                let view = section
                    .field(&provider_id)
                    .ok_or(Problem::UnknownProvider(provider_id))?;

                eprintln!("{}…", view.in_progress_message());

                Ok(Outcome::Navigate(ctx.client.url(view.link_clicked())?))
            }

            Self::Disconnect {
                disconnect_url,
                logout_url,
            } => {
                tracing::info!(%disconnect_url, "disconnecting");

                let view = LinkAccountConfirm::new(ctx.client.clone(), disconnect_url, "", None)
                    .with_logout_url(logout_url);

                Ok(Outcome::Navigate(view.disconnect(&ctx.http).await?))
            }

            Self::Confirm {
                disconnect_url,
                user_accounts_api_url,
                email,
                name,
                dashboard_url,
            } => {
                tracing::info!(%user_accounts_api_url, "confirming linked account");

                let mut user_data = accounts::Patch::new();
                if let Some(email) = email {
                    user_data.insert("email".to_string(), Value::from(email));
                }
                if let Some(name) = name {
                    user_data.insert("name".to_string(), Value::from(name));
                }

                let view = LinkAccountConfirm::new(
                    ctx.client.clone(),
                    disconnect_url.clone(),
                    user_accounts_api_url,
                    Some(user_data).filter(|data| !data.is_empty()),
                )
                .with_dashboard_url(dashboard_url);

                match view.confirm(&ctx.http).await {
                    Ok(destination) => Ok(Outcome::Navigate(destination)),
                    Err(err @ LinkError::Confirm { .. }) => {
                        eprintln!("To undo the link, run `account disconnect {disconnect_url}`");
                        Err(err.into())
                    }
                    Err(err) => Err(err.into()),
                }
            }
        }
    }
}

/// Decide what to show after the last login request.
fn login_outcome(client: &Client, sync: &LoginSync) -> Result<Outcome, Problem> {
    if let Some(redirect_url) = sync.response.redirect_url() {
        return Ok(Outcome::Navigate(client.url(redirect_url)?));
    }

    Ok(Outcome::Show(serde_json::to_string_pretty(&sync.response)?))
}

/// Ask for a password on the terminal.
async fn prompt_password() -> Result<String, Problem> {
    let mut stderr = io::stderr();
    stderr.write_all(b"Password: ").await?;
    stderr.flush().await?;

    let line = BufReader::new(io::stdin())
        .lines()
        .next_line()
        .await?
        .ok_or(Problem::NoPassword)?;

    let password = line.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        return Err(Problem::NoPassword);
    }

    Ok(password)
}

/// Load the auth data the settings page would have been rendered with.
async fn read_auth_data(path: &Path) -> Result<AuthData, Problem> {
    let data = fs::read(path).await?;

    Ok(serde_json::from_slice(&data)?)
}

/// Problems that can happen while running a command.
#[derive(Debug, thiserror::Error)]
pub enum Problem {
    /// We had a problem reading files or the terminal.
    #[error("IO error: {0}")]
    IO(#[from] io::Error),

    /// We had a problem loading or saving JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// We couldn't set up HTTP or reach the server at all.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// We had a problem communicating with the server.
    #[error("Problem communicating with the server: {0}")]
    Server(#[from] api::Error),

    /// The server turned down the registration form.
    #[error("Registration failed: {0}")]
    Registration(#[from] RegistrationError),

    /// Linking, unlinking or confirming didn't work.
    #[error("{0}")]
    Link(#[from] LinkError),

    /// The auth data doesn't list this provider.
    #[error("No provider with ID `{0}`")]
    UnknownProvider(String),

    /// The server wants a password and we didn't get one.
    #[error("A password is required to finish logging in")]
    NoPassword,
}
