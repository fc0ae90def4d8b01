use account_core::api::login;
use account_core::link_account::confirm::{DEFAULT_DASHBOARD_URL, DEFAULT_LOGOUT_URL};
use clap::{Parser, Subcommand};
use reqwest::Method;
use std::path::PathBuf;
use url::Url;

/// Manage a learning platform account from the command line
#[derive(Debug, Parser)]
#[clap(version)]
pub struct Config {
    /// The platform to talk to, e.g. `https://courses.example.com`
    #[clap(long, env = "ACCOUNT_SERVER", default_value = "http://localhost:18000")]
    pub server: Url,

    /// Anti-forgery token to send. If unset, we visit the server first and
    /// read it from the `csrftoken` cookie.
    #[clap(long, env = "ACCOUNT_CSRF_TOKEN")]
    pub csrf_token: Option<String>,

    /// What the platform calls itself in messages
    #[clap(long, env = "ACCOUNT_PLATFORM_NAME", default_value = "the platform")]
    pub platform_name: String,

    /// What to do
    #[clap(subcommand)]
    pub command: Command,
}

/// Things we know how to do
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in, asking for a password if the server wants one after looking
    /// the account up
    Login {
        /// Email to log in with
        #[clap(long)]
        email: String,

        /// Password. Leave unset to start with an account lookup.
        #[clap(long, env = "ACCOUNT_PASSWORD", hide_env_values = true)]
        password: Option<String>,

        /// Keep the session around
        #[clap(long)]
        remember: bool,

        /// Take part in the account migration login flow
        #[clap(long, env = "ACCOUNT_MSA_MIGRATION")]
        msa_migration: bool,

        /// A pipeline status to start from, e.g. one the login page was
        /// rendered with
        #[clap(long)]
        pipeline_status: Option<String>,

        /// Course to attribute the login to in analytics
        #[clap(long, conflicts_with = "page_url")]
        course_id: Option<String>,

        /// Page the login started from. Its `course_id` query parameter is
        /// used for analytics.
        #[clap(long)]
        page_url: Option<Url>,

        /// Login endpoint
        #[clap(long, default_value = login::PATH)]
        endpoint: String,

        /// HTTP method for the login endpoint
        #[clap(long, default_value = "POST")]
        method: Method,
    },

    /// Create an account
    Register {
        /// Form fields as `name=value`
        #[clap(value_parser = parse_field)]
        fields: Vec<(String, String)>,

        /// An already-serialized form, like `email=a%40b.com&name=Ada`.
        /// Fields given separately are added after these.
        #[clap(long)]
        form: Option<String>,
    },

    /// Show the linked accounts section
    Providers {
        /// JSON file with the page's third-party auth data
        #[clap(long)]
        auth_data: PathBuf,
    },

    /// Start linking a provider
    Link {
        /// JSON file with the page's third-party auth data
        #[clap(long)]
        auth_data: PathBuf,

        /// Which provider to link, e.g. `oa2-google-oauth2`
        provider_id: String,
    },

    /// Unlink a provider
    Disconnect {
        /// Where to post to unlink
        disconnect_url: String,

        /// Where to go afterwards
        #[clap(long, default_value = DEFAULT_LOGOUT_URL)]
        logout_url: String,
    },

    /// Save the profile details a newly linked provider brought along
    Confirm {
        /// Where to post to unlink, shown if confirming fails
        #[clap(long)]
        disconnect_url: String,

        /// The user accounts API resource to update
        user_accounts_api_url: String,

        /// New email
        #[clap(long)]
        email: Option<String>,

        /// New full name
        #[clap(long)]
        name: Option<String>,

        /// Where to go afterwards
        #[clap(long, default_value = DEFAULT_DASHBOARD_URL)]
        dashboard_url: String,
    },
}

/// Parse a `name=value` pair.
fn parse_field(field: &str) -> Result<(String, String), String> {
    field
        .split_once('=')
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected name=value, got `{field}`"))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_field_splits_on_first_equals() {
        assert_eq!(
            parse_field("password=a=b"),
            Ok(("password".to_string(), "a=b".to_string()))
        );
    }

    #[test]
    fn parse_field_requires_equals() {
        assert!(parse_field("email").is_err());
    }

    #[test]
    fn login_defaults() {
        let config = Config::parse_from(["account", "login", "--email", "a@b.com"]);

        match config.command {
            Command::Login {
                email,
                password,
                msa_migration,
                endpoint,
                method,
                ..
            } => {
                assert_eq!(email, "a@b.com");
                assert_eq!(password, None);
                assert!(!msa_migration);
                assert_eq!(endpoint, login::PATH);
                assert_eq!(method, Method::POST);
            }
            other => panic!("expected login, got {other:?}"),
        }
    }

    #[test]
    fn login_flags_belong_to_login() {
        let config = Config::parse_from([
            "account",
            "login",
            "--email",
            "a@b.com",
            "--msa-migration",
            "--course-id",
            "course-v1:X+Y+Z",
        ]);

        match config.command {
            Command::Login {
                msa_migration,
                course_id,
                ..
            } => {
                assert!(msa_migration);
                assert_eq!(course_id.as_deref(), Some("course-v1:X+Y+Z"));
            }
            other => panic!("expected login, got {other:?}"),
        }

        assert!(Config::try_parse_from([
            "account",
            "--msa-migration",
            "login",
            "--email",
            "a@b.com",
        ])
        .is_err());
    }

    #[test]
    fn config_is_valid() {
        use clap::CommandFactory;

        Config::command().debug_assert();
    }
}
