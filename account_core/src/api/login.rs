use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt::{self, Display};

/// Where the login endpoint usually lives. Negotiators take the endpoint
/// explicitly, so this is only a default.
pub const PATH: &str = "/user_api/v1/account/login_session/";

/// Sent in place of a password to ask the server whether an account has been
/// migrated, without checking any credentials.
pub const EMAIL_LOOKUP_PASSWORD: &str = "msa_email_lookup";

/// The request to log into the server. Sent form-encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Req {
    /// Email to log in with.
    pub email: String,

    /// Plaintext password, or `EMAIL_LOOKUP_PASSWORD` for an email lookup.
    pub password: String,

    /// Keep the session around after the browser closes.
    pub remember: bool,

    /// Serialized analytics context, e.g. the course being enrolled in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analytics: Option<String>,

    /// Where we are in the account migration flow. Only sent when migration
    /// is enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msa_migration_pipeline_status: Option<PipelineStatus>,
}

impl Req {
    /// Is this an email lookup rather than a real credential check?
    pub fn is_email_lookup(&self) -> bool {
        self.password == EMAIL_LOOKUP_PASSWORD
    }
}

/// Result of logging in. Anything other than `value` is handed back to the
/// caller untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Resp {
    /// The new migration pipeline status, if the server sent one. An explicit
    /// `null` is `Some(Value::Null)`, not `None`.
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub value: Option<Value>,

    /// Everything else in the response.
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

impl Resp {
    /// The pipeline status the server wants us to adopt. Strings are taken
    /// as-is and `null` clears the status. Anything else is stringified,
    /// since it will go back to the server in a form field anyway.
    pub fn pipeline_status(&self) -> Option<PipelineStatus> {
        match self.value.as_ref()? {
            Value::String(status) => Some(PipelineStatus::from(status.as_str())),
            Value::Null => Some(PipelineStatus::cleared()),
            other => Some(PipelineStatus::from(other.to_string())),
        }
    }

    /// Where the server would like the user to go after logging in.
    pub fn redirect_url(&self) -> Option<&str> {
        self.rest
            .get("redirect_url")
            .and_then(Value::as_str)
            .filter(|url| !url.is_empty())
    }
}

/// Wrap whatever was sent, `null` included, so a present key is always `Some`.
/// Absent keys fall back to `default`.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// A server-assigned marker for which step of the migration login flow the
/// client is in. The empty status means "cleared".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PipelineStatus(String);

impl PipelineStatus {
    /// The first step: ask whether the account has been migrated.
    pub const EMAIL_LOOKUP: &'static str = "email_lookup";

    /// The account exists but hasn't been migrated.
    pub const LOGIN_NOT_MIGRATED: &'static str = "login_not_migrated";

    /// The status we start with when migration is enabled.
    pub fn email_lookup() -> Self {
        Self(Self::EMAIL_LOOKUP.to_string())
    }

    /// See `LOGIN_NOT_MIGRATED`.
    pub fn login_not_migrated() -> Self {
        Self(Self::LOGIN_NOT_MIGRATED.to_string())
    }

    /// No status at all.
    pub fn cleared() -> Self {
        Self(String::new())
    }

    /// Has the status been cleared?
    pub fn is_cleared(&self) -> bool {
        self.0.is_empty()
    }

    /// Is this `login_not_migrated`?
    pub fn is_login_not_migrated(&self) -> bool {
        self.0 == Self::LOGIN_NOT_MIGRATED
    }

    /// The status as sent over the wire.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for PipelineStatus {
    fn from(status: String) -> Self {
        Self(status)
    }
}

impl From<&str> for PipelineStatus {
    fn from(status: &str) -> Self {
        Self(status.to_string())
    }
}

impl Display for PipelineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
