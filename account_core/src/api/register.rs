use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Where the account creation endpoint lives.
pub const PATH: &str = "/create_account";

/// The registration form, as ordered name/value pairs. Field names vary by
/// deployment, so we don't try to model them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Req(Vec<(String, String)>);

impl Req {
    /// An empty form.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field, builder-style.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(name, value);
        self
    }

    /// Add a field.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.push((name.into(), value.into()));
    }

    /// Parse an already-serialized form, like `email=a%40b.com&name=A`.
    pub fn from_query(query: &str) -> Self {
        url::form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect()
    }

    /// The value of the first field with this name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value.as_str())
    }

    /// All the fields, in order.
    pub fn fields(&self) -> &[(String, String)] {
        &self.0
    }
}

impl FromIterator<(String, String)> for Req {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Result of registering a new account.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Resp {
    /// Where to send the user next, if the server has an opinion.
    #[serde(default)]
    pub redirect_url: Option<String>,

    /// Everything else in the response.
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}
