use super::{LinkAccountView, LinkField};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// Third-party auth data the settings page is rendered with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthData {
    /// Every provider the user could link.
    #[serde(default)]
    pub providers: Vec<Provider>,
}

/// A third-party sign-in provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provider {
    /// Stable identifier, e.g. `oa2-google-oauth2`.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Already linked to this account?
    #[serde(default)]
    pub connected: bool,

    /// Where to start linking.
    pub connect_url: String,

    /// Where to post to unlink.
    #[serde(default)]
    pub disconnect_url: String,

    /// Can be used to sign in.
    #[serde(default)]
    pub accepts_logins: bool,
}

/// The "Linked Accounts" section of the account settings page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkAccountSection {
    /// Section heading.
    pub title: String,

    /// Explanation under the heading.
    pub subtitle: String,

    /// One field per provider, in the order the server listed them.
    pub fields: Vec<LinkAccountView>,
}

impl LinkAccountSection {
    /// Build the section from the page's auth data.
    pub fn new(auth_data: &AuthData, platform_name: &str) -> Self {
        Self {
            title: "Linked Accounts".to_string(),
            subtitle: format!(
                "You can link your social media accounts to simplify signing in to {platform_name}."
            ),
            fields: auth_data
                .providers
                .iter()
                .map(|provider| LinkAccountView::for_provider(provider, platform_name))
                .collect(),
        }
    }

    /// Render every field.
    pub fn render(&self) -> Vec<LinkField> {
        self.fields.iter().map(LinkAccountView::render).collect()
    }

    /// Find the field for a provider by its ID.
    pub fn field(&self, provider_id: &str) -> Option<&LinkAccountView> {
        let value_attribute = format!("auth-{provider_id}");

        self.fields
            .iter()
            .find(|field| field.value_attribute == value_attribute)
    }
}

impl Display for LinkAccountSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        writeln!(f, "{}", self.subtitle)?;

        for field in self.render() {
            writeln!(f)?;
            writeln!(f, "{field}")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    fn auth_data() -> AuthData {
        serde_json::from_value(json!({
            "providers": [
                {
                    "id": "oa2-google-oauth2",
                    "name": "Google",
                    "connected": true,
                    "connect_url": "/auth/login/google-oauth2/",
                    "disconnect_url": "/auth/disconnect/google-oauth2/",
                    "accepts_logins": true
                },
                {
                    "id": "saml-testshib",
                    "name": "TestShib",
                    "connect_url": "/auth/login/tpa-saml/?idp=testshib"
                }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn one_field_per_provider() {
        let section = LinkAccountSection::new(&auth_data(), "Learning Hub");

        assert_eq!(section.title, "Linked Accounts");
        assert_eq!(
            section.subtitle,
            "You can link your social media accounts to simplify signing in to Learning Hub."
        );
        assert_eq!(
            section
                .fields
                .iter()
                .map(|field| field.value_attribute.as_str())
                .collect::<Vec<_>>(),
            vec!["auth-oa2-google-oauth2", "auth-saml-testshib"]
        );
    }

    #[test]
    fn missing_provider_fields_default() {
        let section = LinkAccountSection::new(&auth_data(), "LH");

        let shib = section.field("saml-testshib").unwrap();

        assert!(!shib.connected);
        assert!(!shib.accepts_logins);
        assert!(shib.disconnect_url.is_empty());
    }

    #[test]
    fn display_lists_fields() {
        let rendered = LinkAccountSection::new(&auth_data(), "LH").to_string();

        assert!(rendered.starts_with("Linked Accounts\n"));
        assert!(rendered.contains("[auth-oa2-google-oauth2] Google (Sign in with Google)"));
        assert!(rendered.contains("[auth-saml-testshib] TestShib"));
    }
}
