use super::Provider;
use std::fmt::{self, Display};

/// Class applied to the link when the provider can be used to sign in.
pub const UNLINKED_CLASS: &str = "social-field-unlinked";

/// One provider in the linked accounts section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkAccountView {
    /// The provider's display name, e.g. "Microsoft".
    pub title: String,

    /// `auth-<provider id>`, used to tell fields apart.
    pub value_attribute: String,

    /// Shown under the field.
    pub help_message: String,

    /// Is the provider already linked to this account?
    pub connected: bool,

    /// Where to send the user to start linking.
    pub connect_url: String,

    /// Where to post to unlink.
    pub disconnect_url: String,

    /// Can the provider be used to sign in?
    pub accepts_logins: bool,

    /// What the platform calls itself.
    pub platform_name: String,
}

impl LinkAccountView {
    /// Build the field for one provider.
    pub fn for_provider(provider: &Provider, platform_name: &str) -> Self {
        Self {
            title: provider.name.clone(),
            value_attribute: format!("auth-{}", provider.id),
            help_message: String::new(),
            connected: provider.connected,
            connect_url: provider.connect_url.clone(),
            disconnect_url: provider.disconnect_url.clone(),
            accepts_logins: provider.accepts_logins,
            platform_name: platform_name.to_string(),
        }
    }

    /// CSS-ish class list for the field.
    pub fn class_name(&self) -> String {
        format!("u-field u-field-social u-field-{}", self.value_attribute)
    }

    /// What a screen reader should announce for the link.
    pub fn screen_reader_title(&self) -> String {
        format!("Sign in with {}", self.title)
    }

    /// Shown while we're waiting to leave for the provider.
    pub fn in_progress_message(&self) -> &'static str {
        if self.connected {
            "Unlinking"
        } else {
            "Linking"
        }
    }

    /// The user clicked the link. Returns where they should go to start the
    /// provider's sign-in flow.
    pub fn link_clicked(&self) -> &str {
        tracing::debug!(provider = %self.title, "{}", self.in_progress_message());

        &self.connect_url
    }

    /// Work out what to display.
    pub fn render(&self) -> LinkField {
        let screen_reader_title = self.screen_reader_title();

        let (link_title, link_class, sub_title) = if self.accepts_logins {
            (
                screen_reader_title.clone(),
                UNLINKED_CLASS.to_string(),
                format!(
                    "Link your {account} account to your {platform} account and use {account} to sign in to {platform}.",
                    account = self.title,
                    platform = self.platform_name,
                ),
            )
        } else {
            (String::new(), String::new(), String::new())
        };

        LinkField {
            id: self.value_attribute.clone(),
            class_name: self.class_name(),
            title: self.title.clone(),
            screen_reader_title,
            link_title,
            sub_title,
            link_class,
            link_href: "#".to_string(),
            message: self.help_message.clone(),
        }
    }
}

/// Everything needed to draw one provider field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkField {
    /// Identifies the field.
    pub id: String,

    /// Class list for the field container.
    pub class_name: String,

    /// The provider's display name.
    pub title: String,

    /// What a screen reader announces.
    pub screen_reader_title: String,

    /// Text of the link. Empty for providers that don't accept logins.
    pub link_title: String,

    /// Explanation under the title.
    pub sub_title: String,

    /// Class for the link itself.
    pub link_class: String,

    /// Where the link points before it's clicked.
    pub link_href: String,

    /// Help text.
    pub message: String,
}

impl Display for LinkField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.id, self.title)?;

        if !self.link_title.is_empty() {
            write!(f, " ({})", self.link_title)?;
        }

        if !self.sub_title.is_empty() {
            write!(f, "\n    {}", self.sub_title)?;
        }

        if !self.message.is_empty() {
            write!(f, "\n    {}", self.message)?;
        }

        Ok(())
    }
}
