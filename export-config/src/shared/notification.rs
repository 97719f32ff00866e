use secrecy::Secret;
use serde::{Deserialize, Serialize};

use crate::SerializableSecretString;
use crate::shared::{ValidationError, require_option};

/// Environment fallback for the mail transport access key.
pub const MAIL_ACCESS_KEY_ENV: &str = "EXPORT_MAIL_ACCESS_KEY";

/// Environment fallback for the mail transport secret key.
pub const MAIL_SECRET_KEY_ENV: &str = "EXPORT_MAIL_SECRET_KEY";

/// Default sender address for mail notifications.
const DEFAULT_MAIL_FROM: &str = "Export pipeline <exports@localhost>";

/// Configuration for run notifications.
///
/// Symbolic recipient groups ("team" and "client") resolve to the address lists
/// configured here; literal addresses pass through unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct NotificationConfig {
    /// Addresses behind the "team" recipient group.
    #[serde(default)]
    pub team_mails: Vec<String>,

    /// Addresses behind the "client" recipient group.
    #[serde(default)]
    pub client_mails: Vec<String>,

    /// Client name rendered into notification subjects and bodies.
    #[serde(default = "default_client_name")]
    pub client_name: String,

    /// Sender address for mail notifications.
    #[serde(default = "default_mail_from")]
    pub mail_from: String,

    /// Transport access key. Falls back to `EXPORT_MAIL_ACCESS_KEY`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_key: Option<SerializableSecretString>,

    /// Transport secret key. Falls back to `EXPORT_MAIL_SECRET_KEY`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_key: Option<SerializableSecretString>,
}

fn default_client_name() -> String {
    "Customer".to_string()
}

fn default_mail_from() -> String {
    DEFAULT_MAIL_FROM.to_string()
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            team_mails: Vec::new(),
            client_mails: Vec::new(),
            client_name: default_client_name(),
            mail_from: default_mail_from(),
            access_key: None,
            secret_key: None,
        }
    }
}

impl NotificationConfig {
    /// Resolves the transport access key with its environment fallback.
    ///
    /// Precedence is explicit value > environment variable; a credential that is
    /// available through neither is a construction-time error.
    pub fn resolved_access_key(&self) -> Result<Secret<String>, ValidationError> {
        resolve_credential(&self.access_key, "access_key", MAIL_ACCESS_KEY_ENV)
    }

    /// Resolves the transport secret key with its environment fallback.
    pub fn resolved_secret_key(&self) -> Result<Secret<String>, ValidationError> {
        resolve_credential(&self.secret_key, "secret_key", MAIL_SECRET_KEY_ENV)
    }

    /// Validates the notification configuration.
    ///
    /// Every configured address, in both groups, must look like a mail address.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for mail in self.team_mails.iter().chain(self.client_mails.iter()) {
            if !mail.contains('@') {
                return Err(ValidationError::InvalidOption {
                    key: "team_mails/client_mails",
                    reason: format!("`{mail}` is not a valid mail address"),
                });
            }
        }

        Ok(())
    }
}

fn resolve_credential(
    explicit: &Option<SerializableSecretString>,
    key: &'static str,
    env_name: &'static str,
) -> Result<Secret<String>, ValidationError> {
    use secrecy::ExposeSecret;

    let explicit = explicit
        .as_ref()
        .map(|secret| secret.expose_secret().clone());

    require_option(explicit, key, env_name).map(Secret::new)
}
