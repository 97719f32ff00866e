use std::future::Future;

use export_config::shared::NotificationConfig;
use tracing::{debug, warn};

use crate::error::{ErrorKind, ExportError, ExportResult};
use crate::export_error;
use crate::notify::base::{Notifier, Recipient, RunFailure, RunInfo};
use crate::notify::template;
use crate::retry::RetryPolicy;

/// A rendered notification mail ready for a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mail {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub body: String,
}

/// Sends rendered mails through a concrete provider.
pub trait NotificationTransport {
    fn send(&self, mail: &Mail) -> impl Future<Output = ExportResult<()>> + Send;
}

/// Notifier that delivers lifecycle mails through a [`NotificationTransport`].
///
/// Start and failure events go to the team address list; completion events go
/// to both the team and the client lists. Sends are wrapped in the
/// notification retry policy, and an exhausted send surfaces as
/// [`ErrorKind::NotificationFailed`].
#[derive(Debug, Clone)]
pub struct MailNotifier<T> {
    config: NotificationConfig,
    transport: T,
    retry: RetryPolicy,
}

impl<T: NotificationTransport + Sync> MailNotifier<T> {
    /// Creates a mail notifier, validating the configured addresses up front.
    pub fn new(
        config: NotificationConfig,
        transport: T,
        retry: RetryPolicy,
    ) -> ExportResult<Self> {
        config.validate()?;

        Ok(Self {
            config,
            transport,
            retry,
        })
    }

    /// Expands symbolic recipient groups into addresses, deduplicated while
    /// preserving order.
    fn resolve_recipients(&self, recipients: &[Recipient]) -> Vec<String> {
        let mut resolved = Vec::new();
        for recipient in recipients {
            let addresses: &[String] = match recipient {
                Recipient::Team => &self.config.team_mails,
                Recipient::Clients => &self.config.client_mails,
                Recipient::Address(address) => std::slice::from_ref(address),
            };

            for address in addresses {
                if !resolved.contains(address) {
                    resolved.push(address.clone());
                }
            }
        }

        resolved
    }

    async fn send(
        &self,
        recipients: &[Recipient],
        subject: String,
        body: String,
    ) -> ExportResult<()> {
        let to = self.resolve_recipients(recipients);
        if to.is_empty() {
            warn!(subject = subject.as_str(), "no recipients configured, skipping notification");
            return Ok(());
        }

        let mail = Mail {
            from: self.config.mail_from.clone(),
            to,
            subject,
            body,
        };

        let transport = &self.transport;
        self.retry
            .execute("send_mail", || transport.send(&mail))
            .await
            .map_err(|err| {
                export_error!(
                    ErrorKind::NotificationFailed,
                    "Failed to send notification mail after exhausting retries",
                    format!("{}: {err}", mail.subject)
                )
            })?;

        debug!(
            subject = mail.subject.as_str(),
            recipients = mail.to.len(),
            "notification mail sent"
        );

        Ok(())
    }
}

impl<T: NotificationTransport + Sync> Notifier for MailNotifier<T> {
    async fn notify_start(&self, run: &RunInfo) -> ExportResult<()> {
        let client_name = &self.config.client_name;
        self.send(
            &[Recipient::Team],
            template::start_subject(client_name, run),
            template::start_body(client_name, run),
        )
        .await
    }

    async fn notify_complete(&self, run: &RunInfo, items_count: u64) -> ExportResult<()> {
        let client_name = &self.config.client_name;
        self.send(
            &[Recipient::Team, Recipient::Clients],
            template::complete_subject(client_name, run),
            template::complete_body(client_name, run, items_count),
        )
        .await
    }

    async fn notify_failure(&self, run: &RunInfo, failure: &RunFailure) -> ExportResult<()> {
        let client_name = &self.config.client_name;
        self.send(
            &[Recipient::Team],
            template::failure_subject(client_name, run),
            template::failure_body(client_name, run, failure),
        )
        .await
    }
}
