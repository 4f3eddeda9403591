use std::sync::Arc;

use askama::Template;
use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::SmtpConfig;

pub const MUTUAL_SYMPATHY_SUBJECT: &str = "Mutual sympathy";

/// One email to send: `recipient_email` learns who liked them back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutualMatch {
    pub recipient_email: String,
    pub matched_username: String,
    pub matched_email: String,
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("smtp transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
    #[error("invalid address {address}: {source}")]
    Address {
        address: String,
        source: lettre::address::AddressError,
    },
    #[error("failed to build message: {0}")]
    Message(#[from] lettre::error::Error),
    #[error("failed to render template: {0}")]
    Template(#[from] askama::Error),
    #[error("notification delivery failed for {failed} of {total} recipients")]
    NotificationDeliveryFailed { failed: usize, total: usize },
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify_mutual_match(&self, matches: &[MutualMatch]) -> Result<(), NotifyError>;
}

#[derive(Template)]
#[template(path = "mutual_match.txt")]
struct MutualMatchTemplate<'a> {
    matched_username: &'a str,
    matched_email: &'a str,
}

pub fn render_mutual_match_body(m: &MutualMatch) -> Result<String, NotifyError> {
    let template = MutualMatchTemplate {
        matched_username: &m.matched_username,
        matched_email: &m.matched_email,
    };
    Ok(template.render()?)
}

/// Both parties of a mutual match, each told about the other.
pub fn mutual_match_pair(
    rater_username: &str,
    rater_email: &str,
    rated_username: &str,
    rated_email: &str,
) -> Vec<MutualMatch> {
    vec![
        MutualMatch {
            recipient_email: rater_email.to_string(),
            matched_username: rated_username.to_string(),
            matched_email: rated_email.to_string(),
        },
        MutualMatch {
            recipient_email: rated_email.to_string(),
            matched_username: rater_username.to_string(),
            matched_email: rater_email.to_string(),
        },
    ]
}

/// Fire-and-forget: the rating is already committed, so failures are only logged.
pub fn dispatch_mutual_match(notifier: Arc<dyn Notifier>, matches: Vec<MutualMatch>) {
    tokio::spawn(async move {
        if let Err(e) = notifier.notify_mutual_match(&matches).await {
            warn!(error = %e, recipients = matches.len(), "mutual match notification failed");
        }
    });
}

pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpNotifier {
    pub fn new(config: &SmtpConfig) -> Result<Self, NotifyError> {
        let from = parse_mailbox(&config.from)?;
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?
            .port(config.port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .build();
        Ok(Self { transport, from })
    }

    fn build_message(&self, m: &MutualMatch) -> Result<Message, NotifyError> {
        Ok(Message::builder()
            .from(self.from.clone())
            .to(parse_mailbox(&m.recipient_email)?)
            .subject(MUTUAL_SYMPATHY_SUBJECT)
            .header(ContentType::TEXT_PLAIN)
            .body(render_mutual_match_body(m)?)?)
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn notify_mutual_match(&self, matches: &[MutualMatch]) -> Result<(), NotifyError> {
        let mut failed = 0;
        for m in matches {
            let sent = match self.build_message(m) {
                Ok(message) => self.transport.send(message).await.map_err(NotifyError::from),
                Err(e) => Err(e),
            };
            match sent {
                Ok(_) => info!(recipient = %m.recipient_email, "mutual match email sent"),
                Err(e) => {
                    warn!(recipient = %m.recipient_email, error = %e, "mutual match email failed");
                    failed += 1;
                }
            }
        }

        if failed > 0 {
            return Err(NotifyError::NotificationDeliveryFailed {
                failed,
                total: matches.len(),
            });
        }
        Ok(())
    }
}

/// Used when SMTP is not configured.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify_mutual_match(&self, matches: &[MutualMatch]) -> Result<(), NotifyError> {
        for m in matches {
            let body = render_mutual_match_body(m)?;
            info!(recipient = %m.recipient_email, %body, "mutual match (email disabled)");
        }
        Ok(())
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, NotifyError> {
    address.parse().map_err(|source| NotifyError::Address {
        address: address.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_tells_each_party_about_the_other() {
        let pair = mutual_match_pair("anna", "anna@example.com", "boris", "boris@example.com");
        assert_eq!(pair.len(), 2);
        assert_eq!(pair[0].recipient_email, "anna@example.com");
        assert_eq!(pair[0].matched_username, "boris");
        assert_eq!(pair[0].matched_email, "boris@example.com");
        assert_eq!(pair[1].recipient_email, "boris@example.com");
        assert_eq!(pair[1].matched_username, "anna");
        assert_eq!(pair[1].matched_email, "anna@example.com");
    }

    #[test]
    fn body_names_the_matched_participant() {
        let pair = mutual_match_pair("anna", "anna@example.com", "boris", "boris@example.com");
        let body = render_mutual_match_body(&pair[0]).unwrap();
        assert_eq!(body.trim_end(), "Вы понравились boris! Почта участника: boris@example.com");
        assert!(body.contains("boris@example.com"));
    }

    #[tokio::test]
    async fn smtp_notifier_rejects_bad_sender_address() {
        let config = SmtpConfig {
            host: "smtp.example.com".to_string(),
            port: 587,
            username: "user".to_string(),
            password: "secret".to_string(),
            from: "not an address".to_string(),
        };
        assert!(matches!(
            SmtpNotifier::new(&config),
            Err(NotifyError::Address { .. })
        ));
    }

    #[tokio::test]
    async fn log_notifier_never_fails() {
        let pair = mutual_match_pair("anna", "anna@example.com", "boris", "boris@example.com");
        assert!(LogNotifier.notify_mutual_match(&pair).await.is_ok());
    }
}
