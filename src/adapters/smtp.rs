use crate::config::NotificationConfig;
use crate::domain::ports::Notifier;
use crate::utils::error::Result;
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

/// Sends the notification through an authenticated STARTTLS session.
///
/// Every call opens its own connection, upgrades it, logs in, sends and quits,
/// so a failure anywhere in that sequence is one failed attempt.
pub struct SmtpNotifier {
    config: NotificationConfig,
    starttls: bool,
}

impl SmtpNotifier {
    pub fn new(config: NotificationConfig) -> Self {
        Self {
            config,
            starttls: true,
        }
    }

    /// Plaintext session against a local test server.
    #[cfg(test)]
    fn plaintext(config: NotificationConfig) -> Self {
        Self {
            config,
            starttls: false,
        }
    }

    pub fn build_message(&self, body: &str) -> Result<Message> {
        let message = Message::builder()
            .from(self.config.sender().parse::<Mailbox>()?)
            .to(self.config.to.parse::<Mailbox>()?)
            .subject(self.config.subject.clone())
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())?;
        Ok(message)
    }

    fn transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>> {
        let builder = if self.starttls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.smtp_host)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&self.config.smtp_host)
        };
        let transport = builder
            .port(self.config.smtp_port)
            .credentials(Credentials::new(
                self.config.username.clone(),
                self.config.password.clone(),
            ))
            .build();
        Ok(transport)
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn notify(&self, body: &str) -> Result<()> {
        let message = self.build_message(body)?;

        if tracing::enabled!(tracing::Level::DEBUG) {
            tracing::debug!("Subject: {}", self.config.subject);
            tracing::debug!("From: {}", self.config.sender());
            tracing::debug!("To: {}", self.config.to);
            tracing::debug!("{}", String::from_utf8_lossy(&message.formatted()));
        }

        let transport = self.transport()?;
        tracing::debug!(
            "Connecting to {}:{}",
            self.config.smtp_host,
            self.config.smtp_port
        );
        transport.send(message).await?;

        tracing::debug!("SMTP server accepted the message");
        Ok(())
    }
}
