//! SMTP transport via `lettre`.

use async_trait::async_trait;
use lettre::{
    message::header::ContentType, transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use super::{EmailMessage, MailClient, MailError};

pub struct SmtpMailClient {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    sender: String,
}

impl SmtpMailClient {
    pub fn new(
        host: &str,
        port: u16,
        username: String,
        password: String,
        sender: impl Into<String>,
    ) -> Result<Self, MailError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(host)
            .map_err(|e| MailError::Delivery(format!("failed to create SMTP transport: {e}")))?
            .port(port)
            .credentials(Credentials::new(username, password))
            .build();

        Ok(Self {
            transport,
            sender: sender.into(),
        })
    }
}

#[async_trait]
impl MailClient for SmtpMailClient {
    async fn send(&self, message: EmailMessage) -> Result<(), MailError> {
        let email = Message::builder()
            .from(
                self.sender
                    .parse()
                    .map_err(|e| MailError::Address(format!("sender: {e}")))?,
            )
            .to(message
                .to
                .parse()
                .map_err(|e| MailError::Address(format!("recipient: {e}")))?)
            .subject(&message.subject)
            .header(ContentType::TEXT_PLAIN)
            .body(message.body)
            .map_err(|e| MailError::Delivery(format!("failed to build email: {e}")))?;

        self.transport
            .send(email)
            .await
            .map_err(|e| MailError::Delivery(e.to_string()))?;

        Ok(())
    }

    fn sender(&self) -> &str {
        &self.sender
    }
}
