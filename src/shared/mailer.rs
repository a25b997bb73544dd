use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;

use crate::shared::config::MailConfig;

#[derive(Debug, Error)]
pub enum MailError {
  #[error("Address error: {0}")]
  AddressError(#[from] lettre::address::AddressError),

  #[error("Message error: {0}")]
  MessageError(#[from] lettre::error::Error),

  #[error("Transport error: {0}")]
  TransportError(#[from] lettre::transport::smtp::Error),

  #[error("Other error: {0}")]
  Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailAddress {
  pub name: Option<String>,
  pub address: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailMessage {
  pub from: MailAddress,
  pub to: MailAddress,
  pub subject: String,
  pub html: String,
}

/// What the transport reported back for an accepted message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageHandle {
  pub accepted: Vec<String>,
  pub response: String,
}

pub trait Mailer {
  async fn send_mail(
    &self,
    message: MailMessage,
  ) -> Result<MessageHandle, MailError>;

  /// Link under which the test mail service shows the sent message, if any.
  fn test_message_url(&self, handle: &MessageHandle) -> Option<String>;
}

#[derive(Clone)]
pub struct SmtpMailer {
  transport: AsyncSmtpTransport<Tokio1Executor>,
  preview_base_url: String,
}

impl SmtpMailer {
  pub fn new(config: &MailConfig) -> Result<Self, MailError> {
    let transport =
      AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
        .port(config.smtp_port)
        .credentials(Credentials::new(
          config.smtp_username.clone(),
          config.smtp_password.clone(),
        ))
        .build();
    Ok(Self {
      transport,
      preview_base_url: config.preview_base_url.clone(),
    })
  }
}

impl Mailer for SmtpMailer {
  async fn send_mail(
    &self,
    message: MailMessage,
  ) -> Result<MessageHandle, MailError> {
    let email = Message::builder()
      .from(to_mailbox(&message.from)?)
      .to(to_mailbox(&message.to)?)
      .subject(message.subject)
      .header(ContentType::TEXT_HTML)
      .body(message.html)?;

    let response = self.transport.send(email).await?;
    let lines: Vec<String> =
      response.message().map(|line| line.to_string()).collect();

    Ok(MessageHandle {
      accepted: vec![message.to.address],
      response: format!("{} {}", response.code(), lines.join(" ")),
    })
  }

  fn test_message_url(&self, handle: &MessageHandle) -> Option<String> {
    test_message_url(&self.preview_base_url, &handle.response)
  }
}

fn to_mailbox(address: &MailAddress) -> Result<Mailbox, MailError> {
  let email = address.address.parse::<Address>()?;
  Ok(Mailbox::new(address.name.clone(), email))
}

/// Reads the `[STATUS=.. MSGID=..]` trailer a test SMTP sandbox appends to
/// its acceptance line and turns the message id into a web preview link.
pub fn test_message_url(base_url: &str, response: &str) -> Option<String> {
  let trailer = response.trim_end().strip_suffix(']')?;
  let (_, properties) = trailer.rsplit_once('[')?;

  let mut status = None;
  let mut message_id = None;
  for property in properties.split_whitespace() {
    match property.split_once('=') {
      Some(("STATUS", value)) => status = Some(value),
      Some(("MSGID", value)) => message_id = Some(value),
      _ => {}
    }
  }

  status?;
  let message_id = message_id.filter(|id| !id.is_empty())?;
  Some(format!(
    "{}/message/{}",
    base_url.trim_end_matches('/'),
    message_id
  ))
}
