//! Outbound SMTP: the welcome message sent on self-registration.
//!
//! An empty host means mail is unconfigured — sends are skipped with a
//! warning and the caller proceeds. When configured, transport failures
//! propagate so registration surfaces them.

use lettre::{
  AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
  message::header::ContentType,
  transport::smtp::authentication::Credentials,
};
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SmtpConfig {
  pub host:     String,
  pub port:     u16,
  pub username: String,
  pub password: String,
  pub starttls: bool,
  pub from:     String,
}

impl Default for SmtpConfig {
  fn default() -> Self {
    SmtpConfig {
      host:     String::new(),
      port:     587,
      username: String::new(),
      password: String::new(),
      starttls: true,
      from:     "Roster <no-reply@localhost>".to_owned(),
    }
  }
}

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid mailbox address: {0}")]
  Address(#[from] lettre::address::AddressError),

  #[error("could not build message: {0}")]
  Build(#[from] lettre::error::Error),

  #[error("smtp transport: {0}")]
  Transport(#[from] lettre::transport::smtp::Error),
}

/// Async SMTP sender. `transport` is `None` when unconfigured.
pub struct Mailer {
  transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
  from:      String,
}

impl Mailer {
  pub fn from_config(config: &SmtpConfig) -> Result<Self, Error> {
    if config.host.is_empty() {
      return Ok(Mailer { transport: None, from: config.from.clone() });
    }

    let mut builder = if config.starttls {
      AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?
    } else {
      AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
    };
    builder = builder.port(config.port);
    if !config.username.is_empty() {
      builder = builder.credentials(Credentials::new(
        config.username.clone(),
        config.password.clone(),
      ));
    }

    Ok(Mailer {
      transport: Some(builder.build()),
      from:      config.from.clone(),
    })
  }

  /// Send the welcome message. A no-op (with a warning) when unconfigured;
  /// transport failures are returned to the caller.
  pub async fn send_welcome(
    &self,
    full_name: &str,
    email: &str,
  ) -> Result<(), Error> {
    let Some(transport) = &self.transport else {
      warn!(email, "SMTP not configured; skipping welcome email");
      return Ok(());
    };

    let body = format!(
      "<html><body>\
       <h2>Welcome to Roster, {full_name}!</h2>\
       <p>Your account has been created. You can now sign in with this \
       email address.</p>\
       </body></html>"
    );

    let message = Message::builder()
      .from(self.from.parse()?)
      .to(email.parse()?)
      .subject("Welcome to Roster")
      .header(ContentType::TEXT_HTML)
      .body(body)?;

    transport.send(message).await?;
    info!(email, "welcome email sent");
    Ok(())
  }
}
