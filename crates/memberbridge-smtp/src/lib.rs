// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! SMTP mail client for memberbridge.
//!
//! Sends the plain-text account mails (new account, password reset, no account
//! found) through an SMTP relay using [`lettre`]. The relay password is a
//! [`SecretString`] and never appears in logs.
//!
//! # Example
//!
//! ```no_run
//! use memberbridge_smtp::{SmtpClient, SmtpConfig, TlsMode};
//! use memberbridge_common_secret::SecretString;
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), memberbridge_smtp::SmtpError> {
//! let config = SmtpConfig {
//!     host: "smtp.example.org".to_string(),
//!     port: 465,
//!     username: Some("accounts@example.org".to_string()),
//!     password: Some(SecretString::new("password".to_string())),
//!     from_address: "accounts@example.org".to_string(),
//!     from_name: "Example Cloud".to_string(),
//!     tls_mode: TlsMode::Tls,
//!     timeout: Duration::from_secs(30),
//! };
//!
//! let client = SmtpClient::new(config)?;
//! client
//!     .send_plain("member@example.org", "Hello", "Your account is ready.")
//!     .await?;
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use lettre::{
	message::{header::ContentType, Mailbox},
	transport::smtp::authentication::Credentials,
	Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use memberbridge_common_secret::SecretString;
use serde::{Deserialize, Serialize};

/// Errors that can occur during SMTP operations.
#[derive(Debug, thiserror::Error)]
pub enum SmtpError {
	/// Failed to set up the relay connection.
	#[error("connection failed: {0}")]
	Connection(String),

	/// Failed to send a message.
	#[error("send failed: {0}")]
	Send(String),

	/// Invalid e-mail address format.
	#[error("invalid email address: {0}")]
	Address(String),

	/// Unrecognised configuration value.
	#[error("configuration error: {0}")]
	Configuration(String),
}

/// How the connection to the relay is secured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TlsMode {
	/// Plain text connection. Only for local relays.
	None,
	/// STARTTLS upgrade after connecting (usually port 587).
	StartTls,
	/// Implicit TLS from the first byte (usually port 465).
	#[default]
	Tls,
}

impl TlsMode {
	/// Parse TLS mode from a configuration value.
	///
	/// - "true" or "tls" -> Tls
	/// - "starttls" -> StartTls
	/// - "false" or "none" -> None
	pub fn from_env_value(value: &str) -> Result<Self, SmtpError> {
		match value.trim().to_lowercase().as_str() {
			"true" | "tls" => Ok(TlsMode::Tls),
			"starttls" => Ok(TlsMode::StartTls),
			"false" | "none" => Ok(TlsMode::None),
			_ => Err(SmtpError::Configuration(format!(
				"invalid TLS mode '{value}', expected one of: true, tls, starttls, false, none"
			))),
		}
	}

	/// Conventional port for this mode.
	pub fn default_port(self) -> u16 {
		match self {
			TlsMode::Tls => 465,
			TlsMode::StartTls => 587,
			TlsMode::None => 25,
		}
	}
}

/// Relay and sender settings.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
	pub host: String,
	pub port: u16,
	pub username: Option<String>,
	/// Wrapped so config dumps and `Debug` output stay clean.
	pub password: Option<SecretString>,
	pub from_address: String,
	/// Display name shown in the recipient's mail client.
	pub from_name: String,
	pub tls_mode: TlsMode,
	/// Upper bound on a single SMTP exchange.
	pub timeout: Duration,
}

/// Async SMTP client. The transport connects lazily on first send.
pub struct SmtpClient {
	transport: AsyncSmtpTransport<Tokio1Executor>,
	from_mailbox: Mailbox,
}

impl SmtpClient {
	/// Builds the transport from `config`.
	///
	/// # Errors
	///
	/// Returns [`SmtpError::Address`] if the sender address is invalid and
	/// [`SmtpError::Connection`] if the TLS transport cannot be built.
	#[tracing::instrument(
        name = "smtp_client_new",
        skip(config),
        fields(host = %config.host, port = %config.port, tls_mode = ?config.tls_mode)
    )]
	pub fn new(config: SmtpConfig) -> Result<Self, SmtpError> {
		let from_mailbox = sender_mailbox(&config.from_name, &config.from_address)?;

		let builder = match config.tls_mode {
			TlsMode::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
				.map_err(|e| SmtpError::Connection(format!("{e}")))?,
			TlsMode::StartTls => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
				.map_err(|e| SmtpError::Connection(format!("{e}")))?,
			TlsMode::None => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host),
		};

		let mut builder = builder.port(config.port).timeout(Some(config.timeout));

		if let (Some(username), Some(password)) = (config.username, config.password) {
			builder = builder.credentials(Credentials::new(username, password.into_inner()));
		}

		tracing::debug!("SMTP client initialized");

		Ok(Self {
			transport: builder.build(),
			from_mailbox,
		})
	}

	/// Sends a plain-text message to a single recipient.
	///
	/// # Errors
	///
	/// Returns [`SmtpError::Address`] if `to` is not a valid address and
	/// [`SmtpError::Send`] if the relay refuses or the exchange fails.
	#[tracing::instrument(
        name = "smtp_send_plain",
        skip(self, body),
        fields(to = %to, subject = %subject)
    )]
	pub async fn send_plain(&self, to: &str, subject: &str, body: &str) -> Result<(), SmtpError> {
		let to_mailbox: Mailbox = to.parse().map_err(|e| SmtpError::Address(format!("{e}")))?;

		let message = Message::builder()
			.from(self.from_mailbox.clone())
			.to(to_mailbox)
			.subject(subject)
			.header(ContentType::TEXT_PLAIN)
			.body(body.to_string())
			.map_err(|e| SmtpError::Send(format!("failed to build message: {e}")))?;

		tracing::debug!("sending email");

		self
			.transport
			.send(message)
			.await
			.map_err(|e| SmtpError::Send(format!("{e}")))?;

		tracing::info!("email sent successfully");

		Ok(())
	}
}

fn sender_mailbox(from_name: &str, from_address: &str) -> Result<Mailbox, SmtpError> {
	let address = from_address
		.parse()
		.map_err(|e| SmtpError::Address(format!("{from_address}: {e}")))?;
	let name = Some(from_name.trim().to_string()).filter(|n| !n.is_empty());
	Ok(Mailbox::new(name, address))
}

/// Syntactic check for a bare `local@domain` address.
///
/// Display-name forms such as `Name <user@example.org>` are rejected.
///
/// ```
/// use memberbridge_smtp::is_valid_email;
///
/// assert!(is_valid_email("member@example.org"));
/// assert!(!is_valid_email("not-an-email"));
/// assert!(!is_valid_email("Member <member@example.org>"));
/// ```
pub fn is_valid_email(email: &str) -> bool {
	email.parse::<Address>().is_ok()
}
