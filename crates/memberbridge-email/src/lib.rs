// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Account notification mails.
//!
//! [`Notifier`] renders an [`EmailTemplate`] and hands the result to a
//! [`MailTransport`]. Production wiring uses [`memberbridge_smtp::SmtpClient`];
//! tests substitute a recording transport.

pub mod template;

use std::sync::Arc;

use async_trait::async_trait;
use memberbridge_common_secret::SecretString;
use memberbridge_smtp::{SmtpClient, SmtpError};
use tracing::{error, info, instrument};

pub use memberbridge_smtp::is_valid_email;
pub use template::{render_email, EmailContext, EmailTemplate};

#[derive(Debug, thiserror::Error)]
pub enum EmailError {
	#[error(transparent)]
	Smtp(#[from] SmtpError),

	#[error("mail transport failed: {0}")]
	Transport(String),
}

/// Delivers one plain-text message to one recipient.
#[async_trait]
pub trait MailTransport: Send + Sync {
	async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), EmailError>;
}

#[async_trait]
impl MailTransport for SmtpClient {
	async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), EmailError> {
		self.send_plain(to, subject, body).await?;
		Ok(())
	}
}

/// Sends the account mails for one deployment.
#[derive(Clone)]
pub struct Notifier {
	transport: Arc<dyn MailTransport>,
	context: EmailContext,
}

impl Notifier {
	pub fn new(transport: Arc<dyn MailTransport>, context: EmailContext) -> Self {
		Self { transport, context }
	}

	pub async fn send_account_created(
		&self,
		email: &str,
		display_name: &str,
		username: &str,
		password: &SecretString,
	) -> Result<(), EmailError> {
		self
			.deliver(EmailTemplate::AccountCreated {
				email: email.to_string(),
				display_name: display_name.to_string(),
				username: username.to_string(),
				password: password.clone(),
			})
			.await
	}

	pub async fn send_password_reset(
		&self,
		email: &str,
		user_id: &str,
		password: &SecretString,
	) -> Result<(), EmailError> {
		self
			.deliver(EmailTemplate::PasswordReset {
				email: email.to_string(),
				user_id: user_id.to_string(),
				password: password.clone(),
			})
			.await
	}

	pub async fn send_no_account_found(&self, email: &str) -> Result<(), EmailError> {
		self
			.deliver(EmailTemplate::NoAccountFound {
				email: email.to_string(),
			})
			.await
	}

	#[instrument(skip_all, fields(kind = template.kind()))]
	async fn deliver(&self, template: EmailTemplate) -> Result<(), EmailError> {
		let (subject, body) = render_email(&template, &self.context);
		match self
			.transport
			.send(template.recipient(), &subject, &body)
			.await
		{
			Ok(()) => {
				info!("Notification mail sent");
				Ok(())
			}
			Err(e) => {
				error!(error = %e, "Notification mail delivery failed");
				Err(e)
			}
		}
	}
}

impl std::fmt::Debug for Notifier {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Notifier")
			.field("context", &self.context)
			.finish_non_exhaustive()
	}
}
