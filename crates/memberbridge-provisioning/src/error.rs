// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use memberbridge_captcha::CaptchaError;
use memberbridge_email::EmailError;
use memberbridge_nextcloud::NextcloudError;

/// Errors that end an account request on the generic error page.
#[derive(Debug, thiserror::Error)]
pub enum FlowError {
	#[error("captcha verification unavailable: {0}")]
	Captcha(#[from] CaptchaError),

	#[error("groupware {operation} failed")]
	Groupware {
		operation: &'static str,
		/// `None` when the API answered with a non-ok status envelope.
		#[source]
		source: Option<NextcloudError>,
	},

	#[error("mail delivery failed: {0}")]
	MailDelivery(#[from] EmailError),

	#[error("member name yields an empty username")]
	InvalidUsername,

	#[error("submitted address is not a valid e-mail address")]
	InvalidEmail,
}

impl FlowError {
	pub(crate) fn groupware(operation: &'static str, source: NextcloudError) -> Self {
		FlowError::Groupware {
			operation,
			source: Some(source),
		}
	}

	pub(crate) fn rejected(operation: &'static str) -> Self {
		FlowError::Groupware {
			operation,
			source: None,
		}
	}

	/// Stable label for logs.
	pub fn category(&self) -> &'static str {
		match self {
			FlowError::Captcha(_) => "captcha",
			FlowError::Groupware { .. } => "groupware",
			FlowError::MailDelivery(_) => "mail_delivery",
			FlowError::InvalidUsername => "invalid_username",
			FlowError::InvalidEmail => "invalid_email",
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::error::Error;

	#[test]
	fn rejected_write_has_no_source() {
		let err = FlowError::rejected("password reset");
		assert_eq!(err.to_string(), "groupware password reset failed");
		assert!(err.source().is_none());
	}

	#[test]
	fn transport_failure_keeps_source() {
		let err = FlowError::groupware("search", NextcloudError::Timeout);
		assert!(err.source().is_some());
		assert_eq!(err.category(), "groupware");
	}

	#[test]
	fn mail_failure_has_its_own_category() {
		let err = FlowError::from(EmailError::Transport("refused".to_string()));
		assert_eq!(err.category(), "mail_delivery");
	}
}
