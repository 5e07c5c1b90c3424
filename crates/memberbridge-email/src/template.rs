// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Plain-text mail templates.

use memberbridge_common_secret::SecretString;

/// Deployment names and addresses that every mail mentions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailContext {
	/// Display name of the groupware instance, e.g. "Stroud Green Cloud".
	pub groupware_name: String,
	/// Root URL of the groupware instance.
	pub groupware_host: String,
	/// Display name of the membership organisation.
	pub membership_name: String,
}

/// Email templates for the three account outcomes.
#[derive(Debug, Clone)]
pub enum EmailTemplate {
	/// A new groupware account was provisioned for a verified member.
	AccountCreated {
		/// Address the account was created for.
		email: String,
		/// "Given Family".
		display_name: String,
		/// Login name on the groupware instance.
		username: String,
		/// Initial password.
		password: SecretString,
	},
	/// An existing account had its password replaced.
	PasswordReset {
		/// Address the request came from.
		email: String,
		/// Groupware user id (login name).
		user_id: String,
		/// The new password.
		password: SecretString,
	},
	/// No account exists and the address does not belong to a verified member.
	NoAccountFound {
		/// Address the request came from.
		email: String,
	},
}

impl EmailTemplate {
	/// Name used in logs. Never includes personal data.
	pub fn kind(&self) -> &'static str {
		match self {
			EmailTemplate::AccountCreated { .. } => "account_created",
			EmailTemplate::PasswordReset { .. } => "password_reset",
			EmailTemplate::NoAccountFound { .. } => "no_account_found",
		}
	}

	/// Recipient of the rendered mail.
	pub fn recipient(&self) -> &str {
		match self {
			EmailTemplate::AccountCreated { email, .. }
			| EmailTemplate::PasswordReset { email, .. }
			| EmailTemplate::NoAccountFound { email } => email,
		}
	}
}

/// Render an email template to subject and body.
///
/// Returns a tuple of (subject, body) strings. The body carries the password
/// in clear text, so callers must not log it.
pub fn render_email(template: &EmailTemplate, context: &EmailContext) -> (String, String) {
	let groupware = &context.groupware_name;
	let host = &context.groupware_host;

	match template {
		EmailTemplate::AccountCreated {
			email,
			display_name,
			username,
			password,
		} => {
			let subject = format!("Your {groupware} account has been created");
			let body = format!(
				"Hello {display_name},\n\n\
				 A {groupware} account has been created for {email}.\n\n\
				 Address: {host}\n\
				 Username: {username}\n\
				 Password: {password}\n\n\
				 Please sign in and choose a new password under Settings > Security.\n",
				password = password.expose(),
			);
			(subject, body)
		}
		EmailTemplate::PasswordReset {
			email,
			user_id,
			password,
		} => {
			let subject = format!("Your {groupware} account password has been reset");
			let body = format!(
				"Hello,\n\n\
				 The password of the {groupware} account registered to {email} has been reset.\n\n\
				 Address: {host}\n\
				 Username: {user_id}\n\
				 New password: {password}\n\n\
				 Please sign in and choose a new password under Settings > Security.\n\
				 If you did not ask for this, sign in and change the password anyway.\n",
				password = password.expose(),
			);
			(subject, body)
		}
		EmailTemplate::NoAccountFound { email } => {
			let membership = &context.membership_name;
			let subject = format!("{groupware} account information");
			let body = format!(
				"Hello,\n\n\
				 Someone asked for {groupware} account details for {email}.\n\n\
				 There is no {groupware} account for this address, and it does not \
				 belong to a current member in {membership}.\n\n\
				 If you think this is wrong, check that this is the address you \
				 gave {membership}, or reply to this e-mail and we will look into it.\n\n\
				 {groupware}: {host}\n",
			);
			(subject, body)
		}
	}
}
