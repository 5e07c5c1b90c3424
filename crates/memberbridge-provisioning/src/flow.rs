// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The account request state machine.
//!
//! ```text
//! captcha ──fail──▶ CaptchaRejected
//!    │
//!    ▼
//! groupware search ──error──▶ Error
//!    │ found                       │ not found
//!    ▼                             ▼
//! reset + mail             membership lookup + rule
//!    │                       │ verified      │ otherwise
//!    ▼                       ▼               ▼
//! PasswordReset      create + mail     no-account mail
//!                          │               │
//!                          ▼               ▼
//!                    AccountCreated   NoAccountNotice
//! ```
//!
//! At most one groupware write and one mail happen per request. Mail is sent
//! only after the write it reports on has been accepted.

use std::net::IpAddr;
use std::sync::Arc;

use memberbridge_actionnetwork::{MembershipDirectory, MembershipRule};
use memberbridge_captcha::CaptchaVerifier;
use memberbridge_email::{is_valid_email, Notifier};
use memberbridge_nextcloud::{
	derive_display_name, derive_username, AccountLookup, GroupwareDirectory, ProvisioningRequest,
};
use tracing::{debug, error, info, instrument};

use crate::credential::generate_password;
use crate::error::FlowError;

/// Groups a new account joins unless configured otherwise.
pub const DEFAULT_GROUPS: &[&str] = &["Members"];

/// One form submission.
#[derive(Debug, Clone)]
pub struct AccountRequest {
	pub email: String,
	pub captcha_response: String,
	pub remote_ip: Option<IpAddr>,
}

#[derive(Debug)]
pub enum FlowOutcome {
	CaptchaRejected,
	PasswordReset,
	AccountCreated,
	NoAccountNotice,
	Error(FlowError),
}

impl FlowOutcome {
	pub fn label(&self) -> &'static str {
		match self {
			FlowOutcome::CaptchaRejected => "captcha_rejected",
			FlowOutcome::PasswordReset => "password_reset",
			FlowOutcome::AccountCreated => "account_created",
			FlowOutcome::NoAccountNotice => "no_account_notice",
			FlowOutcome::Error(_) => "error",
		}
	}
}

/// Resets, provisions or explains, depending on what the directories say.
pub struct AccountFlow {
	captcha: Arc<dyn CaptchaVerifier>,
	groupware: Arc<dyn GroupwareDirectory>,
	membership: Arc<dyn MembershipDirectory>,
	rule: Arc<dyn MembershipRule>,
	notifier: Notifier,
	groups: Vec<String>,
}

impl AccountFlow {
	pub fn new(
		captcha: Arc<dyn CaptchaVerifier>,
		groupware: Arc<dyn GroupwareDirectory>,
		membership: Arc<dyn MembershipDirectory>,
		rule: Arc<dyn MembershipRule>,
		notifier: Notifier,
	) -> Self {
		Self {
			captcha,
			groupware,
			membership,
			rule,
			notifier,
			groups: DEFAULT_GROUPS.iter().map(|g| g.to_string()).collect(),
		}
	}

	/// Groups new accounts are added to.
	pub fn with_groups(mut self, groups: Vec<String>) -> Self {
		self.groups = groups;
		self
	}

	pub fn groups(&self) -> &[String] {
		&self.groups
	}

	/// Runs one request to completion. Never panics and never returns early
	/// on a collaborator error; failures come back as [`FlowOutcome::Error`].
	#[instrument(skip_all, fields(remote_ip = ?request.remote_ip))]
	pub async fn handle(&self, request: &AccountRequest) -> FlowOutcome {
		match self.run(request).await {
			Ok(outcome) => {
				info!(outcome = outcome.label(), "Account request handled");
				outcome
			}
			Err(e @ FlowError::InvalidEmail) => {
				info!(category = e.category(), "Account request rejected");
				FlowOutcome::Error(e)
			}
			Err(e) => {
				error!(category = e.category(), error = %e, "Account request failed");
				FlowOutcome::Error(e)
			}
		}
	}

	async fn run(&self, request: &AccountRequest) -> Result<FlowOutcome, FlowError> {
		let passed = self
			.captcha
			.verify(&request.captcha_response, request.remote_ip)
			.await?;
		if !passed {
			return Ok(FlowOutcome::CaptchaRejected);
		}

		let email = request.email.trim();
		if !is_valid_email(email) {
			return Err(FlowError::InvalidEmail);
		}

		let lookup = self
			.groupware
			.find_by_email(email)
			.await
			.map_err(|e| FlowError::groupware("search", e))?;

		match lookup {
			AccountLookup::Found { user_id } => self.reset_password(email, &user_id).await,
			AccountLookup::NotFound => self.provision_or_notify(email).await,
		}
	}

	async fn reset_password(&self, email: &str, user_id: &str) -> Result<FlowOutcome, FlowError> {
		debug!(user_id, "Existing groupware account, resetting password");
		let password = generate_password();

		let accepted = self
			.groupware
			.reset_password(user_id, &password)
			.await
			.map_err(|e| FlowError::groupware("password reset", e))?;
		if !accepted {
			return Err(FlowError::rejected("password reset"));
		}

		self
			.notifier
			.send_password_reset(email, user_id, &password)
			.await?;
		Ok(FlowOutcome::PasswordReset)
	}

	async fn provision_or_notify(&self, email: &str) -> Result<FlowOutcome, FlowError> {
		let member = self
			.membership
			.find_by_email(email)
			.await
			.filter(|record| self.rule.is_verified(record));

		let Some(record) = member else {
			debug!("No groupware account and no verified member");
			self.notifier.send_no_account_found(email).await?;
			return Ok(FlowOutcome::NoAccountNotice);
		};

		let username = derive_username(&record.given_name, &record.family_name);
		if username.is_empty() {
			return Err(FlowError::InvalidUsername);
		}

		let request = ProvisioningRequest {
			display_name: derive_display_name(&record.given_name, &record.family_name),
			username,
			email: email.to_string(),
			password: generate_password(),
			groups: self.groups.clone(),
		};
		debug!(username = %request.username, "Verified member, creating groupware account");

		let accepted = self
			.groupware
			.create_account(&request)
			.await
			.map_err(|e| FlowError::groupware("account creation", e))?;
		if !accepted {
			return Err(FlowError::rejected("account creation"));
		}

		self
			.notifier
			.send_account_created(
				email,
				&request.display_name,
				&request.username,
				&request.password,
			)
			.await?;
		Ok(FlowOutcome::AccountCreated)
	}
}

impl std::fmt::Debug for AccountFlow {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("AccountFlow")
			.field("notifier", &self.notifier)
			.field("groups", &self.groups)
			.finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests {
	use std::collections::HashSet;

	use super::*;
	use crate::testing::{
		member_record, CaptchaVerdict, FakeGroupware, FakeLookup, FakeMembership, GroupwareCall,
		Harness, RecordingMailer, StaticCaptcha,
	};

	fn request(email: &str) -> AccountRequest {
		AccountRequest {
			email: email.to_string(),
			captcha_response: "token".to_string(),
			remote_ip: None,
		}
	}

	fn current_member() -> FakeMembership {
		FakeMembership::with_record(member_record(
			"Ada",
			"Lovelace",
			"ada@example.org",
			&[
				("Membership_Status", "Current"),
				("Local_Party", "Stroud District Green Party"),
			],
		))
	}

	fn lapsed_member() -> FakeMembership {
		FakeMembership::with_record(member_record(
			"Ada",
			"Lovelace",
			"ada@example.org",
			&[
				("Membership_Status", "Lapsed"),
				("Local_Party", "Stroud District Green Party"),
			],
		))
	}

	mod captcha {
		use super::*;

		#[tokio::test]
		async fn failed_captcha_touches_nothing() {
			let h = Harness::new(StaticCaptcha::failing(), FakeGroupware::with_user("ada"), current_member());

			let outcome = h.flow.handle(&request("ada@example.org")).await;

			assert!(matches!(outcome, FlowOutcome::CaptchaRejected));
			assert!(h.groupware.calls().is_empty());
			assert_eq!(h.membership.lookups(), 0);
			assert!(h.mailer.sent().is_empty());
		}

		#[tokio::test]
		async fn unreachable_captcha_is_an_error() {
			let h = Harness::new(
				StaticCaptcha::new(CaptchaVerdict::Unreachable),
				FakeGroupware::empty(),
				current_member(),
			);

			let outcome = h.flow.handle(&request("ada@example.org")).await;

			assert!(matches!(outcome, FlowOutcome::Error(FlowError::Captcha(_))));
			assert!(h.groupware.calls().is_empty());
			assert!(h.mailer.sent().is_empty());
		}
	}

	mod existing_account {
		use super::*;

		#[tokio::test]
		async fn single_match_resets_and_never_creates() {
			let h = Harness::new(StaticCaptcha::passing(), FakeGroupware::with_user("ada"), current_member());

			let outcome = h.flow.handle(&request("ada@example.org")).await;

			assert!(matches!(outcome, FlowOutcome::PasswordReset));
			let writes = h.groupware.writes();
			assert_eq!(writes.len(), 1);
			let GroupwareCall::Reset { user_id, password } = &writes[0] else {
				panic!("expected a reset, got {writes:?}");
			};
			assert_eq!(user_id, "ada");
			assert_eq!(h.membership.lookups(), 0);

			let sent = h.mailer.sent();
			assert_eq!(sent.len(), 1);
			assert_eq!(sent[0].to, "ada@example.org");
			assert_eq!(sent[0].subject, "Your Green Cloud account password has been reset");
			assert!(sent[0].body.contains(password.as_str()));
		}

		#[tokio::test]
		async fn rejected_reset_sends_no_mail() {
			let h = Harness::new(
				StaticCaptcha::passing(),
				FakeGroupware::with_user("ada").rejecting_writes(),
				current_member(),
			);

			let outcome = h.flow.handle(&request("ada@example.org")).await;

			assert!(matches!(
				outcome,
				FlowOutcome::Error(FlowError::Groupware { source: None, .. })
			));
			assert!(h.mailer.sent().is_empty());
		}

		#[tokio::test]
		async fn ambiguous_search_never_writes() {
			let h = Harness::new(
				StaticCaptcha::passing(),
				FakeGroupware::new(FakeLookup::Ambiguous(2)),
				current_member(),
			);

			let outcome = h.flow.handle(&request("shared@example.org")).await;

			assert!(matches!(outcome, FlowOutcome::Error(FlowError::Groupware { .. })));
			assert!(h.groupware.writes().is_empty());
			assert_eq!(h.membership.lookups(), 0);
			assert!(h.mailer.sent().is_empty());
		}

		#[tokio::test]
		async fn failed_search_is_an_error_not_a_miss() {
			let h = Harness::new(
				StaticCaptcha::passing(),
				FakeGroupware::new(FakeLookup::Unavailable),
				current_member(),
			);

			let outcome = h.flow.handle(&request("ada@example.org")).await;

			assert!(matches!(outcome, FlowOutcome::Error(FlowError::Groupware { .. })));
			assert_eq!(h.membership.lookups(), 0);
			assert!(h.groupware.writes().is_empty());
		}
	}

	mod new_account {
		use super::*;

		#[tokio::test]
		async fn verified_member_gets_one_account_and_one_mail() {
			let h = Harness::new(StaticCaptcha::passing(), FakeGroupware::empty(), current_member());

			let outcome = h.flow.handle(&request("ada@example.org")).await;

			assert!(matches!(outcome, FlowOutcome::AccountCreated));
			let writes = h.groupware.writes();
			assert_eq!(writes.len(), 1);
			let GroupwareCall::Create {
				username,
				display_name,
				email,
				password,
				groups,
			} = &writes[0]
			else {
				panic!("expected a create, got {writes:?}");
			};
			assert_eq!(username, "AdaLovelace");
			assert_eq!(display_name, "Ada Lovelace");
			assert_eq!(email, "ada@example.org");
			assert_eq!(groups, &vec!["Members".to_string()]);

			let sent = h.mailer.sent();
			assert_eq!(sent.len(), 1);
			assert_eq!(sent[0].subject, "Your Green Cloud account has been created");
			assert!(sent[0].body.contains("Username: AdaLovelace"));
			assert!(sent[0].body.contains(password.as_str()));
		}

		#[tokio::test]
		async fn configured_groups_are_used() {
			let h = Harness::new(StaticCaptcha::passing(), FakeGroupware::empty(), current_member());
			let flow = h
				.flow
				.with_groups(vec!["Members".to_string(), "Volunteers".to_string()]);

			flow.handle(&request("ada@example.org")).await;

			let writes = h.groupware.writes();
			let GroupwareCall::Create { groups, .. } = &writes[0] else {
				panic!("expected a create");
			};
			assert_eq!(groups.len(), 2);
		}

		#[tokio::test]
		async fn each_account_gets_a_distinct_password() {
			let mut passwords = HashSet::new();
			for _ in 0..20 {
				let h = Harness::new(StaticCaptcha::passing(), FakeGroupware::empty(), current_member());
				h.flow.handle(&request("ada@example.org")).await;
				for call in h.groupware.writes() {
					if let GroupwareCall::Create { password, .. } = call {
						assert!(passwords.insert(password));
					}
				}
			}
			assert_eq!(passwords.len(), 20);
		}

		#[tokio::test]
		async fn rejected_create_sends_no_mail() {
			let h = Harness::new(
				StaticCaptcha::passing(),
				FakeGroupware::empty().rejecting_writes(),
				current_member(),
			);

			let outcome = h.flow.handle(&request("ada@example.org")).await;

			assert!(matches!(outcome, FlowOutcome::Error(FlowError::Groupware { .. })));
			assert!(h.mailer.sent().is_empty());
		}

		#[tokio::test]
		async fn punctuation_only_name_is_rejected_before_writing() {
			let membership = FakeMembership::with_record(member_record(
				"'",
				"-",
				"odd@example.org",
				&[
					("Membership_Status", "Current"),
					("Local_Party", "Stroud District Green Party"),
				],
			));
			let h = Harness::new(StaticCaptcha::passing(), FakeGroupware::empty(), membership);

			let outcome = h.flow.handle(&request("odd@example.org")).await;

			assert!(matches!(outcome, FlowOutcome::Error(FlowError::InvalidUsername)));
			assert!(h.groupware.writes().is_empty());
			assert!(h.mailer.sent().is_empty());
		}

		#[tokio::test]
		async fn mail_failure_after_create_is_mail_delivery_error() {
			let h = Harness::with_mailer(
				StaticCaptcha::passing(),
				FakeGroupware::empty(),
				current_member(),
				RecordingMailer::failing(),
			);

			let outcome = h.flow.handle(&request("ada@example.org")).await;

			assert!(matches!(outcome, FlowOutcome::Error(FlowError::MailDelivery(_))));
			assert_eq!(h.groupware.writes().len(), 1);
		}
	}

	mod no_account {
		use super::*;

		async fn assert_notice_only(membership: FakeMembership) {
			let h = Harness::new(StaticCaptcha::passing(), FakeGroupware::empty(), membership);

			let outcome = h.flow.handle(&request("ada@example.org")).await;

			assert!(matches!(outcome, FlowOutcome::NoAccountNotice));
			assert!(h.groupware.writes().is_empty());
			let sent = h.mailer.sent();
			assert_eq!(sent.len(), 1);
			assert_eq!(sent[0].to, "ada@example.org");
			assert_eq!(sent[0].subject, "Green Cloud account information");
		}

		#[tokio::test]
		async fn unknown_address_gets_notice() {
			assert_notice_only(FakeMembership::none()).await;
		}

		#[tokio::test]
		async fn lapsed_member_gets_notice() {
			assert_notice_only(lapsed_member()).await;
		}

		#[tokio::test]
		async fn other_branch_gets_notice() {
			assert_notice_only(FakeMembership::with_record(member_record(
				"Ada",
				"Lovelace",
				"ada@example.org",
				&[("Membership_Status", "Current"), ("Local_Party", "Elsewhere")],
			)))
			.await;
		}

		#[tokio::test]
		async fn notice_failure_is_mail_delivery_error() {
			let h = Harness::with_mailer(
				StaticCaptcha::passing(),
				FakeGroupware::empty(),
				FakeMembership::none(),
				RecordingMailer::failing(),
			);

			let outcome = h.flow.handle(&request("ada@example.org")).await;

			assert!(matches!(outcome, FlowOutcome::Error(FlowError::MailDelivery(_))));
		}
	}

	mod input {
		use super::*;

		#[tokio::test]
		async fn surrounding_whitespace_is_trimmed() {
			let h = Harness::new(StaticCaptcha::passing(), FakeGroupware::with_user("ada"), current_member());

			h.flow.handle(&request("  ada@example.org \n")).await;

			assert_eq!(
				h.groupware.calls()[0],
				GroupwareCall::Search {
					email: "ada@example.org".to_string()
				}
			);
			assert_eq!(h.mailer.sent()[0].to, "ada@example.org");
		}

		#[tokio::test]
		async fn malformed_address_never_reaches_directories() {
			for email in ["", "not-an-address", "Ada <ada@example.org>"] {
				let h = Harness::new(StaticCaptcha::passing(), FakeGroupware::with_user("ada"), current_member());

				let outcome = h.flow.handle(&request(email)).await;

				assert!(
					matches!(outcome, FlowOutcome::Error(FlowError::InvalidEmail)),
					"{email:?}"
				);
				assert!(h.groupware.calls().is_empty());
				assert!(h.mailer.sent().is_empty());
			}
		}
	}
}
