// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! In-memory fakes for the collaborators of [`AccountFlow`](crate::AccountFlow).
//!
//! Every fake records the calls it receives so tests can assert on side
//! effects (writes, mails) as well as on the outcome.

use std::collections::BTreeMap;
use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use memberbridge_actionnetwork::{CustomFieldRule, MembershipDirectory, MembershipRecord};
use memberbridge_captcha::{CaptchaError, CaptchaVerifier};
use memberbridge_common_secret::SecretString;
use memberbridge_email::{EmailContext, EmailError, MailTransport, Notifier};
use memberbridge_nextcloud::{
	AccountLookup, GroupwareDirectory, NextcloudError, ProvisioningRequest,
};

use crate::AccountFlow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptchaVerdict {
	Pass,
	Fail,
	Unreachable,
}

/// Returns a fixed verdict and counts calls.
#[derive(Debug)]
pub struct StaticCaptcha {
	verdict: CaptchaVerdict,
	calls: AtomicUsize,
}

impl StaticCaptcha {
	pub fn new(verdict: CaptchaVerdict) -> Self {
		Self {
			verdict,
			calls: AtomicUsize::new(0),
		}
	}

	pub fn passing() -> Self {
		Self::new(CaptchaVerdict::Pass)
	}

	pub fn failing() -> Self {
		Self::new(CaptchaVerdict::Fail)
	}

	pub fn unreachable() -> Self {
		Self::new(CaptchaVerdict::Unreachable)
	}

	pub fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}
}

#[async_trait]
impl CaptchaVerifier for StaticCaptcha {
	async fn verify(&self, _response: &str, _remote_ip: Option<IpAddr>) -> Result<bool, CaptchaError> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		match self.verdict {
			CaptchaVerdict::Pass => Ok(true),
			CaptchaVerdict::Fail => Ok(false),
			CaptchaVerdict::Unreachable => Err(CaptchaError::Timeout),
		}
	}
}

/// What the fake groupware search answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FakeLookup {
	NotFound,
	Found(String),
	Ambiguous(usize),
	Unavailable,
}

/// A call received by [`FakeGroupware`]. Passwords are exposed here so tests
/// can compare them with the mails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupwareCall {
	Search {
		email: String,
	},
	Create {
		username: String,
		display_name: String,
		email: String,
		password: String,
		groups: Vec<String>,
	},
	Reset {
		user_id: String,
		password: String,
	},
}

impl GroupwareCall {
	pub fn is_write(&self) -> bool {
		!matches!(self, GroupwareCall::Search { .. })
	}
}

#[derive(Debug)]
pub struct FakeGroupware {
	lookup: FakeLookup,
	accept_writes: bool,
	calls: Mutex<Vec<GroupwareCall>>,
}

impl FakeGroupware {
	pub fn new(lookup: FakeLookup) -> Self {
		Self {
			lookup,
			accept_writes: true,
			calls: Mutex::new(Vec::new()),
		}
	}

	pub fn empty() -> Self {
		Self::new(FakeLookup::NotFound)
	}

	pub fn with_user(user_id: impl Into<String>) -> Self {
		Self::new(FakeLookup::Found(user_id.into()))
	}

	/// Writes answer with a non-ok envelope.
	pub fn rejecting_writes(mut self) -> Self {
		self.accept_writes = false;
		self
	}

	pub fn calls(&self) -> Vec<GroupwareCall> {
		self.calls.lock().map(|c| c.clone()).unwrap_or_default()
	}

	pub fn writes(&self) -> Vec<GroupwareCall> {
		self.calls().into_iter().filter(GroupwareCall::is_write).collect()
	}

	fn record(&self, call: GroupwareCall) {
		if let Ok(mut calls) = self.calls.lock() {
			calls.push(call);
		}
	}
}

#[async_trait]
impl GroupwareDirectory for FakeGroupware {
	async fn find_by_email(&self, email: &str) -> Result<AccountLookup, NextcloudError> {
		self.record(GroupwareCall::Search {
			email: email.to_string(),
		});
		match &self.lookup {
			FakeLookup::NotFound => Ok(AccountLookup::NotFound),
			FakeLookup::Found(user_id) => Ok(AccountLookup::Found {
				user_id: user_id.clone(),
			}),
			FakeLookup::Ambiguous(count) => Err(NextcloudError::AmbiguousMatch { count: *count }),
			FakeLookup::Unavailable => Err(NextcloudError::Api {
				status: "failure".to_string(),
				statuscode: Some(997),
				message: "Unauthorised".to_string(),
			}),
		}
	}

	async fn create_account(&self, request: &ProvisioningRequest) -> Result<bool, NextcloudError> {
		self.record(GroupwareCall::Create {
			username: request.username.clone(),
			display_name: request.display_name.clone(),
			email: request.email.clone(),
			password: request.password.expose().clone(),
			groups: request.groups.clone(),
		});
		Ok(self.accept_writes)
	}

	async fn reset_password(
		&self,
		user_id: &str,
		password: &SecretString,
	) -> Result<bool, NextcloudError> {
		self.record(GroupwareCall::Reset {
			user_id: user_id.to_string(),
			password: password.expose().clone(),
		});
		Ok(self.accept_writes)
	}
}

/// Returns a fixed record (or nothing) and counts lookups.
#[derive(Debug, Default)]
pub struct FakeMembership {
	record: Option<MembershipRecord>,
	lookups: AtomicUsize,
}

impl FakeMembership {
	pub fn none() -> Self {
		Self::default()
	}

	pub fn with_record(record: MembershipRecord) -> Self {
		Self {
			record: Some(record),
			lookups: AtomicUsize::new(0),
		}
	}

	pub fn lookups(&self) -> usize {
		self.lookups.load(Ordering::SeqCst)
	}
}

#[async_trait]
impl MembershipDirectory for FakeMembership {
	async fn find_by_email(&self, _email: &str) -> Option<MembershipRecord> {
		self.lookups.fetch_add(1, Ordering::SeqCst);
		self.record.clone()
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMail {
	pub to: String,
	pub subject: String,
	pub body: String,
}

/// Keeps every message instead of delivering it.
#[derive(Debug, Default)]
pub struct RecordingMailer {
	sent: Mutex<Vec<SentMail>>,
	fail: bool,
}

impl RecordingMailer {
	pub fn new() -> Self {
		Self::default()
	}

	/// Every send fails with a transport error.
	pub fn failing() -> Self {
		Self {
			sent: Mutex::new(Vec::new()),
			fail: true,
		}
	}

	pub fn sent(&self) -> Vec<SentMail> {
		self.sent.lock().map(|s| s.clone()).unwrap_or_default()
	}
}

#[async_trait]
impl MailTransport for RecordingMailer {
	async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), EmailError> {
		if self.fail {
			return Err(EmailError::Transport("connection refused".to_string()));
		}
		if let Ok(mut sent) = self.sent.lock() {
			sent.push(SentMail {
				to: to.to_string(),
				subject: subject.to_string(),
				body: body.to_string(),
			});
		}
		Ok(())
	}
}

/// Builds a person record with the given custom fields.
pub fn member_record(
	given_name: &str,
	family_name: &str,
	email: &str,
	custom_fields: &[(&str, &str)],
) -> MembershipRecord {
	MembershipRecord {
		given_name: given_name.to_string(),
		family_name: family_name.to_string(),
		email_address: email.to_string(),
		custom_fields: custom_fields
			.iter()
			.map(|(k, v)| (k.to_string(), v.to_string()))
			.collect::<BTreeMap<_, _>>(),
	}
}

/// The rule the reference deployment runs with.
pub fn local_party_rule() -> CustomFieldRule {
	CustomFieldRule::new()
		.require("Membership_Status", "Current")
		.require("Local_Party", "Stroud District Green Party")
}

pub fn email_context() -> EmailContext {
	EmailContext {
		groupware_name: "Green Cloud".to_string(),
		groupware_host: "https://cloud.example.org".to_string(),
		membership_name: "Action Network".to_string(),
	}
}

/// A flow wired to fakes, with handles kept for assertions.
pub struct Harness {
	pub captcha: Arc<StaticCaptcha>,
	pub groupware: Arc<FakeGroupware>,
	pub membership: Arc<FakeMembership>,
	pub mailer: Arc<RecordingMailer>,
	pub flow: AccountFlow,
}

impl Harness {
	pub fn new(captcha: StaticCaptcha, groupware: FakeGroupware, membership: FakeMembership) -> Self {
		Self::with_mailer(captcha, groupware, membership, RecordingMailer::new())
	}

	pub fn with_mailer(
		captcha: StaticCaptcha,
		groupware: FakeGroupware,
		membership: FakeMembership,
		mailer: RecordingMailer,
	) -> Self {
		let captcha = Arc::new(captcha);
		let groupware = Arc::new(groupware);
		let membership = Arc::new(membership);
		let mailer = Arc::new(mailer);

		let flow = AccountFlow::new(
			captcha.clone(),
			groupware.clone(),
			membership.clone(),
			Arc::new(local_party_rule()),
			Notifier::new(mailer.clone(), email_context()),
		);

		Self {
			captcha,
			groupware,
			membership,
			mailer,
			flow,
		}
	}
}
