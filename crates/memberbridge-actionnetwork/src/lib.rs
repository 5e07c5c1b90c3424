// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Action Network membership lookup for memberbridge.
//!
//! [`MembershipDirectory`] finds the person record behind an e-mail address and
//! [`MembershipRule`] decides whether that record counts as a verified member.
//! The rule is deployment specific: [`CustomFieldRule`] covers the usual "status
//! field equals Current and branch field equals ours" shape, and any closure
//! over [`MembershipRecord`] works too.

pub mod client;
pub mod error;
pub mod rule;
pub mod types;

use async_trait::async_trait;

pub use client::{ActionNetworkClient, ActionNetworkConfig, DEFAULT_BASE_URL};
pub use error::{ActionNetworkError, RuleParseError};
pub use rule::{CustomFieldRule, MembershipRule};
pub use types::MembershipRecord;

/// Person lookup on the membership side.
#[async_trait]
pub trait MembershipDirectory: Send + Sync {
	/// Returns the single person record for `email`.
	///
	/// Lookup failures, malformed responses and anything other than exactly one
	/// match all come back as `None`, so no account is ever created from
	/// ambiguous data.
	async fn find_by_email(&self, email: &str) -> Option<MembershipRecord>;
}
