// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Nextcloud user provisioning client for memberbridge.
//!
//! This crate wraps the three calls memberbridge makes against the Nextcloud
//! OCS provisioning API (`/ocs/v1.php/cloud/users`): search by e-mail, create a
//! user and set a user's password. The [`GroupwareDirectory`] trait is the seam
//! the account flow depends on; [`NextcloudClient`] is the HTTP implementation.

pub mod client;
pub mod error;
pub mod types;
pub mod username;

use async_trait::async_trait;
use memberbridge_common_secret::SecretString;

pub use client::{NextcloudClient, NextcloudConfig};
pub use error::NextcloudError;
pub use types::{AccountLookup, ProvisioningRequest};
pub use username::{derive_display_name, derive_username};

/// User directory operations on the groupware side.
#[async_trait]
pub trait GroupwareDirectory: Send + Sync {
	/// Looks up the account owning `email`.
	///
	/// More than one match is [`NextcloudError::AmbiguousMatch`], never a
	/// lookup result.
	async fn find_by_email(&self, email: &str) -> Result<AccountLookup, NextcloudError>;

	/// Creates an account. `Ok(false)` means the API answered with a non-ok
	/// status envelope.
	async fn create_account(&self, request: &ProvisioningRequest) -> Result<bool, NextcloudError>;

	/// Replaces the password of `user_id`. `Ok(false)` means the API answered
	/// with a non-ok status envelope.
	async fn reset_password(
		&self,
		user_id: &str,
		password: &SecretString,
	) -> Result<bool, NextcloudError>;
}
