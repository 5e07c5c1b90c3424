// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Action Network settings and the membership rule.

use std::collections::BTreeMap;

use memberbridge_actionnetwork::{CustomFieldRule, DEFAULT_BASE_URL};
use memberbridge_common_secret::SecretString;
use serde::Deserialize;

use crate::error::ConfigError;

/// Membership configuration (runtime, fully resolved).
#[derive(Debug, Clone)]
pub struct MembershipConfig {
	pub api_key: SecretString,
	pub base_url: String,
	/// Name of the membership organisation, used in the no-account mail.
	pub instance_name: String,
	/// Custom fields a person must carry to count as a verified member.
	pub rule: CustomFieldRule,
}

/// Membership configuration layer (partial, for merging).
///
/// In TOML the rule is a table:
///
/// ```toml
/// [membership.required_fields]
/// Membership_Status = "Current"
/// Local_Party = "Stroud District Green Party"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MembershipConfigLayer {
	#[serde(default)]
	pub api_key: Option<SecretString>,
	#[serde(default)]
	pub base_url: Option<String>,
	#[serde(default)]
	pub instance_name: Option<String>,
	#[serde(default)]
	pub required_fields: Option<BTreeMap<String, String>>,
}

impl MembershipConfigLayer {
	pub fn merge(&mut self, other: MembershipConfigLayer) {
		if other.api_key.is_some() {
			self.api_key = other.api_key;
		}
		if other.base_url.is_some() {
			self.base_url = other.base_url;
		}
		if other.instance_name.is_some() {
			self.instance_name = other.instance_name;
		}
		// A later source replaces the whole rule rather than adding fields to it.
		if other.required_fields.is_some() {
			self.required_fields = other.required_fields;
		}
	}

	pub fn build(self) -> Result<MembershipConfig, ConfigError> {
		let api_key = self
			.api_key
			.filter(|k| !k.is_empty())
			.ok_or(ConfigError::Missing {
				key: "membership.api_key",
				env: "MEMBERBRIDGE_SERVER_ACTIONNETWORK_API_KEY",
			})?;

		let rule = CustomFieldRule::from_fields(self.required_fields.unwrap_or_default());
		if rule.is_empty() {
			return Err(ConfigError::Validation(
				"membership.required_fields is empty, so nobody would ever be verified. \
				 Set MEMBERBRIDGE_SERVER_MEMBERSHIP_REQUIRED_FIELDS, e.g. \
				 'Membership_Status=Current;Local_Party=Example Branch'"
					.to_string(),
			));
		}

		Ok(MembershipConfig {
			api_key,
			base_url: self
				.base_url
				.filter(|u| !u.trim().is_empty())
				.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
			instance_name: self
				.instance_name
				.filter(|n| !n.trim().is_empty())
				.unwrap_or_else(|| "Action Network".to_string()),
			rule,
		})
	}
}
