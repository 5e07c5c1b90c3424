// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Nextcloud connection settings.

use memberbridge_common_secret::SecretString;
use serde::Deserialize;

use crate::error::ConfigError;

fn default_groups() -> Vec<String> {
	vec!["Members".to_string()]
}

/// Groupware configuration (runtime, fully resolved).
#[derive(Debug, Clone)]
pub struct GroupwareConfig {
	/// Root URL of the instance, e.g. `https://cloud.example.org`.
	pub host: String,
	/// Admin user the provisioning calls authenticate as.
	pub username: String,
	pub app_password: SecretString,
	/// Name shown on pages and in mail subjects.
	pub instance_name: String,
	/// Groups every new account joins.
	pub groups: Vec<String>,
}

/// Groupware configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GroupwareConfigLayer {
	#[serde(default)]
	pub host: Option<String>,
	#[serde(default)]
	pub username: Option<String>,
	#[serde(default)]
	pub app_password: Option<SecretString>,
	#[serde(default)]
	pub instance_name: Option<String>,
	#[serde(default)]
	pub groups: Option<Vec<String>>,
}

impl GroupwareConfigLayer {
	pub fn merge(&mut self, other: GroupwareConfigLayer) {
		if other.host.is_some() {
			self.host = other.host;
		}
		if other.username.is_some() {
			self.username = other.username;
		}
		if other.app_password.is_some() {
			self.app_password = other.app_password;
		}
		if other.instance_name.is_some() {
			self.instance_name = other.instance_name;
		}
		if other.groups.is_some() {
			self.groups = other.groups;
		}
	}

	pub fn build(self) -> Result<GroupwareConfig, ConfigError> {
		let host = self
			.host
			.filter(|h| !h.trim().is_empty())
			.ok_or(ConfigError::Missing {
				key: "groupware.host",
				env: "MEMBERBRIDGE_SERVER_NEXTCLOUD_HOST",
			})?;
		let username = self
			.username
			.filter(|u| !u.trim().is_empty())
			.ok_or(ConfigError::Missing {
				key: "groupware.username",
				env: "MEMBERBRIDGE_SERVER_NEXTCLOUD_USER",
			})?;
		let app_password = self
			.app_password
			.filter(|p| !p.is_empty())
			.ok_or(ConfigError::Missing {
				key: "groupware.app_password",
				env: "MEMBERBRIDGE_SERVER_NEXTCLOUD_PASSWORD",
			})?;

		let groups = self
			.groups
			.map(|groups| {
				groups
					.into_iter()
					.map(|g| g.trim().to_string())
					.filter(|g| !g.is_empty())
					.collect::<Vec<_>>()
			})
			.filter(|groups| !groups.is_empty())
			.unwrap_or_else(default_groups);

		Ok(GroupwareConfig {
			host: host.trim_end_matches('/').to_string(),
			username,
			app_password,
			instance_name: self
				.instance_name
				.filter(|n| !n.trim().is_empty())
				.unwrap_or_else(|| "Nextcloud".to_string()),
			groups,
		})
	}
}
