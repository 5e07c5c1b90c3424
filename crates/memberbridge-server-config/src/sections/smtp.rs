// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! SMTP configuration section for email delivery.

use std::time::Duration;

use memberbridge_common_secret::SecretString;
use memberbridge_smtp::{SmtpConfig, TlsMode};
use serde::Deserialize;

use crate::error::ConfigError;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration layer for SMTP settings (all fields optional for layering).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SmtpConfigLayer {
	/// SMTP server hostname.
	#[serde(default)]
	pub host: Option<String>,
	/// Defaults to the conventional port of the TLS mode.
	#[serde(default)]
	pub port: Option<u16>,
	#[serde(default)]
	pub tls_mode: Option<TlsMode>,
	#[serde(default)]
	pub username: Option<String>,
	#[serde(default)]
	pub password: Option<SecretString>,
	/// Defaults to the username, which is usually the mailbox address.
	#[serde(default)]
	pub from_address: Option<String>,
	#[serde(default)]
	pub from_name: Option<String>,
	#[serde(default)]
	pub timeout_secs: Option<u64>,
}

impl SmtpConfigLayer {
	/// Merge with another layer, preferring values from `other`.
	pub fn merge(&mut self, other: SmtpConfigLayer) {
		if other.host.is_some() {
			self.host = other.host;
		}
		if other.port.is_some() {
			self.port = other.port;
		}
		if other.tls_mode.is_some() {
			self.tls_mode = other.tls_mode;
		}
		if other.username.is_some() {
			self.username = other.username;
		}
		if other.password.is_some() {
			self.password = other.password;
		}
		if other.from_address.is_some() {
			self.from_address = other.from_address;
		}
		if other.from_name.is_some() {
			self.from_name = other.from_name;
		}
		if other.timeout_secs.is_some() {
			self.timeout_secs = other.timeout_secs;
		}
	}

	/// Builds the client config. `default_from_name` is used when no display
	/// name is configured.
	pub fn build(self, default_from_name: &str) -> Result<SmtpConfig, ConfigError> {
		let host = self
			.host
			.filter(|h| !h.trim().is_empty())
			.ok_or(ConfigError::Missing {
				key: "smtp.host",
				env: "MEMBERBRIDGE_SERVER_SMTP_HOST",
			})?;

		let from_address = self
			.from_address
			.or_else(|| self.username.clone())
			.filter(|a| !a.trim().is_empty())
			.ok_or(ConfigError::Missing {
				key: "smtp.from_address",
				env: "MEMBERBRIDGE_SERVER_SMTP_FROM_ADDRESS",
			})?;
		if !memberbridge_smtp::is_valid_email(&from_address) {
			return Err(ConfigError::InvalidValue {
				key: "smtp.from_address".to_string(),
				message: format!("'{from_address}' is not an e-mail address"),
			});
		}

		let tls_mode = self.tls_mode.unwrap_or_default();

		Ok(SmtpConfig {
			host,
			port: self.port.unwrap_or_else(|| tls_mode.default_port()),
			username: self.username.filter(|u| !u.is_empty()),
			password: self.password.filter(|p| !p.is_empty()),
			from_address,
			from_name: self
				.from_name
				.unwrap_or_else(|| default_from_name.to_string()),
			tls_mode,
			timeout: Duration::from_secs(
				self
					.timeout_secs
					.filter(|secs| *secs > 0)
					.unwrap_or(DEFAULT_TIMEOUT_SECS),
			),
		})
	}
}
