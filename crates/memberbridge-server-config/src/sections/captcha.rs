// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! reCAPTCHA configuration.

use memberbridge_common_secret::SecretString;
use serde::Deserialize;

use crate::error::ConfigError;

#[derive(Debug, Clone)]
pub struct CaptchaConfig {
	pub enabled: bool,
	/// Public key rendered into the form widget.
	pub site_key: String,
	/// `None` only when disabled.
	pub secret_key: Option<SecretString>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CaptchaConfigLayer {
	#[serde(default)]
	pub enabled: Option<bool>,
	#[serde(default)]
	pub site_key: Option<String>,
	#[serde(default)]
	pub secret_key: Option<SecretString>,
}

impl CaptchaConfigLayer {
	pub fn merge(&mut self, other: CaptchaConfigLayer) {
		if other.enabled.is_some() {
			self.enabled = other.enabled;
		}
		if other.site_key.is_some() {
			self.site_key = other.site_key;
		}
		if other.secret_key.is_some() {
			self.secret_key = other.secret_key;
		}
	}

	pub fn build(self) -> Result<CaptchaConfig, ConfigError> {
		let enabled = self.enabled.unwrap_or(true);
		let site_key = self.site_key.unwrap_or_default();
		let secret_key = self.secret_key.filter(|k| !k.is_empty());

		if enabled {
			if site_key.trim().is_empty() {
				return Err(ConfigError::Missing {
					key: "captcha.site_key",
					env: "MEMBERBRIDGE_SERVER_RECAPTCHA_SITE_KEY",
				});
			}
			if secret_key.is_none() {
				return Err(ConfigError::Missing {
					key: "captcha.secret_key",
					env: "MEMBERBRIDGE_SERVER_RECAPTCHA_SECRET_KEY",
				});
			}
		}

		Ok(CaptchaConfig {
			enabled,
			site_key,
			secret_key,
		})
	}
}
