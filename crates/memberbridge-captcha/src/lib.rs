// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! reCAPTCHA verification for form submissions.
//!
//! The account form embeds the reCAPTCHA v2 widget, which posts its assertion
//! in the `g-recaptcha-response` form field. [`RecaptchaClient`] checks that
//! assertion against Google's `siteverify` endpoint.

use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use memberbridge_common_secret::SecretString;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error, instrument, warn};

pub const DEFAULT_VERIFY_URL: &str = "https://www.google.com/recaptcha/api/siteverify";

#[derive(Debug, thiserror::Error)]
pub enum CaptchaError {
	#[error("Network error: {0}")]
	Network(#[from] reqwest::Error),

	#[error("Request timed out")]
	Timeout,

	#[error("Invalid response from verification service: {0}")]
	InvalidResponse(String),
}

/// Checks a CAPTCHA assertion. `Ok(false)` means the user did not pass;
/// `Err` means the verification service could not be asked.
#[async_trait]
pub trait CaptchaVerifier: Send + Sync {
	async fn verify(&self, response: &str, remote_ip: Option<IpAddr>) -> Result<bool, CaptchaError>;
}

#[derive(Debug, Clone)]
pub struct RecaptchaConfig {
	pub secret_key: SecretString,
	pub verify_url: String,
	pub timeout: Duration,
}

impl RecaptchaConfig {
	pub fn new(secret_key: SecretString) -> Self {
		Self {
			secret_key,
			verify_url: DEFAULT_VERIFY_URL.to_string(),
			timeout: memberbridge_common_http::DEFAULT_TIMEOUT,
		}
	}
}

#[derive(Debug, Deserialize)]
struct SiteVerifyResponse {
	success: bool,
	#[serde(rename = "error-codes", default)]
	error_codes: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct RecaptchaClient {
	http_client: Client,
	verify_url: String,
	secret_key: SecretString,
}

impl RecaptchaClient {
	pub fn new(config: RecaptchaConfig) -> Result<Self, CaptchaError> {
		let http_client = memberbridge_common_http::new_client_with_timeout(config.timeout)?;
		Ok(Self {
			http_client,
			verify_url: config.verify_url,
			secret_key: config.secret_key,
		})
	}
}

#[async_trait]
impl CaptchaVerifier for RecaptchaClient {
	#[instrument(skip(self, response), name = "RecaptchaClient::verify")]
	async fn verify(&self, response: &str, remote_ip: Option<IpAddr>) -> Result<bool, CaptchaError> {
		if response.trim().is_empty() {
			debug!("CAPTCHA response missing, not contacting verification service");
			return Ok(false);
		}

		let remote_ip = remote_ip.map(|ip| ip.to_string());
		let mut form = vec![
			("secret", self.secret_key.expose().as_str()),
			("response", response),
		];
		if let Some(ip) = remote_ip.as_deref() {
			form.push(("remoteip", ip));
		}

		let reply = self
			.http_client
			.post(&self.verify_url)
			.form(&form)
			.send()
			.await
			.map_err(|e| {
				if e.is_timeout() {
					error!("CAPTCHA verification timed out");
					return CaptchaError::Timeout;
				}
				error!(error = %e, "Network error during CAPTCHA verification");
				CaptchaError::Network(e)
			})?;

		let status = reply.status();
		if !status.is_success() {
			error!(status = status.as_u16(), "CAPTCHA verification service error");
			return Err(CaptchaError::InvalidResponse(format!("HTTP {status}")));
		}

		let verdict: SiteVerifyResponse = reply
			.json()
			.await
			.map_err(|e| CaptchaError::InvalidResponse(format!("JSON parse error: {e}")))?;

		if verdict.success {
			debug!("CAPTCHA passed");
		} else {
			debug!(error_codes = ?verdict.error_codes, "CAPTCHA rejected");
		}
		Ok(verdict.success)
	}
}

/// Accepts every submission. For local development only.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledCaptcha;

#[async_trait]
impl CaptchaVerifier for DisabledCaptcha {
	async fn verify(&self, _response: &str, _remote_ip: Option<IpAddr>) -> Result<bool, CaptchaError> {
		warn!("CAPTCHA verification disabled, accepting submission");
		Ok(true)
	}
}
