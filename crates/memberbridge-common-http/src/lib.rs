// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Shared outbound HTTP client construction.
//!
//! Every remote call memberbridge makes (Nextcloud, Action Network, reCAPTCHA)
//! goes through a client built here, so they all carry the same User-Agent and
//! none of them can block a request forever.

use reqwest::{Client, ClientBuilder};
use std::time::Duration;

/// Timeout applied when the caller does not configure one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Connect timeout; kept shorter than the overall request timeout.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Creates a client builder with the memberbridge User-Agent and the default
/// timeouts already applied.
pub fn builder() -> ClientBuilder {
	Client::builder()
		.user_agent(user_agent())
		.timeout(DEFAULT_TIMEOUT)
		.connect_timeout(CONNECT_TIMEOUT)
}

/// Creates a client with the given overall request timeout.
///
/// A zero timeout is replaced by [`DEFAULT_TIMEOUT`]; outbound calls are never
/// left unbounded.
pub fn new_client_with_timeout(timeout: Duration) -> reqwest::Result<Client> {
	let timeout = if timeout.is_zero() {
		DEFAULT_TIMEOUT
	} else {
		timeout
	};
	builder()
		.timeout(timeout)
		.connect_timeout(CONNECT_TIMEOUT.min(timeout))
		.build()
}

/// Returns the User-Agent string: `memberbridge/{version}`.
pub fn user_agent() -> String {
	format!("memberbridge/{}", env!("CARGO_PKG_VERSION"))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn user_agent_has_product_and_version() {
		let ua = user_agent();
		let parts: Vec<&str> = ua.split('/').collect();
		assert_eq!(parts.len(), 2);
		assert_eq!(parts[0], "memberbridge");
		assert!(!parts[1].is_empty());
	}

	#[test]
	fn client_builds_with_custom_timeout() {
		assert!(new_client_with_timeout(Duration::from_secs(3)).is_ok());
	}

	#[test]
	fn zero_timeout_still_builds() {
		assert!(new_client_with_timeout(Duration::ZERO).is_ok());
	}
}
