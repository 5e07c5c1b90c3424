// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! HTTP server and outbound client configuration.

use std::time::Duration;

use serde::Deserialize;

const DEFAULT_CLIENT_TIMEOUT_SECS: u64 = 15;

/// HTTP configuration (runtime, fully resolved).
#[derive(Debug, Clone)]
pub struct HttpConfig {
	pub host: String,
	pub port: u16,
	/// Timeout applied to every outbound API call.
	pub client_timeout: Duration,
}

impl Default for HttpConfig {
	fn default() -> Self {
		HttpConfigLayer::default().finalize()
	}
}

/// HTTP configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HttpConfigLayer {
	#[serde(default)]
	pub host: Option<String>,
	#[serde(default)]
	pub port: Option<u16>,
	#[serde(default)]
	pub client_timeout_secs: Option<u64>,
}

impl HttpConfigLayer {
	pub fn merge(&mut self, other: HttpConfigLayer) {
		if other.host.is_some() {
			self.host = other.host;
		}
		if other.port.is_some() {
			self.port = other.port;
		}
		if other.client_timeout_secs.is_some() {
			self.client_timeout_secs = other.client_timeout_secs;
		}
	}

	pub fn finalize(self) -> HttpConfig {
		HttpConfig {
			host: self.host.unwrap_or_else(|| "0.0.0.0".to_string()),
			port: self.port.unwrap_or(8080),
			client_timeout: Duration::from_secs(
				self
					.client_timeout_secs
					.filter(|secs| *secs > 0)
					.unwrap_or(DEFAULT_CLIENT_TIMEOUT_SECS),
			),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_default_values() {
		let config = HttpConfigLayer::default().finalize();
		assert_eq!(config.host, "0.0.0.0");
		assert_eq!(config.port, 8080);
		assert_eq!(config.client_timeout, Duration::from_secs(15));
	}

	#[test]
	fn test_merge_overwrites() {
		let mut base = HttpConfigLayer {
			host: Some("127.0.0.1".to_string()),
			port: Some(3000),
			client_timeout_secs: None,
		};
		base.merge(HttpConfigLayer {
			host: None,
			port: Some(9000),
			client_timeout_secs: Some(5),
		});
		assert_eq!(base.host, Some("127.0.0.1".to_string()));
		assert_eq!(base.port, Some(9000));
		assert_eq!(base.client_timeout_secs, Some(5));
	}

	#[test]
	fn test_zero_timeout_falls_back() {
		let config = HttpConfigLayer {
			client_timeout_secs: Some(0),
			..Default::default()
		}
		.finalize();
		assert_eq!(config.client_timeout, Duration::from_secs(15));
	}
}
