// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Error types for the Nextcloud client.

use thiserror::Error;

/// Errors that can occur when talking to the Nextcloud OCS API.
#[derive(Debug, Error)]
pub enum NextcloudError {
	/// The configured host is not a usable base URL.
	#[error("invalid Nextcloud host URL: {0}")]
	InvalidHost(String),

	/// Network-level error during HTTP communication.
	#[error("Network error: {0}")]
	Network(#[from] reqwest::Error),

	/// Request timed out.
	#[error("Request timed out")]
	Timeout,

	/// The status envelope reported a failure.
	#[error("Nextcloud API error: {status} ({statuscode:?}) {message}")]
	Api {
		status: String,
		statuscode: Option<u32>,
		message: String,
	},

	/// The body was not an OCS status envelope.
	#[error("Invalid response from Nextcloud (HTTP {status}): {message}")]
	InvalidResponse { status: u16, message: String },

	/// The e-mail search matched more than one account.
	#[error("{count} Nextcloud accounts match the e-mail address")]
	AmbiguousMatch { count: usize },
}
