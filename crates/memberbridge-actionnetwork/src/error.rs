// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Error types for the Action Network client and membership rules.

use thiserror::Error;

/// Errors that can occur when querying the Action Network API.
#[derive(Debug, Error)]
pub enum ActionNetworkError {
	/// The configured base URL is unusable.
	#[error("invalid Action Network base URL: {0}")]
	InvalidBaseUrl(String),

	/// Network-level error during HTTP communication.
	#[error("Network error: {0}")]
	Network(#[from] reqwest::Error),

	/// Request timed out.
	#[error("Request timed out")]
	Timeout,

	/// The API token was rejected.
	#[error("Invalid API token")]
	Unauthorized,

	/// The API answered with a non-success status.
	#[error("Action Network API error: HTTP {status}")]
	ApiError { status: u16 },

	/// The body could not be read as a people collection.
	#[error("Invalid response from Action Network: {0}")]
	InvalidResponse(String),

	/// The filter matched zero or several people.
	#[error("expected exactly one person, found {count}")]
	NoUniqueMatch { count: usize },
}

/// Errors from parsing a `Field=Value;Field=Value` rule.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RuleParseError {
	#[error("rule entry '{0}' is not of the form Field=Value")]
	MissingSeparator(String),

	#[error("rule entry '{0}' has an empty field name")]
	EmptyField(String),
}
