// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Public request/result types and the OCS wire envelope.

use memberbridge_common_secret::SecretString;
use serde::Deserialize;

/// Outcome of an e-mail search against the user directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountLookup {
	NotFound,
	Found { user_id: String },
}

/// Everything needed to create one groupware account.
#[derive(Debug, Clone)]
pub struct ProvisioningRequest {
	pub username: String,
	pub display_name: String,
	pub email: String,
	pub password: SecretString,
	pub groups: Vec<String>,
}

/// `{ "ocs": { "meta": {...}, "data": ... } }`
#[derive(Debug, Deserialize)]
pub(crate) struct OcsEnvelope {
	pub ocs: Ocs,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Ocs {
	pub meta: OcsMeta,
	// Failed calls answer with `"data": []`, so keep it untyped until the
	// status is known.
	#[serde(default)]
	pub data: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OcsMeta {
	pub status: String,
	#[serde(default)]
	pub statuscode: Option<u32>,
	#[serde(default)]
	pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserList {
	#[serde(default)]
	pub users: Vec<String>,
}

/// The part of `GET users/{id}` the lookup needs. Nextcloud answers `null`
/// for accounts without an address.
#[derive(Debug, Deserialize)]
pub(crate) struct UserDetails {
	#[serde(default)]
	pub email: Option<String>,
}

impl OcsEnvelope {
	pub fn is_ok(&self) -> bool {
		self.ocs.meta.status == "ok"
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_successful_search() {
		let body = r#"{"ocs":{"meta":{"status":"ok","statuscode":100,"message":"OK"},"data":{"users":["alice"]}}}"#;
		let envelope: OcsEnvelope = serde_json::from_str(body).unwrap();
		assert!(envelope.is_ok());
		let users: UserList = serde_json::from_value(envelope.ocs.data).unwrap();
		assert_eq!(users.users, vec!["alice".to_string()]);
	}

	#[test]
	fn parses_failure_with_empty_array_data() {
		let body = r#"{"ocs":{"meta":{"status":"failure","statuscode":102,"message":"User already exists"},"data":[]}}"#;
		let envelope: OcsEnvelope = serde_json::from_str(body).unwrap();
		assert!(!envelope.is_ok());
		assert_eq!(envelope.ocs.meta.statuscode, Some(102));
		assert_eq!(
			envelope.ocs.meta.message.as_deref(),
			Some("User already exists")
		);
	}

	#[test]
	fn missing_data_defaults_to_null() {
		let body = r#"{"ocs":{"meta":{"status":"ok"}}}"#;
		let envelope: OcsEnvelope = serde_json::from_str(body).unwrap();
		assert!(envelope.is_ok());
		assert!(envelope.ocs.data.is_null());
	}

	#[test]
	fn parses_user_details_with_null_email() {
		let details: UserDetails =
			serde_json::from_value(serde_json::json!({"id": "ada", "email": null})).unwrap();
		assert!(details.email.is_none());
		let details: UserDetails =
			serde_json::from_value(serde_json::json!({"id": "ada", "email": "ada@example.org"}))
				.unwrap();
		assert_eq!(details.email.as_deref(), Some("ada@example.org"));
	}

	#[test]
	fn provisioning_request_debug_hides_password() {
		let request = ProvisioningRequest {
			username: "AdaLovelace".to_string(),
			display_name: "Ada Lovelace".to_string(),
			email: "ada@example.org".to_string(),
			password: SecretString::new("generated-secret".to_string()),
			groups: vec!["Members".to_string()],
		};
		let debug = format!("{request:?}");
		assert!(debug.contains("AdaLovelace"));
		assert!(!debug.contains("generated-secret"));
	}
}
