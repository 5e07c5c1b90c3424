// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Membership record and the OSDI people collection it is built from.

use std::collections::BTreeMap;

use serde::Deserialize;

/// The fields of a person record memberbridge cares about.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MembershipRecord {
	pub given_name: String,
	pub family_name: String,
	pub email_address: String,
	pub custom_fields: BTreeMap<String, String>,
}

impl MembershipRecord {
	pub fn custom_field(&self, name: &str) -> Option<&str> {
		self.custom_fields.get(name).map(String::as_str)
	}
}

#[derive(Debug, Deserialize)]
pub(crate) struct PeopleResponse {
	#[serde(rename = "_embedded")]
	pub embedded: EmbeddedPeople,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EmbeddedPeople {
	#[serde(rename = "osdi:people", default)]
	pub people: Vec<Person>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Person {
	#[serde(default)]
	pub given_name: Option<String>,
	#[serde(default)]
	pub family_name: Option<String>,
	#[serde(default)]
	pub email_addresses: Vec<EmailAddress>,
	#[serde(default)]
	pub custom_fields: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EmailAddress {
	#[serde(default)]
	pub primary: bool,
	#[serde(default)]
	pub address: Option<String>,
}

impl Person {
	/// Builds a record, falling back to `searched_email` when the person has
	/// no usable address on file.
	pub fn into_record(self, searched_email: &str) -> MembershipRecord {
		let email_address = self
			.email_addresses
			.iter()
			.find(|e| e.primary)
			.or_else(|| self.email_addresses.first())
			.and_then(|e| e.address.clone())
			.unwrap_or_else(|| searched_email.to_string());

		let custom_fields = self
			.custom_fields
			.into_iter()
			.map(|(name, value)| {
				let text = match value {
					serde_json::Value::String(s) => s,
					other => other.to_string(),
				};
				(name, text)
			})
			.collect();

		MembershipRecord {
			given_name: self.given_name.unwrap_or_default(),
			family_name: self.family_name.unwrap_or_default(),
			email_address,
			custom_fields,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn person(json: &str) -> Person {
		serde_json::from_str(json).unwrap()
	}

	#[test]
	fn record_uses_primary_address() {
		let record = person(
			r#"{"given_name":"Ada","family_name":"Lovelace","email_addresses":[
				{"primary":false,"address":"old@example.org"},
				{"primary":true,"address":"ada@example.org"}]}"#,
		)
		.into_record("searched@example.org");
		assert_eq!(record.email_address, "ada@example.org");
		assert_eq!(record.given_name, "Ada");
		assert_eq!(record.family_name, "Lovelace");
	}

	#[test]
	fn record_falls_back_to_searched_address() {
		let record = person(r#"{"given_name":"Ada"}"#).into_record("searched@example.org");
		assert_eq!(record.email_address, "searched@example.org");
		assert_eq!(record.family_name, "");
	}

	#[test]
	fn non_string_custom_fields_are_rendered_as_json_text() {
		let record = person(
			r#"{"custom_fields":{"Membership_Status":"Current","Years":3,"Founding":true}}"#,
		)
		.into_record("x@example.org");
		assert_eq!(record.custom_field("Membership_Status"), Some("Current"));
		assert_eq!(record.custom_field("Years"), Some("3"));
		assert_eq!(record.custom_field("Founding"), Some("true"));
		assert_eq!(record.custom_field("Missing"), None);
	}

	#[test]
	fn people_response_requires_embedded() {
		assert!(serde_json::from_str::<PeopleResponse>(r#"{"total_records":0}"#).is_err());
		let empty: PeopleResponse = serde_json::from_str(r#"{"_embedded":{}}"#).unwrap();
		assert!(empty.embedded.people.is_empty());
	}
}
