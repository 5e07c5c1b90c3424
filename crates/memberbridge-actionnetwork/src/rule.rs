// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Membership verification rules.

use std::collections::BTreeMap;

use crate::error::RuleParseError;
use crate::types::MembershipRecord;

/// Decides whether a membership record entitles its owner to an account.
pub trait MembershipRule: Send + Sync {
	fn is_verified(&self, record: &MembershipRecord) -> bool;
}

impl<F> MembershipRule for F
where
	F: Fn(&MembershipRecord) -> bool + Send + Sync,
{
	fn is_verified(&self, record: &MembershipRecord) -> bool {
		self(record)
	}
}

/// Every listed custom field must be present and equal to its value
/// (exact, case-sensitive). An empty rule verifies nobody.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomFieldRule {
	required: BTreeMap<String, String>,
}

impl CustomFieldRule {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn from_fields(required: BTreeMap<String, String>) -> Self {
		Self { required }
	}

	/// Adds a `field == value` requirement.
	pub fn require(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
		self.required.insert(field.into(), value.into());
		self
	}

	/// Parses `Field=Value;Field=Value`. Whitespace around names and values
	/// is trimmed and empty entries are skipped.
	///
	/// ```
	/// use memberbridge_actionnetwork::CustomFieldRule;
	///
	/// let rule = CustomFieldRule::parse("Membership_Status=Current; Local_Party=Stroud").unwrap();
	/// assert_eq!(rule.len(), 2);
	/// ```
	pub fn parse(input: &str) -> Result<Self, RuleParseError> {
		let mut required = BTreeMap::new();
		for entry in input.split(';').map(str::trim).filter(|e| !e.is_empty()) {
			let (field, value) = entry
				.split_once('=')
				.ok_or_else(|| RuleParseError::MissingSeparator(entry.to_string()))?;
			let field = field.trim();
			if field.is_empty() {
				return Err(RuleParseError::EmptyField(entry.to_string()));
			}
			required.insert(field.to_string(), value.trim().to_string());
		}
		Ok(Self { required })
	}

	pub fn is_empty(&self) -> bool {
		self.required.is_empty()
	}

	pub fn len(&self) -> usize {
		self.required.len()
	}

	pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
		self.required.iter().map(|(k, v)| (k.as_str(), v.as_str()))
	}
}

impl MembershipRule for CustomFieldRule {
	fn is_verified(&self, record: &MembershipRecord) -> bool {
		!self.required.is_empty()
			&& self
				.required
				.iter()
				.all(|(field, expected)| record.custom_field(field) == Some(expected.as_str()))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	fn record(fields: &[(&str, &str)]) -> MembershipRecord {
		MembershipRecord {
			given_name: "Ada".to_string(),
			family_name: "Lovelace".to_string(),
			email_address: "ada@example.org".to_string(),
			custom_fields: fields
				.iter()
				.map(|(k, v)| (k.to_string(), v.to_string()))
				.collect(),
		}
	}

	fn branch_rule() -> CustomFieldRule {
		CustomFieldRule::new()
			.require("Membership_Status", "Current")
			.require("Local_Party", "Stroud District Green Party")
	}

	#[test]
	fn current_member_of_branch_is_verified() {
		let member = record(&[
			("Membership_Status", "Current"),
			("Local_Party", "Stroud District Green Party"),
		]);
		assert!(branch_rule().is_verified(&member));
	}

	#[test]
	fn lapsed_member_is_not_verified() {
		let member = record(&[
			("Membership_Status", "Lapsed"),
			("Local_Party", "Stroud District Green Party"),
		]);
		assert!(!branch_rule().is_verified(&member));
	}

	#[test]
	fn member_of_other_branch_is_not_verified() {
		let member = record(&[
			("Membership_Status", "Current"),
			("Local_Party", "Bristol Green Party"),
		]);
		assert!(!branch_rule().is_verified(&member));
	}

	#[test]
	fn missing_field_is_not_verified() {
		let member = record(&[("Membership_Status", "Current")]);
		assert!(!branch_rule().is_verified(&member));
	}

	#[test]
	fn comparison_is_case_sensitive() {
		let member = record(&[
			("Membership_Status", "current"),
			("Local_Party", "Stroud District Green Party"),
		]);
		assert!(!branch_rule().is_verified(&member));
	}

	#[test]
	fn empty_rule_verifies_nobody() {
		let member = record(&[("Membership_Status", "Current")]);
		assert!(!CustomFieldRule::new().is_verified(&member));
	}

	#[test]
	fn closures_are_rules() {
		let rule = |r: &MembershipRecord| r.family_name == "Lovelace";
		assert!(rule.is_verified(&record(&[])));
	}

	#[test]
	fn parse_reads_pairs_and_trims() {
		let rule =
			CustomFieldRule::parse(" Membership_Status = Current ;Local_Party=Stroud District Green Party;")
				.unwrap();
		assert_eq!(rule, branch_rule());
	}

	#[test]
	fn parse_keeps_equals_signs_in_values() {
		let rule = CustomFieldRule::parse("Note=a=b").unwrap();
		assert_eq!(rule.fields().collect::<Vec<_>>(), vec![("Note", "a=b")]);
	}

	#[test]
	fn parse_rejects_malformed_entries() {
		assert_eq!(
			CustomFieldRule::parse("Membership_Status"),
			Err(RuleParseError::MissingSeparator("Membership_Status".to_string()))
		);
		assert_eq!(
			CustomFieldRule::parse("=Current"),
			Err(RuleParseError::EmptyField("=Current".to_string()))
		);
	}

	#[test]
	fn parse_of_blank_string_is_empty() {
		assert!(CustomFieldRule::parse("  ; ").unwrap().is_empty());
	}

	proptest! {
		#[test]
		fn record_matching_every_field_is_verified(
			fields in proptest::collection::btree_map("[A-Za-z_]{1,12}", "[A-Za-z ]{0,12}", 1..5)
		) {
			let rule = CustomFieldRule::from_fields(fields.clone());
			let member = MembershipRecord {
				custom_fields: fields,
				..MembershipRecord::default()
			};
			prop_assert!(rule.is_verified(&member));
		}
	}
}
