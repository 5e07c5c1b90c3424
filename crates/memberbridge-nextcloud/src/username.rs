// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Username and display name derivation from a member's name fields.
//!
//! Usernames are not deduplicated: two members called "Jo Bloggs" derive the
//! same username and the second create call is rejected by Nextcloud.

use regex::Regex;
use std::sync::LazyLock;

static NON_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\W+").unwrap());

/// Concatenates given and family name and strips every non-word character.
///
/// ```
/// use memberbridge_nextcloud::derive_username;
///
/// assert_eq!(derive_username("O'Brien", "Smith-Jones"), "OBrienSmithJones");
/// ```
pub fn derive_username(given_name: &str, family_name: &str) -> String {
	let joined = format!("{given_name}{family_name}");
	NON_WORD.replace_all(&joined, "").into_owned()
}

/// `"{given} {family}"`, trimmed so a missing part leaves no stray space.
pub fn derive_display_name(given_name: &str, family_name: &str) -> String {
	format!("{given_name} {family_name}").trim().to_string()
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn strips_apostrophes_and_hyphens() {
		assert_eq!(derive_username("O'Brien", "Smith-Jones"), "OBrienSmithJones");
	}

	#[test]
	fn strips_spaces_and_punctuation() {
		assert_eq!(derive_username("Mary Ann", "St. Clair"), "MaryAnnStClair");
	}

	#[test]
	fn keeps_underscores_digits_and_non_ascii_letters() {
		assert_eq!(derive_username("Zoë_2", "Müller"), "Zoë_2Müller");
	}

	#[test]
	fn only_punctuation_yields_empty() {
		assert_eq!(derive_username("--", "'"), "");
	}

	#[test]
	fn display_name_joins_with_space() {
		assert_eq!(derive_display_name("Ada", "Lovelace"), "Ada Lovelace");
		assert_eq!(derive_display_name("Ada", ""), "Ada");
	}

	proptest! {
		#[test]
		fn username_contains_only_word_characters(
			given in "\\PC{0,20}",
			family in "\\PC{0,20}"
		) {
			let username = derive_username(&given, &family);
			prop_assert!(!NON_WORD.is_match(&username));
		}

		#[test]
		fn word_only_names_are_concatenated_unchanged(
			given in "[A-Za-z0-9_]{1,15}",
			family in "[A-Za-z0-9_]{1,15}"
		) {
			prop_assert_eq!(derive_username(&given, &family), format!("{given}{family}"));
		}
	}
}
