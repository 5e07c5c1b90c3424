// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Environment variable helpers.
//!
//! Secrets follow the `VAR` / `VAR_FILE` convention used by Docker and
//! Kubernetes secret mounts.

use std::path::PathBuf;
use std::{env, fs};

use memberbridge_common_secret::SecretString;

use crate::error::ConfigError;

/// Load a secret from the environment using the `VAR` / `VAR_FILE` convention.
///
/// # Precedence
///
/// 1. If `{var}_FILE` is set, read the secret from that file path
/// 2. Otherwise, if `{var}` is set and non-empty, use its value directly
/// 3. Otherwise, return `Ok(None)`
///
/// A single trailing newline is stripped from file contents.
pub fn load_secret_env(var: &str) -> Result<Option<SecretString>, ConfigError> {
	let file_var = format!("{var}_FILE");

	if let Ok(path_str) = env::var(&file_var) {
		if path_str.is_empty() {
			return Err(ConfigError::Secret(format!("secret file path in {file_var} is empty")));
		}

		let path = PathBuf::from(&path_str);
		let content = fs::read_to_string(&path).map_err(|e| {
			ConfigError::Secret(format!("failed to read secret file at {}: {e}", path.display()))
		})?;

		let secret = content.strip_suffix('\n').unwrap_or(&content).to_string();
		return Ok(Some(SecretString::new(secret)));
	}

	Ok(env_var(var).map(SecretString::new))
}

pub(crate) fn env_var(name: &str) -> Option<String> {
	env::var(name).ok().filter(|s| !s.is_empty())
}

/// Strict boolean: `true/1/yes/on` or `false/0/no/off`, case-insensitive.
/// Anything else is an error rather than a silent `false`.
pub(crate) fn env_bool(name: &str) -> Result<Option<bool>, ConfigError> {
	match env_var(name) {
		Some(v) => match v.trim().to_ascii_lowercase().as_str() {
			"true" | "1" | "yes" | "on" => Ok(Some(true)),
			"false" | "0" | "no" | "off" => Ok(Some(false)),
			_ => Err(ConfigError::InvalidValue {
				key: name.to_string(),
				message: format!("invalid boolean value '{v}', expected true/false"),
			}),
		},
		None => Ok(None),
	}
}

pub(crate) fn env_u16(name: &str) -> Result<Option<u16>, ConfigError> {
	match env_var(name) {
		Some(v) => v.parse().map(Some).map_err(|_| ConfigError::InvalidValue {
			key: name.to_string(),
			message: format!("invalid u16 value '{v}'"),
		}),
		None => Ok(None),
	}
}

pub(crate) fn env_u64(name: &str) -> Result<Option<u64>, ConfigError> {
	match env_var(name) {
		Some(v) => v.parse().map(Some).map_err(|_| ConfigError::InvalidValue {
			key: name.to_string(),
			message: format!("invalid u64 value '{v}'"),
		}),
		None => Ok(None),
	}
}

/// Comma separated list, blanks dropped.
pub(crate) fn env_list(name: &str) -> Option<Vec<String>> {
	env_var(name).map(|s| {
		s.split(',')
			.map(|s| s.trim().to_string())
			.filter(|s| !s.is_empty())
			.collect()
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;
	use tempfile::NamedTempFile;

	// Each test uses its own variable names, so they can run in parallel.

	#[test]
	fn direct_value_is_used() {
		env::set_var("MB_TEST_SECRET_DIRECT", "hunter2");
		let secret = load_secret_env("MB_TEST_SECRET_DIRECT").unwrap().unwrap();
		assert_eq!(secret.expose(), "hunter2");
		env::remove_var("MB_TEST_SECRET_DIRECT");
	}

	#[test]
	fn file_takes_precedence_and_strips_one_newline() {
		let mut file = NamedTempFile::new().unwrap();
		writeln!(file, "from-file").unwrap();

		env::set_var("MB_TEST_SECRET_BOTH", "from-env");
		env::set_var("MB_TEST_SECRET_BOTH_FILE", file.path());
		let secret = load_secret_env("MB_TEST_SECRET_BOTH").unwrap().unwrap();
		assert_eq!(secret.expose(), "from-file");
		env::remove_var("MB_TEST_SECRET_BOTH");
		env::remove_var("MB_TEST_SECRET_BOTH_FILE");
	}

	#[test]
	fn empty_file_path_is_an_error() {
		env::set_var("MB_TEST_SECRET_EMPTY_FILE", "");
		assert!(matches!(
			load_secret_env("MB_TEST_SECRET_EMPTY"),
			Err(ConfigError::Secret(_))
		));
		env::remove_var("MB_TEST_SECRET_EMPTY_FILE");
	}

	#[test]
	fn missing_file_is_an_error() {
		env::set_var("MB_TEST_SECRET_GONE_FILE", "/nonexistent/memberbridge/secret");
		assert!(load_secret_env("MB_TEST_SECRET_GONE").is_err());
		env::remove_var("MB_TEST_SECRET_GONE_FILE");
	}

	#[test]
	fn unset_and_empty_are_none() {
		assert!(load_secret_env("MB_TEST_SECRET_UNSET").unwrap().is_none());
		env::set_var("MB_TEST_SECRET_BLANK", "");
		assert!(load_secret_env("MB_TEST_SECRET_BLANK").unwrap().is_none());
		env::remove_var("MB_TEST_SECRET_BLANK");
	}

	#[test]
	fn list_splits_and_trims() {
		env::set_var("MB_TEST_LIST", "Members, Volunteers ,,");
		assert_eq!(
			env_list("MB_TEST_LIST"),
			Some(vec!["Members".to_string(), "Volunteers".to_string()])
		);
		env::remove_var("MB_TEST_LIST");
	}

	#[test]
	fn bool_accepts_common_spellings() {
		for (value, expected) in [
			("true", true),
			("True ", true),
			("1", true),
			("YES", true),
			("on", true),
			("false", false),
			("0", false),
			("No", false),
			(" off", false),
		] {
			env::set_var("MB_TEST_BOOL_OK", value);
			assert_eq!(env_bool("MB_TEST_BOOL_OK").unwrap(), Some(expected), "{value:?}");
		}
		env::remove_var("MB_TEST_BOOL_OK");
		assert_eq!(env_bool("MB_TEST_BOOL_OK").unwrap(), None);
	}

	#[test]
	fn bool_rejects_unknown_values() {
		for value in ["enabled", "2", "ture", "y e s"] {
			env::set_var("MB_TEST_BOOL_BAD", value);
			let err = env_bool("MB_TEST_BOOL_BAD").unwrap_err();
			assert!(
				matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "MB_TEST_BOOL_BAD"),
				"{value:?}"
			);
		}
		env::remove_var("MB_TEST_BOOL_BAD");
	}

	#[test]
	fn invalid_port_names_the_variable() {
		env::set_var("MB_TEST_PORT", "eighty");
		let err = env_u16("MB_TEST_PORT").unwrap_err();
		assert!(err.to_string().contains("MB_TEST_PORT"));
		env::remove_var("MB_TEST_PORT");
	}
}
