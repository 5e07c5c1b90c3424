// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: environment variables and TOML files.

use std::collections::BTreeMap;
use std::path::PathBuf;

use memberbridge_actionnetwork::CustomFieldRule;
use memberbridge_smtp::TlsMode;
use tracing::{debug, trace};

use crate::env::{env_bool, env_list, env_u16, env_u64, env_var, load_secret_env};
use crate::error::ConfigError;
use crate::layer::ServerConfigLayer;
use crate::sections::{
	CaptchaConfigLayer, GroupwareConfigLayer, HttpConfigLayer, LogFormat, LoggingConfigLayer,
	MembershipConfigLayer, SmtpConfigLayer,
};

/// Default location of the TOML config file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/memberbridge/server.toml";

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	ConfigFile = 20,
	Environment = 50,
}

/// Trait for configuration sources.
pub trait ConfigSource: Send + Sync {
	fn name(&self) -> &'static str;
	fn precedence(&self) -> Precedence;
	fn load(&self) -> Result<ServerConfigLayer, ConfigError>;
}

/// Built-in defaults source.
pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		debug!("loading defaults");
		Ok(ServerConfigLayer::default())
	}
}

/// TOML file configuration source.
pub struct TomlSource {
	path: PathBuf,
	required: bool,
}

impl TomlSource {
	/// A file the operator asked for explicitly. Missing is an error.
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self {
			path: path.into(),
			required: true,
		}
	}

	/// The system-wide file. Skipped when absent.
	pub fn system() -> Self {
		Self {
			path: PathBuf::from(SYSTEM_CONFIG_PATH),
			required: false,
		}
	}
}

impl ConfigSource for TomlSource {
	fn name(&self) -> &'static str {
		"toml-config"
	}

	fn precedence(&self) -> Precedence {
		Precedence::ConfigFile
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		if !self.required && !self.path.exists() {
			debug!(path = %self.path.display(), "config file not found, skipping");
			return Ok(ServerConfigLayer::default());
		}

		debug!(path = %self.path.display(), "loading config file");
		let content = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::FileRead {
			path: self.path.clone(),
			source: e,
		})?;

		let layer: ServerConfigLayer =
			toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
				path: self.path.clone(),
				source: e,
			})?;

		trace!("parsed config layer from TOML");
		Ok(layer)
	}
}

/// Environment variable source.
///
/// Convention: MEMBERBRIDGE_SERVER_<FIELD>
pub struct EnvSource;

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		debug!("loading environment variables");
		Ok(ServerConfigLayer {
			http: Some(load_http_from_env()?),
			groupware: Some(load_groupware_from_env()?),
			membership: Some(load_membership_from_env()?),
			smtp: Some(load_smtp_from_env()?),
			captcha: Some(load_captcha_from_env()?),
			logging: Some(load_logging_from_env()?),
		})
	}
}

fn load_http_from_env() -> Result<HttpConfigLayer, ConfigError> {
	Ok(HttpConfigLayer {
		host: env_var("MEMBERBRIDGE_SERVER_HOST"),
		port: env_u16("MEMBERBRIDGE_SERVER_PORT")?,
		client_timeout_secs: env_u64("MEMBERBRIDGE_SERVER_HTTP_CLIENT_TIMEOUT_SECS")?,
	})
}

fn load_groupware_from_env() -> Result<GroupwareConfigLayer, ConfigError> {
	Ok(GroupwareConfigLayer {
		host: env_var("MEMBERBRIDGE_SERVER_NEXTCLOUD_HOST"),
		username: env_var("MEMBERBRIDGE_SERVER_NEXTCLOUD_USER"),
		app_password: load_secret_env("MEMBERBRIDGE_SERVER_NEXTCLOUD_PASSWORD")?,
		instance_name: env_var("MEMBERBRIDGE_SERVER_NEXTCLOUD_INSTANCE_NAME"),
		groups: env_list("MEMBERBRIDGE_SERVER_NEXTCLOUD_GROUPS"),
	})
}

fn load_membership_from_env() -> Result<MembershipConfigLayer, ConfigError> {
	let required_fields = match env_var("MEMBERBRIDGE_SERVER_MEMBERSHIP_REQUIRED_FIELDS") {
		Some(v) => {
			let rule = CustomFieldRule::parse(&v).map_err(|e| ConfigError::InvalidValue {
				key: "MEMBERBRIDGE_SERVER_MEMBERSHIP_REQUIRED_FIELDS".to_string(),
				message: e.to_string(),
			})?;
			Some(
				rule
					.fields()
					.map(|(k, v)| (k.to_string(), v.to_string()))
					.collect::<BTreeMap<_, _>>(),
			)
		}
		None => None,
	};

	Ok(MembershipConfigLayer {
		api_key: load_secret_env("MEMBERBRIDGE_SERVER_ACTIONNETWORK_API_KEY")?,
		base_url: env_var("MEMBERBRIDGE_SERVER_ACTIONNETWORK_BASE_URL"),
		instance_name: env_var("MEMBERBRIDGE_SERVER_ACTIONNETWORK_INSTANCE_NAME"),
		required_fields,
	})
}

fn load_smtp_from_env() -> Result<SmtpConfigLayer, ConfigError> {
	let tls_mode = match env_var("MEMBERBRIDGE_SERVER_SMTP_TLS") {
		Some(v) => Some(
			TlsMode::from_env_value(&v).map_err(|e| ConfigError::InvalidValue {
				key: "MEMBERBRIDGE_SERVER_SMTP_TLS".to_string(),
				message: e.to_string(),
			})?,
		),
		None => None,
	};

	Ok(SmtpConfigLayer {
		host: env_var("MEMBERBRIDGE_SERVER_SMTP_HOST"),
		port: env_u16("MEMBERBRIDGE_SERVER_SMTP_PORT")?,
		tls_mode,
		username: env_var("MEMBERBRIDGE_SERVER_SMTP_USERNAME"),
		password: load_secret_env("MEMBERBRIDGE_SERVER_SMTP_PASSWORD")?,
		from_address: env_var("MEMBERBRIDGE_SERVER_SMTP_FROM_ADDRESS"),
		from_name: env_var("MEMBERBRIDGE_SERVER_SMTP_FROM_NAME"),
		timeout_secs: env_u64("MEMBERBRIDGE_SERVER_SMTP_TIMEOUT_SECS")?,
	})
}

fn load_captcha_from_env() -> Result<CaptchaConfigLayer, ConfigError> {
	Ok(CaptchaConfigLayer {
		enabled: env_bool("MEMBERBRIDGE_SERVER_RECAPTCHA_ENABLED")?,
		site_key: env_var("MEMBERBRIDGE_SERVER_RECAPTCHA_SITE_KEY"),
		secret_key: load_secret_env("MEMBERBRIDGE_SERVER_RECAPTCHA_SECRET_KEY")?,
	})
}

fn load_logging_from_env() -> Result<LoggingConfigLayer, ConfigError> {
	let format = match env_var("MEMBERBRIDGE_SERVER_LOG_FORMAT") {
		Some(v) => Some(LogFormat::parse(&v).ok_or_else(|| ConfigError::InvalidValue {
			key: "MEMBERBRIDGE_SERVER_LOG_FORMAT".to_string(),
			message: format!("invalid log format '{v}', expected pretty or json"),
		})?),
		None => None,
	};

	Ok(LoggingConfigLayer {
		level: env_var("MEMBERBRIDGE_SERVER_LOG_LEVEL"),
		format,
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;
	use tempfile::NamedTempFile;

	#[test]
	fn test_precedence_ordering() {
		assert!(Precedence::Environment > Precedence::ConfigFile);
		assert!(Precedence::ConfigFile > Precedence::Defaults);
	}

	#[test]
	fn test_defaults_source_returns_empty_layer() {
		let layer = DefaultsSource.load().unwrap();
		assert!(layer.http.is_none());
		assert!(layer.smtp.is_none());
	}

	#[test]
	fn test_explicit_toml_source_missing_file_is_error() {
		let source = TomlSource::new("/nonexistent/memberbridge.toml");
		assert!(matches!(source.load(), Err(ConfigError::FileRead { .. })));
	}

	#[test]
	fn test_toml_source_reads_sections() {
		let mut file = NamedTempFile::new().unwrap();
		write!(
			file,
			r#"
[http]
port = 9090

[groupware]
host = "https://cloud.example.org"
username = "provisioner"
app_password = "app-pass"
groups = ["Members", "Volunteers"]

[membership]
api_key = "osdi"

[membership.required_fields]
Membership_Status = "Current"

[smtp]
host = "smtp.example.org"
tls_mode = "starttls"
"#
		)
		.unwrap();

		let layer = TomlSource::new(file.path()).load().unwrap();
		assert_eq!(layer.http.unwrap().port, Some(9090));
		let groupware = layer.groupware.unwrap();
		assert_eq!(groupware.app_password.unwrap().expose(), "app-pass");
		assert_eq!(groupware.groups.map(|g| g.len()), Some(2));
		assert_eq!(layer.smtp.unwrap().tls_mode, Some(TlsMode::StartTls));
	}

	#[test]
	fn test_toml_source_reports_parse_errors() {
		let mut file = NamedTempFile::new().unwrap();
		write!(file, "[http\nport = ").unwrap();

		assert!(matches!(
			TomlSource::new(file.path()).load(),
			Err(ConfigError::TomlParse { .. })
		));
	}
}
