// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration management for the memberbridge server.
//!
//! This crate provides:
//! - Layered configuration from multiple sources (defaults, TOML file, environment)
//! - Type-safe configuration with validation at startup
//! - Consistent environment variable naming (`MEMBERBRIDGE_SERVER_*`)
//! - The `VAR_FILE` convention for every secret
//!
//! # Usage
//!
//! ```ignore
//! use memberbridge_server_config::load_config;
//!
//! let config = load_config()?;
//! println!("Server listening on {}", config.socket_addr());
//! ```

pub mod env;
pub mod error;
pub mod layer;
pub mod sections;
pub mod sources;

pub use env::load_secret_env;
pub use error::ConfigError;
pub use layer::ServerConfigLayer;
pub use memberbridge_smtp::{SmtpConfig, TlsMode};
pub use sections::*;
pub use sources::{
	ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource, SYSTEM_CONFIG_PATH,
};

use tracing::{debug, info};

/// Fully resolved server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
	pub http: HttpConfig,
	pub groupware: GroupwareConfig,
	pub membership: MembershipConfig,
	pub smtp: SmtpConfig,
	pub captcha: CaptchaConfig,
	pub logging: LoggingConfig,
}

impl ServerConfig {
	/// Get the socket address string for binding.
	pub fn socket_addr(&self) -> String {
		format!("{}:{}", self.http.host, self.http.port)
	}
}

/// Load configuration from all sources with standard precedence.
///
/// Precedence (highest to lowest):
/// 1. Environment variables (`MEMBERBRIDGE_SERVER_*`)
/// 2. Config file (`/etc/memberbridge/server.toml`, skipped when absent)
/// 3. Built-in defaults
pub fn load_config() -> Result<ServerConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(EnvSource),
	])
}

/// Load configuration with a custom config file path, which must exist.
pub fn load_config_with_file(
	config_path: impl Into<std::path::PathBuf>,
) -> Result<ServerConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource),
	])
}

fn load_from_sources(mut sources: Vec<Box<dyn ConfigSource>>) -> Result<ServerConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = ServerConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		let layer = source.load()?;
		merged.merge(layer);
	}

	finalize(merged)
}

/// Resolve a merged layer into a validated configuration.
pub fn finalize(layer: ServerConfigLayer) -> Result<ServerConfig, ConfigError> {
	let http = layer.http.unwrap_or_default().finalize();
	let logging = layer.logging.unwrap_or_default().finalize();
	let groupware = layer.groupware.unwrap_or_default().build()?;
	let membership = layer.membership.unwrap_or_default().build()?;
	let smtp = layer
		.smtp
		.unwrap_or_default()
		.build(&groupware.instance_name)?;
	let captcha = layer.captcha.unwrap_or_default().build()?;

	info!(
		host = %http.host,
		port = http.port,
		groupware_host = %groupware.host,
		groupware_groups = ?groupware.groups,
		membership_base_url = %membership.base_url,
		membership_rule_fields = membership.rule.len(),
		smtp_host = %smtp.host,
		smtp_port = smtp.port,
		smtp_tls = ?smtp.tls_mode,
		captcha_enabled = captcha.enabled,
		"Server configuration loaded"
	);

	Ok(ServerConfig {
		http,
		groupware,
		membership,
		smtp,
		captcha,
		logging,
	})
}
