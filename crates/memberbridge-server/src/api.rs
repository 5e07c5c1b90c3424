// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Application state, wiring and the router.

use std::sync::Arc;

use axum::{
	routing::{get, post},
	Router,
};
use memberbridge_actionnetwork::{ActionNetworkClient, ActionNetworkConfig};
use memberbridge_captcha::{
	CaptchaVerifier, DisabledCaptcha, RecaptchaClient, RecaptchaConfig, DEFAULT_VERIFY_URL,
};
use memberbridge_email::{EmailContext, Notifier};
use memberbridge_nextcloud::{NextcloudClient, NextcloudConfig};
use memberbridge_provisioning::AccountFlow;
use memberbridge_server_config::ServerConfig;
use memberbridge_smtp::SmtpClient;
use tracing::{info, warn};

use crate::error::StartupError;
use crate::pages::PageContext;
use crate::routes;

/// Shared, immutable per-process state.
#[derive(Clone)]
pub struct AppState {
	pub flow: Arc<AccountFlow>,
	pub pages: Arc<PageContext>,
}

impl AppState {
	pub fn new(flow: AccountFlow, pages: PageContext) -> Self {
		Self {
			flow: Arc::new(flow),
			pages: Arc::new(pages),
		}
	}
}

/// Builds the real clients from configuration and wires them into a flow.
pub fn create_app_state(config: &ServerConfig) -> Result<AppState, StartupError> {
	let timeout = config.http.client_timeout;

	let groupware = NextcloudClient::new(NextcloudConfig {
		host: config.groupware.host.clone(),
		username: config.groupware.username.clone(),
		app_password: config.groupware.app_password.clone(),
		timeout,
	})?;

	let membership = ActionNetworkClient::new(ActionNetworkConfig {
		base_url: config.membership.base_url.clone(),
		api_key: config.membership.api_key.clone(),
		timeout,
	})?;

	let captcha: Arc<dyn CaptchaVerifier> = match config
		.captcha
		.secret_key
		.clone()
		.filter(|_| config.captcha.enabled)
	{
		Some(secret_key) => Arc::new(RecaptchaClient::new(RecaptchaConfig {
			secret_key,
			verify_url: DEFAULT_VERIFY_URL.to_string(),
			timeout,
		})?),
		None => {
			warn!("reCAPTCHA disabled, every submission passes the check");
			Arc::new(DisabledCaptcha)
		}
	};

	let smtp = SmtpClient::new(config.smtp.clone())?;
	let notifier = Notifier::new(
		Arc::new(smtp),
		EmailContext {
			groupware_name: config.groupware.instance_name.clone(),
			groupware_host: config.groupware.host.clone(),
			membership_name: config.membership.instance_name.clone(),
		},
	);

	let flow = AccountFlow::new(
		captcha,
		Arc::new(groupware),
		Arc::new(membership),
		Arc::new(config.membership.rule.clone()),
		notifier,
	)
	.with_groups(config.groupware.groups.clone());

	let pages = PageContext {
		groupware_name: config.groupware.instance_name.clone(),
		groupware_host: config.groupware.host.clone(),
		site_key: config
			.captcha
			.enabled
			.then(|| config.captcha.site_key.clone()),
	};

	info!(
		groupware = %pages.groupware_name,
		groups = ?flow.groups(),
		captcha_enabled = pages.site_key.is_some(),
		"Account flow ready"
	);

	Ok(AppState::new(flow, pages))
}

pub fn create_router(state: AppState) -> Router {
	Router::new()
		.route("/", get(routes::account::form))
		.route("/action", post(routes::account::submit))
		.route("/health", get(routes::health::health_check))
		.with_state(state)
}
