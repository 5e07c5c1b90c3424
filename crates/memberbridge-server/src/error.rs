// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Server error types and HTTP response conversions.

use std::sync::Arc;

use axum::{
	http::StatusCode,
	response::{Html, IntoResponse, Response},
};
use memberbridge_actionnetwork::ActionNetworkError;
use memberbridge_captcha::CaptchaError;
use memberbridge_nextcloud::NextcloudError;
use memberbridge_provisioning::FlowError;
use memberbridge_smtp::SmtpError;

use crate::pages::{self, PageContext};

/// A request that ends on the error page.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
	/// The account flow could not finish. The page names the groupware
	/// instance and nothing else.
	#[error("Account request failed: {source}")]
	Flow {
		pages: Arc<PageContext>,
		#[source]
		source: FlowError,
	},
}

impl IntoResponse for ServerError {
	fn into_response(self) -> Response {
		match self {
			ServerError::Flow { pages, source } => {
				tracing::error!(
					category = source.category(),
					error = %source,
					"Rendering error page"
				);
				(StatusCode::BAD_GATEWAY, Html(pages::error_page(&pages))).into_response()
			}
		}
	}
}

/// Failures while building the clients at startup.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
	#[error("Groupware client: {0}")]
	Groupware(#[from] NextcloudError),

	#[error("Membership client: {0}")]
	Membership(#[from] ActionNetworkError),

	#[error("CAPTCHA client: {0}")]
	Captcha(#[from] CaptchaError),

	#[error("SMTP transport: {0}")]
	Smtp(#[from] SmtpError),
}

#[cfg(test)]
mod tests {
	use super::*;

	fn pages() -> Arc<PageContext> {
		Arc::new(PageContext {
			groupware_name: "Green Cloud".to_string(),
			groupware_host: "https://cloud.example.org".to_string(),
			site_key: None,
		})
	}

	#[test]
	fn test_flow_error_is_bad_gateway() {
		let response = ServerError::Flow {
			pages: pages(),
			source: FlowError::InvalidUsername,
		}
		.into_response();
		assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
	}

	#[test]
	fn test_display_carries_cause() {
		let err = ServerError::Flow {
			pages: pages(),
			source: FlowError::InvalidUsername,
		};
		assert!(err.to_string().starts_with("Account request failed"));
	}
}
