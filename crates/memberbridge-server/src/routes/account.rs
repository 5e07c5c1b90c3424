// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The form and its submission.

use axum::{extract::State, response::Html, Form};
use memberbridge_provisioning::{AccountRequest, FlowError, FlowOutcome};
use serde::Deserialize;
use tracing::instrument;

use crate::{
	api::AppState,
	client_ip::ClientIp,
	error::ServerError,
	pages::{self, CAPTCHA_FAILED_MESSAGE, INVALID_EMAIL_MESSAGE, MAIL_SENT_MESSAGE},
};

/// Body of `POST /action`.
#[derive(Debug, Deserialize)]
pub struct AccountForm {
	pub email: String,
	/// Filled in by the reCAPTCHA widget. Absent when the widget never ran.
	#[serde(rename = "g-recaptcha-response", default)]
	pub captcha_response: String,
}

/// GET / - The empty form.
pub async fn form(State(state): State<AppState>) -> Html<String> {
	Html(pages::form_page(&state.pages, "", ""))
}

/// POST /action - Runs the account flow and renders its outcome.
///
/// The three mail outcomes render byte-identical pages so the response never
/// tells whether the address is known anywhere.
#[instrument(name = "account::submit", skip_all)]
pub async fn submit(
	State(state): State<AppState>,
	ClientIp(remote_ip): ClientIp,
	Form(form): Form<AccountForm>,
) -> Result<Html<String>, ServerError> {
	let request = AccountRequest {
		email: form.email,
		captcha_response: form.captcha_response,
		remote_ip,
	};

	match state.flow.handle(&request).await {
		FlowOutcome::CaptchaRejected => Ok(Html(pages::form_page(
			&state.pages,
			&request.email,
			CAPTCHA_FAILED_MESSAGE,
		))),
		FlowOutcome::Error(FlowError::InvalidEmail) => Ok(Html(pages::form_page(
			&state.pages,
			&request.email,
			INVALID_EMAIL_MESSAGE,
		))),
		FlowOutcome::PasswordReset | FlowOutcome::AccountCreated | FlowOutcome::NoAccountNotice => {
			Ok(Html(pages::message_page(&state.pages, MAIL_SENT_MESSAGE)))
		}
		FlowOutcome::Error(source) => Err(ServerError::Flow {
			pages: state.pages.clone(),
			source,
		}),
	}
}
