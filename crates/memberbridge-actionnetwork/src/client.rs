// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Action Network REST API client implementation.

use std::time::Duration;

use async_trait::async_trait;
use memberbridge_common_secret::SecretString;
use reqwest::{header::ACCEPT, Client, StatusCode};
use tracing::{debug, error, instrument, trace, warn};
use url::Url;

use crate::error::ActionNetworkError;
use crate::types::{MembershipRecord, PeopleResponse};
use crate::MembershipDirectory;

pub const DEFAULT_BASE_URL: &str = "https://actionnetwork.org/api/v2";

const API_TOKEN_HEADER: &str = "OSDI-API-Token";

#[derive(Debug, Clone)]
pub struct ActionNetworkConfig {
	pub base_url: String,
	pub api_key: SecretString,
	pub timeout: Duration,
}

impl ActionNetworkConfig {
	pub fn new(api_key: SecretString) -> Self {
		Self {
			base_url: DEFAULT_BASE_URL.to_string(),
			api_key,
			timeout: memberbridge_common_http::DEFAULT_TIMEOUT,
		}
	}
}

/// Client for the Action Network people endpoint.
#[derive(Debug, Clone)]
pub struct ActionNetworkClient {
	http_client: Client,
	people_url: Url,
	api_key: SecretString,
}

impl ActionNetworkClient {
	pub fn new(config: ActionNetworkConfig) -> Result<Self, ActionNetworkError> {
		let people_url = people_url(&config.base_url)?;
		let http_client = memberbridge_common_http::new_client_with_timeout(config.timeout)?;

		Ok(Self {
			http_client,
			people_url,
			api_key: config.api_key,
		})
	}

	/// Fetches the unique person whose e-mail address is `email`.
	#[instrument(skip(self), name = "ActionNetworkClient::search_person")]
	pub async fn search_person(&self, email: &str) -> Result<MembershipRecord, ActionNetworkError> {
		let mut url = self.people_url.clone();
		url
			.query_pairs_mut()
			.append_pair("filter", &email_filter(email));

		debug!("Sending people search to Action Network");

		let response = self
			.http_client
			.get(url)
			.header(API_TOKEN_HEADER, self.api_key.expose())
			.header(ACCEPT, "application/hal+json")
			.send()
			.await
			.map_err(|e| {
				if e.is_timeout() {
					error!("Action Network request timed out");
					return ActionNetworkError::Timeout;
				}
				error!(error = %e, "Network error during Action Network request");
				ActionNetworkError::Network(e)
			})?;

		let status = response.status();
		debug!(status = %status, "Received response from Action Network");

		if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
			error!(status = status.as_u16(), "Action Network rejected the API token");
			return Err(ActionNetworkError::Unauthorized);
		}
		if !status.is_success() {
			error!(status = status.as_u16(), "Action Network API error");
			return Err(ActionNetworkError::ApiError {
				status: status.as_u16(),
			});
		}

		let body = response.text().await.map_err(ActionNetworkError::Network)?;
		trace!(bytes = body.len(), "Response body received");

		let people: PeopleResponse = serde_json::from_str(&body)
			.map_err(|e| ActionNetworkError::InvalidResponse(format!("JSON parse error: {e}")))?;

		let mut matches = people.embedded.people;
		if matches.len() != 1 {
			return Err(ActionNetworkError::NoUniqueMatch {
				count: matches.len(),
			});
		}

		let record = matches.remove(0).into_record(email);
		debug!(custom_fields = record.custom_fields.len(), "Found person record");
		Ok(record)
	}
}

#[async_trait]
impl MembershipDirectory for ActionNetworkClient {
	async fn find_by_email(&self, email: &str) -> Option<MembershipRecord> {
		match self.search_person(email).await {
			Ok(record) => Some(record),
			Err(ActionNetworkError::NoUniqueMatch { count }) => {
				debug!(count, "No unique Action Network person for e-mail");
				None
			}
			Err(e) => {
				warn!(error = %e, "Action Network lookup failed, treating as not found");
				None
			}
		}
	}
}

/// `email_address eq '<email>'`, with single quotes doubled so the address
/// cannot close the literal.
fn email_filter(email: &str) -> String {
	format!("email_address eq '{}'", email.replace('\'', "''"))
}

fn people_url(base_url: &str) -> Result<Url, ActionNetworkError> {
	let mut url = Url::parse(base_url)
		.map_err(|e| ActionNetworkError::InvalidBaseUrl(format!("{base_url}: {e}")))?;
	url
		.path_segments_mut()
		.map_err(|_| ActionNetworkError::InvalidBaseUrl(format!("{base_url}: cannot be a base URL")))?
		.pop_if_empty()
		.push("people");
	Ok(url)
}
