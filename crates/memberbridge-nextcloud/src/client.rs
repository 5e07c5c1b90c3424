// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Nextcloud OCS provisioning API client implementation.

use std::time::Duration;

use async_trait::async_trait;
use memberbridge_common_secret::SecretString;
use reqwest::{header::ACCEPT, Client, RequestBuilder};
use tracing::{debug, error, instrument, warn};
use url::Url;

use crate::error::NextcloudError;
use crate::types::{AccountLookup, OcsEnvelope, ProvisioningRequest, UserDetails, UserList};
use crate::GroupwareDirectory;

/// Header Nextcloud requires on OCS calls made outside a browser session.
const OCS_API_REQUEST_HEADER: &str = "OCS-APIRequest";

const USERS_PATH: [&str; 4] = ["ocs", "v1.php", "cloud", "users"];

/// Search hits beyond this many are not checked one by one.
const MAX_SEARCH_CANDIDATES: usize = 20;

/// Connection settings for the Nextcloud admin account used to provision users.
#[derive(Debug, Clone)]
pub struct NextcloudConfig {
	/// Root URL of the instance, e.g. `https://cloud.example.org`.
	pub host: String,
	/// Admin user with provisioning rights.
	pub username: String,
	/// App password for `username`.
	pub app_password: SecretString,
	pub timeout: Duration,
}

/// HTTP client for the Nextcloud user provisioning API.
#[derive(Debug, Clone)]
pub struct NextcloudClient {
	http_client: Client,
	users_url: Url,
	username: String,
	app_password: SecretString,
}

impl NextcloudClient {
	/// Builds a client. Fails if the host is not an absolute http(s) URL.
	pub fn new(config: NextcloudConfig) -> Result<Self, NextcloudError> {
		let users_url = users_url(&config.host)?;
		let http_client = memberbridge_common_http::new_client_with_timeout(config.timeout)?;

		Ok(Self {
			http_client,
			users_url,
			username: config.username,
			app_password: config.app_password,
		})
	}

	fn search_url(&self, email: &str) -> Url {
		let mut url = self.users_url.clone();
		url
			.query_pairs_mut()
			.append_pair("format", "json")
			.append_pair("search", email);
		url
	}

	fn collection_url(&self) -> Url {
		let mut url = self.users_url.clone();
		url.query_pairs_mut().append_pair("format", "json");
		url
	}

	fn user_url(&self, user_id: &str) -> Url {
		let mut url = self.users_url.clone();
		if let Ok(mut segments) = url.path_segments_mut() {
			segments.push(user_id);
		}
		url.query_pairs_mut().append_pair("format", "json");
		url
	}

	async fn send(&self, request: RequestBuilder) -> Result<OcsEnvelope, NextcloudError> {
		let response = request
			.basic_auth(&self.username, Some(self.app_password.expose()))
			.header(OCS_API_REQUEST_HEADER, "true")
			.header(ACCEPT, "application/json")
			.send()
			.await
			.map_err(|e| {
				if e.is_timeout() {
					error!("Nextcloud request timed out");
					return NextcloudError::Timeout;
				}
				error!(error = %e, "Network error during Nextcloud request");
				NextcloudError::Network(e)
			})?;

		let status = response.status();
		debug!(status = %status, "Received response from Nextcloud");

		let body = response.text().await.map_err(NextcloudError::Network)?;

		serde_json::from_str(&body).map_err(|e| {
			error!(status = status.as_u16(), error = %e, "Nextcloud response is not an OCS envelope");
			NextcloudError::InvalidResponse {
				status: status.as_u16(),
				message: e.to_string(),
			}
		})
	}
}

impl NextcloudClient {
	/// Registered address of one account, from `GET users/{id}`.
	async fn registered_email(&self, user_id: &str) -> Result<Option<String>, NextcloudError> {
		let envelope = self.send(self.http_client.get(self.user_url(user_id))).await?;
		if !envelope.is_ok() {
			return Err(api_error(envelope));
		}

		let details: UserDetails =
			serde_json::from_value(envelope.ocs.data).map_err(|e| NextcloudError::InvalidResponse {
				status: 200,
				message: format!("unexpected user payload: {e}"),
			})?;
		Ok(details.email)
	}
}

fn api_error(envelope: OcsEnvelope) -> NextcloudError {
	let meta = envelope.ocs.meta;
	NextcloudError::Api {
		status: meta.status,
		statuscode: meta.statuscode,
		message: meta.message.unwrap_or_default(),
	}
}

/// Addresses compare trimmed and case-insensitively.
fn same_address(registered: &str, submitted: &str) -> bool {
	registered.trim().eq_ignore_ascii_case(submitted.trim())
}

#[async_trait]
impl GroupwareDirectory for NextcloudClient {
	#[instrument(skip(self), name = "NextcloudClient::find_by_email")]
	async fn find_by_email(&self, email: &str) -> Result<AccountLookup, NextcloudError> {
		let envelope = self.send(self.http_client.get(self.search_url(email))).await?;

		if !envelope.is_ok() {
			let err = api_error(envelope);
			error!(error = %err, "Nextcloud user search failed");
			return Err(err);
		}

		let users: UserList =
			serde_json::from_value(envelope.ocs.data).map_err(|e| NextcloudError::InvalidResponse {
				status: 200,
				message: format!("unexpected search payload: {e}"),
			})?;

		// The search also matches substrings of user ids, display names and
		// other addresses, so every hit is checked against its registered
		// address before it counts.
		let candidates = users.users;
		if candidates.len() > MAX_SEARCH_CANDIDATES {
			warn!(count = candidates.len(), "E-mail search matched too many Nextcloud accounts");
			return Err(NextcloudError::AmbiguousMatch {
				count: candidates.len(),
			});
		}

		let mut owners = Vec::new();
		for user_id in candidates {
			match self.registered_email(&user_id).await? {
				Some(registered) if same_address(&registered, email) => owners.push(user_id),
				_ => debug!(user_id = %user_id, "Search hit is registered to another address"),
			}
		}

		match owners.len() {
			0 => {
				debug!("No Nextcloud account for e-mail");
				Ok(AccountLookup::NotFound)
			}
			1 => {
				let user_id = owners.remove(0);
				debug!(user_id = %user_id, "Found Nextcloud account");
				Ok(AccountLookup::Found { user_id })
			}
			count => {
				warn!(count, "E-mail address is registered to several Nextcloud accounts");
				Err(NextcloudError::AmbiguousMatch { count })
			}
		}
	}

	#[instrument(
		skip(self, request),
		fields(username = %request.username, groups = ?request.groups),
		name = "NextcloudClient::create_account"
	)]
	async fn create_account(&self, request: &ProvisioningRequest) -> Result<bool, NextcloudError> {
		let mut form: Vec<(&str, &str)> = vec![
			("userid", request.username.as_str()),
			("password", request.password.expose().as_str()),
			("displayName", request.display_name.as_str()),
			("email", request.email.as_str()),
		];
		for group in &request.groups {
			form.push(("groups[]", group.as_str()));
		}

		let envelope = self
			.send(self.http_client.post(self.collection_url()).form(&form))
			.await?;

		if envelope.is_ok() {
			debug!("Nextcloud account created");
			Ok(true)
		} else {
			warn!(
				statuscode = ?envelope.ocs.meta.statuscode,
				ocs_message = envelope.ocs.meta.message.as_deref().unwrap_or(""),
				"Nextcloud rejected account creation"
			);
			Ok(false)
		}
	}

	#[instrument(skip(self, password), name = "NextcloudClient::reset_password")]
	async fn reset_password(
		&self,
		user_id: &str,
		password: &SecretString,
	) -> Result<bool, NextcloudError> {
		let form = [("key", "password"), ("value", password.expose().as_str())];

		let envelope = self
			.send(self.http_client.put(self.user_url(user_id)).form(&form))
			.await?;

		if envelope.is_ok() {
			debug!("Nextcloud password replaced");
			Ok(true)
		} else {
			warn!(
				statuscode = ?envelope.ocs.meta.statuscode,
				ocs_message = envelope.ocs.meta.message.as_deref().unwrap_or(""),
				"Nextcloud rejected password change"
			);
			Ok(false)
		}
	}
}

/// `{host}/ocs/v1.php/cloud/users`, keeping any path prefix on the host.
fn users_url(host: &str) -> Result<Url, NextcloudError> {
	let mut url = Url::parse(host).map_err(|e| NextcloudError::InvalidHost(format!("{host}: {e}")))?;
	if !matches!(url.scheme(), "http" | "https") {
		return Err(NextcloudError::InvalidHost(format!(
			"{host}: scheme must be http or https"
		)));
	}
	url.set_query(None);
	url.set_fragment(None);
	url
		.path_segments_mut()
		.map_err(|_| NextcloudError::InvalidHost(format!("{host}: cannot be a base URL")))?
		.pop_if_empty()
		.extend(USERS_PATH);
	Ok(url)
}
