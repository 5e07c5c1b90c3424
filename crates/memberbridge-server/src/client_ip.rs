// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Peer address extraction.

use std::net::{IpAddr, SocketAddr};

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;

/// Address of the connected peer, when the server was started with connect
/// info. Forwarding headers are not trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientIp(pub Option<IpAddr>);

impl<S> FromRequestParts<S> for ClientIp
where
	S: Send + Sync,
{
	type Rejection = std::convert::Infallible;

	async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
		Ok(ClientIp(
			parts
				.extensions
				.get::<ConnectInfo<SocketAddr>>()
				.map(|ConnectInfo(addr)| addr.ip()),
		))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use axum::http::Request;

	async fn extract(request: Request<()>) -> ClientIp {
		let (mut parts, _) = request.into_parts();
		ClientIp::from_request_parts(&mut parts, &())
			.await
			.unwrap()
	}

	#[tokio::test]
	async fn test_without_connect_info() {
		let ip = extract(Request::new(())).await;
		assert_eq!(ip, ClientIp(None));
	}

	#[tokio::test]
	async fn test_with_connect_info() {
		let mut request = Request::new(());
		let addr: SocketAddr = "203.0.113.7:51000".parse().unwrap();
		request.extensions_mut().insert(ConnectInfo(addr));

		let ip = extract(request).await;
		assert_eq!(ip, ClientIp(Some(addr.ip())));
	}

	#[tokio::test]
	async fn test_ignores_forwarded_for() {
		let request = Request::builder()
			.header("x-forwarded-for", "198.51.100.1")
			.body(())
			.unwrap();
		assert_eq!(extract(request).await, ClientIp(None));
	}
}
