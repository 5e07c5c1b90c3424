// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! HTTP front end for memberbridge.
//!
//! Serves the e-mail form, hands each submission to
//! [`memberbridge_provisioning::AccountFlow`] and renders the outcome page.

pub mod api;
pub mod client_ip;
pub mod error;
pub mod pages;
pub mod routes;
pub mod version;

pub use api::{create_app_state, create_router, AppState};
pub use error::{ServerError, StartupError};
pub use pages::PageContext;
