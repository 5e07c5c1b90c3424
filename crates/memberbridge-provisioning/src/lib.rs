// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Account reset and provisioning for memberbridge.
//!
//! [`AccountFlow`] takes one form submission and decides between resetting an
//! existing groupware password, creating an account for a verified member, or
//! mailing a "no account found" notice. Every collaborator is a trait object,
//! so the same flow runs against the real HTTP clients and against the fakes
//! in [`testing`].

pub mod credential;
pub mod error;
pub mod flow;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use credential::{generate_password, PASSWORD_BYTES};
pub use error::FlowError;
pub use flow::{AccountFlow, AccountRequest, FlowOutcome, DEFAULT_GROUPS};
