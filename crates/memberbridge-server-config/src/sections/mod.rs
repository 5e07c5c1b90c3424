// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sections. Each has a runtime config and a partial layer.

mod captcha;
mod groupware;
mod http;
mod logging;
mod membership;
mod smtp;

pub use captcha::{CaptchaConfig, CaptchaConfigLayer};
pub use groupware::{GroupwareConfig, GroupwareConfigLayer};
pub use http::{HttpConfig, HttpConfigLayer};
pub use logging::{LogFormat, LoggingConfig, LoggingConfigLayer};
pub use membership::{MembershipConfig, MembershipConfigLayer};
pub use smtp::SmtpConfigLayer;
