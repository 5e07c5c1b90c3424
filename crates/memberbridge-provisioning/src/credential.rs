// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! One-time password generation.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use memberbridge_common_secret::SecretString;
use rand::{rngs::OsRng, RngCore};
use zeroize::Zeroize;

/// Random bytes per password. Encodes to 24 URL-safe characters.
pub const PASSWORD_BYTES: usize = 18;

/// Generates a fresh password from the OS CSPRNG.
pub fn generate_password() -> SecretString {
	let mut bytes = [0u8; PASSWORD_BYTES];
	OsRng.fill_bytes(&mut bytes);
	let password = encode_password(&bytes);
	bytes.zeroize();
	SecretString::new(password)
}

fn encode_password(bytes: &[u8; PASSWORD_BYTES]) -> String {
	URL_SAFE_NO_PAD.encode(bytes)
}
