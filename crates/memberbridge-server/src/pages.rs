// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! HTML pages.
//!
//! Three pages exist: the form, a one-line message page and the error page.
//! Every interpolated value is HTML-escaped.

/// Message on the page shown after any of the three mail outcomes.
pub const MAIL_SENT_MESSAGE: &str = "E-mail sent";

pub const CAPTCHA_FAILED_MESSAGE: &str = "CAPTCHA not completed correctly. Please try again.";

pub const INVALID_EMAIL_MESSAGE: &str = "Please enter a valid e-mail address.";

const RECAPTCHA_SCRIPT: &str = "https://www.google.com/recaptcha/api.js";

/// What every page needs to know about the deployment.
#[derive(Debug, Clone)]
pub struct PageContext {
	pub groupware_name: String,
	pub groupware_host: String,
	/// reCAPTCHA site key. `None` renders the form without the widget.
	pub site_key: Option<String>,
}

/// The e-mail form. `email` is echoed back into the input.
pub fn form_page(ctx: &PageContext, email: &str, message: &str) -> String {
	let mut body = String::new();
	body.push_str(&format!(
		"<h1>{} account</h1>\n\
		 <p>Enter your e-mail address. If you already have an account on \
		 <a href=\"{}\">{}</a> we will mail you a new password. If you are a \
		 verified member without an account we will create one and mail you \
		 the details.</p>\n",
		escape(&ctx.groupware_name),
		escape(&ctx.groupware_host),
		escape(&ctx.groupware_name),
	));
	if !message.is_empty() {
		body.push_str(&format!("<p class=\"message\">{}</p>\n", escape(message)));
	}
	body.push_str(&format!(
		"<form method=\"post\" action=\"/action\">\n\
		 <label for=\"email\">E-mail address</label>\n\
		 <input type=\"email\" id=\"email\" name=\"email\" value=\"{}\" required>\n",
		escape(email),
	));
	if let Some(site_key) = &ctx.site_key {
		body.push_str(&format!(
			"<div class=\"g-recaptcha\" data-sitekey=\"{}\"></div>\n",
			escape(site_key),
		));
	}
	body.push_str("<button type=\"submit\">Send</button>\n</form>\n");

	let head_extra = match ctx.site_key {
		Some(_) => format!("<script src=\"{RECAPTCHA_SCRIPT}\" async defer></script>\n"),
		None => String::new(),
	};
	layout(ctx, &head_extra, &body)
}

pub fn message_page(ctx: &PageContext, message: &str) -> String {
	let body = format!(
		"<h1>{}</h1>\n<p><a href=\"{}\">Go to {}</a></p>\n",
		escape(message),
		escape(&ctx.groupware_host),
		escape(&ctx.groupware_name),
	);
	layout(ctx, "", &body)
}

/// Generic failure page. Never carries details of the failure.
pub fn error_page(ctx: &PageContext) -> String {
	let body = format!(
		"<h1>Something went wrong</h1>\n\
		 <p>We could not process your request for a {name} account. \
		 Please try again later.</p>\n\
		 <p><a href=\"/\">Back</a> | <a href=\"{host}\">Go to {name}</a></p>\n",
		name = escape(&ctx.groupware_name),
		host = escape(&ctx.groupware_host),
	);
	layout(ctx, "", &body)
}

fn layout(ctx: &PageContext, head_extra: &str, body: &str) -> String {
	format!(
		"<!DOCTYPE html>\n\
		 <html lang=\"en\">\n\
		 <head>\n\
		 <meta charset=\"utf-8\">\n\
		 <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
		 <title>{} account</title>\n\
		 {head_extra}\
		 </head>\n\
		 <body>\n\
		 {body}\
		 </body>\n\
		 </html>\n",
		escape(&ctx.groupware_name),
	)
}

/// Escapes text for use in element content and quoted attributes.
pub fn escape(input: &str) -> String {
	let mut out = String::with_capacity(input.len());
	for c in input.chars() {
		match c {
			'&' => out.push_str("&amp;"),
			'<' => out.push_str("&lt;"),
			'>' => out.push_str("&gt;"),
			'"' => out.push_str("&quot;"),
			'\'' => out.push_str("&#x27;"),
			_ => out.push(c),
		}
	}
	out
}
