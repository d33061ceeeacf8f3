// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Request identity resolution.
//!
//! The server does not authenticate anybody itself. An edge proxy that owns
//! sessions forwards the caller's identity in `x-yukpo-*` headers, and
//! [`HeaderIdentityResolver`] turns them into an [`IdentitySnapshot`].
//!
//! # Security
//!
//! These headers are trusted as-is. The service must only be reachable
//! through a proxy that strips any client-supplied `x-yukpo-*` header before
//! setting its own; a caller that reaches the port directly can claim any
//! role. The listener binds to loopback by default and browsers are not
//! allowed to send these headers cross-origin (see [`CORS_ALLOWED_HEADERS`]).

use std::str::FromStr;

use async_trait::async_trait;
use axum::http::{header, HeaderMap, HeaderName};
use uuid::Uuid;
use yukpo_access_core::{Claim, Plan, Role, User, UserId};
use yukpo_access_gate::{DevFallback, IdentitySnapshot};

pub const USER_ID_HEADER: &str = "x-yukpo-user-id";
pub const USER_EMAIL_HEADER: &str = "x-yukpo-user-email";
pub const ROLE_HEADER: &str = "x-yukpo-role";
pub const PLAN_HEADER: &str = "x-yukpo-plan";

/// Request headers browsers may send cross-origin. Identity headers are not
/// listed.
pub const CORS_ALLOWED_HEADERS: [HeaderName; 2] = [header::CONTENT_TYPE, header::ACCEPT];

/// True for any header the resolver reads identity from.
pub fn is_identity_header(name: &HeaderName) -> bool {
	[USER_ID_HEADER, USER_EMAIL_HEADER, ROLE_HEADER, PLAN_HEADER]
		.iter()
		.any(|h| name.as_str().eq_ignore_ascii_case(h))
}

/// Resolves the identity snapshot of an incoming request.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
	async fn resolve(&self, headers: &HeaderMap) -> IdentitySnapshot;
}

/// Reads identity from proxy-set headers.
///
/// A request is identified only when it carries a valid user id. Missing or
/// unknown role and plan values are kept as unrecognized claims, which no
/// condition accepts.
#[derive(Debug, Clone, Default)]
pub struct HeaderIdentityResolver {
	fallback: DevFallback,
}

impl HeaderIdentityResolver {
	pub fn new(fallback: DevFallback) -> Self {
		Self { fallback }
	}

	fn user_from_headers(headers: &HeaderMap) -> Option<User> {
		let raw_id = header_str(headers, USER_ID_HEADER)?;
		let id = match Uuid::parse_str(raw_id) {
			Ok(id) => UserId::new(id),
			Err(e) => {
				tracing::warn!(header = USER_ID_HEADER, error = %e, "ignoring malformed user id");
				return None;
			}
		};

		let email = header_str(headers, USER_EMAIL_HEADER).unwrap_or_default();
		let role: Claim<Role> = header_claim(headers, ROLE_HEADER);
		let plan: Claim<Plan> = header_claim(headers, PLAN_HEADER);

		Some(User::new(id, email, role, plan))
	}
}

#[async_trait]
impl IdentityResolver for HeaderIdentityResolver {
	async fn resolve(&self, headers: &HeaderMap) -> IdentitySnapshot {
		let identity = IdentitySnapshot::from(Self::user_from_headers(headers));
		self.fallback.apply(identity)
	}
}

fn header_claim<T: FromStr>(headers: &HeaderMap, name: &str) -> Claim<T> {
	match header_str(headers, name) {
		Some(raw) => Claim::parse(raw),
		None => Claim::Unrecognized(String::new()),
	}
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
	headers
		.get(name)
		.and_then(|v| v.to_str().ok())
		.map(str::trim)
		.filter(|v| !v.is_empty())
}
