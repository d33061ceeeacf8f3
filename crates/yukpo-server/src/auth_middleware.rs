// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Identity middleware and extractors.
//!
//! [`identity_layer`] resolves the caller once per request and stores an
//! [`AccessContext`] in the request extensions. Handlers and route layers read
//! it back through [`CurrentIdentity`] or [`RequireAuth`].

use std::convert::Infallible;

use axum::{
	extract::{FromRequestParts, Request, State},
	http::request::Parts,
	middleware::Next,
	response::{IntoResponse, Response},
};
use tracing::instrument;
use yukpo_access_core::User;
use yukpo_access_gate::IdentitySnapshot;

use crate::api::AppState;
use crate::error::ServerError;

/// Identity of the current request.
#[derive(Debug, Clone)]
pub struct AccessContext {
	pub identity: IdentitySnapshot,
}

impl AccessContext {
	pub fn anonymous() -> Self {
		Self {
			identity: IdentitySnapshot::Anonymous,
		}
	}

	pub fn user(&self) -> Option<&User> {
		self.identity.user()
	}
}

/// Resolve the caller and attach an [`AccessContext`].
pub async fn identity_layer(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
	let identity = state.resolver.resolve(req.headers()).await;
	req.extensions_mut().insert(AccessContext { identity });
	next.run(req).await
}

pub(crate) fn access_context(parts: &Parts) -> AccessContext {
	parts
		.extensions
		.get::<AccessContext>()
		.cloned()
		.unwrap_or_else(AccessContext::anonymous)
}

/// The caller, if identified. Never rejects.
pub struct CurrentIdentity(pub Option<User>);

impl<S> FromRequestParts<S> for CurrentIdentity
where
	S: Send + Sync,
{
	type Rejection = Infallible;

	async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
		Ok(CurrentIdentity(access_context(parts).user().cloned()))
	}
}

/// The caller; rejects anonymous requests with 401.
pub struct RequireAuth(pub User);

impl<S> FromRequestParts<S> for RequireAuth
where
	S: Send + Sync,
{
	type Rejection = Response;

	#[instrument(name = "RequireAuth::from_request_parts", skip_all)]
	async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
		match access_context(parts).identity {
			IdentitySnapshot::Authenticated(user) => {
				tracing::debug!(user_id = %user.id, "authentication required: success");
				Ok(RequireAuth(user))
			}
			_ => {
				tracing::debug!("authentication required: no identity");
				Err(ServerError::Unauthorized.into_response())
			}
		}
	}
}
