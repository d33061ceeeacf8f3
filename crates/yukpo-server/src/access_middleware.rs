// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Route-level access enforcement.
//!
//! [`RequireAccess`] runs the same evaluator the gate components use against
//! the [`AccessContext`] attached by
//! [`identity_layer`](crate::auth_middleware::identity_layer).
//!
//! - Anonymous callers are rejected with 401 Unauthorized
//! - Identified callers who fail a condition are rejected with 403 Forbidden
//! - Error bodies never name the failing condition
//!
//! ```ignore
//! Router::new()
//!     .route("/admin/access-registry", get(list_access))
//!     .route_layer(RequireAccess::admin());
//! ```

use std::{
	future::Future,
	pin::Pin,
	task::{Context, Poll},
};

use axum::{
	body::Body,
	http::{Request, StatusCode},
	response::{IntoResponse, Response},
};
use pin_project_lite::pin_project;
use tower::{Layer, Service};
use yukpo_access_core::{evaluate, AccessRequirement, DecisionReason, Role};

use crate::auth_middleware::AccessContext;
use crate::error::ServerError;

/// Route layer enforcing an [`AccessRequirement`].
#[derive(Debug, Clone)]
pub struct RequireAccess {
	requirement: AccessRequirement,
}

impl RequireAccess {
	pub fn new(requirement: AccessRequirement) -> Self {
		Self { requirement }
	}

	/// `role = admin`, as used by the admin audit surface.
	pub fn admin() -> Self {
		Self::new(AccessRequirement::require_role(Role::Admin))
	}
}

impl<S> Layer<S> for RequireAccess {
	type Service = RequireAccessService<S>;

	fn layer(&self, inner: S) -> Self::Service {
		RequireAccessService {
			inner,
			requirement: self.requirement.clone(),
		}
	}
}

/// Service wrapper for [`RequireAccess`].
#[derive(Debug, Clone)]
pub struct RequireAccessService<S> {
	inner: S,
	requirement: AccessRequirement,
}

impl<S> Service<Request<Body>> for RequireAccessService<S>
where
	S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
	S::Future: Send,
{
	type Response = Response;
	type Error = S::Error;
	type Future = RequireAccessFuture<S::Future>;

	fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
		self.inner.poll_ready(cx)
	}

	fn call(&mut self, req: Request<Body>) -> Self::Future {
		let ctx = req
			.extensions()
			.get::<AccessContext>()
			.cloned()
			.unwrap_or_else(AccessContext::anonymous);

		let decision = evaluate(ctx.user(), &self.requirement);
		if decision.allowed {
			tracing::debug!(
				user_id = ?ctx.user().map(|u| u.id),
				path = %req.uri().path(),
				"access allowed"
			);
			return RequireAccessFuture::Inner {
				fut: self.inner.call(req),
			};
		}

		let rejection = match &decision.reason {
			DecisionReason::Anonymous => {
				tracing::debug!(path = %req.uri().path(), "access denied: not authenticated");
				ServerError::Unauthorized
			}
			reason => {
				tracing::info!(
					user_id = ?ctx.user().map(|u| u.id),
					path = %req.uri().path(),
					reason = ?reason,
					"access denied"
				);
				ServerError::Forbidden
			}
		};

		RequireAccessFuture::Rejected {
			resp: Some(rejection.into_response()),
		}
	}
}

pin_project! {
	/// Future for [`RequireAccessService`].
	#[project = RequireAccessFutureProj]
	pub enum RequireAccessFuture<F> {
		Inner { #[pin] fut: F },
		Rejected { resp: Option<Response> },
	}
}

impl<F, E> Future for RequireAccessFuture<F>
where
	F: Future<Output = Result<Response, E>>,
{
	type Output = Result<Response, E>;

	fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
		match self.project() {
			RequireAccessFutureProj::Inner { fut } => fut.poll(cx),
			RequireAccessFutureProj::Rejected { resp } => Poll::Ready(Ok(resp
				.take()
				.unwrap_or_else(|| StatusCode::INTERNAL_SERVER_ERROR.into_response()))),
		}
	}
}
