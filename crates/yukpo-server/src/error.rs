// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use yukpo_access_core::RegistryError;

/// JSON body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
	pub error: String,
	pub message: String,
}

impl ErrorResponse {
	pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
		Self {
			error: error.into(),
			message: message.into(),
		}
	}
}

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
	#[error("unauthorized")]
	Unauthorized,
	#[error("forbidden")]
	Forbidden,
	#[error("not found: {0}")]
	NotFound(String),
	#[error("bad request: {0}")]
	BadRequest(String),
	#[error(transparent)]
	Registry(#[from] RegistryError),
}

impl IntoResponse for ServerError {
	fn into_response(self) -> Response {
		let (status, error, message) = match &self {
			ServerError::Unauthorized => (
				StatusCode::UNAUTHORIZED,
				"unauthorized",
				"Authentication required".to_string(),
			),
			ServerError::Forbidden => (
				StatusCode::FORBIDDEN,
				"forbidden",
				"Insufficient permissions".to_string(),
			),
			ServerError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
			ServerError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone()),
			ServerError::Registry(e) => match e {
				RegistryError::DuplicateComponent(_) | RegistryError::EmptyComponent => {
					(StatusCode::BAD_REQUEST, "invalid_registry", e.to_string())
				}
				RegistryError::Parse(_) => (StatusCode::BAD_REQUEST, "invalid_document", e.to_string()),
				RegistryError::Io { .. } => {
					tracing::error!(error = %e, "registry i/o failure");
					(
						StatusCode::INTERNAL_SERVER_ERROR,
						"internal_error",
						"Internal server error".to_string(),
					)
				}
			},
		};

		(status, Json(ErrorResponse::new(error, message))).into_response()
	}
}
