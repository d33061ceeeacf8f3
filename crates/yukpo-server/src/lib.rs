// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! HTTP server for the Yukpo access registry.
//!
//! Serves the admin audit surface over the access registry and an evaluation
//! endpoint backed by the same evaluator the gate components use. Enforcement
//! on the audit routes goes through [`access_middleware::RequireAccess`].

pub mod access_middleware;
pub mod api;
pub mod auth_middleware;
pub mod error;
pub mod identity;
pub mod routes;

pub use api::{create_app_state, create_router, AccessUpdate, AppState};
pub use error::{ErrorResponse, ServerError};
pub use identity::{HeaderIdentityResolver, IdentityResolver};
pub use yukpo_server_config::ServerConfig;
