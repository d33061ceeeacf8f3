// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Application state and router assembly.

use std::sync::Arc;

use axum::{
	middleware::from_fn_with_state,
	routing::{get, post},
	Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{broadcast, RwLock};
use yukpo_access_core::{AccessRegistry, AccessRule, ProtectionMap, RegistryResult};
use yukpo_access_gate::DevFallback;
use yukpo_server_config::AccessConfig;

use crate::access_middleware::RequireAccess;
use crate::auth_middleware::identity_layer;
use crate::identity::{HeaderIdentityResolver, IdentityResolver};
use crate::routes;

/// Capacity of the registry update channel. Slow subscribers skip events.
const UPDATE_CHANNEL_CAPACITY: usize = 64;

/// Pushed to admin subscribers after every registry edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename = "access_update")]
pub struct AccessUpdate {
	pub access: Vec<AccessRule>,
	pub updated_at: DateTime<Utc>,
}

impl AccessUpdate {
	pub fn snapshot(registry: &AccessRegistry) -> Self {
		Self {
			access: registry.list_all().to_vec(),
			updated_at: Utc::now(),
		}
	}
}

#[derive(Clone)]
pub struct AppState {
	pub registry: Arc<RwLock<AccessRegistry>>,
	pub protection: Arc<ProtectionMap>,
	pub updates: broadcast::Sender<AccessUpdate>,
	pub resolver: Arc<dyn IdentityResolver>,
}

impl AppState {
	pub fn new(
		registry: AccessRegistry,
		protection: ProtectionMap,
		resolver: Arc<dyn IdentityResolver>,
	) -> Self {
		let (updates, _) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);
		Self {
			registry: Arc::new(RwLock::new(registry)),
			protection: Arc::new(protection),
			updates,
			resolver,
		}
	}

	/// Broadcast the current registry. Having no subscribers is fine.
	pub fn publish_update(&self, registry: &AccessRegistry) {
		let receivers = self.updates.send(AccessUpdate::snapshot(registry)).unwrap_or(0);
		tracing::debug!(receivers, entries = registry.len(), "access update published");
	}
}

/// Build application state from the access configuration.
///
/// Uses the built-in catalog when no registry path is configured, and an
/// empty protection map when no map path is configured.
pub fn create_app_state(config: &AccessConfig) -> RegistryResult<AppState> {
	let registry = match &config.registry_path {
		Some(path) => AccessRegistry::load(path)?,
		None => {
			tracing::info!("no registry path configured, using built-in catalog");
			AccessRegistry::seeded()
		}
	};

	let protection = match &config.protection_map_path {
		Some(path) => ProtectionMap::load(path)?,
		None => ProtectionMap::new(),
	};

	let fallback = DevFallback::new(config.dev_fallback.identity());
	if fallback.is_enabled() {
		tracing::warn!(
			environment = %config.environment,
			role = %config.dev_fallback.role,
			plan = %config.dev_fallback.plan,
			"dev fallback identity enabled for anonymous requests"
		);
	}

	Ok(AppState::new(
		registry,
		protection,
		Arc::new(HeaderIdentityResolver::new(fallback)),
	))
}

fn admin_routes() -> Router<AppState> {
	Router::new()
		.route(
			"/access-registry",
			get(routes::access_registry::list_access),
		)
		.route(
			"/access-registry/components/{component}",
			get(routes::access_registry::get_component)
				.put(routes::access_registry::update_component)
				.delete(routes::access_registry::delete_component),
		)
		.route(
			"/access-registry/lookup",
			get(routes::access_registry::lookup_path),
		)
		.route(
			"/access-registry/export.csv",
			get(routes::access_registry::export_csv),
		)
		.route(
			"/access-registry/stream",
			get(routes::access_registry::stream_updates),
		)
		.route("/save-access", post(routes::access_registry::save_access))
		.route_layer(RequireAccess::admin())
}

/// Create the router with all routes.
pub fn create_router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(routes::health::health_check))
		.route("/api/access/evaluate", post(routes::evaluate::evaluate_access))
		.nest("/admin", admin_routes())
		.layer(from_fn_with_state(state.clone(), identity_layer))
		.with_state(state)
}
