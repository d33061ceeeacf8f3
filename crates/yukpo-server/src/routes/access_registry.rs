// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Admin audit endpoints for the access registry.
//!
//! - GET /admin/access-registry - List entries, optionally filtered by role and plan
//! - GET /admin/access-registry/components/{component} - One entry by component name
//! - GET /admin/access-registry/lookup?path= - One entry by route path
//! - PUT /admin/access-registry/components/{component} - Set role and plan
//! - DELETE /admin/access-registry/components/{component} - Drop an entry
//! - POST /admin/save-access - Replace the whole catalog
//! - GET /admin/access-registry/export.csv - CSV export
//! - GET /admin/access-registry/stream - SSE stream of `access_update` events
//!
//! # Security
//!
//! All endpoints require the `admin` role. Edits change what this surface
//! reports; they never change what any gate enforces.

use std::{convert::Infallible, fmt::Display, str::FromStr};

use axum::{
	extract::{Path, Query, State},
	http::{header, StatusCode},
	response::{
		sse::{Event, KeepAlive, Sse},
		IntoResponse,
	},
	Json,
};
use futures::stream::Stream;
use serde::{Deserialize, Serialize};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;
use yukpo_access_core::{AccessRule, Plan, ProtectionMap, RegistryDocument, RegistryUpdate, Role};

use crate::api::{AccessUpdate, AppState};
use crate::auth_middleware::RequireAuth;
use crate::error::ServerError;

/// Role and plan filters. Empty or `all` means no filter.
#[derive(Debug, Default, Deserialize)]
pub struct RegistryFilterParams {
	pub role: Option<String>,
	pub plan: Option<String>,
}

impl RegistryFilterParams {
	fn parse(&self) -> Result<(Option<Role>, Option<Plan>), ServerError> {
		Ok((
			parse_filter("role", self.role.as_deref())?,
			parse_filter("plan", self.plan.as_deref())?,
		))
	}
}

#[derive(Debug, Deserialize)]
pub struct LookupParams {
	pub path: String,
}

/// Registry entry as shown in the audit table.
#[derive(Debug, Clone, Serialize)]
pub struct AccessRow {
	#[serde(flatten)]
	pub rule: AccessRule,
	/// Whether the component is wrapped in a gate where it is used.
	pub protected: bool,
}

impl AccessRow {
	fn new(rule: &AccessRule, protection: &ProtectionMap) -> Self {
		Self {
			protected: protection.is_protected(&rule.component),
			rule: rule.clone(),
		}
	}
}

#[derive(Debug, Serialize)]
pub struct AccessListResponse {
	pub access: Vec<AccessRow>,
	/// Entries in the registry.
	pub total: usize,
	/// Entries after filtering.
	pub shown: usize,
}

#[derive(Debug, Deserialize)]
pub struct UpdateAccessRequest {
	pub role: String,
	pub plan: String,
}

#[derive(Debug, Serialize)]
pub struct UpdateAccessResponse {
	pub rule: AccessRow,
	pub created: bool,
}

#[derive(Debug, Serialize)]
pub struct SaveAccessResponse {
	pub saved: usize,
}

/// GET /admin/access-registry
#[tracing::instrument(
	skip(state),
	fields(actor_id = %actor.id, role = ?params.role, plan = ?params.plan)
)]
pub async fn list_access(
	State(state): State<AppState>,
	RequireAuth(actor): RequireAuth,
	Query(params): Query<RegistryFilterParams>,
) -> Result<Json<AccessListResponse>, ServerError> {
	let (role, plan) = params.parse()?;
	let registry = state.registry.read().await;

	let access: Vec<AccessRow> = registry
		.filter(role, plan)
		.into_iter()
		.map(|rule| AccessRow::new(rule, &state.protection))
		.collect();

	Ok(Json(AccessListResponse {
		total: registry.len(),
		shown: access.len(),
		access,
	}))
}

/// GET /admin/access-registry/components/{component}
pub async fn get_component(
	State(state): State<AppState>,
	Path(component): Path<String>,
) -> Result<Json<AccessRow>, ServerError> {
	let registry = state.registry.read().await;
	registry
		.find_by_component_name(&component)
		.map(|rule| Json(AccessRow::new(rule, &state.protection)))
		.ok_or_else(|| ServerError::NotFound(format!("component '{component}' is not in the registry")))
}

/// GET /admin/access-registry/lookup?path=
pub async fn lookup_path(
	State(state): State<AppState>,
	Query(params): Query<LookupParams>,
) -> Result<Json<AccessRow>, ServerError> {
	let registry = state.registry.read().await;
	registry
		.find_by_path(&params.path)
		.map(|rule| Json(AccessRow::new(rule, &state.protection)))
		.ok_or_else(|| ServerError::NotFound(format!("no registry entry for path '{}'", params.path)))
}

/// PUT /admin/access-registry/components/{component}
#[tracing::instrument(skip(state, body), fields(actor_id = %actor.id))]
pub async fn update_component(
	State(state): State<AppState>,
	RequireAuth(actor): RequireAuth,
	Path(component): Path<String>,
	Json(body): Json<UpdateAccessRequest>,
) -> Result<impl IntoResponse, ServerError> {
	let role: Role = parse_value("role", &body.role)?;
	let plan: Plan = parse_value("plan", &body.plan)?;

	let mut registry = state.registry.write().await;
	let outcome = registry.update(&component, role, plan)?;

	let created = matches!(outcome, RegistryUpdate::Inserted);
	match &outcome {
		RegistryUpdate::Updated { previous } => tracing::info!(
			previous_role = %previous.role,
			previous_plan = %previous.plan,
			%role,
			%plan,
			"registry entry updated"
		),
		RegistryUpdate::Inserted => tracing::info!(%role, %plan, "registry entry added"),
	}

	let row = registry
		.find_by_component_name(&component)
		.map(|rule| AccessRow::new(rule, &state.protection))
		.ok_or_else(|| ServerError::NotFound(component.clone()))?;
	state.publish_update(&registry);

	let status = if created {
		StatusCode::CREATED
	} else {
		StatusCode::OK
	};
	Ok((status, Json(UpdateAccessResponse { rule: row, created })))
}

/// DELETE /admin/access-registry/components/{component}
#[tracing::instrument(skip(state), fields(actor_id = %actor.id))]
pub async fn delete_component(
	State(state): State<AppState>,
	RequireAuth(actor): RequireAuth,
	Path(component): Path<String>,
) -> Result<StatusCode, ServerError> {
	let mut registry = state.registry.write().await;
	match registry.remove(&component) {
		Some(_) => {
			tracing::info!("registry entry removed");
			state.publish_update(&registry);
			Ok(StatusCode::NO_CONTENT)
		}
		None => Err(ServerError::NotFound(format!(
			"component '{component}' is not in the registry"
		))),
	}
}

/// POST /admin/save-access
///
/// Accepts the bare list the audit page sends as well as `{ "access": [...] }`.
#[tracing::instrument(skip(state, body), fields(actor_id = %actor.id))]
pub async fn save_access(
	State(state): State<AppState>,
	RequireAuth(actor): RequireAuth,
	Json(body): Json<RegistryDocument>,
) -> Result<Json<SaveAccessResponse>, ServerError> {
	let mut registry = state.registry.write().await;
	registry.replace_all(body.into_rules())?;

	tracing::info!(entries = registry.len(), "registry replaced");
	state.publish_update(&registry);

	Ok(Json(SaveAccessResponse {
		saved: registry.len(),
	}))
}

/// GET /admin/access-registry/export.csv
pub async fn export_csv(
	State(state): State<AppState>,
	Query(params): Query<RegistryFilterParams>,
) -> Result<impl IntoResponse, ServerError> {
	let (role, plan) = params.parse()?;
	let csv = state.registry.read().await.to_csv(role, plan);

	Ok((
		[
			(header::CONTENT_TYPE, "text/csv; charset=utf-8"),
			(
				header::CONTENT_DISPOSITION,
				"attachment; filename=\"access-registry.csv\"",
			),
		],
		csv,
	))
}

/// GET /admin/access-registry/stream
///
/// The current catalog is sent first, then one event per edit.
#[tracing::instrument(skip(state), fields(actor_id = %actor.id))]
pub async fn stream_updates(
	State(state): State<AppState>,
	RequireAuth(actor): RequireAuth,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
	// Subscribe before reading so no edit falls between the two.
	let rx = state.updates.subscribe();
	let initial = AccessUpdate::snapshot(&*state.registry.read().await);

	let updates = BroadcastStream::new(rx).filter_map(|result| match result {
		Ok(update) => Some(update),
		Err(e) => {
			tracing::debug!(error = %e, "access update stream lagged");
			None
		}
	});

	let events = tokio_stream::once(initial)
		.chain(updates)
		.filter_map(|update| match serde_json::to_string(&update) {
			Ok(json) => Some(Ok::<_, Infallible>(
				Event::default().event("access_update").data(json),
			)),
			Err(_) => None,
		});

	Sse::new(events).keep_alive(
		KeepAlive::new()
			.interval(std::time::Duration::from_secs(15))
			.text("keep-alive"),
	)
}

fn parse_filter<T>(key: &str, raw: Option<&str>) -> Result<Option<T>, ServerError>
where
	T: FromStr,
	T::Err: Display,
{
	match raw.map(str::trim) {
		None | Some("") | Some("all") => Ok(None),
		Some(value) => parse_value(key, value).map(Some),
	}
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, ServerError>
where
	T: FromStr,
	T::Err: Display,
{
	raw.parse()
		.map_err(|e: T::Err| ServerError::BadRequest(format!("invalid {key}: {e}")))
}
