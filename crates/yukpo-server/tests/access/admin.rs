// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Who may reach the admin audit surface.

use axum::http::{Method, StatusCode};
use serde_json::json;

use super::support::{body_json, run_access_cases, AccessCase, TestApp, TestUser};

const COMPONENT: &str = "/admin/access-registry/components/DashboardSelector";

fn read_cases(user: Option<TestUser>, expected: StatusCode, label: &'static str) -> Vec<AccessCase> {
	[
		"/admin/access-registry",
		COMPONENT,
		"/admin/access-registry/lookup?path=/admin",
		"/admin/access-registry/export.csv",
	]
	.into_iter()
	.map(|path| AccessCase {
		name: label,
		method: Method::GET,
		path: path.to_string(),
		user: user.clone(),
		body: None,
		expected_status: expected,
	})
	.collect()
}

fn write_cases(user: Option<TestUser>, expected: StatusCode, label: &'static str) -> Vec<AccessCase> {
	vec![
		AccessCase {
			name: label,
			method: Method::PUT,
			path: COMPONENT.to_string(),
			user: user.clone(),
			body: Some(json!({ "role": "client", "plan": "pro" })),
			expected_status: expected,
		},
		AccessCase {
			name: label,
			method: Method::DELETE,
			path: COMPONENT.to_string(),
			user: user.clone(),
			body: None,
			expected_status: expected,
		},
		AccessCase {
			name: label,
			method: Method::POST,
			path: "/admin/save-access".to_string(),
			user,
			body: Some(json!({ "access": [] })),
			expected_status: expected,
		},
	]
}

#[tokio::test]
async fn anonymous_callers_get_401_everywhere() {
	let app = TestApp::new();
	let mut cases = read_cases(None, StatusCode::UNAUTHORIZED, "anonymous read");
	cases.extend(write_cases(None, StatusCode::UNAUTHORIZED, "anonymous write"));
	run_access_cases(&app, &cases).await;
}

#[tokio::test]
async fn non_admin_roles_get_403_everywhere() {
	let app = TestApp::new();
	let f = &app.fixtures;

	let mut cases = Vec::new();
	for user in [&f.client, &f.free_user, &f.enterprise_user, &f.unknown_role] {
		cases.extend(read_cases(Some(user.clone()), StatusCode::FORBIDDEN, "non-admin read"));
		cases.extend(write_cases(Some(user.clone()), StatusCode::FORBIDDEN, "non-admin write"));
	}
	run_access_cases(&app, &cases).await;

	// Nothing slipped through.
	assert_eq!(app.state.registry.read().await.len(), 13);
}

#[tokio::test]
async fn admin_reaches_read_endpoints() {
	let app = TestApp::new();
	let cases = read_cases(Some(app.fixtures.admin.clone()), StatusCode::OK, "admin read");
	run_access_cases(&app, &cases).await;
}

#[tokio::test]
async fn admin_role_is_enough_regardless_of_plan() {
	let app = TestApp::new();
	let free_admin = TestUser::new("cheap-admin@yukpo.cm", "admin", "free");

	let response = app.get("/admin/access-registry", Some(&free_admin)).await;
	assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn rejection_bodies_do_not_name_the_condition() {
	let app = TestApp::new();

	let response = app.get("/admin/access-registry", None).await;
	assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
	let body = body_json(response).await;
	assert_eq!(body["error"], "unauthorized");
	assert_eq!(body["message"], "Authentication required");

	let response = app
		.get("/admin/access-registry", Some(&app.fixtures.client))
		.await;
	assert_eq!(response.status(), StatusCode::FORBIDDEN);
	let body = body_json(response).await;
	assert_eq!(body["error"], "forbidden");
	assert!(!body["message"].as_str().unwrap().contains("admin"));
}

#[tokio::test]
async fn health_is_open() {
	let app = TestApp::new();
	let response = app.get("/health", None).await;
	assert_eq!(response.status(), StatusCode::OK);

	let body = body_json(response).await;
	assert_eq!(body["status"], "ok");
	assert_eq!(body["registry_entries"], 13);
}

#[tokio::test]
async fn dev_fallback_opens_admin_surface_to_anonymous_callers() {
	let app = TestApp::with_dev_fallback();

	let response = app.get("/admin/access-registry", None).await;
	assert_eq!(response.status(), StatusCode::OK);

	// A real identity still wins over the fallback.
	let response = app
		.get("/admin/access-registry", Some(&app.fixtures.free_user))
		.await;
	assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
