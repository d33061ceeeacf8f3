// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Admin audit surface behavior for an authorized caller.

use std::time::Duration;

use axum::http::{header, StatusCode};
use futures::StreamExt;
use serde_json::json;

use super::support::{body_json, body_text, TestApp};

#[tokio::test]
async fn list_returns_seeded_catalog_with_protection_flags() {
	let app = TestApp::new();
	let response = app
		.get("/admin/access-registry", Some(&app.fixtures.admin))
		.await;
	assert_eq!(response.status(), StatusCode::OK);

	let body = body_json(response).await;
	assert_eq!(body["total"], 13);
	assert_eq!(body["shown"], 13);

	let rows = body["access"].as_array().unwrap();
	assert_eq!(rows[0]["component"], "DashboardSelector");
	assert_eq!(rows[0]["protected"], true);

	let profil = rows.iter().find(|r| r["component"] == "MonProfil").unwrap();
	assert_eq!(profil["protected"], false);
	assert_eq!(profil["path"], "/dashboard/profil");
}

#[tokio::test]
async fn list_filters_by_role_and_plan() {
	let app = TestApp::new();
	let admin = Some(&app.fixtures.admin);

	let body = body_json(app.get("/admin/access-registry?role=admin", admin).await).await;
	assert_eq!(body["shown"], 4);
	assert_eq!(body["total"], 13);

	let body = body_json(
		app
			.get("/admin/access-registry?role=admin&plan=enterprise", admin)
			.await,
	)
	.await;
	assert_eq!(body["shown"], 3);

	let body = body_json(app.get("/admin/access-registry?role=all&plan=", admin).await).await;
	assert_eq!(body["shown"], 13);
}

#[tokio::test]
async fn list_rejects_unknown_filter() {
	let app = TestApp::new();
	let response = app
		.get("/admin/access-registry?plan=gold", Some(&app.fixtures.admin))
		.await;
	assert_eq!(response.status(), StatusCode::BAD_REQUEST);
	assert_eq!(body_json(response).await["error"], "bad_request");
}

#[tokio::test]
async fn component_lookup_returns_seeded_values() {
	let app = TestApp::new();
	let admin = Some(&app.fixtures.admin);

	let body = body_json(
		app
			.get("/admin/access-registry/components/DashboardSelector", admin)
			.await,
	)
	.await;
	assert_eq!(body["role"], "admin");
	assert_eq!(body["plan"], "enterprise");

	let response = app
		.get("/admin/access-registry/components/NoSuchWidget", admin)
		.await;
	assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn path_lookup() {
	let app = TestApp::new();
	let admin = Some(&app.fixtures.admin);

	let body = body_json(
		app
			.get("/admin/access-registry/lookup?path=/dashboard/ia-premium", admin)
			.await,
	)
	.await;
	assert_eq!(body["component"], "YukpomnangPremium");
	assert_eq!(body["protected"], true);

	let response = app
		.get("/admin/access-registry/lookup?path=/nowhere", admin)
		.await;
	assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_existing_then_insert_new() {
	let app = TestApp::new();
	let admin = Some(&app.fixtures.admin);

	let response = app
		.put(
			"/admin/access-registry/components/DashboardSelector",
			admin,
			json!({ "role": "client", "plan": "pro" }),
		)
		.await;
	assert_eq!(response.status(), StatusCode::OK);
	let body = body_json(response).await;
	assert_eq!(body["created"], false);
	assert_eq!(body["rule"]["role"], "client");

	let response = app
		.put(
			"/admin/access-registry/components/NewWidget",
			admin,
			json!({ "role": "user", "plan": "free" }),
		)
		.await;
	assert_eq!(response.status(), StatusCode::CREATED);
	assert_eq!(body_json(response).await["created"], true);

	let registry = app.state.registry.read().await;
	assert_eq!(registry.len(), 14);
	assert_eq!(registry.list_all().last().unwrap().component, "NewWidget");
}

#[tokio::test]
async fn update_rejects_unknown_values() {
	let app = TestApp::new();
	let response = app
		.put(
			"/admin/access-registry/components/DashboardSelector",
			Some(&app.fixtures.admin),
			json!({ "role": "Admin", "plan": "enterprise" }),
		)
		.await;
	assert_eq!(response.status(), StatusCode::BAD_REQUEST);

	let registry = app.state.registry.read().await;
	let rule = registry.find_by_component_name("DashboardSelector").unwrap();
	assert_eq!(rule.role.to_string(), "admin");
}

#[tokio::test]
async fn delete_component() {
	let app = TestApp::new();
	let admin = Some(&app.fixtures.admin);
	let path = "/admin/access-registry/components/MonProfil";

	assert_eq!(app.delete(path, admin).await.status(), StatusCode::NO_CONTENT);
	assert_eq!(app.delete(path, admin).await.status(), StatusCode::NOT_FOUND);
	assert_eq!(app.state.registry.read().await.len(), 12);
}

#[tokio::test]
async fn save_access_replaces_catalog() {
	let app = TestApp::new();
	let body = json!({
		"access": [
			{ "component": "Home", "role": "public", "plan": "free", "path": "/" },
			{ "component": "Legacy", "role": "owner", "plan": "gold" },
		]
	});

	let response = app
		.post("/admin/save-access", Some(&app.fixtures.admin), body)
		.await;
	assert_eq!(response.status(), StatusCode::OK);
	assert_eq!(body_json(response).await["saved"], 2);

	// Stored documents may carry values no gate recognizes.
	let registry = app.state.registry.read().await;
	let legacy = registry.find_by_component_name("Legacy").unwrap();
	assert!(!legacy.role.is_known());
	assert_eq!(legacy.plan.to_string(), "gold");
}

#[tokio::test]
async fn save_access_accepts_bare_list() {
	let app = TestApp::new();
	let body = json!([
		{ "component": "Home", "role": "public", "plan": "free" },
		{ "component": "MonProfil", "role": "user", "plan": "free", "path": "/dashboard/profil" },
	]);

	let response = app
		.post("/admin/save-access", Some(&app.fixtures.admin), body)
		.await;
	assert_eq!(response.status(), StatusCode::OK);
	assert_eq!(body_json(response).await["saved"], 2);

	let registry = app.state.registry.read().await;
	assert_eq!(registry.list_all()[0].component, "Home");
	assert_eq!(registry.find_by_path("/dashboard/profil").unwrap().component, "MonProfil");
}

#[tokio::test]
async fn save_access_rejects_duplicates_and_keeps_catalog() {
	let app = TestApp::new();
	let body = json!({
		"access": [
			{ "component": "A", "role": "user", "plan": "free" },
			{ "component": "A", "role": "admin", "plan": "pro" },
		]
	});

	let response = app
		.post("/admin/save-access", Some(&app.fixtures.admin), body)
		.await;
	assert_eq!(response.status(), StatusCode::BAD_REQUEST);
	assert_eq!(body_json(response).await["error"], "invalid_registry");
	assert_eq!(app.state.registry.read().await.len(), 13);
}

#[tokio::test]
async fn csv_export() {
	let app = TestApp::new();
	let response = app
		.get(
			"/admin/access-registry/export.csv?role=admin&plan=enterprise",
			Some(&app.fixtures.admin),
		)
		.await;
	assert_eq!(response.status(), StatusCode::OK);
	assert!(response.headers()[header::CONTENT_TYPE]
		.to_str()
		.unwrap()
		.starts_with("text/csv"));
	assert!(response.headers()[header::CONTENT_DISPOSITION]
		.to_str()
		.unwrap()
		.contains("access-registry.csv"));

	let csv = body_text(response).await;
	let lines: Vec<&str> = csv.lines().collect();
	assert_eq!(lines[0], "Export ACCESS_REGISTRY,Role: admin,Plan: enterprise");
	assert_eq!(lines[2], "Component,Role,Plan");
	assert_eq!(lines[3], "DashboardSelector,admin,enterprise");
	assert_eq!(lines.len(), 6);
}

#[tokio::test]
async fn stream_sends_snapshot_first() {
	let app = TestApp::new();
	let response = app
		.get("/admin/access-registry/stream", Some(&app.fixtures.admin))
		.await;
	assert_eq!(response.status(), StatusCode::OK);
	assert!(response.headers()[header::CONTENT_TYPE]
		.to_str()
		.unwrap()
		.starts_with("text/event-stream"));

	let mut frames = response.into_body().into_data_stream();
	let first = tokio::time::timeout(Duration::from_secs(2), frames.next())
		.await
		.expect("stream produced no frame")
		.unwrap()
		.unwrap();
	let text = String::from_utf8(first.to_vec()).unwrap();
	assert!(text.contains("event: access_update"));
	assert!(text.contains("DashboardSelector"));
	assert!(!text.contains("NewWidget"));

	let response = app
		.put(
			"/admin/access-registry/components/NewWidget",
			Some(&app.fixtures.admin),
			json!({ "role": "user", "plan": "free" }),
		)
		.await;
	assert_eq!(response.status(), StatusCode::CREATED);

	let second = tokio::time::timeout(Duration::from_secs(2), frames.next())
		.await
		.expect("no event after edit")
		.unwrap()
		.unwrap();
	let text = String::from_utf8(second.to_vec()).unwrap();
	assert!(text.contains("event: access_update"));
	assert!(text.contains("NewWidget"));
}

#[tokio::test]
async fn edits_are_published() {
	let app = TestApp::new();
	let mut rx = app.state.updates.subscribe();

	let response = app
		.delete(
			"/admin/access-registry/components/TicketPriority",
			Some(&app.fixtures.admin),
		)
		.await;
	assert_eq!(response.status(), StatusCode::NO_CONTENT);

	let update = rx.try_recv().unwrap();
	assert_eq!(update.access.len(), 12);
	assert!(update.access.iter().all(|r| r.component != "TicketPriority"));
}
