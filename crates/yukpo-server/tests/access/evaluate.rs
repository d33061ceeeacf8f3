// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use axum::http::StatusCode;
use serde_json::{json, Value};

use super::support::{body_json, TestApp, TestUser};

async fn evaluate(app: &TestApp, user: Option<&TestUser>, requirement: Value) -> Value {
	let response = app.post("/api/access/evaluate", user, requirement).await;
	assert_eq!(response.status(), StatusCode::OK);
	body_json(response).await
}

#[tokio::test]
async fn free_user_denied_pro_plan() {
	let app = TestApp::new();
	let decision = evaluate(&app, Some(&app.fixtures.free_user), json!({ "plan": "pro" })).await;

	assert_eq!(decision["allowed"], false);
	assert_eq!(decision["reason"]["type"], "condition_failed");
	assert_eq!(decision["reason"]["condition"]["kind"], "plan");
}

#[tokio::test]
async fn enterprise_admin_passes_role_and_plan() {
	let app = TestApp::new();
	let decision = evaluate(
		&app,
		Some(&app.fixtures.admin),
		json!({ "role": "admin", "plan": "enterprise" }),
	)
	.await;

	assert_eq!(decision["allowed"], true);
	assert_eq!(decision["reason"]["type"], "granted");
}

#[tokio::test]
async fn anonymous_is_denied_but_not_an_error() {
	let app = TestApp::new();
	let decision = evaluate(&app, None, json!({ "role": "admin" })).await;

	assert_eq!(decision["allowed"], false);
	assert_eq!(decision["reason"]["type"], "anonymous");
}

#[tokio::test]
async fn public_requirement_needs_no_identity() {
	let app = TestApp::new();
	let decision = evaluate(&app, None, json!({ "public": true })).await;

	assert_eq!(decision["allowed"], true);
	assert_eq!(decision["reason"]["type"], "public");
}

#[tokio::test]
async fn empty_descriptor_needs_any_identity() {
	let app = TestApp::new();

	let anonymous = evaluate(&app, None, json!({})).await;
	assert_eq!(anonymous["allowed"], false);

	let signed_in = evaluate(&app, Some(&app.fixtures.free_user), json!({})).await;
	assert_eq!(signed_in["allowed"], true);
}

#[tokio::test]
async fn role_combinators() {
	let app = TestApp::new();
	let f = &app.fixtures;

	let any_of = json!({ "anyOf": ["admin", "client"] });
	assert_eq!(evaluate(&app, Some(&f.client), any_of.clone()).await["allowed"], true);
	assert_eq!(evaluate(&app, Some(&f.pro_user), any_of).await["allowed"], false);

	let not_public = json!({ "not": "public" });
	assert_eq!(evaluate(&app, Some(&f.pro_user), not_public).await["allowed"], true);

	// A single-role user can never hold two distinct roles.
	let all_of = json!({ "allOf": ["admin", "client"] });
	assert_eq!(evaluate(&app, Some(&f.admin), all_of).await["allowed"], false);
}

#[tokio::test]
async fn unrecognized_claims_fail_closed() {
	let app = TestApp::new();
	let f = &app.fixtures;

	let not_user = json!({ "not": "user" });
	assert_eq!(evaluate(&app, Some(&f.unknown_role), not_user).await["allowed"], false);

	let unknown_requirement = json!({ "role": "superuser" });
	assert_eq!(
		evaluate(&app, Some(&f.unknown_role), unknown_requirement).await["allowed"],
		false
	);
}

#[tokio::test]
async fn evaluation_leaves_registry_untouched() {
	let app = TestApp::new();
	let before = app.state.registry.read().await.clone();

	for user in [&app.fixtures.admin, &app.fixtures.free_user] {
		evaluate(&app, Some(user), json!({ "role": "client", "plan": "free" })).await;
	}

	let registry = app.state.registry.read().await;
	assert_eq!(*registry, before);
	let rule = registry.find_by_component_name("DashboardSelector").unwrap();
	assert_eq!(rule.role.to_string(), "admin");
	assert_eq!(rule.plan.to_string(), "enterprise");
}

#[tokio::test]
async fn dev_fallback_applies_to_anonymous_evaluation() {
	let app = TestApp::with_dev_fallback();
	let decision = evaluate(&app, None, json!({ "role": "admin", "plan": "enterprise" })).await;
	assert_eq!(decision["allowed"], true);
}
