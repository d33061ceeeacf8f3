// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::sync::Arc;

use axum::{
	body::Body,
	http::{Method, Request, StatusCode},
	response::Response,
	Router,
};
use serde::Serialize;
use tower::ServiceExt;
use uuid::Uuid;
use yukpo_access_core::{AccessRegistry, Plan, ProtectionMap, Role, User, UserId};
use yukpo_access_gate::DevFallback;
use yukpo_server::{
	identity::{PLAN_HEADER, ROLE_HEADER, USER_EMAIL_HEADER, USER_ID_HEADER},
	AppState, HeaderIdentityResolver,
};

/// A caller as the edge proxy would describe it.
#[derive(Debug, Clone)]
pub struct TestUser {
	pub id: Uuid,
	pub email: String,
	pub role: String,
	pub plan: String,
}

impl TestUser {
	pub fn new(email: &str, role: &str, plan: &str) -> Self {
		Self {
			id: Uuid::new_v4(),
			email: email.to_string(),
			role: role.to_string(),
			plan: plan.to_string(),
		}
	}

	pub fn headers(&self) -> Vec<(&'static str, String)> {
		vec![
			(USER_ID_HEADER, self.id.to_string()),
			(USER_EMAIL_HEADER, self.email.clone()),
			(ROLE_HEADER, self.role.clone()),
			(PLAN_HEADER, self.plan.clone()),
		]
	}
}

pub struct Fixtures {
	pub admin: TestUser,
	pub client: TestUser,
	pub free_user: TestUser,
	pub pro_user: TestUser,
	pub enterprise_user: TestUser,
	/// Role string outside the closed enumeration.
	pub unknown_role: TestUser,
}

impl Fixtures {
	fn new() -> Self {
		Self {
			admin: TestUser::new("admin@yukpo.cm", "admin", "enterprise"),
			client: TestUser::new("client@yukpo.cm", "client", "pro"),
			free_user: TestUser::new("free@yukpo.cm", "user", "free"),
			pro_user: TestUser::new("pro@yukpo.cm", "user", "pro"),
			enterprise_user: TestUser::new("ent@yukpo.cm", "user", "enterprise"),
			unknown_role: TestUser::new("odd@yukpo.cm", "superuser", "enterprise"),
		}
	}
}

pub struct TestApp {
	pub router: Router,
	pub fixtures: Fixtures,
	pub state: AppState,
}

impl TestApp {
	pub fn new() -> Self {
		Self::with_fallback(DevFallback::disabled())
	}

	/// App whose anonymous callers are treated as the development admin.
	pub fn with_dev_fallback() -> Self {
		let admin = User::new(UserId::generate(), "admin@yukpo.local", Role::Admin, Plan::Enterprise);
		Self::with_fallback(DevFallback::new(Some(admin)))
	}

	fn with_fallback(fallback: DevFallback) -> Self {
		let mut protection = ProtectionMap::new();
		protection.mark("DashboardSelector", true);
		protection.mark("YukpomnangPremium", true);

		let state = AppState::new(
			AccessRegistry::seeded(),
			protection,
			Arc::new(HeaderIdentityResolver::new(fallback)),
		);
		let router = yukpo_server::create_router(state.clone());

		Self {
			router,
			fixtures: Fixtures::new(),
			state,
		}
	}

	pub async fn get(&self, path: &str, user: Option<&TestUser>) -> Response<Body> {
		self
			.request(Method::GET, path, user, Option::<()>::None)
			.await
	}

	pub async fn post(
		&self,
		path: &str,
		user: Option<&TestUser>,
		body: impl Serialize,
	) -> Response<Body> {
		self.request(Method::POST, path, user, Some(body)).await
	}

	pub async fn put(
		&self,
		path: &str,
		user: Option<&TestUser>,
		body: impl Serialize,
	) -> Response<Body> {
		self.request(Method::PUT, path, user, Some(body)).await
	}

	pub async fn delete(&self, path: &str, user: Option<&TestUser>) -> Response<Body> {
		self
			.request(Method::DELETE, path, user, Option::<()>::None)
			.await
	}

	async fn request<T: Serialize>(
		&self,
		method: Method,
		path: &str,
		user: Option<&TestUser>,
		body: Option<T>,
	) -> Response<Body> {
		let mut builder = Request::builder().method(method).uri(path);

		if let Some(test_user) = user {
			for (name, value) in test_user.headers() {
				builder = builder.header(name, value);
			}
		}

		let request_body = match body {
			Some(b) => {
				builder = builder.header("content-type", "application/json");
				Body::from(serde_json::to_string(&b).unwrap())
			}
			None => Body::empty(),
		};

		let request = builder.body(request_body).unwrap();

		self.router.clone().oneshot(request).await.unwrap()
	}
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
	let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
		.await
		.unwrap();
	serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
	let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
		.await
		.unwrap();
	String::from_utf8(bytes.to_vec()).unwrap()
}

pub struct AccessCase {
	pub name: &'static str,
	pub method: Method,
	pub path: String,
	pub user: Option<TestUser>,
	pub body: Option<serde_json::Value>,
	pub expected_status: StatusCode,
}

pub async fn run_access_cases(app: &TestApp, cases: &[AccessCase]) {
	for case in cases {
		let response = match (&case.method, &case.body) {
			(m, Some(body)) if *m == Method::POST => {
				app.post(&case.path, case.user.as_ref(), body.clone()).await
			}
			(m, Some(body)) if *m == Method::PUT => {
				app.put(&case.path, case.user.as_ref(), body.clone()).await
			}
			(m, _) if *m == Method::DELETE => app.delete(&case.path, case.user.as_ref()).await,
			_ => app.get(&case.path, case.user.as_ref()).await,
		};

		if response.status() != case.expected_status {
			let (parts, body) = response.into_parts();
			let body_bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
			let body_str = String::from_utf8_lossy(&body_bytes);
			panic!(
				"Case '{}': {} {} - expected {}, got {}\nResponse body: {}",
				case.name, case.method, case.path, case.expected_status, parts.status, body_str
			);
		}
	}
}
