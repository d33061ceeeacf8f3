// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Evaluate a requirement for the calling identity.
//!
//! Lets non-Rust clients ask the same question the gate components ask. The
//! answer is always 200; denial is part of the body, not an error.

use axum::Json;
use yukpo_access_core::{evaluate, AccessDecision, RequirementSpec};

use crate::auth_middleware::CurrentIdentity;

/// POST /api/access/evaluate
#[tracing::instrument(skip_all, fields(identified = caller.is_some()))]
pub async fn evaluate_access(
	CurrentIdentity(caller): CurrentIdentity,
	Json(spec): Json<RequirementSpec>,
) -> Json<AccessDecision> {
	let requirement = spec.into_requirement();
	let decision = evaluate(caller.as_ref(), &requirement);
	tracing::debug!(allowed = decision.allowed, reason = ?decision.reason, "requirement evaluated");
	Json(decision)
}
