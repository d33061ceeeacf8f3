// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Access evaluation.
//!
//! [`evaluate`] decides whether a user may see a protected region. It is a pure
//! function: no I/O, no logging, no hidden state. The same inputs always yield
//! the same [`AccessDecision`].
//!
//! Evaluation is fail-closed:
//!
//! 1. A public requirement allows everyone
//! 2. An absent user is denied
//! 3. Every condition must hold; a role or plan claim that is not a member of
//!    its closed enumeration never satisfies a condition over that attribute

use serde::{Deserialize, Serialize};

use crate::requirement::{AccessRequirement, Condition};
use crate::types::User;

/// Why a decision came out the way it did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DecisionReason {
	/// The requirement is an explicit public allowance.
	Public,
	/// The user satisfied every condition.
	Granted,
	/// No identified user.
	Anonymous,
	/// The first condition (in declaration order) the user failed.
	ConditionFailed { condition: Condition },
}

/// Result of evaluating a requirement against a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessDecision {
	pub allowed: bool,
	pub reason: DecisionReason,
}

impl AccessDecision {
	fn allow(reason: DecisionReason) -> Self {
		Self {
			allowed: true,
			reason,
		}
	}

	fn deny(reason: DecisionReason) -> Self {
		Self {
			allowed: false,
			reason,
		}
	}

	pub fn is_allowed(&self) -> bool {
		self.allowed
	}
}

/// Evaluates a requirement for an optional (anonymous when `None`) user.
pub fn evaluate(user: Option<&User>, requirement: &AccessRequirement) -> AccessDecision {
	let conditions = match requirement {
		AccessRequirement::Public => return AccessDecision::allow(DecisionReason::Public),
		AccessRequirement::Authenticated(conditions) => conditions.as_slice(),
	};

	let Some(user) = user else {
		return AccessDecision::deny(DecisionReason::Anonymous);
	};

	match conditions.iter().find(|c| !condition_holds(user, c)) {
		Some(failed) => AccessDecision::deny(DecisionReason::ConditionFailed {
			condition: failed.clone(),
		}),
		None => AccessDecision::allow(DecisionReason::Granted),
	}
}

/// Shorthand for `evaluate(user, requirement).is_allowed()`.
pub fn is_allowed(user: Option<&User>, requirement: &AccessRequirement) -> bool {
	evaluate(user, requirement).is_allowed()
}

fn condition_holds(user: &User, condition: &Condition) -> bool {
	let role = user.known_role();
	let plan = user.known_plan();

	match condition {
		Condition::Role(required) => role == Some(*required),
		Condition::AnyOf(roles) => role.is_some_and(|r| roles.contains(&r)),
		Condition::AllOf(roles) => {
			// The user's role set has exactly one member.
			role.is_some_and(|r| roles.iter().all(|required| *required == r))
		}
		Condition::NotRole(excluded) => role.is_some_and(|r| r != *excluded),
		Condition::Plan(required) => plan == Some(*required),
		Condition::Unsatisfiable(_) => false,
	}
}
