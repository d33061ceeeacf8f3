// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Declarative access requirements attached to protected regions.
//!
//! An [`AccessRequirement`] is either an explicit public allowance or a set of
//! [`Condition`]s that must all hold for an identified user. A public allowance
//! cannot carry conditions: [`Conditions`] is the only builder that adds them,
//! and it always produces an authenticated requirement.
//!
//! [`RequirementSpec`] is the loose descriptor shape used by gate call sites and
//! the HTTP API (`role`, `anyOf`, `allOf`, `not`, `plan`). Converting it never
//! fails; names outside the closed enumerations become
//! [`Condition::Unsatisfiable`].

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{Plan, Role};

/// A single predicate over the user's role or plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Condition {
	/// The user's role equals the given role.
	Role(Role),
	/// The user's role is one of the listed roles.
	AnyOf(Vec<Role>),
	/// Every listed role is in the user's role set.
	///
	/// Users carry exactly one role, so two distinct roles here never match.
	AllOf(Vec<Role>),
	/// The user's role differs from the given role.
	NotRole(Role),
	/// The user's plan equals the given plan.
	Plan(Plan),
	/// A descriptor named a value outside the closed enumerations.
	Unsatisfiable(String),
}

impl fmt::Display for Condition {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fn join(roles: &[Role]) -> String {
			roles
				.iter()
				.map(Role::as_str)
				.collect::<Vec<_>>()
				.join(",")
		}

		match self {
			Condition::Role(role) => write!(f, "role={role}"),
			Condition::AnyOf(roles) => write!(f, "any_of=[{}]", join(roles)),
			Condition::AllOf(roles) => write!(f, "all_of=[{}]", join(roles)),
			Condition::NotRole(role) => write!(f, "not={role}"),
			Condition::Plan(plan) => write!(f, "plan={plan}"),
			Condition::Unsatisfiable(reason) => write!(f, "unsatisfiable({reason})"),
		}
	}
}

/// Conditions combined with logical AND.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Conditions(Vec<Condition>);

impl Conditions {
	pub fn new() -> Self {
		Self(Vec::new())
	}

	pub fn role(mut self, role: Role) -> Self {
		self.0.push(Condition::Role(role));
		self
	}

	pub fn any_of(mut self, roles: impl IntoIterator<Item = Role>) -> Self {
		self.0.push(Condition::AnyOf(roles.into_iter().collect()));
		self
	}

	pub fn all_of(mut self, roles: impl IntoIterator<Item = Role>) -> Self {
		self.0.push(Condition::AllOf(roles.into_iter().collect()));
		self
	}

	pub fn not_role(mut self, role: Role) -> Self {
		self.0.push(Condition::NotRole(role));
		self
	}

	pub fn plan(mut self, plan: Plan) -> Self {
		self.0.push(Condition::Plan(plan));
		self
	}

	fn unsatisfiable(mut self, reason: String) -> Self {
		self.0.push(Condition::Unsatisfiable(reason));
		self
	}

	pub fn as_slice(&self) -> &[Condition] {
		&self.0
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

/// The condition a gate places on its protected content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "conditions", rename_all = "snake_case")]
pub enum AccessRequirement {
	/// Explicit allowance for everyone, anonymous visitors included.
	Public,
	/// An identified user satisfying every condition.
	Authenticated(Conditions),
}

impl AccessRequirement {
	pub fn public() -> Self {
		AccessRequirement::Public
	}

	/// Any identified user.
	pub fn authenticated() -> Self {
		AccessRequirement::Authenticated(Conditions::new())
	}

	pub fn require_role(role: Role) -> Self {
		Conditions::new().role(role).into()
	}

	pub fn require_any_of(roles: impl IntoIterator<Item = Role>) -> Self {
		Conditions::new().any_of(roles).into()
	}

	pub fn require_all_of(roles: impl IntoIterator<Item = Role>) -> Self {
		Conditions::new().all_of(roles).into()
	}

	pub fn require_not_role(role: Role) -> Self {
		Conditions::new().not_role(role).into()
	}

	pub fn require_plan(plan: Plan) -> Self {
		Conditions::new().plan(plan).into()
	}

	pub fn is_public(&self) -> bool {
		matches!(self, AccessRequirement::Public)
	}

	/// Conditions of an authenticated requirement; empty for a public one.
	pub fn conditions(&self) -> &[Condition] {
		match self {
			AccessRequirement::Public => &[],
			AccessRequirement::Authenticated(conditions) => conditions.as_slice(),
		}
	}
}

impl From<Conditions> for AccessRequirement {
	fn from(conditions: Conditions) -> Self {
		AccessRequirement::Authenticated(conditions)
	}
}

/// Loose requirement descriptor as written at gate call sites.
///
/// All fields are optional and combine with AND. `public` only takes effect
/// when no other field is set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RequirementSpec {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub role: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub any_of: Option<Vec<String>>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub all_of: Option<Vec<String>>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub not: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub plan: Option<String>,
	#[serde(skip_serializing_if = "std::ops::Not::not")]
	pub public: bool,
}

impl RequirementSpec {
	pub fn with_role(mut self, role: impl Into<String>) -> Self {
		self.role = Some(role.into());
		self
	}

	pub fn with_plan(mut self, plan: impl Into<String>) -> Self {
		self.plan = Some(plan.into());
		self
	}

	fn has_conditions(&self) -> bool {
		self.role.is_some()
			|| self.any_of.is_some()
			|| self.all_of.is_some()
			|| self.not.is_some()
			|| self.plan.is_some()
	}

	/// Convert into a typed requirement. Unknown names become unsatisfiable
	/// conditions.
	pub fn into_requirement(self) -> AccessRequirement {
		if self.public && !self.has_conditions() {
			return AccessRequirement::Public;
		}

		let mut conditions = Conditions::new();

		if let Some(plan) = self.plan {
			conditions = match plan.parse::<Plan>() {
				Ok(plan) => conditions.plan(plan),
				Err(err) => conditions.unsatisfiable(err.to_string()),
			};
		}

		if let Some(role) = self.role {
			conditions = match role.parse::<Role>() {
				Ok(role) => conditions.role(role),
				Err(err) => conditions.unsatisfiable(err.to_string()),
			};
		}

		if let Some(roles) = self.any_of {
			// Unknown names can never equal a user's role, so drop them.
			let known: Vec<Role> = roles.iter().filter_map(|r| r.parse().ok()).collect();
			conditions = conditions.any_of(known);
		}

		if let Some(roles) = self.all_of {
			match parse_all(&roles) {
				Ok(known) => conditions = conditions.all_of(known),
				Err(err) => conditions = conditions.unsatisfiable(err.to_string()),
			}
		}

		if let Some(role) = self.not {
			conditions = match role.parse::<Role>() {
				Ok(role) => conditions.not_role(role),
				Err(err) => conditions.unsatisfiable(err.to_string()),
			};
		}

		conditions.into()
	}
}

fn parse_all(roles: &[String]) -> Result<Vec<Role>, crate::types::UnknownVariant> {
	roles.iter().map(|r| r.parse::<Role>()).collect()
}

impl From<RequirementSpec> for AccessRequirement {
	fn from(spec: RequirementSpec) -> Self {
		spec.into_requirement()
	}
}
