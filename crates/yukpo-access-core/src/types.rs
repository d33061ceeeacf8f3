// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core type definitions for access gating.
//!
//! - **ID newtypes**: [`UserId`] wraps a UUID so user identifiers cannot be mixed
//!   up with other strings
//! - **Closed enumerations**: [`Role`] and [`Plan`]
//! - **Classified attributes**: [`Claim`] keeps values that did not parse into the
//!   closed enumerations instead of rejecting them, so the evaluator can deny them
//! - **Identity snapshot**: [`User`]
//!
//! Role and plan strings are matched exactly (`"admin"`, not `"Admin"`).

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// =============================================================================
// ID Newtypes
// =============================================================================

macro_rules! define_id_type {
	($name:ident, $doc:expr) => {
		#[doc = $doc]
		#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
		#[serde(transparent)]
		pub struct $name(Uuid);

		impl $name {
			/// Create a new ID from a UUID.
			pub fn new(id: Uuid) -> Self {
				Self(id)
			}

			/// Generate a new random ID.
			pub fn generate() -> Self {
				Self(Uuid::new_v4())
			}

			/// Get the inner UUID value.
			pub fn into_inner(self) -> Uuid {
				self.0
			}
		}

		impl fmt::Display for $name {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				write!(f, "{}", self.0)
			}
		}

		impl FromStr for $name {
			type Err = uuid::Error;

			fn from_str(s: &str) -> Result<Self, Self::Err> {
				Ok(Self(Uuid::parse_str(s)?))
			}
		}

		impl From<Uuid> for $name {
			fn from(id: Uuid) -> Self {
				Self(id)
			}
		}
	};
}

define_id_type!(UserId, "Unique identifier for a user.");

// =============================================================================
// Roles
// =============================================================================

/// Coarse identity classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
	/// Platform administrator.
	Admin,
	/// Service provider account.
	Client,
	/// Regular signed-in customer.
	User,
	/// Visitor-level classification for signed-in but unverified accounts.
	Public,
}

impl Role {
	/// Returns all available roles.
	pub fn all() -> &'static [Role] {
		&[Role::Admin, Role::Client, Role::User, Role::Public]
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			Role::Admin => "admin",
			Role::Client => "client",
			Role::User => "user",
			Role::Public => "public",
		}
	}
}

impl fmt::Display for Role {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for Role {
	type Err = UnknownVariant;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Role::all()
			.iter()
			.copied()
			.find(|role| role.as_str() == s)
			.ok_or_else(|| UnknownVariant::new("role", s))
	}
}

// =============================================================================
// Plans
// =============================================================================

/// Subscription tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Plan {
	Free,
	Pro,
	Enterprise,
}

impl Plan {
	/// Returns all available plans.
	pub fn all() -> &'static [Plan] {
		&[Plan::Free, Plan::Pro, Plan::Enterprise]
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			Plan::Free => "free",
			Plan::Pro => "pro",
			Plan::Enterprise => "enterprise",
		}
	}
}

impl fmt::Display for Plan {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for Plan {
	type Err = UnknownVariant;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Plan::all()
			.iter()
			.copied()
			.find(|plan| plan.as_str() == s)
			.ok_or_else(|| UnknownVariant::new("plan", s))
	}
}

/// Error returned when a string names no member of a closed enumeration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownVariant {
	pub kind: &'static str,
	pub value: String,
}

impl UnknownVariant {
	fn new(kind: &'static str, value: &str) -> Self {
		Self {
			kind,
			value: value.to_string(),
		}
	}
}

// =============================================================================
// Classified attributes
// =============================================================================

/// An attribute value as reported by an external collaborator.
///
/// Serialized as the bare string in both cases.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Claim<T> {
	Known(T),
	Unrecognized(String),
}

impl<T> Claim<T> {
	/// The recognized value, if any.
	pub fn known(&self) -> Option<&T> {
		match self {
			Claim::Known(value) => Some(value),
			Claim::Unrecognized(_) => None,
		}
	}

	pub fn is_known(&self) -> bool {
		matches!(self, Claim::Known(_))
	}
}

impl<T: FromStr> Claim<T> {
	/// Classify a raw string. Never fails.
	pub fn parse(raw: &str) -> Self {
		match raw.parse() {
			Ok(value) => Claim::Known(value),
			Err(_) => Claim::Unrecognized(raw.to_string()),
		}
	}
}

impl<T> From<T> for Claim<T> {
	fn from(value: T) -> Self {
		Claim::Known(value)
	}
}

impl<T: fmt::Display> fmt::Display for Claim<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Claim::Known(value) => write!(f, "{value}"),
			Claim::Unrecognized(raw) => f.write_str(raw),
		}
	}
}

impl<T: fmt::Display> Serialize for Claim<T> {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.collect_str(self)
	}
}

impl<'de, T: FromStr> Deserialize<'de> for Claim<T> {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let raw = String::deserialize(deserializer)?;
		Ok(Claim::parse(&raw))
	}
}

// =============================================================================
// User snapshot
// =============================================================================

/// Identity snapshot of the current user.
///
/// Owned by the identity source; gating code only reads it. A refresh produces
/// a new snapshot rather than mutating this one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
	pub id: UserId,
	pub email: String,
	pub role: Claim<Role>,
	pub plan: Claim<Plan>,
}

impl User {
	pub fn new(
		id: UserId,
		email: impl Into<String>,
		role: impl Into<Claim<Role>>,
		plan: impl Into<Claim<Plan>>,
	) -> Self {
		Self {
			id,
			email: email.into(),
			role: role.into(),
			plan: plan.into(),
		}
	}

	pub fn known_role(&self) -> Option<Role> {
		self.role.known().copied()
	}

	pub fn known_plan(&self) -> Option<Plan> {
		self.plan.known().copied()
	}
}
