// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Access gating configuration: deployment environment, registry and
//! protection map locations, and the development fallback identity.

use std::path::PathBuf;

use serde::Deserialize;
use yukpo_access_core::{Plan, Role, User, UserId};

use crate::error::ConfigError;

const DEFAULT_ENVIRONMENT: &str = "development";
const DEFAULT_DEV_EMAIL: &str = "admin@yukpo.local";

/// Access configuration (runtime, fully resolved).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessConfig {
	pub environment: String,
	/// JSON registry document. The built-in catalog is used when unset.
	pub registry_path: Option<PathBuf>,
	/// JSON protection map (`{ "Component": true }`).
	pub protection_map_path: Option<PathBuf>,
	pub dev_fallback: DevFallbackConfig,
}

impl AccessConfig {
	pub fn is_production(&self) -> bool {
		self.environment.eq_ignore_ascii_case("production")
	}
}

impl Default for AccessConfig {
	fn default() -> Self {
		Self {
			environment: DEFAULT_ENVIRONMENT.to_string(),
			registry_path: None,
			protection_map_path: None,
			dev_fallback: DevFallbackConfig::default(),
		}
	}
}

/// Identity assumed for anonymous requests during local development.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DevFallbackConfig {
	pub enabled: bool,
	pub role: Role,
	pub plan: Plan,
	pub email: String,
}

impl Default for DevFallbackConfig {
	fn default() -> Self {
		Self {
			enabled: false,
			role: Role::Admin,
			plan: Plan::Enterprise,
			email: DEFAULT_DEV_EMAIL.to_string(),
		}
	}
}

impl DevFallbackConfig {
	/// The fallback user, or `None` when disabled.
	pub fn identity(&self) -> Option<User> {
		self.enabled.then(|| {
			User::new(
				UserId::generate(),
				self.email.clone(),
				self.role,
				self.plan,
			)
		})
	}
}

/// Access configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccessConfigLayer {
	#[serde(default)]
	pub environment: Option<String>,
	#[serde(default)]
	pub registry_path: Option<PathBuf>,
	#[serde(default)]
	pub protection_map_path: Option<PathBuf>,
	#[serde(default)]
	pub dev_fallback: Option<DevFallbackConfigLayer>,
}

/// Dev fallback layer. Role and plan stay as text until finalize.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DevFallbackConfigLayer {
	#[serde(default)]
	pub enabled: Option<bool>,
	#[serde(default)]
	pub role: Option<String>,
	#[serde(default)]
	pub plan: Option<String>,
	#[serde(default)]
	pub email: Option<String>,
}

impl AccessConfigLayer {
	pub fn merge(&mut self, other: AccessConfigLayer) {
		if other.environment.is_some() {
			self.environment = other.environment;
		}
		if other.registry_path.is_some() {
			self.registry_path = other.registry_path;
		}
		if other.protection_map_path.is_some() {
			self.protection_map_path = other.protection_map_path;
		}
		if let Some(other) = other.dev_fallback {
			match self.dev_fallback.as_mut() {
				Some(current) => current.merge(other),
				None => self.dev_fallback = Some(other),
			}
		}
	}

	pub fn finalize(self) -> Result<AccessConfig, ConfigError> {
		Ok(AccessConfig {
			environment: self
				.environment
				.unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string()),
			registry_path: self.registry_path,
			protection_map_path: self.protection_map_path,
			dev_fallback: self.dev_fallback.unwrap_or_default().finalize()?,
		})
	}
}

impl DevFallbackConfigLayer {
	pub fn merge(&mut self, other: DevFallbackConfigLayer) {
		if other.enabled.is_some() {
			self.enabled = other.enabled;
		}
		if other.role.is_some() {
			self.role = other.role;
		}
		if other.plan.is_some() {
			self.plan = other.plan;
		}
		if other.email.is_some() {
			self.email = other.email;
		}
	}

	pub fn finalize(self) -> Result<DevFallbackConfig, ConfigError> {
		let defaults = DevFallbackConfig::default();

		let role = match self.role {
			Some(raw) => raw.parse::<Role>().map_err(|e| ConfigError::InvalidValue {
				key: "access.dev_fallback.role".to_string(),
				message: e.to_string(),
			})?,
			None => defaults.role,
		};
		let plan = match self.plan {
			Some(raw) => raw.parse::<Plan>().map_err(|e| ConfigError::InvalidValue {
				key: "access.dev_fallback.plan".to_string(),
				message: e.to_string(),
			})?,
			None => defaults.plan,
		};

		Ok(DevFallbackConfig {
			enabled: self.enabled.unwrap_or(defaults.enabled),
			role,
			plan,
			email: self.email.unwrap_or(defaults.email),
		})
	}
}
