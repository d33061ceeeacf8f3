// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Access registry: the audit catalog of which named UI regions nominally
//! require which role and plan.
//!
//! The registry is informational. Gates enforce their own requirements and the
//! evaluator never consults this catalog, so editing an entry here changes what
//! the admin audit surface reports, not what any user can see.
//!
//! Edits are held in memory only. Writing them back to durable storage is the
//! caller's job.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{RegistryError, RegistryResult};
use crate::types::{Claim, Plan, Role};

/// Nominal requirement of one named UI region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessRule {
	pub component: String,
	pub role: Claim<Role>,
	pub plan: Claim<Plan>,
	/// Route path of the region, when it is a page.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub path: Option<String>,
}

impl AccessRule {
	pub fn new(
		component: impl Into<String>,
		role: impl Into<Claim<Role>>,
		plan: impl Into<Claim<Plan>>,
	) -> Self {
		Self {
			component: component.into(),
			role: role.into(),
			plan: plan.into(),
			path: None,
		}
	}

	pub fn with_path(mut self, path: impl Into<String>) -> Self {
		self.path = Some(path.into());
		self
	}
}

/// Outcome of [`AccessRegistry::update`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryUpdate {
	Updated { previous: AccessRule },
	Inserted,
}

/// Accepted document shapes: a bare list or `{ "access": [...] }`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RegistryDocument {
	Wrapped { access: Vec<AccessRule> },
	Bare(Vec<AccessRule>),
}

impl RegistryDocument {
	pub fn into_rules(self) -> Vec<AccessRule> {
		match self {
			RegistryDocument::Wrapped { access } | RegistryDocument::Bare(access) => access,
		}
	}
}

const SEED: &[(&str, Role, Plan, Option<&str>)] = &[
	("DashboardSelector", Role::Admin, Plan::Enterprise, None),
	(
		"AdminAccessAudit",
		Role::Admin,
		Plan::Enterprise,
		Some("/admin/access-audit"),
	),
	(
		"AdminAnalyticsPanel",
		Role::Admin,
		Plan::Enterprise,
		Some("/admin/analytics"),
	),
	("AdminPanel", Role::User, Plan::Pro, Some("/admin")),
	("DebugRolesPage", Role::Admin, Plan::Free, Some("/debug/roles")),
	(
		"YukpomnangPremium",
		Role::User,
		Plan::Enterprise,
		Some("/dashboard/ia-premium"),
	),
	("StrategicRecoPanel", Role::Client, Plan::Enterprise, None),
	(
		"PredictionDashboard",
		Role::User,
		Plan::Pro,
		Some("/prediction"),
	),
	("PaiementProPage", Role::User, Plan::Pro, Some("/paiement-pro")),
	("SingleServicePage", Role::User, Plan::Pro, Some("/service")),
	("TicketPriority", Role::User, Plan::Enterprise, None),
	("ContactEnterpriseForm", Role::Public, Plan::Enterprise, None),
	("MonProfil", Role::User, Plan::Free, Some("/dashboard/profil")),
];

/// Ordered catalog of [`AccessRule`]s, unique by component name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AccessRegistry {
	access: Vec<AccessRule>,
}

impl AccessRegistry {
	/// The built-in catalog.
	pub fn seeded() -> Self {
		let access = SEED
			.iter()
			.map(|(component, role, plan, path)| AccessRule {
				component: (*component).to_string(),
				role: Claim::Known(*role),
				plan: Claim::Known(*plan),
				path: path.map(str::to_string),
			})
			.collect();
		Self { access }
	}

	/// Build a registry, rejecting empty or duplicate component names.
	pub fn from_rules(rules: Vec<AccessRule>) -> RegistryResult<Self> {
		validate(&rules)?;
		Ok(Self { access: rules })
	}

	pub fn from_json_str(json: &str) -> RegistryResult<Self> {
		let document: RegistryDocument = serde_json::from_str(json)?;
		Self::from_rules(document.into_rules())
	}

	/// Load a registry document from disk.
	pub fn load(path: impl AsRef<Path>) -> RegistryResult<Self> {
		let path = path.as_ref();
		debug!(path = %path.display(), "loading access registry");
		let content = std::fs::read_to_string(path).map_err(|source| RegistryError::Io {
			path: path.to_path_buf(),
			source,
		})?;
		let registry = Self::from_json_str(&content)?;
		info!(
			path = %path.display(),
			entries = registry.len(),
			"access registry loaded"
		);
		Ok(registry)
	}

	pub fn list_all(&self) -> &[AccessRule] {
		&self.access
	}

	pub fn len(&self) -> usize {
		self.access.len()
	}

	pub fn is_empty(&self) -> bool {
		self.access.is_empty()
	}

	pub fn find_by_component_name(&self, name: &str) -> Option<&AccessRule> {
		self.access.iter().find(|rule| rule.component == name)
	}

	/// Find the entry registered for a route path. A trailing `/` is ignored on
	/// both sides.
	pub fn find_by_path(&self, path: &str) -> Option<&AccessRule> {
		let wanted = normalize_path(path);
		self
			.access
			.iter()
			.find(|rule| rule.path.as_deref().map(normalize_path) == Some(wanted))
	}

	/// Entries matching the optional role and plan filters, in catalog order.
	pub fn filter(&self, role: Option<Role>, plan: Option<Plan>) -> Vec<&AccessRule> {
		self
			.access
			.iter()
			.filter(|rule| role.map_or(true, |r| rule.role == Claim::Known(r)))
			.filter(|rule| plan.map_or(true, |p| rule.plan == Claim::Known(p)))
			.collect()
	}

	/// Set the nominal role and plan of a component, appending it when absent.
	pub fn update(
		&mut self,
		component: &str,
		role: impl Into<Claim<Role>>,
		plan: impl Into<Claim<Plan>>,
	) -> RegistryResult<RegistryUpdate> {
		if component.trim().is_empty() {
			return Err(RegistryError::EmptyComponent);
		}

		let role = role.into();
		let plan = plan.into();

		match self.access.iter_mut().find(|rule| rule.component == component) {
			Some(rule) => {
				let previous = rule.clone();
				rule.role = role;
				rule.plan = plan;
				Ok(RegistryUpdate::Updated { previous })
			}
			None => {
				self.access.push(AccessRule::new(component, role, plan));
				Ok(RegistryUpdate::Inserted)
			}
		}
	}

	pub fn remove(&mut self, component: &str) -> Option<AccessRule> {
		let index = self
			.access
			.iter()
			.position(|rule| rule.component == component)?;
		Some(self.access.remove(index))
	}

	/// Replace the whole catalog. The current contents survive a rejected list.
	pub fn replace_all(&mut self, rules: Vec<AccessRule>) -> RegistryResult<()> {
		validate(&rules)?;
		self.access = rules;
		Ok(())
	}

	/// CSV export in the admin audit table layout.
	pub fn to_csv(&self, role: Option<Role>, plan: Option<Plan>) -> String {
		let role_label = role.map_or_else(|| "all".to_string(), |r| r.to_string());
		let plan_label = plan.map_or_else(|| "all".to_string(), |p| p.to_string());

		let mut lines = vec![
			format!("Export ACCESS_REGISTRY,Role: {role_label},Plan: {plan_label}"),
			String::new(),
			"Component,Role,Plan".to_string(),
		];
		lines.extend(self.filter(role, plan).into_iter().map(|rule| {
			format!(
				"{},{},{}",
				csv_field(&rule.component),
				csv_field(&rule.role.to_string()),
				csv_field(&rule.plan.to_string())
			)
		}));
		lines.join("\n")
	}
}

fn validate(rules: &[AccessRule]) -> RegistryResult<()> {
	let mut seen = HashSet::new();
	for rule in rules {
		if rule.component.trim().is_empty() {
			return Err(RegistryError::EmptyComponent);
		}
		if !seen.insert(rule.component.as_str()) {
			return Err(RegistryError::DuplicateComponent(rule.component.clone()));
		}
	}
	Ok(())
}

fn normalize_path(path: &str) -> &str {
	match path.trim_end_matches('/') {
		"" => "/",
		trimmed => trimmed,
	}
}

fn csv_field(value: &str) -> String {
	if value.contains([',', '"', '\n', '\r']) {
		format!("\"{}\"", value.replace('"', "\"\""))
	} else {
		value.to_string()
	}
}

// =============================================================================
// Protection map
// =============================================================================

/// Which components are actually wrapped in a gate at their usage site.
///
/// Used only to flag registry rows that nominally require access but render
/// unguarded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProtectionMap(BTreeMap<String, bool>);

impl ProtectionMap {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn from_json_str(json: &str) -> RegistryResult<Self> {
		Ok(serde_json::from_str(json)?)
	}

	pub fn load(path: impl AsRef<Path>) -> RegistryResult<Self> {
		let path = path.as_ref();
		let content = std::fs::read_to_string(path).map_err(|source| RegistryError::Io {
			path: path.to_path_buf(),
			source,
		})?;
		let map = Self::from_json_str(&content)?;
		debug!(path = %path.display(), components = map.0.len(), "protection map loaded");
		Ok(map)
	}

	pub fn mark(&mut self, component: impl Into<String>, protected: bool) {
		self.0.insert(component.into(), protected);
	}

	/// True only for components explicitly marked protected.
	pub fn is_protected(&self, component: &str) -> bool {
		self.0.get(component).copied().unwrap_or(false)
	}

	/// Registry entries whose component is not marked protected.
	pub fn unguarded<'a>(&self, registry: &'a AccessRegistry) -> Vec<&'a AccessRule> {
		registry
			.list_all()
			.iter()
			.filter(|rule| !self.is_protected(&rule.component))
			.collect()
	}
}
