// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Declarative component gates.
//!
//! A [`Gate`] wraps protected content. On every render it reads the current
//! identity snapshot and produces one of three views: a neutral placeholder
//! while identity is loading, the protected content when the requirement is
//! satisfied, or the caller's fallback (possibly nothing) when it is not.
//!
//! Gates evaluate fresh on every render and keep no state between renders.

use yukpo_access_core::{evaluate, AccessDecision, AccessRequirement, Plan, RequirementSpec, Role};

use crate::identity::{IdentitySnapshot, IdentitySource};

/// Outcome of a single gate render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateView<T> {
	/// Identity is still loading. Neither content nor fallback is shown.
	Placeholder,
	/// The requirement holds.
	Protected(T),
	/// The requirement does not hold. `None` renders nothing.
	Fallback(Option<T>),
}

impl<T> GateView<T> {
	pub fn is_placeholder(&self) -> bool {
		matches!(self, GateView::Placeholder)
	}

	pub fn is_protected(&self) -> bool {
		matches!(self, GateView::Protected(_))
	}

	pub fn is_fallback(&self) -> bool {
		matches!(self, GateView::Fallback(_))
	}

	/// Whatever would end up on screen.
	pub fn into_content(self) -> Option<T> {
		match self {
			GateView::Placeholder => None,
			GateView::Protected(content) => Some(content),
			GateView::Fallback(content) => content,
		}
	}

	pub fn map<U>(self, f: impl FnOnce(T) -> U) -> GateView<U> {
		match self {
			GateView::Placeholder => GateView::Placeholder,
			GateView::Protected(content) => GateView::Protected(f(content)),
			GateView::Fallback(content) => GateView::Fallback(content.map(f)),
		}
	}
}

/// Pre-render decision, before any content is produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
	Pending,
	Decided(AccessDecision),
}

impl GateDecision {
	pub fn is_allowed(&self) -> bool {
		matches!(self, GateDecision::Decided(decision) if decision.allowed)
	}

	pub fn is_denied(&self) -> bool {
		matches!(self, GateDecision::Decided(decision) if !decision.allowed)
	}
}

/// A reusable gate bound to one requirement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gate {
	requirement: AccessRequirement,
}

impl Gate {
	pub fn new(requirement: impl Into<AccessRequirement>) -> Self {
		Self {
			requirement: requirement.into(),
		}
	}

	/// General gate from the `{ role?, anyOf?, allOf?, not?, plan?, public? }` shape.
	pub fn require_access(spec: RequirementSpec) -> Self {
		Self::new(spec.into_requirement())
	}

	pub fn require_role(role: Role) -> Self {
		Self::new(AccessRequirement::require_role(role))
	}

	pub fn require_plan(plan: Plan) -> Self {
		Self::new(AccessRequirement::require_plan(plan))
	}

	pub fn requirement(&self) -> &AccessRequirement {
		&self.requirement
	}

	/// Public requirements are decided even while identity is loading.
	pub fn decide(&self, identity: &IdentitySnapshot) -> GateDecision {
		if self.requirement.is_public() {
			return GateDecision::Decided(evaluate(identity.user(), &self.requirement));
		}
		match identity {
			IdentitySnapshot::Loading => GateDecision::Pending,
			other => GateDecision::Decided(evaluate(other.user(), &self.requirement)),
		}
	}

	/// Render with no fallback. A denial renders nothing.
	pub fn render<T>(&self, identity: &IdentitySnapshot, children: impl FnOnce() -> T) -> GateView<T> {
		self.render_inner(identity, children, None::<fn() -> T>)
	}

	/// Render with a fallback shown on denial.
	pub fn render_or<T>(
		&self,
		identity: &IdentitySnapshot,
		children: impl FnOnce() -> T,
		fallback: impl FnOnce() -> T,
	) -> GateView<T> {
		self.render_inner(identity, children, Some(fallback))
	}

	/// Render against whatever the source reports right now.
	pub fn render_from<T>(
		&self,
		source: &dyn IdentitySource,
		children: impl FnOnce() -> T,
	) -> GateView<T> {
		self.render(&source.snapshot(), children)
	}

	fn render_inner<T, F>(
		&self,
		identity: &IdentitySnapshot,
		children: impl FnOnce() -> T,
		fallback: Option<F>,
	) -> GateView<T>
	where
		F: FnOnce() -> T,
	{
		// Children are only built once access is granted.
		match self.decide(identity) {
			GateDecision::Pending => GateView::Placeholder,
			GateDecision::Decided(decision) if decision.allowed => GateView::Protected(children()),
			GateDecision::Decided(_) => GateView::Fallback(fallback.map(|f| f())),
		}
	}
}

impl From<AccessRequirement> for Gate {
	fn from(requirement: AccessRequirement) -> Self {
		Gate::new(requirement)
	}
}

impl From<RequirementSpec> for Gate {
	fn from(spec: RequirementSpec) -> Self {
		Gate::require_access(spec)
	}
}
