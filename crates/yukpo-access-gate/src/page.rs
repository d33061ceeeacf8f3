// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Page-level gates that redirect on denial.
//!
//! Rendering stays pure: [`PageGate::render`] only reports a [`RedirectIntent`].
//! Navigation happens afterwards, in [`RedirectEffect::commit`], and only when
//! the decision or the target route changed since the previous commit. Calling
//! render repeatedly for the same identity never navigates twice.

use yukpo_access_core::{AccessRequirement, Plan, RequirementSpec, Role};

use crate::gate::{Gate, GateView};
use crate::identity::IdentitySnapshot;

/// Route used when no redirect target is given.
pub const DEFAULT_REDIRECT: &str = "/";

/// Performs navigation. Implemented by whatever owns routing.
pub trait Navigator {
	fn navigate(&mut self, route: &str);
}

impl<F: FnMut(&str)> Navigator for F {
	fn navigate(&mut self, route: &str) {
		self(route)
	}
}

/// A navigation the page wants once the render is committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectIntent {
	pub route: String,
}

/// Result of rendering a [`PageGate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRender<T> {
	pub view: GateView<T>,
	pub redirect: Option<RedirectIntent>,
}

/// A gate over a whole page, such as a plan-restricted dashboard section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageGate {
	gate: Gate,
	redirect_to: String,
}

impl PageGate {
	pub fn new(gate: impl Into<Gate>, redirect_to: impl Into<String>) -> Self {
		Self {
			gate: gate.into(),
			redirect_to: redirect_to.into(),
		}
	}

	/// Redirects denied visitors to [`DEFAULT_REDIRECT`].
	pub fn with_default_redirect(gate: impl Into<Gate>) -> Self {
		Self::new(gate, DEFAULT_REDIRECT)
	}

	pub fn require_access(spec: RequirementSpec, redirect_to: impl Into<String>) -> Self {
		Self::new(Gate::require_access(spec), redirect_to)
	}

	pub fn require_role(role: Role, redirect_to: impl Into<String>) -> Self {
		Self::new(Gate::require_role(role), redirect_to)
	}

	pub fn require_plan(plan: Plan, redirect_to: impl Into<String>) -> Self {
		Self::new(Gate::require_plan(plan), redirect_to)
	}

	pub fn requirement(&self) -> &AccessRequirement {
		self.gate.requirement()
	}

	pub fn redirect_to(&self) -> &str {
		&self.redirect_to
	}

	/// Denial renders nothing and asks for a redirect.
	pub fn render<T>(&self, identity: &IdentitySnapshot, children: impl FnOnce() -> T) -> PageRender<T> {
		let redirect = self.redirect_intent(identity);
		let view = self.gate.render(identity, children);
		PageRender { view, redirect }
	}

	/// The redirect a render for `identity` would request, if any.
	pub fn redirect_intent(&self, identity: &IdentitySnapshot) -> Option<RedirectIntent> {
		self.gate.decide(identity).is_denied().then(|| RedirectIntent {
			route: self.redirect_to.clone(),
		})
	}
}

/// Per-mount slot that runs the redirect side effect after commit.
///
/// Holds the dependencies of the last commit. Create one per mounted page.
#[derive(Debug, Default)]
pub struct RedirectEffect {
	last: Option<Option<RedirectIntent>>,
}

impl RedirectEffect {
	pub fn new() -> Self {
		Self::default()
	}

	/// Apply a committed render. Returns `true` if navigation was issued.
	pub fn commit(&mut self, intent: Option<&RedirectIntent>, navigator: &mut dyn Navigator) -> bool {
		if self.last.as_ref().map(Option::as_ref) == Some(intent) {
			return false;
		}
		self.last = Some(intent.cloned());

		match intent {
			Some(intent) => {
				navigator.navigate(&intent.route);
				true
			}
			None => false,
		}
	}

	/// Convenience for committing a [`PageRender`].
	pub fn commit_render<T>(&mut self, render: &PageRender<T>, navigator: &mut dyn Navigator) -> bool {
		self.commit(render.redirect.as_ref(), navigator)
	}
}
