// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Boundary with the identity source.
//!
//! The identity source owns the user snapshot: it fetches, caches and refreshes
//! it on its own cadence. Gates only read the current [`IdentitySnapshot`].
//! Updates replace the snapshot wholesale; nothing here mutates a [`User`].
//!
//! ```text
//! { user, isLoading }  ──from_parts──▶  Loading | Anonymous | Authenticated(User)
//!                                             │
//!                              DevFallback (non-production only)
//!                                             │
//!                                     Anonymous ─▶ Authenticated(dev user)
//! ```

use thiserror::Error;
use tokio::sync::watch;
use yukpo_access_core::User;

/// What the identity source currently knows about the visitor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentitySnapshot {
	/// Identity not resolved yet.
	Loading,
	/// Resolved: nobody is signed in.
	Anonymous,
	/// Resolved: a signed-in user.
	Authenticated(User),
}

impl IdentitySnapshot {
	/// Map the `{ user, isLoading }` boundary shape.
	///
	/// A snapshot that still carries a user while refreshing keeps that user.
	pub fn from_parts(user: Option<User>, is_loading: bool) -> Self {
		match (user, is_loading) {
			(Some(user), _) => IdentitySnapshot::Authenticated(user),
			(None, true) => IdentitySnapshot::Loading,
			(None, false) => IdentitySnapshot::Anonymous,
		}
	}

	pub fn user(&self) -> Option<&User> {
		match self {
			IdentitySnapshot::Authenticated(user) => Some(user),
			_ => None,
		}
	}

	pub fn is_loading(&self) -> bool {
		matches!(self, IdentitySnapshot::Loading)
	}
}

impl From<Option<User>> for IdentitySnapshot {
	fn from(user: Option<User>) -> Self {
		IdentitySnapshot::from_parts(user, false)
	}
}

/// Anything that can hand out the current identity snapshot.
pub trait IdentitySource: Send + Sync {
	fn snapshot(&self) -> IdentitySnapshot;
}

/// A fixed snapshot, for tests and server-side rendering of a known identity.
#[derive(Debug, Clone)]
pub struct StaticIdentity(IdentitySnapshot);

impl StaticIdentity {
	pub fn new(snapshot: IdentitySnapshot) -> Self {
		Self(snapshot)
	}

	pub fn user(user: User) -> Self {
		Self(IdentitySnapshot::Authenticated(user))
	}

	pub fn anonymous() -> Self {
		Self(IdentitySnapshot::Anonymous)
	}
}

impl IdentitySource for StaticIdentity {
	fn snapshot(&self) -> IdentitySnapshot {
		self.0.clone()
	}
}

// =============================================================================
// Watch-backed source
// =============================================================================

/// Returned once every [`IdentityPublisher`] has been dropped.
#[derive(Debug, Clone, Copy, Error)]
#[error("identity publisher closed")]
pub struct IdentityClosed;

/// Create a publisher/source pair. The source starts out [`IdentitySnapshot::Loading`].
pub fn identity_channel() -> (IdentityPublisher, WatchIdentitySource) {
	let (tx, rx) = watch::channel(IdentitySnapshot::Loading);
	(IdentityPublisher { tx }, WatchIdentitySource { rx })
}

/// Write side, held by whatever resolves the session.
#[derive(Debug)]
pub struct IdentityPublisher {
	tx: watch::Sender<IdentitySnapshot>,
}

impl IdentityPublisher {
	/// Replace the current snapshot. Receivers are only woken when it differs.
	pub fn publish(&self, snapshot: IdentitySnapshot) {
		self.tx.send_if_modified(|current| {
			if *current == snapshot {
				false
			} else {
				*current = snapshot;
				true
			}
		});
	}

	pub fn sign_in(&self, user: User) {
		self.publish(IdentitySnapshot::Authenticated(user));
	}

	pub fn sign_out(&self) {
		self.publish(IdentitySnapshot::Anonymous);
	}

	pub fn set_loading(&self) {
		self.publish(IdentitySnapshot::Loading);
	}
}

/// Read side. Cheap to clone; every clone observes the same snapshots.
#[derive(Debug, Clone)]
pub struct WatchIdentitySource {
	rx: watch::Receiver<IdentitySnapshot>,
}

impl WatchIdentitySource {
	/// Wait until a new snapshot is published.
	pub async fn changed(&mut self) -> Result<IdentitySnapshot, IdentityClosed> {
		self.rx.changed().await.map_err(|_| IdentityClosed)?;
		Ok(self.rx.borrow_and_update().clone())
	}
}

impl IdentitySource for WatchIdentitySource {
	fn snapshot(&self) -> IdentitySnapshot {
		self.rx.borrow().clone()
	}
}

// =============================================================================
// Dev fallback identity
// =============================================================================

/// Identity substituted for anonymous visitors in development builds.
///
/// Only [`IdentitySnapshot::Anonymous`] is replaced; a loading snapshot stays
/// loading. The server configuration refuses to enable this in production.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DevFallback {
	identity: Option<User>,
}

impl DevFallback {
	pub fn disabled() -> Self {
		Self { identity: None }
	}

	pub fn new(identity: Option<User>) -> Self {
		Self { identity }
	}

	pub fn identity(&self) -> Option<&User> {
		self.identity.as_ref()
	}

	pub fn is_enabled(&self) -> bool {
		self.identity.is_some()
	}

	pub fn apply(&self, snapshot: IdentitySnapshot) -> IdentitySnapshot {
		match (snapshot, &self.identity) {
			(IdentitySnapshot::Anonymous, Some(user)) => IdentitySnapshot::Authenticated(user.clone()),
			(snapshot, _) => snapshot,
		}
	}
}

/// An [`IdentitySource`] with a [`DevFallback`] applied on read.
#[derive(Debug, Clone)]
pub struct WithDevFallback<S> {
	source: S,
	fallback: DevFallback,
}

impl<S: IdentitySource> WithDevFallback<S> {
	pub fn new(source: S, fallback: DevFallback) -> Self {
		Self { source, fallback }
	}
}

impl<S: IdentitySource> IdentitySource for WithDevFallback<S> {
	fn snapshot(&self) -> IdentitySnapshot {
		self.fallback.apply(self.source.snapshot())
	}
}
