// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Gate components for Yukpo.
//!
//! - [`identity`]: the read-only boundary with the identity source, plus the
//!   development fallback identity
//! - [`gate`]: declarative gates that choose between placeholder, protected
//!   content and fallback
//! - [`page`]: page gates whose denial becomes a redirect, issued after render
//!
//! Gates consult only the evaluator and the current identity snapshot. They
//! never read the access registry and do not log.

pub mod gate;
pub mod identity;
pub mod page;

pub use gate::{Gate, GateDecision, GateView};
pub use identity::{
	identity_channel, DevFallback, IdentityClosed, IdentityPublisher, IdentitySnapshot, IdentitySource,
	StaticIdentity, WatchIdentitySource, WithDevFallback,
};
pub use page::{Navigator, PageGate, PageRender, RedirectEffect, RedirectIntent, DEFAULT_REDIRECT};
