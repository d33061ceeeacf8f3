// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Partial configuration produced by each source before merging.

use serde::Deserialize;

use crate::sections::{AccessConfigLayer, HttpConfigLayer, LoggingConfigLayer};

/// Top-level configuration layer. Every section is optional so that a
/// source only overrides what it actually sets.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfigLayer {
	#[serde(default)]
	pub http: Option<HttpConfigLayer>,
	#[serde(default)]
	pub logging: Option<LoggingConfigLayer>,
	#[serde(default)]
	pub access: Option<AccessConfigLayer>,
}

impl ServerConfigLayer {
	/// Merge `other` on top of `self`; values set in `other` win.
	pub fn merge(&mut self, other: ServerConfigLayer) {
		merge_section(&mut self.http, other.http, HttpConfigLayer::merge);
		merge_section(&mut self.logging, other.logging, LoggingConfigLayer::merge);
		merge_section(&mut self.access, other.access, AccessConfigLayer::merge);
	}
}

fn merge_section<T>(slot: &mut Option<T>, other: Option<T>, merge: fn(&mut T, T)) {
	match (slot.as_mut(), other) {
		(Some(current), Some(other)) => merge(current, other),
		(None, Some(other)) => *slot = Some(other),
		(_, None) => {}
	}
}
