// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::path::PathBuf;

use thiserror::Error;

pub type RegistryResult<T> = Result<T, RegistryError>;

/// Errors raised while loading or editing the access registry.
///
/// Lookups never produce these; a missing entry is `None`.
#[derive(Error, Debug)]
pub enum RegistryError {
	#[error("failed to read {path}: {source}")]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("failed to parse access document: {0}")]
	Parse(#[from] serde_json::Error),

	#[error("component '{0}' is listed more than once")]
	DuplicateComponent(String),

	#[error("component name must not be empty")]
	EmptyComponent,
}
