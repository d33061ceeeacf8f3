// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration for the Yukpo access server.
//!
//! This crate provides:
//! - Layered configuration from multiple sources (defaults, TOML file, environment)
//! - Type-safe configuration with validation
//! - Consistent environment variable naming (`YUKPO_SERVER_*`)
//!
//! # Usage
//!
//! ```ignore
//! use yukpo_server_config::load_config;
//!
//! let config = load_config()?;
//! println!("Server listening on {}", config.socket_addr());
//! ```

pub mod error;
pub mod layer;
pub mod sections;
pub mod sources;

use std::path::PathBuf;

pub use error::ConfigError;
pub use layer::ServerConfigLayer;
pub use sections::*;
pub use sources::{ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource};

use tracing::{debug, info};

/// Fully resolved server configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerConfig {
	pub http: HttpConfig,
	pub logging: LoggingConfig,
	pub access: AccessConfig,
}

impl ServerConfig {
	/// Get the socket address string for binding.
	pub fn socket_addr(&self) -> String {
		format!("{}:{}", self.http.host, self.http.port)
	}
}

/// Load configuration from all sources with standard precedence.
///
/// Precedence (highest to lowest):
/// 1. Environment variables (`YUKPO_SERVER_*`)
/// 2. Config file (`/etc/yukpo/server.toml`)
/// 3. Built-in defaults
pub fn load_config() -> Result<ServerConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(EnvSource),
	])
}

/// Load configuration from environment only (for testing or simple deployments).
pub fn load_config_from_env() -> Result<ServerConfig, ConfigError> {
	load_from_sources(vec![Box::new(EnvSource)])
}

/// Load configuration with a custom config file path.
pub fn load_config_with_file(config_path: impl Into<PathBuf>) -> Result<ServerConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource),
	])
}

/// Merge the given sources in precedence order and finalize.
pub fn load_from_sources(mut sources: Vec<Box<dyn ConfigSource>>) -> Result<ServerConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = ServerConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		let layer = source.load()?;
		merged.merge(layer);
	}

	finalize(merged)
}

/// Finalize configuration layer into resolved config.
pub fn finalize(layer: ServerConfigLayer) -> Result<ServerConfig, ConfigError> {
	let http = layer.http.unwrap_or_default().finalize();
	let logging = layer.logging.unwrap_or_default().finalize();
	let access = layer.access.unwrap_or_default().finalize()?;

	validate_config(&access)?;

	info!(
		host = %http.host,
		port = http.port,
		environment = %access.environment,
		registry_configured = access.registry_path.is_some(),
		protection_map_configured = access.protection_map_path.is_some(),
		dev_fallback_enabled = access.dev_fallback.enabled,
		"Server configuration loaded"
	);

	Ok(ServerConfig {
		http,
		logging,
		access,
	})
}

/// Validate cross-field configuration rules.
fn validate_config(access: &AccessConfig) -> Result<(), ConfigError> {
	if access.dev_fallback.enabled && access.is_production() {
		return Err(ConfigError::Validation(
			"YUKPO_SERVER_DEV_FALLBACK_ENABLED=1 is set while YUKPO_SERVER_ENV=production. \
			 This is a security risk. Remove YUKPO_SERVER_DEV_FALLBACK_ENABLED or set \
			 YUKPO_SERVER_ENV to a non-production value."
				.to_string(),
		));
	}

	Ok(())
}
