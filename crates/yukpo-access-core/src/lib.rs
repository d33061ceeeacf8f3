// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core types for Yukpo role and plan access gating.
//!
//! This crate is shared by the gate contract (`yukpo-access-gate`) and the
//! server (`yukpo-server`). It provides:
//!
//! - The identity snapshot ([`User`]) with its closed [`Role`] and [`Plan`]
//!   enumerations
//! - Declarative requirements ([`AccessRequirement`], [`RequirementSpec`])
//! - The pure evaluator ([`evaluate`], [`is_allowed`])
//! - The audit catalog ([`AccessRegistry`]) and [`ProtectionMap`]
//!
//! The evaluator never reads the registry.
//!
//! # Example
//!
//! ```
//! use yukpo_access_core::{is_allowed, AccessRequirement, Plan, Role, User, UserId};
//!
//! let user = User::new(UserId::generate(), "a@yukpo.local", Role::User, Plan::Free);
//! assert!(!is_allowed(Some(&user), &AccessRequirement::require_plan(Plan::Pro)));
//! assert!(!is_allowed(None, &AccessRequirement::require_role(Role::Admin)));
//! ```

pub mod error;
pub mod evaluator;
pub mod registry;
pub mod requirement;
pub mod types;

pub use error::{RegistryError, RegistryResult};
pub use evaluator::{evaluate, is_allowed, AccessDecision, DecisionReason};
pub use registry::{AccessRegistry, AccessRule, ProtectionMap, RegistryDocument, RegistryUpdate};
pub use requirement::{AccessRequirement, Condition, Conditions, RequirementSpec};
pub use types::{Claim, Plan, Role, UnknownVariant, User, UserId};
