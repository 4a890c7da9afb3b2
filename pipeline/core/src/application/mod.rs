// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Application layer: the intelligence orchestrator and the response
//! normalization it relies on.

pub mod response;
pub mod intelligence;

pub use intelligence::{IntelligenceService, StandardIntelligenceService};
