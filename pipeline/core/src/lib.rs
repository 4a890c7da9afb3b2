// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Crucible Pipeline Core
//!
//! Domain, application, and infrastructure layers for the idea
//! crystallization pipeline.
//!
//! # Architecture
//!
//! - **Layer:** Core System
//! - **Purpose:** Idea graph, context ledger, and intelligence orchestration

pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod presentation;

pub use domain::*;
