// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Domain layer: entities of the idea graph, the context ledger, and the
//! boundary contracts for the two external model services.

pub mod project;
pub mod idea;
pub mod connection;
pub mod repository;
pub mod llm;
pub mod forecast;
pub mod validation;
pub mod discovery;
pub mod intelligence;
