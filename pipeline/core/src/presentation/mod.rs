// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Presentation layer: HTTP surface consumed by the canvas frontend.

pub mod api;

pub use api::{app, AppState};
