// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Reasoning Provider Infrastructure - Anti-Corruption Layer Implementations
//
// Adapters translating between the domain `ReasoningProvider` interface and
// external model APIs.

pub mod anthropic;

pub use anthropic::AnthropicReasoner;
