// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Shared application services for the compiler tools (config, prefs).
//! Keeps the CLI and storage adapters thin.

pub mod config;
pub mod config_port;
pub mod prefs;
