// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Bee Steps
//!
//! Runs a set of async steps in dependency order. Each step declares the
//! resource tags it needs and the tags it produces; a step starts once every
//! producer of each of its prerequisites has finished. Independent steps run
//! concurrently on the tokio runtime.

mod error;
mod order;
mod signal;

pub use error::StepError;
pub use order::{Resource, StepFuture, StepOrder};
