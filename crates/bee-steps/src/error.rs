// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use core::fmt::Debug;

use thiserror::Error;

/// Errors raised while registering or running steps.
#[derive(Debug, Error)]
pub enum StepError<R: Debug> {
    /// `add_step` was called after a run started.
    #[error("cannot add step {0:?}: the step order is locked")]
    Locked(String),
    /// Step dependencies form a cycle. Nothing was executed.
    #[error("steps depend on each other in a loop: {description}")]
    Cycle {
        /// `a -[Tag]-> b -[Tag]-> a` rendering of the cycle.
        description: String,
        /// Tags along the cycle, in edge order.
        tags: Vec<R>,
    },
    /// A step needs tags that no step produces, so it could never start.
    /// Nothing was executed.
    #[error("step {step:?} waits on {tags:?}, which no step produces")]
    Deadlock {
        /// Name of the blocked step.
        step: String,
        /// Prerequisites without a producer.
        tags: Vec<R>,
    },
    /// A step returned an error; in-flight siblings were cancelled.
    #[error("step {name:?} failed")]
    Step {
        /// Name of the failing step.
        name: String,
        /// Error returned by the step.
        #[source]
        source: anyhow::Error,
    },
    /// A step panicked; in-flight siblings were cancelled.
    #[error("a step panicked: {0}")]
    Panicked(String),
}
