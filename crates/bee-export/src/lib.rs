// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Bee Export
//!
//! Turns a package (styles, items, their conditions and resource files) into
//! the configuration tree the compiler reads:
//!
//! ```text
//! <out>/editoritems.json
//! <out>/vbsp_config.json
//! <out>/items/<id>/config.json
//! <out>/resources/...
//! ```
//!
//! The work is split into steps tagged with [`StepResource`] and run through
//! [`bee_steps::StepOrder`], so independent writers run concurrently.

mod error;
mod package;
mod steps;

pub use error::ExportError;
pub use package::{ItemDef, Package, StyleDef};
pub use steps::{build_steps, export, ExportContext, ExportSummary, StepResource};
