// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

//! Broad-phase spatial lookup over placed geometry.
//!
//! Contract for every query here:
//! - Overlap is inclusive on faces (touching boxes intersect).
//! - Each stored `(bbox, value)` pair is reported once per matching query,
//!   so values sharing bounds are all returned.
//! - Result order is unspecified; callers sort if they need stability.

#[doc = "R-tree keyed by bounding boxes, carrying arbitrary values."]
pub mod tree;
