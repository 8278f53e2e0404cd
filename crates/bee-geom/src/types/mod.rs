// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Core geometry types shared by the index and placement code.
//!
//! Overlap semantics are inclusive on faces: two boxes that merely touch are
//! reported as intersecting, so a brush resting on a plane still collides
//! with it.

#[doc = "Axis-aligned bounding boxes in map space."]
pub mod bbox;
