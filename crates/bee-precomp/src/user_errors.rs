// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Errors caused by how the level was built, reported back to its author.

use core::fmt;

use bee_geom::Vec3;
use serde::Serialize;
use thiserror::Error;

use crate::item_chain::{ChainError, Highlight};

/// What the author got wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UserErrorKind {
    /// Linked items form a loop, and at least one of them forbids that.
    ChainingLoop,
    /// An item sits at a chain position (start, middle or end) it does not allow.
    ChainingInvalidKind,
    /// An item links forward to more than one item of its chain kind.
    ChainingMultiOutput,
    /// An item is linked to from more than one item of its chain kind.
    ChainingMultiInput,
}

impl fmt::Display for UserErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ChainingLoop => "These linked items form a loop, which is not allowed here.",
            Self::ChainingInvalidKind => {
                "These items are placed at a position in the chain they cannot be used in."
            }
            Self::ChainingMultiOutput => "This item is linked to more than one following item.",
            Self::ChainingMultiInput => "This item is linked from more than one preceding item.",
        })
    }
}

/// A compile failure to show the author, with locations to highlight.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[error("{kind}")]
pub struct UserError {
    /// Category of the mistake.
    pub kind: UserErrorKind,
    /// Points of interest.
    pub points: Vec<Vec3>,
    /// Pairs of points to draw lines between.
    pub lines: Vec<(Vec3, Vec3)>,
    /// Extra lines of text, such as item names.
    pub textlist: Vec<String>,
}

impl UserError {
    /// Creates an error of `kind` with nothing highlighted.
    pub fn new(kind: UserErrorKind) -> Self {
        Self {
            kind,
            points: Vec::new(),
            lines: Vec::new(),
            textlist: Vec::new(),
        }
    }

    /// Adds highlighted points and lines.
    pub fn with_highlight(mut self, highlight: Highlight) -> Self {
        self.points.extend(highlight.points);
        self.lines.extend(highlight.lines);
        self
    }

    /// Adds a line of text.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.textlist.push(text.into());
        self
    }

    /// Renders the error as pretty JSON for the error viewer.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl TryFrom<ChainError> for UserError {
    type Error = ChainError;

    /// Structural chain errors become author diagnostics. A missing item is
    /// an internal problem and is handed back unchanged.
    fn try_from(err: ChainError) -> Result<Self, ChainError> {
        Ok(match err {
            ChainError::MultiOutput { item, highlight } => {
                Self::new(UserErrorKind::ChainingMultiOutput)
                    .with_highlight(highlight)
                    .with_text(item)
            }
            ChainError::MultiInput { item, highlight } => {
                Self::new(UserErrorKind::ChainingMultiInput)
                    .with_highlight(highlight)
                    .with_text(item)
            }
            ChainError::Loop { highlight } => {
                Self::new(UserErrorKind::ChainingLoop).with_highlight(highlight)
            }
            err @ ChainError::MissingItem(_) => return Err(err),
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn json_carries_kind_and_geometry() {
        let err = UserError::new(UserErrorKind::ChainingLoop).with_highlight(Highlight {
            points: vec![Vec3::ZERO, Vec3::UNIT_Z],
            lines: vec![(Vec3::ZERO, Vec3::UNIT_Z)],
        });
        let value: serde_json::Value = serde_json::from_str(&err.to_json().unwrap()).unwrap();
        assert_eq!(value["kind"], "chaining_loop");
        assert_eq!(value["points"][1], serde_json::json!([0.0, 0.0, 1.0]));
        assert_eq!(value["lines"][0][1], serde_json::json!([0.0, 0.0, 1.0]));
    }

    #[test]
    fn missing_item_is_not_a_user_error() {
        let err = ChainError::MissingItem("x".into());
        assert_eq!(UserError::try_from(err.clone()), Err(err));
    }
}
