// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
use std::path::PathBuf;

use bee_steps::StepError;
use thiserror::Error;

use crate::steps::StepResource;

/// Errors raised while exporting a package.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The requested style is not in the package.
    #[error("style {0:?} does not exist")]
    MissingStyle(String),
    /// The package defines no styles at all.
    #[error("package {0:?} has no styles")]
    NoStyles(String),
    /// A style lists an item the package does not define.
    #[error("style {style:?} uses unknown item {item:?}")]
    UnknownItem {
        /// Style id.
        style: String,
        /// Missing item id.
        item: String,
    },
    /// An item id cannot be used as a directory name.
    #[error("item id {0:?} is not a valid directory name")]
    BadItemId(String),
    /// A resource path escapes the package directory.
    #[error("resource path {0:?} must be relative and stay inside the package")]
    BadResourcePath(PathBuf),
    /// Reading or writing a file failed.
    #[error("io error at {path:?}: {source}")]
    Io {
        /// File involved.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: std::io::Error,
    },
    /// The package or an output document is not valid JSON for its schema.
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
    /// A step failed or the step graph is invalid.
    #[error(transparent)]
    Steps(#[from] StepError<StepResource>),
}

impl ExportError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }
}
