#![forbid(unsafe_code)]

//! Layout failures.

use std::fmt;

use crate::block::BlockPath;

/// Failure while measuring or placing a protocol tree.
///
/// Every variant carries the [`BlockPath`] of the block that failed so a
/// viewer can point at it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// No renderer entry is registered for the block's variant.
    UnknownBlockType {
        namespace: String,
        name: String,
        path: BlockPath,
    },
    /// A block contains itself, or nesting exceeded the configured depth.
    CyclicBlock { path: BlockPath, depth: usize },
    /// The block payload does not have the shape its variant expects.
    MalformedBlock { path: BlockPath, reason: String },
}

impl LayoutError {
    /// Path of the offending block.
    pub fn path(&self) -> &BlockPath {
        match self {
            Self::UnknownBlockType { path, .. }
            | Self::CyclicBlock { path, .. }
            | Self::MalformedBlock { path, .. } => path,
        }
    }

    pub(crate) fn malformed(path: &BlockPath, reason: impl fmt::Display) -> Self {
        Self::MalformedBlock {
            path: path.clone(),
            reason: reason.to_string(),
        }
    }
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownBlockType {
                namespace,
                name,
                path,
            } => write!(f, "unknown block type {namespace}.{name} at {path}"),
            Self::CyclicBlock { path, depth } => {
                write!(f, "cyclic or over-deep block at {path} (depth {depth})")
            }
            Self::MalformedBlock { path, reason } => {
                write!(f, "malformed block at {path}: {reason}")
            }
        }
    }
}

impl std::error::Error for LayoutError {}
