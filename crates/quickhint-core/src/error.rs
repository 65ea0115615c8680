//! Typed errors for the hint engine.
//!
//! Two failure domains exist: selector parsing/matching (recoverable,
//! logged, degrades to an empty scan) and click synthesis (best-effort,
//! reported to the caller but never blocks session teardown).

use thiserror::Error;

use crate::surface::NodeId;

/// A selector string the document surface could not interpret.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed selector '{selector}': {reason}")]
pub struct SelectorError {
    /// The selector (or selector list) that failed to parse.
    pub selector: String,
    /// What was wrong with it.
    pub reason: String,
}

impl SelectorError {
    pub fn new(selector: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            reason: reason.into(),
        }
    }
}

/// A failure while synthesizing a click on a resolved target.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClickError {
    /// The target element is no longer part of the document.
    #[error("target {0:?} is detached from the document")]
    TargetDetached(NodeId),

    /// The host surface refused the synthetic event.
    #[error("event dispatch on {node:?} rejected: {reason}")]
    DispatchRejected { node: NodeId, reason: String },
}
