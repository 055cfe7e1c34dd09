use serde::Serialize;
use thiserror::Error;

/// Problems found in a node collection. None of them stop a computation: the
/// resolver repairs the structure and reports what it did.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DataIntegrityIssue {
    /// A later record reused an id; it is left out of the tree.
    #[error("duplicate id '{id}' at position {position}")]
    DuplicateId { id: String, position: usize },

    /// The parent id names no node; the node is treated as a root.
    #[error("node '{id}' references missing parent '{parent}'")]
    DanglingParent { id: String, parent: String },

    /// A parent cycle; the parent edge of `cut` was dropped, making it a root.
    #[error("parent cycle {members:?}; '{cut}' treated as a root")]
    Cycle { members: Vec<String>, cut: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TimelineError {
    /// No node yields a usable date range, so there is nothing to lay out.
    #[error("no usable date range for the timeline")]
    EmptySpan,
}
