// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0

//! Errors produced while building an address space from NodeSet events.

use thiserror::Error;

/// Error produced by the builder façade while consuming parser events.
///
/// This mirrors the two error channels described by the source design: malformed
/// input that halts parsing of a single entity, and a sort-time structural failure
/// that is reported separately through [`crate::Builder::get_sorted_nodes`].
#[derive(Error, Debug)]
pub enum BuilderError {
    /// A required attribute was missing and has no default.
    #[error("missing required attribute `{attribute}` on node class {node_class}")]
    MissingAttribute {
        /// Name of the missing attribute.
        attribute: &'static str,
        /// Node class the attribute was required on.
        node_class: &'static str,
    },
    /// A `NodeId` or `BrowseName` attribute value could not be parsed.
    #[error("invalid {kind} text: `{text}`")]
    InvalidId {
        /// Either `"NodeId"` or `"BrowseName"`.
        kind: &'static str,
        /// The raw text that failed to parse.
        text: String,
    },
    /// A boolean attribute was neither `"true"` nor `"false"`.
    #[error("invalid boolean text for attribute `{attribute}`: `{text}`")]
    InvalidBoolean {
        /// Name of the offending attribute.
        attribute: &'static str,
        /// The raw text that failed to parse.
        text: String,
    },
    /// An alias was referenced before being declared, or a `newAliasFinish` arrived
    /// for an alias handle that was already resolved.
    #[error("alias `{0}` was never declared with newAlias")]
    UnknownAlias(String),
    /// `newReferenceFinish` or `newAliasFinish` was called with a handle that does
    /// not belong to this builder (a programmer error in the event producer, not
    /// malformed NodeSet content).
    #[error("handle does not belong to this builder")]
    InvalidHandle,
}

/// Error produced by [`crate::sort::Sorter::sort`].
///
/// The source API folds this into a plain boolean return; we keep the distinct
/// reasons here and let the façade collapse them to `Ok(false)` so that a sort
/// failure is, as in the original, not a panic-worthy programmer error.
#[derive(Error, Debug)]
pub enum SortError {
    /// A hierarchical forward edge forms a cycle within a single node-class phase
    /// (or a locally-known parent never reaches zero in-degree, which is the same
    /// observable condition).
    #[error(
        "cycle or unresolved parent dependency among {remaining} node(s) in phase {phase}; \
         first unresolved node: {first_unresolved}"
    )]
    CycleOrMissingParent {
        /// The phase in which the failure was detected.
        phase: &'static str,
        /// How many nodes in that phase never reached zero in-degree.
        remaining: usize,
        /// One representative stuck node, for diagnostics (rendered textual NodeId).
        first_unresolved: String,
    },
}
