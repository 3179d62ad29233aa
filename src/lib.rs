// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0

//! In-memory address-space builder for OPC UA NodeSet2 imports.
//!
//! This crate is the model-building core behind a NodeSet2 XML import
//! pipeline: it consumes SAX-style parser events describing nodes,
//! references, aliases, and namespace declarations, and produces a single,
//! dependency-respecting emission order ready to hand to a server's
//! information model. The XML lexer, the value decoder for `Variable`
//! defaults, and the host's namespace registry are all external
//! collaborators the caller supplies; see [`Builder`], [`value`], and
//! [`namespace`].
//!
//! Three entangled facts make this more than a plain topological sort:
//! node ids can be given as aliases resolved elsewhere in the file, namespace
//! indices are file-local and must be translated to server-global indices,
//! and the set of reference types considered hierarchical is itself grown by
//! the nodes being parsed (a new `ReferenceType` that is a subtype of a
//! hierarchical one becomes hierarchical too). See [`hierarchy`] and [`sort`].

pub mod alias;
pub mod arena;
pub mod builder;
pub mod error;
pub mod hierarchy;
pub mod ids;
pub mod namespace;
pub mod node;
pub mod reference;
pub mod sort;
pub mod value;

pub use alias::{AliasHandle, AliasTable};
pub use arena::CharArena;
pub use builder::Builder;
pub use error::{BuilderError, SortError};
pub use hierarchy::HierarchicalSet;
pub use ids::{BrowseName, NodeId, NodeIdValue};
pub use namespace::{NamespaceResolver, NamespaceTable};
pub use node::{Attributes, Node, NodeBase, NodeClass, NodeHandle, NodeKind};
pub use reference::{Reference, ReferenceHandle, ReferenceStore};
pub use value::{NoopValueInterface, ValueInterface};
