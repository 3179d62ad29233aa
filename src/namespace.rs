// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0

//! Translates the per-file namespace indices a NodeSet document uses into
//! server-global indices, by asking the host to resolve each declared URI.

use hashbrown::HashMap;

use crate::ids::{BrowseName, NodeId};

/// The OPC UA namespace URI, always present at server-global index 0.
pub const OPC_UA_NAMESPACE_URI: &str = "http://opcfoundation.org/UA/";

/// Resolves a namespace URI to a server-global namespace index, adding the
/// namespace to the host's table if it is not already known.
///
/// Implemented by the embedding application; a test double can simply assign
/// sequential indices.
pub trait NamespaceResolver {
    /// Return the server-global index for `uri`, registering it if necessary.
    fn resolve(&mut self, uri: &str) -> u16;
}

/// Per-file namespace index -> server-global namespace index.
///
/// A NodeSet document's `<NamespaceUris>` list is itself zero-indexed starting
/// from namespace 1 (namespace 0, the OPC UA namespace, is implicit and never
/// listed), so `file_to_global[0]` always maps to 0 and `file_to_global[k]` for
/// `k >= 1` is filled in as `new_namespace_finish` resolves the k-th declared URI.
pub struct NamespaceTable {
    file_to_global: Vec<u16>,
    declared: HashMap<u16, String>,
}

impl Default for NamespaceTable {
    fn default() -> Self {
        Self::new()
    }
}

impl NamespaceTable {
    /// A fresh table with only namespace 0 (the OPC UA namespace) known.
    pub fn new() -> Self {
        Self {
            file_to_global: vec![0],
            declared: HashMap::new(),
        }
    }

    /// Begin a new namespace declaration; returns the file-local index that will
    /// be assigned once [`Self::new_namespace_finish`] supplies its URI.
    pub fn new_namespace(&mut self) -> u16 {
        let idx = self.file_to_global.len() as u16;
        self.declared.insert(idx, String::new());
        self.file_to_global.push(0);
        idx
    }

    /// Supply the URI text for a namespace started with [`Self::new_namespace`]
    /// and resolve it to a server-global index through `resolver`.
    pub fn new_namespace_finish(
        &mut self,
        file_idx: u16,
        uri: &str,
        resolver: &mut impl NamespaceResolver,
    ) {
        let global = resolver.resolve(uri);
        if let Some(slot) = self.file_to_global.get_mut(file_idx as usize) {
            *slot = global;
        }
        self.declared.insert(file_idx, uri.to_owned());
    }

    /// Rewrite `id`'s namespace index from file-local to server-global. File-local
    /// indices this table never saw (malformed input) pass through unchanged
    /// rather than erroring, mirroring the tolerant original behavior for
    /// attributes consumed after the fact.
    pub fn translate<'a>(&self, id: NodeId<'a>) -> NodeId<'a> {
        match self.file_to_global.get(id.ns_idx as usize) {
            Some(global) => id.with_ns_idx(*global),
            None => id,
        }
    }

    /// Rewrite `name`'s namespace index from file-local to server-global, the
    /// `BrowseName` counterpart of [`Self::translate`].
    pub fn translate_browse_name<'a>(&self, name: BrowseName<'a>) -> BrowseName<'a> {
        match self.file_to_global.get(name.ns_idx as usize) {
            Some(global) => name.with_ns_idx(*global),
            None => name,
        }
    }

    /// The URI declared for a given file-local index, if any.
    pub fn uri(&self, file_idx: u16) -> Option<&str> {
        self.declared.get(&file_idx).map(String::as_str)
    }
}
