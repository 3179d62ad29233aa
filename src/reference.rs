// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0

//! Owns every parsed reference record. The owning node holds only a
//! [`ReferenceHandle`] into one of its two lists, never the record itself, so
//! reference records never form a pointer cycle with the nodes they connect.

use crate::ids::NodeId;
use crate::node::NodeHandle;

/// Opaque handle into the reference store, stable for the builder's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReferenceHandle(u32);

/// A single parsed reference.
///
/// `ref_type` is `None` only in the rare case where `ReferenceType` named an
/// alias that had not yet been declared (an `<Aliases>` entry parsed after
/// its first use): resolution is retried once at finalize, after every alias
/// has necessarily been seen. `target` is `None` between `newReference` and
/// `newReferenceFinish`, since the target `NodeId` arrives as character data
/// after the reference's start tag.
#[derive(Debug, Clone, Copy)]
pub struct Reference<'a> {
    pub ref_type_text: &'a str,
    pub ref_type: Option<NodeId<'a>>,
    pub target: Option<NodeId<'a>>,
    pub is_forward: bool,
    pub owner: NodeHandle,
}

/// Flat append-only store of every reference parsed in a load.
///
/// The source stores references as a head-inserted linked list per owner; we
/// keep an append-ordered `Vec` instead, since list order is documented as
/// not semantically significant and the simpler Rust-idiomatic ordering is a
/// harmless deviation.
#[derive(Default)]
pub struct ReferenceStore<'a> {
    records: Vec<Reference<'a>>,
}

impl<'a> ReferenceStore<'a> {
    pub fn new() -> Self {
        Self { records: Vec::new() }
    }

    /// Store a reference whose target is not yet known, and whose
    /// `ref_type` may still be pending alias resolution.
    pub fn insert(
        &mut self,
        ref_type_text: &'a str,
        ref_type: Option<NodeId<'a>>,
        is_forward: bool,
        owner: NodeHandle,
    ) -> ReferenceHandle {
        let handle = ReferenceHandle(self.records.len() as u32);
        self.records.push(Reference {
            ref_type_text,
            ref_type,
            target: None,
            is_forward,
            owner,
        });
        handle
    }

    /// Supply the target `NodeId` for a reference started with [`Self::insert`].
    pub fn set_target(&mut self, handle: ReferenceHandle, target: NodeId<'a>) {
        self.records[handle.0 as usize].target = Some(target);
    }

    /// Supply the `ref_type` for a reference whose alias was not yet
    /// resolvable at creation time.
    pub fn set_ref_type(&mut self, handle: ReferenceHandle, ref_type: NodeId<'a>) {
        self.records[handle.0 as usize].ref_type = Some(ref_type);
    }

    pub fn get(&self, handle: ReferenceHandle) -> &Reference<'a> {
        &self.records[handle.0 as usize]
    }

    pub fn get_mut(&mut self, handle: ReferenceHandle) -> &mut Reference<'a> {
        &mut self.records[handle.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Handles of every reference stored so far, in insertion order.
    pub fn handles(&self) -> impl Iterator<Item = ReferenceHandle> + '_ {
        (0..self.records.len() as u32).map(ReferenceHandle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeClass;

    // NodeHandle's fields are crate-private; build one the same way the
    // builder does, through a real NodeStore, so these tests exercise the
    // same types the rest of the crate does instead of faking a handle.
    fn object_handle<'a>(store: &mut crate::node::NodeStore<'a, ()>, arena: &'a crate::arena::CharArena) -> NodeHandle {
        let attrs = [("NodeId", "i=1"), ("BrowseName", "Test")];
        let aliases = crate::alias::AliasTable::new();
        let node = crate::node::build_node(arena, &aliases, NodeClass::Object, crate::node::Attributes::new(&attrs)).unwrap();
        store.insert(node)
    }

    #[test]
    fn target_starts_unresolved_then_finishes() {
        let arena = crate::arena::CharArena::new();
        let mut nodes = crate::node::NodeStore::new();
        let owner = object_handle(&mut nodes, &arena);

        let mut store = ReferenceStore::new();
        let ref_type = NodeId::numeric(0, 47);
        let h = store.insert("i=47", Some(ref_type), false, owner);
        assert!(store.get(h).target.is_none());

        let target = NodeId::numeric(0, 1000);
        store.set_target(h, target);
        assert_eq!(store.get(h).target, Some(target));
    }

    #[test]
    fn append_order_is_preserved() {
        let arena = crate::arena::CharArena::new();
        let mut nodes = crate::node::NodeStore::new();
        let owner = object_handle(&mut nodes, &arena);

        let mut store = ReferenceStore::new();
        let a = store.insert("i=47", Some(NodeId::numeric(0, 47)), true, owner);
        let b = store.insert("i=46", Some(NodeId::numeric(0, 46)), true, owner);
        assert!(a != b);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn pending_ref_type_resolves_later() {
        let arena = crate::arena::CharArena::new();
        let mut nodes = crate::node::NodeStore::new();
        let owner = object_handle(&mut nodes, &arena);

        let mut store = ReferenceStore::new();
        let h = store.insert("HasComponent", None, true, owner);
        assert!(store.get(h).ref_type.is_none());

        store.set_ref_type(h, NodeId::numeric(0, 47));
        assert_eq!(store.get(h).ref_type, Some(NodeId::numeric(0, 47)));
    }
}
