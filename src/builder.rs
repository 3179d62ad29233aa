// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0

//! The builder façade: the single entry point the SAX-style parser driver
//! calls. Consumes `new*`/`new*Finish` event pairs and drives the namespace
//! table, alias table, node store, reference store, and hierarchical
//! classifier, then produces a sorted emission stream.

use log::{debug, trace, warn};

use crate::alias::{AliasHandle, AliasTable};
use crate::arena::CharArena;
use crate::error::BuilderError;
use crate::hierarchy::{Classification, HierarchicalSet};
use crate::ids::NodeId;
use crate::namespace::{NamespaceResolver, NamespaceTable};
use crate::node::{self, Attributes, NodeClass, NodeHandle, NodeKind, NodeStore};
use crate::reference::{ReferenceHandle, ReferenceStore};
use crate::value::ValueInterface;

/// Consumes NodeSet parser events and builds an in-memory address space.
///
/// Borrows a [`CharArena`] rather than owning one: the arena is a sibling
/// object supplied by the caller, so node and reference records can hold
/// references into it without the builder being self-referential.
pub struct Builder<'a, V> {
    arena: &'a CharArena,
    namespaces: NamespaceTable,
    aliases: AliasTable<'a>,
    nodes: NodeStore<'a, V>,
    refs: ReferenceStore<'a>,
    hierarchy: HierarchicalSet<'a>,
    /// References whose `ReferenceType` attribute named an alias not yet
    /// declared at creation time; retried once at finalize.
    pending_ref_type: Vec<ReferenceHandle>,
}

impl<'a, V> Builder<'a, V> {
    /// A fresh builder over `arena`, with namespace 0 and the eight built-in
    /// hierarchical reference types pre-seeded.
    pub fn new(arena: &'a CharArena) -> Self {
        Self {
            arena,
            namespaces: NamespaceTable::new(),
            aliases: AliasTable::new(),
            nodes: NodeStore::new(),
            refs: ReferenceStore::new(),
            hierarchy: HierarchicalSet::new(),
            pending_ref_type: Vec::new(),
        }
    }

    /// `newNamespace()`: begin a namespace declaration, returning its
    /// file-local index.
    pub fn new_namespace(&mut self) -> u16 {
        self.namespaces.new_namespace()
    }

    /// `newNamespaceFinish(uri)`: resolve the declared URI to a server-global
    /// index through the host's `resolver`.
    pub fn new_namespace_finish(&mut self, file_idx: u16, uri: &str, resolver: &mut impl NamespaceResolver) {
        trace!("namespace {file_idx} resolved from uri {uri}");
        self.namespaces.new_namespace_finish(file_idx, uri, resolver);
    }

    /// `newAlias(attrs)`: capture an alias name immediately; its target text
    /// arrives later as character data.
    pub fn new_alias(&mut self, name: &str) -> AliasHandle {
        let name = self.arena.alloc_str(name);
        self.aliases.new_alias(name)
    }

    /// `newAliasFinish(alias, idText)`: resolve the alias's target `NodeId`.
    pub fn new_alias_finish(&mut self, handle: AliasHandle, id_text: &str) -> Result<(), BuilderError> {
        let id_text = self.arena.alloc_str(id_text);
        self.aliases.new_alias_finish(self.arena, handle, id_text)
    }

    /// `newNode(class, attrs)`: allocate a class-appropriate node record,
    /// translate its namespace-bearing fields to server-global indices, and
    /// store it.
    pub fn new_node(&mut self, class: NodeClass, attrs: Attributes<'a>) -> Result<NodeHandle, BuilderError> {
        let mut node = node::build_node::<V>(self.arena, &self.aliases, class, attrs)?;
        node.base.id = self.namespaces.translate(node.base.id);
        node.base.browse_name = self.namespaces.translate_browse_name(node.base.browse_name);
        self.translate_kind(&mut node.kind);
        debug!("new {} node {}", class.name(), node.base.id);
        Ok(self.nodes.insert(node))
    }

    fn translate_kind(&self, kind: &mut NodeKind<'a, V>) {
        match kind {
            NodeKind::Object { parent_node_id, .. } | NodeKind::Method { parent_node_id, .. } => {
                *parent_node_id = parent_node_id.map(|id| self.namespaces.translate(id));
            }
            NodeKind::VariableType { data_type, .. } => {
                *data_type = self.namespaces.translate(*data_type);
            }
            NodeKind::Variable { parent_node_id, data_type, .. } => {
                *parent_node_id = parent_node_id.map(|id| self.namespaces.translate(id));
                *data_type = self.namespaces.translate(*data_type);
            }
            NodeKind::ReferenceType { .. } | NodeKind::DataType | NodeKind::ObjectType { .. } => {}
        }
    }

    /// `newNodeFinish(node)`: hand the node to the sorter (it is already
    /// stored) and, if it is a `ReferenceType`, run the hierarchical-subtype
    /// promotion scan.
    pub fn new_node_finish(&mut self, handle: NodeHandle) {
        if handle.class() != NodeClass::ReferenceType {
            return;
        }
        let node = self.nodes.get(handle);
        let id = node.base.id;
        let hierarchical_refs = node.base.hierarchical_refs.clone();
        self.hierarchy.promote_if_subtype_of_hierarchical(id, &hierarchical_refs, &self.refs);
    }

    /// `newReference(node, attrs)`: read `IsForward` (default `true`),
    /// resolve `ReferenceType` through the alias table, classify it, and
    /// append it to the owning node's matching list.
    ///
    /// If `ReferenceType` names an alias not yet declared, resolution and
    /// classification are deferred to [`Self::get_sorted_nodes`] instead of
    /// failing outright: real NodeSet2 files always declare `<Aliases>`
    /// before `<References>`, but nothing enforces that ordering here.
    pub fn new_reference(&mut self, owner: NodeHandle, attrs: Attributes<'a>) -> Result<ReferenceHandle, BuilderError> {
        let ref_type_text = attrs
            .get("ReferenceType")
            .ok_or(BuilderError::MissingAttribute { attribute: "ReferenceType", node_class: "Reference" })?;
        let is_forward = match attrs.get("IsForward") {
            None => true,
            Some("true") => true,
            Some("false") => false,
            Some(text) => {
                return Err(BuilderError::InvalidBoolean { attribute: "IsForward", text: text.to_owned() });
            }
        };

        match self.aliases.resolve(self.arena, ref_type_text) {
            Ok(ref_type) => {
                let ref_type = self.namespaces.translate(ref_type);
                let classification = self.hierarchy.classify(&ref_type);
                let handle = self.refs.insert(ref_type_text, Some(ref_type), is_forward, owner);
                self.classify_into_owner_list(owner, handle, classification);
                Ok(handle)
            }
            Err(_) => {
                let handle = self.refs.insert(ref_type_text, None, is_forward, owner);
                trace!("reference type `{ref_type_text}` unresolved at creation, deferring to finalize");
                self.pending_ref_type.push(handle);
                Ok(handle)
            }
        }
    }

    fn classify_into_owner_list(&mut self, owner: NodeHandle, handle: ReferenceHandle, classification: Classification) {
        let node = self.nodes.get_mut(owner);
        match classification {
            Classification::Hierarchical => node.base.hierarchical_refs.push(handle),
            Classification::NonHierarchical => node.base.non_hierarchical_refs.push(handle),
        }
    }

    /// Retry alias resolution for every reference left pending by
    /// [`Self::new_reference`], now that every `<Aliases>` entry has
    /// necessarily been seen. Called once, automatically, by
    /// [`Self::get_sorted_nodes`].
    fn finalize_pending_references(&mut self) {
        for handle in std::mem::take(&mut self.pending_ref_type) {
            let text = self.refs.get(handle).ref_type_text;
            match self.aliases.resolve(self.arena, text) {
                Ok(ref_type) => {
                    let ref_type = self.namespaces.translate(ref_type);
                    self.refs.set_ref_type(handle, ref_type);
                    let classification = self.hierarchy.classify(&ref_type);
                    let owner = self.refs.get(handle).owner;
                    self.classify_into_owner_list(owner, handle, classification);
                }
                Err(err) => {
                    warn!("reference type `{text}` still unresolved at finalize, dropping from emission order: {err}");
                }
            }
        }
    }

    /// `newReferenceFinish(ref, targetText)`: resolve the target `NodeId`.
    pub fn new_reference_finish(&mut self, handle: ReferenceHandle, target_text: &str) -> Result<(), BuilderError> {
        let target = self.aliases.resolve(self.arena, target_text)?;
        let target = self.namespaces.translate(target);
        self.refs.set_target(handle, target);
        Ok(())
    }

    /// `getSortedNodes(consumer, valueInterface)`: compute the emission
    /// order, then hand each node to `consumer` in that order. For every
    /// `Variable` that carries a value, `value_interface.delete_value` is
    /// invoked immediately after the node is delivered, bounding peak memory
    /// rather than waiting for the whole load to finish.
    ///
    /// Returns `false` on a sort failure (a cycle, or a node that never
    /// resolved a locally-known parent) instead of panicking or emitting a
    /// partial stream.
    pub fn get_sorted_nodes(
        &mut self,
        mut consumer: impl FnMut(&crate::node::Node<'a, V>),
        value_interface: &mut impl ValueInterface<V>,
    ) -> bool {
        self.finalize_pending_references();
        let order = {
            let sorter = crate::sort::Sorter::new(&self.nodes, &self.refs, &self.hierarchy);
            sorter.sort()
        };
        let order = match order {
            Ok(order) => order,
            Err(err) => {
                warn!("sort failed: {err}");
                return false;
            }
        };

        for handle in order {
            consumer(self.nodes.get(handle));
            if let NodeKind::Variable { value, .. } = &mut self.nodes.get_mut(handle).kind {
                if let Some(value) = value.take() {
                    value_interface.delete_value(value);
                }
            }
        }
        true
    }

    /// `cleanup()`: release every node, reference, alias, and namespace
    /// record. Explicit for parity with the source API; ordinary `Drop`
    /// glue already does this once the builder goes out of scope. The arena
    /// itself is the caller's to drop, since the builder only borrows it.
    pub fn cleanup(self) {
        drop(self);
    }

    /// Directly attach a value to a previously stored `Variable` node. Modeled
    /// as ordinary assignment rather than a callback, since `V` is already in
    /// the caller's hands at the point a value is decoded.
    pub fn set_variable_value(&mut self, handle: NodeHandle, value: V) {
        if let NodeKind::Variable { value: slot, .. } = &mut self.nodes.get_mut(handle).kind {
            *slot = Some(value);
        }
    }

    /// Total number of nodes stored so far, across all seven classes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Look up a previously stored node by its already server-global-resolved
    /// `NodeId`. Exposed for tests and for hosts validating cross-references
    /// before emission.
    pub fn find_node(&self, id: &NodeId<'a>) -> Option<NodeHandle> {
        self.nodes.find(id)
    }
}
