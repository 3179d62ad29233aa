// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0

//! The growing set `H` of reference-type `NodeId`s known to be hierarchical,
//! and the classification rules that consult and extend it.

use hashbrown::HashSet;

use crate::ids::NodeId;
use crate::reference::{Reference, ReferenceStore};

/// `HasSubtype`, used both as a seed member and to recognize promotion edges.
pub const HAS_SUBTYPE: NodeId<'static> = NodeId::numeric(0, 45);

/// The eight built-in hierarchical reference types, using the canonical
/// `i=38` for `HasEncoding` rather than the source's `i=47`, which collides
/// with `HasComponent`.
pub const BUILTIN_HIERARCHICAL: [NodeId<'static>; 8] = [
    NodeId::numeric(0, 35), // Organizes
    NodeId::numeric(0, 36), // HasEventSource
    NodeId::numeric(0, 48), // HasNotifier
    NodeId::numeric(0, 44), // Aggregates
    NodeId::numeric(0, 45), // HasSubtype
    NodeId::numeric(0, 47), // HasComponent
    NodeId::numeric(0, 46), // HasProperty
    NodeId::numeric(0, 38), // HasEncoding
];

/// Outcome of classifying a reference at creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Hierarchical,
    NonHierarchical,
}

/// The mutable, monotonically-growing set of hierarchical reference-type ids,
/// plus the set of reference-type ids known to have been parsed at all (used
/// to distinguish "non-namespace-0, not yet parsed" from "parsed and
/// confirmed non-hierarchical").
pub struct HierarchicalSet<'a> {
    hierarchical: HashSet<NodeId<'a>>,
    known_reference_types: HashSet<NodeId<'a>>,
}

impl<'a> Default for HierarchicalSet<'a> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> HierarchicalSet<'a> {
    /// Seeded with the eight built-ins.
    pub fn new() -> Self {
        let mut hierarchical = HashSet::new();
        let mut known_reference_types = HashSet::new();
        for id in BUILTIN_HIERARCHICAL {
            hierarchical.insert(id);
            known_reference_types.insert(id);
        }
        Self {
            hierarchical,
            known_reference_types,
        }
    }

    /// Record that `id` names a `ReferenceType` node that has been parsed,
    /// regardless of whether it turned out to be hierarchical.
    pub fn record_known_reference_type(&mut self, id: NodeId<'a>) {
        self.known_reference_types.insert(id);
    }

    pub fn is_hierarchical(&self, id: &NodeId<'a>) -> bool {
        self.hierarchical.contains(id)
    }

    fn is_known_reference_type(&self, id: &NodeId<'a>) -> bool {
        id.ns_idx == 0 || self.known_reference_types.contains(id)
    }

    /// Classify a reference at creation time:
    /// - a known-hierarchical `refType` is hierarchical;
    /// - an unresolved user-defined (non-zero namespace) `refType` is
    ///   conservatively hierarchical, since it may later prove to subtype one;
    /// - a namespace-0 `refType` not in `H` is non-hierarchical.
    pub fn classify(&self, ref_type: &NodeId<'a>) -> Classification {
        if self.is_hierarchical(ref_type) {
            Classification::Hierarchical
        } else if ref_type.ns_idx != 0 && !self.known_reference_types.contains(ref_type) {
            Classification::Hierarchical
        } else {
            Classification::NonHierarchical
        }
    }

    /// Promotion at `ReferenceType` node finish: `r.id` becomes hierarchical
    /// if any inverse reference in its hierarchical list targets an
    /// already-hierarchical type (an inverse `HasSubtype` edge to a
    /// hierarchical parent).
    pub fn promote_if_subtype_of_hierarchical(
        &mut self,
        reference_type_id: NodeId<'a>,
        hierarchical_refs: &[crate::reference::ReferenceHandle],
        refs: &ReferenceStore<'a>,
    ) {
        self.record_known_reference_type(reference_type_id);
        let becomes_hierarchical = hierarchical_refs.iter().any(|&handle| {
            let r: &Reference<'a> = refs.get(handle);
            !r.is_forward && r.target.map(|t| self.is_hierarchical(&t)).unwrap_or(false)
        });
        if becomes_hierarchical {
            self.hierarchical.insert(reference_type_id);
        }
    }

    /// Finalize-time reclassification: a reference conservatively marked
    /// hierarchical at creation because its type was unknown is demoted to
    /// non-hierarchical if, by now, its type is known (namespace 0, or a
    /// parsed `ReferenceType`) and still not in `H`. A reference already
    /// confirmed hierarchical is never demoted.
    pub fn reclassify_at_finalize(&self, ref_type: &NodeId<'a>) -> Classification {
        if self.is_hierarchical(ref_type) {
            Classification::Hierarchical
        } else if self.is_known_reference_type(ref_type) {
            Classification::NonHierarchical
        } else {
            // Still never parsed as a ReferenceType by finalize: keep the
            // creation-time conservative classification.
            Classification::Hierarchical
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_are_seeded_hierarchical() {
        let set = HierarchicalSet::new();
        assert!(set.is_hierarchical(&NodeId::numeric(0, 47))); // HasComponent
        assert!(set.is_hierarchical(&NodeId::numeric(0, 38))); // HasEncoding, canonical id
        assert!(!set.is_hierarchical(&NodeId::numeric(0, 40))); // arbitrary non-member
    }

    #[test]
    fn unknown_user_namespace_reftype_is_conservatively_hierarchical() {
        let set = HierarchicalSet::new();
        let unresolved = NodeId::numeric(1, 5000);
        assert_eq!(set.classify(&unresolved), Classification::Hierarchical);
    }

    #[test]
    fn known_namespace_zero_non_member_is_non_hierarchical() {
        let set = HierarchicalSet::new();
        let id = NodeId::numeric(0, 40);
        assert_eq!(set.classify(&id), Classification::NonHierarchical);
    }

    #[test]
    fn subtype_of_hierarchical_is_promoted() {
        let mut set = HierarchicalSet::new();
        let mut refs = ReferenceStore::new();
        let owner = crate::node::test_support::handle(crate::node::NodeClass::ReferenceType, 0);
        let subtype_edge = refs.insert("i=45", Some(HAS_SUBTYPE), false, owner);
        refs.set_target(subtype_edge, NodeId::numeric(0, 47));

        let new_type = NodeId::numeric(1, 5000);
        set.promote_if_subtype_of_hierarchical(new_type, &[subtype_edge], &refs);
        assert!(set.is_hierarchical(&new_type));
    }

    #[test]
    fn finalize_demotes_resolved_non_hierarchical_type() {
        let mut set = HierarchicalSet::new();
        let resolved_non_hierarchical = NodeId::numeric(1, 9000);
        set.record_known_reference_type(resolved_non_hierarchical);
        assert_eq!(
            set.reclassify_at_finalize(&resolved_non_hierarchical),
            Classification::NonHierarchical
        );
    }

    #[test]
    fn finalize_keeps_still_unknown_type_conservatively_hierarchical() {
        let set = HierarchicalSet::new();
        let never_parsed = NodeId::numeric(2, 1);
        assert_eq!(
            set.reclassify_at_finalize(&never_parsed),
            Classification::Hierarchical
        );
    }
}
