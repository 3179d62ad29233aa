// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0

//! A single emission order honoring the hard class-phase order and
//! parent-before-child across hierarchical references.

use std::collections::VecDeque;

use hashbrown::HashMap;

use crate::error::SortError;
use crate::hierarchy::{Classification, HierarchicalSet};
use crate::node::{NodeClass, NodeHandle, NodeStore};
use crate::reference::ReferenceStore;

/// Produce the emission order for one load.
///
/// Finalizes `hierarchy` classification first: every reference physically
/// stored in a node's hierarchical list is re-checked,
/// and only those still hierarchical after reclassification contribute sort
/// edges. Only edges between two nodes resolved within this load contribute;
/// a reference to a node outside the file (a standard type never declared
/// here) can neither block nor order the sort.
pub struct Sorter<'s, 'a, V> {
    nodes: &'s NodeStore<'a, V>,
    refs: &'s ReferenceStore<'a>,
    hierarchy: &'s HierarchicalSet<'a>,
}

impl<'s, 'a, V> Sorter<'s, 'a, V> {
    pub fn new(nodes: &'s NodeStore<'a, V>, refs: &'s ReferenceStore<'a>, hierarchy: &'s HierarchicalSet<'a>) -> Self {
        Self { nodes, refs, hierarchy }
    }

    /// Compute the emission order, or the first phase whose nodes could not
    /// all be ordered.
    pub fn sort(&self) -> Result<Vec<NodeHandle>, SortError> {
        let mut in_degree: HashMap<NodeHandle, u32> = HashMap::new();
        let mut outgoing: HashMap<NodeHandle, Vec<NodeHandle>> = HashMap::new();

        for class in NodeClass::ALL {
            for (index, node) in self.nodes.class_slice(class).iter().enumerate() {
                let owner = NodeHandle { class, index: index as u32 };
                in_degree.entry(owner).or_insert(0);
                for &handle in &node.base.hierarchical_refs {
                    let r = self.refs.get(handle);
                    let Some(ref_type) = r.ref_type else { continue };
                    if self.hierarchy.reclassify_at_finalize(&ref_type) != Classification::Hierarchical {
                        continue;
                    }
                    let Some(target) = r.target else { continue };
                    let Some(target_handle) = self.nodes.find(&target) else { continue };

                    let (parent, child) = if r.is_forward {
                        (owner, target_handle)
                    } else {
                        (target_handle, owner)
                    };
                    outgoing.entry(parent).or_default().push(child);
                    *in_degree.entry(child).or_insert(0) += 1;
                }
            }
        }

        let mut order = Vec::with_capacity(self.nodes.len());
        for class in NodeClass::ALL {
            let phase_len = self.nodes.class_slice(class).len();
            let mut queue: VecDeque<NodeHandle> = (0..phase_len as u32)
                .map(|index| NodeHandle { class, index })
                .filter(|h| in_degree[h] == 0)
                .collect();
            let mut emitted_in_phase = 0usize;

            while let Some(handle) = queue.pop_front() {
                order.push(handle);
                emitted_in_phase += 1;
                if let Some(children) = outgoing.get(&handle) {
                    for &child in children {
                        let degree = in_degree.get_mut(&child).expect("every node has an in-degree entry");
                        *degree -= 1;
                        if *degree == 0 && child.class() == handle.class() {
                            queue.push_back(child);
                        }
                    }
                }
            }

            if emitted_in_phase != phase_len {
                let remaining = phase_len - emitted_in_phase;
                let first_unresolved = (0..phase_len as u32)
                    .map(|index| NodeHandle { class, index })
                    .find(|h| in_degree[h] != 0)
                    .map(|h| self.nodes.get(h).base.id.to_string())
                    .unwrap_or_default();
                return Err(SortError::CycleOrMissingParent {
                    phase: class.name(),
                    remaining,
                    first_unresolved,
                });
            }

            // Cross-phase edges into later phases were already decremented
            // above as their sources were emitted; nodes in the next phase
            // that are already at in-degree 0 are picked up when its queue is
            // built on the next loop iteration.
        }

        Ok(order)
    }
}
