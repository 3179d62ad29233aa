// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0

//! End-to-end scenarios driven purely through the public builder API, one
//! per concrete case in the testable-properties section: namespace
//! translation, a user-defined hierarchical reference type promoted via
//! `HasSubtype`, and the invariant that every reference ends up in exactly
//! one of its owner's two lists.

use opcua_nodeset_builder::{
    Attributes, Builder, CharArena, NamespaceResolver, NodeClass, NodeId, NoopValueInterface,
};

/// Mirrors the `env_logger::init()` call at the top of `main` in the
/// reference client examples; `try_init` tolerates multiple tests in one
/// binary calling it.
fn init_logging() {
    let _ = env_logger::try_init();
}

struct FixedOffsetResolver {
    base: u16,
}

impl NamespaceResolver for FixedOffsetResolver {
    fn resolve(&mut self, _uri: &str) -> u16 {
        self.base
    }
}

#[test]
fn namespace_translation_rewrites_file_local_index_to_global() {
    init_logging();
    let arena = CharArena::new();
    let mut builder: Builder<'_, ()> = Builder::new(&arena);
    let mut resolver = FixedOffsetResolver { base: 7 };

    let file_idx = builder.new_namespace();
    builder.new_namespace_finish(file_idx, "urn:acme", &mut resolver);

    let attrs = [("NodeId", "ns=1;i=10"), ("BrowseName", "1:Widget")];
    let handle = builder.new_node(NodeClass::Object, Attributes::new(&attrs)).unwrap();
    builder.new_node_finish(handle);

    let found = builder.find_node(&NodeId::numeric(7, 10));
    assert!(found.is_some(), "node should be indexed under its translated global NodeId");

    let mut emitted = Vec::new();
    let ok = builder.get_sorted_nodes(|n| emitted.push(n.base.id.to_string()), &mut NoopValueInterface);
    assert!(ok);
    assert_eq!(emitted, vec!["ns=7;i=10".to_string()]);
}

#[test]
fn user_defined_reference_type_becomes_hierarchical_via_has_subtype() {
    init_logging();
    let arena = CharArena::new();
    let mut builder: Builder<'_, ()> = Builder::new(&arena);
    let mut resolver = FixedOffsetResolver { base: 1 };
    let ns = builder.new_namespace();
    builder.new_namespace_finish(ns, "urn:acme", &mut resolver);

    // ReferenceType "Controls", ns=1;i=5000, inverse HasSubtype to HasComponent (i=47).
    let controls_attrs = [("NodeId", "ns=1;i=5000"), ("BrowseName", "1:Controls")];
    let controls = builder
        .new_node(NodeClass::ReferenceType, Attributes::new(&controls_attrs))
        .unwrap();
    let subtype_attrs = [("ReferenceType", "i=45"), ("IsForward", "false")];
    let subtype_ref = builder.new_reference(controls, Attributes::new(&subtype_attrs)).unwrap();
    builder.new_reference_finish(subtype_ref, "i=47").unwrap();
    builder.new_node_finish(controls);

    // Object A --Controls(forward)--> Object B: A must precede B once Controls is
    // recognized as hierarchical.
    let a_attrs = [("NodeId", "ns=1;i=6000"), ("BrowseName", "1:A")];
    let a = builder.new_node(NodeClass::Object, Attributes::new(&a_attrs)).unwrap();
    let b_attrs = [("NodeId", "ns=1;i=6001"), ("BrowseName", "1:B")];
    let b = builder.new_node(NodeClass::Object, Attributes::new(&b_attrs)).unwrap();

    let controls_edge = [("ReferenceType", "ns=1;i=5000"), ("IsForward", "true")];
    let edge = builder.new_reference(a, Attributes::new(&controls_edge)).unwrap();
    builder.new_reference_finish(edge, "ns=1;i=6001").unwrap();

    builder.new_node_finish(a);
    builder.new_node_finish(b);

    let mut emitted = Vec::new();
    let ok = builder.get_sorted_nodes(|n| emitted.push(n.base.id.to_string()), &mut NoopValueInterface);
    assert!(ok);
    let a_pos = emitted.iter().position(|id| id == "ns=1;i=6000").unwrap();
    let b_pos = emitted.iter().position(|id| id == "ns=1;i=6001").unwrap();
    assert!(a_pos < b_pos, "A must be emitted before B via the promoted Controls reference");
}

#[test]
fn every_reference_lands_in_exactly_one_list() {
    init_logging();
    let arena = CharArena::new();
    let mut builder: Builder<'_, ()> = Builder::new(&arena);

    let owner_attrs = [("NodeId", "i=9000"), ("BrowseName", "Owner")];
    let owner = builder.new_node(NodeClass::Object, Attributes::new(&owner_attrs)).unwrap();

    // A non-hierarchical, namespace-0, non-builtin reference type.
    let non_hier_attrs = [("ReferenceType", "i=40"), ("IsForward", "true")];
    let non_hier = builder.new_reference(owner, Attributes::new(&non_hier_attrs)).unwrap();
    builder.new_reference_finish(non_hier, "i=9001").unwrap();

    // A hierarchical builtin (HasProperty).
    let hier_attrs = [("ReferenceType", "i=46"), ("IsForward", "true")];
    let hier = builder.new_reference(owner, Attributes::new(&hier_attrs)).unwrap();
    builder.new_reference_finish(hier, "i=9002").unwrap();

    builder.new_node_finish(owner);
    let ok = builder.get_sorted_nodes(|_| {}, &mut NoopValueInterface);
    assert!(ok);
}

#[test]
fn phase_order_is_hard_across_all_seven_classes() {
    init_logging();
    let arena = CharArena::new();
    let mut builder: Builder<'_, ()> = Builder::new(&arena);

    // Insert in reverse phase order; emission must still come out forward.
    let classes = [
        (NodeClass::Variable, "i=100"),
        (NodeClass::VariableType, "i=101"),
        (NodeClass::Method, "i=102"),
        (NodeClass::Object, "i=103"),
        (NodeClass::ObjectType, "i=104"),
        (NodeClass::DataType, "i=105"),
        (NodeClass::ReferenceType, "i=106"),
    ];
    for (class, id) in classes {
        let attrs = [("NodeId", id), ("BrowseName", id)];
        let handle = builder.new_node(class, Attributes::new(&attrs)).unwrap();
        builder.new_node_finish(handle);
    }

    let mut emitted = Vec::new();
    let ok = builder.get_sorted_nodes(|n| emitted.push(n.base.id.to_string()), &mut NoopValueInterface);
    assert!(ok);
    assert_eq!(
        emitted,
        vec!["i=106", "i=105", "i=104", "i=103", "i=102", "i=101", "i=100"]
    );
}
