// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0

//! Node classes and records: seven class-indexed collections of typed node
//! records sharing a common base.

use hashbrown::HashMap;

use crate::error::BuilderError;
use crate::ids::{parse_node_id, BrowseName, NodeId};
use crate::reference::ReferenceHandle;

/// The seven node classes a NodeSet file can declare. Order matches the hard
/// emission phase order; `View` is deliberately absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeClass {
    ReferenceType,
    DataType,
    ObjectType,
    Object,
    Method,
    VariableType,
    Variable,
}

impl NodeClass {
    /// All seven variants, in emission-phase order.
    pub const ALL: [NodeClass; 7] = [
        NodeClass::ReferenceType,
        NodeClass::DataType,
        NodeClass::ObjectType,
        NodeClass::Object,
        NodeClass::Method,
        NodeClass::VariableType,
        NodeClass::Variable,
    ];

    /// Position in the hard phase order; lower sorts first.
    pub fn phase(self) -> usize {
        self as usize
    }

    /// Stable name, used in diagnostics only.
    pub fn name(self) -> &'static str {
        match self {
            NodeClass::ReferenceType => "ReferenceType",
            NodeClass::DataType => "DataType",
            NodeClass::ObjectType => "ObjectType",
            NodeClass::Object => "Object",
            NodeClass::Method => "Method",
            NodeClass::VariableType => "VariableType",
            NodeClass::Variable => "Variable",
        }
    }
}

/// Opaque reference to a stored node: its class plus its index within that
/// class's collection. Stable for the lifetime of the builder; an ID-keyed
/// lookup standing in for a borrowed pointer so node records never form
/// reference cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeHandle {
    pub(crate) class: NodeClass,
    pub(crate) index: u32,
}

impl NodeHandle {
    /// The class this handle was allocated in.
    pub fn class(&self) -> NodeClass {
        self.class
    }
}

/// Attributes common to every node class, regardless of its kind.
#[derive(Debug)]
pub struct NodeBase<'a> {
    pub id: NodeId<'a>,
    pub browse_name: BrowseName<'a>,
    pub display_name: &'a str,
    pub description: &'a str,
    pub write_mask: u32,
    /// References classified hierarchical at creation time, owned by the
    /// reference store; this node holds only handles.
    pub hierarchical_refs: Vec<ReferenceHandle>,
    /// References classified non-hierarchical at creation time.
    pub non_hierarchical_refs: Vec<ReferenceHandle>,
}

impl<'a> NodeBase<'a> {
    fn new(id: NodeId<'a>, browse_name: BrowseName<'a>) -> Self {
        Self {
            id,
            browse_name,
            display_name: "",
            description: "",
            write_mask: 0,
            hierarchical_refs: Vec::new(),
            non_hierarchical_refs: Vec::new(),
        }
    }
}

/// Class-specific fields, one variant per [`NodeClass`]. `V` is the host's
/// opaque variable-value type (see [`crate::value::ValueInterface`]).
#[derive(Debug)]
pub enum NodeKind<'a, V> {
    ReferenceType {
        symmetric: bool,
    },
    DataType,
    ObjectType {
        is_abstract: bool,
    },
    Object {
        parent_node_id: Option<NodeId<'a>>,
        event_notifier: u8,
    },
    Method {
        parent_node_id: Option<NodeId<'a>>,
        executable: bool,
        user_executable: bool,
    },
    VariableType {
        data_type: NodeId<'a>,
        value_rank: i32,
        array_dimensions: &'a str,
        is_abstract: bool,
    },
    Variable {
        parent_node_id: Option<NodeId<'a>>,
        data_type: NodeId<'a>,
        value_rank: i32,
        array_dimensions: &'a str,
        access_level: u8,
        user_access_level: u8,
        value: Option<V>,
    },
}

impl<'a, V> NodeKind<'a, V> {
    /// The [`NodeClass`] this variant belongs to.
    pub fn class(&self) -> NodeClass {
        match self {
            NodeKind::ReferenceType { .. } => NodeClass::ReferenceType,
            NodeKind::DataType => NodeClass::DataType,
            NodeKind::ObjectType { .. } => NodeClass::ObjectType,
            NodeKind::Object { .. } => NodeClass::Object,
            NodeKind::Method { .. } => NodeClass::Method,
            NodeKind::VariableType { .. } => NodeClass::VariableType,
            NodeKind::Variable { .. } => NodeClass::Variable,
        }
    }
}

/// A fully materialized node record.
#[derive(Debug)]
pub struct Node<'a, V> {
    pub base: NodeBase<'a>,
    pub kind: NodeKind<'a, V>,
}

impl<'a, V> Node<'a, V> {
    pub fn class(&self) -> NodeClass {
        self.kind.class()
    }
}

/// Flat `(name, value)` attribute list as handed to `newNode`/`newReference`,
/// already copied into the arena by the builder façade: the builder does not
/// retain caller-owned pointers.
#[derive(Debug, Clone, Copy)]
pub struct Attributes<'a> {
    pairs: &'a [(&'a str, &'a str)],
}

impl<'a> Attributes<'a> {
    pub fn new(pairs: &'a [(&'a str, &'a str)]) -> Self {
        Self { pairs }
    }

    pub fn get(&self, name: &str) -> Option<&'a str> {
        self.pairs
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| *v)
    }

    fn required(&self, name: &'static str, node_class: &'static str) -> Result<&'a str, BuilderError> {
        self.get(name)
            .ok_or(BuilderError::MissingAttribute { attribute: name, node_class })
    }

    fn bool_or(&self, name: &'static str, default: bool) -> Result<bool, BuilderError> {
        match self.get(name) {
            None => Ok(default),
            Some("true") => Ok(true),
            Some("false") => Ok(false),
            Some(text) => Err(BuilderError::InvalidBoolean { attribute: name, text: text.to_owned() }),
        }
    }

    fn u8_or(&self, name: &'static str, default: u8) -> u8 {
        self.get(name).and_then(|v| v.parse().ok()).unwrap_or(default)
    }

    fn i32_or(&self, name: &'static str, default: i32) -> i32 {
        self.get(name).and_then(|v| v.parse().ok()).unwrap_or(default)
    }

    fn str_or(&self, name: &str, default: &'a str) -> &'a str {
        self.get(name).unwrap_or(default)
    }
}

/// `DataType` default, `i=24` (BaseDataType).
pub const DEFAULT_DATA_TYPE: NodeId<'static> = NodeId::numeric(0, 24);

fn common_base<'a>(
    arena: &'a crate::arena::CharArena,
    attrs: Attributes<'a>,
    node_class: &'static str,
) -> Result<NodeBase<'a>, BuilderError> {
    let id_text = attrs.required("NodeId", node_class)?;
    let browse_name_text = attrs.required("BrowseName", node_class)?;
    let id = parse_node_id(arena, id_text)?;
    let browse_name = crate::ids::parse_browse_name(browse_name_text)?;
    let mut base = NodeBase::new(id, browse_name);
    base.display_name = attrs.str_or("DisplayName", "");
    base.description = attrs.str_or("Description", "");
    base.write_mask = attrs.get("WriteMask").and_then(|v| v.parse().ok()).unwrap_or(0);
    Ok(base)
}

/// Build a class-appropriate node record from attribute text. The `arena`
/// parameter backs every parsed id; `aliases` resolves `DataType`
/// the same way a reference's `ReferenceType` is resolved, since NodeSet2
/// files commonly spell it as an alias name (e.g. `DataType="Boolean"`)
/// rather than a literal `NodeId`. `ParentNodeId` deliberately does not go
/// through the alias table: the source never resolves it through
/// `alias2Id`, only through the plain NodeId grammar.
pub fn build_node<'a, V>(
    arena: &'a crate::arena::CharArena,
    aliases: &crate::alias::AliasTable<'a>,
    class: NodeClass,
    attrs: Attributes<'a>,
) -> Result<Node<'a, V>, BuilderError> {
    let node_class = class.name();
    let base = common_base(arena, attrs, node_class)?;
    let kind = match class {
        NodeClass::ReferenceType => NodeKind::ReferenceType {
            symmetric: attrs.bool_or("Symmetric", false)?,
        },
        NodeClass::DataType => NodeKind::DataType,
        NodeClass::ObjectType => NodeKind::ObjectType {
            is_abstract: attrs.bool_or("IsAbstract", false)?,
        },
        NodeClass::Object => NodeKind::Object {
            parent_node_id: optional_node_id(arena, attrs, "ParentNodeId")?,
            event_notifier: attrs.u8_or("EventNotifier", 0),
        },
        NodeClass::Method => NodeKind::Method {
            parent_node_id: optional_node_id(arena, attrs, "ParentNodeId")?,
            executable: attrs.bool_or("Executable", true)?,
            user_executable: attrs.bool_or("UserExecutable", true)?,
        },
        NodeClass::VariableType => NodeKind::VariableType {
            data_type: data_type_or_default(arena, aliases, attrs)?,
            value_rank: attrs.i32_or("ValueRank", -1),
            array_dimensions: attrs.str_or("ArrayDimensions", ""),
            is_abstract: attrs.bool_or("IsAbstract", false)?,
        },
        NodeClass::Variable => NodeKind::Variable {
            parent_node_id: optional_node_id(arena, attrs, "ParentNodeId")?,
            data_type: data_type_or_default(arena, aliases, attrs)?,
            value_rank: attrs.i32_or("ValueRank", -1),
            array_dimensions: attrs.str_or("ArrayDimensions", ""),
            access_level: attrs.u8_or("AccessLevel", 1),
            user_access_level: attrs.u8_or("UserAccessLevel", 1),
            value: None,
        },
    };
    Ok(Node { base, kind })
}

fn optional_node_id<'a>(
    arena: &'a crate::arena::CharArena,
    attrs: Attributes<'a>,
    name: &str,
) -> Result<Option<NodeId<'a>>, BuilderError> {
    match attrs.get(name) {
        Some(text) => Ok(Some(parse_node_id(arena, text)?)),
        None => Ok(None),
    }
}

fn data_type_or_default<'a>(
    arena: &'a crate::arena::CharArena,
    aliases: &crate::alias::AliasTable<'a>,
    attrs: Attributes<'a>,
) -> Result<NodeId<'a>, BuilderError> {
    match attrs.get("DataType") {
        Some(text) => aliases.resolve(arena, text),
        None => Ok(DEFAULT_DATA_TYPE),
    }
}

/// Seven class-indexed collections plus a NodeId -> handle index for
/// resolving reference targets and parents.
pub struct NodeStore<'a, V> {
    by_class: [Vec<Node<'a, V>>; 7],
    index: HashMap<NodeId<'a>, NodeHandle>,
}

impl<'a, V> Default for NodeStore<'a, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, V> NodeStore<'a, V> {
    pub fn new() -> Self {
        Self {
            by_class: [
                Vec::new(),
                Vec::new(),
                Vec::new(),
                Vec::new(),
                Vec::new(),
                Vec::new(),
                Vec::new(),
            ],
            index: HashMap::new(),
        }
    }

    /// Store `node`, indexing it by its (already namespace-translated) id.
    pub fn insert(&mut self, node: Node<'a, V>) -> NodeHandle {
        let class = node.class();
        let slot = &mut self.by_class[class.phase()];
        let index = slot.len() as u32;
        let id = node.base.id;
        slot.push(node);
        let handle = NodeHandle { class, index };
        self.index.insert(id, handle);
        handle
    }

    pub fn get(&self, handle: NodeHandle) -> &Node<'a, V> {
        &self.by_class[handle.class.phase()][handle.index as usize]
    }

    pub fn get_mut(&mut self, handle: NodeHandle) -> &mut Node<'a, V> {
        &mut self.by_class[handle.class.phase()][handle.index as usize]
    }

    /// Find a previously inserted node by its server-global `NodeId`, if any
    /// was parsed in this load.
    pub fn find(&self, id: &NodeId<'a>) -> Option<NodeHandle> {
        self.index.get(id).copied()
    }

    pub fn class_slice(&self, class: NodeClass) -> &[Node<'a, V>] {
        &self.by_class[class.phase()]
    }

    pub fn len(&self) -> usize {
        self.by_class.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Test-only helpers for constructing a [`NodeHandle`] without going through
/// a [`NodeStore`], used by other modules' unit tests that only need a
/// plausible owner handle.
#[cfg(test)]
pub(crate) mod test_support {
    use super::{NodeClass, NodeHandle};

    pub(crate) fn handle(class: NodeClass, index: u32) -> NodeHandle {
        NodeHandle { class, index }
    }
}
