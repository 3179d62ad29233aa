// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0

//! `NodeId` and `BrowseName`: the two namespace-qualified identifiers a NodeSet
//! file uses throughout. Both are parsed from arena-owned text and keep borrowing
//! from it rather than allocating their own storage (see [`crate::arena`]).

use std::fmt;

use base64::{engine::general_purpose::STANDARD, Engine};
use regex::Regex;
use std::sync::OnceLock;
use uuid::Uuid;

use crate::arena::CharArena;
use crate::error::BuilderError;

/// The identifier half of a [`NodeId`]: one of the four OPC UA identifier forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeIdValue<'a> {
    /// `i=<u32>`
    Numeric(u32),
    /// `s=<string>`, arena-owned.
    String(&'a str),
    /// `g=<guid>`
    Guid(Uuid),
    /// `b=<base64>`, decoded and arena-owned.
    ByteString(&'a [u8]),
}

impl fmt::Display for NodeIdValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeIdValue::Numeric(v) => write!(f, "i={v}"),
            NodeIdValue::String(v) => write!(f, "s={v}"),
            NodeIdValue::Guid(v) => write!(f, "g={v}"),
            NodeIdValue::ByteString(v) => write!(f, "b={}", STANDARD.encode(v)),
        }
    }
}

/// A namespace-qualified node identifier. Equality is by both fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId<'a> {
    /// Namespace index. Always server-global once a node or reference has been
    /// through [`crate::namespace::NamespaceTable::translate`].
    pub ns_idx: u16,
    /// The identifier itself.
    pub value: NodeIdValue<'a>,
}

impl fmt::Display for NodeId<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ns_idx != 0 {
            write!(f, "ns={};{}", self.ns_idx, self.value)
        } else {
            write!(f, "{}", self.value)
        }
    }
}

impl<'a> NodeId<'a> {
    /// Build a numeric node id directly, bypassing text parsing. Used for the
    /// built-in namespace-0 reference type ids and in tests.
    pub const fn numeric(ns_idx: u16, id: u32) -> NodeId<'static> {
        NodeId {
            ns_idx,
            value: NodeIdValue::Numeric(id),
        }
    }

    /// Reassign the namespace index, leaving the identifier untouched. Used by
    /// [`crate::namespace::NamespaceTable::translate`].
    pub fn with_ns_idx(mut self, ns_idx: u16) -> Self {
        self.ns_idx = ns_idx;
        self
    }
}

/// A namespace-qualified browse name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BrowseName<'a> {
    /// Namespace index, server-global once translated.
    pub ns_idx: u16,
    /// Arena-owned display text.
    pub name: &'a str,
}

impl<'a> BrowseName<'a> {
    /// Reassign the namespace index, leaving the name untouched.
    pub fn with_ns_idx(mut self, ns_idx: u16) -> Self {
        self.ns_idx = ns_idx;
        self
    }
}

fn node_id_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(?:ns=(?P<ns>[0-9]+);)?(?P<body>.+)$").unwrap())
}

fn browse_name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(?:(?P<ns>[0-9]+):)?(?P<name>.*)$").unwrap())
}

/// Parse the textual form of a `NodeId` (`"ns=<k>;i=..."`, `"i=..."`, ...).
///
/// `text` must already be arena-owned: the returned value borrows subslices of it
/// directly rather than copying, except for the `b=` (ByteString) form, whose
/// decoded bytes are freshly allocated in `arena`.
pub fn parse_node_id<'a>(arena: &'a CharArena, text: &'a str) -> Result<NodeId<'a>, BuilderError> {
    let caps = node_id_regex()
        .captures(text)
        .ok_or_else(|| invalid_node_id(text))?;
    let ns_idx = match caps.name("ns") {
        Some(m) => m.as_str().parse().map_err(|_| invalid_node_id(text))?,
        None => 0,
    };
    let body = caps.name("body").unwrap().as_str();
    let value = parse_identifier(arena, body).ok_or_else(|| invalid_node_id(text))?;
    Ok(NodeId { ns_idx, value })
}

fn parse_identifier<'a>(arena: &'a CharArena, body: &'a str) -> Option<NodeIdValue<'a>> {
    let (tag, rest) = body.split_once('=')?;
    match tag {
        "i" => rest.parse::<u32>().ok().map(NodeIdValue::Numeric),
        "s" => Some(NodeIdValue::String(rest)),
        "g" => Uuid::parse_str(rest).ok().map(NodeIdValue::Guid),
        "b" => {
            let decoded = STANDARD.decode(rest).ok()?;
            Some(NodeIdValue::ByteString(arena.alloc_bytes(&decoded)))
        }
        _ => None,
    }
}

fn invalid_node_id(text: &str) -> BuilderError {
    BuilderError::InvalidId {
        kind: "NodeId",
        text: text.to_owned(),
    }
}

/// Parse the textual form of a `BrowseName` (`"<k>:<name>"` or bare `"<name>"`).
pub fn parse_browse_name(text: &str) -> Result<BrowseName<'_>, BuilderError> {
    let caps = browse_name_regex().captures(text).ok_or_else(|| {
        BuilderError::InvalidId {
            kind: "BrowseName",
            text: text.to_owned(),
        }
    })?;
    let ns_idx = match caps.name("ns") {
        Some(m) => m.as_str().parse().unwrap_or(0),
        None => 0,
    };
    // SAFETY-free note: `name` borrows from `text`, whose lifetime is the caller's;
    // since BrowseName's lifetime parameter is tied to the input, this is a plain
    // subslice, not unsafe.
    let start = caps.name("name").map(|m| m.start()).unwrap_or(0);
    Ok(BrowseName {
        ns_idx,
        name: &text[start..],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_numeric_defaults_to_namespace_zero() {
        let arena = CharArena::new();
        let text = arena.alloc_str("i=85");
        let id = parse_node_id(&arena, text).unwrap();
        assert_eq!(id.ns_idx, 0);
        assert_eq!(id.value, NodeIdValue::Numeric(85));
    }

    #[test]
    fn namespaced_numeric() {
        let arena = CharArena::new();
        let text = arena.alloc_str("ns=1;i=1000");
        let id = parse_node_id(&arena, text).unwrap();
        assert_eq!(id.ns_idx, 1);
        assert_eq!(id.value, NodeIdValue::Numeric(1000));
    }

    #[test]
    fn string_identifier() {
        let arena = CharArena::new();
        let text = arena.alloc_str("ns=2;s=MyNode");
        let id = parse_node_id(&arena, text).unwrap();
        assert_eq!(id.value, NodeIdValue::String("MyNode"));
    }

    #[test]
    fn browse_name_with_namespace() {
        let bn = parse_browse_name("1:Temperature").unwrap();
        assert_eq!(bn.ns_idx, 1);
        assert_eq!(bn.name, "Temperature");
    }

    #[test]
    fn browse_name_bare() {
        let bn = parse_browse_name("Temperature").unwrap();
        assert_eq!(bn.ns_idx, 0);
        assert_eq!(bn.name, "Temperature");
    }

    #[test]
    fn malformed_node_id_is_rejected() {
        let arena = CharArena::new();
        let text = arena.alloc_str("not-a-node-id!!");
        // "not-a-node-id!!" has no '=' so parse_identifier returns None.
        assert!(parse_node_id(&arena, text).is_err());
    }
}
