// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0

//! Alias table: `<Aliases>` entries let a reference's `ReferenceType`
//! attribute name a symbolic alias (`"HasComponent"`) instead of a literal
//! `NodeId` text. Resolution falls back to parsing the text as a `NodeId`
//! whenever it is not a known alias name.

use hashbrown::HashMap;

use crate::arena::CharArena;
use crate::error::BuilderError;
use crate::ids::{parse_node_id, NodeId};

/// Handle returned by [`AliasTable::new_alias`], threaded back through
/// [`AliasTable::new_alias_finish`] once the alias's target text is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AliasHandle(usize);

/// Maps alias names declared by `<Aliases>` to the `NodeId` they stand for.
#[derive(Default)]
pub struct AliasTable<'a> {
    entries: Vec<(&'a str, Option<NodeId<'a>>)>,
    by_name: HashMap<&'a str, AliasHandle>,
}

impl<'a> AliasTable<'a> {
    /// An empty alias table.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            by_name: HashMap::new(),
        }
    }

    /// Begin a new alias declaration under `name` (the `Alias` element's
    /// `Alias` attribute). Its target is unresolved until
    /// [`Self::new_alias_finish`] supplies the character-data `NodeId` text.
    pub fn new_alias(&mut self, name: &'a str) -> AliasHandle {
        let handle = AliasHandle(self.entries.len());
        self.entries.push((name, None));
        self.by_name.insert(name, handle);
        handle
    }

    /// Supply the `NodeId` text for an alias started with [`Self::new_alias`].
    pub fn new_alias_finish(
        &mut self,
        arena: &'a CharArena,
        handle: AliasHandle,
        id_text: &'a str,
    ) -> Result<(), BuilderError> {
        let id = parse_node_id(arena, id_text)?;
        let slot = self
            .entries
            .get_mut(handle.0)
            .ok_or(BuilderError::InvalidHandle)?;
        slot.1 = Some(id);
        Ok(())
    }

    /// Resolve `text` to a `NodeId`: if `text` names a known alias, return its
    /// target, or fail with [`BuilderError::UnknownAlias`] if that alias was
    /// declared with [`Self::new_alias`] but never finished. Otherwise parse
    /// `text` directly as `NodeId` text.
    pub fn resolve(&self, arena: &'a CharArena, text: &'a str) -> Result<NodeId<'a>, BuilderError> {
        if let Some(handle) = self.by_name.get(text) {
            return match self.entries[handle.0].1 {
                Some(id) => Ok(id),
                None => Err(BuilderError::UnknownAlias(text.to_owned())),
            };
        }
        parse_node_id(arena, text)
    }
}
