//! Column metadata and node identity.
//!
//! The plan builder registers every projected expression here and gets back
//! a stable [`ColumnId`]. Each column records the [`NodeId`] of the node that
//! computes it: a route for raw shard values, an ordered aggregate for the
//! output of an aggregate function. Origins are compared by equality and
//! never own anything; tree ownership runs strictly parent to child.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Stable identity of a plan node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Stable identity of a column produced somewhere in the plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnId(pub u32);

/// Metadata attached to a column reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub id: ColumnId,
    pub name: String,
    /// The node that computes this column's value.
    pub origin: NodeId,
}

impl Column {
    /// Whether `node` computes this column itself.
    pub fn originates_at(&self, node: NodeId) -> bool {
        self.origin == node
    }
}

/// What the pushdown pass needs from the plan builder's symbol table.
pub trait SymbolTable {
    /// Look up the metadata registered for `id`.
    fn column(&self, id: ColumnId) -> Option<&Column>;

    /// Allocate an id for a node created during planning.
    fn next_node_id(&mut self) -> NodeId;
}

/// In-memory symbol table used by the plan builder.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Symtab {
    columns: HashMap<ColumnId, Column>,
    next_node: u32,
    next_column: u32,
}

impl Symtab {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve a fresh node id.
    pub fn add_node(&mut self) -> NodeId {
        let id = NodeId(self.next_node);
        self.next_node += 1;
        id
    }

    /// Register a column computed by `origin` and return its identity.
    pub fn add_column(&mut self, name: &str, origin: NodeId) -> ColumnId {
        let id = ColumnId(self.next_column);
        self.next_column += 1;
        self.columns.insert(
            id,
            Column {
                id,
                name: name.to_string(),
                origin,
            },
        );
        id
    }

    /// Number of registered columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl SymbolTable for Symtab {
    fn column(&self, id: ColumnId) -> Option<&Column> {
        self.columns.get(&id)
    }

    fn next_node_id(&mut self) -> NodeId {
        self.add_node()
    }
}
