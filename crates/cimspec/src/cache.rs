use std::collections::HashMap;

use crate::error::StructuralError;
use crate::model::NodeId;

/// Per-run table of output fragments keyed by source node identity.
///
/// A cache belongs to exactly one generator and lives as long as that generator's run.
#[derive(Debug)]
pub struct FragmentCache<F> {
    entries: HashMap<NodeId, F>,
}

impl<F> Default for FragmentCache<F> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<F> FragmentCache<F> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, node: NodeId, fragment: F) -> Result<(), StructuralError> {
        if self.entries.contains_key(&node) {
            return Err(StructuralError::DuplicateFragment { node });
        }
        self.entries.insert(node, fragment);
        Ok(())
    }

    pub fn get(&self, node: NodeId) -> Result<&F, StructuralError> {
        self.entries
            .get(&node)
            .ok_or(StructuralError::CacheMiss { node })
    }

    pub fn get_mut(&mut self, node: NodeId) -> Result<&mut F, StructuralError> {
        self.entries
            .get_mut(&node)
            .ok_or(StructuralError::CacheMiss { node })
    }

    /// Removes a fragment so it can be moved into its parent.
    pub fn take(&mut self, node: NodeId) -> Result<F, StructuralError> {
        self.entries
            .remove(&node)
            .ok_or(StructuralError::CacheMiss { node })
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.entries.contains_key(&node)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
