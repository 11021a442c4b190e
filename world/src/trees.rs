//! Authoritative tree state management utilities.

use std::collections::BTreeMap;

use hearthwood_core::{CellCoord, TreeId, TreeKind, TreeSnapshot};

/// Tree stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct Tree {
    /// Identifier allocated by the world for the tree.
    pub(crate) id: TreeId,
    /// Tile occupied by the tree.
    pub(crate) cell: CellCoord,
    /// Kind of tree that grew.
    pub(crate) kind: TreeKind,
    /// Chops still required before the tree falls.
    pub(crate) chops_remaining: u32,
}

impl Tree {
    pub(crate) fn snapshot(&self) -> TreeSnapshot {
        TreeSnapshot {
            id: self.id,
            cell: self.cell,
            kind: self.kind,
            chops_remaining: self.chops_remaining,
        }
    }
}

/// Registry that stores standing trees and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct TreeRegistry {
    entries: BTreeMap<TreeId, Tree>,
    next_tree_id: TreeId,
}

impl TreeRegistry {
    /// Creates an empty tree registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_tree_id: TreeId::new(0),
        }
    }

    /// Rebuilds a registry from restored trees and a stored identifier counter.
    ///
    /// The counter is raised past every restored identifier so new trees never
    /// collide with existing ones.
    pub(crate) fn from_parts(trees: Vec<Tree>, next_tree_id: TreeId) -> Self {
        let floor = trees
            .iter()
            .map(|tree| tree.id.get().saturating_add(1))
            .max()
            .unwrap_or(0);
        let next = TreeId::new(next_tree_id.get().max(floor));
        Self {
            entries: trees.into_iter().map(|tree| (tree.id, tree)).collect(),
            next_tree_id: next,
        }
    }

    /// Plants a fresh tree and returns its identifier.
    ///
    /// Returns `None` once the identifier space is exhausted.
    pub(crate) fn plant(&mut self, cell: CellCoord, kind: TreeKind) -> Option<TreeId> {
        let id = self.next_tree_id;
        self.next_tree_id = TreeId::new(id.get().checked_add(1)?);
        let _ = self.entries.insert(
            id,
            Tree {
                id,
                cell,
                kind,
                chops_remaining: kind.chops_required(),
            },
        );
        Some(id)
    }

    pub(crate) fn get(&self, id: TreeId) -> Option<&Tree> {
        self.entries.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: TreeId) -> Option<&mut Tree> {
        self.entries.get_mut(&id)
    }

    pub(crate) fn remove(&mut self, id: TreeId) -> Option<Tree> {
        self.entries.remove(&id)
    }

    /// Returns the identifier of the tree standing on `cell`, if any.
    pub(crate) fn at(&self, cell: CellCoord) -> Option<TreeId> {
        self.entries
            .values()
            .find(|tree| tree.cell == cell)
            .map(|tree| tree.id)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Tree> {
        self.entries.values()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn next_tree_id(&self) -> TreeId {
        self.next_tree_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_starts_empty_with_zero_identifier() {
        let registry = TreeRegistry::new();
        assert_eq!(registry.len(), 0);
        assert_eq!(registry.next_tree_id().get(), 0);
    }

    #[test]
    fn planting_allocates_sequential_identifiers() {
        let mut registry = TreeRegistry::new();
        let first = registry.plant(CellCoord::new(0, 0), TreeKind::Timber);
        let second = registry.plant(CellCoord::new(1, 0), TreeKind::Fruit);

        assert_eq!(first, Some(TreeId::new(0)));
        assert_eq!(second, Some(TreeId::new(1)));
        assert_eq!(registry.at(CellCoord::new(1, 0)), second);
        assert_eq!(
            registry.get(TreeId::new(0)).map(|tree| tree.chops_remaining),
            Some(TreeKind::Timber.chops_required())
        );
    }

    #[test]
    fn removed_identifiers_are_not_reused() {
        let mut registry = TreeRegistry::new();
        let first = registry.plant(CellCoord::new(0, 0), TreeKind::Timber).expect("id");
        assert!(registry.remove(first).is_some());
        let second = registry.plant(CellCoord::new(0, 0), TreeKind::Timber);
        assert_ne!(Some(first), second);
    }

    #[test]
    fn from_parts_raises_stale_counter() {
        let tree = Tree {
            id: TreeId::new(9),
            cell: CellCoord::new(2, 2),
            kind: TreeKind::Fruit,
            chops_remaining: 1,
        };
        let registry = TreeRegistry::from_parts(vec![tree], TreeId::new(3));
        assert_eq!(registry.next_tree_id(), TreeId::new(10));
    }

    #[test]
    fn exhausted_identifiers_never_overwrite_trees() {
        let last = Tree {
            id: TreeId::new(u32::MAX - 1),
            cell: CellCoord::new(0, 0),
            kind: TreeKind::Timber,
            chops_remaining: 3,
        };
        let mut registry = TreeRegistry::from_parts(vec![last], TreeId::new(0));
        assert_eq!(registry.next_tree_id(), TreeId::new(u32::MAX));

        assert_eq!(registry.plant(CellCoord::new(1, 0), TreeKind::Fruit), None);
        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.get(TreeId::new(u32::MAX - 1)).map(|tree| tree.cell),
            Some(CellCoord::new(0, 0))
        );
    }
}
