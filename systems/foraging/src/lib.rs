#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic foraging system that walks the player to trees and chops them.

use hearthwood_core::{
    CellCoord, Command, Direction, Event, PlayerSnapshot, TreeId, TreeSnapshot, TreeView,
};

/// Pure system that reacts to world events and emits harvesting commands.
#[derive(Debug, Default)]
pub struct Forager {
    target: Option<TreeId>,
}

impl Forager {
    /// Creates a forager without a target.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Tree the forager is currently working toward.
    #[must_use]
    pub fn target(&self) -> Option<TreeId> {
        self.target
    }

    /// Consumes world events and immutable views to emit at most one player action.
    pub fn handle(
        &mut self,
        events: &[Event],
        player: PlayerSnapshot,
        trees: &TreeView,
        out: &mut Vec<Command>,
    ) {
        let mut advanced = false;
        for event in events {
            match event {
                Event::WorldReset { .. } => self.target = None,
                Event::TreeFelled { tree, .. } if self.target == Some(*tree) => {
                    self.target = None;
                }
                Event::TimeAdvanced { .. } => advanced = true,
                _ => {}
            }
        }

        if !advanced || !player.alive {
            return;
        }

        let current = self.target.and_then(|id| trees.get(id));
        let Some(tree) = current.or_else(|| nearest_tree(player.cell, trees)) else {
            self.target = None;
            return;
        };
        self.target = Some(tree.id);

        if tree.cell.manhattan_distance(player.cell) <= 1 {
            out.push(Command::ChopTree { tree: tree.id });
        } else {
            out.push(Command::StepPlayer {
                direction: step_toward(player.cell, tree.cell),
            });
        }
    }
}

/// Selects the standing tree closest to `origin`, preferring lower identifiers on ties.
#[must_use]
pub fn nearest_tree(origin: CellCoord, trees: &TreeView) -> Option<&TreeSnapshot> {
    trees
        .iter()
        .min_by_key(|tree| (tree.cell.manhattan_distance(origin), tree.id))
}

/// Direction of a single step from `from` toward `to` along the longer axis.
///
/// Columns win when both axes are equally far.
#[must_use]
pub fn step_toward(from: CellCoord, to: CellCoord) -> Direction {
    let column_delta = i64::from(to.column()) - i64::from(from.column());
    let row_delta = i64::from(to.row()) - i64::from(from.row());

    if column_delta.abs() >= row_delta.abs() {
        if column_delta >= 0 {
            Direction::East
        } else {
            Direction::West
        }
    } else if row_delta > 0 {
        Direction::South
    } else {
        Direction::North
    }
}
