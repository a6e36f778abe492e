/// Events emitted during a simulation step.
/// The presentation layer consumes these for redraws, effects and sound;
/// the simulation never reads them back.

use std::fmt;

use crate::domain::entity::Facing;
use crate::domain::tile::BlockKind;

/// Identifies a long-running action so a later event can cancel it.
///
/// The string form is stable: `b_{x}_{y}` for a dig, `p` for the
/// player, `e_{index}` for an enemy.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum ActionKey {
    Dig { x: i32, y: i32 },
    Player,
    Enemy(usize),
}

impl fmt::Display for ActionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionKey::Dig { x, y } => write!(f, "b_{x}_{y}"),
            ActionKey::Player => write!(f, "p"),
            ActionKey::Enemy(index) => write!(f, "e_{index}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum StageEvent {
    /// A cell's visible kind changed.
    BlockChanged { x: i32, y: i32, kind: BlockKind },
    /// A dig started on a brick.
    BrickBroken { key: ActionKey, x: i32, y: i32, facing: Facing },
    /// Gold was picked up by the player or an enemy.
    GoldCollected { key: ActionKey, x: i32, y: i32 },
    /// A previously started action (dig, carried gold) ended early.
    ActionCancelled { key: ActionKey },
}
