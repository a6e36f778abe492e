/// Cell kinds and their properties.
/// Properties are queried via methods, not stored as flags,
/// so cell semantics are centralized here.
///
/// ## Symbol Map
///
/// ┌────────┬──────────────┬──────────────────────────────┐
/// │ Symbol │ Kind         │ Notes                        │
/// ├────────┼──────────────┼──────────────────────────────┤
/// │ O      │ Brick        │ solid, diggable              │
/// │ X      │ Concrete     │ solid                        │
/// │ #      │ Ladder       │ climbable                    │
/// │ ~ - ^  │ Bar          │ hang and traverse            │
/// │ V      │ Trapdoor     │ looks solid, falls through   │
/// │ !      │ EscapeLadder │ ladder once all gold is gone │
/// │ $      │ Gold         │ pickup                       │
/// │ E      │ Enemy        │ spawn, normalized away       │
/// │ P      │ Player       │ spawn, normalized away       │
/// │ other  │ Empty        │                              │
/// └────────┴──────────────┴──────────────────────────────┘

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Hash)]
pub enum BlockKind {
    #[default]
    Empty,
    Brick,
    Concrete,
    Ladder,
    Bar,
    Trapdoor,
    EscapeLadder,
    Gold,
    Enemy,
    Player,
}

impl BlockKind {
    pub fn from_symbol(ch: char) -> Self {
        match ch {
            'O' => BlockKind::Brick,
            'X' => BlockKind::Concrete,
            '#' => BlockKind::Ladder,
            '~' | '-' | '^' => BlockKind::Bar,
            'V' => BlockKind::Trapdoor,
            '!' => BlockKind::EscapeLadder,
            '$' => BlockKind::Gold,
            'E' => BlockKind::Enemy,
            'P' => BlockKind::Player,
            _ => BlockKind::Empty,
        }
    }

    /// Canonical symbol, used by the text renderer and test diagrams.
    pub fn symbol(self) -> char {
        match self {
            BlockKind::Empty => ' ',
            BlockKind::Brick => 'O',
            BlockKind::Concrete => 'X',
            BlockKind::Ladder => '#',
            BlockKind::Bar => '-',
            BlockKind::Trapdoor => 'V',
            BlockKind::EscapeLadder => '!',
            BlockKind::Gold => '$',
            BlockKind::Enemy => 'E',
            BlockKind::Player => 'P',
        }
    }

    /// Walls: block horizontal entry and upward movement.
    pub fn is_solid(self) -> bool {
        matches!(self, BlockKind::Brick | BlockKind::Concrete)
    }

    /// Something an actor can stand on without falling.
    pub fn is_floor(self) -> bool {
        matches!(self, BlockKind::Brick | BlockKind::Concrete | BlockKind::Ladder)
    }

    pub fn is_actor(self) -> bool {
        matches!(self, BlockKind::Enemy | BlockKind::Player)
    }

    /// Kinds that only exist in a template and never in a live layer.
    pub fn is_spawn_only(self) -> bool {
        matches!(self, BlockKind::EscapeLadder | BlockKind::Enemy | BlockKind::Player)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_has_three_symbols() {
        for ch in ['~', '-', '^'] {
            assert_eq!(BlockKind::from_symbol(ch), BlockKind::Bar);
        }
    }

    #[test]
    fn unknown_symbols_are_empty() {
        for ch in [' ', '.', 'z', '0', '@'] {
            assert_eq!(BlockKind::from_symbol(ch), BlockKind::Empty);
        }
    }

    #[test]
    fn canonical_symbol_parses_back() {
        let kinds = [
            BlockKind::Empty, BlockKind::Brick, BlockKind::Concrete,
            BlockKind::Ladder, BlockKind::Bar, BlockKind::Trapdoor,
            BlockKind::EscapeLadder, BlockKind::Gold, BlockKind::Enemy,
            BlockKind::Player,
        ];
        for kind in kinds {
            assert_eq!(BlockKind::from_symbol(kind.symbol()), kind);
        }
    }

    #[test]
    fn trapdoor_is_not_solid() {
        assert!(!BlockKind::Trapdoor.is_solid());
        assert!(BlockKind::Brick.is_solid());
        assert!(BlockKind::Ladder.is_floor());
    }
}
