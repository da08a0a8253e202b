//! Built-in arenas.

use crate::core::vec2::Vec2;
use crate::error::MapError;
use crate::game::board::Board;

/// A board plus the spawn points players are assigned in order.
#[derive(Clone, Debug)]
pub struct Arena {
    /// Display name
    pub name: &'static str,
    /// Tile grid
    pub board: Board,
    /// Spawn points, one per player slot
    pub spawn_points: Vec<Vec2>,
}

const OPEN_LAYOUT: &str = "
    . . . . . . . . . . . . . . . .
    . . . . . . . . . . . . . . . .
    . . . . . . . . . . . . . . . .
    w w w w . . . w . . . . w w w w
    . . . . . . . . w . . . . . . .
    . . . . . . . w w . . . . . . .
    . . w w w w . w w w w w w w . .
    . . . . . . w . . . . . . . . .
    . . . . . . . . . . . . . . . .
";

const WALLED_LAYOUT: &str = "
    w w w w w w w w w w w w w w w w
    w . . . . . . . . . . . . . . w
    w . . . . . . . . . . . . . . w
    w w w w . . . w . . . . w w w w
    w . . . . . . . w . . . . . . w
    w . . . . . . w w . . . . . . w
    w . w w w w . w w w w w w w . w
    w . . . . . w . . . . . . . . w
    w w w w w w w w w w w w w w w w
";

fn default_spawns() -> Vec<Vec2> {
    vec![
        Vec2::new(3.0, 3.0),
        Vec2::new(14.0, 3.0),
        Vec2::new(4.0, 6.0),
        Vec2::new(13.0, 6.0),
    ]
}

/// Open arena: falling off the sides is possible.
pub fn open_arena() -> Result<Arena, MapError> {
    Ok(Arena {
        name: "Open",
        board: Board::parse(OPEN_LAYOUT)?,
        spawn_points: default_spawns(),
    })
}

/// Same layout enclosed by walls.
pub fn walled_arena() -> Result<Arena, MapError> {
    Ok(Arena {
        name: "Walled",
        board: Board::parse(WALLED_LAYOUT)?,
        spawn_points: default_spawns(),
    })
}

/// Every built-in arena.
pub fn all() -> Result<Vec<Arena>, MapError> {
    Ok(vec![open_arena()?, walled_arena()?])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_arenas_parse() {
        let arenas = all().unwrap();
        assert_eq!(arenas.len(), 2);
        for arena in &arenas {
            assert_eq!(arena.board.width(), 16);
            assert_eq!(arena.board.height(), 9);
            assert_eq!(arena.spawn_points.len(), 4);
        }
    }

    #[test]
    fn test_spawn_points_are_clear() {
        for arena in all().unwrap() {
            for spawn in &arena.spawn_points {
                // Players spawn half a tile up-left of the listed point
                let center = *spawn - Vec2::diag(0.5);
                assert!(!arena.board.is_wall(center), "{} spawn {spawn} in a wall", arena.name);
            }
        }
    }
}
