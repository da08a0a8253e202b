//! Tile Grid
//!
//! The static arena: a rectangular grid of empty and wall tiles, parsed from
//! a whitespace-separated text format. Immutable once built.

use std::fmt;
use std::str::FromStr;

use crate::core::aabb::Aabb;
use crate::core::vec2::Vec2;
use crate::error::MapError;
use crate::game::surface::Surface;

/// A single board cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Tile {
    /// Passable
    Empty,
    /// Solid
    Wall,
}

impl Tile {
    /// Text token for this tile.
    pub fn token(self) -> char {
        match self {
            Tile::Empty => '.',
            Tile::Wall => 'w',
        }
    }

    fn parse(token: &str) -> Option<Tile> {
        match token {
            "." => Some(Tile::Empty),
            "w" => Some(Tile::Wall),
            _ => None,
        }
    }
}

/// Immutable tile grid. Cell `(x, y)` covers `[x, x+1) x [y, y+1)`.
#[derive(Clone, PartialEq, Eq)]
pub struct Board {
    width: usize,
    height: usize,
    tiles: Vec<Vec<Tile>>,
}

impl Board {
    /// Build a board from rows of tiles.
    ///
    /// A trailing empty row is dropped. Fails on an empty grid or rows of
    /// unequal length.
    pub fn new(mut rows: Vec<Vec<Tile>>) -> Result<Self, MapError> {
        if rows.last().is_some_and(|row| row.is_empty()) {
            rows.pop();
        }
        let Some(first) = rows.first() else {
            return Err(MapError::Empty);
        };
        let width = first.len();
        if width == 0 {
            return Err(MapError::Empty);
        }
        for (row, tiles) in rows.iter().enumerate() {
            if tiles.len() != width {
                return Err(MapError::RaggedRow { row, expected: width, found: tiles.len() });
            }
        }
        Ok(Self { width, height: rows.len(), tiles: rows })
    }

    /// Parse the text format: one row per line, tokens separated by
    /// whitespace, `.` for empty and `w` for wall. Blank lines are skipped so
    /// maps can be written as indented blocks.
    pub fn parse(text: &str) -> Result<Self, MapError> {
        let mut rows = Vec::new();
        for line in text.lines().map(str::trim).filter(|line| !line.is_empty()) {
            let row_index = rows.len();
            let row = line
                .split_whitespace()
                .enumerate()
                .map(|(column, token)| {
                    Tile::parse(token).ok_or_else(|| MapError::UnrecognizedTile {
                        row: row_index,
                        column,
                        token: token.to_string(),
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            rows.push(row);
        }
        Self::new(rows)
    }

    /// Inverse of [`Board::parse`]: rows joined by newlines, tokens by spaces.
    pub fn serialize(&self) -> String {
        self.tiles
            .iter()
            .map(|row| {
                row.iter()
                    .map(|tile| tile.token().to_string())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Width in tiles.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in tiles.
    pub fn height(&self) -> usize {
        self.height
    }

    /// `(width, height)` as a vector.
    pub fn dimensions(&self) -> Vec2 {
        Vec2::new(self.width as f64, self.height as f64)
    }

    /// Tile containing `pos`, or `None` outside the grid.
    pub fn tile_at(&self, pos: Vec2) -> Option<Tile> {
        let y = pos.y().floor();
        if y < 0.0 || y >= self.height as f64 {
            return None;
        }
        let x = pos.x().floor();
        if x < 0.0 || x >= self.width as f64 {
            return None;
        }
        Some(self.tiles[y as usize][x as usize])
    }

    /// True if `pos` is inside a wall tile.
    pub fn is_wall(&self, pos: Vec2) -> bool {
        self.tile_at(pos) == Some(Tile::Wall)
    }

    /// Every cell as `(x, y, tile)`, row by row.
    pub fn tiles(&self) -> impl Iterator<Item = (usize, usize, Tile)> + '_ {
        self.tiles
            .iter()
            .enumerate()
            .flat_map(|(y, row)| row.iter().enumerate().map(move |(x, tile)| (x, y, *tile)))
    }

    /// Paint the background and every wall cell.
    pub fn draw_tiles(&self, surface: &mut dyn Surface, background: &str, foreground: &str) {
        surface.fill_box(Aabb::new(Vec2::ZERO, self.dimensions()), background);
        for (x, y, tile) in self.tiles() {
            if tile == Tile::Wall {
                surface.fill_box(Aabb::cell(Vec2::new(x as f64, y as f64)), foreground);
            }
        }
    }
}

impl FromStr for Board {
    type Err = MapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Board::parse(s)
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Board({}x{})\n{}", self.width, self.height, self.serialize())
    }
}
