use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

use crate::Position;

/// Reasons a map literal cannot be turned into a playable grid.
///
/// None of these are recoverable: the driver must decline to open the
/// mini-game when it sees one.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MapError {
    #[error("Map has no rows.")]
    Empty,
    #[error("Map has zero width.")]
    ZeroWidth,
    #[error("Inconsistent width at row {row}: expected {expected}, found {found}")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("Unknown map glyph {glyph:?} at position ({x}, {y}).")]
    UnknownTile { glyph: char, x: usize, y: usize },
    #[error("Map contains no open cells.")]
    NoOpenCells,
}

/// Static type of a single dungeon cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tile {
    Wall,
    Open,
}

impl Tile {
    /// Parses a single map glyph.
    pub fn from_glyph(glyph: char) -> Option<Tile> {
        match glyph {
            '#' => Some(Tile::Wall),
            ' ' => Some(Tile::Open),
            _ => None,
        }
    }
}

/// A generic 2D grid structure.
///
/// Stores elements of type `T` in a flat vector using row-major order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid<T> {
    width: usize,
    height: usize,
    cells: Vec<T>,
}

impl<T> Grid<T> {
    /// Creates a new grid with the specified dimensions, filled by a generator function.
    ///
    /// The generator function `f` takes `(x, y)` coordinates and returns the value for that cell.
    ///
    /// # Panics
    ///
    /// Panics if `width * height` overflows `usize`.
    pub fn from_generator<F>(width: usize, height: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> T,
    {
        let size = width.checked_mul(height).expect("Grid size overflow");
        let mut cells = Vec::with_capacity(size);
        for y in 0..height {
            for x in 0..width {
                cells.push(f(x, y));
            }
        }
        Grid {
            width,
            height,
            cells,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns `(width, height)`.
    #[inline]
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Converts (x, y) coordinates to a flat vector index.
    ///
    /// Returns `None` if the coordinates are out of bounds.
    #[inline]
    pub fn coords_to_index(&self, x: usize, y: usize) -> Option<usize> {
        if x < self.width && y < self.height {
            Some(y * self.width + x)
        } else {
            None
        }
    }

    /// Gets an immutable reference to the cell at the given coordinates.
    ///
    /// Returns `None` if the coordinates are out of bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<&T> {
        let index = self.coords_to_index(x, y)?;
        self.cells.get(index)
    }

    /// Returns an iterator that yields `(Position, &T)` for each cell in row-major order.
    pub fn enumerate(&self) -> impl Iterator<Item = (Position, &T)> {
        let width = self.width;
        self.cells
            .iter()
            .enumerate()
            .map(move |(index, cell)| (Position::new(index % width, index / width), cell))
    }

    /// Returns an iterator over the rows of the grid, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[T]> {
        // `chunks` rejects a zero size; an empty grid simply has no rows.
        self.cells.chunks(self.width.max(1))
    }
}

/// The dungeon's static terrain.
pub type TileGrid = Grid<Tile>;

impl Grid<Tile> {
    /// Builds a tile grid from equal-length rows of `#` (wall) and space (open).
    pub fn parse<S: AsRef<str>>(rows: &[S]) -> Result<Self, MapError> {
        let height = rows.len();
        if height == 0 {
            return Err(MapError::Empty);
        }

        let width = rows[0].as_ref().chars().count();
        if width == 0 {
            return Err(MapError::ZeroWidth);
        }

        let mut cells = Vec::with_capacity(width * height);
        for (y, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            let found = row.chars().count();
            if found != width {
                return Err(MapError::Ragged {
                    row: y,
                    expected: width,
                    found,
                });
            }
            for (x, glyph) in row.chars().enumerate() {
                let tile = Tile::from_glyph(glyph).ok_or(MapError::UnknownTile { glyph, x, y })?;
                cells.push(tile);
            }
        }

        if !cells.contains(&Tile::Open) {
            return Err(MapError::NoOpenCells);
        }

        Ok(Grid {
            width,
            height,
            cells,
        })
    }

    /// Parses the embedded [`DUNGEON_MAP`].
    pub fn dungeon() -> Result<Self, MapError> {
        Self::parse(DUNGEON_MAP)
    }

    /// True if `position` is out of bounds or a wall.
    pub fn is_blocked(&self, position: Position) -> bool {
        !matches!(self.get(position.x, position.y), Some(Tile::Open))
    }

    pub fn is_open(&self, position: Position) -> bool {
        !self.is_blocked(position)
    }
}

/// Indexing using Position coordinates for access
impl<T> Index<Position> for Grid<T> {
    type Output = T;

    #[inline]
    fn index(&self, index: Position) -> &Self::Output {
        let (x, y) = (index.x, index.y);
        match self.coords_to_index(x, y) {
            Some(idx) => &self.cells[idx],
            None => panic!(
                "Grid index ({}, {}) out of bounds for grid size ({}, {})",
                x, y, self.width, self.height
            ),
        }
    }
}

/// Indexing using Position coordinates for mutable access
impl<T> IndexMut<Position> for Grid<T> {
    #[inline]
    fn index_mut(&mut self, index: Position) -> &mut Self::Output {
        let (x, y) = (index.x, index.y);
        let width = self.width;
        let height = self.height;
        match self.coords_to_index(x, y) {
            Some(idx) => &mut self.cells[idx],
            None => panic!(
                "Grid index ({}, {}) out of bounds for grid size ({}, {})",
                x, y, width, height
            ),
        }
    }
}

/// The dungeon layout shipped with the game. `#` is wall, space is open floor.
pub const DUNGEON_MAP: &[&str] = &[
    "#############################################################################################################################################################################################",
    "#############################################################################################################################################################################################",
    "#############################################################################################################################################################################################",
    "#######                                   #############                                   #######################################################                                      ######",
    "#######                                   #############                                   #######################################################                                      ######",
    "#######                                   #############                                   #######################################################                                      ######",
    "#######                                   #############                                   ###########                          ##################                                      ######",
    "#######                                   #############                                   ###########                          ##################                                      ######",
    "#######                                   #############                                   ###########                          ##################                                      ######",
    "#######                                   #############                                   ###########                          ##################                                      ######",
    "#######                                   #############                                   ###########                          ##################                                      ######",
    "#######                                   #############                                   ###########                          ##################                                      ######",
    "#######                                   #############                                   ###########                                                                                  ######",
    "#######                                   #############                                   ###########                                                                                  ######",
    "#######                                   #############                                   ###########                          ##################                                      ######",
    "#######                                   #############                                   ###########                          ##################                                      ######",
    "#######                                   #############                                   ###########                          ##################                                      ######",
    "#######                                   #############                                   ###########                          ##################                                      ######",
    "#######################    ############################                                   ###########                          ##################                                      ######",
    "#######################    ############################                                   ###########                          ##################                                      ######",
    "#######################    ############################                                   ###########                          ##################                                      ######",
    "#######################    ############################                                   ###########                          ########################################         #############",
    "#######################                                                                                                        ########################################         #############",
    "#######################                                                                                                        ########################################         #############",
    "#######################    #####################################          ###########################                          ########################################         #############",
    "#######################    #####################################          ###########################                          ########################################         #############",
    "#######                                   ######################          ###########################                          ########################################         #############",
    "#######                                   ######################          ###########################                          ########################################         #############",
    "#######                                   ######################          ###########################                          ########################################         #############",
    "#######                                   ######################          ###########################                          ########################################         #############",
    "#######                                   #############                                   ###########                          ########################################         #############",
    "#######                                   #############                                   ###########                          #############                        ##          #############",
    "#######                                   #############                                   ###########                          #############     #################  ##          #############",
    "#######                                   #############                                   ###########                          #############     ###########    ##  ##          #############",
    "#######                                   #############                                   ###########                          #############     ########### #####  ##          #############",
    "#######                                   #############                                   ###########                          #############     ###########        ##          #############",
    "#######                                   #############                                   ###########                          #############     #####################          #############",
    "#######                                   #############                                   ###########                          #############     #####################          #############",
    "#######                                   #############                                   ###########                          #############     #####################          #############",
    "#######                                   #############                                   ###########                          #############     #####################          #############",
    "#######                                   #############                                   ###########                          #############                                    #############",
    "#######                                   #############                                   ##################################################                                    #############",
    "#######                                   #############                                   ##################################################                                    #############",
    "#######                                   #############                                   ##################################################                                    #############",
    "#######                                   #############                                   ##################################################                                    #############",
    "############################################################################################################################################                                    #############",
    "#############################################################################################################################################################################################",
    "#############################################################################################################################################################################################",
];
