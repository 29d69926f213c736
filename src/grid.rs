//! The N×N grid of cells.
//!
//! Every cell stores its occupant and a cached liberty count: the number of
//! its orthogonal neighbors that are currently empty. The count is kept for
//! *every* cell, empty or not, and is adjusted incrementally whenever a
//! neighbor is filled or cleared. It says nothing about the liberties of the
//! group a stone belongs to; see [`crate::group`] for that.

use std::fmt;

use derive_more::Display;
use serde::Serialize;

use crate::constants::{DELTA, EMPTY, STONE_BLACK, STONE_WHITE};
use crate::error::BoardError;

/// Stone color. White moves first.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Display, Serialize)]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub fn opponent(self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Color::White => STONE_WHITE,
            Color::Black => STONE_BLACK,
        }
    }
}

/// A point on the grid as `(x, y)`.
pub type Point = (usize, usize);

/// In-bounds orthogonal neighbors of a point, in left, right, down, up order.
pub type Neighbors = std::iter::Flatten<std::array::IntoIter<Option<Point>, 4>>;

/// A stone placement, attempted or historical.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Display, Serialize)]
#[display("{color} to ({x}, {y})")]
pub struct Move {
    pub x: usize,
    pub y: usize,
    pub color: Color,
}

impl Move {
    pub fn new(x: usize, y: usize, color: Color) -> Self {
        Self { x, y, color }
    }

    pub fn point(&self) -> Point {
        (self.x, self.y)
    }
}

/// One point of the grid.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Cell {
    /// `None` when the point is empty.
    pub stone: Option<Color>,
    /// Number of empty orthogonal neighbors.
    pub liberty: u8,
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        self.stone.is_none()
    }

    fn symbol(&self) -> char {
        self.stone.map_or(EMPTY, Color::symbol)
    }
}

/// Serializes as `size` plus `cells` in row-major order (`y * size + x`).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Grid {
    size: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Create an empty grid with liberties seeded from border geometry:
    /// corners 2, edges 3, interior 4.
    pub fn new(size: usize) -> Result<Self, BoardError> {
        if size == 0 {
            return Err(BoardError::InvalidSize { size });
        }
        let mut grid = Self {
            size,
            cells: vec![
                Cell {
                    stone: None,
                    liberty: 0,
                };
                size * size
            ],
        };
        for y in 0..size {
            for x in 0..size {
                let libs = grid.neighbors(x, y).count() as u8;
                let i = grid.idx(x, y);
                grid.cells[i].liberty = libs;
            }
        }
        Ok(grid)
    }

    pub fn size(&self) -> usize {
        self.size
    }

    fn idx(&self, x: usize, y: usize) -> usize {
        y * self.size + x
    }

    pub fn contains(&self, x: usize, y: usize) -> bool {
        x < self.size && y < self.size
    }

    pub fn get(&self, x: usize, y: usize) -> Result<Cell, BoardError> {
        if !self.contains(x, y) {
            return Err(BoardError::OutOfBounds {
                x,
                y,
                size: self.size,
            });
        }
        Ok(self.cells[self.idx(x, y)])
    }

    /// Unchecked access for callers that already hold an in-bounds point.
    pub(crate) fn at(&self, (x, y): Point) -> &Cell {
        &self.cells[self.idx(x, y)]
    }

    /// Overwrite the occupant of a point. No rule checking.
    pub(crate) fn set_stone(&mut self, (x, y): Point, stone: Option<Color>) {
        let i = self.idx(x, y);
        self.cells[i].stone = stone;
    }

    /// Shift the cached liberty count of a point.
    ///
    /// # Panics
    /// If the count would leave `0..=4`. That can only happen through an
    /// engine bug, never through player input.
    pub(crate) fn adjust_liberty(&mut self, (x, y): Point, delta: i8) {
        let i = self.idx(x, y);
        let current = self.cells[i].liberty;
        self.cells[i].liberty = current
            .checked_add_signed(delta)
            .filter(|&l| l <= 4)
            .unwrap_or_else(|| panic!("liberty of ({x}, {y}) out of range: {current} {delta:+}"));
    }

    pub fn neighbors(&self, x: usize, y: usize) -> Neighbors {
        let size = self.size;
        DELTA
            .map(|(dx, dy)| {
                let nx = x.checked_add_signed(dx)?;
                let ny = y.checked_add_signed(dy)?;
                (nx < size && ny < size).then_some((nx, ny))
            })
            .into_iter()
            .flatten()
    }

    /// All points, row by row.
    pub fn points(&self) -> impl Iterator<Item = Point> + use<> {
        let size = self.size;
        (0..size).flat_map(move |y| (0..size).map(move |x| (x, y)))
    }

    /// True when both grids hold the same stones. Liberty counts are ignored.
    pub fn same_layout(&self, other: &Grid) -> bool {
        self.size == other.size
            && self
                .cells
                .iter()
                .zip(&other.cells)
                .all(|(a, b)| a.stone == b.stone)
    }

    pub fn stone_count(&self, color: Color) -> usize {
        self.cells
            .iter()
            .filter(|c| c.stone == Some(color))
            .count()
    }

    /// Text rendering with column and row indices. With `show_liberties`
    /// each symbol is followed by the cell's cached liberty count.
    pub fn render(&self, show_liberties: bool) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = self.write_layout(&mut out, show_liberties);
        out
    }

    fn write_layout(&self, out: &mut impl fmt::Write, show_liberties: bool) -> fmt::Result {
        let width = if show_liberties { 3 } else { 2 };
        out.write_str("  ")?;
        for x in 0..self.size {
            write!(out, "{x:>width$}")?;
        }
        writeln!(out)?;
        for y in 0..self.size {
            write!(out, "{y:>2}")?;
            for x in 0..self.size {
                let cell = self.at((x, y));
                write!(out, " {}", cell.symbol())?;
                if show_liberties {
                    write!(out, "{}", cell.liberty)?;
                }
            }
            writeln!(out)?;
        }
        Ok(())
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_layout(f, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_size_rejected() {
        assert_eq!(Grid::new(0), Err(BoardError::InvalidSize { size: 0 }));
    }

    #[test]
    fn test_seeded_liberties() {
        let grid = Grid::new(5).unwrap();
        assert_eq!(grid.get(0, 0).unwrap().liberty, 2);
        assert_eq!(grid.get(4, 4).unwrap().liberty, 2);
        assert_eq!(grid.get(2, 0).unwrap().liberty, 3);
        assert_eq!(grid.get(0, 3).unwrap().liberty, 3);
        assert_eq!(grid.get(2, 2).unwrap().liberty, 4);
        assert!(grid.points().all(|p| grid.at(p).is_empty()));
    }

    #[test]
    fn test_single_point_board_has_no_liberties() {
        let grid = Grid::new(1).unwrap();
        assert_eq!(grid.get(0, 0).unwrap().liberty, 0);
    }

    #[test]
    fn test_get_out_of_bounds() {
        let grid = Grid::new(3).unwrap();
        assert_eq!(
            grid.get(3, 0),
            Err(BoardError::OutOfBounds { x: 3, y: 0, size: 3 })
        );
        assert!(grid.get(0, 7).is_err());
    }

    #[test]
    fn test_neighbor_order() {
        let grid = Grid::new(5).unwrap();
        let n: Vec<Point> = grid.neighbors(2, 2).collect();
        assert_eq!(n, vec![(1, 2), (3, 2), (2, 3), (2, 1)]);

        let corner: Vec<Point> = grid.neighbors(0, 0).collect();
        assert_eq!(corner, vec![(1, 0), (0, 1)]);

        let far: Vec<Point> = grid.neighbors(4, 4).collect();
        assert_eq!(far, vec![(3, 4), (4, 3)]);
    }

    #[test]
    fn test_clone_is_deep() {
        let mut grid = Grid::new(3).unwrap();
        let copy = grid.clone();
        grid.set_stone((1, 1), Some(Color::Black));
        grid.adjust_liberty((0, 1), -1);
        assert!(copy.at((1, 1)).is_empty());
        assert_eq!(copy.at((0, 1)).liberty, 3);
        assert!(!grid.same_layout(&copy));
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_negative_liberty_panics() {
        let mut grid = Grid::new(3).unwrap();
        grid.adjust_liberty((0, 0), -3);
    }

    #[test]
    fn test_render() {
        let mut grid = Grid::new(3).unwrap();
        grid.set_stone((1, 0), Some(Color::White));
        grid.set_stone((2, 2), Some(Color::Black));
        assert_eq!(grid.to_string(), "   0 1 2\n 0 . O .\n 1 . . .\n 2 . . X\n");
        let libs = grid.render(true);
        assert!(libs.starts_with("    0  1  2\n 0 .2 O3 .2\n"), "{libs}");
    }

    #[test]
    fn test_move_display() {
        assert_eq!(Move::new(3, 4, Color::Black).to_string(), "Black to (3, 4)");
    }
}
