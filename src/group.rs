//! Group resolution: connectivity, capture detection and removal.
//!
//! A group is never stored. It is the set of same-colored stones reachable
//! from a seed through orthogonal adjacency, recomputed on demand by a single
//! depth-first traversal ([`traverse`]) that both the capture check and the
//! capture itself are built on.
//!
//! The capture check relies on the cached per-cell liberty counts kept by
//! [`Grid`]: a group has no liberties exactly when every member's cached
//! count is zero.

use std::ops::ControlFlow;

use crate::grid::{Grid, Point};

/// Points already reached during one traversal.
pub struct Visited {
    size: usize,
    seen: Vec<bool>,
}

impl Visited {
    pub fn new(grid: &Grid) -> Self {
        let size = grid.size();
        Self {
            size,
            seen: vec![false; size * size],
        }
    }

    /// Mark a point, returning `false` if it was already marked.
    pub fn insert(&mut self, (x, y): Point) -> bool {
        let i = y * self.size + x;
        !std::mem::replace(&mut self.seen[i], true)
    }

    pub fn contains(&self, (x, y): Point) -> bool {
        self.seen[y * self.size + x]
    }
}

/// Walk the group containing `seed`, calling `visit` once per member.
///
/// Members are visited depth-first with neighbors taken in left, right,
/// down, up order. Points already in `visited` are skipped, so a caller can
/// share one set across several seeds. Returns `Break` as soon as `visit`
/// does. An empty seed has no group and is never visited.
pub fn traverse<F>(grid: &Grid, seed: Point, visited: &mut Visited, mut visit: F) -> ControlFlow<()>
where
    F: FnMut(Point) -> ControlFlow<()>,
{
    let Some(color) = grid.at(seed).stone else {
        return ControlFlow::Continue(());
    };
    if !visited.insert(seed) {
        return ControlFlow::Continue(());
    }
    let mut stack = vec![seed];
    while let Some(pt) = stack.pop() {
        visit(pt)?;
        let same: Vec<Point> = grid
            .neighbors(pt.0, pt.1)
            .filter(|&n| grid.at(n).stone == Some(color))
            .collect();
        // Reverse so the stack pops them in neighbor order.
        for n in same.into_iter().rev() {
            if visited.insert(n) {
                stack.push(n);
            }
        }
    }
    ControlFlow::Continue(())
}

/// All members of the group containing `seed`, in traversal order.
pub fn group_of(grid: &Grid, seed: Point) -> Vec<Point> {
    let mut members = Vec::new();
    let mut visited = Visited::new(grid);
    let _ = traverse(grid, seed, &mut visited, |pt| {
        members.push(pt);
        ControlFlow::Continue(())
    });
    members
}

/// True when the group containing `seed` has no liberty left.
///
/// Short-circuits on the first member with a nonzero cached liberty count.
/// An empty seed is never captured.
pub fn is_captured(grid: &Grid, seed: Point, visited: &mut Visited) -> bool {
    if grid.at(seed).is_empty() {
        return false;
    }
    let escape = traverse(grid, seed, visited, |pt| {
        if grid.at(pt).liberty > 0 {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    });
    escape.is_continue()
}

/// Remove the group containing `seed` and return how many stones it had.
///
/// Each removed stone gives one liberty back to each of its in-bounds
/// neighbors, including neighbors that are themselves being removed.
pub fn capture(grid: &mut Grid, seed: Point) -> usize {
    let members = group_of(grid, seed);
    for &pt in &members {
        grid.set_stone(pt, None);
        for n in grid.neighbors(pt.0, pt.1) {
            grid.adjust_liberty(n, 1);
        }
    }
    members.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Color;

    /// Place stones directly, keeping neighbor liberty counts consistent.
    fn place(grid: &mut Grid, stones: &[(usize, usize)], color: Color) {
        for &pt in stones {
            grid.set_stone(pt, Some(color));
            for n in grid.neighbors(pt.0, pt.1) {
                grid.adjust_liberty(n, -1);
            }
        }
    }

    #[test]
    fn test_group_of_single_stone() {
        let mut grid = Grid::new(5).unwrap();
        place(&mut grid, &[(2, 2)], Color::Black);
        assert_eq!(group_of(&grid, (2, 2)), vec![(2, 2)]);
        assert!(group_of(&grid, (0, 0)).is_empty());
    }

    #[test]
    fn test_group_of_traversal_order() {
        let mut grid = Grid::new(5).unwrap();
        // An L-shape plus a stone of the other color that must not join.
        place(&mut grid, &[(1, 1), (2, 1), (1, 2), (1, 3)], Color::White);
        place(&mut grid, &[(2, 2)], Color::Black);
        assert_eq!(
            group_of(&grid, (1, 1)),
            vec![(1, 1), (2, 1), (1, 2), (1, 3)]
        );
    }

    #[test]
    fn test_lone_stone_with_liberty_not_captured() {
        let mut grid = Grid::new(5).unwrap();
        place(&mut grid, &[(0, 0)], Color::White);
        let mut visited = Visited::new(&grid);
        assert!(!is_captured(&grid, (0, 0), &mut visited));
    }

    #[test]
    fn test_surrounded_corner_stone_is_captured() {
        let mut grid = Grid::new(5).unwrap();
        place(&mut grid, &[(0, 0)], Color::White);
        place(&mut grid, &[(1, 0), (0, 1)], Color::Black);
        let mut visited = Visited::new(&grid);
        assert!(is_captured(&grid, (0, 0), &mut visited));
    }

    #[test]
    fn test_group_shares_distant_liberty() {
        let mut grid = Grid::new(5).unwrap();
        // White chain along the top edge; only (3, 0) stays open.
        place(&mut grid, &[(0, 0), (1, 0), (2, 0)], Color::White);
        place(&mut grid, &[(0, 1), (1, 1), (2, 1)], Color::Black);
        assert_eq!(grid.at((0, 0)).liberty, 0);
        assert_eq!(grid.at((1, 0)).liberty, 0);
        let mut visited = Visited::new(&grid);
        assert!(!is_captured(&grid, (0, 0), &mut visited));

        place(&mut grid, &[(3, 0)], Color::Black);
        let mut visited = Visited::new(&grid);
        assert!(is_captured(&grid, (0, 0), &mut visited));
    }

    #[test]
    fn test_empty_seed_is_not_captured() {
        let mut grid = Grid::new(1).unwrap();
        let mut visited = Visited::new(&grid);
        assert!(!is_captured(&grid, (0, 0), &mut visited));
        place(&mut grid, &[(0, 0)], Color::Black);
        let mut visited = Visited::new(&grid);
        assert!(is_captured(&grid, (0, 0), &mut visited));
    }

    #[test]
    fn test_visited_set_is_shared() {
        let mut grid = Grid::new(5).unwrap();
        place(&mut grid, &[(1, 1), (2, 1)], Color::White);
        let mut visited = Visited::new(&grid);
        assert!(group_of(&grid, (1, 1)).len() == 2);
        let _ = traverse(&grid, (1, 1), &mut visited, |_| ControlFlow::Continue(()));
        assert!(visited.contains((2, 1)));
        let mut count = 0;
        let _ = traverse(&grid, (2, 1), &mut visited, |_| {
            count += 1;
            ControlFlow::Continue(())
        });
        assert_eq!(count, 0);
    }

    #[test]
    fn test_capture_restores_neighbor_liberties() {
        let mut grid = Grid::new(5).unwrap();
        place(&mut grid, &[(1, 0), (2, 0)], Color::White);
        place(&mut grid, &[(0, 0), (3, 0), (1, 1), (2, 1)], Color::Black);
        let before = grid.clone();

        assert_eq!(capture(&mut grid, (1, 0)), 2);
        assert!(grid.at((1, 0)).is_empty());
        assert!(grid.at((2, 0)).is_empty());
        // (0, 0) touched one removed stone, (1, 1) one, the removed points each other.
        assert_eq!(grid.at((0, 0)).liberty, before.at((0, 0)).liberty + 1);
        assert_eq!(grid.at((1, 1)).liberty, before.at((1, 1)).liberty + 1);
        assert_eq!(grid.at((1, 0)).liberty, before.at((1, 0)).liberty + 1);
        assert_eq!(grid.at((1, 0)).liberty, 1);
        for pt in grid.points() {
            let empty = grid
                .neighbors(pt.0, pt.1)
                .filter(|&n| grid.at(n).is_empty())
                .count() as u8;
            assert_eq!(grid.at(pt).liberty, empty, "at {pt:?}");
        }
    }
}
