//! Board grid, coordinates and the per-pass erase set.

use crate::tile::Tile;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const BOARD_WIDTH: usize = 8;
pub const BOARD_HEIGHT: usize = 8;

/// Grid position. `y = 0` is the top row (where new tiles enter).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Coord {
    pub x: usize,
    pub y: usize,
}

impl Coord {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// `Some` only for coordinates inside the board.
    pub fn checked(x: i32, y: i32) -> Option<Self> {
        let (x, y) = (usize::try_from(x).ok()?, usize::try_from(y).ok()?);
        (x < BOARD_WIDTH && y < BOARD_HEIGHT).then_some(Self { x, y })
    }

    /// True if `other` is one of the four orthogonal neighbours.
    pub fn is_adjacent(self, other: Self) -> bool {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y) == 1
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseGridError {
    #[error("expected 8 rows, got {0}")]
    RowCount(usize),
    #[error("row {row}: expected 8 tiles, got {len}")]
    RowLength { row: usize, len: usize },
    #[error("row {row}: unknown tile glyph {glyph:?}")]
    UnknownGlyph { row: usize, glyph: char },
}

/// Fixed 8x8 board. Stored row-major: `cells[y][x]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    cells: [[Tile; BOARD_WIDTH]; BOARD_HEIGHT],
}

impl Grid {
    pub fn filled(tile: Tile) -> Self {
        Self {
            cells: [[tile; BOARD_WIDTH]; BOARD_HEIGHT],
        }
    }

    pub fn from_fn(mut f: impl FnMut(usize, usize) -> Tile) -> Self {
        let mut grid = Self::filled(Tile::Empty);
        for y in 0..BOARD_HEIGHT {
            for x in 0..BOARD_WIDTH {
                grid.cells[y][x] = f(x, y);
            }
        }
        grid
    }

    /// Panics if `(x, y)` is off the board.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Tile {
        self.cells[y][x]
    }

    /// Panics if `(x, y)` is off the board.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, tile: Tile) {
        self.cells[y][x] = tile;
    }

    #[inline]
    pub fn at(&self, c: Coord) -> Tile {
        self.get(c.x, c.y)
    }

    pub fn swap(&mut self, a: Coord, b: Coord) {
        let tmp = self.at(a);
        self.set(a.x, a.y, self.at(b));
        self.set(b.x, b.y, tmp);
    }

    pub fn count(&self, tile: Tile) -> usize {
        self.cells.iter().flatten().filter(|t| **t == tile).count()
    }

    pub fn has_empty(&self) -> bool {
        self.cells.iter().flatten().any(|t| *t == Tile::Empty)
    }

    /// Clear every marked cell to `Empty`. Returns how many were cleared.
    pub fn sweep(&mut self, erase: &EraseSet) -> usize {
        let mut cleared = 0;
        for c in erase.iter() {
            self.set(c.x, c.y, Tile::Empty);
            cleared += 1;
        }
        cleared
    }

    /// Replace each `Empty` cell in place with a fresh tile. Returns how many were filled.
    pub fn refill_empty(&mut self, mut next: impl FnMut() -> Tile) -> usize {
        let mut filled = 0;
        for tile in self.cells.iter_mut().flatten() {
            if *tile == Tile::Empty {
                *tile = next();
                filled += 1;
            }
        }
        filled
    }

    /// One gravity step. In every column the topmost `Empty` (and everything
    /// above it) moves down one row; `y = 0` takes the column's tile from
    /// `next_row`. Returns true if any column moved.
    pub fn drop_step(&mut self, next_row: &[Tile; BOARD_WIDTH]) -> bool {
        let mut moved = false;
        for x in 0..BOARD_WIDTH {
            let mut dropping = false;
            for y in (0..BOARD_HEIGHT).rev() {
                if self.cells[y][x] == Tile::Empty {
                    dropping = true;
                }
                if dropping {
                    self.cells[y][x] = if y == 0 {
                        next_row[x]
                    } else {
                        self.cells[y - 1][x]
                    };
                }
            }
            moved |= dropping;
        }
        moved
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.cells.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            for tile in row {
                write!(f, "{}", tile.to_char())?;
            }
        }
        Ok(())
    }
}

/// Parses 8 lines of 8 glyphs (see [`Tile::to_char`]). Whitespace inside a row
/// and blank lines are ignored.
impl FromStr for Grid {
    type Err = ParseGridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rows: Vec<&str> = s.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
        if rows.len() != BOARD_HEIGHT {
            return Err(ParseGridError::RowCount(rows.len()));
        }
        let mut grid = Self::filled(Tile::Empty);
        for (y, line) in rows.iter().enumerate() {
            let glyphs: Vec<char> = line.chars().filter(|c| !c.is_whitespace()).collect();
            if glyphs.len() != BOARD_WIDTH {
                return Err(ParseGridError::RowLength {
                    row: y,
                    len: glyphs.len(),
                });
            }
            for (x, glyph) in glyphs.into_iter().enumerate() {
                let tile =
                    Tile::from_char(glyph).ok_or(ParseGridError::UnknownGlyph { row: y, glyph })?;
                grid.set(x, y, tile);
            }
        }
        Ok(grid)
    }
}

/// Cells to clear after one resolution pass. Marking is idempotent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EraseSet {
    marks: [[bool; BOARD_WIDTH]; BOARD_HEIGHT],
}

impl EraseSet {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn mark(&mut self, x: usize, y: usize) {
        self.marks[y][x] = true;
    }

    #[inline]
    pub fn is_marked(&self, x: usize, y: usize) -> bool {
        self.marks[y][x]
    }

    /// Mark `start` and the `steps` cells after it along `(dx, dy)`.
    pub fn mark_run(&mut self, start: Coord, dx: usize, dy: usize, steps: usize) {
        for i in 0..=steps {
            self.mark(start.x + i * dx, start.y + i * dy);
        }
    }

    /// Mark the 3x3 block around `center`, clipped to the board.
    /// Returns the covered cells so callers can count what was caught.
    pub fn mark_square(&mut self, center: Coord) -> Vec<Coord> {
        let mut covered = Vec::with_capacity(9);
        let xs = center.x.saturating_sub(1)..=(center.x + 1).min(BOARD_WIDTH - 1);
        for x in xs {
            let ys = center.y.saturating_sub(1)..=(center.y + 1).min(BOARD_HEIGHT - 1);
            for y in ys {
                self.mark(x, y);
                covered.push(Coord::new(x, y));
            }
        }
        covered
    }

    pub fn count(&self) -> usize {
        self.marks.iter().flatten().filter(|m| **m).count()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = Coord> + '_ {
        self.marks.iter().enumerate().flat_map(|(y, row)| {
            row.iter()
                .enumerate()
                .filter(|(_, m)| **m)
                .map(move |(x, _)| Coord::new(x, y))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coord_adjacency() {
        let c = Coord::new(3, 3);
        assert!(c.is_adjacent(Coord::new(3, 4)));
        assert!(c.is_adjacent(Coord::new(2, 3)));
        assert!(!c.is_adjacent(Coord::new(4, 4)));
        assert!(!c.is_adjacent(c));
        assert!(!c.is_adjacent(Coord::new(5, 3)));
    }

    #[test]
    fn test_coord_checked_rejects_out_of_board() {
        assert_eq!(Coord::checked(0, 7), Some(Coord::new(0, 7)));
        assert_eq!(Coord::checked(-1, 0), None);
        assert_eq!(Coord::checked(0, 8), None);
        assert_eq!(Coord::checked(8, 0), None);
    }

    #[test]
    #[should_panic]
    fn test_get_out_of_range_panics() {
        let grid = Grid::filled(Tile::Ship);
        let _ = grid.get(BOARD_WIDTH, 0);
    }

    #[test]
    fn test_parse_and_display() {
        let text = "\
            SLlE123B
            ........
            11111111
            22222222
            33333333
            SSSSSSSS
            EEEEEEEE
            BBBBBBBB";
        let grid: Grid = text.parse().unwrap();
        assert_eq!(grid.get(1, 0), Tile::Laser);
        assert_eq!(grid.get(2, 0), Tile::EnemyLaser);
        assert_eq!(grid.get(4, 1), Tile::Empty);
        assert_eq!(grid.to_string().lines().next(), Some("SLlE123B"));
        assert_eq!(grid.to_string().parse::<Grid>().unwrap(), grid);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!("SSSSSSSS".parse::<Grid>(), Err(ParseGridError::RowCount(1)));
        let bad_row = "SSSSSSS\n".repeat(8);
        assert_eq!(
            bad_row.parse::<Grid>(),
            Err(ParseGridError::RowLength { row: 0, len: 7 })
        );
        let bad_glyph = format!("SSSSSSSx\n{}", "SSSSSSSS\n".repeat(7));
        assert_eq!(
            bad_glyph.parse::<Grid>(),
            Err(ParseGridError::UnknownGlyph { row: 0, glyph: 'x' })
        );
    }

    #[test]
    fn test_mark_square_clips_at_corner() {
        let mut erase = EraseSet::new();
        let covered = erase.mark_square(Coord::new(0, 0));
        assert_eq!(covered.len(), 4);
        assert_eq!(erase.count(), 4);
        assert!(erase.is_marked(1, 1));
        assert!(!erase.is_marked(2, 0));
    }

    #[test]
    fn test_marks_are_idempotent() {
        let mut erase = EraseSet::new();
        erase.mark_run(Coord::new(0, 0), 1, 0, 2);
        erase.mark_run(Coord::new(1, 0), 1, 0, 2);
        assert_eq!(erase.count(), 4);
    }

    #[test]
    fn test_drop_step_fills_from_next_row() {
        let mut grid = Grid::filled(Tile::Asteroid1);
        grid.set(2, 5, Tile::Empty);
        grid.set(2, 0, Tile::Ship);
        let next = [Tile::Bomb; BOARD_WIDTH];
        assert!(grid.drop_step(&next));
        assert_eq!(grid.get(2, 0), Tile::Bomb);
        assert_eq!(grid.get(2, 1), Tile::Ship);
        assert!(!grid.has_empty());
        // Untouched columns do not move.
        assert_eq!(grid.get(3, 0), Tile::Asteroid1);
        assert!(!grid.drop_step(&next));
    }
}
