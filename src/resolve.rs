//! Board resolution: laser shots down columns and runs of identical tiles.
//!
//! Everything here reads a `&Grid` and only writes an [`EraseSet`], so every
//! rule sees the board as it was before the pass. The caller sweeps the marks
//! and applies score and energy.

use crate::grid::{BOARD_HEIGHT, BOARD_WIDTH, Coord, EraseSet, Grid};
use crate::tile::Tile;

/// A beam that connected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shot {
    /// Enemy above, player laser, ship below: the enemy dies.
    PlayerKillsEnemy,
    /// Enemy above, enemy laser, ship below: the ship dies.
    EnemyKillsPlayer,
    /// Enemy laser reaches a bomb, which blows up its 3x3 block.
    EnemyHitsBomb,
    /// Player laser reaches a bomb from below, which blows up its 3x3 block.
    PlayerHitsBomb,
}

/// Kills found during one pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShotTally {
    pub enemies_killed: u32,
    pub ships_killed: u32,
    pub landed: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    pub const BOTH: [Self; 2] = [Self::Horizontal, Self::Vertical];

    fn step(self) -> (usize, usize) {
        match self {
            Self::Horizontal => (1, 0),
            Self::Vertical => (0, 1),
        }
    }
}

/// Result of one resolution pass over a board snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    pub erase: EraseSet,
    pub enemies_killed: u32,
    pub ships_killed: u32,
    pub shot_landed: bool,
    pub match_found: bool,
    /// Sum of steps over every matched run, counted per origin cell and axis.
    pub match_steps: u32,
}

impl Resolution {
    /// True when the pass found anything, i.e. the board must drop.
    pub fn changed(&self) -> bool {
        self.shot_landed || self.match_found
    }
}

/// Run both resolvers over every cell.
pub fn resolve(grid: &Grid) -> Resolution {
    let mut erase = EraseSet::new();
    let mut tally = ShotTally::default();
    for x in 0..BOARD_WIDTH {
        for y in 0..BOARD_HEIGHT {
            check_shot(grid, &mut erase, Coord::new(x, y), &mut tally);
        }
    }

    let mut match_steps = 0;
    let mut match_found = false;
    for x in 0..BOARD_WIDTH {
        for y in 0..BOARD_HEIGHT {
            for axis in Axis::BOTH {
                if let Some(steps) = check_match(grid, &mut erase, Coord::new(x, y), axis) {
                    match_steps += steps;
                    match_found = true;
                }
            }
        }
    }

    Resolution {
        erase,
        enemies_killed: tally.enemies_killed,
        ships_killed: tally.ships_killed,
        shot_landed: tally.landed > 0,
        match_found,
        match_steps,
    }
}

/// Scan down from an enemy or bomb at `start` for a beam that connects.
/// Marks what it destroys, updates `tally`, and stops at the first hit.
pub fn check_shot(
    grid: &Grid,
    erase: &mut EraseSet,
    start: Coord,
    tally: &mut ShotTally,
) -> Option<Shot> {
    let origin = grid.at(start);
    if !origin.is_shooter() || start.y >= BOARD_HEIGHT - 2 {
        return None;
    }

    let mut prev = origin;
    for y in start.y + 1..BOARD_HEIGHT {
        let cur = grid.get(start.x, y);
        let shot = match (origin, prev, cur) {
            (Tile::Enemy, Tile::Laser, Tile::Ship) => Some(Shot::PlayerKillsEnemy),
            (Tile::Enemy, Tile::EnemyLaser, Tile::Ship) => Some(Shot::EnemyKillsPlayer),
            (Tile::Enemy, Tile::EnemyLaser, Tile::Bomb) => Some(Shot::EnemyHitsBomb),
            (Tile::Bomb, Tile::Laser, Tile::Ship) => Some(Shot::PlayerHitsBomb),
            _ => None,
        };
        if let Some(shot) = shot {
            apply_shot(grid, erase, start, y, shot, tally);
            return Some(shot);
        }

        // A beam is one colour all the way; anything else blocks it.
        let beam_continues = match cur {
            Tile::Laser => prev != Tile::EnemyLaser,
            Tile::EnemyLaser => prev != Tile::Laser,
            _ => false,
        };
        if !beam_continues {
            return None;
        }
        prev = cur;
    }
    None
}

fn apply_shot(
    grid: &Grid,
    erase: &mut EraseSet,
    start: Coord,
    hit_y: usize,
    shot: Shot,
    tally: &mut ShotTally,
) {
    let below = Coord::new(start.x, start.y + 1);
    let span = hit_y - start.y;
    match shot {
        Shot::PlayerKillsEnemy => {
            // Enemy and beam go; the ship stays.
            erase.mark_run(start, 0, 1, span - 1);
            tally.enemies_killed += 1;
        }
        Shot::EnemyKillsPlayer => {
            // Beam and ship go; the enemy stays.
            erase.mark_run(below, 0, 1, span - 1);
            tally.ships_killed += 1;
        }
        Shot::EnemyHitsBomb => {
            erase.mark_run(below, 0, 1, span - 1);
            // Enemies caught by an enemy's bomb do not score.
            for c in erase.mark_square(Coord::new(start.x, hit_y)) {
                if grid.at(c) == Tile::Ship {
                    tally.ships_killed += 1;
                }
            }
        }
        Shot::PlayerHitsBomb => {
            erase.mark_run(start, 0, 1, span);
            for c in erase.mark_square(start) {
                match grid.at(c) {
                    Tile::Enemy => tally.enemies_killed += 1,
                    Tile::Ship => tally.ships_killed += 1,
                    _ => {}
                }
            }
        }
    }
    tally.landed += 1;
}

/// Walk from `start` along `axis` while tiles equal the origin. A run of three
/// or more is marked; returns its step count (run length minus one).
pub fn check_match(grid: &Grid, erase: &mut EraseSet, start: Coord, axis: Axis) -> Option<u32> {
    let origin = grid.at(start);
    if origin == Tile::Empty {
        return None;
    }
    let (dx, dy) = axis.step();
    let (mut x, mut y) = (start.x + dx, start.y + dy);
    let mut steps = 0;

    while x < BOARD_WIDTH && y < BOARD_HEIGHT {
        if grid.get(x, y) != origin {
            // Broken run: the differing cell sits `steps + 1` away and must be past 2.
            let distance = steps + 1;
            if distance > 2 {
                erase.mark_run(start, dx, dy, distance - 1);
                return Some((distance - 1) as u32);
            }
            return None;
        }
        steps += 1;
        x += dx;
        y += dy;
    }

    // Reached the edge unbroken: the last cell sits `steps` away and must be past 1.
    if steps > 1 {
        erase.mark_run(start, dx, dy, steps);
        return Some(steps as u32);
    }
    None
}
