//! Tile kinds, the spawn weight table and the random source that feeds it.

use std::fmt;

/// One board cell's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tile {
    Ship,
    Laser,
    EnemyLaser,
    Enemy,
    Asteroid1,
    Asteroid2,
    Asteroid3,
    Bomb,
    /// Transient marker left by a resolution pass; consumed by the drop phase.
    Empty,
}

/// Spawn weights (out of [`TOTAL_WEIGHT`] draws). `Empty` is never spawned.
pub const TILE_WEIGHTS: [(Tile, u32); 8] = [
    (Tile::Ship, 4),
    (Tile::Enemy, 4),
    (Tile::Laser, 6),
    (Tile::EnemyLaser, 3),
    (Tile::Asteroid1, 11),
    (Tile::Asteroid2, 12),
    (Tile::Asteroid3, 12),
    (Tile::Bomb, 1),
];

pub const TOTAL_WEIGHT: u32 = {
    let mut total = 0;
    let mut i = 0;
    while i < TILE_WEIGHTS.len() {
        total += TILE_WEIGHTS[i].1;
        i += 1;
    }
    total
};

impl Tile {
    pub const SPAWNABLE: [Self; 8] = [
        Self::Ship,
        Self::Laser,
        Self::EnemyLaser,
        Self::Enemy,
        Self::Asteroid1,
        Self::Asteroid2,
        Self::Asteroid3,
        Self::Bomb,
    ];

    /// Spawn weight; 0 for `Empty`.
    pub fn weight(self) -> u32 {
        TILE_WEIGHTS
            .iter()
            .find(|(t, _)| *t == self)
            .map_or(0, |(_, w)| *w)
    }

    /// Sources a shot scan can start from.
    #[inline]
    pub fn is_shooter(self) -> bool {
        matches!(self, Self::Enemy | Self::Bomb)
    }

    /// Index into the theme's tile palette (0..8). `Empty` has none.
    pub fn palette_index(self) -> Option<usize> {
        Self::SPAWNABLE.iter().position(|t| *t == self)
    }

    /// Single-character board notation used by `Grid`'s `Display`/`FromStr`.
    pub fn to_char(self) -> char {
        match self {
            Self::Ship => 'S',
            Self::Laser => 'L',
            Self::EnemyLaser => 'l',
            Self::Enemy => 'E',
            Self::Asteroid1 => '1',
            Self::Asteroid2 => '2',
            Self::Asteroid3 => '3',
            Self::Bomb => 'B',
            Self::Empty => '.',
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        Some(match c {
            'S' => Self::Ship,
            'L' => Self::Laser,
            'l' => Self::EnemyLaser,
            'E' => Self::Enemy,
            '1' => Self::Asteroid1,
            '2' => Self::Asteroid2,
            '3' => Self::Asteroid3,
            'B' => Self::Bomb,
            '.' => Self::Empty,
            _ => return None,
        })
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

/// Source of uniformly distributed `u32`s. Injected so sessions can be replayed.
pub trait RandomSource {
    fn next_u32(&mut self) -> u32;

    /// Uniform value in `0..bound` without modulo bias (reject and retry).
    fn below(&mut self, bound: u32) -> u32 {
        debug_assert!(bound > 0);
        let limit = u32::MAX - u32::MAX % bound;
        loop {
            let r = self.next_u32();
            if r < limit {
                return r % bound;
            }
        }
    }
}

/// Xorshift32 generator. Seed 0 is remapped since it would only yield zeros.
#[derive(Debug, Clone, Copy)]
pub struct SeededRng {
    state: u32,
}

impl SeededRng {
    pub fn new(seed: u32) -> Self {
        Self {
            state: if seed == 0 { 0x9E37_79B9 } else { seed },
        }
    }

    /// Seed from the wall clock (one game per process start).
    pub fn from_time() -> Self {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.subsec_nanos() ^ (d.as_secs() as u32))
            .unwrap_or(1);
        Self::new(nanos)
    }

    pub fn state(&self) -> u32 {
        self.state
    }
}

impl RandomSource for SeededRng {
    fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }
}

/// Weighted tile picker over [`TILE_WEIGHTS`].
#[derive(Debug, Clone)]
pub struct TileGenerator<R> {
    rng: R,
}

impl<R: RandomSource> TileGenerator<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Draw one tile: uniform over the flattened weight table.
    pub fn next_tile(&mut self) -> Tile {
        let mut pick = self.rng.below(TOTAL_WEIGHT);
        for (tile, weight) in TILE_WEIGHTS {
            if pick < weight {
                return tile;
            }
            pick -= weight;
        }
        unreachable!("pick is always below TOTAL_WEIGHT")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Replays a fixed list of raw draws, cycling.
    struct Scripted {
        values: Vec<u32>,
        pos: usize,
    }

    impl RandomSource for Scripted {
        fn next_u32(&mut self) -> u32 {
            let v = self.values[self.pos % self.values.len()];
            self.pos += 1;
            v
        }
    }

    #[test]
    fn test_total_weight() {
        assert_eq!(TOTAL_WEIGHT, 53);
        assert_eq!(Tile::Empty.weight(), 0);
        assert_eq!(Tile::Asteroid1.weight(), 11);
    }

    #[test]
    fn test_below_rejects_biased_tail() {
        // u32::MAX is in the rejected tail for bound 10; the retry yields 7.
        let mut src = Scripted {
            values: vec![u32::MAX, 7],
            pos: 0,
        };
        assert_eq!(src.below(10), 7);
        assert_eq!(src.pos, 2);
    }

    #[test]
    fn test_every_flat_index_maps_to_its_tile() {
        // Feed every index 0..53 once; counts must equal the weights exactly.
        let mut generator = TileGenerator::new(Scripted {
            values: (0..TOTAL_WEIGHT).collect(),
            pos: 0,
        });
        let mut counts = [0u32; 8];
        for _ in 0..TOTAL_WEIGHT {
            let tile = generator.next_tile();
            counts[tile.palette_index().unwrap()] += 1;
        }
        for tile in Tile::SPAWNABLE {
            assert_eq!(counts[tile.palette_index().unwrap()], tile.weight(), "{tile:?}");
        }
    }

    #[test]
    fn test_seeded_rng_is_deterministic() {
        let mut a = SeededRng::new(42);
        let mut b = SeededRng::new(42);
        for _ in 0..16 {
            assert_eq!(a.next_u32(), b.next_u32());
        }
        assert_ne!(SeededRng::new(0).next_u32(), 0);
    }

    #[test]
    fn test_char_notation_round_trips() {
        for tile in Tile::SPAWNABLE.into_iter().chain([Tile::Empty]) {
            assert_eq!(Tile::from_char(tile.to_char()), Some(tile));
        }
        assert_eq!(Tile::from_char('x'), None);
    }
}
