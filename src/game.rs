//! Game state: board, next row, turn phases, score, energy and chain.

use crate::config::{GameConfig, Rules};
use crate::energy::Energy;
use crate::grid::{BOARD_WIDTH, Coord, EraseSet, Grid};
use crate::resolve::{self, Resolution};
use crate::tile::{RandomSource, SeededRng, Tile, TileGenerator};
use tracing::{debug, info};

/// What the board is doing. Phases carry the game time they began at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TurnState {
    Idle,
    /// Tiles `a` and `b` are animating towards each other.
    Swapping { a: Coord, b: Coord, since: f32 },
    /// Cleared cells are being refilled one row per step.
    Dropping { since: f32 },
}

impl TurnState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_dropping(&self) -> bool {
        matches!(self, Self::Dropping { .. })
    }
}

/// Pointer input in grid coordinates. Off-board values are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    PressAt { x: i32, y: i32 },
    ReleaseAt { x: i32, y: i32 },
}

/// Cues for the driver (sounds, flashes, scene changes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    PlayerKilledEnemy,
    EnemyKilledPlayer,
    MatchFound,
    SwapStarted,
    EnergyDepleted,
}

/// Events raised since the previous `advance`, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdvanceResult {
    pub events: Vec<GameEvent>,
}

impl AdvanceResult {
    pub fn contains(&self, event: GameEvent) -> bool {
        self.events.contains(&event)
    }
}

/// Whether a resolution pass raises events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cues {
    Emit,
    Silent,
}

/// One play session. Owns the board and every counter; mutated only through
/// `handle_input` and `advance`.
#[derive(Debug)]
pub struct GameState<R = SeededRng> {
    rules: Rules,
    tiles: TileGenerator<R>,
    grid: Grid,
    next_row: [Tile; BOARD_WIDTH],
    game_time: f32,
    last_energy_tick: f32,
    turn: TurnState,
    pressed: Option<Coord>,
    energy: Energy,
    score: u32,
    chain: u32,
    over: bool,
    /// Cells cleared by the most recent pass that found something.
    last_cleared: EraseSet,
    pending: Vec<GameEvent>,
}

impl GameState<SeededRng> {
    /// Random board, settled so no match or shot is visible at the start.
    pub fn init(config: &GameConfig) -> Self {
        let rng = config.seed.map_or_else(SeededRng::from_time, SeededRng::new);
        info!("new session: seed=0x{:08x}", rng.state());
        Self::with_rng(config.rules.clone(), rng)
    }
}

impl<R: RandomSource> GameState<R> {
    pub fn with_rng(rules: Rules, rng: R) -> Self {
        let mut tiles = TileGenerator::new(rng);
        let next_row = std::array::from_fn(|_| tiles.next_tile());
        let grid = Grid::from_fn(|_, _| tiles.next_tile());
        let mut state = Self::from_parts(rules, grid, next_row, tiles);
        let passes = state.settle();
        debug!("board settled after {} passes:\n{}", passes, state.grid);
        state
    }

    /// Session over an explicit board, taken as-is (no settling).
    pub fn from_board(rules: Rules, grid: Grid, next_row: [Tile; BOARD_WIDTH], rng: R) -> Self {
        Self::from_parts(rules, grid, next_row, TileGenerator::new(rng))
    }

    fn from_parts(
        rules: Rules,
        grid: Grid,
        next_row: [Tile; BOARD_WIDTH],
        tiles: TileGenerator<R>,
    ) -> Self {
        Self {
            energy: Energy::full(rules.max_energy),
            rules,
            tiles,
            grid,
            next_row,
            game_time: 0.0,
            last_energy_tick: 0.0,
            turn: TurnState::Idle,
            pressed: None,
            score: 0,
            chain: 1,
            over: false,
            last_cleared: EraseSet::new(),
            pending: Vec::new(),
        }
    }

    /// Resolve and refill in place until a pass finds nothing. Returns the
    /// number of passes that cleared something.
    fn settle(&mut self) -> u32 {
        let mut passes = 0;
        loop {
            let res = resolve::resolve(&self.grid);
            if !res.changed() {
                return passes;
            }
            self.grid.sweep(&res.erase);
            self.grid.refill_empty(|| self.tiles.next_tile());
            passes += 1;
        }
    }

    /// Apply a drag gesture. A release on an orthogonal neighbour of the last
    /// press starts a swap; everything else is a no-op.
    pub fn handle_input(&mut self, event: InputEvent) {
        if self.over {
            return;
        }
        match event {
            InputEvent::PressAt { x, y } => {
                // A press off the board still starts a gesture, one that can never swap.
                self.pressed = Coord::checked(x, y);
            }
            InputEvent::ReleaseAt { x, y } => {
                let pressed = self.pressed.take();
                if !self.turn.is_idle() {
                    return;
                }
                let (Some(from), Some(to)) = (pressed, Coord::checked(x, y)) else {
                    return;
                };
                if !from.is_adjacent(to) {
                    return;
                }
                debug!("swap {:?} <-> {:?} at t={:.2}", to, from, self.game_time);
                self.turn = TurnState::Swapping {
                    a: to,
                    b: from,
                    since: self.game_time,
                };
                self.pending.push(GameEvent::SwapStarted);
            }
        }
    }

    /// Move time forward by `elapsed` seconds and run any phase that is due.
    pub fn advance(&mut self, elapsed: f32) -> AdvanceResult {
        if !self.over {
            self.game_time += elapsed.max(0.0);
            self.tick_energy();
            // An empty bar ends the session before a landing swap can refill it.
            if !self.end_if_depleted() {
                self.finish_swap();
                self.finish_drop();
                self.end_if_depleted();
            }
        }
        AdvanceResult {
            events: std::mem::take(&mut self.pending),
        }
    }

    fn end_if_depleted(&mut self) -> bool {
        if !self.energy.is_depleted() {
            return false;
        }
        self.over = true;
        info!(
            "energy depleted: score={} time={:.1}s chain={}",
            self.score, self.game_time, self.chain
        );
        self.pending.push(GameEvent::EnergyDepleted);
        true
    }

    fn tick_energy(&mut self) {
        let Some(period) = self.rules.energy_tick_secs else {
            return;
        };
        while self.game_time - self.last_energy_tick >= period {
            self.energy.lose(self.rules.tick_energy);
            self.last_energy_tick += period;
        }
    }

    fn elapsed_since(&self, since: f32) -> f32 {
        self.game_time - since
    }

    fn finish_swap(&mut self) {
        let TurnState::Swapping { a, b, since } = self.turn else {
            return;
        };
        if self.elapsed_since(since) < self.rules.swap_secs {
            return;
        }
        self.grid.swap(a, b);
        self.turn = TurnState::Idle;
        self.resolve_board(Cues::Emit);
        // Paid after resolving so a move that earns energy can save a nearly empty bar.
        self.energy.lose(self.rules.move_energy);
    }

    fn finish_drop(&mut self) {
        let TurnState::Dropping { since } = self.turn else {
            return;
        };
        if self.elapsed_since(since) < self.rules.drop_secs {
            return;
        }
        self.grid.drop_step(&self.next_row);
        self.next_row = std::array::from_fn(|_| self.tiles.next_tile());

        if self.grid.has_empty() {
            self.turn = TurnState::Dropping {
                since: self.game_time,
            };
            return;
        }

        self.turn = TurnState::Idle;
        self.resolve_board(Cues::Emit);
        if self.turn.is_dropping() {
            self.chain += 1;
            debug!("cascade: chain={}", self.chain);
        } else {
            self.chain = 1;
        }
    }

    /// One resolution pass: shots, then matches, then sweep. Applies score and
    /// energy and enters `Dropping` if anything was cleared.
    pub fn resolve_board(&mut self, cues: Cues) -> Resolution {
        let res = resolve::resolve(&self.grid);
        let rules = &self.rules;
        let kills = res.enemies_killed;

        let gained = kills
            .saturating_mul(kills)
            .saturating_mul(self.chain)
            .saturating_mul(rules.kill_score);
        self.score = self.score.saturating_add(gained);
        self.energy.gain(kills.saturating_mul(rules.kill_energy));
        self.energy.lose(res.ships_killed.saturating_mul(rules.die_energy));
        self.energy.gain(res.match_steps.saturating_mul(rules.match_energy));

        if cues == Cues::Emit {
            if kills > 0 {
                self.pending.push(GameEvent::PlayerKilledEnemy);
            }
            if res.ships_killed > 0 {
                self.pending.push(GameEvent::EnemyKilledPlayer);
            }
            if res.match_found {
                self.pending.push(GameEvent::MatchFound);
            }
        }

        if res.changed() {
            let cleared = self.grid.sweep(&res.erase);
            debug!(
                "resolved: cleared={} kills={} deaths={} match_steps={} chain={} score={} energy={}",
                cleared,
                kills,
                res.ships_killed,
                res.match_steps,
                self.chain,
                self.score,
                self.energy.value()
            );
            self.last_cleared = res.erase.clone();
            self.turn = TurnState::Dropping {
                since: self.game_time,
            };
        }
        res
    }

    /// Overwrite the energy value (clamped). For scenarios that start part-drained.
    pub fn set_energy(&mut self, value: u32) {
        self.energy = Energy::with_value(value, self.rules.max_energy);
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn next_row(&self) -> &[Tile; BOARD_WIDTH] {
        &self.next_row
    }

    pub fn turn(&self) -> TurnState {
        self.turn
    }

    /// How far through the current phase we are, `0.0..=1.0`; 0 when idle.
    pub fn phase_progress(&self) -> f32 {
        let (since, length) = match self.turn {
            TurnState::Idle => return 0.0,
            TurnState::Swapping { since, .. } => (since, self.rules.swap_secs),
            TurnState::Dropping { since } => (since, self.rules.drop_secs),
        };
        (self.elapsed_since(since) / length).clamp(0.0, 1.0)
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn energy(&self) -> Energy {
        self.energy
    }

    pub fn chain(&self) -> u32 {
        self.chain
    }

    pub fn game_time(&self) -> f32 {
        self.game_time
    }

    pub fn is_over(&self) -> bool {
        self.over
    }

    /// Last pressed cell (the grab origin for keyboard and mouse drags).
    pub fn pressed(&self) -> Option<Coord> {
        self.pressed
    }

    pub fn last_cleared(&self) -> &EraseSet {
        &self.last_cleared
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }
}
