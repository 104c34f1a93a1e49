//! The game's scenes: play, main menu, tutorial and game over.

use crate::game::{GameEvent, GameState, InputEvent};
use crate::grid::{BOARD_HEIGHT, BOARD_WIDTH, Coord, EraseSet};
use crate::input::{self, Action};
use crate::screen::{Screen, ScreenContext, Transition};
use crate::ui::{self, BoardView, PlayLayout};
use crossterm::event::{Event, KeyEvent, KeyEventKind};
use ratatui::Frame;
use ratatui::layout::Rect;
use tachyonfx::Effect;
use tracing::{debug, info};

/// Delay before the menu accepts "any key".
const MENU_DELAY_SECS: f32 = 0.5;
/// Delay before the game-over screen accepts "any key".
const GAME_OVER_DELAY_SECS: f32 = 1.0;

fn key_press(event: &Event) -> Option<KeyEvent> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => Some(*key),
        _ => None,
    }
}

/// Cleared cells being faded out.
struct Flash {
    cells: EraseSet,
    effect: Option<Effect>,
}

pub struct PlayScreen {
    game: GameState,
    cursor: Coord,
    grabbing: bool,
    paused: bool,
    /// Layout of the last frame, for mapping mouse cells back to the grid.
    layout: Option<PlayLayout>,
    flash: Option<Flash>,
    /// Game time the flash effect has not yet been advanced by.
    fx_pending_ms: u32,
}

impl PlayScreen {
    pub fn new(ctx: &ScreenContext) -> Self {
        Self::with_game(GameState::init(&ctx.config))
    }

    pub fn with_game(game: GameState) -> Self {
        Self {
            game,
            cursor: Coord::new(BOARD_WIDTH / 2, BOARD_HEIGHT / 2),
            grabbing: false,
            paused: false,
            layout: None,
            flash: None,
            fx_pending_ms: 0,
        }
    }

    pub fn game(&self) -> &GameState {
        &self.game
    }

    pub fn cursor(&self) -> Coord {
        self.cursor
    }

    pub fn is_grabbing(&self) -> bool {
        self.grabbing
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    fn on_key(&mut self, action: Action) -> Transition {
        match action {
            Action::Quit => return Transition::Quit,
            Action::Pause => {
                self.paused = !self.paused;
                debug!("paused={}", self.paused);
            }
            _ if self.paused => {}
            Action::Grab => {
                if self.grabbing {
                    self.grabbing = false;
                } else {
                    let Coord { x, y } = self.cursor;
                    self.game.handle_input(InputEvent::PressAt {
                        x: x as i32,
                        y: y as i32,
                    });
                    self.grabbing = true;
                }
            }
            Action::Move(dir) => {
                let (dx, dy) = dir.delta();
                let (tx, ty) = (self.cursor.x as i32 + dx, self.cursor.y as i32 + dy);
                if self.grabbing {
                    self.game.handle_input(InputEvent::ReleaseAt { x: tx, y: ty });
                    self.grabbing = false;
                }
                if let Some(c) = Coord::checked(tx, ty) {
                    self.cursor = c;
                }
            }
            Action::Tutorial | Action::Other | Action::None => {}
        }
        Transition::Stay
    }

    fn on_mouse(&mut self, mouse: crossterm::event::MouseEvent) {
        if self.paused {
            return;
        }
        let Some(layout) = self.layout else {
            return;
        };
        let Some(gesture) = input::mouse_to_input(mouse, layout.board) else {
            return;
        };
        self.grabbing = false;
        let (InputEvent::PressAt { x, y } | InputEvent::ReleaseAt { x, y }) = gesture;
        if let Some(c) = Coord::checked(x, y) {
            self.cursor = c;
        }
        self.game.handle_input(gesture);
    }
}

impl Screen for PlayScreen {
    fn name(&self) -> &'static str {
        "play"
    }

    fn update(&mut self, dt: f32, ctx: &ScreenContext) -> Transition {
        if self.paused {
            return Transition::Stay;
        }
        self.fx_pending_ms = self
            .fx_pending_ms
            .saturating_add((dt * 1000.0).round() as u32);

        let result = self.game.advance(dt);
        let mut transition = Transition::Stay;
        for event in result.events {
            match event {
                GameEvent::PlayerKilledEnemy | GameEvent::EnemyKilledPlayer | GameEvent::MatchFound => {
                    debug!("cue {:?}", event);
                    if ctx.animate {
                        self.flash = Some(Flash {
                            cells: self.game.last_cleared().clone(),
                            effect: None,
                        });
                    }
                }
                GameEvent::SwapStarted => debug!("cue {:?}", event),
                GameEvent::EnergyDepleted => {
                    self.grabbing = false;
                    transition = Transition::Push(Box::new(GameOverScreen::new(
                        self.game.score(),
                        self.game.game_time(),
                    )));
                }
            }
        }
        transition
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, ctx: &ScreenContext) {
        let layout = ui::play_layout(area);
        self.layout = Some(layout);
        let view = BoardView {
            cursor: self.cursor,
            grabbing: self.grabbing,
            animate: ctx.animate,
            flashing: self.flash.as_ref().map(|f| &f.cells),
        };
        ui::draw_play(frame, &layout, &self.game, &view, &ctx.theme);

        let elapsed = std::mem::take(&mut self.fx_pending_ms);
        if let Some(flash) = &mut self.flash {
            let effect = flash
                .effect
                .get_or_insert_with(|| ui::flash_effect(layout.board, &flash.cells, ctx.theme.bg));
            ui::render_flash(frame, effect, layout.board, elapsed);
            if effect.done() {
                self.flash = None;
            }
        }

        if self.paused {
            ui::draw_pause_overlay(frame, area, &ctx.theme);
        }
    }

    fn handle_event(&mut self, event: &Event, _ctx: &ScreenContext) -> Transition {
        match event {
            Event::Mouse(mouse) => {
                self.on_mouse(*mouse);
                Transition::Stay
            }
            _ => key_press(event).map_or(Transition::Stay, |key| {
                self.on_key(input::key_to_action(key))
            }),
        }
    }

    fn teardown(&mut self) {
        info!(
            "session closed: score={} time={:.1}s",
            self.game.score(),
            self.game.game_time()
        );
    }
}

/// Title overlay over the board. `T` opens the tutorial, any other key plays.
#[derive(Debug, Default)]
pub struct MenuScreen {
    elapsed: f32,
}

impl MenuScreen {
    pub fn new() -> Self {
        Self::default()
    }

    fn ready(&self) -> bool {
        self.elapsed >= MENU_DELAY_SECS
    }
}

impl Screen for MenuScreen {
    fn name(&self) -> &'static str {
        "menu"
    }

    fn update(&mut self, dt: f32, _ctx: &ScreenContext) -> Transition {
        self.elapsed += dt;
        Transition::Stay
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, ctx: &ScreenContext) {
        ui::draw_menu(frame, area, self.ready(), &ctx.theme);
    }

    fn handle_event(&mut self, event: &Event, _ctx: &ScreenContext) -> Transition {
        let Some(key) = key_press(event) else {
            return Transition::Stay;
        };
        match input::key_to_action(key) {
            Action::Quit => Transition::Quit,
            Action::None => Transition::Stay,
            _ if !self.ready() => Transition::Stay,
            Action::Tutorial => Transition::Push(Box::new(TutorialScreen::new())),
            _ => Transition::Pop,
        }
    }

    fn draws_under(&self) -> bool {
        true
    }
}

/// Fixed sequence of help pages; any key advances, the last one closes.
#[derive(Debug, Default)]
pub struct TutorialScreen {
    page: usize,
}

impl TutorialScreen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(&self) -> usize {
        self.page
    }
}

impl Screen for TutorialScreen {
    fn name(&self) -> &'static str {
        "tutorial"
    }

    fn update(&mut self, _dt: f32, _ctx: &ScreenContext) -> Transition {
        Transition::Stay
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, ctx: &ScreenContext) {
        ui::draw_tutorial(frame, area, self.page, &ctx.theme);
    }

    fn handle_event(&mut self, event: &Event, _ctx: &ScreenContext) -> Transition {
        let Some(key) = key_press(event) else {
            return Transition::Stay;
        };
        match input::key_to_action(key) {
            Action::Quit => Transition::Quit,
            Action::None => Transition::Stay,
            _ => {
                self.page += 1;
                if self.page >= ui::TUTORIAL_PAGES.len() {
                    Transition::Pop
                } else {
                    Transition::Stay
                }
            }
        }
    }
}

/// Drawn over the frozen board once energy runs out.
#[derive(Debug)]
pub struct GameOverScreen {
    score: u32,
    time_secs: f32,
    elapsed: f32,
}

impl GameOverScreen {
    pub fn new(score: u32, time_secs: f32) -> Self {
        Self {
            score,
            time_secs,
            elapsed: 0.0,
        }
    }

    fn ready(&self) -> bool {
        self.elapsed >= GAME_OVER_DELAY_SECS
    }

    /// A fresh game, under the main menu unless menus are skipped.
    fn restart(ctx: &ScreenContext) -> Vec<Box<dyn Screen>> {
        let mut screens: Vec<Box<dyn Screen>> = vec![Box::new(PlayScreen::new(ctx))];
        if !ctx.skip_menu {
            screens.push(Box::new(MenuScreen::new()));
        }
        screens
    }
}

impl Screen for GameOverScreen {
    fn name(&self) -> &'static str {
        "game-over"
    }

    fn update(&mut self, dt: f32, _ctx: &ScreenContext) -> Transition {
        self.elapsed += dt;
        Transition::Stay
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, ctx: &ScreenContext) {
        ui::draw_game_over(frame, area, self.score, self.time_secs, self.ready(), &ctx.theme);
    }

    fn handle_event(&mut self, event: &Event, ctx: &ScreenContext) -> Transition {
        let Some(key) = key_press(event) else {
            return Transition::Stay;
        };
        match input::key_to_action(key) {
            Action::Quit => Transition::Quit,
            Action::None => Transition::Stay,
            _ if !self.ready() => Transition::Stay,
            _ => Transition::ReplaceAll(Self::restart(ctx)),
        }
    }

    fn draws_under(&self) -> bool {
        true
    }
}
