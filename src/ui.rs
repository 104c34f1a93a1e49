//! Layout and drawing: board, incoming row, HUD, menu, tutorial, pause and game over.

use crate::game::{GameState, TurnState};
use crate::grid::{BOARD_HEIGHT, BOARD_WIDTH, Coord, EraseSet};
use crate::theme::Theme;
use crate::tile::{RandomSource, Tile};
use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Gauge, Paragraph, Widget, Wrap};
use std::collections::HashSet;
use tachyonfx::{CellFilter, Duration as TfxDuration, Effect, EffectRenderer, Interpolation, fx, ref_count};

/// Terminal cells per tile.
pub const TILE_W: u16 = 5;
pub const TILE_H: u16 = 2;
pub const BOARD_COLS: u16 = BOARD_WIDTH as u16 * TILE_W;
pub const BOARD_ROWS: u16 = BOARD_HEIGHT as u16 * TILE_H;

const SIDEBAR_WIDTH: u16 = 26;
/// Playfield block: border + incoming strip + board.
const PLAYFIELD_W: u16 = BOARD_COLS + 2;
const PLAYFIELD_H: u16 = TILE_H + BOARD_ROWS + 2;

/// Cleared cells fade from white to the background over this long.
pub const FLASH_MS: u32 = 250;

/// Where each part of the play screen goes for a given terminal area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayLayout {
    pub playfield: Rect,
    /// Strip above the board where the next row waits.
    pub incoming: Rect,
    pub board: Rect,
    pub sidebar: Rect,
}

/// Center the playfield and sidebar in `area`, like a fixed-size window.
pub fn play_layout(area: Rect) -> PlayLayout {
    let total_w = PLAYFIELD_W + SIDEBAR_WIDTH;
    let horiz = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(total_w),
            Constraint::Fill(1),
        ])
        .split(area);
    let vert = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(PLAYFIELD_H),
            Constraint::Fill(1),
        ])
        .split(horiz[1]);
    let parts = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(PLAYFIELD_W), Constraint::Length(SIDEBAR_WIDTH)])
        .split(vert[1]);
    let playfield = parts[0];

    // Unclipped so mouse mapping stays linear even on a cramped terminal.
    let incoming = Rect::new(playfield.x + 1, playfield.y + 1, BOARD_COLS, TILE_H);
    let board = Rect::new(incoming.x, incoming.y + TILE_H, BOARD_COLS, BOARD_ROWS);
    PlayLayout {
        playfield,
        incoming,
        board,
        sidebar: parts[1],
    }
}

/// Terminal cell → grid coordinate relative to `board`. Cells off the board
/// give coordinates outside `0..8`.
pub fn cell_to_grid(board: Rect, column: u16, row: u16) -> (i32, i32) {
    let dx = i32::from(column) - i32::from(board.x);
    let dy = i32::from(row) - i32::from(board.y);
    (dx.div_euclid(i32::from(TILE_W)), dy.div_euclid(i32::from(TILE_H)))
}

/// `m:ss` for the HUD clock.
pub fn format_time(secs: f32) -> String {
    let whole = secs.max(0.0) as u64;
    format!("{}:{:02}", whole / 60, whole % 60)
}

/// Energy bar colour: green above two thirds, yellow above one third, else red.
pub fn energy_color(ratio: f64) -> Color {
    if ratio > 0.66 {
        Color::Green
    } else if ratio > 0.33 {
        Color::Yellow
    } else {
        Color::Red
    }
}

/// Two rows of `TILE_W` characters per tile.
fn glyph(tile: Tile) -> [&'static str; 2] {
    match tile {
        Tile::Ship => [" /^\\ ", "/_#_\\"],
        Tile::Laser => ["  |  ", "  |  "],
        Tile::EnemyLaser => ["  :  ", "  :  "],
        Tile::Enemy => ["\\-o-/", " \\_/ "],
        Tile::Asteroid1 => [" .-. ", " '-' "],
        Tile::Asteroid2 => [" /#\\ ", " \\#/ "],
        Tile::Asteroid3 => [" <%> ", " <%> "],
        Tile::Bomb => [" .*. ", " (B) "],
        Tile::Empty => ["     ", "     "],
    }
}

/// Play-screen state the board drawing needs beyond the game itself.
#[derive(Debug, Clone, Copy)]
pub struct BoardView<'a> {
    pub cursor: Coord,
    pub grabbing: bool,
    pub animate: bool,
    /// Cells painted white this frame (then faded by the flash effect).
    pub flashing: Option<&'a EraseSet>,
}

pub fn draw_play<R: RandomSource>(
    frame: &mut Frame,
    layout: &PlayLayout,
    game: &GameState<R>,
    view: &BoardView<'_>,
    theme: &Theme,
) {
    let clip = layout.playfield.intersection(frame.area());
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
        .title(Span::styled(" Lasermatch ", Style::default().fg(theme.title)));
    block.render(clip, frame.buffer_mut());

    let field = Rect::new(
        layout.incoming.x,
        layout.incoming.y,
        BOARD_COLS,
        TILE_H + BOARD_ROWS,
    )
    .intersection(clip);
    draw_board(frame.buffer_mut(), field, layout, game, view, theme);
    draw_sidebar(frame, layout.sidebar.intersection(frame.area()), game, theme);
}

fn fill_bg(buf: &mut Buffer, rect: Rect, color: Color) {
    for y in rect.top()..rect.bottom() {
        for x in rect.left()..rect.right() {
            buf[(x, y)].set_char(' ').set_style(Style::default().bg(color));
        }
    }
}

/// Terminal rect of grid cell `(x, y)`; `y = -1` is the incoming strip.
fn tile_rect(layout: &PlayLayout, x: i32, y: i32) -> (i32, i32) {
    (
        i32::from(layout.board.x) + x * i32::from(TILE_W),
        i32::from(layout.board.y) + y * i32::from(TILE_H),
    )
}

fn paint_tile(buf: &mut Buffer, clip: Rect, (px, py): (i32, i32), tile: Tile, style: Style) {
    for (row, line) in glyph(tile).iter().enumerate() {
        let y = py + row as i32;
        for (col, ch) in line.chars().enumerate() {
            let x = px + col as i32;
            let (Ok(x), Ok(y)) = (u16::try_from(x), u16::try_from(y)) else {
                continue;
            };
            if clip.contains(Position::new(x, y)) {
                buf[(x, y)].set_char(ch).set_style(style);
            }
        }
    }
}

fn draw_board<R: RandomSource>(
    buf: &mut Buffer,
    clip: Rect,
    layout: &PlayLayout,
    game: &GameState<R>,
    view: &BoardView<'_>,
    theme: &Theme,
) {
    fill_bg(buf, clip, theme.bg);

    // Cell backgrounds first: cursor, grab origin and flashing cells.
    for y in 0..BOARD_HEIGHT {
        for x in 0..BOARD_WIDTH {
            let c = Coord::new(x, y);
            let bg = if view.flashing.is_some_and(|f| f.is_marked(x, y)) {
                Color::White
            } else if c == view.cursor {
                if view.grabbing { theme.title } else { theme.div_line }
            } else {
                continue;
            };
            let (px, py) = tile_rect(layout, x as i32, y as i32);
            let (Ok(px), Ok(py)) = (u16::try_from(px), u16::try_from(py)) else {
                continue;
            };
            fill_bg(buf, Rect::new(px, py, TILE_W, TILE_H).intersection(clip), bg);
        }
    }

    let progress = if view.animate { game.phase_progress() } else { 0.0 };
    let turn = game.turn();
    let grid = game.grid();

    // Per column, the lowest Empty: everything above it falls this step.
    let mut drop_floor = [None; BOARD_WIDTH];
    if turn.is_dropping() {
        for (x, floor) in drop_floor.iter_mut().enumerate() {
            *floor = (0..BOARD_HEIGHT).rev().find(|&y| grid.get(x, y) == Tile::Empty);
        }
    }
    let fall = (progress * f32::from(TILE_H)).round() as i32;

    for y in -1..BOARD_HEIGHT as i32 {
        for x in 0..BOARD_WIDTH {
            let tile = if y < 0 {
                game.next_row()[x]
            } else {
                grid.get(x, y as usize)
            };
            if tile == Tile::Empty {
                continue;
            }
            let (mut px, mut py) = tile_rect(layout, x as i32, y);

            if let TurnState::Swapping { a, b, .. } = turn {
                let here = Coord::new(x, y.max(0) as usize);
                let toward = if y >= 0 && here == a {
                    Some(b)
                } else if y >= 0 && here == b {
                    Some(a)
                } else {
                    None
                };
                if let Some(to) = toward {
                    let dx = to.x as f32 - here.x as f32;
                    let dy = to.y as f32 - here.y as f32;
                    px += (dx * progress * f32::from(TILE_W)).round() as i32;
                    py += (dy * progress * f32::from(TILE_H)).round() as i32;
                }
            }
            if let Some(floor) = drop_floor[x] {
                if y < floor as i32 {
                    py += fall;
                }
            }

            let mut style = Style::default().fg(theme.tile_color(tile));
            if y < 0 {
                style = style.add_modifier(Modifier::DIM);
            }
            paint_tile(buf, clip, (px, py), tile, style);
        }
    }
}

fn draw_sidebar<R: RandomSource>(frame: &mut Frame, area: Rect, game: &GameState<R>, theme: &Theme) {
    let title_style = Style::default().fg(theme.title);
    let fg_style = Style::default().fg(theme.main_fg);
    let border_style = Style::default().fg(theme.div_line).bg(theme.bg);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Energy (border + label + gauge)
            Constraint::Length(1),
            Constraint::Length(5), // Stats (border + score, chain, time)
            Constraint::Length(1),
            Constraint::Length(8), // Controls
        ])
        .split(area);

    let energy = game.energy();
    let energy_block = Block::default().borders(Borders::ALL).border_style(border_style);
    let energy_inner = energy_block.inner(chunks[0]);
    energy_block.render(chunks[0], frame.buffer_mut());
    let energy_rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(energy_inner);
    Paragraph::new(Line::from(vec![
        Span::styled("Energy ", title_style),
        Span::styled(format!("{}/{}", energy.value(), energy.max()), fg_style),
    ]))
    .render(energy_rows[0], frame.buffer_mut());
    Gauge::default()
        .ratio(energy.ratio().clamp(0.0, 1.0))
        .label("")
        .gauge_style(Style::default().fg(energy_color(energy.ratio())).bg(theme.bg))
        .render(energy_rows[1], frame.buffer_mut());

    let stats_block = Block::default().borders(Borders::ALL).border_style(border_style);
    let stats_inner = stats_block.inner(chunks[2]);
    stats_block.render(chunks[2], frame.buffer_mut());
    let stat = |label: &'static str, value: String| {
        Line::from(vec![Span::styled(label, title_style), Span::styled(value, fg_style)])
    };
    let chain_style = if game.chain() > 1 {
        fg_style.add_modifier(Modifier::BOLD)
    } else {
        fg_style
    };
    Paragraph::new(vec![
        stat("Score: ", game.score().to_string()),
        Line::from(vec![
            Span::styled("Chain: ", title_style),
            Span::styled(format!("x{}", game.chain()), chain_style),
        ]),
        stat("Time:  ", format_time(game.game_time())),
    ])
    .render(stats_inner, frame.buffer_mut());

    let hint = Style::default().fg(theme.inactive_fg);
    let help_block = Block::default().borders(Borders::ALL).border_style(border_style);
    let help_inner = help_block.inner(chunks[4]);
    help_block.render(chunks[4], frame.buffer_mut());
    Paragraph::new(vec![
        Line::from(Span::styled("arrows/hjkl  cursor", hint)),
        Line::from(Span::styled("space/enter grab", hint)),
        Line::from(Span::styled("arrow       swap", hint)),
        Line::from(Span::styled("mouse       drag", hint)),
        Line::from(Span::styled("p pause   q quit", hint)),
    ])
    .render(help_inner, frame.buffer_mut());
}

/// Buffer positions covered by the cells in `cells`.
fn flash_positions(board: Rect, cells: &EraseSet) -> HashSet<(u16, u16)> {
    let mut set = HashSet::new();
    for c in cells.iter() {
        let x0 = board.x + c.x as u16 * TILE_W;
        let y0 = board.y + c.y as u16 * TILE_H;
        for bx in x0..x0 + TILE_W {
            for by in y0..y0 + TILE_H {
                set.insert((bx, by));
            }
        }
    }
    set
}

/// Fade the given board cells to the background.
pub fn flash_effect(board: Rect, cells: &EraseSet, bg: Color) -> Effect {
    let positions = flash_positions(board, cells);
    let filter = CellFilter::PositionFn(ref_count(move |pos: Position| {
        positions.contains(&(pos.x, pos.y))
    }));
    fx::fade_to(bg, bg, (FLASH_MS, Interpolation::Linear))
        .with_filter(filter)
        .with_area(board)
}

pub fn render_flash(frame: &mut Frame, effect: &mut Effect, board: Rect, elapsed_ms: u32) {
    let area = board.intersection(frame.area());
    frame.render_effect(effect, area, TfxDuration::from_millis(elapsed_ms));
}

fn popup_rect(area: Rect, w: u16, h: u16) -> Rect {
    Rect {
        x: area.x + area.width.saturating_sub(w) / 2,
        y: area.y + area.height.saturating_sub(h) / 2,
        width: w.min(area.width),
        height: h.min(area.height),
    }
}

fn popup(frame: &mut Frame, rect: Rect, lines: Vec<Line<'_>>, title: &str, theme: &Theme) {
    fill_bg(frame.buffer_mut(), rect, theme.bg);
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
                .title(Span::styled(title.to_string(), Style::default().fg(theme.title))),
        )
        .render(rect, frame.buffer_mut());
}

pub fn draw_pause_overlay(frame: &mut Frame, area: Rect, theme: &Theme) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            " Paused ",
            Style::default().fg(Color::Black).bg(Color::Yellow),
        )),
        Line::from(""),
        Line::from(Span::styled(
            " P: Resume    Q: Quit ",
            Style::default().fg(theme.main_fg),
        )),
    ];
    popup(frame, popup_rect(area, 28, 6), lines, "", theme);
}

pub fn draw_menu(frame: &mut Frame, area: Rect, ready: bool, theme: &Theme) {
    let fg = Style::default().fg(theme.main_fg);
    let hint = Style::default().fg(if ready { theme.title } else { theme.inactive_fg });
    let lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled(
                " LASER",
                Style::default()
                    .fg(theme.tiles[1])
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                "MATCH ",
                Style::default()
                    .fg(theme.tiles[3])
                    .add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(""),
        Line::from(Span::styled("Line up three to clear them.", fg)),
        Line::from(Span::styled("Fire lasers up into enemies.", fg)),
        Line::from(Span::styled("Don't run out of energy.", fg)),
        Line::from(""),
        Line::from(Span::styled(" T: Tutorial ", hint)),
        Line::from(Span::styled(" any key: Play ", hint)),
    ];
    popup(frame, popup_rect(area, 40, 12), lines, " Menu ", theme);
}

/// Tutorial pages, shown in order.
pub const TUTORIAL_PAGES: [(&str, &[&str]); 4] = [
    (
        "Swapping",
        &[
            "Drag a tile onto a neighbour with the mouse,",
            "or move the cursor, press Space, then an arrow.",
            "",
            "Three or more identical tiles in a row or",
            "column are cleared and refill your energy.",
            "Every swap costs energy, matched or not.",
        ],
    ),
    (
        "Lasers",
        &[
            "An enemy with your ship below it and an",
            "unbroken column of green lasers in between",
            "is shot down: big score, big energy.",
            "",
            "The ship stays. The enemy and beam are cleared.",
        ],
    ),
    (
        "Enemy fire and bombs",
        &[
            "Red enemy lasers between an enemy and your",
            "ship destroy the ship and drain energy.",
            "",
            "A beam that reaches a bomb blows up the 3x3",
            "block around it. Ships caught in it die;",
            "enemies caught by your own bomb shot count.",
        ],
    ),
    (
        "Chains",
        &[
            "Cleared tiles fall and new ones drop in from",
            "the row waiting above the board.",
            "",
            "Each cascade raises the chain multiplier",
            "on kill score. Energy drains slowly over",
            "time; when it runs out the game is over.",
        ],
    ),
];

pub fn draw_tutorial(frame: &mut Frame, area: Rect, page: usize, theme: &Theme) {
    let Some((heading, body)) = TUTORIAL_PAGES.get(page) else {
        return;
    };
    fill_bg(frame.buffer_mut(), area, theme.bg);
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            *heading,
            Style::default()
                .fg(theme.title)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];
    lines.extend(
        body.iter()
            .map(|l| Line::from(Span::styled(*l, Style::default().fg(theme.main_fg)))),
    );
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!("{}/{}  any key: next", page + 1, TUTORIAL_PAGES.len()),
        Style::default().fg(theme.inactive_fg),
    )));
    popup(frame, popup_rect(area, 56, 14), lines, " Tutorial ", theme);
}

pub fn draw_game_over(
    frame: &mut Frame,
    area: Rect,
    score: u32,
    time_secs: f32,
    ready: bool,
    theme: &Theme,
) {
    let fg = Style::default().fg(theme.main_fg);
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            " Out of energy ",
            Style::default().fg(Color::White).bg(Color::Red),
        )),
        Line::from(""),
        Line::from(Span::styled(format!(" Score: {score} "), fg)),
        Line::from(Span::styled(format!(" Time: {} ", format_time(time_secs)), fg)),
        Line::from(""),
    ];
    if ready {
        lines.push(Line::from(Span::styled(
            " any key: Restart    Q: Quit ",
            Style::default().fg(theme.title),
        )));
    }
    popup(frame, popup_rect(area, 34, 9), lines, " Game Over ", theme);
}
