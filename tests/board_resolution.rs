//! Resolution rules checked on boards written in text notation.

use lasermatch::config::Rules;
use lasermatch::game::{Cues, GameState};
use lasermatch::grid::{BOARD_WIDTH, Grid};
use lasermatch::resolve::resolve;
use lasermatch::tile::{SeededRng, Tile};

fn board(text: &str) -> Grid {
    text.parse().expect("valid board")
}

fn session(grid: Grid) -> GameState {
    GameState::from_board(
        Rules::default(),
        grid,
        [Tile::Asteroid1; BOARD_WIDTH],
        SeededRng::new(11),
    )
}

const QUIET: &str = "
    12312312
    23123123
    31231231
    12312312
    23123123
    31231231
    12312312
    23123123";

#[test]
fn quiet_board_is_stable() {
    let res = resolve(&board(QUIET));
    assert!(!res.changed());
    assert_eq!(res.erase.count(), 0);
}

#[test]
fn single_run_of_three_erases_exactly_its_cells() {
    let grid = board(
        "
        12312312
        23123123
        31231231
        12312312
        SSS23123
        31231231
        12312312
        23123123",
    );
    let res = resolve(&grid);
    assert!(res.match_found);
    assert!(!res.shot_landed);
    assert_eq!(res.match_steps, 2);
    let erased: Vec<_> = res.erase.iter().map(|c| (c.x, c.y)).collect();
    assert_eq!(erased, vec![(0, 4), (1, 4), (2, 4)]);
}

#[test]
fn player_shot_kills_enemy_and_pays_out() {
    let grid = board(
        "
        E2312312
        L3123123
        S1231231
        12312312
        23123123
        31231231
        12312312
        23123123",
    );
    let mut state = session(grid);
    state.set_energy(40);
    let res = state.resolve_board(Cues::Emit);
    assert_eq!(res.enemies_killed, 1);
    assert_eq!(res.ships_killed, 0);
    assert_eq!(res.erase.count(), 2);
    assert_eq!(state.score(), 100);
    assert_eq!(state.energy().value(), 65);
    assert_eq!(state.grid().get(0, 0), Tile::Empty);
    assert_eq!(state.grid().get(0, 1), Tile::Empty);
    assert_eq!(state.grid().get(0, 2), Tile::Ship);
    assert!(state.turn().is_dropping());
}

#[test]
fn enemy_beam_into_bomb_kills_ships_in_the_blast() {
    let grid = board(
        "
        123E2312
        231lS123
        312B1231
        12S1E312
        23123123
        31231231
        12312312
        23123123",
    );
    let mut state = session(grid);
    let res = state.resolve_board(Cues::Emit);
    assert!(res.shot_landed);
    assert!(!res.match_found);
    assert_eq!(res.ships_killed, 2);
    // The enemy at (4, 3) is inside the blast but does not count.
    assert_eq!(res.enemies_killed, 0);
    assert_eq!(res.erase.count(), 9);
    assert_eq!(state.grid().count(Tile::Empty), 9);
    for x in 2..=4 {
        for y in 1..=3 {
            assert_eq!(state.grid().get(x, y), Tile::Empty, "({x}, {y})");
        }
    }
    // The firing enemy survives.
    assert_eq!(state.grid().get(3, 0), Tile::Enemy);
    assert_eq!(state.energy().value(), 30);
    assert_eq!(state.score(), 0);
}

#[test]
fn player_beam_into_bomb_scores_every_enemy_caught() {
    let grid = board(
        "
        12312312
        23123123
        31E31231
        123B2312
        231LE123
        312S1231
        12312312
        23123123",
    );
    let mut state = session(grid);
    state.set_energy(10);
    let res = state.resolve_board(Cues::Emit);
    assert_eq!(res.enemies_killed, 2);
    assert_eq!(res.ships_killed, 0);
    // 3x3 block around the bomb plus the ship at the end of the beam.
    assert_eq!(res.erase.count(), 10);
    assert_eq!(state.score(), 400);
    assert_eq!(state.energy().value(), 60);
}

#[test]
fn shot_and_match_resolve_in_one_pass() {
    let grid = board(
        "
        E2312312
        LLL23123
        S1231231
        12312312
        23123123
        31231231
        12312312
        23123123",
    );
    let res = resolve(&grid);
    assert!(res.shot_landed && res.match_found);
    assert_eq!(res.enemies_killed, 1);
    // Enemy and beam column plus the rest of the laser row.
    assert_eq!(res.erase.count(), 4);
}

#[test]
fn drop_fills_top_gap_without_touching_lower_tiles() {
    let mut grid = board(QUIET);
    grid.set(4, 0, Tile::Empty);
    grid.set(4, 1, Tile::Empty);
    let below: Vec<_> = (2..8).map(|y| grid.get(4, y)).collect();

    grid.drop_step(&[Tile::Bomb; BOARD_WIDTH]);
    assert!(grid.has_empty());
    grid.drop_step(&[Tile::Ship; BOARD_WIDTH]);
    assert!(!grid.has_empty());

    assert_eq!(grid.get(4, 0), Tile::Ship);
    assert_eq!(grid.get(4, 1), Tile::Bomb);
    let after: Vec<_> = (2..8).map(|y| grid.get(4, y)).collect();
    assert_eq!(after, below);
}

#[test]
fn drop_shifts_column_over_bottom_gap() {
    let mut grid = board(QUIET);
    let column: Vec<_> = (0..8).map(|y| grid.get(4, y)).collect();
    grid.set(4, 6, Tile::Empty);
    grid.set(4, 7, Tile::Empty);

    grid.drop_step(&[Tile::Bomb; BOARD_WIDTH]);
    grid.drop_step(&[Tile::Ship; BOARD_WIDTH]);
    assert!(!grid.has_empty());

    // Old rows 0..6 now sit two lower; the two new tiles enter on top.
    for y in 0..6 {
        assert_eq!(grid.get(4, y + 2), column[y], "row {y}");
    }
    assert_eq!(grid.get(4, 0), Tile::Ship);
    assert_eq!(grid.get(4, 1), Tile::Bomb);
    // Other columns never move.
    assert_eq!(grid.get(3, 7), board(QUIET).get(3, 7));
}
