//! Lasermatch: a match-3 puzzle with a shooter twist, played in the terminal.
//!
//! The engine (`tile`, `grid`, `resolve`, `energy`, `config`, `game`, `clock`)
//! has no terminal dependencies; the rest is the ratatui front end.

pub mod app;
pub mod clock;
pub mod config;
pub mod energy;
pub mod game;
pub mod grid;
pub mod input;
pub mod resolve;
pub mod screen;
pub mod screens;
pub mod theme;
pub mod tile;
pub mod ui;
