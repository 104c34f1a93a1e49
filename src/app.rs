//! App: terminal init, main loop, and the screen stack it drives.

use crate::clock::{Clock, SystemClock};
use crate::screen::{Flow, ScreenContext, ScreenStack};
use crate::screens::{MenuScreen, PlayScreen};
use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::DefaultTerminal;
use std::time::Duration;
use tracing::info;

pub struct App {
    ctx: ScreenContext,
    stack: ScreenStack,
    clock: SystemClock,
    frame_interval: Duration,
}

impl App {
    pub fn new(ctx: ScreenContext, frame_rate: f64) -> Self {
        let mut stack = ScreenStack::new();
        stack.push(Box::new(PlayScreen::new(&ctx)));
        if !ctx.skip_menu {
            stack.push(Box::new(MenuScreen::new()));
        }
        let frame_rate = if frame_rate.is_finite() && frame_rate > 0.0 {
            frame_rate
        } else {
            30.0
        };
        Self {
            ctx,
            stack,
            clock: SystemClock::new(),
            frame_interval: Duration::from_secs_f64(1.0 / frame_rate),
        }
    }

    pub fn run(&mut self) -> Result<()> {
        use crossterm::{
            event::{DisableMouseCapture, EnableMouseCapture},
            execute,
            terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
        };

        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

        let result = ratatui::DefaultTerminal::new(ratatui::backend::CrosstermBackend::new(stdout))
            .map_err(anyhow::Error::from)
            .and_then(|mut terminal| self.run_loop(&mut terminal));

        // Restore
        let _ = execute!(std::io::stdout(), DisableMouseCapture);
        execute!(std::io::stdout(), LeaveAlternateScreen)?;
        disable_raw_mode()?;

        result
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        self.clock.reset();
        loop {
            let dt = self.clock.tick();
            if self.stack.update(dt, &self.ctx) == Flow::Quit {
                break;
            }

            terminal.draw(|f| self.stack.draw(f, &self.ctx))?;

            if event::poll(self.frame_interval)? {
                while event::poll(Duration::ZERO)? {
                    let ev = event::read()?;
                    // Release/repeat reports would double every key.
                    if matches!(&ev, Event::Key(key) if key.kind != KeyEventKind::Press) {
                        continue;
                    }
                    if self.stack.handle_event(&ev, &self.ctx) == Flow::Quit {
                        info!("quit requested");
                        return Ok(());
                    }
                }
            }
        }
        Ok(())
    }
}
