//! Screen stack: each scene implements [`Screen`]; the stack updates the top
//! one, routes input to it, and draws overlays on top of what lies beneath.

use crate::config::GameConfig;
use crate::theme::Theme;
use crossterm::event::Event;
use ratatui::Frame;
use ratatui::layout::Rect;
use tracing::debug;

/// Shared, read-only state every screen can see.
#[derive(Debug, Clone, Default)]
pub struct ScreenContext {
    pub config: GameConfig,
    pub theme: Theme,
    /// Interpolate swaps/drops and flash cleared cells.
    pub animate: bool,
    /// Start new games straight into play instead of under the main menu.
    pub skip_menu: bool,
}

/// What the stack should do after a screen handled an update or event.
pub enum Transition {
    Stay,
    Push(Box<dyn Screen>),
    Pop,
    /// Tear down every screen, then push these bottom-up.
    ReplaceAll(Vec<Box<dyn Screen>>),
    Quit,
}

impl std::fmt::Debug for Transition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stay => write!(f, "Stay"),
            Self::Push(s) => write!(f, "Push({})", s.name()),
            Self::Pop => write!(f, "Pop"),
            Self::ReplaceAll(v) => {
                let names: Vec<_> = v.iter().map(|s| s.name()).collect();
                write!(f, "ReplaceAll({names:?})")
            }
            Self::Quit => write!(f, "Quit"),
        }
    }
}

pub trait Screen {
    fn name(&self) -> &'static str;

    /// Advance by `dt` seconds. Only called on the top screen.
    fn update(&mut self, dt: f32, ctx: &ScreenContext) -> Transition;

    fn draw(&mut self, frame: &mut Frame, area: Rect, ctx: &ScreenContext);

    /// Only called on the top screen.
    fn handle_event(&mut self, event: &Event, ctx: &ScreenContext) -> Transition;

    /// Called once when the screen leaves the stack.
    fn teardown(&mut self) {}

    /// Overlays let the screen beneath draw first.
    fn draws_under(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

#[derive(Default)]
pub struct ScreenStack {
    screens: Vec<Box<dyn Screen>>,
}

impl ScreenStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, screen: Box<dyn Screen>) {
        debug!("push screen {}", screen.name());
        self.screens.push(screen);
    }

    pub fn pop(&mut self) -> Option<Box<dyn Screen>> {
        let mut screen = self.screens.pop()?;
        debug!("pop screen {}", screen.name());
        screen.teardown();
        Some(screen)
    }

    pub fn len(&self) -> usize {
        self.screens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.screens.is_empty()
    }

    /// Names bottom to top.
    pub fn names(&self) -> Vec<&'static str> {
        self.screens.iter().map(|s| s.name()).collect()
    }

    pub fn apply(&mut self, transition: Transition) -> Flow {
        match transition {
            Transition::Stay => {}
            Transition::Push(screen) => self.push(screen),
            Transition::Pop => {
                self.pop();
            }
            Transition::ReplaceAll(screens) => {
                while self.pop().is_some() {}
                for screen in screens {
                    self.push(screen);
                }
            }
            Transition::Quit => return Flow::Quit,
        }
        if self.screens.is_empty() {
            Flow::Quit
        } else {
            Flow::Continue
        }
    }

    pub fn update(&mut self, dt: f32, ctx: &ScreenContext) -> Flow {
        let Some(top) = self.screens.last_mut() else {
            return Flow::Quit;
        };
        let transition = top.update(dt, ctx);
        self.apply(transition)
    }

    pub fn handle_event(&mut self, event: &Event, ctx: &ScreenContext) -> Flow {
        let Some(top) = self.screens.last_mut() else {
            return Flow::Quit;
        };
        let transition = top.handle_event(event, ctx);
        self.apply(transition)
    }

    /// Index of the lowest screen that is visible from the top.
    fn first_visible(&self) -> usize {
        let mut i = self.screens.len().saturating_sub(1);
        while i > 0 && self.screens[i].draws_under() {
            i -= 1;
        }
        i
    }

    pub fn draw(&mut self, frame: &mut Frame, ctx: &ScreenContext) {
        let area = frame.area();
        let from = self.first_visible();
        for screen in self.screens.iter_mut().skip(from) {
            screen.draw(frame, area, ctx);
        }
    }
}

impl Drop for ScreenStack {
    fn drop(&mut self) {
        while self.pop().is_some() {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<String>>>;

    struct Probe {
        name: &'static str,
        overlay: bool,
        log: Log,
        on_update: Option<fn() -> Transition>,
    }

    impl Probe {
        fn boxed(name: &'static str, overlay: bool, log: &Log) -> Box<dyn Screen> {
            Box::new(Self {
                name,
                overlay,
                log: log.clone(),
                on_update: None,
            })
        }
    }

    impl Screen for Probe {
        fn name(&self) -> &'static str {
            self.name
        }

        fn update(&mut self, _dt: f32, _ctx: &ScreenContext) -> Transition {
            self.log.borrow_mut().push(format!("update:{}", self.name));
            self.on_update.map_or(Transition::Stay, |f| f())
        }

        fn draw(&mut self, _frame: &mut Frame, _area: Rect, _ctx: &ScreenContext) {
            self.log.borrow_mut().push(format!("draw:{}", self.name));
        }

        fn handle_event(&mut self, _event: &Event, _ctx: &ScreenContext) -> Transition {
            self.log.borrow_mut().push(format!("event:{}", self.name));
            Transition::Pop
        }

        fn teardown(&mut self) {
            self.log.borrow_mut().push(format!("teardown:{}", self.name));
        }

        fn draws_under(&self) -> bool {
            self.overlay
        }
    }

    fn key() -> Event {
        Event::Key(KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE))
    }

    #[test]
    fn test_only_top_screen_updates() {
        let log = Log::default();
        let mut stack = ScreenStack::new();
        stack.push(Probe::boxed("play", false, &log));
        stack.push(Probe::boxed("menu", true, &log));
        let ctx = ScreenContext::default();
        assert_eq!(stack.update(0.1, &ctx), Flow::Continue);
        assert_eq!(*log.borrow(), vec!["update:menu"]);
    }

    #[test]
    fn test_event_pops_top_and_tears_it_down() {
        let log = Log::default();
        let mut stack = ScreenStack::new();
        stack.push(Probe::boxed("play", false, &log));
        stack.push(Probe::boxed("menu", true, &log));
        let ctx = ScreenContext::default();
        assert_eq!(stack.handle_event(&key(), &ctx), Flow::Continue);
        assert_eq!(stack.names(), vec!["play"]);
        assert_eq!(*log.borrow(), vec!["event:menu", "teardown:menu"]);
        // Popping the last screen ends the loop.
        assert_eq!(stack.handle_event(&key(), &ctx), Flow::Quit);
        assert!(stack.is_empty());
    }

    #[test]
    fn test_replace_all_tears_down_everything() {
        let log = Log::default();
        let mut stack = ScreenStack::new();
        stack.push(Probe::boxed("play", false, &log));
        stack.push(Probe::boxed("over", true, &log));
        let flow = stack.apply(Transition::ReplaceAll(vec![
            Probe::boxed("play2", false, &log),
            Probe::boxed("menu", true, &log),
        ]));
        assert_eq!(flow, Flow::Continue);
        assert_eq!(stack.names(), vec!["play2", "menu"]);
        assert_eq!(*log.borrow(), vec!["teardown:over", "teardown:play"]);
    }

    #[test]
    fn test_update_transition_is_applied() {
        let log = Log::default();
        let mut stack = ScreenStack::new();
        stack.push(Box::new(Probe {
            name: "play",
            overlay: false,
            log: log.clone(),
            on_update: Some(|| Transition::Quit),
        }));
        assert_eq!(stack.update(0.0, &ScreenContext::default()), Flow::Quit);
        assert_eq!(stack.len(), 1);
    }

    #[test]
    fn test_overlays_draw_over_lower_screens() {
        let log = Log::default();
        let mut stack = ScreenStack::new();
        stack.push(Probe::boxed("play", false, &log));
        stack.push(Probe::boxed("tutorial", false, &log));
        stack.push(Probe::boxed("hint", true, &log));
        let ctx = ScreenContext::default();
        let mut terminal = Terminal::new(TestBackend::new(20, 5)).unwrap();
        terminal.draw(|f| stack.draw(f, &ctx)).unwrap();
        // The opaque tutorial hides the board beneath it.
        assert_eq!(*log.borrow(), vec!["draw:tutorial", "draw:hint"]);
    }
}
