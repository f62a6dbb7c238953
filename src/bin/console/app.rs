//! Console application state
//!
//! The App owns the running game and turns key events into button presses, resets and quits.
//! A runtime error halts the game: the last frame stays on screen, the error is shown in the
//! status line and only the reset and quit keys keep working.
//!
//! The power key switches the console off and on again. Switching off resets the game; while off
//! nothing ticks, the screen stays dark and only the power and quit keys do anything.

use super::keys::{Command, KeyBindings};
use crossterm::event::KeyEvent;
use retro::runtime::{Game, RuntimeError};

pub struct App {
    game: Game,
    bindings: KeyBindings,
    error: Option<RuntimeError>,
    ticks: u64,
    powered: bool,
    should_quit: bool,
}

impl App {
    pub fn new(game: Game, bindings: KeyBindings) -> Self {
        App {
            game,
            bindings,
            error: None,
            ticks: 0,
            powered: true,
            should_quit: false,
        }
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }

    pub fn error(&self) -> Option<&RuntimeError> {
        self.error.as_ref()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn is_powered(&self) -> bool {
        self.powered
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Consume the app, handing back the error that halted the game, if any
    pub fn into_error(self) -> Option<RuntimeError> {
        self.error
    }

    /// Advance the game by one frame
    pub fn tick(&mut self) {
        if !self.powered || self.error.is_some() {
            return;
        }
        match self.game.tick() {
            Ok(()) => self.ticks += 1,
            Err(err) => self.halt(err),
        }
    }

    /// Handle a keyboard event
    ///
    /// Returns whether the state changed
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        match self.bindings.command(key) {
            Some(Command::Quit) => {
                self.should_quit = true;
                true
            }
            Some(Command::Power) => {
                self.powered = !self.powered;
                if self.powered {
                    log::info!("power on");
                } else {
                    log::info!("power off");
                    self.restart();
                }
                true
            }
            Some(Command::Reset) if self.powered => {
                log::info!("reset");
                self.restart();
                true
            }
            Some(Command::Press(button)) if self.powered && self.error.is_none() => {
                if let Err(err) = self.game.press(button) {
                    self.halt(err);
                }
                true
            }
            _ => false,
        }
    }

    fn restart(&mut self) {
        self.game.reset();
        self.error = None;
        self.ticks = 0;
    }

    fn halt(&mut self, err: RuntimeError) {
        log::error!("game halted after {} ticks: {}", self.ticks, err);
        self.error = Some(err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};
    use retro::pipeline::compile;
    use retro::runtime::GameSettings;

    const PROGRAM: &str = "~main
~main {
  $t = [$t + 1]
  @A {
    $a = [$a + 1]
  }
  @B {
    goto ~missing
  }
}
";

    fn app() -> App {
        let settings = GameSettings {
            width: 4,
            height: 4,
            fps: 10,
            seed: Some(3),
        };
        let game = compile(PROGRAM, settings).unwrap();
        let keys = retro_config::load_defaults().unwrap().keys;
        App::new(game, KeyBindings::from_config(&keys).unwrap())
    }

    fn press(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
    }

    #[test]
    fn test_ticks_and_presses() {
        let mut app = app();
        app.tick();
        app.tick();
        assert!(app.handle_key(press('z')));
        assert!(!app.handle_key(press('w')));

        assert_eq!(app.ticks(), 2);
        assert_eq!(app.game().variable("$t"), 2);
        assert_eq!(app.game().variable("$a"), 1);
        assert!(!app.should_quit());
    }

    #[test]
    fn test_runtime_error_halts_until_reset() {
        let mut app = app();
        app.tick();
        app.handle_key(press('x'));
        app.tick();
        assert_eq!(
            app.error(),
            Some(&RuntimeError::UnknownState("~missing".to_string()))
        );

        // Halted: ticks and buttons are ignored
        app.tick();
        app.handle_key(press('z'));
        assert_eq!(app.game().variable("$a"), 0);
        assert_eq!(app.ticks(), 1);

        app.handle_key(press('r'));
        assert_eq!(app.error(), None);
        assert_eq!(app.game().current_state(), "~main");
        app.tick();
        assert_eq!(app.game().variable("$t"), 1);
    }

    #[test]
    fn test_power_off_resets_and_freezes() {
        let mut app = app();
        app.tick();
        app.tick();
        app.handle_key(press('z'));
        assert_eq!(app.game().variable("$t"), 2);

        assert!(app.handle_key(press('p')));
        assert!(!app.is_powered());
        assert_eq!(app.ticks(), 0);
        assert_eq!(app.game().variable("$t"), 0);
        assert_eq!(app.game().variable("$a"), 0);

        // Off: nothing ticks and buttons do nothing
        app.tick();
        assert!(!app.handle_key(press('z')));
        assert!(!app.handle_key(press('r')));
        assert_eq!(app.ticks(), 0);
        assert_eq!(app.game().variable("$t"), 0);
        assert_eq!(app.game().variable("$a"), 0);

        app.handle_key(press('p'));
        assert!(app.is_powered());
        app.tick();
        assert_eq!(app.game().variable("$t"), 1);
    }

    #[test]
    fn test_power_off_clears_a_halt() {
        let mut app = app();
        app.handle_key(press('x'));
        app.tick();
        assert!(app.error().is_some());

        app.handle_key(press('p'));
        app.handle_key(press('p'));
        assert_eq!(app.error(), None);
        assert_eq!(app.game().current_state(), "~main");
    }

    #[test]
    fn test_quit() {
        let mut app = app();
        app.handle_key(press('q'));
        assert!(app.should_quit());
        assert_eq!(app.into_error(), None);
    }
}
