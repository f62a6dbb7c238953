//! Console main loop
//!
//! Runs a compiled game in the terminal. The loop draws every iteration, polls for key events
//! until the next frame is due and then ticks the game once, so the game advances at its
//! configured frame rate regardless of input.

use crossterm::event::{self, Event, KeyEventKind};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use ratatui::prelude::*;
use retro::runtime::{Game, RuntimeError};
use std::io;
use std::time::{Duration, Instant};

use super::app::App;
use super::keys::KeyBindings;
use super::ui;

/// Play `game` until the quit key is pressed
///
/// Returns the runtime error that halted the game, if one did.
pub fn run_console(game: Game, bindings: KeyBindings) -> io::Result<Option<RuntimeError>> {
    let frame = Duration::from_secs_f64(1.0 / f64::from(game.fps()));
    let mut app = App::new(game, bindings);

    // Setup terminal
    enable_raw_mode()?;
    let stdout = io::stdout();
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = run_app(&mut terminal, &mut app, frame);

    // Restore terminal
    disable_raw_mode()?;
    terminal.clear()?;
    terminal.show_cursor()?;

    result?;
    Ok(app.into_error())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    frame: Duration,
) -> io::Result<()> {
    let mut next_tick = Instant::now();
    loop {
        terminal.draw(|f| ui::render(f, app))?;

        let timeout = next_tick.saturating_duration_since(Instant::now());
        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    app.handle_key(key);
                    if app.should_quit() {
                        return Ok(());
                    }
                }
                // Resizes are picked up by the next draw
                _ => {}
            }
        }

        let now = Instant::now();
        if now >= next_tick {
            app.tick();
            next_tick += frame;
            // Skip frames rather than bursting after a stall
            if next_tick < now {
                next_tick = now + frame;
            }
        }
    }
}
