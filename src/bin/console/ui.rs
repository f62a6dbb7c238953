//! Console rendering
//!
//! The game display takes one terminal cell per pixel inside a bordered block titled with the
//! current state. A status line underneath shows the key legend, or the error that halted the
//! game. Displays larger than the terminal are clipped. A powered-off console shows an empty
//! screen.

use super::app::App;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;
use retro::runtime::Display;

const ON: char = '█';
const OFF: char = ' ';

pub fn render(frame: &mut Frame, app: &App) {
    let display = app.game().display();
    let height = u16::try_from(display.height()).unwrap_or(u16::MAX);
    let [screen_area, status_area] = Layout::vertical([
        Constraint::Length(height.saturating_add(2)),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    render_screen(frame, screen_area, app, display);
    render_status(frame, status_area, app);
}

fn render_screen(frame: &mut Frame, area: Rect, app: &App, display: &Display) {
    let width = u16::try_from(display.width()).unwrap_or(u16::MAX);
    let area = Rect {
        width: area.width.min(width.saturating_add(2)),
        ..area
    };
    let (title, lines) = if app.is_powered() {
        (app.game().current_state().to_string(), pixel_lines(display))
    } else {
        ("off".to_string(), Vec::new())
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {title} "));
    let paragraph = Paragraph::new(lines).block(block);
    frame.render_widget(paragraph, area);
}

fn render_status(frame: &mut Frame, area: Rect, app: &App) {
    let status = match app.error() {
        Some(err) => Line::styled(format!("halted: {err}"), Style::default().fg(Color::Red)),
        None if !app.is_powered() => Line::styled(
            format!("power off  {}", app.bindings().legend()),
            Style::default().fg(Color::DarkGray),
        ),
        None => Line::styled(
            format!("tick {}  {}", app.ticks(), app.bindings().legend()),
            Style::default().fg(Color::DarkGray),
        ),
    };
    frame.render_widget(Paragraph::new(status), area);
}

fn pixel_lines(display: &Display) -> Vec<Line<'static>> {
    display
        .rows()
        .map(|row| {
            row.iter()
                .map(|&on| if on { ON } else { OFF })
                .collect::<String>()
        })
        .map(Line::from)
        .collect()
}
