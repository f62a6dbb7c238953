//! Key bindings
//!
//! Maps terminal keys to console commands. Key names come from the `[keys]` table of the
//! configuration: a single character, or one of the named keys listed in [`parse_key`].

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use retro::runtime::Button;
use retro_config::KeysConfig;
use std::collections::HashMap;
use std::fmt;

/// What a key press asks the console to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Press(Button),
    /// Toggle the console on and off
    Power,
    Reset,
    Quit,
}

/// A key name in the configuration that cannot be used
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingError {
    UnknownKey { action: &'static str, name: String },
    Duplicate { first: &'static str, second: &'static str },
}

impl fmt::Display for BindingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindingError::UnknownKey { action, name } => {
                write!(f, "Unknown key '{name}' bound to {action}")
            }
            BindingError::Duplicate { first, second } => {
                write!(f, "{first} and {second} are bound to the same key")
            }
        }
    }
}

impl std::error::Error for BindingError {}

/// Parse a configured key name
pub fn parse_key(name: &str) -> Option<KeyCode> {
    let mut chars = name.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Some(KeyCode::Char(c.to_ascii_lowercase()));
    }
    match name.to_ascii_lowercase().as_str() {
        "space" => Some(KeyCode::Char(' ')),
        "enter" => Some(KeyCode::Enter),
        "esc" => Some(KeyCode::Esc),
        "tab" => Some(KeyCode::Tab),
        "backspace" => Some(KeyCode::Backspace),
        "up" => Some(KeyCode::Up),
        "down" => Some(KeyCode::Down),
        "left" => Some(KeyCode::Left),
        "right" => Some(KeyCode::Right),
        _ => None,
    }
}

#[derive(Debug, Clone)]
pub struct KeyBindings {
    commands: HashMap<KeyCode, (&'static str, Command)>,
}

impl KeyBindings {
    pub fn from_config(keys: &KeysConfig) -> Result<Self, BindingError> {
        let entries = [
            ("x", &keys.x, Command::Press(Button::X)),
            ("y", &keys.y, Command::Press(Button::Y)),
            ("a", &keys.a, Command::Press(Button::A)),
            ("b", &keys.b, Command::Press(Button::B)),
            ("start", &keys.start, Command::Press(Button::Start)),
            ("power", &keys.power, Command::Power),
            ("reset", &keys.reset, Command::Reset),
            ("quit", &keys.quit, Command::Quit),
        ];

        let mut commands = HashMap::new();
        for (action, name, command) in entries {
            let code = parse_key(name).ok_or_else(|| BindingError::UnknownKey {
                action,
                name: name.clone(),
            })?;
            if let Some((first, _)) = commands.insert(code, (action, command)) {
                return Err(BindingError::Duplicate {
                    first,
                    second: action,
                });
            }
        }
        Ok(Self { commands })
    }

    /// Command for a key event; Ctrl+C always quits
    pub fn command(&self, key: KeyEvent) -> Option<Command> {
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(Command::Quit)
            }
            KeyCode::Char(c) => self
                .commands
                .get(&KeyCode::Char(c.to_ascii_lowercase()))
                .map(|(_, command)| *command),
            code => self.commands.get(&code).map(|(_, command)| *command),
        }
    }

    /// Key legend for the status line, in button order
    pub fn legend(&self) -> String {
        let mut entries: Vec<(&'static str, KeyCode)> = self
            .commands
            .iter()
            .map(|(code, (action, _))| (*action, *code))
            .collect();
        let order = ["x", "y", "a", "b", "start", "power", "reset", "quit"];
        entries.sort_by_key(|(action, _)| order.iter().position(|o| o == action));
        entries
            .into_iter()
            .map(|(action, code)| format!("{action}:{}", key_label(code)))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn key_label(code: KeyCode) -> String {
    match code {
        KeyCode::Char(' ') => "space".to_string(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "enter".to_string(),
        KeyCode::Esc => "esc".to_string(),
        KeyCode::Tab => "tab".to_string(),
        KeyCode::Backspace => "backspace".to_string(),
        KeyCode::Up => "up".to_string(),
        KeyCode::Down => "down".to_string(),
        KeyCode::Left => "left".to_string(),
        KeyCode::Right => "right".to_string(),
        other => format!("{other:?}"),
    }
}
