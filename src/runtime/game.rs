//! Game state machine

use super::statement::execute_block;
use super::{Button, Display, RuntimeError, Shape, Shapes, Statement};
use crate::expression::Environment;
use indexmap::IndexMap;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Display geometry, frame rate and random seed of a game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSettings {
    pub width: usize,
    pub height: usize,
    pub fps: u32,
    /// Fixed seed for `r` expressions; drawn from entropy when absent
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            width: 30,
            height: 30,
            fps: 30,
            seed: None,
        }
    }
}

/// Largest accepted display width or height
pub const MAX_DIMENSION: usize = 4096;

/// Settings a game cannot run with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidSettings {
    /// A zero width, height or frame rate
    Zero { field: &'static str },
    /// A display side above [`MAX_DIMENSION`]
    TooLarge { field: &'static str, value: usize },
}

impl InvalidSettings {
    pub fn field(&self) -> &'static str {
        match self {
            InvalidSettings::Zero { field } | InvalidSettings::TooLarge { field, .. } => field,
        }
    }
}

impl fmt::Display for InvalidSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidSettings::Zero { field } => write!(
                f,
                "Width, height and FPS must be positive integers ({field} is 0)"
            ),
            InvalidSettings::TooLarge { field, value } => write!(
                f,
                "Display {field} {value} is larger than {MAX_DIMENSION} pixels"
            ),
        }
    }
}

impl std::error::Error for InvalidSettings {}

impl GameSettings {
    pub fn validate(&self) -> Result<(), InvalidSettings> {
        let zeros = [
            ("width", self.width == 0),
            ("height", self.height == 0),
            ("fps", self.fps == 0),
        ];
        if let Some((field, _)) = zeros.into_iter().find(|(_, zero)| *zero) {
            return Err(InvalidSettings::Zero { field });
        }
        let sides = [("width", self.width), ("height", self.height)];
        match sides.into_iter().find(|(_, value)| *value > MAX_DIMENSION) {
            Some((field, value)) => Err(InvalidSettings::TooLarge { field, value }),
            None => Ok(()),
        }
    }

    /// `!W`, `!H` and `!FPS`
    fn constants(&self) -> HashMap<String, i64> {
        let to_i64 = |value: usize| i64::try_from(value).unwrap_or(i64::MAX);
        HashMap::from([
            ("!W".to_string(), to_i64(self.width)),
            ("!H".to_string(), to_i64(self.height)),
            ("!FPS".to_string(), i64::from(self.fps)),
        ])
    }
}

/// A named state: statements run every tick plus button handlers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameState {
    statements: Vec<Statement>,
    handlers: BTreeMap<Button, Vec<Statement>>,
}

impl GameState {
    pub fn new(statements: Vec<Statement>, handlers: BTreeMap<Button, Vec<Statement>>) -> Self {
        Self {
            statements,
            handlers,
        }
    }

    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    pub fn handler(&self, button: Button) -> Option<&[Statement]> {
        self.handlers.get(&button).map(Vec::as_slice)
    }

    pub fn handlers(&self) -> &BTreeMap<Button, Vec<Statement>> {
        &self.handlers
    }
}

/// The mutable half of a game: variables, display, current state and random source
#[derive(Debug)]
pub struct Machine {
    variables: HashMap<String, i64>,
    constants: HashMap<String, i64>,
    display: Display,
    current: String,
    rng: StdRng,
}

impl Machine {
    fn new(settings: &GameSettings, initial: &str) -> Self {
        let rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            variables: HashMap::new(),
            constants: settings.constants(),
            display: Display::new(settings.width, settings.height),
            current: initial.to_string(),
            rng,
        }
    }

    /// Unset variables read as 0
    pub fn variable(&self, name: &str) -> i64 {
        self.variables.get(name).copied().unwrap_or(0)
    }

    pub fn set_variable(&mut self, name: &str, value: i64) {
        self.variables.insert(name.to_string(), value);
    }

    /// Variables that have been assigned, sorted by name
    pub fn variables(&self) -> BTreeMap<&str, i64> {
        self.variables
            .iter()
            .map(|(name, value)| (name.as_str(), *value))
            .collect()
    }

    pub fn display(&self) -> &Display {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut Display {
        &mut self.display
    }

    pub fn current_state(&self) -> &str {
        &self.current
    }

    /// Switch states; the target is only resolved when it next runs
    pub fn jump_to_state(&mut self, target: &str) {
        log::debug!("goto {} -> {}", self.current, target);
        self.current = target.to_string();
    }

    fn reset(&mut self, initial: &str) {
        self.variables.clear();
        self.display.clear();
        self.current = initial.to_string();
    }
}

impl Environment for Machine {
    fn variable(&self, name: &str) -> i64 {
        Machine::variable(self, name)
    }

    fn constant(&self, name: &str) -> Option<i64> {
        self.constants.get(name).copied()
    }

    fn random_range(&mut self, low: i64, high: i64) -> i64 {
        self.rng.gen_range(low..=high)
    }
}

/// A compiled, runnable game
#[derive(Debug)]
pub struct Game {
    states: IndexMap<String, GameState>,
    shapes: Shapes,
    initial: String,
    settings: GameSettings,
    machine: Machine,
}

fn lookup<'s>(
    states: &'s IndexMap<String, GameState>,
    name: &str,
) -> Result<&'s GameState, RuntimeError> {
    states
        .get(name)
        .ok_or_else(|| RuntimeError::UnknownState(name.to_string()))
}

impl Game {
    pub fn new(
        states: IndexMap<String, GameState>,
        initial: impl Into<String>,
        shapes: Shapes,
        settings: GameSettings,
    ) -> Self {
        let initial = initial.into();
        let machine = Machine::new(&settings, &initial);
        Self {
            states,
            shapes,
            initial,
            settings,
            machine,
        }
    }

    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    pub fn width(&self) -> usize {
        self.settings.width
    }

    pub fn height(&self) -> usize {
        self.settings.height
    }

    pub fn fps(&self) -> u32 {
        self.settings.fps
    }

    pub fn initial_state(&self) -> &str {
        &self.initial
    }

    pub fn current_state(&self) -> &str {
        self.machine.current_state()
    }

    pub fn state(&self, name: &str) -> Option<&GameState> {
        self.states.get(name)
    }

    pub fn states(&self) -> &IndexMap<String, GameState> {
        &self.states
    }

    pub fn shape(&self, name: &str) -> Option<&Shape> {
        self.shapes.get(name)
    }

    pub fn shapes(&self) -> &Shapes {
        &self.shapes
    }

    pub fn display(&self) -> &Display {
        self.machine.display()
    }

    pub fn machine(&self) -> &Machine {
        &self.machine
    }

    pub fn variable(&self, name: &str) -> i64 {
        self.machine.variable(name)
    }

    pub fn set_variable(&mut self, name: &str, value: i64) {
        self.machine.set_variable(name, value);
    }

    pub fn constant(&self, name: &str) -> Option<i64> {
        self.machine.constant(name)
    }

    pub fn jump_to_state(&mut self, target: &str) {
        self.machine.jump_to_state(target);
    }

    /// Zero every variable, clear the display and return to the initial state
    pub fn reset(&mut self) {
        self.machine.reset(&self.initial);
    }

    /// Run the current state's statements once
    pub fn tick(&mut self) -> Result<(), RuntimeError> {
        let state = lookup(&self.states, self.machine.current_state())?;
        execute_block(&state.statements, &mut self.machine, &self.shapes)?;
        Ok(())
    }

    /// Run the current state's handler for `button`, if it has one
    pub fn press(&mut self, button: Button) -> Result<(), RuntimeError> {
        let state = lookup(&self.states, self.machine.current_state())?;
        if let Some(handler) = state.handlers.get(&button) {
            log::trace!("{} pressed in {}", button, self.machine.current_state());
            execute_block(handler, &mut self.machine, &self.shapes)?;
        }
        Ok(())
    }

    pub fn on_x_press(&mut self) -> Result<(), RuntimeError> {
        self.press(Button::X)
    }

    pub fn on_y_press(&mut self) -> Result<(), RuntimeError> {
        self.press(Button::Y)
    }

    pub fn on_a_press(&mut self) -> Result<(), RuntimeError> {
        self.press(Button::A)
    }

    pub fn on_b_press(&mut self) -> Result<(), RuntimeError> {
        self.press(Button::B)
    }

    pub fn on_start_press(&mut self) -> Result<(), RuntimeError> {
        self.press(Button::Start)
    }
}
