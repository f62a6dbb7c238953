use super::*;
use crate::expression::Expression;
use std::collections::BTreeMap;

fn expr(text: &str) -> Expression {
    Expression::parse(text).unwrap()
}

fn assign(variable: &str, text: &str) -> Statement {
    Statement::Assign {
        variable: variable.to_string(),
        value: expr(text),
    }
}

fn goto(target: &str) -> Statement {
    Statement::Goto {
        target: target.to_string(),
    }
}

fn settings() -> GameSettings {
    GameSettings {
        width: 6,
        height: 4,
        fps: 10,
        seed: Some(42),
    }
}

/// `~main` plus an empty `~other`
fn game_with(statements: Vec<Statement>, handlers: BTreeMap<Button, Vec<Statement>>) -> Game {
    let mut states = IndexMap::new();
    states.insert("~main".to_string(), GameState::new(statements, handlers));
    states.insert("~other".to_string(), GameState::default());

    let mut shapes = Shapes::new();
    shapes.insert("#box".to_string(), Shape::parse("##\n#+").unwrap());
    shapes.insert("#blank".to_string(), Shape::parse("...\n...").unwrap());

    Game::new(states, "~main", shapes, settings())
}

#[test]
fn test_goto_skips_the_rest_of_the_tick() {
    let mut game = game_with(
        vec![assign("$x", "[5]"), goto("~other"), assign("$y", "[1]")],
        BTreeMap::new(),
    );
    game.tick().unwrap();

    assert_eq!(game.variable("$x"), 5);
    assert_eq!(game.variable("$y"), 0);
    assert_eq!(game.current_state(), "~other");
}

#[test]
fn test_goto_in_nested_blocks_ends_the_whole_tick() {
    let inner = Statement::IfNot {
        condition: expr("[0]"),
        body: vec![goto("~other"), assign("$skipped", "[1]")],
    };
    let outer = Statement::If {
        condition: expr("[1]"),
        body: vec![inner, assign("$after_inner", "[1]")],
    };
    let mut game = game_with(
        vec![assign("$before", "[1]"), outer, assign("$after_outer", "[1]")],
        BTreeMap::new(),
    );
    game.tick().unwrap();

    assert_eq!(game.variable("$before"), 1);
    assert_eq!(game.variable("$skipped"), 0);
    assert_eq!(game.variable("$after_inner"), 0);
    assert_eq!(game.variable("$after_outer"), 0);
    assert_eq!(game.current_state(), "~other");
}

#[test]
fn test_false_conditions_continue() {
    let mut game = game_with(
        vec![
            Statement::If {
                condition: expr("[0]"),
                body: vec![goto("~other")],
            },
            Statement::IfNot {
                condition: expr("[3]"),
                body: vec![goto("~other")],
            },
            assign("$reached", "[1]"),
        ],
        BTreeMap::new(),
    );
    game.tick().unwrap();

    assert_eq!(game.variable("$reached"), 1);
    assert_eq!(game.current_state(), "~main");
}

#[test]
fn test_variables_persist_across_ticks() {
    let mut game = game_with(vec![assign("$n", "[$n + 1]")], BTreeMap::new());
    for _ in 0..3 {
        game.tick().unwrap();
    }
    assert_eq!(game.variable("$n"), 3);
}

#[test]
fn test_handlers_run_only_for_their_button() {
    let handlers = BTreeMap::from([
        (Button::A, vec![assign("$a", "[$a + 1]")]),
        (Button::Start, vec![goto("~other"), assign("$late", "[1]")]),
    ]);
    let mut game = game_with(vec![], handlers);

    game.on_a_press().unwrap();
    game.on_a_press().unwrap();
    game.on_b_press().unwrap();
    game.on_x_press().unwrap();
    game.on_y_press().unwrap();
    assert_eq!(game.variable("$a"), 2);
    assert_eq!(game.current_state(), "~main");

    game.on_start_press().unwrap();
    assert_eq!(game.variable("$late"), 0);
    assert_eq!(game.current_state(), "~other");

    // ~other has no handlers
    game.press(Button::A).unwrap();
    assert_eq!(game.variable("$a"), 2);
}

#[test]
fn test_unknown_state_fails_on_next_tick() {
    let mut game = game_with(vec![goto("~nowhere")], BTreeMap::new());

    game.tick().unwrap();
    assert_eq!(game.current_state(), "~nowhere");
    assert_eq!(
        game.tick(),
        Err(RuntimeError::UnknownState("~nowhere".to_string()))
    );
    assert_eq!(
        game.press(Button::X),
        Err(RuntimeError::UnknownState("~nowhere".to_string()))
    );
}

#[test]
fn test_unknown_shape() {
    let mut game = game_with(
        vec![Statement::Display {
            shape: "#ghost".to_string(),
            x: expr("[0]"),
            y: expr("[0]"),
        }],
        BTreeMap::new(),
    );
    assert_eq!(
        game.tick().unwrap_err().to_string(),
        "Shape #ghost is not defined"
    );
}

#[test]
fn test_evaluation_errors_surface() {
    let mut game = game_with(vec![assign("$x", "[1 / $zero]")], BTreeMap::new());
    assert!(matches!(game.tick(), Err(RuntimeError::Evaluation(_))));
}

#[test]
fn test_display_statements() {
    let display = |x: &str, y: &str| Statement::Display {
        shape: "#box".to_string(),
        x: expr(x),
        y: expr(y),
    };
    let mut game = game_with(
        vec![
            display("[0]", "[0]"),
            display("[!W - 1]", "[!H - 2]"),
            Statement::Display {
                shape: "#blank".to_string(),
                x: expr("[0]"),
                y: expr("[0]"),
            },
        ],
        BTreeMap::new(),
    );
    game.tick().unwrap();

    insta::assert_snapshot!(game.display().render(), @r"
    ##....
    ##....
    .....#
    .....#
    ");
}

#[test]
fn test_clear_statement() {
    let mut game = game_with(
        vec![
            Statement::Display {
                shape: "#box".to_string(),
                x: expr("[1]"),
                y: expr("[1]"),
            },
            Statement::Clear,
            Statement::Clear,
        ],
        BTreeMap::new(),
    );
    game.tick().unwrap();
    assert_eq!(game.display().lit_count(), 0);
}

#[test]
fn test_reset_restores_the_initial_configuration() {
    let mut game = game_with(
        vec![
            assign("$x", "[9]"),
            Statement::Display {
                shape: "#box".to_string(),
                x: expr("[2]"),
                y: expr("[1]"),
            },
            goto("~other"),
        ],
        BTreeMap::new(),
    );
    game.tick().unwrap();
    game.set_variable("$manual", 3);
    assert_ne!(game.display().lit_count(), 0);

    game.reset();

    assert_eq!(game.variable("$x"), 0);
    assert_eq!(game.variable("$manual"), 0);
    assert!(game.machine().variables().is_empty());
    assert_eq!(game.display().lit_count(), 0);
    assert_eq!(game.current_state(), "~main");
    assert_eq!(game.initial_state(), "~main");
}

#[test]
fn test_constants_follow_settings() {
    let game = game_with(vec![], BTreeMap::new());
    assert_eq!(game.constant("!W"), Some(6));
    assert_eq!(game.constant("!H"), Some(4));
    assert_eq!(game.constant("!FPS"), Some(10));
    assert_eq!(game.constant("!X"), None);
}

#[test]
fn test_seeded_games_roll_the_same_numbers() {
    let rolls = || {
        let mut game = game_with(vec![assign("$d", "[r 1 1000]")], BTreeMap::new());
        (0..10)
            .map(|_| {
                game.tick().unwrap();
                game.variable("$d")
            })
            .collect::<Vec<_>>()
    };
    let first = rolls();
    assert_eq!(first, rolls());
    assert!(first.iter().all(|d| (1..=1000).contains(d)));
}

#[test]
fn test_settings_validation() {
    assert!(GameSettings::default().validate().is_ok());
    let err = GameSettings {
        height: 0,
        ..GameSettings::default()
    }
    .validate()
    .unwrap_err();
    assert_eq!(err, InvalidSettings::Zero { field: "height" });
    assert_eq!(err.field(), "height");
}

#[test]
fn test_settings_reject_huge_displays() {
    let settings = GameSettings {
        width: 100_000,
        height: 100_000,
        ..GameSettings::default()
    };
    let err = settings.validate().unwrap_err();
    assert_eq!(
        err,
        InvalidSettings::TooLarge {
            field: "width",
            value: 100_000,
        }
    );
    assert_eq!(
        err.to_string(),
        "Display width 100000 is larger than 4096 pixels"
    );

    let edge = GameSettings {
        width: MAX_DIMENSION,
        height: 1,
        ..GameSettings::default()
    };
    assert!(edge.validate().is_ok());
}

#[test]
fn test_button_names() {
    assert_eq!(Button::from_handler_name("@START"), Some(Button::Start));
    assert_eq!(Button::from_handler_name("@Z"), None);
    assert_eq!("start".parse::<Button>(), Ok(Button::Start));
    assert_eq!("@x".parse::<Button>(), Ok(Button::X));
    assert!("power".parse::<Button>().is_err());
}
