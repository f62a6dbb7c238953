//! Property-based tests across the whole pipeline
//!
//! Small generated programs are compiled and run, checking the arithmetic, random ranges and
//! display rules end to end. The lexer and parser are also fed arbitrary text to make sure they
//! fail with errors rather than panics.

use proptest::prelude::*;
use retro::pipeline::{compile, Compiler};
use retro::runtime::{Display, GameSettings, Shape};

fn settings() -> GameSettings {
    GameSettings {
        width: 16,
        height: 8,
        fps: 10,
        seed: Some(99),
    }
}

/// Run a single-state program for one tick and read `$out`
fn run_assignment(expression: &str) -> i64 {
    let source = format!("~main\n~main {{\n  $out = {expression}\n}}\n");
    let mut game = compile(&source, settings()).unwrap();
    game.tick().unwrap();
    game.variable("$out")
}

proptest! {
    #[test]
    fn literals_are_assigned(value in 0i64..1_000_000) {
        prop_assert_eq!(run_assignment(&format!("[{value}]")), value);
        prop_assert_eq!(run_assignment(&format!("[-{value}]")), -value);
    }

    #[test]
    fn multiplication_binds_tighter(a in 0i64..1000, b in 0i64..1000, c in 0i64..1000) {
        prop_assert_eq!(run_assignment(&format!("[{a} + {b} * {c}]")), a + b * c);
        prop_assert_eq!(run_assignment(&format!("[({a} + {b}) * {c}]")), (a + b) * c);
        prop_assert_eq!(run_assignment(&format!("[{a} - {b} - {c}]")), a - b - c);
    }

    #[test]
    fn division_floors_for_positive_divisors(a in -10_000i64..10_000, b in 1i64..100) {
        let quotient = run_assignment(&format!("[({a}) / {b}]"));
        let remainder = run_assignment(&format!("[({a}) % {b}]"));
        prop_assert_eq!(quotient, a.div_euclid(b));
        prop_assert_eq!(remainder, a.rem_euclid(b));
    }

    #[test]
    fn random_ranges_are_inclusive(low in -50i64..50, span in 0i64..20) {
        let high = low + span;
        let source = format!("~main\n~main {{\n  $d = r [{low}] [{high}]\n}}\n");
        let mut game = compile(&source, settings()).unwrap();
        for _ in 0..10 {
            game.tick().unwrap();
            let d = game.variable("$d");
            prop_assert!((low..=high).contains(&d), "{} outside {}..={}", d, low, high);
        }
    }

    #[test]
    fn transparent_shapes_change_nothing(x in -40i64..40, y in -40i64..40, w in 1usize..6, h in 1usize..6) {
        let mut display = Display::new(16, 8);
        display.overlay(&Shape::parse("#+#\n.#.").unwrap(), 3, 2);
        let before = display.clone();

        let blank = vec![".".repeat(w); h].join("\n");
        display.overlay(&Shape::parse(&blank).unwrap(), x, y);
        prop_assert_eq!(display, before);
    }

    #[test]
    fn clearing_twice_is_clearing_once(x in -4i64..20, y in -4i64..10) {
        let mut display = Display::new(16, 8);
        display.overlay(&Shape::parse("##\n##").unwrap(), x, y);
        display.clear();
        let once = display.clone();
        display.clear();
        prop_assert_eq!(once.lit_count(), 0);
        prop_assert_eq!(display, once);
    }

    #[test]
    fn arbitrary_text_never_panics(source in "\\PC{0,80}") {
        let compiler = Compiler::new(settings()).unwrap();
        let _ = compiler.tokens(&source);
        let _ = compiler.parse_tree(&source);
        let _ = compiler.compile(&source);
    }

    #[test]
    fn variable_names_round_trip(name in "[a-z_][a-z0-9_]{0,12}", value in 0i64..1000) {
        let source = format!("~main\n~main {{\n  ${name} = [{value}]\n}}\n");
        let mut game = compile(&source, settings()).unwrap();
        game.tick().unwrap();
        prop_assert_eq!(game.variable(&format!("${name}")), value);
    }
}
