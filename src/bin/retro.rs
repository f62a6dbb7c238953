//! Command-line interface for retro
//! This binary compiles retro game programs, plays them in the terminal and prints the
//! intermediate stages of the compiler.
//!
//! Usage:
//!   retro run `<path>` [--width W] [--height H] [--fps F] [--seed N] [--config FILE]  - Play a game
//!   retro check `<path>`                                   - Compile only and report the first error
//!   retro dump `<path>` --stage tokens|tree|grammar|tables - Print an intermediate stage
//!   retro frames `<path>` --ticks N                         - Run headless and print the display
mod console;

use clap::{value_parser, Arg, ArgMatches, Command};
use retro::language;
use retro::pipeline::{CompileError, Compiler};
use retro::runtime::GameSettings;
use retro_config::{Loader, RetroConfig};
use std::process;

fn settings_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("path")
                .help("Path to the game program")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("width")
                .long("width")
                .help("Display width in pixels")
                .value_parser(value_parser!(u32)),
        )
        .arg(
            Arg::new("height")
                .long("height")
                .help("Display height in pixels")
                .value_parser(value_parser!(u32)),
        )
        .arg(
            Arg::new("fps")
                .long("fps")
                .help("Ticks per second")
                .value_parser(value_parser!(u32)),
        )
        .arg(
            Arg::new("seed")
                .long("seed")
                .help("Seed for random expressions")
                .value_parser(value_parser!(u64)),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help("Configuration file layered over the defaults"),
        )
}

fn main() {
    let matches = Command::new("retro")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Compile and play retro handheld games")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(settings_args(
            Command::new("run").about("Compile a game and play it in the terminal"),
        ))
        .subcommand(settings_args(
            Command::new("check").about("Compile a game and report the first error"),
        ))
        .subcommand(settings_args(
            Command::new("dump")
                .about("Print an intermediate compiler stage")
                .arg(
                    Arg::new("stage")
                        .long("stage")
                        .short('s')
                        .help("Stage to print")
                        .value_parser(["tokens", "tree", "grammar", "tables"])
                        .default_value("tree"),
                ),
        ))
        .subcommand(settings_args(
            Command::new("frames")
                .about("Run a game headless and print the final display")
                .arg(
                    Arg::new("ticks")
                        .long("ticks")
                        .short('n')
                        .help("Number of ticks to run")
                        .value_parser(value_parser!(u64))
                        .default_value("1"),
                ),
        ))
        .get_matches();

    // Log output would garble the console, so it stays off there unless asked for
    let default_filter = match matches.subcommand_name() {
        Some("run") => "off",
        _ => "warn",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    match matches.subcommand() {
        Some(("run", run_matches)) => handle_run_command(run_matches),
        Some(("check", check_matches)) => handle_check_command(check_matches),
        Some(("dump", dump_matches)) => handle_dump_command(dump_matches),
        Some(("frames", frames_matches)) => handle_frames_command(frames_matches),
        _ => unreachable!(),
    }
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", message);
    process::exit(1);
}

/// Load the configuration with command line flags layered on top
fn load_config(matches: &ArgMatches) -> RetroConfig {
    let mut loader = Loader::new();
    if let Some(path) = matches.get_one::<String>("config") {
        loader = loader.with_file(path);
    }
    let overrides = [
        ("display.width", matches.get_one::<u32>("width").map(|v| i64::from(*v))),
        ("display.height", matches.get_one::<u32>("height").map(|v| i64::from(*v))),
        ("display.fps", matches.get_one::<u32>("fps").map(|v| i64::from(*v))),
    ];
    for (key, value) in overrides {
        if let Some(value) = value {
            loader = loader
                .set_override(key, value)
                .unwrap_or_else(|e| fail(format!("invalid override {key}: {e}")));
        }
    }
    if let Some(seed) = matches.get_one::<u64>("seed") {
        let seed = i64::try_from(*seed).unwrap_or_else(|_| fail("seed must fit in 63 bits"));
        loader = loader
            .set_override("runtime.seed", seed)
            .unwrap_or_else(|e| fail(format!("invalid seed: {e}")));
    }
    loader
        .build()
        .unwrap_or_else(|e| fail(format!("failed to load configuration: {e}")))
}

fn game_settings(config: &RetroConfig) -> GameSettings {
    GameSettings {
        width: config.display.width,
        height: config.display.height,
        fps: config.display.fps,
        seed: config.runtime.seed,
    }
}

fn read_source(matches: &ArgMatches) -> (String, String) {
    let path = matches
        .get_one::<String>("path")
        .cloned()
        .unwrap_or_default();
    let source = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| fail(format!("failed to read {path}: {e}")));
    (path, source)
}

fn compiler(config: &RetroConfig) -> Compiler {
    Compiler::new(game_settings(config)).unwrap_or_else(|e| fail(e))
}

fn report(path: &str, err: &CompileError) -> ! {
    match err.position() {
        Some(position) => fail(format!("{path}:{position}: {err}")),
        None => fail(format!("{path}: {err}")),
    }
}

/// Handle the run command
fn handle_run_command(matches: &ArgMatches) {
    let config = load_config(matches);
    let (path, source) = read_source(matches);
    let game = compiler(&config)
        .compile(&source)
        .unwrap_or_else(|e| report(&path, &e));
    let bindings =
        console::keys::KeyBindings::from_config(&config.keys).unwrap_or_else(|e| fail(e));

    match console::console_main::run_console(game, bindings) {
        Ok(None) => {}
        Ok(Some(err)) => fail(format!("{path}: {err}")),
        Err(e) => fail(e),
    }
}

/// Handle the check command
fn handle_check_command(matches: &ArgMatches) {
    let config = load_config(matches);
    let (path, source) = read_source(matches);
    let game = compiler(&config)
        .compile(&source)
        .unwrap_or_else(|e| report(&path, &e));
    println!(
        "{path}: ok ({} states, {} shapes, starts in {})",
        game.states().len(),
        game.shapes().len(),
        game.initial_state()
    );
}

/// Handle the dump command
fn handle_dump_command(matches: &ArgMatches) {
    let config = load_config(matches);
    let stage = matches
        .get_one::<String>("stage")
        .map(String::as_str)
        .unwrap_or("tree");

    if stage == "grammar" {
        print!("{}", language::grammar());
        return;
    }

    let compiler = compiler(&config);
    let output = match stage {
        "tables" => serde_json::to_string_pretty(compiler.tables()),
        "tokens" => {
            let (path, source) = read_source(matches);
            let tokens = compiler
                .tokens(&source)
                .unwrap_or_else(|e| report(&path, &e));
            serde_json::to_string_pretty(&tokens)
        }
        _ => {
            let (path, source) = read_source(matches);
            let tree = compiler
                .parse_tree(&source)
                .unwrap_or_else(|e| report(&path, &e));
            serde_json::to_string_pretty(&tree)
        }
    };
    match output {
        Ok(json) => println!("{json}"),
        Err(e) => fail(format!("failed to serialize {stage}: {e}")),
    }
}

/// Handle the frames command
fn handle_frames_command(matches: &ArgMatches) {
    let config = load_config(matches);
    let (path, source) = read_source(matches);
    let ticks = matches.get_one::<u64>("ticks").copied().unwrap_or(1);
    let mut game = compiler(&config)
        .compile(&source)
        .unwrap_or_else(|e| report(&path, &e));

    for tick in 1..=ticks {
        if let Err(e) = game.tick() {
            fail(format!("{path}: tick {tick}: {e}"));
        }
    }
    println!("{}", game.display().render());
    log::info!("stopped in {} after {ticks} ticks", game.current_state());
}
