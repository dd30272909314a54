//! Floorlight operator console
//!
//! Usage:
//!   floorlight                              # Interactive console, speech simulated
//!   floorlight --autostart                  # Start the dialogue immediately
//!   floorlight --config layout.json         # Custom pairs / LED table
//!   floorlight --manual-speech              # Speech ends only on `done`
//!   floorlight --json                       # JSON lines output
//!   floorlight < script.txt                 # Scripted run (`wait <ms>` between steps)

use std::path::PathBuf;

use clap::Parser;
use colored::Colorize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use floorlight::core::command::HELP;
use floorlight::core::{parse_command, Command, Installation, LedStrip, TerminalSpeaker, TokioTimers};
use floorlight::types::{DialogueState, Notice, RuntimeEvent};
use floorlight::{InstallationConfig, SPEECH_MS_PER_WORD, VERSION};

type Console = Installation<TerminalSpeaker, LedStrip, TokioTimers>;

#[derive(Parser, Debug)]
#[command(
    name = "floorlight",
    version = VERSION,
    about = "Floorlight - ground-pair buttons, floor LEDs and a spoken dialogue",
    long_about = "Floorlight drives an interactive installation from the terminal.\n\n\
                  Hold both buttons of a pair for the long-press threshold to pick\n\
                  a floor. The other pairs' buttons step that floor's LEDs up and down.\n\n\
                  States:\n  \
                  init               - clear the strip\n  \
                  waiting-for-ground - hold a pair to begin\n  \
                  welcome            - greeting, continues when speech ends\n  \
                  choose-*           - rain / wind / hour / pollution, one per floor switch"
)]
struct Args {
    /// JSON layout file (pairs, floor LEDs, stepper roles)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the long-press threshold (milliseconds)
    #[arg(long)]
    threshold_ms: Option<u64>,

    /// Simulated speech length per word (milliseconds)
    #[arg(long, default_value_t = SPEECH_MS_PER_WORD)]
    speech_ms_per_word: u64,

    /// Speech only ends on the `done` command
    #[arg(long)]
    manual_speech: bool,

    /// Start the dialogue without waiting for `start`
    #[arg(long)]
    autostart: bool,

    /// Output as JSON
    #[arg(long)]
    json: bool,

    /// Disable colors in output
    #[arg(long)]
    no_color: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Print the effective configuration and exit
    #[arg(long)]
    print_config: bool,
}

/// Lines from stdin, or its end
enum Input {
    Line(String),
    Closed,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_tracing(&args);

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    if args.print_config {
        println!("{}", serde_json::to_string_pretty(&config).unwrap());
        return;
    }

    run_console(config, &args).await;
}

fn init_tracing(args: &Args) {
    let default = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(!args.no_color)
        .init();
}

fn load_config(args: &Args) -> floorlight::Result<InstallationConfig> {
    let mut config = match &args.config {
        Some(path) => InstallationConfig::load(path)?,
        None => InstallationConfig::default(),
    };
    if let Some(ms) = args.threshold_ms {
        config.long_press_threshold_ms = ms;
        config.validate()?;
    }
    Ok(config)
}

/// Event loop: stdin commands, timer expiries and speech completions are
/// handled strictly one after another.
async fn run_console(config: InstallationConfig, args: &Args) {
    let (tx, mut rx) = mpsc::unbounded_channel::<RuntimeEvent>();
    let (line_tx, mut line_rx) = mpsc::unbounded_channel::<Input>();

    let speaker = TerminalSpeaker::new(tx.clone(), args.speech_ms_per_word, !args.manual_speech, args.no_color);
    let timers = TokioTimers::new(tx.clone());
    let strip = LedStrip::new(config.led_count);
    let threshold = config.long_press_threshold_ms;

    let mut installation = match Installation::new(config, speaker, strip, timers) {
        Ok(installation) => installation,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    tokio::spawn(read_stdin(line_tx));

    print_header(args.no_color);
    println!("Type 'start', then hold a pair, e.g. 'press 2 3', for {:.1}s. Type 'help' for commands.", threshold as f64 / 1000.0);
    println!();

    if args.autostart {
        dispatch(&mut installation, RuntimeEvent::Start, args);
    }
    let mut shown_generation = installation.sink().generation();
    print_strip(&installation, args);

    let mut stdin_open = true;
    loop {
        tokio::select! {
            Some(event) = rx.recv() => dispatch(&mut installation, event, args),
            input = line_rx.recv(), if stdin_open => match input {
                Some(Input::Line(line)) => match parse_command(&line) {
                    Ok(None) => {}
                    Ok(Some(Command::Quit)) => break,
                    Ok(Some(Command::Help)) => println!("{}", HELP),
                    Ok(Some(Command::State)) => print_state(&installation, args),
                    Ok(Some(Command::Leds)) => print_strip(&installation, args),
                    Ok(Some(command)) => {
                        for event in command.events() {
                            dispatch(&mut installation, event, args);
                        }
                    }
                    Err(e) => print_warning(&e.to_string(), args.no_color),
                },
                Some(Input::Closed) | None => stdin_open = false,
            },
        }

        if installation.sink().generation() != shown_generation {
            shown_generation = installation.sink().generation();
            print_strip(&installation, args);
        }

        // scripted runs: drain timers and speech before leaving
        let snapshot = installation.snapshot();
        if !stdin_open && snapshot.pending_timers == 0 && (!snapshot.speaking || args.manual_speech) {
            break;
        }
    }

    println!("\nSession ended. State: {}", installation.dialogue().state());
}

/// Forward stdin lines; `wait <ms>` pauses the script here
async fn read_stdin(line_tx: mpsc::UnboundedSender<Input>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        if let Some(ms) = parse_wait(&line) {
            tokio::time::sleep(std::time::Duration::from_millis(ms)).await;
            continue;
        }
        if line_tx.send(Input::Line(line)).is_err() {
            return;
        }
    }
    let _ = line_tx.send(Input::Closed);
}

fn parse_wait(line: &str) -> Option<u64> {
    let mut words = line.split_whitespace();
    match (words.next(), words.next()) {
        (Some(verb), Some(ms)) if verb.eq_ignore_ascii_case("wait") => ms.parse().ok(),
        _ => None,
    }
}

fn dispatch(installation: &mut Console, event: RuntimeEvent, args: &Args) {
    match installation.handle(event) {
        Ok(notices) => {
            for notice in &notices {
                print_notice(notice, args);
            }
        }
        Err(e) => print_warning(&e.to_string(), args.no_color),
    }
}

/// Print header
fn print_header(no_color: bool) {
    if no_color {
        println!("========================================");
        println!("  Floorlight v{}", VERSION);
        println!("========================================");
    } else {
        println!("{}", "╔══════════════════════════════════════╗".bold());
        println!("{}", format!("║          Floorlight v{}           ║", VERSION).bold());
        println!("{}", "╚══════════════════════════════════════╝".bold());
    }
    println!();
}

fn print_notice(notice: &Notice, args: &Args) {
    if args.json {
        println!("{}", serde_json::to_string(notice).unwrap());
        return;
    }
    if args.no_color {
        println!("  {}", notice.to_parseable_string());
        return;
    }

    match notice {
        Notice::PairLongPressed { pair } => println!("  {}", format!("⏱  pair {} held", pair).cyan()),
        Notice::GroundSelected { pair } => println!("  {}", format!("✓ ground is pair {}", pair).green()),
        Notice::FloorSwitched { from, to } => {
            println!("  {}", format!("⇄ floor {} → {}", from, to).magenta().bold())
        }
        Notice::StateEntered { state } => println!(
            "  {}{} {}{}",
            state.color_code(),
            state.emoji(),
            state,
            DialogueState::color_reset()
        ),
        Notice::Stepped { local, lit, .. } => {
            println!("  {}", format!("{} led {}", if *lit { "+" } else { "-" }, local).dimmed())
        }
        Notice::Rejected { reason } if reason.is_guard() => {
            println!("  {}", format!("⚠ {}", reason.description()).yellow())
        }
        Notice::Rejected { reason } => println!("  {}", reason.description().dimmed()),
    }
}

fn print_state(installation: &Console, args: &Args) {
    let snapshot = installation.snapshot();
    if args.json {
        println!("{}", serde_json::to_string(&snapshot).unwrap());
    } else if args.no_color {
        println!("{}", snapshot.to_parseable_string());
    } else {
        println!("{}", snapshot.to_terminal_string());
    }
}

fn print_strip(installation: &Console, args: &Args) {
    if args.json {
        return;
    }
    let strip = installation.sink();
    if args.no_color {
        println!("  [{}]", strip.to_parseable_string());
    } else {
        println!("  [{}]", strip.to_terminal_string());
    }
}

fn print_warning(message: &str, no_color: bool) {
    if no_color {
        println!("  warning: {}", message);
    } else {
        println!("  {}", format!("⚠ {}", message).yellow());
    }
}
