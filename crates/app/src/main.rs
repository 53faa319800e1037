mod demo;

use std::fmt;
use std::io::Write;
use std::sync::Arc;

use quiz_core::model::{SessionId, SessionMode};
use serde_json::{Value, json};
use services::{ConfigError, HttpBackendConfig, HttpQuizBackend, QuizBackend, SessionConfig};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::info;
use tracing_subscriber::EnvFilter;
use ui::session::{ChannelListener, SessionController, SessionListener, SessionSignal};
use ui::TextSurface;

use crate::demo::DemoBackend;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidMode { raw: String },
    InvalidPageSize { raw: String },
    Config(ConfigError),
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidMode { raw } => write!(f, "invalid --mode value: {raw}"),
            ArgsError::InvalidPageSize { raw } => write!(f, "invalid --page-size value: {raw}"),
            ArgsError::Config(err) => write!(f, "invalid environment: {err}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- [--demo | --backend <url>] [--test <id>]");
    eprintln!("                      [--mode select|write] [--page-size <n>] [--hints]");
    eprintln!();
    eprintln!("Without --backend (or QUIZ_BACKEND_URL) the built-in demo quiz is used.");
    eprintln!();
    eprintln!("Answers: c / correct, i / incorrect, s <text> to select,");
    eprintln!("         again, next, q to quit.");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_BACKEND_URL, QUIZ_BACKEND_API_KEY, QUIZ_TEST_ID,");
    eprintln!("  QUIZ_MODE, QUIZ_UNITS_PER_PAGE, QUIZ_EXAMPLE_MS, QUIZ_SHOW_HINTS, RUST_LOG");
}

struct Args {
    backend: Option<HttpBackendConfig>,
    test_id: String,
    config: SessionConfig,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut config = SessionConfig::from_env().map_err(ArgsError::Config)?;
        let mut backend = HttpBackendConfig::from_env();
        let mut test_id = std::env::var("QUIZ_TEST_ID").unwrap_or_else(|_| "demo".into());

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--demo" => backend = None,
                "--backend" => {
                    let url = require_value(args, "--backend")?;
                    backend = Some(HttpBackendConfig::new(url));
                }
                "--test" => test_id = require_value(args, "--test")?,
                "--mode" => {
                    let raw = require_value(args, "--mode")?;
                    let mode: SessionMode = raw
                        .parse()
                        .map_err(|_| ArgsError::InvalidMode { raw: raw.clone() })?;
                    config = config.with_mode(mode);
                }
                "--page-size" => {
                    let raw = require_value(args, "--page-size")?;
                    let size: u32 = raw
                        .parse()
                        .ok()
                        .filter(|size| *size > 0)
                        .ok_or_else(|| ArgsError::InvalidPageSize { raw: raw.clone() })?;
                    config = config.with_units_per_page(size);
                }
                "--hints" => config = config.with_show_hints(true),
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            backend,
            test_id,
            config,
        })
    }
}

/// Map a typed line to an action name and payload.
fn parse_input(line: &str) -> Option<(&'static str, Option<Value>)> {
    let line = line.trim();
    match line {
        "c" | "correct" => Some(("SUBMIT_ANSWER", Some(json!("correct")))),
        "i" | "incorrect" => Some(("SUBMIT_ANSWER", Some(json!("incorrect")))),
        "again" => Some(("TRY_AGAIN", None)),
        "next" => Some(("NEXT_STAGE", None)),
        "q" | "quit" => Some(("CLOSE_LEARN_MODE", None)),
        _ => line
            .strip_prefix("s ")
            .map(|answer| ("SELECT_ANSWER", Some(json!(answer.trim())))),
    }
}

enum Next {
    Restart,
    Quit,
}

async fn drive(
    controller: &mut SessionController,
    lines: &mut Lines<BufReader<Stdin>>,
    signals: &mut UnboundedReceiver<(SessionId, SessionSignal)>,
) -> std::io::Result<Next> {
    loop {
        if controller.auto_transition_pending() {
            controller.wait_auto_transition().await;
            continue;
        }
        if controller.get_state().current_screen.is_terminal() {
            println!("(again / next / q)");
        }
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            return Ok(Next::Quit);
        };
        let Some((action, payload)) = parse_input(&line) else {
            eprintln!("unrecognized input: {line}");
            continue;
        };

        let result = controller.handle_user_action(action, payload).await;
        if !result.success {
            eprintln!("error: {}", result.error.unwrap_or_default());
            continue;
        }
        if result.state.is_some() && result.rendered.is_none() {
            controller.render_current();
        }
        if let Ok((session, signal)) = signals.try_recv() {
            info!(%session, ?signal, "session signal");
            return Ok(match signal {
                SessionSignal::Close => Next::Quit,
                SessionSignal::TryAgain | SessionSignal::NextStage => Next::Restart,
            });
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let argv: Vec<String> = std::env::args().skip(1).collect();
    let parsed = Args::parse(&mut argv.into_iter()).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let backend: Arc<dyn QuizBackend> = match parsed.backend {
        Some(config) => {
            info!(url = %config.base_url, "using remote backend");
            Arc::new(HttpQuizBackend::new(Some(config)))
        }
        None => Arc::new(DemoBackend::new()),
    };
    let (tx, mut signals) = mpsc::unbounded_channel();
    let listener: Arc<dyn SessionListener> = Arc::new(ChannelListener::new(tx));
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let mut controller = SessionController::builder(Arc::clone(&backend))
            .with_config(parsed.config)
            .with_listener(Arc::clone(&listener))
            .with_surface(TextSurface::stdout())
            .start(&parsed.test_id)
            .await?;

        let next = drive(&mut controller, &mut lines, &mut signals).await?;
        controller.cleanup();
        match next {
            Next::Restart => info!("restarting session"),
            Next::Quit => return Ok(()),
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
