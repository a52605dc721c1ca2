//! TETRS engine host
//!
//! Reads a line-oriented event script (key codes and timer pulses), folds it
//! through the engine in order and prints one JSON snapshot per action.

use anyhow::{Context, Result, bail};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tetrs_engine::{Game, InputFilter, Settings, Snapshot, Ticker};

const USAGE: &str = "usage: tetrs-engine [--settings PATH] [--write-default-settings] [SCRIPT]";

/// Command line options
#[derive(Debug, Default, PartialEq)]
struct Options {
    settings: Option<PathBuf>,
    write_default_settings: bool,
    script: Option<PathBuf>,
}

impl Options {
    fn parse(args: impl IntoIterator<Item = String>) -> Result<Self> {
        let mut options = Options::default();
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--settings" => {
                    let path = args.next().context("--settings needs a path")?;
                    options.settings = Some(PathBuf::from(path));
                }
                "--write-default-settings" => options.write_default_settings = true,
                "-h" | "--help" => bail!(USAGE),
                flag if flag.starts_with("--") => bail!("unknown flag {flag}\n{USAGE}"),
                _ if options.script.is_some() => bail!("more than one script given\n{USAGE}"),
                _ => options.script = Some(PathBuf::from(arg)),
            }
        }
        Ok(options)
    }
}

/// One meaningful script line
#[derive(Debug, PartialEq)]
enum Event {
    Key { code: String, repeat: bool },
    Ticks(u64),
}

/// Parse a script line; blank lines and `#` comments yield `None`
fn parse_line(line: &str) -> Result<Option<Event>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(None);
    };
    let event = match (head, words.next(), words.next()) {
        ("tick", None, None) => Event::Ticks(1),
        ("tick", Some(count), None) => Event::Ticks(
            count
                .parse()
                .with_context(|| format!("bad tick count {count:?}"))?,
        ),
        (code, None, None) => Event::Key {
            code: code.to_string(),
            repeat: false,
        },
        (code, Some("repeat"), None) => Event::Key {
            code: code.to_string(),
            repeat: true,
        },
        _ => bail!("unrecognised line {line:?}"),
    };
    Ok(Some(event))
}

/// Fold the script through the game, writing a snapshot per action
fn run(game: &mut Game, script: impl BufRead, mut out: impl Write) -> Result<()> {
    let filter = InputFilter::new();
    let mut ticker = Ticker::new();

    for (number, line) in script.lines().enumerate() {
        let line = line.context("failed to read script")?;
        let event = match parse_line(&line) {
            Ok(Some(event)) => event,
            Ok(None) => continue,
            Err(err) => {
                tracing::warn!("line {}: {:#}", number + 1, err);
                continue;
            }
        };

        let snapshots: Vec<Snapshot> = match event {
            Event::Key { code, repeat } => match filter.map(&code, repeat) {
                Some(action) => vec![game.process_action(action)],
                None => {
                    tracing::debug!("line {}: {} produced no action", number + 1, code);
                    Vec::new()
                }
            },
            // Each tick carries its own one-shot diff, so none may be dropped
            Event::Ticks(count) => ticker
                .by_ref()
                .take(count as usize)
                .map(|action| game.process_action(action))
                .collect(),
        };

        for snapshot in &snapshots {
            serde_json::to_writer(&mut out, snapshot).context("failed to encode snapshot")?;
            writeln!(out).context("failed to write snapshot")?;
        }
    }
    out.flush().context("failed to flush output")?;
    Ok(())
}

/// Get the log directory, creating it if needed
fn log_dir() -> PathBuf {
    let dir = std::env::temp_dir().join("tetrs-engine");
    let _ = std::fs::create_dir_all(&dir);
    dir
}

fn main() -> Result<()> {
    let options = Options::parse(std::env::args().skip(1))?;

    // Log to a file so stdout carries only snapshots
    let session_id = std::process::id();
    let log_dir = log_dir();
    let log_file = format!("{session_id:08x}.log");
    let file_appender = tracing_appender::rolling::never(&log_dir, &log_file);
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("tetrs_engine=debug".parse()?),
        )
        .with_ansi(false)
        .init();

    tracing::info!(
        "engine host starting, session={:08x}, log={}",
        session_id,
        log_dir.join(&log_file).display()
    );

    let settings = match &options.settings {
        Some(path) => Settings::from_path(path)?,
        None => Settings::load()?,
    };
    if options.write_default_settings {
        let path = Settings::default().save()?;
        tracing::info!("wrote default settings to {}", path.display());
    }

    let mut game = Game::new(Arc::new(settings));
    let stdout = io::stdout().lock();
    match &options.script {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("failed to open script {}", path.display()))?;
            run(&mut game, BufReader::new(file), stdout)?;
        }
        None => run(&mut game, io::stdin().lock(), stdout)?,
    }

    let state = game.state();
    tracing::info!(
        "finished after {} actions: score={} high_score={} level={} game_over={}",
        game.actions(),
        state.score.score,
        state.score.high_score,
        state.score.level,
        state.game_end
    );
    Ok(())
}
