mod advisor;
mod config;
mod detector;
mod intent;
mod phase;
mod present;
mod recommend;
mod types;

use advisor::{Advisor, MemoStore, STATE_DIR_ENV};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use detector::SessionState;
use phase::Phase;
use present::Presenter;
use serde::Serialize;
use std::collections::HashMap;
use std::io::{self, BufRead, Read, Write};
use std::path::{Path, PathBuf};
use std::process;
use tracing::{debug, warn};
use types::{HookInput, HookOutput};

/// Suggests the next workflow skill from a project's session documents and
/// the user's prompt.
#[derive(Parser, Debug)]
#[command(name = "oh-advisor", version)]
struct Cli {
    /// Where the last shown advice is kept between hook invocations.
    #[arg(long, global = true, env = STATE_DIR_ENV)]
    state_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Handle one hook event from stdin (the default).
    Hook,
    /// Handle newline-delimited hook events from stdin until it closes.
    Serve {
        /// Project whose configuration is loaded at startup.
        #[arg(long, default_value = ".")]
        project: PathBuf,
    },
    /// Print the advice for a prompt.
    Suggest {
        #[arg(long)]
        cwd: Option<PathBuf>,
        /// Prompt text; may be empty.
        prompt: Vec<String>,
    },
    /// Show the active session and where it is in the flow.
    Status {
        #[arg(long)]
        cwd: Option<PathBuf>,
        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },
}

fn read_stdin() -> Result<String> {
    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .context("reading stdin")?;
    Ok(buffer)
}

fn resolve_cwd(cwd: Option<PathBuf>) -> Result<PathBuf> {
    match cwd {
        Some(cwd) => Ok(cwd),
        None => std::env::current_dir().context("reading current directory"),
    }
}

fn run_hook(state_dir: PathBuf) -> Result<Option<HookOutput>> {
    let input = read_stdin()?;
    let hook_input: HookInput =
        serde_json::from_str(&input).context("parsing hook input")?;

    let common = match &hook_input {
        HookInput::SessionStart(e) => &e.common,
        HookInput::UserPromptSubmit(e) => &e.common,
        HookInput::SessionEnd(e) => &e.common,
        _ => return Ok(None),
    };

    let advisor = Advisor::open(Path::new(&common.cwd));
    let memo = MemoStore::new(state_dir);
    let mut presenter = memo.load(&common.session_id);
    let output = advisor.handle_event(&hook_input, &mut presenter);
    memo.store(&common.session_id, &presenter);
    Ok(output)
}

fn serve(project: &Path) -> Result<()> {
    let advisor = Advisor::open(project);
    let mut presenters: HashMap<String, Presenter> = HashMap::new();
    let mut stdout = io::stdout().lock();

    for line in io::stdin().lock().lines() {
        let line = line.context("reading stdin")?;
        if line.trim().is_empty() {
            continue;
        }
        let output = match serde_json::from_str::<HookInput>(&line) {
            Ok(input) => match input.common() {
                Some(common) => {
                    let session_id = common.session_id.clone();
                    let presenter = presenters.entry(session_id.clone()).or_default();
                    let output = advisor.handle_event(&input, presenter);
                    if matches!(input, HookInput::SessionEnd(_)) {
                        presenters.remove(&session_id);
                    }
                    output
                }
                None => None,
            },
            Err(err) => {
                debug!("skipping event: {err}");
                None
            }
        };
        let json = serde_json::to_string(&output.unwrap_or_default())
            .context("serializing hook output")?;
        writeln!(stdout, "{json}").context("writing stdout")?;
        stdout.flush().context("flushing stdout")?;
    }
    Ok(())
}

fn suggest(cwd: &Path, prompt: &[String]) {
    let advisor = Advisor::open(cwd);
    let prompt = prompt.join(" ");
    if let Some(block) = advisor.advise(&prompt, &mut Presenter::new(), None) {
        println!("{block}");
    }
}

#[derive(Debug, Serialize)]
struct StatusReport {
    root: PathBuf,
    session: Option<SessionState>,
    next: Option<Phase>,
}

fn status(cwd: &Path, json: bool) -> Result<()> {
    let advisor = Advisor::open(cwd);
    let session = advisor.session();
    let report = StatusReport {
        root: advisor.root().to_path_buf(),
        next: session
            .as_ref()
            .map(|s| recommend::next_phase(s.last_phase)),
        session,
    };

    if json {
        let out = serde_json::to_string_pretty(&report).context("serializing status")?;
        println!("{out}");
        return Ok(());
    }

    println!("project: {}", report.root.display());
    let Some(session) = &report.session else {
        println!("session: none");
        return Ok(());
    };
    let completed = if session.completed.is_empty() {
        "none".to_string()
    } else {
        session
            .completed
            .iter()
            .map(|p| p.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    };
    println!("session: {}", session.name);
    println!("completed: {completed}");
    println!(
        "last phase: {}",
        session.last_phase.map_or("none", |p| p.as_str())
    );
    if let Some(next) = report.next {
        let allowed = if advisor.config().is_allowed(next) {
            ""
        } else {
            " (not enabled for this project)"
        };
        println!("next: {next}{allowed}");
    }
    Ok(())
}

fn run(cli: Cli) -> Result<Option<HookOutput>> {
    match cli.command.unwrap_or(Command::Hook) {
        Command::Hook => {
            let state_dir = cli.state_dir.unwrap_or_else(MemoStore::default_dir);
            // Advice is optional; a failed hook must not block the prompt.
            match run_hook(state_dir) {
                Ok(output) => Ok(output),
                Err(err) => {
                    warn!("skipping hook event: {err:#}");
                    Ok(None)
                }
            }
        }
        Command::Serve { project } => serve(&project).map(|()| None),
        Command::Suggest { cwd, prompt } => {
            suggest(&resolve_cwd(cwd)?, &prompt);
            Ok(None)
        }
        Command::Status { cwd, json } => status(&resolve_cwd(cwd)?, json).map(|()| None),
    }
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    match run(cli) {
        Ok(Some(output)) => match serde_json::to_string(&output) {
            Ok(json) => println!("{json}"),
            Err(err) => {
                eprintln!("oh-advisor: serializing output: {err}");
                process::exit(2);
            }
        },
        Ok(None) => {}
        Err(err) => {
            eprintln!("oh-advisor: {err:#}");
            process::exit(2);
        }
    }
}
