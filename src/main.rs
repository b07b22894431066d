// src/main.rs

use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::prelude::*;
use std::io::stdout;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info};

mod app;
mod cli;
mod config;
mod core;
mod logging;
mod report;
mod ui;

use app::{App, AppState};
use cli::{Args, OutputFormat};
use config::RiskConfig;
use crate::core::error::{RedinkError, EXIT_INTERNAL_ERROR, EXIT_OK};
use crate::core::models::ScanReport;

type ScanOutcome = Result<ScanReport, RedinkError>;

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(e) = color_eyre::install() {
        eprintln!("failed to install error reporting: {}", e);
        return ExitCode::from(EXIT_INTERNAL_ERROR);
    }

    let args = Args::parse();
    let headless = args.target.is_some();

    let console = headless.then(|| logging::console_level(args.verbose, args.silent));
    if let Err(e) = logging::initialize_logging(console) {
        eprintln!("failed to initialize logging: {:?}", e);
        return ExitCode::from(EXIT_INTERNAL_ERROR);
    }

    let prepared = RiskConfig::load(args.config.as_deref())
        .and_then(|config| args.apply_overrides(config))
        .and_then(|config| Ok((config, args.requested_ports()?)));
    let (config, ports) = match prepared {
        Ok(prepared) => prepared,
        Err(e) => {
            error!(error = %e, "Configuration rejected.");
            eprintln!("redink: {}", e);
            return ExitCode::from(e.exit_code());
        }
    };
    let config = Arc::new(config);

    match &args.target {
        Some(target) => run_headless(target, config, ports, args.output).await,
        None => match run_tui(config, ports).await {
            Ok(()) => ExitCode::from(EXIT_OK),
            Err(e) => {
                error!(error = ?e, "Terminal UI failed.");
                eprintln!("redink: {:?}", e);
                ExitCode::from(EXIT_INTERNAL_ERROR)
            }
        },
    }
}

async fn run_headless(
    target: &str,
    config: Arc<RiskConfig>,
    ports: Option<Vec<u16>>,
    output: OutputFormat,
) -> ExitCode {
    let report = match crate::core::scanner::run_full_scan(target, config, ports).await {
        Ok(report) => report,
        Err(e) => {
            error!(error = %e, "Scan aborted.");
            eprintln!("redink: {}", e);
            return ExitCode::from(e.exit_code());
        }
    };

    match output {
        OutputFormat::Normal => print!("{}", report::render_console(&report)),
        OutputFormat::Json => match report::render_json(&report) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                error!(error = %e, "Report rendering failed.");
                eprintln!("redink: {}", e);
                return ExitCode::from(e.exit_code());
            }
        },
        OutputFormat::Quiet => {}
    }
    ExitCode::from(EXIT_OK)
}

async fn run_tui(config: Arc<RiskConfig>, ports: Option<Vec<u16>>) -> color_eyre::Result<()> {
    // --- Setup ---
    stdout().execute(EnterAlternateScreen)?;
    stdout().execute(EnableMouseCapture)?;
    enable_raw_mode()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    terminal.clear()?;

    let mut app = App::new(config, ports);
    let (tx, mut rx) = mpsc::channel::<ScanOutcome>(1);
    info!("Terminal UI started.");

    let result = event_loop(&mut terminal, &mut app, &tx, &mut rx).await;

    // --- Restore Terminal ---
    stdout().execute(LeaveAlternateScreen)?;
    stdout().execute(DisableMouseCapture)?;
    disable_raw_mode()?;
    result
}

async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    app: &mut App,
    tx: &mpsc::Sender<ScanOutcome>,
    rx: &mut mpsc::Receiver<ScanOutcome>,
) -> color_eyre::Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        if event::poll(Duration::from_millis(100))? {
            handle_events(app, tx)?;
        }

        if let Ok(outcome) = rx.try_recv() {
            app.finish_scan(outcome);
        }
        app.on_tick();
    }
    Ok(())
}

fn handle_events(app: &mut App, tx: &mpsc::Sender<ScanOutcome>) -> std::io::Result<()> {
    if let Event::Key(key) = event::read()? {
        if key.kind == KeyEventKind::Press {
            match app.state {
                AppState::Idle => handle_idle_input(app, key.code, tx),
                AppState::Finished => handle_finished_input(app, key.code),
                AppState::Scanning => handle_scanning_input(app, key.code),
            }
        }
    }
    Ok(())
}

fn handle_idle_input(app: &mut App, key_code: KeyCode, tx: &mpsc::Sender<ScanOutcome>) {
    match key_code {
        KeyCode::Esc => app.quit(),
        KeyCode::Char(c) => app.input.push(c),
        KeyCode::Backspace => {
            app.input.pop();
        }
        KeyCode::Enter => {
            let Some(target) = app.start_scan() else {
                return;
            };
            let tx = tx.clone();
            let config = Arc::clone(&app.config);
            let ports = app.ports.clone();
            tokio::spawn(async move {
                let outcome = crate::core::scanner::run_full_scan(&target, config, ports).await;
                if let Err(e) = &outcome {
                    error!(target = %target, error = %e, "Scan aborted.");
                }
                let _ = tx.send(outcome).await;
            });
        }
        _ => {}
    }
}

fn handle_scanning_input(app: &mut App, key_code: KeyCode) {
    match key_code {
        KeyCode::Char('q') | KeyCode::Esc => app.quit(),
        KeyCode::Char('l') => app.toggle_logs(),
        _ => {}
    }
}

fn handle_finished_input(app: &mut App, key_code: KeyCode) {
    match key_code {
        KeyCode::Char('q') | KeyCode::Esc => app.quit(),
        KeyCode::Char('n') => app.reset(),
        KeyCode::Char('l') => app.toggle_logs(),
        KeyCode::Up => app.select_previous(),
        KeyCode::Down => app.select_next(),
        KeyCode::Left => app.scroll_logs_left(),
        KeyCode::Right => app.scroll_logs_right(),
        _ => {}
    }
}
