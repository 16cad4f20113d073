mod app;
mod config;
mod manual;
mod splash;
mod store;
mod theme;
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use app::App;
use config::AppConfig;
use splash::SplashOutcome;
use store::Database;

#[derive(Parser, Debug)]
#[command(name = "manuals")]
#[command(version = "0.1.0")]
#[command(about = "A terminal catalogue for instructional manuals")]
struct Args {
    /// Catalogue database file (overrides the config)
    #[arg(long, value_name = "PATH")]
    db: Option<PathBuf>,

    /// Skip the bouncing-logo splash
    #[arg(long)]
    no_splash: bool,

    /// Print every manual as JSON and exit
    #[arg(short, long)]
    list: bool,

    /// Print manuals whose title or author contains TEXT as JSON and exit
    #[arg(short, long, value_name = "TEXT")]
    search: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let mut config = AppConfig::load().unwrap_or_default();
    if let Some(db) = args.db {
        config.database_path = Some(db);
    }

    let db_path = config.database_path();
    let db = Database::open(&db_path)
        .with_context(|| format!("Could not open catalogue at {}", db_path.display()))?;

    // Handle CLI-only commands
    if args.list {
        return write_manuals(&db, None, &mut io::stdout().lock());
    }

    if let Some(query) = args.search.as_deref() {
        return write_manuals(&db, Some(query), &mut io::stdout().lock());
    }

    ui::init_theme(theme::Theme::from_config(&config.theme));
    let show_splash = config.show_splash && !args.no_splash;

    // Run TUI
    run_tui(App::new(db, &config), &config, show_splash).await
}

/// Write matching manuals to `out` as a pretty JSON array
fn write_manuals<W: Write>(db: &Database, filter: Option<&str>, out: &mut W) -> Result<()> {
    let manuals = db.load(filter)?;
    serde_json::to_writer_pretty(&mut *out, &manuals)?;
    writeln!(out)?;
    Ok(())
}

async fn run_tui(mut app: App, config: &AppConfig, show_splash: bool) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_session(&mut terminal, &mut app, config, show_splash).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

async fn run_session(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    config: &AppConfig,
    show_splash: bool,
) -> Result<()> {
    if show_splash && splash::run(terminal, &config.splash).await? == SplashOutcome::Quit {
        tracing::info!("Quit from splash screen");
        return Ok(());
    }

    terminal.clear()?;
    run_app(terminal, app).await
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(std::time::Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                        return Ok(());
                    }
                    // Handle key and catch any errors to prevent crashes
                    if let Err(e) = app.handle_key(key) {
                        tracing::warn!("Action failed: {:#}", e);
                        app.show_error("Error", format!("{:#}", e));
                    }
                }
            }
        }

        if app.should_quit {
            return Ok(());
        }

        app.tick();
        tokio::task::yield_now().await;
    }
}
