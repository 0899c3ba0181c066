use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, ValueEnum};
use color_eyre::Result;
use color_eyre::eyre::eyre;
use crossterm::event::{self, Event as CEvent};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing::error;

use confedit::App;
use confedit::project::ProjectModel;

/// Inspect a project directory and edit its JSON configuration in place.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Project root directory (defaults to the executable's directory)
    work_dir: Option<PathBuf>,
    /// Enable file logging at the given level (overrides RUST_LOG)
    #[arg(long = "logging", value_enum)]
    logging: Option<LogLevel>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

fn resolve_work_dir(arg: Option<&Path>) -> Result<PathBuf> {
    if let Some(custom) = arg {
        let full_path = std::env::current_dir()?.join(custom);
        if full_path.is_dir() {
            return Ok(full_path);
        }
        return Err(eyre!("work dir is not a directory: {}", full_path.display()));
    }
    // Default to the executable's directory; its parent always exists
    let executable_path = std::env::current_exe()?;
    Ok(executable_path.parent().unwrap().to_path_buf())
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    let cwd = std::env::current_dir()?;
    let log_path = cwd.join("confedit.log");
    let level = match args.logging {
        Some(LogLevel::Error) => Some(tracing::Level::ERROR),
        Some(LogLevel::Warn) => Some(tracing::Level::WARN),
        Some(LogLevel::Info) => Some(tracing::Level::INFO),
        Some(LogLevel::Debug) => Some(tracing::Level::DEBUG),
        Some(LogLevel::Trace) => Some(tracing::Level::TRACE),
        None => Some(tracing::Level::WARN),
    };
    confedit::logging::init_with(Some(log_path), level)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    // Initial project load happens before the terminal takes over, so a bad
    // work dir fails with a plain error message
    let work_dir = resolve_work_dir(args.work_dir.as_deref())?;
    let mut project = ProjectModel::default();
    runtime.block_on(project.init(work_dir))?;

    let mut app = App::new(project, runtime.handle().clone());

    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen)?;
    if let Err(e) = res {
        error!("Error: {e}");
        return Err(e);
    }
    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> Result<()> {
    loop {
        terminal.draw(|f| {
            if let Err(e) = app.draw(f) {
                error!("Error drawing frame: {e}");
            }
        })?;

        // Apply I/O completions queued by spawned tasks
        app.drain_completions()?;

        if event::poll(Duration::from_millis(100))?
            && let CEvent::Key(key_event) = event::read()?
        {
            app.handle_key_event(key_event)?;
        }

        if app.should_quit() {
            break;
        }
    }
    Ok(())
}
