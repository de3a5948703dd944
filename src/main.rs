use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEvent, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use jeju_agri_atlas::{config::Config, state::AppState, ui};
use log::LevelFilter;
use ratatui::{Terminal, backend::CrosstermBackend};
use simplelog::{ConfigBuilder, WriteLogger};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// 제주 농업 데이터 터미널 아틀라스
#[derive(Parser)]
#[command(name = "jeju-agri-atlas", version, about, long_about = None)]
struct Cli {
    /// Directory holding the catalog and GeoJSON files
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// TOML settings file (default: ./atlas.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Page to open first, e.g. /gis/crop-distribution
    #[arg(long)]
    route: Option<String>,

    /// Log destination; the terminal belongs to the UI
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    if let Some(route) = cli.route {
        config.start_route = route;
    }
    if let Some(file) = cli.log_file {
        config.log_file = file;
    }
    let level = if cli.verbose { LevelFilter::Debug } else { config.level_filter()? };
    WriteLogger::init(
        level,
        ConfigBuilder::new().set_time_format_rfc3339().build(),
        File::create(&config.log_file)?,
    )?;
    log::info!("starting with data from {}", config.data_dir.display());

    let tick = Duration::from_millis(config.tick_ms);
    let mut state = AppState::new(config)?;
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run(&mut terminal, &mut state, tick);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;
    if let Err(e) = &result {
        log::error!("ui loop failed: {e}");
    }
    log::info!("bye");
    result
}

fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    state: &mut AppState,
    tick: Duration,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        state.tick(Instant::now());
        terminal.draw(|f| ui::draw(f, state))?;

        if event::poll(tick)? {
            if let Event::Key(KeyEvent { code, kind: KeyEventKind::Press, .. }) = event::read()? {
                if state.handle_input(code) {
                    return Ok(());
                }
            }
        }
    }
}
