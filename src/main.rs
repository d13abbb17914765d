use box_breather::{
    config::{self, Config, ConfigError, MotionMode},
    geometry::Size,
    runtime::{translate, CrosstermEventSource, FixedTicker, Runner},
    session::Session,
};
use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use std::{
    error::Error,
    fs::File,
    io::{self, stdin},
    path::{Path, PathBuf},
    rc::Rc,
    sync::Mutex,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// box breathing guide for the terminal
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A circle traces a box: inhale along the top, hold down the right side, exhale along the bottom, hold up the left side. Give one duration for every leg, two for horizontal and vertical legs, or four for each leg in turn."
)]
pub struct Cli {
    /// seconds per leg: 1, 2 or 4 positive integers
    #[clap(
        value_name = "SECONDS",
        allow_negative_numbers = true,
        conflicts_with = "config"
    )]
    times: Vec<String>,

    /// read settings from a key=value config file
    #[clap(short = 'c', long)]
    config: Option<PathBuf>,

    /// end the session after a countdown, given as mm:ss
    #[clap(short = 't', long, value_parser = config::parse_clock)]
    timer: Option<u32>,

    /// path the circle follows: the border's centerline or the raw box edges
    #[clap(short = 'm', long, value_enum)]
    motion: Option<MotionMode>,

    /// print the resolved configuration as JSON and exit
    #[clap(long)]
    print_config: bool,

    /// write diagnostic logs to this file (filter with RUST_LOG)
    #[clap(long)]
    log_file: Option<PathBuf>,
}

impl Cli {
    /// Resolve the configuration source, then apply flag overrides
    fn resolve_config(&self) -> Result<Config, ConfigError> {
        let mut config = config::resolve(self.config.as_deref(), &self.times)?;
        if let Some(secs) = self.timer {
            config.countdown_secs = Some(secs);
        }
        if let Some(mode) = self.motion {
            config.motion_mode = mode;
        }
        Ok(config)
    }
}

fn error_kind(err: &ConfigError) -> ErrorKind {
    match err {
        ConfigError::Io { .. } => ErrorKind::Io,
        ConfigError::ArgumentCount(_) => ErrorKind::WrongNumberOfValues,
        _ => ErrorKind::ValueValidation,
    }
}

#[derive(Debug)]
pub struct App {
    pub session: Session,
}

impl App {
    pub fn new(config: Config, size: Size) -> Self {
        Self {
            session: Session::new(Rc::new(config), size),
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if let Some(path) = &cli.log_file {
        init_logging(path)?;
    }

    let config = match cli.resolve_config() {
        Ok(config) => config,
        Err(err) => {
            let mut cmd = Cli::command();
            cmd.error(error_kind(&err), err).exit();
        }
    };

    if cli.print_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let size = terminal.size()?;
    let mut app = App::new(config, Size::from_cells(size.width, size.height));
    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen,)?;
    terminal.show_cursor()?;

    result
}

fn init_logging(path: &Path) -> Result<(), Box<dyn Error>> {
    // the terminal belongs to the UI, so logs only ever go to a file
    let file = File::create(path)?;
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "box_breather=debug".into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false),
        )
        .init();
    Ok(())
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let ticker = FixedTicker::from_fps(app.session.config().frame_rate);
    let mut runner = Runner::new(CrosstermEventSource::new(), ticker);

    terminal.draw(|f| ui(app, f))?;

    loop {
        let tick = translate(runner.next_tick());
        if tick.quit {
            tracing::info!(
                frame = app.session.frame_index(),
                state = %app.session.state(),
                "quit"
            );
            return Ok(());
        }

        app.session.advance(&tick.inputs);
        terminal.draw(|f| ui(app, f))?;
    }
}

fn ui(app: &App, f: &mut Frame) {
    f.render_widget(&app.session, f.area());
}
