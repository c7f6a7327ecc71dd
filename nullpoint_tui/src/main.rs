mod screen;

use anyhow::{Context, Result};
use clap::Parser;
use nullpoint_core::{
    Direction, Input,
    clock::TickClock,
    config::EngineConfig,
    engine::{Engine, OpenOutcome},
};
use ratatui::{
    crossterm::{
        self,
        event::{self, Event, KeyCode, KeyEventKind},
        execute,
        terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
    },
    prelude::*,
};
use std::{
    fs::File,
    io::{self, Stdout},
    path::{Path, PathBuf},
    sync::Mutex,
    time::{Duration, Instant},
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::screen::{Screen, ui};

/// Redraw cadence while nothing else is due, keeps cutscenes and glitches moving.
const FRAME_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Seed for enemy placement and movement
    #[arg(short, long)]
    seed: Option<u64>,

    /// Write logs to this file
    #[arg(short, long, value_name = "LOG_FILE")]
    log_file: Option<PathBuf>,
}

struct App {
    /// The dungeon mini-game.
    engine: Engine,
    /// Presentation state fed by the engine.
    screen: Screen,
    /// Drives enemy movement while the dungeon is open.
    clock: TickClock,
    /// Flag to control the main loop.
    should_quit: bool,
}

impl App {
    fn new(config: EngineConfig) -> Result<Self> {
        let clock = TickClock::new(config.tick_period());
        let engine = Engine::with_dungeon(config).context("failed to load the dungeon map")?;
        Ok(App {
            engine,
            screen: Screen::new(),
            clock,
            should_quit: false,
        })
    }

    fn on_key(&mut self, code: KeyCode, now: Instant) {
        if self.engine.is_open() {
            let input = match code {
                KeyCode::Up => Input::Move(Direction::Up),
                KeyCode::Down => Input::Move(Direction::Down),
                KeyCode::Left => Input::Move(Direction::Left),
                KeyCode::Right => Input::Move(Direction::Right),
                KeyCode::Esc => Input::Cancel,
                _ => return,
            };
            self.engine.handle_input(input, &mut self.screen);
        } else if self.screen.in_ending() {
            if code == KeyCode::Char('q') {
                self.quit();
            }
        } else {
            match code {
                KeyCode::Char('q') => self.quit(),
                KeyCode::Char('d') => self.enter_dungeon(now),
                KeyCode::Char('u') => {
                    if self.screen.use_key(now) {
                        info!("key used, playing the ending");
                    }
                }
                _ => {}
            }
        }
        self.sync_clock(now);
    }

    fn enter_dungeon(&mut self, now: Instant) {
        match self.engine.open(&mut self.screen) {
            OpenOutcome::Opened => self.clock.start(now),
            OpenOutcome::Locked => self.screen.push_message(
                "You've already found the key. There's nothing more to discover here.",
            ),
            OpenOutcome::AlreadyOpen => {}
        }
    }

    /// Handles one step of the simulation.
    fn update(&mut self, now: Instant) {
        if self.clock.poll(now) {
            self.engine.tick(&mut self.screen);
        }
        if self.screen.cutscene_finished(now) {
            self.engine.finish_objective_sequence(&mut self.screen);
        }
        self.sync_clock(now);
    }

    /// Stops the tick source whenever the engine stops accepting ticks.
    fn sync_clock(&mut self, now: Instant) {
        if !self.engine.accepts_ticks() {
            self.clock.stop();
        } else if !self.clock.is_running() {
            self.clock.start(now);
        }
    }

    /// Sets the quit flag.
    fn quit(&mut self) {
        self.should_quit = true;
    }
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();
    if let Some(path) = &args.log_file {
        init_tracing(path)?;
    }

    let config = EngineConfig {
        seed: args.seed,
        ..EngineConfig::default()
    };
    let mut app = App::new(config)?;

    // Set up the terminal
    let mut terminal = setup_terminal()?;

    // Run the main application loop
    let result = run_app(&mut terminal, &mut app);
    if let Err(err) = &result {
        error!(error = %err, "main loop failed");
    }

    // Restore the terminal state
    restore_terminal(&mut terminal)?;

    result
}

/// Sends logs to `path`; the terminal itself belongs to the TUI.
fn init_tracing(path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create log file {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .init();
    info!("logging to {}", path.display());
    Ok(())
}

/// Configures the terminal for TUI interaction.
fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    let mut stdout = io::stdout();
    enable_raw_mode().context("failed to enable raw mode")?;
    execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).context("failed to build terminal backend")
}

/// Restores the terminal to its original state.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Runs the main loop of the TUI application.
fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    loop {
        let now = Instant::now();
        terminal.draw(|f| ui(f, &mut app.screen, &app.engine, now))?;

        // Wake up for the next tick or the next frame, whichever comes first
        let timeout = app
            .clock
            .until_next(now)
            .map_or(FRAME_INTERVAL, |due| due.min(FRAME_INTERVAL));

        if crossterm::event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key.code, Instant::now());
                }
            }
        }

        app.update(Instant::now());

        // Exit loop if requested
        if app.should_quit {
            break;
        }
    }
    Ok(())
}
