use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CtEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::geometry::Size;
use crate::session::Input;

/// Unified event type consumed by the app runner
#[derive(Clone, Debug)]
pub enum BreathEvent {
    Key(KeyEvent),
    /// New terminal size in cells
    Resize(u16, u16),
}

/// Source of terminal events (keyboard, resize, etc.)
pub trait EventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    /// Returns Ok(event) if an event arrives before the timeout, or Err(Timeout) if it expires.
    fn recv_timeout(&self, timeout: Duration) -> Result<BreathEvent, RecvTimeoutError>;
}

/// Production event source using crossterm
pub struct CrosstermEventSource {
    rx: Receiver<BreathEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || loop {
            let evt = match event::read() {
                Ok(CtEvent::Key(key)) => BreathEvent::Key(key),
                Ok(CtEvent::Resize(cols, rows)) => BreathEvent::Resize(cols, rows),
                Ok(_) => continue,
                Err(err) => {
                    tracing::warn!(%err, "terminal event reader stopped");
                    break;
                }
            };
            if tx.send(evt).is_err() {
                break;
            }
        });

        Self { rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<BreathEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Configurable ticker interface
pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

/// Fixed interval ticker
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn from_fps(frame_rate: u32) -> Self {
        Self::new(Duration::from_secs(1) / frame_rate.max(1))
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Test event source for unit tests
pub struct TestEventSource {
    rx: Receiver<BreathEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<BreathEvent>) -> Self {
        Self { rx }
    }
}

impl EventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<BreathEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Paces the host loop at a fixed rate, batching the events that arrive
/// between ticks
pub struct Runner<E: EventSource, T: Ticker> {
    event_source: E,
    ticker: T,
    deadline: Instant,
}

impl<E: EventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        let deadline = Instant::now() + ticker.interval();
        Self {
            event_source,
            ticker,
            deadline,
        }
    }

    /// Blocks until the next tick is due and returns every event received
    /// meanwhile, oldest first
    pub fn next_tick(&mut self) -> Vec<BreathEvent> {
        let mut batch = Vec::new();

        loop {
            let wait = self.deadline.saturating_duration_since(Instant::now());
            if wait.is_zero() {
                break;
            }
            match self.event_source.recv_timeout(wait) {
                Ok(ev) => batch.push(ev),
                Err(RecvTimeoutError::Timeout) => break,
                Err(RecvTimeoutError::Disconnected) => {
                    thread::sleep(wait);
                    break;
                }
            }
        }

        let interval = self.ticker.interval();
        let now = Instant::now();
        self.deadline += interval;
        if self.deadline < now {
            // fell behind: resync rather than replay missed ticks
            self.deadline = now + interval;
        }

        batch
    }
}

/// What a key press asks the host to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    Restart,
}

pub fn key_action(key: KeyEvent) -> Option<Action> {
    if key.kind != KeyEventKind::Press {
        return None;
    }

    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => Some(Action::Quit),
        // ctrl+c to quit
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(Action::Quit),
        KeyCode::Char('r') | KeyCode::Char('R') => Some(Action::Restart),
        _ => None,
    }
}

/// A tick's worth of events translated for the session
#[derive(Debug, Default, PartialEq)]
pub struct TickInputs {
    pub quit: bool,
    pub inputs: Vec<Input>,
}

pub fn translate(events: Vec<BreathEvent>) -> TickInputs {
    let mut tick = TickInputs::default();

    for event in events {
        match event {
            BreathEvent::Key(key) => match key_action(key) {
                Some(Action::Quit) => tick.quit = true,
                Some(Action::Restart) => tick.inputs.push(Input::Restart),
                None => {}
            },
            BreathEvent::Resize(cols, rows) => {
                tick.inputs.push(Input::Resize(Size::from_cells(cols, rows)))
            }
        }
    }

    tick
}
