//! Environment side effects a session needs, injected so hosts and tests can stub them.

use std::cell::Cell;
use std::io::{self, Write};
use std::rc::Rc;
use std::time::{Duration, SystemTime};

use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen},
};
use webbrowser::Browser;

use crate::error::CapabilityError;

/// Wall clock used to stamp the session start and compute total elapsed time
pub trait Clock {
    fn now(&self) -> SystemTime;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// Clock that only moves when told to. Clones share the same instant.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<SystemTime>>,
}

impl ManualClock {
    pub fn new(start: SystemTime) -> Self {
        Self {
            now: Rc::new(Cell::new(start)),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(SystemTime::UNIX_EPOCH)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> SystemTime {
        self.now.get()
    }
}

/// Full-screen presentation for the duration of a session
pub trait Display {
    fn enter_full_screen(&mut self) -> Result<(), CapabilityError>;
    fn exit_full_screen(&mut self) -> Result<(), CapabilityError>;
}

#[derive(Debug, Default)]
pub struct NoopDisplay;

impl Display for NoopDisplay {
    fn enter_full_screen(&mut self) -> Result<(), CapabilityError> {
        Ok(())
    }

    fn exit_full_screen(&mut self) -> Result<(), CapabilityError> {
        Ok(())
    }
}

/// Terminal alternate screen on stdout
#[derive(Debug, Default)]
pub struct TerminalDisplay;

impl Display for TerminalDisplay {
    fn enter_full_screen(&mut self) -> Result<(), CapabilityError> {
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        stdout.flush()?;
        Ok(())
    }

    fn exit_full_screen(&mut self) -> Result<(), CapabilityError> {
        execute!(io::stdout(), LeaveAlternateScreen)?;
        Ok(())
    }
}

/// Destination for the "share your success" message
pub trait ShareSink {
    fn share(&mut self, text: &str) -> Result<(), CapabilityError>;
}

#[derive(Debug, Default)]
pub struct NoopShare;

impl ShareSink for NoopShare {
    fn share(&mut self, _text: &str) -> Result<(), CapabilityError> {
        Ok(())
    }
}

/// Opens a pre-filled post in the default browser
#[derive(Debug, Default)]
pub struct BrowserShare;

impl BrowserShare {
    pub fn intent_url(text: &str) -> String {
        format!(
            "https://twitter.com/intent/tweet?text={}",
            urlencoding::encode(text)
        )
    }
}

impl ShareSink for BrowserShare {
    fn share(&mut self, text: &str) -> Result<(), CapabilityError> {
        if !Browser::is_available() {
            return Err(CapabilityError::Unavailable("no browser available".into()));
        }
        webbrowser::open(&Self::intent_url(text))?;
        Ok(())
    }
}

/// Collaborators handed to a session at construction
pub struct Capabilities {
    pub clock: Box<dyn Clock>,
    pub display: Box<dyn Display>,
    pub share: Box<dyn ShareSink>,
}

impl Capabilities {
    pub fn with_clock<C: Clock + 'static>(clock: C) -> Self {
        Self {
            clock: Box::new(clock),
            ..Self::default()
        }
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            clock: Box::new(SystemClock),
            display: Box::new(NoopDisplay),
            share: Box::new(NoopShare),
        }
    }
}
