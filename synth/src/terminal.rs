use synth::TextDisplay;

use crossterm::{
    cursor::{Hide, MoveTo, Show},
    execute, queue,
    style::Print,
    terminal::{Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};

use std::io::{self, Stdout, Write};

/// The status display drawn on the alternate screen of the controlling terminal
pub struct TerminalDisplay {
    stdout: Stdout,
    error: Option<io::Error>,
}

impl TerminalDisplay {
    pub fn new() -> io::Result<Self> {
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, Hide, Clear(ClearType::All))?;
        Ok(Self {
            stdout,
            error: None,
        })
    }

    /// Sends queued output, reporting the first error since the last flush
    pub fn flush(&mut self) -> io::Result<()> {
        if let Some(error) = self.error.take() {
            return Err(error);
        }
        self.stdout.flush()
    }

    fn record(&mut self, result: io::Result<()>) {
        if let Err(error) = result {
            self.error.get_or_insert(error);
        }
    }
}

impl TextDisplay for TerminalDisplay {
    fn goto_xy(&mut self, x: u16, y: u16) {
        let result = queue!(self.stdout, MoveTo(x, y));
        self.record(result);
    }

    fn put_str(&mut self, text: &str) {
        let result = queue!(self.stdout, Print(text));
        self.record(result);
    }
}

impl Drop for TerminalDisplay {
    fn drop(&mut self) {
        // Nothing left to report to if restoring the terminal fails
        let _ = execute!(self.stdout, Show, LeaveAlternateScreen);
    }
}
