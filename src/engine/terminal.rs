use std::io::{self, Stdout, stdout};

use anyhow::{Context, Result};
use crossterm::{cursor, event, execute, terminal};

/// Raw-mode alternate screen with mouse capture; restored on drop.
pub struct TerminalSession {
    out: Stdout,
}

impl TerminalSession {
    pub fn enter() -> Result<Self> {
        terminal::enable_raw_mode().context("failed to enable raw mode")?;
        let mut out = stdout();
        let entered = execute!(
            out,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            terminal::DisableLineWrap,
            event::EnableMouseCapture,
        );
        if let Err(err) = entered {
            let _ = terminal::disable_raw_mode();
            return Err(err).context("failed to enter the alternate screen");
        }
        Ok(Self { out })
    }

    pub fn out(&mut self) -> &mut Stdout {
        &mut self.out
    }

    fn restore(&mut self) -> io::Result<()> {
        execute!(
            self.out,
            event::DisableMouseCapture,
            terminal::LeaveAlternateScreen,
            cursor::Show,
            terminal::EnableLineWrap,
        )?;
        terminal::disable_raw_mode()
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        if let Err(err) = self.restore() {
            log::error!("failed to restore terminal: {err}");
        }
    }
}
