use std::{
    io::{self, stdout, Stdout, Write},
    ops::{Deref, DerefMut},
};

use crossterm::{
    cursor, execute,
    terminal::{disable_raw_mode, enable_raw_mode},
};

use ratatui::{backend::CrosstermBackend, TerminalOptions, Viewport};

type TerminalBackend<W> = ratatui::Terminal<CrosstermBackend<W>>;

/// A raw-mode terminal drawing into an inline viewport below the cursor.
/// Raw mode is switched off again when the value is dropped.
pub struct Terminal<W: Write> {
    inner: TerminalBackend<W>,
}

impl Terminal<Stdout> {
    pub fn inline(height: u16) -> io::Result<Self> {
        enable_raw_mode()?;
        let backend = CrosstermBackend::new(stdout());
        let terminal = ratatui::Terminal::with_options(
            backend,
            TerminalOptions {
                viewport: Viewport::Inline(height),
            },
        );

        match terminal {
            Ok(inner) => Ok(Self { inner }),
            Err(err) => {
                let _ = restore_terminal();
                Err(err)
            }
        }
    }
}

impl<W: Write> Deref for Terminal<W> {
    type Target = TerminalBackend<W>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl<W: Write> DerefMut for Terminal<W> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inner
    }
}

impl<W: Write> Drop for Terminal<W> {
    fn drop(&mut self) {
        let _ = restore_terminal();
    }
}

/// Leave raw mode and make the cursor visible. Safe to call when the
/// terminal is already in cooked mode.
pub(crate) fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(stdout(), cursor::Show)?;
    Ok(())
}
