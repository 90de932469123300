use std::{
    ffi::OsString,
    io::{self, stdout, Write},
    process::{Command, ExitStatus},
};

use crossterm::{
    cursor, execute,
    terminal::{Clear, ClearType},
};

use crate::selector::Launcher;
use crate::terminal::restore_terminal;

/// Exclusive use of the terminal by a child process.
///
/// Acquiring puts the terminal back into cooked mode so the child sees a
/// normal tty. Dropping flushes our side and shows the cursor again, whether
/// or not the child could be started.
struct Handoff;

impl Handoff {
    fn acquire() -> io::Result<Self> {
        restore_terminal()?;
        stdout().flush()?;
        Ok(Handoff)
    }
}

impl Drop for Handoff {
    fn drop(&mut self) {
        let _ = stdout().flush();
        let _ = restore_terminal();
    }
}

/// Launches the system `ssh` client with inherited stdio.
#[derive(Debug, Clone)]
pub struct SshLauncher {
    program: OsString,
}

impl Default for SshLauncher {
    fn default() -> Self {
        Self::new("ssh")
    }
}

impl SshLauncher {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Run `<program> -- <host>` in the foreground and wait for it.
    pub fn run(&self, host: &str) -> io::Result<ExitStatus> {
        let _handoff = Handoff::acquire()?;
        self.command(host).status()
    }

    // `--` keeps a host name starting with `-` from being read as an option.
    fn command(&self, host: &str) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("--").arg(host);
        cmd
    }
}

impl Launcher for SshLauncher {
    fn clear_screen(&mut self) -> io::Result<()> {
        execute!(stdout(), Clear(ClearType::All), cursor::MoveTo(0, 0))
    }

    fn connect(&mut self, host: &str) {
        match self.run(host) {
            Ok(status) if status.success() => tracing::debug!("ssh session to {host} ended"),
            Ok(status) => tracing::info!("ssh session to {host} exited with {status}"),
            Err(err) => tracing::error!("failed to run {:?}: {err}", self.program),
        }
    }
}
