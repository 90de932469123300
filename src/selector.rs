//! Environment → host selection.
//!
//! The selector alternates between two menus. Picking an environment opens
//! its host list; the host list carries an extra [`RETURN_TO_ENVIRONMENTS`]
//! entry that goes back to the environment list. Picking a host hands the
//! terminal to `ssh` and ends the selection.

use ratatui::style::Color;

use crate::error::{Error, Result};
use crate::inventory::Inventory;

/// Extra entry at the bottom of every host list.
pub const RETURN_TO_ENVIRONMENTS: &str = "-->RETURN TO ENVIRONMENT SELECTION";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Menu {
    Environment,
    Host,
}

impl Menu {
    pub fn title(self) -> &'static str {
        match self {
            Menu::Environment => "Select Environment:",
            Menu::Host => "Select Host:",
        }
    }

    pub fn accent(self) -> Color {
        match self {
            Menu::Environment => Color::Green,
            Menu::Host => Color::Blue,
        }
    }
}

/// Shows a single-choice list and returns the chosen entry, or `None` if
/// the user backed out.
pub trait Prompt {
    fn choose(&mut self, menu: Menu, options: Vec<String>) -> Result<Option<String>>;
}

/// Side effects of the selector outside the menu itself.
pub trait Launcher {
    fn clear_screen(&mut self) -> std::io::Result<()>;

    /// Run `ssh <host>` in the foreground. Failures of the session itself
    /// are not reported back.
    fn connect(&mut self, host: &str);
}

enum State {
    Environments,
    Hosts(String),
}

pub struct Selector<'a, P, L> {
    inventory: &'a Inventory,
    prompt: P,
    launcher: L,
}

impl<'a, P: Prompt, L: Launcher> Selector<'a, P, L> {
    pub fn new(inventory: &'a Inventory, prompt: P, launcher: L) -> Self {
        Self {
            inventory,
            prompt,
            launcher,
        }
    }

    /// Run the menus until a host is picked and its ssh session has ended.
    /// Returns the name of the host that was connected to.
    pub fn run(&mut self) -> Result<String> {
        let mut state = State::Environments;
        loop {
            state = match state {
                State::Environments => {
                    let names = self
                        .inventory
                        .environment_names()
                        .into_iter()
                        .map(str::to_string)
                        .collect();
                    let env = self.ask(Menu::Environment, names)?;
                    tracing::debug!("environment {env:?} selected");
                    State::Hosts(env)
                }
                State::Hosts(env) => {
                    let hosts = self
                        .inventory
                        .hosts(&env)
                        .ok_or_else(|| Error::NotFound(env.clone()))?;

                    let mut options: Vec<String> = hosts.keys().cloned().collect();
                    options.push(RETURN_TO_ENVIRONMENTS.to_string());

                    let choice = self.ask(Menu::Host, options)?;
                    if choice == RETURN_TO_ENVIRONMENTS {
                        if let Err(err) = self.launcher.clear_screen() {
                            tracing::warn!("failed to clear screen: {err}");
                        }
                        State::Environments
                    } else {
                        tracing::info!("connecting to {choice} ({env})");
                        self.launcher.connect(&choice);
                        return Ok(choice);
                    }
                }
            };
        }
    }

    fn ask(&mut self, menu: Menu, options: Vec<String>) -> Result<String> {
        self.prompt.choose(menu, options)?.ok_or(Error::Cancelled)
    }
}
