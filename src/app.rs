use anyhow::Context;

use crate::{
    cli::Args, connect::SshLauncher, error::Error, inventory::Inventory,
    select_box::TerminalPrompt, selector::Selector, sshconfig, web::Dashboard,
};

pub struct App {
    args: Args,
}

impl App {
    pub fn new(args: Args) -> Self {
        App { args }
    }

    /// Load the inventory, write the SSH config (and dashboard), then let the
    /// user pick a host. Only loading and SSH config generation are fatal.
    pub fn run(&self) -> anyhow::Result<()> {
        let ssh_config = self.args.ssh_config_path().context(
            "cannot determine the home directory for the default SSH config, use --out-ssh-config-file",
        )?;

        let inventory =
            Inventory::load(&self.args.config_file).context("failed to load inventory")?;
        tracing::debug!(
            "loaded {} environments with {} hosts",
            inventory.environment_names().len(),
            inventory.host_count()
        );

        sshconfig::write_ssh_config(&inventory, &ssh_config)
            .context("failed to generate SSH config")?;

        if let Some(html) = &self.args.web_html_file {
            if let Err(err) = Dashboard::default().write(&inventory, html) {
                tracing::error!("failed to generate dashboard: {err}");
            }
        }

        if self.args.no_menu {
            return Ok(());
        }
        if inventory.is_empty() {
            tracing::warn!("inventory has no environments, nothing to select");
            return Ok(());
        }

        match Selector::new(&inventory, TerminalPrompt, SshLauncher::default()).run() {
            Ok(host) => tracing::debug!("session with {host} finished"),
            Err(Error::Cancelled) => tracing::warn!("host selection cancelled"),
            Err(err) => tracing::error!("failed to select host: {err}"),
        }
        Ok(())
    }
}
