use std::path::PathBuf;

use clap::Parser;

const LONG_ABOUT: &str = "
┏━┓┏━┓╻ ╻╺┳┓┏━╸┏━╸╻┏
┗━┓┗━┓┣━┫ ┃┃┣╸ ┃  ┣┻┓
┗━┛┗━┛╹ ╹╺┻┛┗━╸┗━╸╹ ╹

Keep your hosts in a YAML inventory grouped by environment, let sshdeck turn it
into an SSH config, then pick an environment and a host from a menu to connect.
Start typing in the menu to filter the list.

Inventory layout:

  prod:
    hosts:
      web1:
        HostName: 10.0.0.1
        User: admin

Set SSHDECK_LOG (e.g. SSHDECK_LOG=debug) to see what is going on.";

#[derive(Parser, Debug)]
#[command(name = "sshdeck", version, about, long_about = LONG_ABOUT)]
pub struct Args {
    /// Path to the YAML inventory file
    #[arg(short = 'c', long = "config-file", env = "SSHDECK_CONFIG_FILE")]
    pub config_file: PathBuf,

    /// Path of the SSH config file to write (default: $HOME/.ssh/config)
    #[arg(short = 'o', long = "out-ssh-config-file")]
    pub out_ssh_config_file: Option<PathBuf>,

    /// Also write a static HTML overview of the inventory to this file,
    /// e.g. /tmp/inventory.html
    #[arg(short = 'w', long = "web-html-file")]
    pub web_html_file: Option<PathBuf>,

    /// Write the output files and exit without showing the host menu
    #[arg(long, default_value_t = false)]
    pub no_menu: bool,
}

impl Args {
    /// The SSH config destination, falling back to `~/.ssh/config`.
    pub fn ssh_config_path(&self) -> Option<PathBuf> {
        self.out_ssh_config_file
            .clone()
            .or_else(default_ssh_config_path)
    }
}

pub fn default_ssh_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".ssh").join("config"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_is_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn short_flags() {
        let args = Args::try_parse_from([
            "sshdeck", "-c", "inv.yml", "-o", "/tmp/cfg", "-w", "/tmp/x.html",
        ])
        .unwrap();
        assert_eq!(args.config_file, PathBuf::from("inv.yml"));
        assert_eq!(args.ssh_config_path(), Some(PathBuf::from("/tmp/cfg")));
        assert_eq!(args.web_html_file, Some(PathBuf::from("/tmp/x.html")));
        assert!(!args.no_menu);
    }

    #[test]
    fn ssh_config_defaults_to_home() {
        let args = Args::try_parse_from(["sshdeck", "--config-file", "inv.yml"]).unwrap();
        assert_eq!(args.web_html_file, None);
        if let Some(home) = dirs::home_dir() {
            assert_eq!(args.ssh_config_path(), Some(home.join(".ssh/config")));
        }
    }
}
