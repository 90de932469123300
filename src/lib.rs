mod app;
pub mod cli;
mod connect;
mod error;
mod input;
pub mod inventory;
pub mod select_box;
pub mod selector;
pub mod sshconfig;
mod terminal;
pub mod web;

pub use app::App;
pub use connect::SshLauncher;
pub use error::{Error, Result};
pub use inventory::{Environment, HostProperties, Inventory, PropertyValue};
pub use selector::{Launcher, Menu, Prompt, Selector, RETURN_TO_ENVIRONMENTS};
