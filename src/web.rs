//! Static HTML overview of the inventory.

use std::path::Path;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use minijinja::{context, Environment, Value};
use serde::Serialize;

use crate::error::Result;
use crate::inventory::{Environment as InventoryEnvironment, Inventory};
use crate::sshconfig::write_private;

// The `.html` suffix turns on HTML auto-escaping.
const TEMPLATE_NAME: &str = "dashboard.html";
const TEMPLATE: &str = include_str!("../assets/dashboard.html.j2");

/// Image shown in the page header and used as favicon.
#[derive(Debug, Clone, Copy)]
pub struct Logo<'a> {
    pub mime: &'a str,
    pub bytes: &'a [u8],
}

impl Logo<'_> {
    fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime, STANDARD.encode(self.bytes))
    }
}

impl Logo<'static> {
    pub const fn bundled() -> Self {
        Logo {
            mime: "image/svg+xml",
            bytes: include_bytes!("../assets/logo.svg"),
        }
    }
}

#[derive(Serialize)]
struct EnvView<'a> {
    name: &'a str,
    host_count: usize,
    hosts: Vec<HostView<'a>>,
}

#[derive(Serialize)]
struct HostView<'a> {
    name: &'a str,
    properties: Vec<PropView<'a>>,
}

#[derive(Serialize)]
struct PropView<'a> {
    key: &'a str,
    value: String,
}

impl<'a> EnvView<'a> {
    fn new(name: &'a str, env: &'a InventoryEnvironment) -> Self {
        let hosts = env
            .iter_hosts()
            .map(|(host, props)| HostView {
                name: host,
                properties: props
                    .iter()
                    .map(|(key, value)| PropView {
                        key: key.trim(),
                        value: value.rendered(),
                    })
                    .collect(),
            })
            .collect();

        EnvView {
            name,
            host_count: env.host_count(),
            hosts,
        }
    }
}

pub struct Dashboard<'a> {
    title: String,
    logo: Logo<'a>,
}

impl Default for Dashboard<'static> {
    fn default() -> Self {
        Dashboard::new(env!("CARGO_PKG_NAME"), Logo::bundled())
    }
}

impl<'a> Dashboard<'a> {
    pub fn new(title: impl Into<String>, logo: Logo<'a>) -> Self {
        Self {
            title: title.into(),
            logo,
        }
    }

    pub fn render(&self, inventory: &Inventory) -> Result<String> {
        let environments: Vec<EnvView> = inventory
            .environments()
            .map(|(name, env)| EnvView::new(name, env))
            .collect();

        let mut env = Environment::new();
        env.add_template(TEMPLATE_NAME, TEMPLATE)?;
        let html = env.get_template(TEMPLATE_NAME)?.render(context! {
            title => &self.title,
            logo_uri => Value::from_safe_string(self.logo.data_uri()),
            environments => environments,
        })?;
        Ok(html)
    }

    /// Render and write to `path` with owner-only permissions.
    pub fn write<P: AsRef<Path>>(&self, inventory: &Inventory, path: P) -> Result<()> {
        let path = path.as_ref();
        let html = self.render(inventory)?;
        write_private(path, html.as_bytes())?;
        tracing::info!("wrote dashboard to {:?}", path);
        Ok(())
    }
}
