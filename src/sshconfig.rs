use std::{
    fmt::Write as _,
    fs::{self, OpenOptions},
    io::Write,
    path::Path,
};

use crate::error::{Error, Result};
use crate::inventory::{HostProperties, Inventory};

/// Render the whole inventory as ssh_config(5) text, one `Host` block per
/// host. Environment grouping is flattened away.
pub fn render(inventory: &Inventory) -> String {
    let mut out = String::new();
    for (_, env) in inventory.environments() {
        for (host, props) in env.iter_hosts() {
            render_host(&mut out, host, props);
        }
    }
    out
}

fn render_host(out: &mut String, host: &str, props: &HostProperties) {
    // writing into a String cannot fail
    let _ = writeln!(out, "Host {host}");
    for (key, value) in props {
        let _ = writeln!(out, "\t{} {}", key.trim(), value.rendered());
    }
    out.push('\n');
}

/// Write the rendered inventory to `path`, replacing any previous content.
/// The file ends up readable and writable by its owner only.
pub fn write_ssh_config<P: AsRef<Path>>(inventory: &Inventory, path: P) -> Result<()> {
    let path = path.as_ref();
    let text = render(inventory);
    write_private(path, text.as_bytes())?;
    tracing::info!(
        "wrote {} host entries to {:?}",
        inventory.host_count(),
        path
    );
    Ok(())
}

/// Create or truncate `path` with mode 0600 and write `data` to it.
pub(crate) fn write_private(path: &Path, data: &[u8]) -> Result<()> {
    let fail = |source| Error::persistence(path, source);

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(fail)?;
    }

    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path).map_err(fail)?;

    // `mode` only applies on creation; narrow an existing file as well.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(0o600))
            .map_err(fail)?;
    }

    file.write_all(data).map_err(fail)?;
    file.flush().map_err(fail)?;
    Ok(())
}
