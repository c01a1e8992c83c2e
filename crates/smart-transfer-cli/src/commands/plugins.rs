use std::io::Write;

use anyhow::Result;
use smart_transfer::PluginCatalog;

/// Print one `name version` line per plugin.
pub fn run(catalog: &PluginCatalog, out: &mut impl Write) -> Result<()> {
    if catalog.is_empty() {
        writeln!(out, "No compression formats available.")?;
        return Ok(());
    }
    for plugin in catalog.iter() {
        writeln!(out, "{plugin}")?;
    }
    Ok(())
}
