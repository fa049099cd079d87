// streetimport/src/commands/domains.rs
//
// USE CASE: List registered domains.

use std::path::Path;

use comfy_table::Table;

use super::load_domain_config;

pub fn execute(config_dir: &Path) -> anyhow::Result<()> {
    let config = load_domain_config(config_dir)?;
    let active = config.domain().ok();

    let mut table = Table::new();
    table.set_header(vec!["Domain", "Active", "Description"]);
    for profile in config.registry().profiles() {
        let is_active = active.as_deref() == Some(profile.id());
        table.add_row(vec![
            profile.id(),
            if is_active { "*" } else { "" },
            profile.description(),
        ]);
    }
    println!("{table}");
    Ok(())
}
