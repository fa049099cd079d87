// streetimport/src/commands/import_folder.rs
//
// USE CASE: Import a whole inbox folder.

use std::path::{Path, PathBuf};

use anyhow::Context;
use comfy_table::Table;
use streetimport_core::application::import_folder;
use streetimport_core::infrastructure::adapters::InMemoryRepository;

use super::{dump_repository, load_domain_config};

pub async fn execute(config_dir: &Path, dir: PathBuf, dump: Option<&Path>) -> anyhow::Result<bool> {
    let config = load_domain_config(config_dir)?;
    let repository = InMemoryRepository::with_reference_data();

    println!("📂 Importing files from {}...", dir.display());
    let imports = import_folder(&dir, &config, &repository)
        .await
        .with_context(|| format!("Folder import failed for {:?}", dir))?;

    let mut table = Table::new();
    table.set_header(vec!["File", "Status", "Imported", "Failed", "Message"]);
    for import in &imports {
        table.add_row(vec![
            import.file.display().to_string(),
            if import.result.is_error { "❌ error" } else { "✅ ok" }.to_string(),
            import.result.imported.to_string(),
            import.result.failed.to_string(),
            import.result.message.clone(),
        ]);
    }
    println!("{table}");

    dump_repository(&repository, dump)?;

    let failed = imports.iter().filter(|i| i.result.is_error).count();
    println!("\n📝 {} files, {} failed", imports.len(), failed);
    Ok(failed == 0)
}
