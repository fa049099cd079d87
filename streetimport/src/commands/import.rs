// streetimport/src/commands/import.rs
//
// USE CASE: Import one data file.

use std::path::{Path, PathBuf};

use comfy_table::Table;
use streetimport_core::application::run_file;
use streetimport_core::domain::ImportResult;
use streetimport_core::infrastructure::adapters::InMemoryRepository;

use super::{dump_repository, load_domain_config};

pub async fn execute(config_dir: &Path, file: PathBuf, dump: Option<&Path>) -> anyhow::Result<bool> {
    let start = std::time::Instant::now();

    println!("⚙️  Loading configuration...");
    let config = load_domain_config(config_dir)?;
    match config.domain() {
        Ok(domain) => println!("   Domain: {}", domain),
        Err(e) => eprintln!("   ⚠️  {}", e),
    }

    let repository = InMemoryRepository::with_reference_data();
    let mut result = ImportResult::new(config.log_threshold());
    let state = run_file(file.clone(), &config, &repository, &mut result).await;
    let summary = result.to_api_result();

    let failures: Vec<(&str, &str)> = result.failures().collect();
    if !failures.is_empty() {
        let mut table = Table::new();
        table.set_header(vec!["Record", "Failure"]);
        for (id, message) in failures {
            table.add_row(vec![id, message]);
        }
        println!("{table}");
    }

    dump_repository(&repository, dump)?;

    if summary.is_error {
        eprintln!("\n❌ FAILURE ({:?}). {}", state, summary.message);
    } else {
        println!(
            "\n✨ SUCCESS! {} ({} in {:.2?})",
            summary.message,
            file.display(),
            start.elapsed()
        );
    }
    Ok(!summary.is_error)
}
