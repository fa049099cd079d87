// streetimport/src/cli.rs
//
// Single source of truth for all CLI definitions (Clap structs).

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "streetimport")]
#[command(about = "Imports street-fundraising data files into the CRM", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Directory holding streetimport.yaml and the settings file
    #[arg(long, global = true, default_value = ".", env = "STREETIMPORT_CONFIG_DIR")]
    pub config_dir: PathBuf,

    /// Write the resulting CRM entities as JSON (dry-run repository)
    #[arg(long, global = true)]
    pub dump: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 📥 Imports one data file with the active domain
    Import {
        /// Delimited data file
        file: PathBuf,
    },

    /// 📂 Imports every CSV file of a folder, sorting them into processed/failed
    ImportFolder {
        /// Folder containing the data files
        dir: PathBuf,
    },

    /// ⚙️  Reads or changes domain settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },

    /// 🏷️  Lists the registered domains
    Domains,
}

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Prints a setting of the active domain (dotted path, ex: "contact.location_type")
    Get { path: String },

    /// Stores a setting of the active domain; the value is parsed as JSON, falling back to a string
    Set { path: String, value: String },

    /// Selects the active domain
    SetDomain { domain: String },
}
