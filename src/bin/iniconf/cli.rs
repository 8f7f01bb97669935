// CLI argument definitions using clap

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "iniconf")]
#[command(version)]
#[command(about = "Inspect and watch INI configuration files", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print a single value (exit code 1 if missing)
    Get(GetArgs),
    /// Print all key/value pairs of a section
    Section(SectionArgs),
    /// Print the whole file in canonical form
    Dump(DumpArgs),
    /// Reload the file when it changes and print every reload
    Watch(WatchArgs),
}

#[derive(Args, Debug)]
pub struct GetArgs {
    /// Path to the INI file
    pub file: String,

    /// Key to look up
    pub key: String,

    /// Look the key up inside this section instead of the global keys
    #[arg(short, long)]
    pub section: Option<String>,
}

#[derive(Args, Debug)]
pub struct SectionArgs {
    /// Path to the INI file
    pub file: String,

    /// Section name
    pub name: String,
}

#[derive(Args, Debug)]
pub struct DumpArgs {
    /// Path to the INI file
    pub file: String,

    /// Print as JSON instead of INI
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Path to the INI file
    pub file: String,

    /// Check interval, e.g. 500ms, 2s, 1m
    #[arg(short, long, default_value = "2s")]
    pub interval: String,
}
