// iniconf - command line front end for the iniconf library

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::collections::BTreeMap;
use std::process::ExitCode;
use std::sync::Arc;

use cli::{Cli, Commands, DumpArgs, GetArgs, SectionArgs, WatchArgs};
use iniconf::cfg::serde_duration::parse_duration;
use iniconf::{Config, ConfigOptions, ConfigRegistry, ReloadEvent};

fn expand(path: &str) -> String {
    shellexpand::tilde(path).to_string()
}

fn open(registry: &ConfigRegistry, options: ConfigOptions) -> Result<Arc<Config>> {
    let path = options.file_path.clone();
    registry
        .create(options)
        .with_context(|| format!("Failed to load config file: {}", path))
}

fn execute_get(args: &GetArgs, registry: &ConfigRegistry) -> Result<ExitCode> {
    let config = open(registry, ConfigOptions::from_path(expand(&args.file)))?;
    let value = match &args.section {
        Some(section) => config.section_get(section, &args.key),
        None => config.get(&args.key),
    };

    match value {
        Some(value) => {
            println!("{}", value);
            Ok(ExitCode::SUCCESS)
        }
        None => Ok(ExitCode::FAILURE),
    }
}

fn execute_section(args: &SectionArgs, registry: &ConfigRegistry) -> Result<ExitCode> {
    let config = open(registry, ConfigOptions::from_path(expand(&args.file)))?;
    if !config.has_section(&args.name) {
        eprintln!("section not found: {}", args.name);
        return Ok(ExitCode::FAILURE);
    }

    let entries: BTreeMap<_, _> = config.sections_get(&args.name).into_iter().collect();
    for (key, value) in entries {
        println!("{} = {}", key, value);
    }
    Ok(ExitCode::SUCCESS)
}

fn execute_dump(args: &DumpArgs, registry: &ConfigRegistry) -> Result<ExitCode> {
    let config = open(registry, ConfigOptions::from_path(expand(&args.file)))?;
    let document = config.document();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&document)?);
    } else {
        print!("{}", document);
    }
    Ok(ExitCode::SUCCESS)
}

fn execute_watch(args: &WatchArgs, registry: &ConfigRegistry) -> Result<ExitCode> {
    let interval = parse_duration(&args.interval)
        .map_err(|e| anyhow::anyhow!("Invalid interval '{}': {}", args.interval, e))?;

    let (event_tx, event_rx) = crossbeam::channel::unbounded();
    let config = open(
        registry,
        ConfigOptions::from_path(expand(&args.file)).with_auto_reload(interval),
    )?;
    config.on_reload(move |event| {
        let _ = event_tx.send(event.clone());
    });

    println!(
        "watching {} every {} (Ctrl-C to stop)",
        config.source(),
        args.interval
    );
    print!("{}", config.document());

    for event in event_rx.iter() {
        match event {
            ReloadEvent::Reloaded { name, last_modified } => {
                println!("{} {} (mtime {})", "reloaded".green(), name, last_modified);
                print!("{}", config.document());
            }
            ReloadEvent::Failed { name, error } => {
                println!("{} {}: {}", "reload failed".red(), name, error);
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let registry = ConfigRegistry::new();

    match &cli.command {
        Commands::Get(args) => execute_get(args, &registry),
        Commands::Section(args) => execute_section(args, &registry),
        Commands::Dump(args) => execute_dump(args, &registry),
        Commands::Watch(args) => execute_watch(args, &registry),
    }
}
