//! Command-line interface for the regex workbench.
//!
//! Usage:
//!   workbench diagram `<pattern>` [--flags imx] [--json]
//!   workbench substitute `<pattern>` `<subject>` `<template>` [--flags imx] [--html]
//!
//! Both accept `--config <file.json>`; `--flags` overrides the configured flags.
//! Set `RUST_LOG=debug` to see what the workbench is doing.

use std::fs;
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use regex_workbench::config::{Flags, WorkbenchConfig};
use regex_workbench::Workbench;

#[derive(Debug, Parser)]
#[command(name = "workbench", version, about = "Railroad diagrams and substitutions for Ruby regexes")]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Regex options, e.g. `ix`
    #[arg(long, global = true)]
    flags: Option<Flags>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the railroad diagram of a pattern
    Diagram {
        pattern: String,
        /// Print the diagram as JSON instead of a tree
        #[arg(long)]
        json: bool,
    },
    /// Replace every match of a pattern using a `\1` / `\k<name>` template
    Substitute {
        pattern: String,
        subject: String,
        template: String,
        /// Print HTML with highlighted replacements
        #[arg(long)]
        html: bool,
    },
}

fn load_config(cli: &Cli) -> Result<WorkbenchConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            WorkbenchConfig::from_json(&text)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => WorkbenchConfig::default(),
    };
    if let Some(flags) = cli.flags {
        config.flags = flags;
    }
    Ok(config)
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let mut workbench = Workbench::new(config);

    match cli.command {
        Command::Diagram { pattern, json } => match workbench.diagram(&pattern) {
            Ok(diagram) if json => println!("{}", serde_json::to_string_pretty(&diagram)?),
            Ok(diagram) => print!("{}", diagram.to_tree_string()),
            Err(err) => {
                eprintln!("{}", err.user_message());
                process::exit(1);
            }
        },
        Command::Substitute {
            pattern,
            subject,
            template,
            html,
        } => {
            let result = workbench.substitute(&pattern, &subject, &template);
            if html {
                println!("{}", result.to_html(&workbench.config().highlight_class));
            } else {
                println!("{}", result.text());
            }
            for error in &result.errors {
                eprintln!("{error}");
            }
            if !result.errors.is_empty() {
                process::exit(2);
            }
        }
    }
    Ok(())
}
