//! `routectl`: compile route patterns and dispatch paths against route tables.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde_json::json;
use tokio::io::{AsyncBufReadExt, BufReader};

use pathwarden::config::{apply_config, load_router, HandlerRegistry, TableConfig, TableWatcher};
use pathwarden::observability::init_logging;
use pathwarden::routing::compiler::{compile, normalize};
use pathwarden::routing::{EffectiveOptions, ModifierSetting, OptionSet, RouteMatch, Router};

#[derive(Parser)]
#[command(name = "routectl")]
#[command(about = "Compile route patterns and dispatch paths against route tables", long_about = None)]
struct Cli {
    /// Log level; overrides the table file's [logging] section.
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the expression a pattern compiles to
    Compile {
        pattern: String,
        #[arg(long)]
        case_sensitive: bool,
        #[arg(long)]
        no_regex: bool,
        #[arg(long)]
        no_modifiers: bool,
        /// Match the compiled pattern against this path as well
        #[arg(long)]
        path: Option<String>,
    },
    /// Dispatch one path against a route table file
    Match {
        #[arg(short, long)]
        table: PathBuf,
        path: String,
    },
    /// Dispatch paths read from stdin against a hot-reloaded route table
    Watch {
        #[arg(short, long)]
        table: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let level = cli
        .log_level
        .clone()
        .or_else(|| match &cli.command {
            Commands::Match { table, .. } | Commands::Watch { table } => configured_level(table),
            Commands::Compile { .. } => None,
        })
        .unwrap_or_else(|| "warn".to_string());
    init_logging(&level);

    match cli.command {
        Commands::Compile {
            pattern,
            case_sensitive,
            no_regex,
            no_modifiers,
            path,
        } => {
            let options = OptionSet {
                case_sensitive,
                regex: !no_regex,
                modifiers: ModifierSetting::from(!no_modifiers),
                ..OptionSet::default()
            };
            let live = path.as_deref().map(normalize).unwrap_or("");
            let compiled = compile(&pattern, &EffectiveOptions::from_options(&options), live)?;

            let mut report = json!({
                "pattern": compiled.pattern(),
                "expression": compiled.expression(),
                "case_sensitive": case_sensitive,
                "segments": compiled.segments(),
            });
            if path.is_some() {
                report["captures"] = json!(compiled.captures(live));
            }
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Match { table, path } => {
            let handlers = builtin_handlers();
            let router = load_router(&table, &handlers)?;
            let matched = router.run(&path)?;
            report_match(&path, matched.as_ref())?;
            Ok(if matched.is_some() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Commands::Watch { table } => {
            let handlers = builtin_handlers();
            let router = load_router(&table, &handlers)?;
            watch(&router, &table, handlers).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Read paths from stdin until EOF, applying table reloads as they arrive.
async fn watch(
    router: &Router,
    table: &Path,
    handlers: HandlerRegistry,
) -> Result<(), Box<dyn std::error::Error>> {
    let (watcher, mut updates) = TableWatcher::new(table, handlers.clone());
    let _watcher = watcher.run()?;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(path) = line? else {
                    break;
                };
                match router.run(&path) {
                    Ok(matched) => report_match(&path, matched.as_ref())?,
                    Err(e) => tracing::error!(error = %e, "Dispatch failed"),
                }
            }
            Some(config) = updates.recv() => {
                if let Err(e) = apply_config(router, &config, &handlers) {
                    tracing::error!("Failed to apply route table: {}", e);
                }
            }
        }
    }

    Ok(())
}

fn report_match(path: &str, matched: Option<&RouteMatch>) -> Result<(), serde_json::Error> {
    let report = match matched {
        Some(m) => json!({ "path": path, "matched": m }),
        None => json!({ "path": path, "matched": null }),
    };
    println!("{}", serde_json::to_string(&report)?);
    Ok(())
}

/// Handlers that route-table files can name.
fn builtin_handlers() -> HandlerRegistry {
    HandlerRegistry::new()
        .with("echo", |segments: &[String]| {
            println!("{}", json!({ "segments": segments }));
        })
        .with("log", |segments: &[String]| {
            tracing::info!(?segments, "Route handled");
        })
}

/// The `[logging]` level of a table file, if it can be read.
fn configured_level(path: &Path) -> Option<String> {
    let content = std::fs::read_to_string(path).ok()?;
    let config: TableConfig = toml::from_str(&content).ok()?;
    Some(config.logging.level)
}
